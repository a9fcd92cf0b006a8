//! Name bookkeeping for a single generation run

use std::collections::{HashMap, HashSet};

use crate::generation::GenerationError;
use crate::generation::ir::{EnumDef, EnumMember};
use crate::generation::naming;
use crate::generation::sanitizers::unique_identifier;

/// Records every generated function and class name together with the origin
/// that claimed it. Functions and classes live in separate namespaces.
#[derive(Debug, Default)]
pub struct NameRegistry {
    functions: HashMap<String, String>,
    types: HashMap<String, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a function name. Claiming the same name twice from one origin is
    /// a no-op; a second origin fails with `FunctionNameCollision`.
    pub fn claim_function(&mut self, name: &str, origin: &str) -> Result<(), GenerationError> {
        claim(&mut self.functions, name, origin).map_err(|first| {
            GenerationError::FunctionNameCollision {
                name: name.to_string(),
                first,
                second: origin.to_string(),
            }
        })
    }

    /// Claim a class name for a model or an enum
    pub fn claim_type(&mut self, name: &str, origin: &str) -> Result<(), GenerationError> {
        claim(&mut self.types, name, origin).map_err(|first| GenerationError::ModelNameCollision {
            name: name.to_string(),
            first,
            second: origin.to_string(),
        })
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

fn claim(claims: &mut HashMap<String, String>, name: &str, origin: &str) -> Result<(), String> {
    match claims.get(name) {
        Some(first) if first == origin => Ok(()),
        Some(first) => Err(first.clone()),
        None => {
            claims.insert(name.to_string(), origin.to_string());
            Ok(())
        }
    }
}

/// Deduplicating store of enum definitions.
///
/// Enums are indexed by name and by the (field name, members) pair they were
/// declared with, so identical field enums on different models collapse into
/// the first definition seen.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    enums: Vec<EnumDef>,
    by_name: HashMap<String, usize>,
    by_field: HashMap<(String, String), usize>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the enum of `field` on `owner`, returning the enum name to use
    pub fn register_field_enum(
        &mut self,
        owner: &str,
        field: &str,
        values: &[serde_json::Value],
        names: &mut NameRegistry,
    ) -> Result<String, GenerationError> {
        let key = (field.to_string(), members_key(values));
        if let Some(&index) = self.by_field.get(&key) {
            let name = self.enums[index].name.clone();
            tracing::debug!(enum_name = %name, model = %owner, field = %field, "Reusing enum");
            return Ok(name);
        }

        let name = naming::enum_name(owner, field);
        let index = self.register(&name, values, &format!("enum {owner}.{field}"), names)?;
        self.by_field.insert(key, index);
        Ok(name)
    }

    /// Register a component schema that is itself a string enum
    pub fn register_named(
        &mut self,
        name: &str,
        values: &[serde_json::Value],
        origin: &str,
        names: &mut NameRegistry,
    ) -> Result<String, GenerationError> {
        self.register(name, values, origin, names)?;
        Ok(name.to_string())
    }

    fn register(
        &mut self,
        name: &str,
        values: &[serde_json::Value],
        origin: &str,
        names: &mut NameRegistry,
    ) -> Result<usize, GenerationError> {
        if let Some(&index) = self.by_name.get(name) {
            let existing = &self.enums[index];
            let existing_values: Vec<serde_json::Value> =
                existing.values().into_iter().cloned().collect();
            if existing_values == values {
                return Ok(index);
            }
            return Err(GenerationError::EnumCollision {
                name: name.to_string(),
                first: members_key(&existing_values),
                second: members_key(values),
            });
        }

        names.claim_type(name, origin)?;
        let mut taken = HashSet::new();
        let members = values
            .iter()
            .map(|value| EnumMember {
                identifier: unique_identifier(&naming::enum_member_identifier(value), &mut taken),
                value: value.clone(),
            })
            .collect();
        self.enums.push(EnumDef {
            name: name.to_string(),
            members,
        });
        let index = self.enums.len() - 1;
        self.by_name.insert(name.to_string(), index);
        tracing::debug!(enum_name = %name, "Registered enum");
        Ok(index)
    }

    pub fn get(&self, name: &str) -> Option<&EnumDef> {
        self.by_name.get(name).map(|&index| &self.enums[index])
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }

    /// Enum definitions in registration order
    pub fn into_enums(self) -> Vec<EnumDef> {
        self.enums
    }
}

fn members_key(values: &[serde_json::Value]) -> String {
    serde_json::Value::Array(values.to_vec()).to_string()
}
