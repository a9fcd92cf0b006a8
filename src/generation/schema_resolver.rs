//! Maps `components.schemas` onto model and enum definitions

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;

use crate::generation::GenerationError;
use crate::generation::ir::{
    Bound, Comparator, EnumDef, Field, ModelDef, ModelOrigin, NumberConstraints, PrimitiveType,
    SchemaTypeKind, StringConstraints, Validator, Visibility,
};
use crate::generation::naming;
use crate::generation::registry::{EnumRegistry, NameRegistry};
use crate::generation::sanitizers::unique_identifier;
use crate::infrastructure::openapi::{Exclusivity, Schema};

/// Alias chains longer than this are treated as unresolvable
const MAX_ALIAS_DEPTH: usize = 16;

/// What a component schema turns into
#[derive(Debug, Clone, PartialEq, Eq)]
enum ComponentKind {
    Model(String),
    Enum(String),
    /// Primitive or array schema; references resolve to the target's own kind
    Alias,
}

/// Target of a `#/components/schemas/...` reference
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRef<'a> {
    Model(String),
    Enum(String),
    Alias(&'a Schema),
}

/// Classification of a single property or parameter schema
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedProperty {
    pub kind: SchemaTypeKind,
    pub nullable: bool,
    pub visibility: Visibility,
}

/// Output of resolving the component map
#[derive(Debug, Clone, Default)]
pub struct ResolvedSchemas {
    /// Component models in document order
    pub models: Vec<ModelDef>,
    /// Models referenced by another model's fields
    pub referenced: BTreeSet<String>,
}

/// Resolves component schemas into `ModelDef` and `EnumDef` records.
///
/// The resolver owns the enum registry for the run: the operation synthesizer
/// keeps classifying query parameters through it after `resolve` returns, and
/// the final enum list is taken with [`SchemaResolver::into_enums`].
pub struct SchemaResolver<'a> {
    components: &'a IndexMap<String, Schema>,
    kinds: HashMap<&'a str, ComponentKind>,
    enums: EnumRegistry,
    referenced: BTreeSet<String>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(components: &'a IndexMap<String, Schema>) -> Self {
        let kinds = components
            .iter()
            .map(|(component, schema)| {
                let kind = if schema.is_string_enum() {
                    ComponentKind::Enum(naming::model_name(component))
                } else if schema.is_object_model() {
                    ComponentKind::Model(naming::model_name(component))
                } else {
                    ComponentKind::Alias
                };
                (component.as_str(), kind)
            })
            .collect();

        Self {
            components,
            kinds,
            enums: EnumRegistry::new(),
            referenced: BTreeSet::new(),
        }
    }

    /// Resolve every component schema, in document order
    pub fn resolve(&mut self, names: &mut NameRegistry) -> Result<ResolvedSchemas, GenerationError> {
        let components = self.components;
        let mut models = Vec::new();

        for (component, schema) in components {
            let origin = format!("components.schemas.{component}");
            match self.kinds.get(component.as_str()).cloned() {
                Some(ComponentKind::Model(name)) => {
                    names.claim_type(&name, &origin)?;
                    let model = self.resolve_model(&name, component, schema, names)?;
                    tracing::debug!(
                        model = %model.name,
                        fields = model.fields.len(),
                        validators = model.validators.len(),
                        "Resolved model"
                    );
                    models.push(model);
                }
                Some(ComponentKind::Enum(name)) => {
                    names.claim_type(&name, &origin)?;
                    let values = schema.enum_values.as_deref().unwrap_or_default();
                    self.enums.register_named(&name, values, &origin, names)?;
                }
                _ => {
                    tracing::debug!(component = %component, "Component is an alias, no model emitted");
                }
            }
        }

        Ok(ResolvedSchemas {
            models,
            referenced: self.referenced.clone(),
        })
    }

    fn resolve_model(
        &mut self,
        name: &str,
        component: &str,
        schema: &'a Schema,
        names: &mut NameRegistry,
    ) -> Result<ModelDef, GenerationError> {
        let mut fields = Vec::new();
        let mut validators = Vec::new();
        let mut taken = HashSet::new();

        for (wire_name, property) in schema.properties.iter().flatten() {
            let classified = self.classify_property(name, wire_name, property, names)?;
            let field = Field {
                name: unique_identifier(&naming::field_name(wire_name), &mut taken),
                wire_name: wire_name.clone(),
                kind: classified.kind,
                optional: !schema.required.contains(wire_name),
                nullable: classified.nullable,
                visibility: classified.visibility,
            };
            if field.rejects_null() {
                validators.push(Validator::reject_null(&field.name));
            }
            fields.push(field);
        }

        Ok(ModelDef {
            name: name.to_string(),
            fields,
            validators,
            order_index: 0,
            variant: None,
            origin: ModelOrigin::Component {
                schema: component.to_string(),
            },
        })
    }

    /// Classify a property of `owner`. Nullability and visibility of a
    /// reference are read from both the local schema and the referenced one.
    pub fn classify_property(
        &mut self,
        owner: &str,
        field: &str,
        schema: &'a Schema,
        names: &mut NameRegistry,
    ) -> Result<ClassifiedProperty, GenerationError> {
        if let Some(reference) = &schema.reference {
            let (_, target) = self.lookup(reference)?;
            let kind = self.reference_kind(owner, field, reference, names, 0)?;
            return Ok(ClassifiedProperty {
                kind,
                nullable: schema.is_nullable() || target.is_nullable(),
                visibility: visibility(
                    schema.read_only || target.read_only,
                    schema.write_only || target.write_only,
                ),
            });
        }

        Ok(ClassifiedProperty {
            kind: self.classify_inline(owner, field, schema, names)?,
            nullable: schema.is_nullable(),
            visibility: visibility(schema.read_only, schema.write_only),
        })
    }

    fn reference_kind(
        &mut self,
        owner: &str,
        field: &str,
        reference: &str,
        names: &mut NameRegistry,
        depth: usize,
    ) -> Result<SchemaTypeKind, GenerationError> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(GenerationError::UnresolvedReference(format!(
                "{reference} (alias chain too deep)"
            )));
        }

        match self.dereference(reference)? {
            ResolvedRef::Model(name) => {
                self.referenced.insert(name.clone());
                Ok(SchemaTypeKind::reference(name))
            }
            ResolvedRef::Enum(name) => Ok(SchemaTypeKind::Enum { name }),
            ResolvedRef::Alias(target) => match &target.reference {
                Some(next) => self.reference_kind(owner, field, next, names, depth + 1),
                None => self.classify_inline(owner, field, target, names),
            },
        }
    }

    fn classify_inline(
        &mut self,
        owner: &str,
        field: &str,
        schema: &'a Schema,
        names: &mut NameRegistry,
    ) -> Result<SchemaTypeKind, GenerationError> {
        let Some(decl) = &schema.schema_type else {
            return Err(GenerationError::unsupported_type(owner, field, "<missing>"));
        };
        let token = decl.primary().unwrap_or("null");

        let kind = match token {
            "string" => self.classify_string(owner, field, schema, names)?,
            "integer" if schema.has_numeric_constraints() => SchemaTypeKind::ConstrainedInteger {
                constraints: number_constraints(schema),
            },
            "number" if schema.has_numeric_constraints() => SchemaTypeKind::ConstrainedNumber {
                constraints: number_constraints(schema),
            },
            "array" => SchemaTypeKind::Array {
                items: Box::new(self.classify_items(owner, field, schema.items.as_deref(), names)?),
            },
            other => match PrimitiveType::from_type_token(other) {
                Some(primitive) => SchemaTypeKind::primitive(primitive),
                None => return Err(GenerationError::unsupported_type(owner, field, other)),
            },
        };
        Ok(kind)
    }

    fn classify_string(
        &mut self,
        owner: &str,
        field: &str,
        schema: &Schema,
        names: &mut NameRegistry,
    ) -> Result<SchemaTypeKind, GenerationError> {
        if schema.has_length_constraints() {
            return Ok(SchemaTypeKind::ConstrainedString {
                constraints: StringConstraints {
                    min_length: schema.min_length,
                    max_length: schema.max_length,
                },
            });
        }
        if let Some(format) = &schema.format {
            return Ok(SchemaTypeKind::primitive(PrimitiveType::from_string_format(
                format,
            )));
        }
        if let Some(values) = schema.enum_values.as_deref().filter(|values| !values.is_empty()) {
            let name = self.enums.register_field_enum(owner, field, values, names)?;
            return Ok(SchemaTypeKind::Enum { name });
        }
        Ok(SchemaTypeKind::primitive(PrimitiveType::Str))
    }

    fn classify_items(
        &mut self,
        owner: &str,
        field: &str,
        items: Option<&'a Schema>,
        names: &mut NameRegistry,
    ) -> Result<SchemaTypeKind, GenerationError> {
        match items {
            Some(items) => match &items.reference {
                Some(reference) => self.reference_kind(owner, field, reference, names, 0),
                None if items.schema_type.is_none() => Ok(SchemaTypeKind::Unknown),
                None => self.classify_inline(owner, field, items, names),
            },
            None => Ok(SchemaTypeKind::Unknown),
        }
    }

    /// Resolve a schema reference to the component it names
    pub fn dereference(&self, reference: &str) -> Result<ResolvedRef<'a>, GenerationError> {
        let (component, schema) = self.lookup(reference)?;
        match self.kinds.get(component) {
            Some(ComponentKind::Model(name)) => Ok(ResolvedRef::Model(name.clone())),
            Some(ComponentKind::Enum(name)) => Ok(ResolvedRef::Enum(name.clone())),
            Some(ComponentKind::Alias) => Ok(ResolvedRef::Alias(schema)),
            None => Err(GenerationError::UnresolvedReference(reference.to_string())),
        }
    }

    fn lookup(&self, reference: &str) -> Result<(&'a str, &'a Schema), GenerationError> {
        let components = self.components;
        naming::schema_ref_target(reference)
            .and_then(|target| components.get_key_value(target))
            .map(|(component, schema)| (component.as_str(), schema))
            .ok_or_else(|| GenerationError::UnresolvedReference(reference.to_string()))
    }

    pub fn referenced(&self) -> &BTreeSet<String> {
        &self.referenced
    }

    pub fn enums(&self) -> &EnumRegistry {
        &self.enums
    }

    /// Final enum definitions, in registration order
    pub fn into_enums(self) -> Vec<EnumDef> {
        self.enums.into_enums()
    }
}

fn visibility(read_only: bool, write_only: bool) -> Visibility {
    match (read_only, write_only) {
        (true, false) => Visibility::ReadOnly,
        (false, true) => Visibility::WriteOnly,
        _ => Visibility::Standard,
    }
}

/// Bounds default to exclusive unless `exclusiveMinimum`/`exclusiveMaximum` is
/// `false`. A numeric 3.1 exclusive bound wins over the inclusive one.
fn number_constraints(schema: &Schema) -> NumberConstraints {
    NumberConstraints {
        lower: bound(
            schema.minimum.as_ref(),
            schema.exclusive_minimum.as_ref(),
            Comparator::Gt,
            Comparator::Ge,
        ),
        upper: bound(
            schema.maximum.as_ref(),
            schema.exclusive_maximum.as_ref(),
            Comparator::Lt,
            Comparator::Le,
        ),
        multiple_of: schema.multiple_of.clone(),
    }
}

fn bound(
    value: Option<&serde_json::Number>,
    exclusivity: Option<&Exclusivity>,
    strict: Comparator,
    inclusive: Comparator,
) -> Option<Bound> {
    match (value, exclusivity) {
        (_, Some(Exclusivity::Bound(limit))) => Some(Bound {
            value: limit.clone(),
            comparator: strict,
        }),
        (Some(value), Some(Exclusivity::Flag(false))) => Some(Bound {
            value: value.clone(),
            comparator: inclusive,
        }),
        (Some(value), _) => Some(Bound {
            value: value.clone(),
            comparator: strict,
        }),
        (None, _) => None,
    }
}
