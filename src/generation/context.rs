//! Generation context - the settings that flow through one generation run

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::generation::operation_synthesizer::OperationFilter;
use crate::generation::{ClientMode, GenerationError, rules};

pub const DEFAULT_SCHEMA_MODULE: &str = "schema";
pub const DEFAULT_CLIENT_MODULE: &str = "api";

/// Names of the generated Python modules, without the `.py` extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleNames {
    pub schema: String,
    pub client: String,
}

impl Default for ModuleNames {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA_MODULE.to_string(),
            client: DEFAULT_CLIENT_MODULE.to_string(),
        }
    }
}

/// Settings for a single generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    pub mode: ClientMode,
    /// Overrides `servers[0].url` when set
    pub base_url: Option<String>,
    pub modules: ModuleNames,
    pub filter: OperationFilter,
    /// Run external formatters over the written files
    pub format: bool,
}

impl GenerationContext {
    pub fn new(mode: ClientMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Validate the context has usable values
    pub fn validate(&self) -> Result<(), GenerationError> {
        rules::validate_module_name(&self.modules.schema)?;
        rules::validate_module_name(&self.modules.client)?;
        if self.modules.schema == self.modules.client {
            return Err(GenerationError::InvalidConfiguration(format!(
                "Schema and client modules must differ, both are '{}'",
                self.modules.schema
            )));
        }
        if let Some(base_url) = &self.base_url {
            rules::validate_base_url(base_url)?;
        }
        Ok(())
    }
}

/// Template context handed to the renderer
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub data: JsonValue,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            data: JsonValue::Object(serde_json::Map::new()),
        }
    }

    /// Add a top-level variable
    pub fn add_variable(&mut self, key: &str, value: JsonValue) {
        if let Some(object) = self.data.as_object_mut() {
            object.insert(key.to_string(), value);
        }
    }

    pub fn has_variable(&self, key: &str) -> bool {
        self.data.get(key).is_some()
    }

    pub fn variable(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}
