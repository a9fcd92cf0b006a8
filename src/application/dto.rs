//! Data Transfer Objects for application layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::ValidationError;
use crate::generation::{ClientMode, GenerationContext, ModuleNames, OperationFilter, rules};

/// Request to generate a Python client package
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateClientRequest {
    /// Path or http(s) URL of the OpenAPI document
    pub source: String,
    pub output_dir: PathBuf,
    pub mode: ClientMode,
    pub base_url: Option<String>,
    pub schema_module: String,
    pub client_module: String,
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
    pub format: bool,
}

impl GenerateClientRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source.trim().is_empty() {
            return Err(ValidationError::MissingField(
                "OpenAPI document source".to_string(),
            ));
        }

        for name in [&self.schema_module, &self.client_module] {
            rules::validate_module_name(name)
                .map_err(|e| ValidationError::InvalidModuleName(e.to_string()))?;
        }
        if self.schema_module == self.client_module {
            return Err(ValidationError::InvalidConfiguration(format!(
                "schema and client modules are both named '{}'",
                self.schema_module
            )));
        }

        if let Some(base_url) = &self.base_url {
            rules::validate_base_url(base_url)
                .map_err(|e| ValidationError::InvalidBaseUrl(e.to_string()))?;
        }

        Ok(())
    }

    /// Settings handed to the generation domain
    pub fn generation_context(&self) -> GenerationContext {
        GenerationContext {
            mode: self.mode,
            base_url: self.base_url.clone(),
            modules: ModuleNames {
                schema: self.schema_module.clone(),
                client: self.client_module.clone(),
            },
            filter: OperationFilter::new(
                self.include_operations.iter().cloned(),
                self.exclude_operations.iter().cloned(),
            ),
            format: self.format,
        }
    }
}

/// Response from client generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerateClientResponse {
    pub artifacts_count: usize,
    pub output_path: PathBuf,
    pub files: Vec<PathBuf>,
    pub enums: usize,
    pub models: usize,
    pub operations: usize,
}

/// Request to resolve a document without rendering it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectRequest {
    pub source: String,
    pub mode: ClientMode,
    pub base_url: Option<String>,
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
}

impl InspectRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source.trim().is_empty() {
            return Err(ValidationError::MissingField(
                "OpenAPI document source".to_string(),
            ));
        }
        if let Some(base_url) = &self.base_url {
            rules::validate_base_url(base_url)
                .map_err(|e| ValidationError::InvalidBaseUrl(e.to_string()))?;
        }
        Ok(())
    }

    pub fn generation_context(&self) -> GenerationContext {
        GenerationContext {
            mode: self.mode,
            base_url: self.base_url.clone(),
            filter: OperationFilter::new(
                self.include_operations.iter().cloned(),
                self.exclude_operations.iter().cloned(),
            ),
            ..GenerationContext::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerateClientRequest {
        GenerateClientRequest {
            source: "petstore.yaml".to_string(),
            output_dir: PathBuf::from("/output/petstore"),
            mode: ClientMode::Sync,
            base_url: None,
            schema_module: "schema".to_string(),
            client_module: "api".to_string(),
            include_operations: Vec::new(),
            exclude_operations: vec!["deletePet".to_string()],
            format: false,
        }
    }

    #[test]
    fn test_generate_client_request_validation() {
        let valid = request();
        assert!(valid.validate().is_ok());

        let mut invalid = valid.clone();
        invalid.source = "  ".to_string();
        assert!(matches!(
            invalid.validate().unwrap_err(),
            ValidationError::MissingField(_)
        ));

        let mut invalid = valid.clone();
        invalid.client_module = "my-client".to_string();
        assert!(matches!(
            invalid.validate().unwrap_err(),
            ValidationError::InvalidModuleName(_)
        ));

        let mut invalid = valid.clone();
        invalid.client_module = "schema".to_string();
        assert!(matches!(
            invalid.validate().unwrap_err(),
            ValidationError::InvalidConfiguration(_)
        ));

        let mut invalid = valid;
        invalid.base_url = Some("ftp://files.test".to_string());
        assert!(matches!(
            invalid.validate().unwrap_err(),
            ValidationError::InvalidBaseUrl(_)
        ));
    }

    #[test]
    fn test_generation_context_carries_settings() {
        let mut request = request();
        request.mode = ClientMode::Async;
        request.format = true;

        let context = request.generation_context();
        assert_eq!(context.mode, ClientMode::Async);
        assert!(context.format);
        assert_eq!(context.modules.schema, "schema");
        assert!(context.filter.allows("addPet"));
        assert!(!context.filter.allows("deletePet"));
    }

    #[test]
    fn test_inspect_request_validation() {
        assert!(InspectRequest::default().validate().is_err());

        let request = InspectRequest {
            source: "petstore.yaml".to_string(),
            base_url: Some("https://petstore.test".to_string()),
            ..InspectRequest::default()
        };
        assert!(request.validate().is_ok());
        assert_eq!(
            request.generation_context().base_url.as_deref(),
            Some("https://petstore.test")
        );
    }
}
