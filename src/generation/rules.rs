//! Business rules for the generation domain

use url::Url;

use crate::generation::GenerationError;
use crate::generation::sanitizers::{is_python_keyword, is_valid_identifier};

/// Used when the document declares no server and none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// Validates a Python module name
pub fn validate_module_name(name: &str) -> Result<(), GenerationError> {
    if name.is_empty() {
        return Err(GenerationError::InvalidConfiguration(
            "Module name cannot be empty".to_string(),
        ));
    }

    if !is_valid_identifier(name) || is_python_keyword(name) {
        return Err(GenerationError::InvalidConfiguration(format!(
            "Module name '{name}' is not a valid Python identifier"
        )));
    }

    if name == "__init__" {
        return Err(GenerationError::InvalidConfiguration(
            "Module name '__init__' is reserved for the package marker".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a base URL is absolute and uses http(s)
pub fn validate_base_url(base_url: &str) -> Result<(), GenerationError> {
    let url = Url::parse(base_url).map_err(|e| {
        GenerationError::InvalidConfiguration(format!("Invalid base URL '{base_url}': {e}"))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(GenerationError::InvalidConfiguration(format!(
            "Base URL '{base_url}' must use http or https, not {scheme}"
        ))),
    }
}

/// Pick the base URL for the client: configured value, then the document's
/// first server, then the placeholder. A trailing `/` is stripped.
pub fn select_base_url(configured: Option<&str>, server: Option<&str>) -> String {
    let base_url = configured.or(server).unwrap_or(DEFAULT_BASE_URL);
    base_url.trim_end_matches('/').to_string()
}
