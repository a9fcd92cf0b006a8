//! Error types for the generation domain

use thiserror::Error;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing required root key '{0}' in OpenAPI document")]
    MissingRoot(&'static str),

    #[error("Unsupported type '{type_token}' for field '{field}' of '{owner}'")]
    UnsupportedType {
        owner: String,
        field: String,
        type_token: String,
    },

    #[error("Unable to resolve reference: {0}")]
    UnresolvedReference(String),

    #[error(
        "Function name '{name}' generated for operation '{second}' collides with operation '{first}'"
    )]
    FunctionNameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Model name '{name}' produced by '{second}' collides with '{first}'")]
    ModelNameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Enum '{name}' is declared twice with different members ({first} vs {second})")]
    EnumCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Post-processing error: {0}")]
    PostProcessingError(String),

    #[error("OpenAPI loading error: {0}")]
    LoadError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),
}

impl GenerationError {
    /// Build an unsupported type error for a property
    pub fn unsupported_type(
        owner: impl Into<String>,
        field: impl Into<String>,
        type_token: impl Into<String>,
    ) -> Self {
        Self::UnsupportedType {
            owner: owner.into(),
            field: field.into(),
            type_token: type_token.into(),
        }
    }
}
