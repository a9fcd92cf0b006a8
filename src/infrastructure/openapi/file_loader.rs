//! File-based OpenAPI document loader
//!
//! This loader handles only file I/O. The actual parsing is done by the OpenApiParser.

use async_trait::async_trait;
use tokio::fs;

use super::parser::{DocumentFormat, OpenApiParser, decode_document};
use crate::generation::{GenerationError, OpenApiLoader};
use crate::infrastructure::openapi::OpenApiContext;

/// Loads OpenAPI documents from local files
pub struct FileOpenApiLoader;

impl FileOpenApiLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OpenApiLoader for FileOpenApiLoader {
    async fn load(&self, source: &str) -> Result<OpenApiContext, GenerationError> {
        let content = fs::read_to_string(source).await.map_err(|e| {
            tracing::error!(source = %source, error = %e, "Failed to read OpenAPI document");
            GenerationError::LoadError(format!("Failed to read {source}: {e}"))
        })?;

        let document = decode_document(&content, DocumentFormat::detect(source, None))?;
        OpenApiParser::new(document).parse()
    }
}

impl Default for FileOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}
