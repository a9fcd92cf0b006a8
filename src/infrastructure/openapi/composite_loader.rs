//! Composite OpenAPI loader that picks a strategy per source

use async_trait::async_trait;

use super::{FileOpenApiLoader, HttpOpenApiLoader};
use crate::generation::{GenerationError, OpenApiLoader};
use crate::infrastructure::openapi::OpenApiContext;

/// Dispatches URLs to the HTTP loader and everything else to the file loader
pub struct CompositeOpenApiLoader {
    http: Box<dyn OpenApiLoader>,
    file: Box<dyn OpenApiLoader>,
}

impl CompositeOpenApiLoader {
    pub fn new() -> Result<Self, GenerationError> {
        Ok(Self {
            http: Box::new(HttpOpenApiLoader::new()?),
            file: Box::new(FileOpenApiLoader::new()),
        })
    }
}

#[async_trait]
impl OpenApiLoader for CompositeOpenApiLoader {
    async fn load(&self, source: &str) -> Result<OpenApiContext, GenerationError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            tracing::debug!(source = %source, "Loading OpenAPI document over HTTP");
            self.http.load(source).await
        } else {
            tracing::debug!(source = %source, "Loading OpenAPI document from file");
            self.file.load(source).await
        }
    }
}
