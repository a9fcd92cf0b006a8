//! HTTP-based OpenAPI document loader

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::parser::{DocumentFormat, OpenApiParser, decode_document};
use crate::generation::{GenerationError, OpenApiLoader};
use crate::infrastructure::openapi::OpenApiContext;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Loads OpenAPI documents from HTTP/HTTPS URLs
pub struct HttpOpenApiLoader {
    client: Client,
}

impl HttpOpenApiLoader {
    pub fn new() -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| GenerationError::LoadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl OpenApiLoader for HttpOpenApiLoader {
    async fn load(&self, source: &str) -> Result<OpenApiContext, GenerationError> {
        if !source.starts_with("http://") && !source.starts_with("https://") {
            return Err(GenerationError::LoadError(format!(
                "HttpOpenApiLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        let response = self.client.get(source).send().await.map_err(|e| {
            tracing::error!(source = %source, error = %e, "Failed to fetch OpenAPI document");
            GenerationError::LoadError(format!("Failed to fetch OpenAPI document from {source}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::LoadError(format!(
                "HTTP {status} when fetching {source}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let content = response.text().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to read response body: {e}"))
        })?;

        let format = DocumentFormat::detect(source, content_type.as_deref());
        tracing::debug!(source = %source, format = ?format, bytes = content.len(), "Fetched OpenAPI document");

        let document = decode_document(&content, format)?;
        OpenApiParser::new(document).parse()
    }
}
