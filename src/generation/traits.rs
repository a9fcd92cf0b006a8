//! Port interfaces for the generation domain

use async_trait::async_trait;

use crate::generation::{
    Artifact, GenerationContext, GenerationError, GenerationPlan, RenderContext,
};
use crate::infrastructure::openapi::OpenApiContext;

/// Builds the template context from a finished plan
#[async_trait]
pub trait ContextBuilder: Send + Sync {
    async fn build(
        &self,
        plan: &GenerationPlan,
        context: &GenerationContext,
    ) -> Result<RenderContext, GenerationError>;
}

/// Renders the models, client and package-marker artifacts
#[async_trait]
pub trait TemplateRenderingStrategy: Send + Sync {
    async fn render(
        &self,
        render_context: &RenderContext,
        context: &GenerationContext,
    ) -> Result<Vec<Artifact>, GenerationError>;
}

/// Post-processes artifacts that were already written to disk
#[async_trait]
pub trait PostProcessor: Send + Sync {
    async fn process(
        &self,
        artifacts: Vec<Artifact>,
        context: &GenerationContext,
    ) -> Result<Vec<Artifact>, GenerationError>;
}

/// Loads OpenAPI documents
#[async_trait]
pub trait OpenApiLoader: Send + Sync {
    /// Load a document from a path or URL
    async fn load(&self, source: &str) -> Result<OpenApiContext, GenerationError>;
}
