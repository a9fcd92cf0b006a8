//! Template loading ports

use async_trait::async_trait;

use crate::infrastructure::templates::{TemplateError, TemplateSet};

/// Produces the template set used by the renderer
#[async_trait]
pub trait TemplateLoader: Send + Sync {
    async fn load(&self) -> Result<TemplateSet, TemplateError>;
}
