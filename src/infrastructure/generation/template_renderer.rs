//! Tera-based template renderer implementation

use async_trait::async_trait;
use std::error::Error as _;
use std::sync::Arc;
use tera::{Context, Tera};

use crate::generation::{
    Artifact, GenerationContext, GenerationError, RenderContext, TemplateRenderingStrategy,
};
use crate::infrastructure::templates::{
    EmbeddedTemplateRepository, MODELS_TEMPLATE, TemplateLoader, TemplateSet,
};

/// Name of the package marker written next to the generated modules
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Tera-based template renderer
pub struct TeraTemplateRenderer {
    loader: Arc<dyn TemplateLoader>,
}

impl TeraTemplateRenderer {
    pub fn new(loader: Arc<dyn TemplateLoader>) -> Self {
        Self { loader }
    }

    /// Renderer over the templates compiled into the binary
    pub fn embedded() -> Self {
        Self::new(Arc::new(EmbeddedTemplateRepository::new()))
    }

    fn engine(set: &TemplateSet) -> Result<Tera, GenerationError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(
            set.files
                .iter()
                .map(|file| (file.name.as_str(), file.content.as_str())),
        )
        .map_err(|e| GenerationError::RenderError(describe(&e)))?;
        Ok(tera)
    }

    fn render_one(
        tera: &Tera,
        name: &str,
        context: &Context,
    ) -> Result<String, GenerationError> {
        let mut rendered = tera.render(name, context).map_err(|e| {
            GenerationError::RenderError(format!("Failed to render {name}: {}", describe(&e)))
        })?;
        let trimmed = rendered.trim_end().len();
        rendered.truncate(trimmed);
        rendered.push('\n');
        Ok(rendered)
    }
}

impl Default for TeraTemplateRenderer {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Flatten a Tera error and its sources into one line
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl TemplateRenderingStrategy for TeraTemplateRenderer {
    async fn render(
        &self,
        render_context: &RenderContext,
        context: &GenerationContext,
    ) -> Result<Vec<Artifact>, GenerationError> {
        let set = self.loader.load().await?;
        let tera = Self::engine(&set)?;
        let tera_context = Context::from_value(render_context.data.clone())?;

        let models = Self::render_one(&tera, MODELS_TEMPLATE, &tera_context)?;
        let client = Self::render_one(&tera, context.mode.client_template(), &tera_context)?;

        tracing::debug!(
            mode = %context.mode,
            models_bytes = models.len(),
            client_bytes = client.len(),
            "Rendered templates"
        );

        Ok(vec![
            Artifact::new(format!("{}.py", context.modules.schema), models),
            Artifact::new(format!("{}.py", context.modules.client), client),
            Artifact::new(PACKAGE_MARKER, ""),
        ])
    }
}
