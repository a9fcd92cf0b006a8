//! Generation orchestration - coordinates the generation workflow

use std::sync::Arc;

use crate::generation::imports::{client_imports, model_imports};
use crate::generation::operation_synthesizer::OperationSynthesizer;
use crate::generation::ordering::order_models;
use crate::generation::registry::NameRegistry;
use crate::generation::schema_resolver::SchemaResolver;
use crate::generation::variants::{rewrite_operation, split_visibility};
use crate::generation::{
    ContextBuilder, GenerationContext, GenerationError, GenerationPlan, GenerationResult, rules,
    TemplateRenderingStrategy,
};
use crate::infrastructure::openapi::OpenApiContext;

/// Resolve a parsed document into an ordered plan.
///
/// Pure and synchronous: the first unrecoverable resolution error aborts the
/// run and nothing partial is returned.
pub fn build_plan(
    document: &OpenApiContext,
    context: &GenerationContext,
) -> Result<GenerationPlan, GenerationError> {
    context.validate()?;

    let mut names = NameRegistry::new();
    let mut resolver = SchemaResolver::new(&document.schemas);
    let resolved = resolver.resolve(&mut names)?;
    tracing::debug!(
        models = resolved.models.len(),
        referenced = resolved.referenced.len(),
        "Resolved component schemas"
    );

    let synthesized = OperationSynthesizer::new(
        &document.operations,
        context.mode,
        context.filter.clone(),
    )
    .synthesize(&mut resolver, &mut names)?;

    let mut models = resolved.models;
    models.extend(synthesized.query_models);

    let split = split_visibility(models, &mut names)?;
    let mut operations = synthesized.operations;
    for operation in &mut operations {
        rewrite_operation(operation, &split.split);
    }

    let models = order_models(split.models);
    let enums = resolver.into_enums();
    let base_url = rules::select_base_url(context.base_url.as_deref(), document.server_url());

    tracing::info!(
        enums = enums.len(),
        models = models.len(),
        operations = operations.len(),
        mode = %context.mode,
        "Generation plan ready"
    );

    Ok(GenerationPlan {
        base_url,
        mode: context.mode,
        model_imports: model_imports(&enums, &models),
        client_imports: client_imports(&operations),
        enums,
        models,
        operations,
    })
}

/// Orchestrates the code generation workflow
pub struct GenerationOrchestrator {
    context_builder: Arc<dyn ContextBuilder>,
    template_renderer: Arc<dyn TemplateRenderingStrategy>,
}

impl GenerationOrchestrator {
    pub fn new(
        context_builder: Arc<dyn ContextBuilder>,
        template_renderer: Arc<dyn TemplateRenderingStrategy>,
    ) -> Self {
        Self {
            context_builder,
            template_renderer,
        }
    }

    /// Plan, build the template context, then render the artifacts
    pub async fn generate(
        &self,
        document: &OpenApiContext,
        context: &GenerationContext,
    ) -> Result<GenerationResult, GenerationError> {
        let plan = build_plan(document, context)?;

        let render_context = self.context_builder.build(&plan, context).await?;
        let artifacts = self
            .template_renderer
            .render(&render_context, context)
            .await?;

        tracing::debug!(artifacts = artifacts.len(), "Rendered artifacts");

        Ok(GenerationResult { artifacts, plan })
    }
}
