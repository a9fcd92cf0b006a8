//! Use case for generating a Python client package

use crate::application::{
    ApplicationError, GenerateClientRequest, GenerateClientResponse, OutputService,
};
use crate::generation::{GenerationOrchestrator, OpenApiLoader, PostProcessor};
use std::sync::Arc;

/// Use case for generating a Python client package
pub struct GenerateClientUseCase {
    openapi_loader: Arc<dyn OpenApiLoader>,
    generation_orchestrator: Arc<GenerationOrchestrator>,
    post_processor: Arc<dyn PostProcessor>,
    output_service: Arc<dyn OutputService>,
}

impl GenerateClientUseCase {
    pub fn new(
        openapi_loader: Arc<dyn OpenApiLoader>,
        generation_orchestrator: Arc<GenerationOrchestrator>,
        post_processor: Arc<dyn PostProcessor>,
        output_service: Arc<dyn OutputService>,
    ) -> Self {
        Self {
            openapi_loader,
            generation_orchestrator,
            post_processor,
            output_service,
        }
    }

    pub async fn execute(
        &self,
        request: GenerateClientRequest,
    ) -> Result<GenerateClientResponse, ApplicationError> {
        // 1. Validate request
        request.validate()?;

        // 2. Load the document; nothing is resolved if this fails
        let document = self.openapi_loader.load(&request.source).await?;

        // 3. Resolve and render
        let context = request.generation_context();
        let result = self
            .generation_orchestrator
            .generate(&document, &context)
            .await?;

        // 4. Ensure output directory exists
        self.output_service
            .ensure_directory(&request.output_dir)
            .await?;

        // 5. Prepend output directory to artifact paths and write
        let mut output_artifacts = result.artifacts;
        for artifact in &mut output_artifacts {
            artifact.path = request.output_dir.join(&artifact.path);
        }

        self.output_service
            .write_artifacts(&output_artifacts)
            .await?;

        // 6. Format the written files in place
        let output_artifacts = self
            .post_processor
            .process(output_artifacts, &context)
            .await?;

        tracing::info!(
            output = %request.output_dir.display(),
            files = output_artifacts.len(),
            mode = %context.mode,
            "Generated Python client"
        );

        Ok(GenerateClientResponse {
            artifacts_count: output_artifacts.len(),
            output_path: request.output_dir,
            files: output_artifacts
                .into_iter()
                .map(|artifact| artifact.path)
                .collect(),
            enums: result.plan.enums.len(),
            models: result.plan.models.len(),
            operations: result.plan.operations.len(),
        })
    }
}
