//! Use case for resolving a document into its generation plan without rendering

use std::sync::Arc;

use crate::application::{ApplicationError, InspectRequest};
use crate::generation::{GenerationPlan, OpenApiLoader, build_plan};

pub struct InspectPlanUseCase {
    openapi_loader: Arc<dyn OpenApiLoader>,
}

impl InspectPlanUseCase {
    pub fn new(openapi_loader: Arc<dyn OpenApiLoader>) -> Self {
        Self { openapi_loader }
    }

    pub async fn execute(&self, request: InspectRequest) -> Result<GenerationPlan, ApplicationError> {
        request.validate()?;

        let document = self.openapi_loader.load(&request.source).await?;
        let plan = build_plan(&document, &request.generation_context())?;

        Ok(plan)
    }
}
