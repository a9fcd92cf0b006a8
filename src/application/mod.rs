//! Application layer - orchestrates use cases and coordinates between domains

pub mod dto;
pub mod errors;
pub mod generate_client;
pub mod inspect_plan;
pub mod traits;

pub use dto::*;
pub use errors::*;
pub use generate_client::GenerateClientUseCase;
pub use inspect_plan::InspectPlanUseCase;
pub use traits::*;
