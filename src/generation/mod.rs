//! Generation domain module - resolves an OpenAPI document into an ordered
//! plan of enums, models and operations, then drives rendering.
//!
//! The resolution half (schema resolver, operation synthesizer, visibility
//! split, ordering) is a synchronous, deterministic transform. Rendering and
//! post-processing sit behind async ports implemented in `infrastructure`.

pub mod context;
pub mod errors;
pub mod imports;
pub mod ir;
pub mod naming;
pub mod operation_synthesizer;
pub mod orchestrator;
pub mod ordering;
pub mod registry;
pub mod rules;
pub mod sanitizers;
pub mod schema_resolver;
pub mod traits;
pub mod types;
pub mod variants;

pub use context::*;
pub use errors::*;
pub use ir::*;
pub use operation_synthesizer::OperationFilter;
pub use orchestrator::*;
pub use traits::*;
pub use types::*;
