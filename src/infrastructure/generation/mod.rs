//! Generation infrastructure implementations

pub mod context_builders;
pub mod post_processor;
pub mod template_renderer;

pub use context_builders::PythonContextBuilder;
pub use post_processor::{Formatter, FormatterPostProcessor};
pub use template_renderer::{PACKAGE_MARKER, TeraTemplateRenderer};
