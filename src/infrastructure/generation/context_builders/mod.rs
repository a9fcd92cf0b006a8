//! Language-specific context builders

pub mod python;

pub use python::PythonContextBuilder;
