//! pyclientgen - generate pydantic models and `requests`/`aiohttp` client
//! functions from OpenAPI documents.
//!
//! The crate is layered the same way as the CLI pipeline:
//!
//! - [`generation`] resolves a parsed document into an ordered plan of enums,
//!   models and operations, and defines the ports the outer layers implement;
//! - [`infrastructure`] holds the adapters: document loaders, the Tera
//!   renderer, the formatter post-processor and the filesystem output;
//! - [`application`] wires them into the `generate` and `inspect` use cases;
//! - [`core`] carries the configuration file support.
#![deny(unsafe_code)]

pub mod application;
pub mod core;
pub mod generation;
pub mod infrastructure;
