//! Core types for the generation domain

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Call model of the generated request functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    /// One blocking `requests` call per function
    #[default]
    Sync,
    /// One `aiohttp` session scoped to each function call
    Async,
}

impl ClientMode {
    /// Get the display name for this mode
    pub fn display_name(&self) -> &'static str {
        match self {
            ClientMode::Sync => "synchronous",
            ClientMode::Async => "asynchronous",
        }
    }

    /// Name of the client template rendered for this mode
    pub fn client_template(&self) -> &'static str {
        match self {
            ClientMode::Sync => "client_sync.py.tera",
            ClientMode::Async => "client_async.py.tera",
        }
    }

    /// Python HTTP library the generated client imports
    pub fn http_library(&self) -> &'static str {
        match self {
            ClientMode::Sync => "requests",
            ClientMode::Async => "aiohttp",
        }
    }
}

impl fmt::Display for ClientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMode::Sync => write!(f, "sync"),
            ClientMode::Async => write!(f, "async"),
        }
    }
}

impl FromStr for ClientMode {
    type Err = crate::generation::GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sync" | "synchronous" | "requests" => Ok(ClientMode::Sync),
            "async" | "asynchronous" | "aiohttp" => Ok(ClientMode::Async),
            _ => Err(crate::generation::GenerationError::InvalidConfiguration(
                format!("unknown client mode '{s}', expected 'sync' or 'async'"),
            )),
        }
    }
}

/// HTTP methods supported by OpenAPI path items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Get all HTTP methods as an array
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Options,
            HttpMethod::Head,
            HttpMethod::Patch,
            HttpMethod::Trace,
        ]
    }

    /// Lower-case method token as it appears in path items
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = crate::generation::GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::all()
            .iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                crate::generation::GenerationError::ValidationError(format!(
                    "unknown HTTP method '{s}'"
                ))
            })
    }
}

/// Generated artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Result of generation
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub artifacts: Vec<Artifact>,
    pub plan: crate::generation::GenerationPlan,
}
