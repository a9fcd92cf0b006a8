//! Configuration file support.
//!
//! A `pyclientgen.toml` file holds the same settings as the `generate` flags.
//! Flags given on the command line override values from the file.
//!
//! ```toml
//! input = "openapi/petstore.yaml"
//! output = "clients/petstore"
//! mode = "async"
//! base-url = "https://petstore3.swagger.io/api/v3"
//! schema-module = "models"
//! client-module = "client"
//! format = true
//! exclude-operations = ["deletePet"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::application::GenerateClientRequest;
use crate::core::{Error, Result};
use crate::generation::{ClientMode, DEFAULT_CLIENT_MODULE, DEFAULT_SCHEMA_MODULE};

/// Settings for a `generate` run. Every field is optional so a file and the
/// command line can each supply part of it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    pub input: Option<String>,
    pub output: Option<PathBuf>,
    pub mode: Option<ClientMode>,
    pub base_url: Option<Url>,
    pub schema_module: Option<String>,
    pub client_module: Option<String>,
    pub template_dir: Option<PathBuf>,
    pub format: Option<bool>,
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a configuration file. Relative `input`, `output` and
    /// `template-dir` values resolve against the file's directory.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to read configuration");
            e
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");

        match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => Ok(config.relative_to(base)),
            _ => Ok(config),
        }
    }

    fn relative_to(mut self, base: &Path) -> Self {
        if let Some(input) = &self.input {
            if !is_url(input) && Path::new(input).is_relative() {
                self.input = Some(base.join(input).to_string_lossy().into_owned());
            }
        }
        if let Some(output) = &self.output {
            if output.is_relative() {
                self.output = Some(base.join(output));
            }
        }
        if let Some(template_dir) = &self.template_dir {
            if template_dir.is_relative() {
                self.template_dir = Some(base.join(template_dir));
            }
        }
        self
    }

    /// Layer `overrides` on top of `self`; set values and non-empty lists win
    pub fn merge(self, overrides: Config) -> Config {
        fn pick<T>(base: Vec<T>, over: Vec<T>) -> Vec<T> {
            if over.is_empty() { base } else { over }
        }

        Config {
            input: overrides.input.or(self.input),
            output: overrides.output.or(self.output),
            mode: overrides.mode.or(self.mode),
            base_url: overrides.base_url.or(self.base_url),
            schema_module: overrides.schema_module.or(self.schema_module),
            client_module: overrides.client_module.or(self.client_module),
            template_dir: overrides.template_dir.or(self.template_dir),
            format: overrides.format.or(self.format),
            include_operations: pick(self.include_operations, overrides.include_operations),
            exclude_operations: pick(self.exclude_operations, overrides.exclude_operations),
        }
    }

    /// Build the use-case request, filling defaults for unset values
    pub fn into_request(self) -> Result<GenerateClientRequest> {
        let source = self
            .input
            .ok_or_else(|| Error::config("no OpenAPI document given"))?;
        let output_dir = self
            .output
            .ok_or_else(|| Error::config("no output directory given"))?;

        Ok(GenerateClientRequest {
            source,
            output_dir,
            mode: self.mode.unwrap_or_default(),
            base_url: self.base_url.map(String::from),
            schema_module: self
                .schema_module
                .unwrap_or_else(|| DEFAULT_SCHEMA_MODULE.to_string()),
            client_module: self
                .client_module
                .unwrap_or_else(|| DEFAULT_CLIENT_MODULE.to_string()),
            include_operations: self.include_operations,
            exclude_operations: self.exclude_operations,
            format: self.format.unwrap_or(false),
        })
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
