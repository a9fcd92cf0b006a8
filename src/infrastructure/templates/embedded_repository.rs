//! Templates embedded in the binary at compile time

use async_trait::async_trait;
use rust_embed::RustEmbed;
use tracing::debug;

use super::{
    TEMPLATE_NAMES, TemplateError, TemplateFile, TemplateLoader, TemplateSet, TemplateSource,
};

/// Container for all templates embedded at compile time
#[derive(RustEmbed)]
#[folder = "templates/python/"]
struct EmbeddedTemplates;

/// Template repository backed by embedded templates
pub struct EmbeddedTemplateRepository;

impl EmbeddedTemplateRepository {
    pub fn new() -> Self {
        Self
    }

    /// Look up one embedded template by file name
    pub fn get(&self, name: &str) -> Result<TemplateFile, TemplateError> {
        let file = EmbeddedTemplates::get(name).ok_or_else(|| TemplateError::not_found(name))?;
        let content = std::str::from_utf8(file.data.as_ref())
            .map_err(|_| TemplateError::InvalidEncoding(name.to_string()))?;

        Ok(TemplateFile {
            name: name.to_string(),
            content: content.to_string(),
            source: TemplateSource::Embedded,
        })
    }

    /// All embedded template names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = EmbeddedTemplates::iter()
            .map(|name| name.to_string())
            .collect();
        names.sort();
        names
    }
}

impl Default for EmbeddedTemplateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateLoader for EmbeddedTemplateRepository {
    async fn load(&self) -> Result<TemplateSet, TemplateError> {
        let mut set = TemplateSet::default();
        for name in TEMPLATE_NAMES {
            set.insert(self.get(name)?);
        }
        debug!(templates = set.files.len(), "Loaded embedded templates");
        Ok(set)
    }
}
