//! Template types

use std::path::PathBuf;

/// Shared macros imported by the other templates
pub const MACROS_TEMPLATE: &str = "macros.tera";
/// Models artifact template
pub const MODELS_TEMPLATE: &str = "models.py.tera";
pub const CLIENT_SYNC_TEMPLATE: &str = "client_sync.py.tera";
pub const CLIENT_ASYNC_TEMPLATE: &str = "client_async.py.tera";

/// Every template a complete set provides
pub const TEMPLATE_NAMES: [&str; 4] = [
    MACROS_TEMPLATE,
    MODELS_TEMPLATE,
    CLIENT_SYNC_TEMPLATE,
    CLIENT_ASYNC_TEMPLATE,
];

/// Where a template file was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Embedded,
    FileSystem(PathBuf),
}

/// A single named template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub name: String,
    pub content: String,
    pub source: TemplateSource,
}

/// The templates used for one render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    pub files: Vec<TemplateFile>,
}

impl TemplateSet {
    pub fn get(&self, name: &str) -> Option<&TemplateFile> {
        self.files.iter().find(|file| file.name == name)
    }

    /// Replace or add a template
    pub fn insert(&mut self, file: TemplateFile) {
        match self.files.iter_mut().find(|existing| existing.name == file.name) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|file| file.name.as_str())
    }
}
