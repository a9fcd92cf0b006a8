//! Filesystem-based template loader
//!
//! Loads template overrides from a directory, typically specified via the
//! --template-dir CLI flag. Templates the directory does not provide fall back
//! to the embedded ones.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{
    EmbeddedTemplateRepository, TEMPLATE_NAMES, TemplateError, TemplateFile, TemplateLoader,
    TemplateSet, TemplateSource,
};

/// Template loader reading overrides from a directory
pub struct FileSystemTemplateLoader {
    dir: PathBuf,
    embedded: EmbeddedTemplateRepository,
}

impl FileSystemTemplateLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            embedded: EmbeddedTemplateRepository::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TemplateLoader for FileSystemTemplateLoader {
    async fn load(&self) -> Result<TemplateSet, TemplateError> {
        if !fs::try_exists(&self.dir).await? {
            return Err(TemplateError::not_found(self.dir.display().to_string()));
        }

        let mut set = self.embedded.load().await?;
        for name in TEMPLATE_NAMES {
            let path = self.dir.join(name);
            if !fs::try_exists(&path).await? {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            tracing::info!(template = %name, path = %path.display(), "Using template override");
            set.insert(TemplateFile {
                name: name.to_string(),
                content,
                source: TemplateSource::FileSystem(path),
            });
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::templates::MODELS_TEMPLATE;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_override_replaces_only_provided_templates() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MODELS_TEMPLATE), "# custom models\n").unwrap();

        let set = FileSystemTemplateLoader::new(dir.path()).load().await.unwrap();

        let models = set.get(MODELS_TEMPLATE).unwrap();
        assert_eq!(models.content, "# custom models\n");
        assert_eq!(
            models.source,
            TemplateSource::FileSystem(dir.path().join(MODELS_TEMPLATE))
        );
        assert_eq!(set.files.len(), TEMPLATE_NAMES.len());
        assert!(set
            .files
            .iter()
            .filter(|file| file.name != MODELS_TEMPLATE)
            .all(|file| file.source == TemplateSource::Embedded));
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let loader = FileSystemTemplateLoader::new("/nonexistent/templates");

        assert!(matches!(
            loader.load().await,
            Err(TemplateError::TemplateNotFound(_))
        ));
    }
}
