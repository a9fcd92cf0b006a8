//! Filesystem-based output service implementation

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::{ApplicationError, OutputService};
use crate::generation::Artifact;

/// Output service that writes artifacts to the filesystem
pub struct FileSystemOutputService;

impl FileSystemOutputService {
    pub fn new() -> Self {
        Self
    }
}

fn output_error(action: &str, path: &Path, error: std::io::Error) -> ApplicationError {
    tracing::error!(path = %path.display(), error = %error, "Failed to {action}");
    ApplicationError::OutputError(format!("Failed to {action} {}: {error}", path.display()))
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn write_artifacts(&self, artifacts: &[Artifact]) -> Result<(), ApplicationError> {
        for artifact in artifacts {
            if let Some(parent) = artifact.path.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| output_error("create directory", parent, e))?;
            }

            let mut file = fs::File::create(&artifact.path)
                .await
                .map_err(|e| output_error("create file", &artifact.path, e))?;
            file.write_all(artifact.content.as_bytes())
                .await
                .map_err(|e| output_error("write file", &artifact.path, e))?;
            file.flush()
                .await
                .map_err(|e| output_error("flush file", &artifact.path, e))?;

            tracing::debug!(path = %artifact.path.display(), bytes = artifact.content.len(), "Wrote artifact");
        }

        Ok(())
    }

    async fn ensure_directory(&self, path: &Path) -> Result<(), ApplicationError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| output_error("create directory", path, e))
    }
}

impl Default for FileSystemOutputService {
    fn default() -> Self {
        Self::new()
    }
}
