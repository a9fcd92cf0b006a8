//! Formatter post-processor for written Python artifacts

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::generation::{Artifact, GenerationContext, GenerationError, PostProcessor};
use crate::infrastructure::shell::{CommandExecutor, ProcessCommandExecutor};

/// An external formatter invocation; file names are appended to `args`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pub program: String,
    pub args: Vec<String>,
}

impl Formatter {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    /// `black` followed by `isort` in black-compatible mode
    pub fn python_defaults() -> Vec<Formatter> {
        vec![
            Formatter::new("black", &["--quiet"]),
            Formatter::new("isort", &["--profile", "black", "--quiet"]),
        ]
    }
}

/// Runs formatters over the written `.py` files and reloads their content.
///
/// Formatter failures are logged and never abort the run.
pub struct FormatterPostProcessor {
    executor: Arc<dyn CommandExecutor>,
    formatters: Vec<Formatter>,
}

impl FormatterPostProcessor {
    pub fn new(executor: Arc<dyn CommandExecutor>, formatters: Vec<Formatter>) -> Self {
        Self {
            executor,
            formatters,
        }
    }

    async fn run(&self, formatter: &Formatter, working_dir: &Path, files: &[String]) {
        let mut args = formatter.args.clone();
        args.extend(files.iter().cloned());

        tracing::info!(program = %formatter.program, files = files.len(), "Running formatter");
        match self
            .executor
            .execute(&formatter.program, &args, working_dir)
            .await
        {
            Ok(result) if result.is_success() => {
                tracing::debug!(program = %formatter.program, "Formatter completed");
                if !result.stdout.trim().is_empty() {
                    tracing::debug!(
                        program = %formatter.program,
                        output = %result.stdout.trim(),
                        "Formatter output"
                    );
                }
            }
            Ok(result) => {
                tracing::warn!(
                    program = %formatter.program,
                    exit_code = result.exit_code,
                    stderr = %result.stderr.trim(),
                    "Formatter failed, keeping unformatted output"
                );
            }
            Err(e) => {
                tracing::warn!(
                    program = %formatter.program,
                    error = %e,
                    "Formatter unavailable, keeping unformatted output"
                );
            }
        }
    }
}

impl Default for FormatterPostProcessor {
    fn default() -> Self {
        Self::new(
            Arc::new(ProcessCommandExecutor::new()),
            Formatter::python_defaults(),
        )
    }
}

fn is_python(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("py")
}

#[async_trait]
impl PostProcessor for FormatterPostProcessor {
    async fn process(
        &self,
        mut artifacts: Vec<Artifact>,
        context: &GenerationContext,
    ) -> Result<Vec<Artifact>, GenerationError> {
        if !context.format {
            return Ok(artifacts);
        }

        let targets: Vec<&Artifact> = artifacts
            .iter()
            .filter(|artifact| is_python(&artifact.path) && !artifact.content.trim().is_empty())
            .collect();
        let Some(working_dir) = targets
            .first()
            .and_then(|artifact| artifact.path.parent())
            .map(PathBuf::from)
        else {
            return Ok(artifacts);
        };
        let files: Vec<String> = targets
            .iter()
            .filter_map(|artifact| artifact.path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();

        for formatter in &self.formatters {
            self.run(formatter, &working_dir, &files).await;
        }

        for artifact in artifacts.iter_mut().filter(|artifact| is_python(&artifact.path)) {
            match tokio::fs::read_to_string(&artifact.path).await {
                Ok(content) => artifact.content = content,
                Err(e) => tracing::warn!(
                    path = %artifact.path.display(),
                    error = %e,
                    "Could not reload formatted artifact"
                ),
            }
        }

        Ok(artifacts)
    }
}
