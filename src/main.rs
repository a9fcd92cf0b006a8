//! pyclientgen CLI entrypoint
//! Parses command-line arguments and dispatches to the generation use cases.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use pyclientgen::{
    application::{GenerateClientUseCase, InspectPlanUseCase, InspectRequest},
    core::Config,
    generation::{ClientMode, GenerationOrchestrator},
    infrastructure::{
        generation::{FormatterPostProcessor, PythonContextBuilder, TeraTemplateRenderer},
        openapi::CompositeOpenApiLoader,
        output::FileSystemOutputService,
        templates::{EmbeddedTemplateRepository, FileSystemTemplateLoader, TemplateLoader},
    },
};
use std::path::PathBuf;
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "pyclientgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Mutually exclusive call model flags
#[derive(clap::Args, Debug, Default)]
pub struct ModeArgs {
    /// Generate blocking functions using requests (default)
    #[arg(long = "sync", conflicts_with = "async_mode")]
    pub sync_mode: bool,
    /// Generate coroutines using aiohttp
    #[arg(long = "async")]
    pub async_mode: bool,
}

impl ModeArgs {
    fn mode(&self) -> Option<ClientMode> {
        match (self.sync_mode, self.async_mode) {
            (_, true) => Some(ClientMode::Async),
            (true, false) => Some(ClientMode::Sync),
            (false, false) => None,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate a Python client package from an OpenAPI document
    Generate {
        /// Path or http(s) URL of the OpenAPI document (JSON or YAML)
        input: Option<String>,
        /// Directory the package is written to
        output: Option<PathBuf>,
        #[command(flatten)]
        mode: ModeArgs,
        /// Base URL for the generated client (overrides servers[0].url)
        #[arg(long)]
        base_url: Option<Url>,
        /// Module name of the models file (default: schema)
        #[arg(long)]
        schema_module: Option<String>,
        /// Module name of the client file (default: api)
        #[arg(long)]
        client_module: Option<String>,
        /// Directory with custom templates overriding the embedded ones
        #[arg(long)]
        template_dir: Option<PathBuf>,
        /// Run black and isort over the generated files
        #[arg(long)]
        format: bool,
        /// Only generate these operation ids
        #[arg(long = "include-operation", value_name = "OPERATION_ID")]
        include_operations: Vec<String>,
        /// Skip these operation ids
        #[arg(long = "exclude-operation", value_name = "OPERATION_ID")]
        exclude_operations: Vec<String>,
        /// TOML file with default settings
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the resolved enums, models and operations as JSON
    Inspect {
        /// Path or http(s) URL of the OpenAPI document (JSON or YAML)
        input: String,
        #[command(flatten)]
        mode: ModeArgs,
        /// Base URL for the generated client (overrides servers[0].url)
        #[arg(long)]
        base_url: Option<Url>,
        /// Only include these operation ids
        #[arg(long = "include-operation", value_name = "OPERATION_ID")]
        include_operations: Vec<String>,
        /// Skip these operation ids
        #[arg(long = "exclude-operation", value_name = "OPERATION_ID")]
        exclude_operations: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `inspect` output stays parseable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            mode,
            base_url,
            schema_module,
            client_module,
            template_dir,
            format,
            include_operations,
            exclude_operations,
            config,
        } => {
            let flags = Config {
                input,
                output,
                mode: mode.mode(),
                base_url,
                schema_module,
                client_module,
                template_dir,
                format: format.then_some(true),
                include_operations,
                exclude_operations,
            };
            generate(config, flags).await
        }
        Commands::Inspect {
            input,
            mode,
            base_url,
            include_operations,
            exclude_operations,
        } => {
            let request = InspectRequest {
                source: input,
                mode: mode.mode().unwrap_or_default(),
                base_url: base_url.map(String::from),
                include_operations,
                exclude_operations,
            };
            inspect(request).await
        }
    }
}

/// Generate a client package from the merged file and flag settings
async fn generate(config_path: Option<PathBuf>, flags: Config) -> anyhow::Result<()> {
    let file_config = match &config_path {
        Some(path) => Config::load(path)
            .await
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    let config = file_config.merge(flags);
    let template_loader: Arc<dyn TemplateLoader> = match &config.template_dir {
        Some(dir) => {
            info!(path = %dir.display(), "Using custom templates");
            Arc::new(FileSystemTemplateLoader::new(dir))
        }
        None => Arc::new(EmbeddedTemplateRepository::new()),
    };
    let request = config
        .into_request()
        .context("Incomplete generate settings")?;

    info!(
        source = %request.source,
        output = %request.output_dir.display(),
        mode = %request.mode,
        "Generating Python client"
    );

    let loader = CompositeOpenApiLoader::new().context("Failed to initialize OpenAPI loader")?;
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(PythonContextBuilder::new()),
        Arc::new(TeraTemplateRenderer::new(template_loader)),
    );
    let use_case = GenerateClientUseCase::new(
        Arc::new(loader),
        Arc::new(orchestrator),
        Arc::new(FormatterPostProcessor::default()),
        Arc::new(FileSystemOutputService::new()),
    );

    let response = use_case
        .execute(request)
        .await
        .context("Failed to generate client")?;

    info!(
        enums = response.enums,
        models = response.models,
        operations = response.operations,
        "✅ Client written to {}",
        response.output_path.display()
    );
    for file in &response.files {
        println!("{}", file.display());
    }

    Ok(())
}

/// Print the resolved plan without rendering anything
async fn inspect(request: InspectRequest) -> anyhow::Result<()> {
    let loader = CompositeOpenApiLoader::new().context("Failed to initialize OpenAPI loader")?;
    let plan = InspectPlanUseCase::new(Arc::new(loader))
        .execute(request)
        .await
        .context("Failed to resolve OpenAPI document")?;

    let json = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
    println!("{json}");
    Ok(())
}
