//! vidscaffold - idempotent video-converter project scaffolding
//!
//! CLI entry point: logging, configuration, then the provisioning run.

use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vidscaffold::cli::{Cli, LogFormat, VERBOSE_ENV};
use vidscaffold::config::ConfigManager;
use vidscaffold::error::{ScaffoldError, ScaffoldResult};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8, format: LogFormat) {
    // 0 = warn (progress output only), 1 = info, 2 = debug, 3+ = trace
    let filter = match verbosity {
        0 => EnvFilter::new("vidscaffold=warn"),
        1 => EnvFilter::new("vidscaffold=info"),
        2 => EnvFilter::new("vidscaffold=debug"),
        _ => EnvFilter::new("vidscaffold=trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn workspace_root(cli: &Cli) -> ScaffoldResult<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| ScaffoldError::io("getting current directory", e))?;
    Ok(match cli.root {
        Some(ref root) if root.is_absolute() => root.clone(),
        Some(ref root) => cwd.join(root),
        None => cwd,
    })
}

async fn run() -> ScaffoldResult<()> {
    let cli = Cli::parse();

    let env_verbosity = std::env::var(VERBOSE_ENV).ok();
    let verbosity = cli.verbosity(env_verbosity.as_deref())?;
    init_logging(verbosity, cli.log_format);

    let root = workspace_root(&cli)?;
    debug!("Workspace root: {}", root.display());

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::discover(&root),
    };
    debug!("Using config: {}", config_manager.path().display());
    let config = config_manager.load().await?;

    vidscaffold::cli::commands::provision(&cli, &config, &root).await
}
