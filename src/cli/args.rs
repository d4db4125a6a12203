//! CLI argument definitions using clap derive

use crate::error::{ScaffoldError, ScaffoldResult};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Environment variable holding the base verbosity level
pub const VERBOSE_ENV: &str = "VIDSCAFFOLD_VERBOSE";

/// vidscaffold - idempotent video-converter project scaffolding
///
/// Sets up a Node.js API (Express, Sequelize, Bull + ffmpeg worker) and a
/// React client. Finished steps are remembered, so reruns only do what is
/// missing or out of date.
#[derive(Parser, Debug)]
#[command(name = "vidscaffold")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Remove the backend and frontend directories before provisioning
    #[arg(long)]
    pub clean: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Workspace root the targets are created in [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Template directory [default: templates shipped with vidscaffold]
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "VIDSCAFFOLD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verify prerequisites only
    #[arg(long, conflicts_with_all = ["dry_run", "clean"])]
    pub check: bool,

    /// Show which steps are cached or pending without running anything
    #[arg(long, conflicts_with = "clean")]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

impl Cli {
    /// Effective verbosity: the environment sets the base, each `-v` adds one.
    pub fn verbosity(&self, env_value: Option<&str>) -> ScaffoldResult<u8> {
        let base = match env_value.map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<u64>()
                .map(|level| level.min(u8::MAX as u64) as u8)
                .map_err(|_| ScaffoldError::InvalidVerbosity(raw.to_string()))?,
        };
        Ok(base.saturating_add(self.verbose))
    }
}
