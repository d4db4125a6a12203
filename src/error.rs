//! Error types for vidscaffold
//!
//! All modules use `ScaffoldResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vidscaffold operations
pub type ScaffoldResult<T> = Result<T, ScaffoldError>;

/// All errors that can occur while provisioning
#[derive(Error, Debug)]
pub enum ScaffoldError {
    // Process errors
    #[error("Failed to start `{command}`: {source}")]
    SpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` exited with code {code}{}", output_suffix(.output))]
    NonZeroExit {
        command: String,
        code: i32,
        output: String,
    },

    #[error("Command `{command}` was killed by signal {signal}{}", core_note(.coredump))]
    SignalDeath {
        command: String,
        signal: i32,
        coredump: bool,
    },

    // Prerequisite errors
    #[error("Missing prerequisite {name}: {reason}")]
    MissingPrerequisite {
        name: String,
        reason: String,
        hint: String,
    },

    // Step errors
    #[error("Template not found: {0}")]
    MissingTemplate(PathBuf),

    #[error("Step `{step}` failed for {target}: {source}")]
    StepFailed {
        target: String,
        step: String,
        #[source]
        source: Box<ScaffoldError>,
    },

    #[error("Verification failed for {target}: {check}")]
    VerificationFailed { target: String, check: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid verbosity level: {0}")]
    InvalidVerbosity(String),

    // IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn output_suffix(output: &str) -> String {
    if output.trim().is_empty() {
        String::new()
    } else {
        format!("\n{}", output.trim_end())
    }
}

fn core_note(coredump: &bool) -> &'static str {
    if *coredump {
        " (core dumped)"
    } else {
        ""
    }
}

impl ScaffoldError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a spawn failure error
    pub fn spawn_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::SpawnFailure {
            command: command.into(),
            source,
        }
    }

    /// Wrap an error raised while executing a step of a target
    pub fn step_failed(target: impl Into<String>, step: impl Into<String>, source: Self) -> Self {
        Self::StepFailed {
            target: target.into(),
            step: step.into(),
            source: Box::new(source),
        }
    }

    /// Whether the error came from a driven external command
    pub fn is_process_failure(&self) -> bool {
        match self {
            Self::SpawnFailure { .. } | Self::NonZeroExit { .. } | Self::SignalDeath { .. } => true,
            Self::StepFailed { source, .. } => source.is_process_failure(),
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::MissingPrerequisite { hint, .. } if !hint.is_empty() => Some(hint.as_str()),
            Self::MissingTemplate(_) => {
                Some("Templates ship with vidscaffold; pass --templates to point at them")
            }
            Self::SpawnFailure { .. } => Some("Run: vidscaffold --check"),
            Self::InvalidVerbosity(_) => Some("VIDSCAFFOLD_VERBOSE must be a non-negative integer"),
            Self::StepFailed { source, .. } => source.hint(),
            _ => None,
        }
    }
}
