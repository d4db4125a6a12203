//! External process execution
//!
//! Every invocation carries its own working directory and environment
//! adjustments; nothing here touches the global process state.

mod runner;
mod system;

pub use runner::CommandRunner;
pub use system::SystemRunner;

use crate::config::schema::EnvironmentConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Max number of output lines kept in a failed command's error message.
const ERROR_TAIL_LINES: usize = 40;

/// Where a child's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Pass through to the invoking terminal
    #[default]
    Inherit,
    /// Collect into `ProcessOutput`
    Capture,
}

/// Captured output of a finished command (empty when inherited)
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Environment adjustments applied to every spawned command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvPolicy {
    /// Variables removed from the child environment
    pub clear: Vec<String>,
    /// Variables set in the child environment
    pub set: BTreeMap<String, String>,
}

impl From<&EnvironmentConfig> for EnvPolicy {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            clear: config.clear.clone(),
            set: config.set.clone(),
        }
    }
}

/// A single command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub env_remove: Vec<String>,
    pub output: OutputMode,
}

impl Invocation {
    /// Create an invocation from an argument vector
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
            env: BTreeMap::new(),
            env_remove: Vec::new(),
            output: OutputMode::Inherit,
        }
    }

    /// Run the command inside `dir`
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Apply an environment policy on top of what is already set
    pub fn with_env_policy(mut self, policy: &EnvPolicy) -> Self {
        self.env_remove.extend(policy.clear.iter().cloned());
        self.env
            .extend(policy.set.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Set a single environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Choose where output goes
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }

    /// Capture stdout/stderr instead of passing them through
    pub fn capture(self) -> Self {
        self.output(OutputMode::Capture)
    }

    /// Working directory, if one was set
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Human-readable command line, argv joined with spaces
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Tail of combined stdout+stderr for error diagnostics.
pub(crate) fn error_tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_display_joins_argv() {
        let inv = Invocation::new(["npm", "install", "express"]);
        assert_eq!(inv.display(), "npm install express");
        assert_eq!(inv.output, OutputMode::Inherit);
    }

    #[test]
    fn env_policy_applies_clear_and_set() {
        let mut set = BTreeMap::new();
        set.insert("CI".to_string(), "1".to_string());
        let policy = EnvPolicy {
            clear: vec!["http_proxy".to_string()],
            set,
        };

        let inv = Invocation::new(["npm", "ci"])
            .in_dir("/work/backend")
            .with_env_policy(&policy);

        assert_eq!(inv.env_remove, vec!["http_proxy".to_string()]);
        assert_eq!(inv.env.get("CI").map(String::as_str), Some("1"));
        assert_eq!(inv.working_dir(), Some(Path::new("/work/backend")));
    }

    #[test]
    fn error_tail_keeps_last_lines() {
        let stdout: String = (0..100).map(|i| format!("line {}\n", i)).collect();
        let tail = error_tail(&stdout, "boom");
        let lines: Vec<&str> = tail.lines().collect();
        assert_eq!(lines.len(), ERROR_TAIL_LINES);
        assert_eq!(lines.last(), Some(&"boom"));
    }

    #[test]
    fn error_tail_short_output_untouched() {
        assert_eq!(error_tail("a\nb", ""), "a\nb");
        assert_eq!(error_tail("", ""), "");
    }
}
