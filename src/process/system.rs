//! Command runner backed by real child processes

use super::{error_tail, CommandRunner, Invocation, OutputMode, ProcessOutput};
use crate::error::{ScaffoldError, ScaffoldResult};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Runs commands on the local machine via `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> ScaffoldResult<ProcessOutput> {
        let command_line = invocation.display();
        let Some((program, args)) = invocation.argv.split_first() else {
            return Err(ScaffoldError::spawn_failed(
                "<empty>",
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            ));
        };

        debug!(
            "Executing: {} (cwd: {:?})",
            command_line,
            invocation.working_dir()
        );

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = invocation.working_dir() {
            cmd.current_dir(dir);
        }
        for key in &invocation.env_remove {
            cmd.env_remove(key);
        }
        cmd.envs(&invocation.env);

        match invocation.output {
            OutputMode::Inherit => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(|e| ScaffoldError::spawn_failed(&command_line, e))?;

                check_status(&command_line, status, String::new())?;
                Ok(ProcessOutput::default())
            }
            OutputMode::Capture => {
                let output = cmd
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await
                    .map_err(|e| ScaffoldError::spawn_failed(&command_line, e))?;

                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                check_status(&command_line, output.status, error_tail(&stdout, &stderr))?;
                Ok(ProcessOutput { stdout, stderr })
            }
        }
    }
}

/// Map a child's exit status onto the error taxonomy
fn check_status(command: &str, status: ExitStatus, output: String) -> ScaffoldResult<()> {
    if status.success() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(ScaffoldError::SignalDeath {
                command: command.to_string(),
                signal,
                coredump: status.core_dumped(),
            });
        }
    }

    Err(ScaffoldError::NonZeroExit {
        command: command.to_string(),
        code: status.code().unwrap_or(-1),
        output,
    })
}
