//! Command runner abstraction
//!
//! Orchestration only talks to this trait, so step sequencing can be
//! exercised without spawning real package managers.

use super::{Invocation, ProcessOutput};
use crate::error::ScaffoldResult;
use async_trait::async_trait;

/// Runs external commands to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation and wait for it to exit.
    ///
    /// Returns `Ok` only for a zero exit status. Nonzero exits, signal
    /// deaths and spawn failures are reported as errors naming the command.
    async fn run(&self, invocation: &Invocation) -> ScaffoldResult<ProcessOutput>;
}
