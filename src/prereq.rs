//! Prerequisite verification
//!
//! Every configured tool is looked up on `PATH` and, when a minimum version
//! is configured, asked for `--version`. All tools are reported before the
//! first failure is returned.

use crate::config::schema::PrerequisiteConfig;
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::process::{CommandRunner, EnvPolicy, Invocation};
use crate::report::Checks;
use crate::ui::{self, UiContext};
use semver::Version;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Find an executable by name in a `PATH`-style list
pub fn find_in_path(name: &str, path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Parse the first version-looking token of `--version` output.
///
/// Accepts `v18.19.0`, `10.2.4`, `ffmpeg version 6.1 ...` (missing patch
/// is read as `.0`).
pub fn parse_version(output: &str) -> Option<Version> {
    output
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter_map(|token| {
            let token = token.trim_start_matches('v');
            let core: String = token
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            let parts: Vec<&str> = core.split('.').filter(|p| !p.is_empty()).collect();
            match parts.as_slice() {
                [major, minor] => Version::parse(&format!("{major}.{minor}.0")).ok(),
                [major, minor, patch, ..] => {
                    Version::parse(&format!("{major}.{minor}.{patch}")).ok()
                }
                _ => None,
            }
        })
        .next()
}

/// `PATH` as the spawned commands will see it
fn effective_path(env: &EnvPolicy) -> OsString {
    match env.set.get("PATH") {
        Some(path) => OsString::from(path),
        None => std::env::var_os("PATH").unwrap_or_default(),
    }
}

/// Check one prerequisite, returning the failure reason
async fn check_one(
    runner: &dyn CommandRunner,
    prereq: &PrerequisiteConfig,
    env: &EnvPolicy,
    path: &OsStr,
) -> Result<String, String> {
    let Some(location) = find_in_path(&prereq.name, path) else {
        return Err("not found on PATH".to_string());
    };
    debug!("Found {} at {}", prereq.name, location.display());

    let Some(ref min_version) = prereq.min_version else {
        return Ok(location.display().to_string());
    };
    let minimum = parse_version(min_version)
        .ok_or_else(|| format!("invalid minimum version `{}` in configuration", min_version))?;

    let invocation = Invocation::new([prereq.name.as_str(), "--version"])
        .with_env_policy(env)
        .capture();
    let output = runner
        .run(&invocation)
        .await
        .map_err(|e| format!("could not query version: {}", e))?;

    let reported = format!("{}\n{}", output.stdout, output.stderr);
    let found = parse_version(&reported)
        .ok_or_else(|| format!("could not parse version from `{}`", reported.trim()))?;

    if found < minimum {
        Err(format!("version {} is older than required {}", found, minimum))
    } else {
        Ok(format!("{} >= {}", found, minimum))
    }
}

/// Verify all prerequisites, counting one check each.
pub async fn verify(
    ctx: &UiContext,
    runner: &dyn CommandRunner,
    prereqs: &[PrerequisiteConfig],
    env: &EnvPolicy,
    checks: &mut Checks,
) -> ScaffoldResult<()> {
    ui::section(ctx, "Checking prerequisites...");
    let path = effective_path(env);
    let mut first_failure = None;

    for prereq in prereqs {
        match check_one(runner, prereq, env, &path).await {
            Ok(detail) => {
                checks.pass();
                ui::step_ok_detail(ctx, &prereq.name, &detail);
            }
            Err(reason) => {
                checks.fail();
                ui::step_error_hint(ctx, &format!("{}: {}", prereq.name, reason), &prereq.hint);
                first_failure.get_or_insert(ScaffoldError::MissingPrerequisite {
                    name: prereq.name.clone(),
                    reason,
                    hint: prereq.hint.clone(),
                });
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
