//! Provision command - bring the backend and frontend up to date

use crate::cli::{Cli, LogFormat};
use crate::config::Config;
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::orchestrator::{Orchestrator, TargetPlan};
use crate::process::{EnvPolicy, SystemRunner};
use crate::report::{Checks, TargetReport};
use crate::ui::{self, TaskSpinner, UiContext};
use crate::{prereq, recipes};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Templates shipped with the crate
const BUNDLED_TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Template root: `--templates`, then `general.templates_dir` (relative to
/// the workspace root), then the bundled templates.
pub fn templates_dir(cli: &Cli, config: &Config, root: &Path) -> PathBuf {
    if let Some(ref dir) = cli.templates {
        return dir.clone();
    }
    match config.general.templates_dir {
        Some(ref dir) => root.join(dir),
        None => PathBuf::from(BUNDLED_TEMPLATES),
    }
}

/// Execute a provisioning run
pub async fn execute(cli: &Cli, config: &Config, root: &Path) -> ScaffoldResult<()> {
    // Plain UI lines whenever logs are JSON
    let ctx = UiContext::detect().plain(cli.log_format == LogFormat::Json);
    let templates = templates_dir(cli, config, root);
    let runner = SystemRunner::new();
    let env = EnvPolicy::from(&config.environment);
    let plans = recipes::all(config);
    debug!("Templates: {}", templates.display());

    if cli.check {
        ui::intro(&ctx, "vidscaffold (check only)");
        let mut checks = Checks::default();
        let result = prereq::verify(&ctx, &runner, &config.prerequisites, &env, &mut checks).await;
        summarize(&ctx, &checks, &[]);
        return result;
    }

    let orchestrator = Orchestrator::new(root, &templates, &runner)
        .with_env_policy(env.clone())
        .with_ui(ctx.clone());

    if cli.dry_run {
        ui::intro(&ctx, "vidscaffold (dry run)");
        return preview(&ctx, &orchestrator, &plans).await;
    }

    ui::intro(&ctx, "vidscaffold");
    let mut checks = Checks::default();
    let mut reports = Vec::with_capacity(plans.len());

    let result = async {
        prereq::verify(&ctx, &runner, &config.prerequisites, &env, &mut checks).await?;
        if cli.clean {
            clean(&ctx, &orchestrator, &plans).await?;
        }
        for plan in &plans {
            reports.push(orchestrator.setup_target(plan, &mut checks).await?);
        }
        Ok::<(), ScaffoldError>(())
    }
    .await;

    summarize(&ctx, &checks, &reports);
    result
}

/// Remove target directories; their cache records go stale and are
/// dropped on the next load.
async fn clean(
    ctx: &UiContext,
    orchestrator: &Orchestrator<'_>,
    plans: &[TargetPlan],
) -> ScaffoldResult<()> {
    for plan in plans {
        let dir = orchestrator.target_dir(&plan.name);
        if !dir.exists() {
            continue;
        }

        let mut spinner = TaskSpinner::new(ctx);
        spinner.start(&format!("Removing {}...", dir.display()));
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!("Removed {}", dir.display());
                spinner.stop(&format!("Removed {}", plan.name));
            }
            Err(e) => {
                spinner.stop_error(&format!("Could not remove {}", plan.name));
                return Err(ScaffoldError::io(format!("removing {}", dir.display()), e));
            }
        }
    }
    Ok(())
}

async fn preview(
    ctx: &UiContext,
    orchestrator: &Orchestrator<'_>,
    plans: &[TargetPlan],
) -> ScaffoldResult<()> {
    let mut pending = 0;

    for plan in plans {
        ui::section(
            ctx,
            &format!("{} ({})", plan.name, orchestrator.target_dir(&plan.name).display()),
        );
        for (step, done) in orchestrator.preview(plan).await? {
            let label = step.to_string();
            if done {
                ui::step_ok_detail(ctx, &label, "cached");
            } else {
                pending += 1;
                ui::step_pending(ctx, &label);
            }
        }
    }

    if pending == 0 {
        ui::outro(ctx, true, "Everything is up to date");
    } else {
        ui::outro(ctx, true, &format!("{} step(s) pending", pending));
    }
    Ok(())
}

fn summarize(ctx: &UiContext, checks: &Checks, reports: &[TargetReport]) {
    for report in reports {
        ui::remark(
            ctx,
            &format!(
                "{}: {} step(s) run, {} cached",
                report.name, report.executed, report.cached
            ),
        );
    }

    ui::outro(ctx, checks.all_passed(), &checks.to_string());
}
