//! Target setup orchestration
//!
//! Runs a target's fixed step list inside a load → run → save envelope:
//! the step cache is saved once at the end of every attempt, so a failure
//! at step k still records steps 1..k-1.

mod step;

pub use step::{Step, TargetPlan};

use crate::cache::StepCache;
use crate::error::{ScaffoldError, ScaffoldResult};
use crate::install::TemplateInstaller;
use crate::process::{CommandRunner, EnvPolicy, Invocation};
use crate::report::{Checks, StepOutcome, TargetReport};
use crate::ui::{StepProgress, UiContext};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Drives targets under a single workspace root
pub struct Orchestrator<'a> {
    root: PathBuf,
    templates: PathBuf,
    runner: &'a dyn CommandRunner,
    env: EnvPolicy,
    ui: UiContext,
}

impl<'a> Orchestrator<'a> {
    /// `root` should be absolute so cache keys do not depend on the
    /// current directory.
    pub fn new(
        root: impl Into<PathBuf>,
        templates: impl Into<PathBuf>,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            root: root.into(),
            templates: templates.into(),
            runner,
            env: EnvPolicy::default(),
            ui: UiContext::non_interactive(),
        }
    }

    pub fn with_env_policy(mut self, env: EnvPolicy) -> Self {
        self.env = env;
        self
    }

    pub fn with_ui(mut self, ui: UiContext) -> Self {
        self.ui = ui;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn target_dir(&self, target: &str) -> PathBuf {
        self.root.join(target)
    }

    /// Bring one target up to date.
    ///
    /// Every step adds one check to `checks`. The cache is saved whether or
    /// not a step failed; a step error is returned after the save.
    pub async fn setup_target(
        &self,
        plan: &TargetPlan,
        checks: &mut Checks,
    ) -> ScaffoldResult<TargetReport> {
        let target_dir = self.target_dir(&plan.name);
        let mut cache = StepCache::load(&self.root, &plan.name).await?;

        fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| ScaffoldError::io(format!("creating {}", target_dir.display()), e))?;

        info!(
            "Setting up {} in {} ({} steps, {} cached)",
            plan.name,
            target_dir.display(),
            plan.steps.len(),
            cache.len()
        );

        let mut report = TargetReport::new(&plan.name);
        let progress = StepProgress::new(&self.ui, &plan.name, plan.steps.len());
        let result = self
            .run_steps(plan, &target_dir, &mut cache, checks, &mut report, &progress)
            .await;
        progress.finish();

        let saved = cache.save(&self.root).await;
        match (result, saved) {
            (Ok(()), Ok(())) => {
                info!(
                    "{}: {} step(s) executed, {} cached",
                    plan.name, report.executed, report.cached
                );
                Ok(report)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(e), Err(save_err)) => {
                warn!("Failed to save step cache for {}: {}", plan.name, save_err);
                Err(e)
            }
        }
    }

    /// Report whether each step is already done, without running or
    /// deleting anything.
    pub async fn preview(&self, plan: &TargetPlan) -> ScaffoldResult<Vec<(Step, bool)>> {
        let target_dir = self.target_dir(&plan.name);
        let cache = StepCache::read(&self.root, &plan.name).await?;
        let installer = TemplateInstaller::new(&self.templates, &plan.template_set, &target_dir);

        let mut states = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            let done = self.is_done(step, &target_dir, &cache, &installer).await?;
            states.push((step.clone(), done));
        }
        Ok(states)
    }

    async fn run_steps(
        &self,
        plan: &TargetPlan,
        target_dir: &Path,
        cache: &mut StepCache,
        checks: &mut Checks,
        report: &mut TargetReport,
        progress: &StepProgress,
    ) -> ScaffoldResult<()> {
        let installer = TemplateInstaller::new(&self.templates, &plan.template_set, target_dir);

        for step in &plan.steps {
            let label = step.to_string();
            progress.begin(&label);

            match self.run_step(step, target_dir, cache, &installer, progress).await {
                Ok(outcome) => {
                    checks.pass();
                    report.record(outcome);
                    progress.complete(&label, outcome);
                }
                Err(e) => {
                    checks.fail();
                    progress.fail(&label);
                    return Err(ScaffoldError::step_failed(&plan.name, label, e));
                }
            }
        }
        Ok(())
    }

    async fn run_step(
        &self,
        step: &Step,
        target_dir: &Path,
        cache: &mut StepCache,
        installer: &TemplateInstaller<'_>,
        progress: &StepProgress,
    ) -> ScaffoldResult<StepOutcome> {
        if self.is_done(step, target_dir, cache, installer).await? {
            debug!("Skipping {} (cached)", step);
            return Ok(StepOutcome::Cached);
        }

        match step {
            Step::RunCommand { argv } => {
                // Commands own the terminal while they run
                let invocation = Invocation::new(argv.iter().cloned())
                    .in_dir(target_dir)
                    .with_env_policy(&self.env);
                progress.hide();
                let ran = self.runner.run(&invocation).await;
                progress.show();
                ran?;
                cache.mark_command_done(argv.as_slice());
            }
            Step::EnsureDirectory { path } => {
                let dir = target_dir.join(path);
                fs::create_dir_all(&dir)
                    .await
                    .map_err(|e| ScaffoldError::io(format!("creating {}", dir.display()), e))?;
                cache.mark_directory_done(path);
            }
            Step::InstallFile {
                subdir,
                destination,
                template,
            } => {
                installer
                    .install(cache, subdir, destination, template.as_deref())
                    .await?;
            }
        }

        self.verify(step, target_dir, cache.target())?;
        Ok(StepOutcome::Executed)
    }

    /// The step's done predicate: cache hit plus the real condition
    async fn is_done(
        &self,
        step: &Step,
        target_dir: &Path,
        cache: &StepCache,
        installer: &TemplateInstaller<'_>,
    ) -> ScaffoldResult<bool> {
        match step {
            Step::RunCommand { argv } => Ok(cache.is_command_done(argv.as_slice())),
            Step::EnsureDirectory { path } => {
                Ok(cache.is_directory_done(path) && target_dir.join(path).is_dir())
            }
            Step::InstallFile {
                subdir,
                destination,
                template,
            } => {
                installer
                    .is_current(cache, subdir, destination, template.as_deref())
                    .await
            }
        }
    }

    /// Post-condition of an executed step
    fn verify(&self, step: &Step, target_dir: &Path, target: &str) -> ScaffoldResult<()> {
        let holds = match step {
            Step::RunCommand { .. } => true,
            Step::EnsureDirectory { path } => target_dir.join(path).is_dir(),
            Step::InstallFile {
                subdir,
                destination,
                ..
            } => target_dir
                .join(TemplateInstaller::relative_destination(subdir, destination))
                .is_file(),
        };

        if holds {
            Ok(())
        } else {
            Err(ScaffoldError::VerificationFailed {
                target: target.to_string(),
                check: format!("{} did not take effect", step),
            })
        }
    }
}
