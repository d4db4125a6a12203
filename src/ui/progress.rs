//! Progress indicators with CI fallback

use super::context::UiContext;
use super::output;
use crate::report::StepOutcome;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(120);

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    /// Create a new spinner (shows on `start` in interactive mode)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Per-target step progress.
///
/// Shows an indicatif bar (`N/M` steps) in interactive mode and one plain
/// line per finished step in CI.
pub struct StepProgress {
    bar: Option<ProgressBar>,
    ctx: UiContext,
}

impl StepProgress {
    pub fn new(ctx: &UiContext, target: &str, total: usize) -> Self {
        let bar = if ctx.use_fancy_output() {
            let style = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                .progress_chars("━╸─");
            let bar = ProgressBar::new(total as u64);
            bar.set_style(style);
            bar.set_prefix(target.to_string());
            bar.enable_steady_tick(TICK);
            Some(bar)
        } else {
            output::section(ctx, &format!("Setting up {} ({} steps)", target, total));
            None
        };
        Self {
            bar,
            ctx: ctx.clone(),
        }
    }

    /// A step is about to run
    pub fn begin(&self, label: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(label.to_string());
        }
    }

    /// A step finished
    pub fn complete(&self, label: &str, outcome: StepOutcome) {
        match (&self.bar, outcome) {
            (Some(bar), StepOutcome::Executed) => {
                bar.println(format!("  {} {}", style("✓").green(), label));
                bar.inc(1);
            }
            (Some(bar), StepOutcome::Cached) => {
                bar.println(format!("  {} {} {}", style("✓").green(), label, style("(cached)").dim()));
                bar.inc(1);
            }
            (None, StepOutcome::Executed) => output::step_ok(&self.ctx, label),
            (None, StepOutcome::Cached) => output::step_ok_detail(&self.ctx, label, "cached"),
        }
    }

    /// A step failed; the run is about to abort
    pub fn fail(&self, label: &str) {
        match self.bar {
            Some(ref bar) => bar.println(format!("  {} {}", style("✗").red(), label)),
            None => output::step_error(&self.ctx, label),
        }
    }

    /// Take the bar off the terminal while a child process owns it
    pub fn hide(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.set_draw_target(ProgressDrawTarget::hidden());
            let term = console::Term::stderr();
            if term.is_term() {
                let _ = term.clear_line();
            }
        }
    }

    /// Redraw the bar after `hide`
    pub fn show(&self) {
        if let Some(ref bar) = self.bar {
            bar.set_draw_target(ProgressDrawTarget::stderr());
            bar.enable_steady_tick(TICK);
        }
    }

    /// Finish and clear the progress bar.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
