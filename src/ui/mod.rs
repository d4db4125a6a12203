//! UI module for consistent CLI output
//!
//! Uses `cliclack` log lines and `indicatif` progress bars in interactive
//! terminals, with automatic fallback to plain `[OK]`/`[FAIL]` lines in
//! CI/non-interactive environments.
//!
//! # Example
//!
//! ```rust,ignore
//! use vidscaffold::report::StepOutcome;
//! use vidscaffold::ui::{self, UiContext, StepProgress};
//!
//! let ctx = UiContext::detect();
//!
//! ui::intro(&ctx, "vidscaffold");
//! ui::step_ok(&ctx, "node found");
//!
//! let progress = StepProgress::new(&ctx, "backend", 12);
//! progress.begin("run `npm init -y`");
//! progress.complete("run `npm init -y`", StepOutcome::Executed);
//! progress.finish();
//!
//! ui::outro(&ctx, true, "Scaffolding complete");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, outro, remark, section, step_error, step_error_hint, step_ok, step_ok_detail,
    step_pending,
};
pub use progress::{StepProgress, TaskSpinner};
