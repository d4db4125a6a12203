//! Line-oriented run output
//!
//! Every line has a kind; interactive terminals render it through cliclack,
//! CI logs get a bracketed tag instead.

use super::context::UiContext;
use console::{style, StyledObject};

/// Kind of a single output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Ok,
    Fail,
    Pending,
    Remark,
}

impl LineKind {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Self::Ok => style("[OK]").green(),
            Self::Fail => style("[FAIL]").red(),
            Self::Pending => style("[-]").dim(),
            Self::Remark => style("").dim(),
        }
    }
}

fn emit(ctx: &UiContext, kind: LineKind, text: String) {
    if ctx.use_fancy_output() {
        let _ = match kind {
            LineKind::Ok => cliclack::log::success(text),
            LineKind::Fail => cliclack::log::error(text),
            LineKind::Pending => cliclack::log::step(text),
            LineKind::Remark => cliclack::log::remark(text),
        };
    } else if kind == LineKind::Remark {
        println!("  {}", style(text).dim());
    } else {
        println!("  {} {}", kind.tag(), text);
    }
}

/// Run banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}\n", style(title).cyan().bold());
    }
}

/// Closing line: the check summary or preview result
pub fn outro(ctx: &UiContext, passed: bool, message: &str) {
    let styled = if passed {
        style(message).green().bold()
    } else {
        style(message).red().bold()
    };
    if ctx.use_fancy_output() {
        cliclack::outro(styled).ok();
    } else if passed {
        println!("\n{} {}", style("[OK]").green(), message);
    } else {
        println!("\n{} {}", style("[ERROR]").red(), message);
    }
}

/// Header for a group of steps (a target or the prerequisite list)
pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    emit(ctx, LineKind::Ok, message.to_string());
}

/// Finished step with a parenthesized detail, e.g. `(cached)` or a version
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    let text = if ctx.use_fancy_output() {
        format!("{} ({})", message, style(detail).dim())
    } else {
        format!("{} ({})", message, detail)
    };
    emit(ctx, LineKind::Ok, text);
}

pub fn step_error(ctx: &UiContext, message: &str) {
    emit(ctx, LineKind::Fail, message.to_string());
}

/// Failed check followed by its remediation
pub fn step_error_hint(ctx: &UiContext, message: &str, hint: &str) {
    let text = if ctx.use_fancy_output() {
        format!("{} - {}", message, style(hint).dim())
    } else {
        format!("{} - {}", message, hint)
    };
    emit(ctx, LineKind::Fail, text);
}

/// Step that a real run would execute
pub fn step_pending(ctx: &UiContext, message: &str) {
    emit(ctx, LineKind::Pending, format!("{} (pending)", message));
}

pub fn remark(ctx: &UiContext, message: &str) {
    emit(ctx, LineKind::Remark, message.to_string());
}
