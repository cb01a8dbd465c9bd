//! Consumption of non-local exits at loop and switch boundaries.
//!
//! Statement evaluation returns `break`, `continue` and `return` through the
//! `Err` channel as [`ControlAction`]s. Each enclosing construct decides
//! whether a signal is addressed to it:
//!
//! - A `for` loop consumes unlabeled `break`/`continue`, and labeled ones
//!   whose label is the loop's own.
//! - A `switch` consumes unlabeled `break` and `break` with its own label.
//!   `continue` always passes through to the enclosing loop.
//! - Errors and `return` pass through both.

use tern_ir::Name;

use crate::ControlAction;

/// What a loop does after its body finished with a control action.
#[derive(Debug, PartialEq)]
pub enum LoopAction {
    /// Run the post statement and the next iteration.
    Continue,
    /// Leave the loop normally.
    Break,
    /// Leave the loop and propagate the action outward.
    Exit(ControlAction),
}

#[inline]
fn addressed_to(target: Option<Name>, label: Option<Name>) -> bool {
    match target {
        None => true,
        Some(target) => label == Some(target),
    }
}

/// Classify `action` for a loop carrying `label`.
pub fn to_loop_action(action: ControlAction, label: Option<Name>) -> LoopAction {
    match action {
        ControlAction::Break(target) if addressed_to(target, label) => LoopAction::Break,
        ControlAction::Continue(target) if addressed_to(target, label) => LoopAction::Continue,
        other => LoopAction::Exit(other),
    }
}

/// Classify `action` for a switch carrying `label`.
///
/// Returns `None` when the switch consumed the action.
pub fn to_switch_action(action: ControlAction, label: Option<Name>) -> Option<ControlAction> {
    match action {
        ControlAction::Break(target) if addressed_to(target, label) => None,
        other => Some(other),
    }
}
