//! Evaluation helpers the `Interpreter` delegates to.
//!
//! - `control`: consuming `break`/`continue` at loop and switch boundaries
//! - `ident`: identifier resolution, including the reserved identifiers
//! - `operators`: binary and unary operators on runtime values

pub mod control;
pub mod ident;
pub mod operators;
