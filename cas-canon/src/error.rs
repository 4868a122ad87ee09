//! Error types for evaluation and expansion.

use thiserror::Error;

/// Errors surfaced while evaluating or expanding an expression.
///
/// Both kinds are fatal to the evaluation that raised them: no partially
/// normalized node is published when one occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Evaluation recursed deeper than
    /// [`MAX_RECURSION_DEPTH`](crate::MAX_RECURSION_DEPTH).
    #[error("maximum recursion depth reached")]
    RecursionLimitExceeded,

    /// Zero was raised to a negative real exponent.
    #[error("division by zero")]
    DivisionByZero,
}
