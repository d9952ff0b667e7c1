use thiserror::Error;

/// Error taxonomy for the quoting, liquidity-accounting and submission core.
///
/// Format and arithmetic errors are terminal for the single call that raised
/// them; they indicate a bad input or a degenerate pool state, not a
/// transient condition, and are never retried. `SubmissionFailed` is
/// surfaced immediately without retry. Exhausted confirmation polling is not
/// an error at all; it is reported as the `Unresolved` transaction outcome.
#[derive(Debug, Error)]
pub enum AmmError {
    /// Malformed decimal, integer or address input. Rejected before any
    /// computation is performed.
    #[error("invalid input format: {0}")]
    InvalidFormat(String),

    /// The pool cannot serve the request: a reserve is zero, or the
    /// requested output would drain the output reserve.
    #[error("insufficient reserves")]
    InsufficientReserves,

    /// No liquidity to price against.
    #[error("division by zero in pool arithmetic")]
    DivisionByZero,

    /// The submission collaborator rejected the transaction.
    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),
}
