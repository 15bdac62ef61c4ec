//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while interpreting bill field values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillError {
    #[error("unknown bill state: {0:?}")]
    UnknownState(String),

    #[error("unknown bill message: {0:?}")]
    UnknownMessage(String),

    #[error("bill id must not be empty")]
    EmptyBillId,
}
