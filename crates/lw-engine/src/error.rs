//! Engine error types.

use thiserror::Error;

/// Failure reported by an external signal classifier.
///
/// The pipeline never propagates this: the signal boundary converts it into
/// an empty signal set plus a trace line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("signal classification failed: {0}")]
pub struct SignalError(pub String);

impl SignalError {
    /// Wrap a classifier failure message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
