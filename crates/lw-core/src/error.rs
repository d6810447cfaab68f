//! Error types used throughout the crate.

use thiserror::Error;

/// Alias for `Result<T, LoreError>`.
pub type LoreResult<T> = Result<T, LoreError>;

/// Errors raised while loading a lore book.
///
/// Structurally valid but incomplete authoring data never errors: the
/// compiler defaults missing fields instead. Only unreadable JSON surfaces
/// here.
#[derive(Debug, Error)]
pub enum LoreError {
    /// The lore book JSON could not be deserialized.
    #[error("invalid lore book: {0}")]
    Parse(#[from] serde_json::Error),
}
