//! Flat-key conversion errors.

use thiserror::Error;

/// Result type alias using [`FlattenError`].
pub type FlattenResult<T> = Result<T, FlattenError>;

/// Errors that can occur while nesting flat keys.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    /// A key has an empty path or an empty segment.
    #[error("invalid key `{key}`: {reason}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A segment needs a sequence where a mapping was found, or the reverse.
    #[error("key `{key}` needs a {expected} at `{path}`, found {found}")]
    ShapeConflict {
        /// The key being inserted.
        key: String,
        /// Path of the conflicting value within the tree.
        path: String,
        /// `sequence` or `mapping`.
        expected: &'static str,
        /// Type of the value already there.
        found: &'static str,
    },

    /// A sequence index exceeds [`MAX_SEQUENCE_INDEX`](crate::MAX_SEQUENCE_INDEX).
    #[error("key `{key}` addresses index {segment}, above the limit of {limit}")]
    IndexTooLarge {
        /// The key being inserted.
        key: String,
        /// The index segment as written.
        segment: String,
        /// The largest accepted index.
        limit: usize,
    },
}

impl FlattenError {
    /// Create a new invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }
}
