//! Error types for transcript/alignment postprocessing.

use thiserror::Error;

/// Errors that can occur while matching statements or labeling segments.
///
/// These are caught per-statement or per-session by the driver; see
/// [`crate::driver`] for which variants abort a whole session versus which
/// are recorded as a diagnostic and skipped.
#[derive(Debug, Error)]
pub enum AlignError {
    /// An input table violated one of the structural invariants in the
    /// segmentation (e.g. the first segment did not start at zero).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The sliding-window search exhausted the CTM without finding an
    /// acceptable matching block for a statement.
    #[error("alignment not found: {0}")]
    AlignmentNotFound(String),

    /// A start index was found but the end-index search failed.
    #[error("end index not found: {0}")]
    EndNotFound(String),

    /// Boundary adjustment collapsed the matched range to zero length.
    #[error("zero-length match after boundary adjustment")]
    ZeroLength,

    /// The external text normalizer rejected or failed on a statement.
    #[error("normalization failed for {path}: {source}")]
    NormalizationFailed {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// File read/write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other, session-ending failure not covered above.
    #[error("{0}")]
    Other(String),
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, AlignError>;

impl AlignError {
    /// Whether this error should abort the whole session (as opposed to
    /// being recorded against a single statement and skipped).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AlignError::InvariantViolation(_) | AlignError::Io(_) | AlignError::Serialization(_)
        )
    }
}
