//! Error taxonomy for the matching engine.

use thiserror::Error;

/// Errors surfaced by the matching, clustering, graph and gap operations.
///
/// Per-item variants (`DimensionMismatch`, `ZeroMagnitude`, `NonFinite`,
/// `EmbeddingUnavailable`) are usually recovered by skipping the offending
/// candidate. `InsufficientData` and `InvalidEdge` fail the whole call.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("vector has zero magnitude")]
    ZeroMagnitude,

    #[error("vector is empty")]
    EmptyVector,

    #[error("vector contains a non-finite component at index {index}")]
    NonFinite { index: usize },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),
}

impl MatchError {
    /// True for errors that only disqualify a single item, never a whole run.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::ZeroMagnitude
                | Self::EmptyVector
                | Self::NonFinite { .. }
                | Self::EmbeddingUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
