//! Segmentation error types

use thiserror::Error;

/// Errors surfaced by the segmentation engine
///
/// All of these are contract violations by the caller. Recoverable soft
/// violations (an oversized unit that cannot be cut) are reported as
/// [`crate::SegmentWarning`]s instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// The configuration was rejected during validation
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Unit indices are not `0..n` in order
    #[error("invalid unit sequence: expected index {expected} at position {expected}, found {found}")]
    InvalidUnitSequence {
        /// The index required at this position
        expected: usize,
        /// The index actually carried by the unit
        found: usize,
    },

    /// A unit was handed to the splitter without any text
    #[error("unit {index} carries no text to split")]
    MissingContent {
        /// Index of the offending unit
        index: usize,
    },
}

/// Result type for segmentation operations
pub type Result<T> = std::result::Result<T, SegmentError>;
