//! Error types for the course store and the filter engine.

use thiserror::Error;

use crate::data::model::Attribute;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Contract violations reported by the store and the engine.
///
/// None of these are transient: they mean the caller asked for something the
/// dataset cannot answer, so they are surfaced immediately and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Record index outside `[0, size)`
    #[error("record index {index} out of range (store holds {size} records)")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of records in the store
        size: usize,
    },

    /// Filter selector is not a valid label index for its attribute
    #[error("invalid {attribute} filter: index {index} is not in 0..{size}")]
    InvalidFilter {
        /// Attribute the selector belongs to
        attribute: Attribute,
        /// Offending selector index
        index: usize,
        /// Size of the attribute's label set
        size: usize,
    },

    /// A record handed to the store references a label that does not exist
    #[error("record {record}: {attribute} index {index} is not in 0..{size}")]
    LabelOutOfRange {
        /// Position of the offending record
        record: usize,
        /// Attribute holding the bad index
        attribute: Attribute,
        /// Stored index
        index: u8,
        /// Size of the attribute's label set
        size: usize,
    },
}
