//! Error types for dataset construction and threshold filtering.

use thiserror::Error;

use crate::data::model::{Scalar, ScalarKind};

/// Everything that can go wrong while building or filtering a dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// The filter key column is absent.
    #[error("Column '{column}' not found in dataset")]
    MissingColumn { column: String },

    /// A column's length disagrees with the dataset's row count.
    #[error("Column '{column}' has {actual} values but the dataset has {expected} rows")]
    MalformedDataset {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// The same column name was inserted twice.
    #[error("Column '{column}' appears more than once")]
    DuplicateColumn { column: String },

    /// The threshold's kind differs from a value in the key column.
    #[error("Threshold of kind {expected} cannot be compared with {found} in column '{column}' at row {row}")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: ScalarKind,
        found: ScalarKind,
    },

    /// Null and NaN never compare equal to anything.
    #[error("Threshold {value} is not comparable")]
    NonComparable { value: Scalar },
}

/// Result type alias for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

impl DatasetError {
    /// Short title for status lines.
    pub fn title(&self) -> &'static str {
        match self {
            DatasetError::MissingColumn { .. } => "Column Not Found",
            DatasetError::MalformedDataset { .. } => "Malformed Dataset",
            DatasetError::DuplicateColumn { .. } => "Duplicate Column",
            DatasetError::TypeMismatch { .. } => "Type Mismatch",
            DatasetError::NonComparable { .. } => "Invalid Threshold",
        }
    }
}
