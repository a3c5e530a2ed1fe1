use serde::Serialize;

use super::model::{ColumnarDataset, Scalar};
use crate::error::{DatasetError, Result};

/// Name of the column a threshold selector filters on.
pub const THRESHOLD_COLUMN: &str = "threshold";

// ---------------------------------------------------------------------------
// Threshold filter
// ---------------------------------------------------------------------------

/// Keep only the rows whose `"threshold"` value equals `threshold`.
///
/// Every input column appears in the output, in the same order, and matching
/// rows keep their relative order. No match yields empty columns, not an
/// error.
pub fn filter_by_threshold(dataset: &ColumnarDataset, threshold: &Scalar) -> Result<ColumnarDataset> {
    ThresholdFilter::default().apply(dataset, threshold)
}

/// Equality filter on a single key column.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdFilter {
    /// Column compared against the selected value.
    pub key_column: String,
    /// Key values whose rows are kept whatever the selection.
    pub passthrough: Vec<Scalar>,
}

impl Default for ThresholdFilter {
    fn default() -> Self {
        Self {
            key_column: THRESHOLD_COLUMN.to_string(),
            passthrough: Vec::new(),
        }
    }
}

impl ThresholdFilter {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            passthrough: Vec::new(),
        }
    }

    /// Always keep rows whose key equals `value`, e.g. `0` for methods that
    /// take no threshold at all.
    pub fn with_passthrough(mut self, value: Scalar) -> Self {
        self.passthrough.push(value);
        self
    }

    /// Indices of the rows to keep, ascending.
    ///
    /// A row is kept when its key equals `threshold` or one of the
    /// passthrough values. Integers and floats compare by numeric value.
    /// Null keys never match. A non-null key that cannot be compared with
    /// the threshold or a passthrough value is an error.
    pub fn matching_rows(&self, dataset: &ColumnarDataset, threshold: &Scalar) -> Result<Vec<usize>> {
        let targets: Vec<&Scalar> = std::iter::once(threshold).chain(&self.passthrough).collect();
        if let Some(bad) = targets.iter().find(|t| !t.is_comparable()) {
            return Err(DatasetError::NonComparable {
                value: (*bad).clone(),
            });
        }
        let keys = dataset
            .column(&self.key_column)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: self.key_column.clone(),
            })?;

        let mut rows = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            if key.is_null() {
                continue;
            }
            let found = key.kind();
            if let Some(target) = targets.iter().find(|t| !t.kind().compares_with(found)) {
                return Err(DatasetError::TypeMismatch {
                    column: self.key_column.clone(),
                    row: i,
                    expected: target.kind(),
                    found,
                });
            }
            if targets.iter().any(|t| *t == key) {
                rows.push(i);
            }
        }
        Ok(rows)
    }

    /// Build the filtered dataset. The input is left untouched.
    pub fn apply(&self, dataset: &ColumnarDataset, threshold: &Scalar) -> Result<ColumnarDataset> {
        let rows = self.matching_rows(dataset, threshold)?;
        Ok(dataset.take_rows(&rows))
    }
}

// ---------------------------------------------------------------------------
// Selector helpers
// ---------------------------------------------------------------------------

/// Values a threshold slider can take: every distinct key, sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdRange {
    pub min: Scalar,
    pub max: Scalar,
    pub marks: Vec<Scalar>,
}

/// Slider range for `key_column`. `None` when the column holds no
/// comparable values.
pub fn threshold_range(dataset: &ColumnarDataset, key_column: &str) -> Result<Option<ThresholdRange>> {
    let unique = dataset
        .unique_values(key_column)
        .ok_or_else(|| DatasetError::MissingColumn {
            column: key_column.to_string(),
        })?;

    let marks: Vec<Scalar> = unique.into_iter().filter(Scalar::is_comparable).collect();
    let (Some(min), Some(max)) = (marks.first().cloned(), marks.last().cloned()) else {
        return Ok(None);
    };
    Ok(Some(ThresholdRange { min, max, marks }))
}

/// Pick the threshold to show: `requested` if some row carries it, otherwise
/// the smallest key in the column.
pub fn resolve_threshold(
    dataset: &ColumnarDataset,
    key_column: &str,
    requested: Option<&Scalar>,
) -> Result<Option<Scalar>> {
    let keys = dataset
        .column(key_column)
        .ok_or_else(|| DatasetError::MissingColumn {
            column: key_column.to_string(),
        })?;

    if let Some(requested) = requested {
        if requested.is_comparable() && keys.contains(requested) {
            return Ok(Some(requested.clone()));
        }
    }
    Ok(keys.iter().filter(|k| k.is_comparable()).min().cloned())
}
