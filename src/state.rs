use log::{debug, warn};
use serde::Deserialize;

use crate::data::filter::{resolve_threshold, threshold_range, ThresholdFilter, ThresholdRange};
use crate::data::model::{ColumnarDataset, Scalar};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Data source: the slot a plot observes
// ---------------------------------------------------------------------------

/// The published dataset of a plot. Every commit bumps `revision` so the
/// renderer can tell when to redraw.
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    data: ColumnarDataset,
    revision: u64,
}

impl DataSource {
    pub fn new(data: ColumnarDataset) -> Self {
        Self { data, revision: 0 }
    }

    pub fn data(&self) -> &ColumnarDataset {
        &self.data
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Publish a new dataset, returning the previous one.
    pub fn replace(&mut self, data: ColumnarDataset) -> ColumnarDataset {
        self.revision += 1;
        std::mem::replace(&mut self.data, data)
    }
}

// ---------------------------------------------------------------------------
// Threshold selector state
// ---------------------------------------------------------------------------

/// Which dataset a threshold change filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefilterBase {
    /// Whatever the data source currently publishes. Successive changes
    /// narrow the data further.
    #[default]
    Published,
    /// The dataset the selector was created with.
    Original,
}

/// UI state behind a threshold slider, independent of rendering.
#[derive(Debug, Clone)]
pub struct ThresholdSelector {
    filter: ThresholdFilter,
    base: RefilterBase,
    /// Dataset captured at construction.
    original: ColumnarDataset,
    /// Last threshold that was applied successfully.
    pub selected: Option<Scalar>,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ThresholdSelector {
    pub fn new(original: ColumnarDataset, filter: ThresholdFilter, base: RefilterBase) -> Self {
        Self {
            filter,
            base,
            original,
            selected: None,
            status_message: None,
        }
    }

    /// Slider range over the original dataset.
    pub fn range(&self) -> Result<Option<ThresholdRange>> {
        threshold_range(&self.original, &self.filter.key_column)
    }

    /// Threshold the slider should start at: the current selection if the
    /// original dataset carries it, otherwise the smallest key.
    pub fn initial_threshold(&self) -> Result<Option<Scalar>> {
        resolve_threshold(&self.original, &self.filter.key_column, self.selected.as_ref())
    }

    /// Handle a selector change: filter, then publish into `source`.
    ///
    /// Returns the number of published rows. On error `source` is left as it
    /// was and the error is recorded in `status_message`.
    pub fn on_threshold_changed(&mut self, source: &mut DataSource, value: Scalar) -> Result<usize> {
        let input = match self.base {
            RefilterBase::Published => source.data(),
            RefilterBase::Original => &self.original,
        };

        let filtered = match self.filter.apply(input, &value) {
            Ok(filtered) => filtered,
            Err(err) => {
                warn!("rejected threshold {value}: {err}");
                self.status_message = Some(format!("{}: {err}", err.title()));
                return Err(err);
            }
        };

        let rows = filtered.row_count();
        debug!(
            "threshold {value}: publishing {rows} of {} rows",
            input.row_count()
        );
        source.replace(filtered);
        self.selected = Some(value);
        self.status_message = None;
        Ok(rows)
    }

    /// Publish the original dataset again and clear the selection.
    pub fn reset(&mut self, source: &mut DataSource) {
        source.replace(self.original.clone());
        self.selected = None;
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatasetError;
    use serde_json::json;

    fn benchmark() -> ColumnarDataset {
        serde_json::from_value(json!({
            "method": ["std", "qs", "qs", "qs", "ins"],
            "threshold": [0, 4, 8, 4, 0],
            "time": [9.0, 4.0, 5.0, 3.5, 20.0],
        }))
        .unwrap()
    }

    #[test]
    fn test_change_publishes_filtered_rows() {
        let mut source = DataSource::new(benchmark());
        let mut selector =
            ThresholdSelector::new(benchmark(), ThresholdFilter::default(), RefilterBase::Published);

        let rows = selector.on_threshold_changed(&mut source, Scalar::Integer(4)).unwrap();
        assert_eq!(rows, 2);
        assert_eq!(source.revision(), 1);
        assert_eq!(
            source.data().column("time").unwrap(),
            [Scalar::Float(4.0), Scalar::Float(3.5)].as_slice()
        );
        assert_eq!(selector.selected, Some(Scalar::Integer(4)));
    }

    #[test]
    fn test_published_base_narrows() {
        let mut source = DataSource::new(benchmark());
        let mut selector =
            ThresholdSelector::new(benchmark(), ThresholdFilter::default(), RefilterBase::Published);

        selector.on_threshold_changed(&mut source, Scalar::Integer(4)).unwrap();
        let rows = selector.on_threshold_changed(&mut source, Scalar::Integer(8)).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(source.data().column_names(), ["method", "threshold", "time"]);

        selector.reset(&mut source);
        assert_eq!(source.data(), &benchmark());
        assert_eq!(source.revision(), 3);
        assert_eq!(selector.selected, None);
    }

    #[test]
    fn test_original_base_refilters_from_start() {
        let mut source = DataSource::new(benchmark());
        let filter = ThresholdFilter::default().with_passthrough(Scalar::Integer(0));
        let mut selector = ThresholdSelector::new(benchmark(), filter, RefilterBase::Original);

        assert_eq!(selector.on_threshold_changed(&mut source, Scalar::Integer(4)).unwrap(), 4);
        assert_eq!(selector.on_threshold_changed(&mut source, Scalar::Integer(8)).unwrap(), 3);
        assert_eq!(
            source.data().column("method").unwrap(),
            [Scalar::from("std"), Scalar::from("qs"), Scalar::from("ins")].as_slice()
        );
    }

    #[test]
    fn test_failed_change_leaves_source_untouched() {
        let mut source = DataSource::new(benchmark());
        let mut selector =
            ThresholdSelector::new(benchmark(), ThresholdFilter::default(), RefilterBase::Published);
        selector.on_threshold_changed(&mut source, Scalar::Integer(4)).unwrap();
        let before = source.data().clone();

        let err = selector
            .on_threshold_changed(&mut source, Scalar::from("four"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::TypeMismatch { .. }));
        assert_eq!(source.data(), &before);
        assert_eq!(source.revision(), 1);
        assert_eq!(selector.selected, Some(Scalar::Integer(4)));
        assert!(selector.status_message.as_deref().unwrap().starts_with("Type Mismatch"));

        // A good value clears the message again.
        selector.on_threshold_changed(&mut source, Scalar::Integer(4)).unwrap();
        assert!(selector.status_message.is_none());
    }

    #[test]
    fn test_missing_key_column() {
        let data: ColumnarDataset = serde_json::from_value(json!({"y": [1, 2]})).unwrap();
        let mut source = DataSource::new(data.clone());
        let mut selector =
            ThresholdSelector::new(data, ThresholdFilter::default(), RefilterBase::Original);
        assert!(selector.range().is_err());
        let err = selector.on_threshold_changed(&mut source, Scalar::Integer(1)).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { .. }));
        assert_eq!(source.revision(), 0);
    }

    #[test]
    fn test_initial_threshold_falls_back_to_minimum() {
        let mut source = DataSource::new(benchmark());
        let mut selector =
            ThresholdSelector::new(benchmark(), ThresholdFilter::default(), RefilterBase::Original);
        assert_eq!(selector.initial_threshold().unwrap(), Some(Scalar::Integer(0)));

        selector.on_threshold_changed(&mut source, Scalar::Float(8.0)).unwrap();
        assert_eq!(selector.initial_threshold().unwrap(), Some(Scalar::Float(8.0)));

        // A selection no row carries resolves to the minimum again.
        selector.on_threshold_changed(&mut source, Scalar::Integer(5)).unwrap();
        assert_eq!(source.data().row_count(), 0);
        assert_eq!(selector.initial_threshold().unwrap(), Some(Scalar::Integer(0)));
    }

    #[test]
    fn test_range_uses_original() {
        let selector =
            ThresholdSelector::new(benchmark(), ThresholdFilter::default(), RefilterBase::Published);
        let range = selector.range().unwrap().unwrap();
        assert_eq!(range.min, Scalar::Integer(0));
        assert_eq!(range.max, Scalar::Integer(8));
        assert_eq!(range.marks.len(), 3);
    }
}
