//! Threshold selection for columnar plot data.
//!
//! A plot publishes a [`ColumnarDataset`] through a [`DataSource`]. When the
//! user moves the threshold selector, [`ThresholdSelector::on_threshold_changed`]
//! keeps only the rows whose `"threshold"` column equals the new value and
//! publishes the result. A rejected value leaves the source untouched.

pub mod config;
pub mod data;
pub mod error;
pub mod state;

pub use config::FilterConfig;
pub use data::filter::{
    filter_by_threshold, resolve_threshold, threshold_range, ThresholdFilter, ThresholdRange,
    THRESHOLD_COLUMN,
};
pub use data::model::{ColumnarDataset, Scalar, ScalarKind};
pub use error::{DatasetError, Result};
pub use state::{DataSource, RefilterBase, ThresholdSelector};
