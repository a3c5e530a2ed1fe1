//! Filter configuration, read from JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::filter::{ThresholdFilter, THRESHOLD_COLUMN};
use crate::data::model::Scalar;
use crate::state::RefilterBase;

/// User-facing settings for a threshold selector.
///
/// ```json
/// { "key_column": "threshold", "passthrough": [0], "refilter_base": "original" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Column the selector compares against.
    pub key_column: String,
    /// Key values shown regardless of the selected threshold.
    pub passthrough: Vec<Scalar>,
    pub refilter_base: RefilterBase,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            key_column: THRESHOLD_COLUMN.to_string(),
            passthrough: Vec::new(),
            refilter_base: RefilterBase::default(),
        }
    }
}

impl FilterConfig {
    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing config JSON")
    }

    pub fn filter(&self) -> ThresholdFilter {
        ThresholdFilter {
            key_column: self.key_column.clone(),
            passthrough: self.passthrough.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config: FilterConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.filter(), ThresholdFilter::default());
        assert_eq!(config.refilter_base, RefilterBase::Published);
    }

    #[test]
    fn test_full_config() {
        let config: FilterConfig = serde_json::from_value(json!({
            "key_column": "cutoff",
            "passthrough": [0],
            "refilter_base": "original",
        }))
        .unwrap();
        assert_eq!(
            config.filter(),
            ThresholdFilter::new("cutoff").with_passthrough(Scalar::Integer(0))
        );
        assert_eq!(config.refilter_base, RefilterBase::Original);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_value::<FilterConfig>(json!({"treshold": 1})).is_err());
    }
}
