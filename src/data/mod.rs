/// Data layer: cell values, the columnar dataset, and the threshold filter.
///
/// Architecture:
/// ```text
///   selector event (Scalar)
///        │
///        ▼
///   ┌──────────────────┐
///   │ ColumnarDataset  │  ordered columns, equal lengths
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  key == threshold → kept row indices → new dataset
///   └──────────┘
/// ```

pub mod filter;
pub mod model;
