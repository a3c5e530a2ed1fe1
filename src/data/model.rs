use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Scalar – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, as found in a plot data source column.
///
/// Serialized untagged, so a column is a plain JSON array such as
/// `[1, 2.5, "a", true, null]`. Integers are tried before floats.
///
/// Integers and floats are both numbers: `Integer(4) == Float(4.0)`, while
/// `Integer(4) != Float(4.5)`. Values of any other differing kinds are
/// never equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

/// The kind of a [`Scalar`], used when reporting comparison errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Null => "null",
            ScalarKind::Bool => "bool",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
        };
        f.write_str(name)
    }
}

impl ScalarKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Float)
    }

    /// Whether values of the two kinds can be compared for equality.
    pub fn compares_with(self, other: ScalarKind) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }

    /// Sort rank; all numbers share one.
    fn rank(self) -> u8 {
        match self {
            ScalarKind::Null => 0,
            ScalarKind::Bool => 1,
            ScalarKind::Integer | ScalarKind::Float => 2,
            ScalarKind::String => 3,
        }
    }
}

// 2^63 as f64; floats at or beyond it are outside the i64 range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// The float as an `i64` if it holds an integral value in range.
fn integral(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
        Some(f as i64)
    } else {
        None
    }
}

/// Exact ordering of an integer against a float, without rounding `i`.
fn cmp_int_float(i: i64, f: f64) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    if f.is_nan() {
        return if f.is_sign_negative() { Greater } else { Less };
    }
    if f >= I64_BOUND {
        return Less;
    }
    if f < -I64_BOUND {
        return Greater;
    }
    let t = f.trunc();
    match i.cmp(&(t as i64)) {
        Equal if f > t => Less,
        Equal if f < t => Greater,
        other => other,
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        use Scalar::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(i), Float(f)) | (Float(f), Integer(i)) => integral(*f) == Some(*i),
            (String(a), String(b)) => a == b,
            _ => false,
        }
    }
}

// -- Manual Eq/Ord so we can put Scalar in BTreeSet --

impl Eq for Scalar {}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Scalar::*;
        let ra = self.kind().rank();
        let rb = other.kind().rank();
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            // `0.0 == -0.0` must order as equal; NaN falls back to total order.
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)),
            (Integer(i), Float(f)) => cmp_int_float(*i, *f),
            (Float(f), Integer(i)) => cmp_int_float(*i, *f).reverse(),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Scalar {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind().rank().hash(state);
        match self {
            Scalar::String(s) => s.hash(state),
            Scalar::Integer(i) => i.hash(state),
            Scalar::Float(f) => match integral(*f) {
                Some(i) => i.hash(state),
                None => f.to_bits().hash(state),
            },
            Scalar::Bool(b) => b.hash(state),
            Scalar::Null => {}
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{s}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Null => write!(f, "<null>"),
        }
    }
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Null => ScalarKind::Null,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Integer(_) => ScalarKind::Integer,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::String(_) => ScalarKind::String,
        }
    }

    /// `false` for values that are never equal to anything: null and NaN.
    pub fn is_comparable(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Float(v) => !v.is_nan(),
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

// ---------------------------------------------------------------------------
// ColumnarDataset – named, equal-length columns
// ---------------------------------------------------------------------------

/// Tabular data stored column by column, the shape a plot data source holds.
///
/// Column order is insertion order. Every column has exactly
/// [`row_count`](Self::row_count) values; the constructors reject anything
/// else, so a filter never sees ragged columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnarDataset {
    column_names: Vec<String>,
    columns: BTreeMap<String, Vec<Scalar>>,
    row_count: usize,
}

impl ColumnarDataset {
    /// A dataset with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from `(name, values)` pairs, validating lengths.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Scalar>)>,
        S: Into<String>,
    {
        let mut dataset = Self::new();
        for (name, values) in columns {
            dataset.push_column(name, values)?;
        }
        Ok(dataset)
    }

    /// Append a column. The first column fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Scalar>) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(DatasetError::DuplicateColumn { column: name });
        }
        if self.column_names.is_empty() {
            self.row_count = values.len();
        } else if values.len() != self.row_count {
            return Err(DatasetError::MalformedDataset {
                column: name,
                expected: self.row_count,
                actual: values.len(),
            });
        }
        self.column_names.push(name.clone());
        self.columns.insert(name, values);
        Ok(())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column(&self, name: &str) -> Option<&[Scalar]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// `(name, values)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Scalar])> + '_ {
        self.column_names.iter().filter_map(move |name| {
            self.columns
                .get(name)
                .map(|values| (name.as_str(), values.as_slice()))
        })
    }

    /// Copy the given rows, in the given order, into a new dataset with the
    /// same columns.
    ///
    /// # Panics
    /// If any index is `>= self.row_count()`.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let picked: Vec<Scalar> = rows.iter().map(|&i| values[i].clone()).collect();
                (name.clone(), picked)
            })
            .collect();
        Self {
            column_names: self.column_names.clone(),
            columns,
            row_count: rows.len(),
        }
    }

    /// Sorted set of the distinct values in a column.
    pub fn unique_values(&self, name: &str) -> Option<BTreeSet<Scalar>> {
        self.column(name)
            .map(|values| values.iter().cloned().collect())
    }
}

// -- Serde: a JSON object of column arrays, key order preserved --

impl Serialize for ColumnarDataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.column_names.len()))?;
        for (name, values) in self.columns() {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

struct DatasetVisitor;

impl<'de> Visitor<'de> for DatasetVisitor {
    type Value = ColumnarDataset;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping column names to equal-length arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut dataset = ColumnarDataset::new();
        while let Some((name, values)) = access.next_entry::<String, Vec<Scalar>>()? {
            dataset
                .push_column(name, values)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(dataset)
    }
}

impl<'de> Deserialize<'de> for ColumnarDataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(DatasetVisitor)
    }
}
