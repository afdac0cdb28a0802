use std::collections::HashSet;
use std::fmt;

use anyhow::{bail, Result};

/// Raw cell texts read as missing, as spreadsheet and dataframe exports write them.
const NA_MARKERS: &[&str] = &["", "NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL"];

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, inferred at load time.
/// Must be `Ord + Hash` so filter selections can live in sets.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord/Hash so we can put CellValue in sets --
// Equality is `cmp() == Equal`, so floats compare by `total_cmp` everywhere.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

/// The textual form used for substring matching, grid cells and chart labels.
/// Null renders as an empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Whole floats keep their ".0", as a float column prints in a dataframe.
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e16 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Infer the narrowest type for a raw text cell: integer, float, bool, string.
    /// Empty cells and common missing-value markers are `Null`.
    pub fn infer(s: &str) -> CellValue {
        if NA_MARKERS.contains(&s) {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// A float cell; NaN is a missing value and reads as `Null`.
    pub fn float(v: f64) -> CellValue {
        if v.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(v)
        }
    }

    /// Numeric view of the value, used for the measure column.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – declared once at load time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Text-like dimension, eligible for filtering.
    Categorical,
    /// The single numeric column every sort and chart is keyed on.
    Measure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// A row-major table with a fixed, ordered column set and one measure column.
///
/// Tables are immutable once built; the query pipeline produces new tables
/// sharing the same columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
    measure: usize,
}

impl Table {
    /// Build a table, declaring `measure_column` as the measure and every other
    /// column as categorical.
    ///
    /// Fails when the measure column is absent, a column name repeats, a row
    /// has the wrong width, or a measure cell is neither numeric nor null.
    pub fn new(
        names: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        measure_column: &str,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                bail!("duplicate column '{name}'");
            }
        }

        let Some(measure) = names.iter().position(|n| n == measure_column) else {
            bail!("missing measure column '{measure_column}' (columns: {names:?})");
        };

        for (row_no, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                bail!(
                    "row {row_no}: expected {} fields but found {}",
                    names.len(),
                    row.len()
                );
            }
            let cell = &row[measure];
            if !cell.is_null() && cell.as_f64().is_none() {
                bail!("row {row_no}: measure '{measure_column}' is not numeric: '{cell}'");
            }
        }

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Column {
                name,
                kind: if i == measure {
                    ColumnKind::Measure
                } else {
                    ColumnKind::Categorical
                },
            })
            .collect();

        Ok(Table {
            columns,
            rows,
            measure,
        })
    }

    /// Same columns, different rows. Callers guarantee every row came from `self`.
    pub(crate) fn with_rows(&self, rows: Vec<Vec<CellValue>>) -> Table {
        Table {
            columns: self.columns.clone(),
            rows,
            measure: self.measure,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn measure_index(&self) -> usize {
        self.measure
    }

    pub fn measure_column(&self) -> &Column {
        &self.columns[self.measure]
    }

    /// The measure of a row; `None` for a null or NaN cell.
    pub fn measure_value(&self, row: &[CellValue]) -> Option<f64> {
        row.get(self.measure)
            .and_then(CellValue::as_f64)
            .filter(|v| !v.is_nan())
    }

    /// Categorical columns with their positions, in table order.
    pub fn categorical_columns(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == ColumnKind::Categorical)
    }

    /// Position of the first non-measure column, the chart's category axis.
    pub fn first_category_index(&self) -> Option<usize> {
        self.categorical_columns().next().map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn infer_prefers_narrowest_type() {
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("NaN"), CellValue::Null);
        assert_eq!(CellValue::infer("12"), CellValue::Integer(12));
        assert_eq!(CellValue::infer("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::infer("true"), CellValue::Bool(true));
        assert_eq!(CellValue::infer("停職"), s("停職"));
        assert_eq!(CellValue::infer("NAN"), CellValue::Null);
    }

    #[test]
    fn float_equality_agrees_with_ordering() {
        let nan = CellValue::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(CellValue::Float(0.0), CellValue::Float(-0.0));

        let set: HashSet<CellValue> = [nan.clone(), nan, CellValue::Float(1.5)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn whole_floats_display_with_fraction() {
        assert_eq!(CellValue::Float(5.0).to_string(), "5.0");
        assert_eq!(CellValue::Float(-2.0).to_string(), "-2.0");
        assert_eq!(CellValue::Float(1.25).to_string(), "1.25");
        assert_eq!(CellValue::Integer(5).to_string(), "5");
    }

    #[test]
    fn measure_column_is_declared_once() {
        let table = Table::new(
            vec!["dept".into(), "count".into(), "role".into()],
            vec![vec![s("A"), CellValue::Integer(3), s("X")]],
            "count",
        )
        .unwrap();

        assert_eq!(table.measure_index(), 1);
        assert_eq!(table.measure_column().kind, ColumnKind::Measure);
        let categorical: Vec<_> = table
            .categorical_columns()
            .map(|(_, c)| c.name.as_str())
            .collect();
        assert_eq!(categorical, vec!["dept", "role"]);
        assert_eq!(table.first_category_index(), Some(0));
    }

    #[test]
    fn rejects_missing_measure() {
        let err = Table::new(vec!["dept".into()], vec![], "count").unwrap_err();
        assert!(err.to_string().contains("missing measure column"));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(
            vec!["dept".into(), "count".into()],
            vec![vec![s("A")]],
            "count",
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected 2 fields"));
    }

    #[test]
    fn rejects_non_numeric_measure() {
        let err = Table::new(
            vec!["dept".into(), "count".into()],
            vec![vec![s("A"), s("many")]],
            "count",
        )
        .unwrap_err();
        assert!(err.to_string().contains("not numeric"));
    }

    #[test]
    fn null_measure_is_allowed() {
        let table = Table::new(
            vec!["dept".into(), "count".into()],
            vec![vec![s("A"), CellValue::Null]],
            "count",
        )
        .unwrap();
        assert_eq!(table.measure_value(&table.rows()[0]), None);
        assert!(!table.is_empty());
        assert!(table.with_rows(Vec::new()).is_empty());
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = Table::new(vec!["count".into(), "count".into()], vec![], "count").unwrap_err();
        assert!(err.to_string().contains("duplicate column"));
    }
}
