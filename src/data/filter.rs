use std::collections::BTreeSet;

use super::model::{CellValue, ColumnKind, Table};
use crate::error::{ExplorerError, ExplorerResult};

// ---------------------------------------------------------------------------
// Predicate – one column-scoped filter condition
// ---------------------------------------------------------------------------

/// A single column-scoped filter.  A row passes a predicate set when it
/// passes every predicate; the empty set passes everything.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Cell must equal one of `allowed` exactly.
    Membership {
        column: String,
        allowed: BTreeSet<CellValue>,
    },
    /// Cell text must contain `substring` (case-sensitive).
    Contains { column: String, substring: String },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Predicate::Membership { column, .. } | Predicate::Contains { column, .. } => column,
        }
    }

    /// Test one cell.  A null cell never matches.
    pub fn matches(&self, cell: &CellValue) -> bool {
        if cell.is_null() {
            return false;
        }
        match self {
            Predicate::Membership { allowed, .. } => allowed.contains(cell),
            Predicate::Contains { substring, .. } => cell.to_string().contains(substring.as_str()),
        }
    }

    /// Resolve the predicate's column against `table`.
    ///
    /// Predicates naming an unknown column or the measure column are defects
    /// upstream and are reported rather than ignored.
    pub(crate) fn bind(&self, table: &Table) -> ExplorerResult<usize> {
        let column = self.column();
        let index = table
            .column_index(column)
            .ok_or_else(|| ExplorerError::filter(column, "column not present in table"))?;
        if table.columns()[index].kind == ColumnKind::Measure {
            return Err(ExplorerError::filter(
                column,
                "the measure column cannot be filtered",
            ));
        }
        Ok(index)
    }
}

/// Whether `row` satisfies every bound predicate.
pub(crate) fn row_matches(row: &[CellValue], bound: &[(usize, &Predicate)]) -> bool {
    bound
        .iter()
        .all(|(index, predicate)| predicate.matches(&row[*index]))
}
