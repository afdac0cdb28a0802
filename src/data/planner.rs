use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::filter::Predicate;
use super::model::{CellValue, Table};
use crate::error::{ExplorerError, ExplorerResult};

// ---------------------------------------------------------------------------
// Column classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Few distinct values: filtered with a multi-select.
    Enumerable,
    /// Too many distinct values to list: filtered with a substring.
    FreeText,
}

/// Filter plan for one categorical column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    pub column: String,
    pub classification: Classification,
    /// Number of distinct non-null values.
    pub distinct_count: usize,
    /// Distinct non-null values in first-seen order; empty unless enumerable.
    pub distinct_values: Vec<CellValue>,
}

/// Per-column user input, as read from the filter widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterInput {
    Selection(BTreeSet<CellValue>),
    Keyword(String),
}

impl FilterInput {
    /// Whether the input constrains anything.  Empty selections and blank
    /// keywords mean "no filter".
    pub fn is_active(&self) -> bool {
        match self {
            FilterInput::Selection(values) => !values.is_empty(),
            FilterInput::Keyword(keyword) => !keyword.trim().is_empty(),
        }
    }
}

/// Per-column filter inputs: column name → input.  Absent means no filter.
pub type FilterState = BTreeMap<String, FilterInput>;

// ---------------------------------------------------------------------------
// FilterPlan
// ---------------------------------------------------------------------------

/// Classification of every categorical column of one table.  Derived from the
/// current table only; rebuild it whenever the dataset changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterPlan {
    columns: Vec<ColumnPlan>,
}

/// Classify each non-measure column by its distinct non-null value count:
/// at most `limit` is enumerable, more is free text.
pub fn classify(table: &Table, limit: usize) -> FilterPlan {
    let columns = table
        .categorical_columns()
        .map(|(index, column)| {
            let mut seen = HashSet::new();
            let mut distinct = Vec::new();
            for row in table.rows() {
                let cell = &row[index];
                if !cell.is_null() && seen.insert(cell) {
                    distinct.push(cell.clone());
                }
            }

            let distinct_count = distinct.len();
            let classification = if distinct_count <= limit {
                Classification::Enumerable
            } else {
                distinct.clear();
                Classification::FreeText
            };
            ColumnPlan {
                column: column.name.clone(),
                classification,
                distinct_count,
                distinct_values: distinct,
            }
        })
        .collect();

    FilterPlan { columns }
}

impl FilterPlan {
    pub fn columns(&self) -> &[ColumnPlan] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnPlan> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Turn user inputs into the active predicate set, one predicate per
    /// column with a non-empty input, in column order.
    ///
    /// Inputs that cannot have come from the widgets this plan generates
    /// (unknown column, wrong input kind, a value not present in the data)
    /// are errors.
    pub fn predicates(&self, inputs: &FilterState) -> ExplorerResult<Vec<Predicate>> {
        if let Some(stray) = inputs.keys().find(|name| self.column(name).is_none()) {
            return Err(ExplorerError::filter(stray, "no filter widget for this column"));
        }

        let mut predicates = Vec::new();
        for plan in &self.columns {
            let Some(input) = inputs.get(&plan.column) else {
                continue;
            };
            if !input.is_active() {
                continue;
            }
            let predicate = match (plan.classification, input) {
                (Classification::Enumerable, FilterInput::Selection(values)) => {
                    if let Some(unknown) = values.iter().find(|v| !plan.distinct_values.contains(*v)) {
                        return Err(ExplorerError::filter(
                            &plan.column,
                            format!("selected value '{unknown}' does not occur in the data"),
                        ));
                    }
                    Predicate::Membership {
                        column: plan.column.clone(),
                        allowed: values.clone(),
                    }
                }
                (Classification::FreeText, FilterInput::Keyword(keyword)) => Predicate::Contains {
                    column: plan.column.clone(),
                    substring: keyword.clone(),
                },
                (Classification::Enumerable, FilterInput::Keyword(_)) => {
                    return Err(ExplorerError::filter(
                        &plan.column,
                        "keyword given for a multi-select column",
                    ));
                }
                (Classification::FreeText, FilterInput::Selection(_)) => {
                    return Err(ExplorerError::filter(
                        &plan.column,
                        "selection given for a free-text column",
                    ));
                }
            };
            predicates.push(predicate);
        }
        Ok(predicates)
    }
}
