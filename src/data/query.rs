use std::cmp::Ordering;

use super::filter::{row_matches, Predicate};
use super::model::Table;
use crate::error::ExplorerResult;

/// Direction of the measure-column sort, as offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

/// The single active sort: always keyed on the table's measure column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub ascending: bool,
}

impl From<SortOrder> for SortSpec {
    fn from(order: SortOrder) -> Self {
        SortSpec {
            ascending: order == SortOrder::Ascending,
        }
    }
}

/// Filter `table` by the conjunction of `predicates`, then stable-sort the
/// survivors by the measure column.
///
/// Null measures sort last in either direction.  Rows with equal measures
/// keep their input order.  The result has the input's columns; rows are
/// neither duplicated nor invented.
pub fn apply(table: &Table, predicates: &[Predicate], sort: SortSpec) -> ExplorerResult<Table> {
    let bound = predicates
        .iter()
        .map(|p| p.bind(table).map(|index| (index, p)))
        .collect::<ExplorerResult<Vec<_>>>()?;

    let mut rows: Vec<_> = table
        .rows()
        .iter()
        .filter(|row| row_matches(row, &bound))
        .cloned()
        .collect();

    // `sort_by` is stable.
    rows.sort_by(|a, b| {
        compare_measure(table.measure_value(a), table.measure_value(b), sort.ascending)
    });

    log::debug!(
        "Pipeline: {} predicates, {} of {} rows, ascending={}",
        predicates.len(),
        rows.len(),
        table.len(),
        sort.ascending
    );
    Ok(table.with_rows(rows))
}

fn compare_measure(a: Option<f64>, b: Option<f64>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if ascending => x.total_cmp(&y),
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
