//! Pure projections of the pipeline output, consumed by the UI.
//!
//! Nothing here filters or reorders rows, except the bar chart's fixed
//! descending-by-value arrangement.

pub mod chart;
pub mod grid;

/// Which presentation the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Table,
    Chart,
}
