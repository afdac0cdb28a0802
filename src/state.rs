use std::collections::BTreeSet;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::loader::TableCache;
use crate::data::model::{CellValue, Table};
use crate::data::planner::{classify, FilterInput, FilterPlan, FilterState};
use crate::data::query::{apply, SortOrder};
use crate::data::registry::DatasetRegistry;
use crate::error::{ExplorerError, ExplorerResult};
use crate::view::chart::{encode, ChartEncoding, ChartKind};
use crate::view::grid::GridModel;
use crate::view::ViewMode;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.  Every control change runs
/// one full recompute through [`AppState::refresh`].
pub struct AppState {
    pub config: AppConfig,
    pub registry: DatasetRegistry,
    cache: TableCache,

    /// Label of the selected dataset.
    pub selected_label: Option<String>,

    /// Currently loaded table (None when nothing is selected or loading failed).
    pub table: Option<Arc<Table>>,

    /// Column classification of `table`.
    pub plan: FilterPlan,

    /// Per-column filter inputs.
    pub filters: FilterState,

    pub sort_order: SortOrder,
    pub view_mode: ViewMode,
    pub chart_kind: ChartKind,

    /// Filtered and sorted rows (cached).
    pub output: Option<Table>,

    /// Chart projection of `output`.
    pub chart: Option<ChartEncoding>,

    /// Category colours of `chart`.
    pub color_map: Option<ColorMap>,

    /// Editable grid copy of `output`.
    pub grid: GridModel,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the state and select the first registered dataset.
    pub fn new(config: AppConfig) -> Self {
        let registry = DatasetRegistry::new(config.datasets.clone());
        let cache = TableCache::new(config.measure_column.clone());
        let first = registry.labels().first().map(|l| l.to_string());

        let mut state = Self {
            config,
            registry,
            cache,
            selected_label: None,
            table: None,
            plan: FilterPlan::default(),
            filters: FilterState::default(),
            sort_order: SortOrder::default(),
            view_mode: ViewMode::default(),
            chart_kind: ChartKind::default(),
            output: None,
            chart: None,
            color_map: None,
            grid: GridModel::default(),
            status_message: None,
        };
        if let Some(label) = first {
            state.select_dataset(&label);
        }
        state
    }

    /// Switch to another dataset: load (memoized), reclassify columns and
    /// clear every filter input.
    pub fn select_dataset(&mut self, label: &str) {
        self.selected_label = Some(label.to_string());
        self.filters.clear();
        self.plan = FilterPlan::default();
        self.table = None;
        self.clear_output();

        match self.load(label) {
            Ok(table) => {
                self.plan = classify(&table, self.config.enumerable_limit);
                log::info!(
                    "Selected '{label}': {} rows, {} filterable columns",
                    table.len(),
                    self.plan.columns().len()
                );
                self.table = Some(table);
                self.status_message = None;
                self.refresh();
            }
            Err(e) => self.report(e),
        }
    }

    fn load(&self, label: &str) -> ExplorerResult<Arc<Table>> {
        let source = self.registry.resolve(label)?;
        self.cache.load(source)
    }

    /// Recompute output, grid and chart from the current table and controls.
    pub fn refresh(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        let result = self
            .plan
            .predicates(&self.filters)
            .and_then(|predicates| apply(&table, &predicates, self.sort_order.into()));

        match result {
            Ok(output) => {
                self.grid = GridModel::from_table(&output);
                self.chart = encode(&output, self.chart_kind);
                self.color_map = self
                    .chart
                    .as_ref()
                    .map(|chart| ColorMap::new(chart.categories()));
                self.output = Some(output);
                self.status_message = None;
            }
            Err(e) => {
                self.clear_output();
                self.report(e);
            }
        }
    }

    fn clear_output(&mut self) {
        self.output = None;
        self.chart = None;
        self.color_map = None;
        self.grid = GridModel::default();
    }

    fn report(&mut self, error: ExplorerError) {
        log::error!("{error}");
        self.status_message = Some(format!("Error: {error}"));
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.refresh();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.refresh();
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart_kind = kind;
        self.refresh();
    }

    /// Toggle a single value in a multi-select column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let entry = self
            .filters
            .entry(column.to_string())
            .or_insert_with(|| FilterInput::Selection(BTreeSet::new()));
        match entry {
            FilterInput::Selection(selected) => {
                if !selected.remove(value) {
                    selected.insert(value.clone());
                }
            }
            FilterInput::Keyword(_) => {
                log::warn!("Ignoring value toggle on free-text column '{column}'");
                return;
            }
        }
        self.refresh();
    }

    /// Set the keyword of a free-text column's filter.
    pub fn set_keyword(&mut self, column: &str, keyword: &str) {
        self.filters
            .insert(column.to_string(), FilterInput::Keyword(keyword.to_string()));
        self.refresh();
    }

    /// Drop a column's filter input.
    pub fn clear_filter(&mut self, column: &str) {
        if self.filters.remove(column).is_some() {
            self.refresh();
        }
    }

    /// Values currently selected for a multi-select column.
    pub fn selected_values(&self, column: &str) -> Option<&BTreeSet<CellValue>> {
        match self.filters.get(column) {
            Some(FilterInput::Selection(values)) => Some(values),
            _ => None,
        }
    }

    /// Keyword currently typed for a free-text column.
    pub fn keyword(&self, column: &str) -> &str {
        match self.filters.get(column) {
            Some(FilterInput::Keyword(keyword)) => keyword.as_str(),
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use crate::config::DatasetEntry;

    fn unique_test_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("discipline-explorer-{prefix}-{nanos}"));
        fs::create_dir_all(&dir).expect("should create temp dir");
        dir
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn state_with(dir: &Path) -> AppState {
        let first = dir.join("first.csv");
        let second = dir.join("second.csv");
        fs::write(&first, "\u{feff}dept,role,count\nA,X,5\nB,Y,10\nA,Z,5\n").unwrap();
        fs::write(&second, "unit,count\nU1,1\nU2,2\n").unwrap();

        let config = AppConfig {
            measure_column: "count".into(),
            datasets: vec![
                DatasetEntry {
                    label: "first".into(),
                    source: first.to_string_lossy().into_owned(),
                },
                DatasetEntry {
                    label: "second".into(),
                    source: second.to_string_lossy().into_owned(),
                },
                DatasetEntry {
                    label: "broken".into(),
                    source: dir.join("missing.csv").to_string_lossy().into_owned(),
                },
            ],
            ..AppConfig::default()
        };
        AppState::new(config)
    }

    fn output_depts(state: &AppState) -> Vec<String> {
        state
            .output
            .as_ref()
            .map(|t| t.rows().iter().map(|r| r[0].to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn first_dataset_is_selected_and_sorted_descending() {
        let dir = unique_test_dir("state-initial");
        let state = state_with(&dir);

        assert_eq!(state.selected_label.as_deref(), Some("first"));
        assert_eq!(output_depts(&state), vec!["B", "A", "A"]);
        assert_eq!(state.grid.rows.len(), 3);
        assert_eq!(state.chart.as_ref().unwrap().category_column, "dept");
        assert!(state.status_message.is_none());

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn controls_trigger_recompute() {
        let dir = unique_test_dir("state-controls");
        let mut state = state_with(&dir);

        state.toggle_filter_value("dept", &s("A"));
        assert_eq!(output_depts(&state), vec!["A", "A"]);

        state.set_sort_order(SortOrder::Ascending);
        state.toggle_filter_value("dept", &s("A"));
        assert_eq!(output_depts(&state), vec!["A", "A", "B"]);

        state.set_chart_kind(ChartKind::Pie);
        assert!(state.chart.as_ref().unwrap().legend);

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn switching_dataset_resets_filters_and_reclassifies() {
        let dir = unique_test_dir("state-switch");
        let mut state = state_with(&dir);
        state.toggle_filter_value("dept", &s("A"));

        state.select_dataset("second");
        assert!(state.filters.is_empty());
        let names: Vec<_> = state.plan.columns().iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["unit"]);
        assert_eq!(output_depts(&state), vec!["U2", "U1"]);

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn load_failure_shows_no_partial_table() {
        let dir = unique_test_dir("state-broken");
        let mut state = state_with(&dir);

        state.select_dataset("broken");
        assert!(state.table.is_none());
        assert!(state.output.is_none());
        assert!(state.grid.rows.is_empty());
        assert!(state.status_message.as_deref().unwrap().contains("failed to load"));

        state.select_dataset("nope");
        assert!(state.status_message.as_deref().unwrap().contains("unknown dataset"));

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }

    #[test]
    fn invalid_filter_input_is_surfaced() {
        let dir = unique_test_dir("state-invalid");
        let mut state = state_with(&dir);

        state.set_keyword("dept", "A");
        assert!(state.output.is_none());
        assert!(state.status_message.as_deref().unwrap().contains("invalid filter"));

        state.clear_filter("dept");
        assert_eq!(output_depts(&state).len(), 3);
        assert!(state.status_message.is_none());

        fs::remove_dir_all(&dir).expect("should cleanup temp dir");
    }
}
