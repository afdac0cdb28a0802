use eframe::egui::{self, CollapsingHeader, Color32, RichText, ScrollArea, Ui};

use crate::data::model::CellValue;
use crate::data::planner::Classification;
use crate::data::query::SortOrder;
use crate::state::AppState;
use crate::view::chart::{category_label, ChartKind};
use crate::view::ViewMode;

// ---------------------------------------------------------------------------
// Left side panel – display settings and filter widgets
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("表示設定");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            dataset_selector(ui, state);
            ui.separator();
            display_controls(ui, state);
            ui.separator();
            filter_widgets(ui, state);
        });
}

fn dataset_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("データセットを選択");
    let current = state.selected_label.clone().unwrap_or_default();
    let labels: Vec<String> = state
        .registry
        .labels()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut chosen = None;
    egui::ComboBox::from_id_salt("dataset")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for label in &labels {
                if ui.selectable_label(current == *label, label).clicked() {
                    chosen = Some(label.clone());
                }
            }
        });

    if let Some(label) = chosen.filter(|l| *l != current) {
        state.select_dataset(&label);
    }
}

fn display_controls(ui: &mut Ui, state: &mut AppState) {
    let measure = state.config.measure_column.clone();

    ui.strong("並び順を選択");
    let mut order = state.sort_order;
    ui.radio_value(&mut order, SortOrder::Descending, format!("{measure}の多い順"));
    ui.radio_value(&mut order, SortOrder::Ascending, format!("{measure}の少ない順"));
    if order != state.sort_order {
        state.set_sort_order(order);
    }

    ui.add_space(4.0);
    ui.strong("表示形式");
    let mut mode = state.view_mode;
    ui.radio_value(&mut mode, ViewMode::Table, "表で表示");
    ui.radio_value(&mut mode, ViewMode::Chart, "グラフで表示");
    if mode != state.view_mode {
        state.set_view_mode(mode);
    }

    ui.add_space(4.0);
    ui.strong("グラフの種類");
    let mut kind = state.chart_kind;
    let kind_label = |k: ChartKind| match k {
        ChartKind::Bar => "棒グラフ",
        ChartKind::Pie => "円グラフ",
    };
    egui::ComboBox::from_id_salt("chart_kind")
        .selected_text(kind_label(kind))
        .show_ui(ui, |ui: &mut Ui| {
            for k in [ChartKind::Bar, ChartKind::Pie] {
                ui.selectable_value(&mut kind, k, kind_label(k));
            }
        });
    if kind != state.chart_kind {
        state.set_chart_kind(kind);
    }
}

/// One widget per filterable column: a checkbox list for enumerable columns,
/// a keyword field for free-text ones.
fn filter_widgets(ui: &mut Ui, state: &mut AppState) {
    ui.strong("絞り込み設定");

    // Clone the plan so we can mutate state inside the loop.
    let plan = state.plan.clone();
    if plan.columns().is_empty() {
        ui.label("No filterable columns.");
        return;
    }

    for col in plan.columns() {
        match col.classification {
            Classification::Enumerable => {
                let selected = state
                    .selected_values(&col.column)
                    .cloned()
                    .unwrap_or_default();
                let header_text = format!(
                    "{}で絞り込み  ({}/{})",
                    col.column,
                    selected.len(),
                    col.distinct_count
                );

                let mut toggled: Vec<CellValue> = Vec::new();
                let mut clear = false;
                CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(&col.column)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("クリア").clicked() {
                            clear = true;
                        }
                        for val in &col.distinct_values {
                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, category_label(val)).changed() {
                                toggled.push(val.clone());
                            }
                        }
                    });

                if clear {
                    state.clear_filter(&col.column);
                }
                for val in &toggled {
                    state.toggle_filter_value(&col.column, val);
                }
            }
            Classification::FreeText => {
                ui.label(format!("{}を含むキーワード", col.column));
                let mut keyword = state.keyword(&col.column).to_string();
                if ui.text_edit_singleline(&mut keyword).changed() {
                    state.set_keyword(&col.column, &keyword);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(&state.config.title);
        ui.separator();

        if let (Some(table), Some(output)) = (&state.table, &state.output) {
            ui.label(format!("{} rows loaded, {} visible", table.len(), output.len()));
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom panel – interpretation notes
// ---------------------------------------------------------------------------

pub fn notes_panel(ui: &mut Ui, notes: &str) {
    ui.add_space(4.0);
    ui.heading("解釈");
    ui.label(notes);
    ui.add_space(4.0);
}
