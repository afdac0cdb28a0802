use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{grid, panels, plot};
use crate::view::ViewMode;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DisciplineExplorerApp {
    pub state: AppState,
}

impl DisciplineExplorerApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for DisciplineExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: settings and filters ----
        egui::SidePanel::left("settings_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: interpretation notes ----
        if let Some(notes) = self.state.config.notes.clone() {
            egui::TopBottomPanel::bottom("notes").show(ctx, |ui| {
                panels::notes_panel(ui, &notes);
            });
        }

        // ---- Central panel: table or chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(label) = self.state.selected_label.clone() else {
                return;
            };
            ui.heading(format!("{label} の懲戒処分データ"));
            ui.separator();

            let Some(output) = &self.state.output else {
                ui.label("No data to display.");
                return;
            };
            let no_matches = output.is_empty();
            match self.state.view_mode {
                ViewMode::Table => {
                    if no_matches {
                        ui.label("No rows match the current filters.");
                    }
                    grid::grid_view(ui, &mut self.state.grid);
                }
                ViewMode::Chart => plot::chart_view(ui, &self.state),
            }
        });
    }
}
