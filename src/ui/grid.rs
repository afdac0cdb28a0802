use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::view::grid::GridModel;

// ---------------------------------------------------------------------------
// Table view (central panel)
// ---------------------------------------------------------------------------

/// Render the editable grid.  Edits only touch the grid's own copy.
pub fn grid_view(ui: &mut Ui, grid: &mut GridModel) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("行を追加").clicked() {
            grid.add_row();
        }
        ui.label(RichText::new("編集内容は保存されません").weak());
    });
    ui.add_space(4.0);

    let mut remove = None;
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto())
        .columns(Column::auto().at_least(80.0).clip(true), grid.header.len())
        .header(22.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            for name in &grid.header {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(22.0, grid.rows.len(), |mut row| {
                let index = row.index();
                row.col(|ui: &mut Ui| {
                    if ui.small_button("✕").on_hover_text("行を削除").clicked() {
                        remove = Some(index);
                    }
                });
                for cell in grid.rows[index].iter_mut() {
                    row.col(|ui: &mut Ui| {
                        ui.add(egui::TextEdit::singleline(&mut *cell).desired_width(f32::INFINITY));
                    });
                }
            });
        });

    if let Some(index) = remove {
        grid.remove_row(index);
    }
}
