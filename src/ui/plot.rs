use std::f32::consts::TAU;

use eframe::egui::{Color32, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::ColorMap;
use crate::state::AppState;
use crate::view::chart::{ChartEncoding, ChartKind};

/// Pie slices are drawn as fans of wedges no wider than this, so every
/// polygon handed to the painter is convex.
const MAX_WEDGE: f32 = TAU / 32.0;

// ---------------------------------------------------------------------------
// Chart view (central panel)
// ---------------------------------------------------------------------------

/// Render the chart for the current pipeline output.
pub fn chart_view(ui: &mut Ui, state: &AppState) {
    let (Some(chart), Some(colors)) = (&state.chart, &state.color_map) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No category column to chart.");
        });
        return;
    };
    if chart.marks.is_empty() {
        ui.label("No rows match the current filters.");
        return;
    }

    match chart.kind {
        ChartKind::Bar => bar_chart(ui, chart, colors, state.config.chart_height),
        ChartKind::Pie => pie_chart(ui, chart, colors, state.config.chart_height),
    }
}

/// Horizontal bars, largest on top, category on the vertical axis.
fn bar_chart(ui: &mut Ui, chart: &ChartEncoding, colors: &ColorMap, height: f32) {
    let n = chart.marks.len();
    // Marks arrive largest first; the first one goes to the top row.
    let bars: Vec<Bar> = chart
        .marks
        .iter()
        .enumerate()
        .map(|(i, mark)| {
            Bar::new((n - 1 - i) as f64, mark.value)
                .name(&mark.label)
                .fill(colors.color_for(&mark.category))
                .width(0.7)
        })
        .collect();

    let labels: Vec<String> = chart.marks.iter().rev().map(|m| m.label.clone()).collect();

    Plot::new("bar_chart")
        .height(height)
        .x_axis_label(chart.measure_column.clone())
        .y_axis_label(chart.category_column.clone())
        .y_axis_formatter(move |mark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > f64::EPSILON || pos < 0.0 {
                return String::new();
            }
            labels.get(pos as usize).cloned().unwrap_or_default()
        })
        .include_x(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

/// Pie with arc size proportional to the measure and a category legend.
fn pie_chart(ui: &mut Ui, chart: &ChartEncoding, colors: &ColorMap, height: f32) {
    ui.horizontal(|ui: &mut Ui| {
        let size = height.min(ui.available_width() * 0.7).max(100.0);
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size * 0.45;

        // Angles run clockwise from 12 o'clock.
        let point = |angle: f32| center + radius * Vec2::new(angle.sin(), -angle.cos());

        let mut start = 0.0_f32;
        let mut hovered = None;
        for mark in &chart.marks {
            let sweep = mark.fraction as f32 * TAU;
            if sweep <= 0.0 {
                continue;
            }
            let color = colors.color_for(&mark.category);
            let steps = (sweep / MAX_WEDGE).ceil().max(1.0) as usize;
            for step in 0..steps {
                let a0 = start + sweep * step as f32 / steps as f32;
                let a1 = start + sweep * (step + 1) as f32 / steps as f32;
                painter.add(Shape::convex_polygon(
                    vec![center, point(a0), point(a1)],
                    color,
                    Stroke::NONE,
                ));
            }
            painter.line_segment([center, point(start)], Stroke::new(1.0, Color32::WHITE));

            if let Some(pos) = response.hover_pos() {
                if in_slice(pos, center, radius, start, start + sweep) {
                    hovered = Some(mark);
                }
            }
            start += sweep;
        }

        if let Some(mark) = hovered {
            response.on_hover_text(format!(
                "{}: {}\n{}: {}",
                chart.category_column, mark.label, chart.measure_column, mark.value
            ));
        }

        if !chart.legend {
            return;
        }
        ui.vertical(|ui: &mut Ui| {
            ui.strong(&chart.category_column);
            ui.label(format!("{}: {}", chart.measure_column, chart.total()));
            for (label, color) in colors.legend_entries() {
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, color);
                    ui.label(label);
                });
            }
        });
    });
}

fn in_slice(pos: Pos2, center: Pos2, radius: f32, from: f32, to: f32) -> bool {
    let d = pos - center;
    if d.length() > radius {
        return false;
    }
    let angle = d.x.atan2(-d.y).rem_euclid(TAU);
    angle >= from && angle < to
}
