use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints, VLine};

use crate::chart::SeriesKind;
use crate::color::Rgb8;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Similarity plot (central panel)
// ---------------------------------------------------------------------------

pub fn color32(rgb: Rgb8) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Render the normalized curves (and residuals / baselines) in the central panel.
pub fn similarity_plot(ui: &mut Ui, state: &ViewerState) {
    if state.visible_series().next().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No series selected");
        });
        return;
    }

    let normalize_at = state.report.band.normalize_at;
    let width = (state.style.line_width / 2.0).max(1.0);

    Plot::new("similarity_plot")
        .legend(Legend::default())
        .x_axis_label(state.chart.x_label.clone())
        .y_axis_label(state.chart.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in state.visible_series() {
                let points: PlotPoints = series.points.iter().copied().collect();

                let mut line = Line::new(points)
                    .name(&series.label)
                    .color(color32(series.color))
                    .width(width);
                if series.kind == SeriesKind::Trend {
                    line = line.style(LineStyle::dashed_dense());
                }

                plot_ui.line(line);
            }

            // Where both curves equal 1.0.
            plot_ui.vline(
                VLine::new(normalize_at)
                    .color(Color32::GRAY)
                    .style(LineStyle::dotted_loose()),
            );
        });
}
