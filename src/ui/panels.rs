use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use super::plot::color32;
use crate::chart::SeriesKind;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – result summary and series toggles
// ---------------------------------------------------------------------------

/// Render the left result panel.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Similarity");
    ui.separator();

    let report = &state.report;
    egui::Grid::new("similarity_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Correlation");
            ui.strong(format!("{:.6}", report.correlation));
            ui.end_row();

            ui.label("Spectral angle");
            ui.strong(format!("{:.6}°", report.angle_degrees));
            ui.end_row();

            ui.label("Band");
            ui.label(format!(
                "{} – {} nm, step {}",
                report.band.from, report.band.to, report.band.step
            ));
            ui.end_row();

            ui.label("Normalized at");
            ui.label(format!("{} nm", report.band.normalize_at));
            ui.end_row();

            ui.label("Baseline");
            ui.label(match report.detrend_order {
                Some(order) => order.to_string(),
                None => "none".to_string(),
            });
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.strong("Spectra");
    ui.push_id("spectra_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Name");
                });
                header.col(|ui| {
                    ui.strong("Points");
                });
                header.col(|ui| {
                    ui.strong("Range (nm)");
                });
            })
            .body(|mut body| {
                for sp in &report.spectra {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(sp.name.as_str());
                        });
                        row.col(|ui| {
                            ui.label(sp.points.to_string());
                        });
                        row.col(|ui| {
                            ui.label(format!(
                                "{:.1} – {:.1}",
                                sp.min_wavelength, sp.max_wavelength
                            ));
                        });
                    });
                }
            });
    });

    ui.add_space(8.0);
    ui.strong("Series");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let entries: Vec<(String, Color32)> = state
        .chart
        .series
        .iter()
        .map(|s| (s.label.clone(), color32(s.color)))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (idx, (label, color)) in entries.iter().enumerate() {
                let mut checked = state.visible[idx];
                if ui
                    .checkbox(&mut checked, RichText::new(label).color(*color))
                    .changed()
                {
                    state.set_visible(idx, checked);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save PNG…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui.button("All series").clicked() {
            state.show_all();
        }
        if ui.button("Normalized").clicked() {
            state.show_only(SeriesKind::Normalized);
        }
        if state.has_kind(SeriesKind::Residual) && ui.button("Residuals").clicked() {
            state.show_only(SeriesKind::Residual);
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Save plot")
        .add_filter("PNG image", &["png"])
        .set_file_name("spectra.png")
        .save_file();

    if let Some(path) = file {
        state.save_png(&path);
    }
}
