use eframe::egui;

use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SpeccorrApp {
    pub state: ViewerState,
}

impl SpeccorrApp {
    pub fn new(state: ViewerState) -> Self {
        Self { state }
    }
}

impl eframe::App for SpeccorrApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: result and series toggles ----
        egui::SidePanel::left("result_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::similarity_plot(ui, &self.state);
        });
    }
}

/// Open the plot window and block until it is closed.
pub fn run_viewer(state: ViewerState) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(state.style.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "speccorr – Spectral Similarity",
        options,
        Box::new(move |_cc| Ok(Box::new(SpeccorrApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("plot viewer failed: {e}"))
}
