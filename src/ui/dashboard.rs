use eframe::egui::{self, RichText, ScrollArea, Ui};

use super::{charts, format, table};
use crate::data::metrics::Metrics;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Title, key metrics, charts and raw data preview.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(snapshot)) = (&state.dataset, &state.snapshot) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Loading dataset…");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.heading(RichText::new(&state.config.window_title).size(26.0).strong());
            });
            ui.separator();

            ui.heading("Key Metrics");
            metrics_row(ui, &snapshot.metrics);
            ui.separator();

            ui.heading("Visual Analytics");
            ui.add_space(6.0);
            charts::chart_grid(ui, state);
            ui.separator();

            ui.heading("Raw Data Preview");
            table::preview_table(ui, dataset, &snapshot.preview);
        });
}

fn metrics_row(ui: &mut Ui, m: &Metrics) {
    let cards = [
        ("Dropout Rate", format::percent(m.dropout_rate)),
        ("Renewal Rate", format::percent(m.renewal_rate)),
        ("Avg. Income", format::naira(m.avg_income)),
        ("Avg. Wallet Balance", format::naira(m.avg_wallet)),
        ("Denied Claims Rate", format::percent(m.denied_claims_rate)),
    ];

    ui.columns(cards.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(cards) {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.label(label);
                ui.label(RichText::new(value).size(22.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Blocking load failure
// ---------------------------------------------------------------------------

/// Full-window error state shown when no dataset could be loaded.
pub fn load_error_screen(ui: &mut Ui, state: &mut AppState, message: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        let error_color = ui.visuals().error_fg_color;
        ui.add_space(ui.available_height() * 0.3);
        ui.heading(RichText::new("Could not load the dataset").color(error_color));
        ui.add_space(8.0);
        ui.label(format!("Source: {}", state.source));
        ui.label(message);
        ui.add_space(12.0);
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Retry").clicked() {
                state.retry();
            }
            if ui.button("Open file…").clicked() {
                super::panels::open_file_dialog(state);
            }
        });
    });
}
