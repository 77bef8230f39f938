use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::DataSource;
use crate::data::model::Dimension;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let all_values = dataset.values_of(dim);
                let n_selected = state.selection.selected(dim).len();
                let header_text = format!(
                    "Select {}(s)  ({n_selected}/{})",
                    dim.column(),
                    all_values.len()
                );

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for val in all_values {
                            let mut checked = state.selection.selected(dim).contains(val);
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_filter_value(dim, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload default source").clicked() {
                state.reload_default_source();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(snap)) = (&state.dataset, &state.snapshot) {
            ui.label(format!(
                "{} policyholders loaded, {} selected",
                ds.len(),
                snap.matching
            ));

            if !ds.date_warnings.is_empty() {
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "{} unparsable dates set to missing",
                        ds.date_warnings.len()
                    ))
                    .color(Color32::YELLOW),
                )
                .on_hover_text(
                    ds.date_warnings
                        .iter()
                        .take(10)
                        .map(|w| w.to_string())
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open policyholder data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_source(DataSource::File(path));
    }
}
