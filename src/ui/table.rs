use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use super::format;
use crate::data::model::Dataset;

const ROW_HEIGHT: f32 = 20.0;

/// Raw rows of the current selection, every column in header order.
pub fn preview_table(ui: &mut Ui, dataset: &Dataset, rows: &[usize]) {
    if rows.is_empty() {
        ui.weak("No rows match the current selection.");
        return;
    }

    let columns = &dataset.column_names;

    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0).resizable(true), columns.len())
                .header(ROW_HEIGHT, |mut header| {
                    for name in columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let record = &dataset.records[rows[row.index()]];
                        for name in columns {
                            row.col(|ui: &mut Ui| {
                                ui.label(format::cell(&record.cell(name)));
                            });
                        }
                    });
                });
        });
}
