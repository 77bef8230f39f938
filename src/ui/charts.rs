use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints};

use super::format;
use crate::color::{AGE_BLUE, INCOME_BLUE};
use crate::data::pipeline::ChartSeries;
use crate::data::series::{ChartSpec, NumericColumn, Series};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 240.0;
const CATEGORY_BAR_WIDTH: f64 = 0.6;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render all charts of the current snapshot, two per row.
pub fn chart_grid(ui: &mut Ui, state: &AppState) {
    let Some(snapshot) = &state.snapshot else {
        return;
    };

    for pair in snapshot.charts.chunks(2) {
        ui.columns(2, |cols| {
            for (col, chart) in cols.iter_mut().zip(pair) {
                chart_card(col, state, chart);
            }
        });
        ui.add_space(12.0);
    }
}

fn chart_card(ui: &mut Ui, state: &AppState, chart: &ChartSeries) {
    ui.label(RichText::new(chart.def.title).heading());

    if chart.series.is_empty() {
        ui.allocate_ui([ui.available_width(), CHART_HEIGHT].into(), |ui: &mut Ui| {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.weak("No data for the current selection");
            });
        });
        return;
    }

    match (&chart.def.spec, &chart.series) {
        (ChartSpec::Histogram { column, .. }, Series::Histogram { bins, density }) => {
            let color = match column {
                NumericColumn::Age => AGE_BLUE,
                _ => INCOME_BLUE,
            };
            let bars = bins
                .iter()
                .map(|b| {
                    Bar::new(b.center(), b.count as f64)
                        .width(b.width())
                        .name(format!("{:.0} – {:.0}", b.start, b.end))
                })
                .collect();

            Plot::new(chart.def.title)
                .height(CHART_HEIGHT)
                .include_y(0.0)
                .allow_boxed_zoom(false)
                .allow_drag(false)
                .allow_scroll(false)
                .allow_zoom(false)
                .x_axis_label(column.name())
                .x_axis_formatter(|mark: GridMark, _range| format::axis_value(mark.value))
                .y_axis_label("Count")
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).color(color).name("Count"));
                    if !density.is_empty() {
                        let points: PlotPoints = density.iter().copied().collect();
                        plot_ui.line(Line::new(points).color(color).width(2.0).name("Density"));
                    }
                });
        }
        (
            ChartSpec::CategoryCounts { column } | ChartSpec::RankedCategoryCounts { column },
            Series::Counts(counts),
        ) => {
            let colors = state.colors_for(*column);
            let values = counts
                .iter()
                .map(|(label, n)| (label.clone(), *n as f64, colors.map(|c| c.color_for(label))))
                .collect();
            category_plot(ui, chart.def.title, column.name(), "Count", values);
        }
        (ChartSpec::GroupedMean { group, value }, Series::GroupedMeans(means)) => {
            let colors = state.colors_for(*group);
            let values = means
                .iter()
                .filter(|(_, mean)| mean.is_finite())
                .map(|(label, mean)| (label.clone(), *mean, colors.map(|c| c.color_for(label))))
                .collect();
            category_plot(ui, chart.def.title, group.name(), value.name(), values);
        }
        (spec, _) => {
            log::warn!("Series does not match chart spec {spec:?}");
        }
    }
}

/// Bars at x = 0, 1, 2, … labelled with their category.
fn category_plot(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    values: Vec<(String, f64, Option<Color32>)>,
) {
    let labels: Vec<String> = values.iter().map(|(label, _, _)| label.clone()).collect();
    let bars = values
        .into_iter()
        .enumerate()
        .map(|(i, (label, value, color))| {
            let bar = Bar::new(i as f64, value)
                .width(CATEGORY_BAR_WIDTH)
                .name(label);
            match color {
                Some(c) => bar.fill(c),
                None => bar,
            }
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .include_y(0.0)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark: GridMark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .y_axis_formatter(|mark: GridMark, _range| format::axis_value(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
