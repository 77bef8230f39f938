mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::DashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_args(std::env::args().skip(1));
    log::info!("Starting dashboard with source {}", config.source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let title = config.window_title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
}
