mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::BirdWatchApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();
    log::info!(
        "Observation sources: forest={}, grassland={}",
        config.forest_path.display(),
        config.grassland_path.display()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bird Watch – Observation Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(BirdWatchApp::new(config)))),
    )
}
