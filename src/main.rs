mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::DashboardApp;
use clap::Parser;
use config::{Cli, DashboardConfig};
use eframe::egui;

pub const TITLE: &str = "Sales Forecasting, Vendor Allocation & Fabric Utilization Dashboard";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_cli(&cli)?;
    log::info!("Reading data from {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running the UI: {e}"))
}
