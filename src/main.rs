// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod config;
mod dac;
mod gui;
mod types;
use eframe::egui;
use config::PanelConfig;
// entry point
fn main() -> eframe::Result<()> {
    env_logger::init();
    let config_path = PanelConfig::path_from_env();
    let config = PanelConfig::load_or_default(&config_path);
    log::info!(
        "starting panel with data file {} (settings: {})",
        config.data_file.display(),
        config_path.display()
    );
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([980.0, 760.0])
        .with_min_inner_size([760.0, 560.0])
        .with_title("AD5372 Control Panel");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "AD5372 Control Panel",
        options,
        Box::new(move |_cc| Box::new(gui::PanelApp::new(config, config_path))),
    )
}
