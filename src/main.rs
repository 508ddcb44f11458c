// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod capture;
mod config;
mod gui;
mod types;
mod worker;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();
    let config = config::AcqConfig::default();
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([960.0, 600.0])
        .with_min_inner_size([720.0, 460.0])
        .with_title(config.window_title.clone());
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "stepscope",
        options,
        Box::new(|_cc| Box::new(gui::StepScopeApp::new(config))),
    )
}
