#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::{egui::ViewportBuilder, run_native, NativeOptions};
use rse_dashboard::ui::DashboardApp;
use tracing::error;

fn main() {
    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .init();
    let viewport = ViewportBuilder::default()
        .with_title("RSE Market Dashboard")
        .with_inner_size((1280.0, 900.0))
        .with_min_inner_size((720.0, 480.0));

    let native_options = NativeOptions {
        viewport,
        ..Default::default()
    };

    if let Err(e) = run_native(
        "RSE Dashboard",
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc)))),
    ) {
        error!("dashboard exited with error : {}", e);
    }
}
