mod app;
mod color;
mod data;
mod fonts;
mod schema;
mod state;
mod ui;

use std::path::PathBuf;

use app::GrowLabApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional data directory; otherwise the remembered one, then ./data.
    let data_dir = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "GrowLab – 극지식물 EC 연구",
        options,
        Box::new(move |cc| Ok(Box::new(GrowLabApp::new(cc, data_dir)))),
    )
}
