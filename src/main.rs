mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;
mod view;

use app::DisciplineExplorerApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            ui::fonts::install_cjk_font(&cc.egui_ctx, config.font_path.as_deref());
            Ok(Box::new(DisciplineExplorerApp::new(config)))
        }),
    )
}
