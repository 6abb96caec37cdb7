mod app;

use anyhow::Context;
use eframe::egui;
use ideas_core::{default_registrar, AppPaths, AppState};

use crate::app::IdeasApp;

/// Smallest window the tree stays usable in
const MIN_WINDOW_SIZE: [f32; 2] = [480.0, 480.0];

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths = AppPaths::beside_executable()?;
    log::info!("Using data directory {:?}", paths.data_dir);
    let state = AppState::load(&paths, default_registrar())
        .with_context(|| format!("Failed to load ideas from {:?}", paths.data_dir))?;

    let settings = state.settings();
    let geometry = settings.geometry;
    let viewport = egui::ViewportBuilder::default()
        .with_title(settings.window_title.clone())
        .with_position([geometry.x as f32, geometry.y as f32])
        .with_inner_size([geometry.width as f32, geometry.height as f32])
        .with_min_inner_size(MIN_WINDOW_SIZE)
        .with_transparent(true);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Ideas",
        options,
        Box::new(move |cc| Ok(Box::new(IdeasApp::new(cc, state)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {}", e))
}
