mod about;
mod app;
mod catalog;
mod config;
mod contact;
mod filter;
mod gallery;
mod grid;
mod lightbox;
mod loader;
mod resume;
mod viewer;
mod window;

use app::FolioApp;
use catalog::Portfolio;
use config::AppConfig;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    let portfolio_path = config.resolve_portfolio_path();
    let portfolio = Portfolio::load(&portfolio_path);
    match &portfolio {
        Ok(p) if p.catalog.is_empty() => {
            tracing::warn!(path = %portfolio_path.display(), "portfolio has no images")
        }
        Ok(p) => tracing::info!(
            path = %portfolio_path.display(),
            images = p.catalog.len(),
            "portfolio loaded"
        ),
        Err(err) => tracing::warn!("{err:#}"),
    }

    let width = config.window_width.unwrap_or(1200.0);
    let height = config.window_height.unwrap_or(800.0);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Folio")
            .with_app_id("folio")
            .with_inner_size([width, height])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "folio",
        native_options,
        Box::new(|cc| Ok(Box::new(FolioApp::new(cc, config, portfolio)))),
    )
}
