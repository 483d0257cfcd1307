use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gpui::Application;
use tracing::{error, info};

use quote_ui::{
    config::{AppConfig, Cli},
    logging, open_main_window, setup_app,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli)?;

    logging::init_logging(&config)?;

    let catalog = config.load_catalog().with_context(|| match &config.catalog {
        Some(path) => format!("failed to load catalog '{}'", path.display()),
        None => "failed to load the bundled catalog".to_string(),
    })?;
    info!(vehicles = catalog.len(), "catalog loaded");
    let catalog = Arc::new(catalog);

    Application::new()
        .with_assets(gpui_component_assets::Assets)
        .run(move |cx| {
            setup_app(cx);
            if let Err(error) = open_main_window(cx, catalog, &config) {
                error!(?error, "cannot start the quote window");
                cx.quit();
            }
        });

    Ok(())
}
