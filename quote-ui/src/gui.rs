use std::sync::Arc;

use anyhow::Context as _;
use gpui::{
    AnyView, App, AppContext, Bounds, KeyBinding, Menu, MenuItem, TitlebarOptions, WindowBounds,
    WindowOptions,
};
use gpui_component::Root;
use quote_core::Catalog;
use tracing::info;

use crate::{
    Quit,
    components::{AppWindow, Branding, QuoteForm, WindowPreferences},
    config::AppConfig,
    quit,
};

const WINDOW_TITLE: &str = "Cotizador";

pub fn setup_app(app_cx: &mut App) {
    // This must be called before using any GPUI Component features.
    gpui_component::init(app_cx);

    app_cx.activate(true);

    #[cfg(target_os = "macos")]
    app_cx.bind_keys([KeyBinding::new("cmd-q", Quit, None)]);

    #[cfg(not(target_os = "macos"))]
    app_cx.bind_keys([
        KeyBinding::new("ctrl-q", Quit, None),
        KeyBinding::new("alt-F4", Quit, None),
    ]);

    app_cx.on_action(quit);

    app_cx.set_menus(vec![Menu {
        name: WINDOW_TITLE.into(),
        items: vec![MenuItem::action("Salir", Quit)],
    }]);
}

/// Opens the quote window for `catalog`.
///
/// The window root is a gpui-component [`Root`] hosting an [`AppWindow`],
/// which in turn owns the [`QuoteForm`].
pub fn open_main_window(
    app_cx: &mut App,
    catalog: Arc<Catalog>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let preferences = WindowPreferences::default();
    let branding = Branding::with_logo(config.logo.clone());
    let latency = config.latency;

    let options = WindowOptions {
        window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
            None,
            preferences.size,
            app_cx,
        ))),
        titlebar: Some(TitlebarOptions {
            title: Some(WINDOW_TITLE.into()),
            ..Default::default()
        }),
        ..Default::default()
    };

    app_cx
        .open_window(options, move |window, cx| {
            let form = cx.new(|form_cx| QuoteForm::new(catalog, latency, window, form_cx));
            let app_window = cx.new(|window_cx| AppWindow::new(branding, form, window_cx));
            cx.new(|root_cx| Root::new(AnyView::from(app_window), window, root_cx))
        })
        .context("failed to open quote window")?;

    info!("main window opened");
    Ok(())
}
