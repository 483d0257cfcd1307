use std::path::PathBuf;

use gpui::{
    AnyElement, App, Context, Entity, FontWeight, IntoElement, ParentElement, Render,
    SharedString, Styled, Subscription, Window, div, img, px,
};
use gpui_component::{ActiveTheme, h_flex, v_flex};
use tracing::info;

use crate::components::QuoteForm;
#[cfg(not(target_os = "linux"))]
use crate::{Quit, quit};

/// Header contents: the brand logo if one is configured, its name otherwise.
#[derive(Debug, Clone)]
pub struct Branding {
    pub name: SharedString,
    pub logo: Option<PathBuf>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            name: "FIAT".into(),
            logo: None,
        }
    }
}

impl Branding {
    pub fn with_logo(logo: Option<PathBuf>) -> Self {
        Self {
            logo,
            ..Self::default()
        }
    }

    fn render(&self) -> AnyElement {
        match &self.logo {
            Some(path) => img(path.clone()).h(px(56.)).into_any_element(),
            None => div()
                .text_2xl()
                .font_weight(FontWeight::BOLD)
                .child(self.name.clone())
                .into_any_element(),
        }
    }
}

/// Top-level window content: branded header above the quote form.
pub struct AppWindow {
    _window_close_subscription: Subscription,
    branding: Branding,
    form: Entity<QuoteForm>,
}

impl AppWindow {
    pub fn new(
        branding: Branding,
        form: Entity<QuoteForm>,
        cx: &mut Context<Self>,
    ) -> Self {
        let subscription = cx.on_window_closed(|_cx: &mut App| {
            info!("window closed");
            #[cfg(not(target_os = "linux"))]
            quit(&Quit, _cx);
        });

        info!(logo = ?branding.logo, "window constructed");
        Self {
            _window_close_subscription: subscription,
            branding,
            form,
        }
    }
}

impl Render for AppWindow {
    fn render(
        &mut self,
        _: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        v_flex()
            .size_full()
            .bg(cx.theme().background)
            .child(
                h_flex()
                    .w_full()
                    .p_4()
                    .justify_center()
                    .border_b_1()
                    .border_color(cx.theme().border)
                    .child(self.branding.render()),
            )
            .child(div().flex_1().w_full().child(self.form.clone()))
    }
}
