use std::{sync::Arc, time::Duration};

use gpui::{
    AnyElement, AppContext, ClickEvent, Context, Entity, FontWeight, InteractiveElement, IntoElement,
    ParentElement, Render, ScrollHandle, SharedString, StatefulInteractiveElement, Styled,
    Subscription, Task, Window, div, point, prelude::FluentBuilder, px,
};
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    spinner::Spinner,
    switch::Switch,
    v_flex,
};
use quote_core::{
    Catalog, Completion, PaymentMethod, Quote, QuoteError, QuoteSession, Ticket, ViewMode,
    format_price,
};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::components::{
    dialogs::{self, AlertGate},
    make_button,
};

/// The quote form: vehicle picker, DNI field, payment switch and result card.
///
/// Owns the [`QuoteSession`] and the timer task that completes the current
/// request. Replacing or dropping that task cancels the timer, so a reset, a
/// newer request or closing the window never lets a stale result land.
pub struct QuoteForm {
    session: QuoteSession,
    latency: Duration,
    id_input: Entity<InputState>,
    scroll_handle: ScrollHandle,
    alert: AlertGate,
    _pending_completion: Option<Task<()>>,
    _subscriptions: Vec<Subscription>,
}

impl QuoteForm {
    pub fn new(
        catalog: Arc<Catalog>,
        latency: Duration,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let id_input =
            cx.new(|input_cx| InputState::new(window, input_cx).placeholder("Ingrese DNI"));
        let subscriptions = vec![cx.subscribe_in(&id_input, window, Self::on_id_input_event)];

        info!(vehicles = catalog.len(), ?latency, "quote form ready");
        Self {
            session: QuoteSession::new(catalog),
            latency,
            id_input,
            scroll_handle: ScrollHandle::new(),
            alert: AlertGate::default(),
            _pending_completion: None,
            _subscriptions: subscriptions,
        }
    }

    /// Keeps the input showing exactly what the session stored.
    fn on_id_input_event(
        &mut self,
        state: &Entity<InputState>,
        _event: &InputEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let raw = state.read(cx).value().to_string();
        let normalized = self.session.edit_id_number(&raw).to_string();
        if normalized != raw {
            debug!(%normalized, "ID number normalized");
            state.update(cx, |input, input_cx| input.set_value(normalized, window, input_cx));
        }
    }

    fn select_vehicle(
        &mut self,
        vehicle: &str,
        cx: &mut Context<Self>,
    ) {
        if self.alert.is_open() {
            return;
        }
        self.session.select_vehicle(vehicle);
        cx.notify();
    }

    fn toggle_payment_method(
        &mut self,
        cx: &mut Context<Self>,
    ) {
        if self.alert.is_open() {
            return;
        }
        self.session.toggle_payment_method();
        cx.notify();
    }

    /// "Calcular Cotización": starts a quote, or explains why it cannot.
    fn submit(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.alert.is_open() {
            return;
        }
        if let Err(error) = self.start_quote(cx) {
            warn!(%error, "quote request refused");
            self.show_alert(&error, window, cx);
        }
    }

    fn start_quote(
        &mut self,
        cx: &mut Context<Self>,
    ) -> Result<(), QuoteError> {
        let pending = self.session.request_quote()?;
        self.scroll_handle.set_offset(point(px(0.), px(0.)));
        self._pending_completion = Some(self.schedule_completion(pending.ticket, cx));
        cx.notify();
        Ok(())
    }

    /// Opens the alert modal to `window` and holds the form until it closes.
    fn show_alert(
        &mut self,
        error: &QuoteError,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !self.alert.try_open() {
            return;
        }
        let dialog = dialogs::alert_dialog(&dialogs::alert_for(error), window);
        cx.spawn(async move |this, cx| {
            dialog.show().await;
            if let Err(error) = this.update(cx, |form, cx| {
                form.alert.close();
                cx.notify();
            }) {
                debug!(%error, "quote form gone before alert closed");
            }
        })
        .detach();
        cx.notify();
    }

    /// Waits out the simulated latency, then hands `ticket` back to the session.
    fn schedule_completion(
        &self,
        ticket: Ticket,
        cx: &mut Context<Self>,
    ) -> Task<()> {
        let latency = self.latency;
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(latency).await;
            if let Err(error) = this.update(cx, |form, cx| form.finish(ticket, cx)) {
                debug!(%error, "quote form gone before completion");
            }
        })
    }

    fn finish(
        &mut self,
        ticket: Ticket,
        cx: &mut Context<Self>,
    ) {
        match self.session.complete(ticket) {
            Completion::Applied(quote) => {
                debug!(vehicle = %quote.vehicle, "showing quote");
            }
            Completion::Stale => {
                debug!(generation = ticket.generation(), "ignored stale completion");
            }
        }
        cx.notify();
    }

    fn reset(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self._pending_completion = None;
        self.session.reset();
        self.id_input
            .update(cx, |input, input_cx| input.set_value("", window, input_cx));
        cx.notify();
    }

    fn render_computing(
        &self,
        cx: &Context<Self>,
    ) -> AnyElement {
        v_flex()
            .w_full()
            .py_16()
            .gap_4()
            .items_center()
            .child(Spinner::new().large())
            .child(
                div()
                    .text_color(cx.theme().muted_foreground)
                    .child("Calculando tu cotización..."),
            )
            .into_any_element()
    }

    fn render_result(
        &self,
        quote: &Quote,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        v_flex()
            .w_full()
            .p_6()
            .gap_4()
            .items_center()
            .rounded_lg()
            .border_1()
            .border_color(cx.theme().border)
            .child(
                div()
                    .text_2xl()
                    .font_weight(FontWeight::BOLD)
                    .child("¡Tu Oferta Especial!"),
            )
            .child(div().text_xl().child(SharedString::from(quote.vehicle.clone())))
            .child(
                v_flex()
                    .items_center()
                    .gap_1()
                    .child(
                        div()
                            .text_sm()
                            .text_color(cx.theme().muted_foreground)
                            .child("Primera Cuota"),
                    )
                    .child(
                        div()
                            .text_3xl()
                            .font_weight(FontWeight::BOLD)
                            .text_color(cx.theme().primary)
                            .child(price_text(quote.price)),
                    ),
            )
            .child(div().child(method_text(quote.method)))
            .child(make_button(
                "new-quote",
                "Nueva Cotización",
                cx.listener(|form, _: &ClickEvent, window, cx| form.reset(window, cx)),
            ))
            .into_any_element()
    }

    fn render_form(
        &self,
        vehicles: Vec<&str>,
        selected: Option<&str>,
        method: PaymentMethod,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let picker = vehicles.into_iter().enumerate().map(|(ix, name)| {
            let is_selected = selected == Some(name);
            let vehicle = name.to_string();
            Button::new(SharedString::from(format!("vehicle-{ix}")))
                .label(vehicle.clone())
                .large()
                .w_full()
                .when(is_selected, |button| button.primary())
                .on_click(cx.listener(move |form, _: &ClickEvent, _, cx| {
                    form.select_vehicle(&vehicle, cx)
                }))
        });

        let is_credit_card = method == PaymentMethod::CreditCard;
        let method_label = |m: PaymentMethod, active: bool| {
            div()
                .when(active, |label| label.font_weight(FontWeight::BOLD))
                .when(!active, |label| label.text_color(cx.theme().muted_foreground))
                .child(m.label())
        };

        v_flex()
            .w_full()
            .gap_6()
            .child(
                div()
                    .text_3xl()
                    .font_weight(FontWeight::BOLD)
                    .child("Cotizador"),
            )
            .child(section("Selecciona tu vehículo").child(v_flex().gap_2().children(picker)))
            .child(section("DNI del Cliente").child(Input::new(&self.id_input)))
            .child(
                section("Método de Pago").child(
                    h_flex()
                        .gap_3()
                        .items_center()
                        .justify_center()
                        .child(method_label(PaymentMethod::BankAccount, !is_credit_card))
                        .child(
                            Switch::new("payment-method")
                                .checked(is_credit_card)
                                .on_click(cx.listener(|form, _: &bool, _, cx| {
                                    form.toggle_payment_method(cx)
                                })),
                        )
                        .child(method_label(PaymentMethod::CreditCard, is_credit_card)),
                ),
            )
            .child(make_button(
                "calculate",
                "Calcular Cotización",
                cx.listener(|form, _: &ClickEvent, window, cx| form.submit(window, cx)),
            ))
            .into_any_element()
    }
}

impl Render for QuoteForm {
    fn render(
        &mut self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let body = match self.session.mode() {
            ViewMode::Computing => self.render_computing(cx),
            ViewMode::Result(quote) => self.render_result(quote, cx),
            ViewMode::Form {
                vehicles,
                selected,
                method,
                ..
            } => self.render_form(vehicles, selected, method, cx),
        };

        div()
            .id("quote-content")
            .size_full()
            .overflow_y_scroll()
            .track_scroll(&self.scroll_handle)
            .p_5()
            .child(body)
    }
}

/// Titled block used for each form section.
fn section(title: &'static str) -> gpui::Div {
    v_flex()
        .gap_2()
        .child(div().text_lg().font_weight(FontWeight::SEMIBOLD).child(title))
}

fn price_text(price: Decimal) -> SharedString {
    format_price(price).into()
}

fn method_text(method: PaymentMethod) -> SharedString {
    format!("Método: {method}").into()
}
