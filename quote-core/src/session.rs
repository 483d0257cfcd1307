//! Quote session state.
//!
//! Holds everything the quote form shows and drives the linear flow
//! selection → computing → result → reset. The session does not own a
//! timer: [`QuoteSession::request_quote`] hands back a [`PendingQuote`] and the
//! caller decides when to call [`QuoteSession::complete`]. Each request bumps
//! a generation counter, so a completion that arrives after a reset, cancel or
//! newer request is recognised as stale and dropped.

use std::{sync::Arc, time::Duration};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{Catalog, IdNumber, PaymentMethod};

/// Simulated backend round-trip before a quote is shown.
pub const DEFAULT_LATENCY: Duration = Duration::from_secs(7);

/// Message shown when a quote is requested without a vehicle or ID number.
pub const MISSING_SELECTION_MESSAGE: &str = "Por favor seleccione un vehículo e ingrese el DNI";

/// Reasons a quote request is refused. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("{}", MISSING_SELECTION_MESSAGE)]
    MissingSelection,

    #[error("el vehículo '{0}' no está en el catálogo")]
    UnknownVehicle(String),
}

/// Identifies one quote request. Only the ticket of the latest request can
/// complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// A request accepted by the session and waiting for completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuote {
    pub ticket: Ticket,
    pub vehicle: String,
    pub method: PaymentMethod,
}

/// A resolved price for one vehicle and payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub vehicle: String,
    pub method: PaymentMethod,
    pub price: Decimal,
}

/// Outcome of [`QuoteSession::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied(Quote),
    /// The ticket no longer matches the in-flight request.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Selecting,
    Computing(PendingQuote),
    Showing(Quote),
}

/// What the form should present for the current state. Exactly one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode<'a> {
    Form {
        vehicles: Vec<&'a str>,
        selected: Option<&'a str>,
        id_number: &'a str,
        method: PaymentMethod,
    },
    Computing,
    Result(&'a Quote),
}

/// State behind the quote form.
#[derive(Debug, Clone)]
pub struct QuoteSession {
    catalog: Arc<Catalog>,
    vehicle: Option<String>,
    id_number: IdNumber,
    method: PaymentMethod,
    stage: Stage,
    generation: u64,
}

impl QuoteSession {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            vehicle: None,
            id_number: IdNumber::default(),
            method: PaymentMethod::default(),
            stage: Stage::Selecting,
            generation: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected_vehicle(&self) -> Option<&str> {
        self.vehicle.as_deref()
    }

    pub fn id_number(&self) -> &str {
        self.id_number.as_str()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.method
    }

    pub fn is_computing(&self) -> bool {
        matches!(self.stage, Stage::Computing(_))
    }

    pub fn result(&self) -> Option<&Quote> {
        match &self.stage {
            Stage::Showing(quote) => Some(quote),
            _ => None,
        }
    }

    /// Selects a vehicle. Membership is checked when a quote is requested.
    pub fn select_vehicle(
        &mut self,
        vehicle: impl Into<String>,
    ) {
        let vehicle = vehicle.into();
        debug!(%vehicle, "vehicle selected");
        self.vehicle = Some(vehicle);
    }

    /// Stores the normalized form of `raw` and returns it.
    pub fn edit_id_number(
        &mut self,
        raw: &str,
    ) -> &str {
        self.id_number.set(raw);
        self.id_number.as_str()
    }

    pub fn toggle_payment_method(&mut self) -> PaymentMethod {
        self.method = self.method.toggle();
        debug!(method = self.method.wire_key(), "payment method toggled");
        self.method
    }

    /// Starts computing a quote for the current selection.
    ///
    /// Any earlier in-flight request is superseded and any shown result is
    /// cleared. The returned [`PendingQuote`] must be passed back through
    /// [`complete`](Self::complete) once the simulated latency elapses.
    ///
    /// # Errors
    ///
    /// * [`QuoteError::MissingSelection`] if no vehicle is selected or the ID
    ///   number is empty.
    /// * [`QuoteError::UnknownVehicle`] if the selected vehicle is not in the
    ///   catalog.
    pub fn request_quote(&mut self) -> Result<PendingQuote, QuoteError> {
        let vehicle = match self.vehicle.as_deref() {
            Some(v) if !v.is_empty() && !self.id_number.is_empty() => v,
            _ => {
                warn!("quote requested without vehicle or ID number");
                return Err(QuoteError::MissingSelection);
            }
        };
        if !self.catalog.contains(vehicle) {
            warn!(%vehicle, "quote requested for unknown vehicle");
            return Err(QuoteError::UnknownVehicle(vehicle.to_string()));
        }

        self.generation += 1;
        let pending = PendingQuote {
            ticket: Ticket(self.generation),
            vehicle: vehicle.to_string(),
            method: self.method,
        };
        info!(
            vehicle = %pending.vehicle,
            method = pending.method.wire_key(),
            generation = self.generation,
            "computing quote"
        );
        self.stage = Stage::Computing(pending.clone());
        Ok(pending)
    }

    /// Resolves the in-flight request identified by `ticket`.
    ///
    /// Returns [`Completion::Stale`] without touching state when the ticket
    /// was superseded, reset or cancelled.
    pub fn complete(
        &mut self,
        ticket: Ticket,
    ) -> Completion {
        let pending = match &self.stage {
            Stage::Computing(pending) if pending.ticket == ticket => pending,
            _ => {
                debug!(generation = ticket.0, "stale quote completion dropped");
                return Completion::Stale;
            }
        };

        // Membership was checked at request time and the catalog is immutable.
        let Some(price) = self.catalog.price(&pending.vehicle, pending.method) else {
            warn!(vehicle = %pending.vehicle, "vehicle vanished from catalog");
            self.stage = Stage::Selecting;
            return Completion::Stale;
        };

        let quote = Quote {
            vehicle: pending.vehicle.clone(),
            method: pending.method,
            price,
        };
        info!(vehicle = %quote.vehicle, %price, "quote ready");
        self.stage = Stage::Showing(quote.clone());
        Completion::Applied(quote)
    }

    /// Abandons the in-flight request, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        if !self.is_computing() {
            return false;
        }
        self.generation += 1;
        self.stage = Stage::Selecting;
        info!(generation = self.generation, "quote computation cancelled");
        true
    }

    /// Clears the form back to its initial state, cancelling any in-flight
    /// request.
    pub fn reset(&mut self) {
        self.cancel();
        self.vehicle = None;
        self.id_number.clear();
        self.method = PaymentMethod::default();
        self.stage = Stage::Selecting;
        info!("quote session reset");
    }

    pub fn mode(&self) -> ViewMode<'_> {
        match &self.stage {
            Stage::Computing(_) => ViewMode::Computing,
            Stage::Showing(quote) => ViewMode::Result(quote),
            Stage::Selecting => ViewMode::Form {
                vehicles: self.catalog.vehicles().collect(),
                selected: self.vehicle.as_deref(),
                id_number: self.id_number.as_str(),
                method: self.method,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn cronos_session() -> QuoteSession {
        let catalog = Catalog::from_json_str(
            r#"{"Cronos": {"tarjeta_credito": 1500000.50, "cbu": 1400000.00},
                "Argo": {"tarjeta_credito": 980000, "cbu": 915500.75}}"#,
        )
        .unwrap();
        QuoteSession::new(Arc::new(catalog))
    }

    fn ready_session() -> QuoteSession {
        let mut session = cronos_session();
        session.select_vehicle("Cronos");
        session.edit_id_number("12345678");
        session
    }

    #[test]
    fn starts_in_form_mode_with_defaults() {
        let session = cronos_session();

        assert_eq!(
            session.mode(),
            ViewMode::Form {
                vehicles: vec!["Cronos", "Argo"],
                selected: None,
                id_number: "",
                method: PaymentMethod::CreditCard,
            }
        );
    }

    #[test]
    fn request_then_complete_shows_credit_card_price() {
        let mut session = ready_session();

        let pending = session.request_quote().unwrap();
        assert_eq!(session.mode(), ViewMode::Computing);
        assert_eq!(pending.vehicle, "Cronos");
        assert_eq!(pending.method, PaymentMethod::CreditCard);

        let completion = session.complete(pending.ticket);
        let expected = Quote {
            vehicle: "Cronos".to_string(),
            method: PaymentMethod::CreditCard,
            price: dec!(1500000.50),
        };
        assert_eq!(completion, Completion::Applied(expected.clone()));
        assert_eq!(session.mode(), ViewMode::Result(&expected));
        assert!(!session.is_computing());
    }

    #[test]
    fn bank_account_price_is_used_after_toggle() {
        let mut session = ready_session();
        assert_eq!(session.toggle_payment_method(), PaymentMethod::BankAccount);

        let pending = session.request_quote().unwrap();
        session.complete(pending.ticket);

        assert_eq!(session.result().map(|q| q.price), Some(dec!(1400000.00)));
    }

    #[test]
    fn missing_id_number_is_refused_without_state_change() {
        let mut session = cronos_session();
        session.select_vehicle("Cronos");

        assert_eq!(session.request_quote(), Err(QuoteError::MissingSelection));
        assert_eq!(
            session.mode(),
            ViewMode::Form {
                vehicles: vec!["Cronos", "Argo"],
                selected: Some("Cronos"),
                id_number: "",
                method: PaymentMethod::CreditCard,
            }
        );
        assert!(!session.is_computing());
        assert!(session.result().is_none());
    }

    #[test]
    fn missing_vehicle_is_refused() {
        let mut session = cronos_session();
        session.edit_id_number("12345678");

        assert_eq!(session.request_quote(), Err(QuoteError::MissingSelection));
        assert!(!session.is_computing());
    }

    #[test]
    fn empty_vehicle_name_counts_as_missing() {
        let mut session = cronos_session();
        session.select_vehicle("");
        session.edit_id_number("1");

        assert_eq!(session.request_quote(), Err(QuoteError::MissingSelection));
    }

    #[test]
    fn id_number_of_only_letters_counts_as_missing() {
        let mut session = cronos_session();
        session.select_vehicle("Cronos");
        assert_eq!(session.edit_id_number("abc"), "");

        assert_eq!(session.request_quote(), Err(QuoteError::MissingSelection));
    }

    #[test]
    fn unknown_vehicle_is_refused() {
        let mut session = cronos_session();
        session.select_vehicle("Delorean");
        session.edit_id_number("1");

        assert_eq!(
            session.request_quote(),
            Err(QuoteError::UnknownVehicle("Delorean".to_string()))
        );
        assert!(!session.is_computing());
    }

    #[test]
    fn missing_selection_message_matches_alert_copy() {
        assert_eq!(
            QuoteError::MissingSelection.to_string(),
            "Por favor seleccione un vehículo e ingrese el DNI"
        );
    }

    #[test]
    fn unknown_vehicle_message_is_spanish() {
        assert_eq!(
            QuoteError::UnknownVehicle("Delorean".to_string()).to_string(),
            "el vehículo 'Delorean' no está en el catálogo"
        );
    }

    #[test]
    fn edit_id_number_normalizes() {
        let mut session = cronos_session();
        assert_eq!(session.edit_id_number("12a3-456789xyz"), "12345678");
        assert_eq!(session.id_number(), "12345678");
    }

    #[test]
    fn newer_request_supersedes_older_ticket() {
        let mut session = ready_session();
        let first = session.request_quote().unwrap();

        session.select_vehicle("Argo");
        let second = session.request_quote().unwrap();
        assert_ne!(first.ticket, second.ticket);

        assert_eq!(session.complete(first.ticket), Completion::Stale);
        assert!(session.is_computing());

        session.complete(second.ticket);
        assert_eq!(session.result().map(|q| q.vehicle.as_str()), Some("Argo"));
    }

    #[test]
    fn completing_twice_is_stale() {
        let mut session = ready_session();
        let pending = session.request_quote().unwrap();

        assert!(matches!(session.complete(pending.ticket), Completion::Applied(_)));
        assert_eq!(session.complete(pending.ticket), Completion::Stale);
    }

    #[test]
    fn request_from_result_clears_previous_result() {
        let mut session = ready_session();
        let pending = session.request_quote().unwrap();
        session.complete(pending.ticket);
        assert!(session.result().is_some());

        session.request_quote().unwrap();
        assert!(session.result().is_none());
        assert_eq!(session.mode(), ViewMode::Computing);
    }

    #[test]
    fn reset_from_result_restores_defaults() {
        let mut session = ready_session();
        session.toggle_payment_method();
        let pending = session.request_quote().unwrap();
        session.complete(pending.ticket);

        session.reset();

        assert_eq!(session.selected_vehicle(), None);
        assert_eq!(session.id_number(), "");
        assert_eq!(session.payment_method(), PaymentMethod::CreditCard);
        assert!(session.result().is_none());
        assert!(matches!(session.mode(), ViewMode::Form { .. }));
    }

    #[test]
    fn reset_while_computing_cancels_pending_completion() {
        let mut session = ready_session();
        let pending = session.request_quote().unwrap();

        session.reset();

        assert_eq!(session.complete(pending.ticket), Completion::Stale);
        assert!(session.result().is_none());
        assert!(!session.is_computing());
    }

    #[test]
    fn cancel_reports_whether_anything_was_pending() {
        let mut session = ready_session();
        assert!(!session.cancel());

        let pending = session.request_quote().unwrap();
        assert!(session.cancel());
        assert_eq!(session.complete(pending.ticket), Completion::Stale);
        // Selection survives a cancel.
        assert_eq!(session.selected_vehicle(), Some("Cronos"));
        assert_eq!(session.id_number(), "12345678");
    }
}
