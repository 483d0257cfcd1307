use gpui::Window;
use quote_core::QuoteError;
use rfd::{AsyncMessageDialog, MessageButtons, MessageLevel};

/// Contents of a blocking alert box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub level: AlertLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Error,
}

impl From<AlertLevel> for MessageLevel {
    fn from(level: AlertLevel) -> Self {
        match level {
            AlertLevel::Warning => MessageLevel::Warning,
            AlertLevel::Error => MessageLevel::Error,
        }
    }
}

/// The alert shown when a quote request is refused.
///
/// A missing vehicle or ID number is the expected user mistake and gets the
/// fixed prompt; anything else is reported as an error with its own text.
pub fn alert_for(error: &QuoteError) -> Alert {
    match error {
        QuoteError::MissingSelection => Alert {
            title: "Cotizador".to_string(),
            message: error.to_string(),
            level: AlertLevel::Warning,
        },
        QuoteError::UnknownVehicle(_) => Alert {
            title: "Error".to_string(),
            message: error.to_string(),
            level: AlertLevel::Error,
        },
    }
}

/// Builds a message box with a single OK button, modal to `parent`.
pub fn alert_dialog(
    alert: &Alert,
    parent: &Window,
) -> AsyncMessageDialog {
    AsyncMessageDialog::new()
        .set_parent(parent)
        .set_level(alert.level.into())
        .set_title(alert.title.as_str())
        .set_description(alert.message.as_str())
        .set_buttons(MessageButtons::Ok)
}

/// Tracks whether an alert is on screen, so the form ignores input until it
/// is dismissed and never stacks a second box on top of the first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlertGate {
    open: bool,
}

impl AlertGate {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Marks an alert as shown. Returns `false` if one already is.
    pub fn try_open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}
