pub mod catalog;
pub mod format;
pub mod id_number;
pub mod payment;
pub mod session;

pub use catalog::{Catalog, CatalogError, VehiclePrices};
pub use format::format_price;
pub use id_number::{IdNumber, MAX_ID_DIGITS, normalize_id_number};
pub use payment::PaymentMethod;
pub use session::{
    Completion, DEFAULT_LATENCY, MISSING_SELECTION_MESSAGE, PendingQuote, Quote, QuoteError,
    QuoteSession, Ticket, ViewMode,
};
