use std::fmt;

/// Billing channel a quote is priced for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    BankAccount,
}

impl PaymentMethod {
    pub fn all() -> &'static [PaymentMethod] {
        &[PaymentMethod::CreditCard, PaymentMethod::BankAccount]
    }

    /// Flips to the other method. Applying it twice is a no-op.
    pub fn toggle(self) -> Self {
        match self {
            Self::CreditCard => Self::BankAccount,
            Self::BankAccount => Self::CreditCard,
        }
    }

    /// Key used for this method in catalog files.
    pub fn wire_key(&self) -> &'static str {
        match self {
            Self::CreditCard => "tarjeta_credito",
            Self::BankAccount => "cbu",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Tarjeta de Crédito",
            Self::BankAccount => "CBU",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
