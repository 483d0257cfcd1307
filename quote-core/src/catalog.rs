//! Price catalog: vehicle name to price-per-payment-method.
//!
//! ## File format
//!
//! A single JSON object keyed by vehicle name. Every vehicle carries both
//! payment methods, keyed by their wire names:
//!
//! ```json
//! {
//!   "Cronos": { "tarjeta_credito": 1500000.50, "cbu": 1400000.00 },
//!   "Argo":   { "tarjeta_credito": 980000,     "cbu": 915500.75 }
//! }
//! ```
//!
//! Entry order is preserved, so the picker lists vehicles the way the file
//! does. Prices must be non-negative; names must be non-empty and unique.

use std::{
    collections::HashMap,
    fmt,
    fs::File,
    io::{BufReader, Read},
    path::Path,
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor},
};
use tracing::debug;

use crate::PaymentMethod;

/// Catalog compiled into the application, used when no file is configured.
const BUILTIN_CATALOG: &str = include_str!("../data/vehiculos.json");

/// Errors that can occur while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("negative {method} price {price} for vehicle '{vehicle}'")]
    NegativePrice {
        vehicle: String,
        method: &'static str,
        price: Decimal,
    },

    #[error("catalog entry {index} has an empty vehicle name")]
    EmptyName { index: usize },

    #[error("vehicle '{0}' appears more than once")]
    DuplicateVehicle(String),
}

/// Prices for one vehicle, one per payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VehiclePrices {
    #[serde(rename = "tarjeta_credito", deserialize_with = "price_from_number")]
    pub credit_card: Decimal,
    #[serde(rename = "cbu", deserialize_with = "price_from_number")]
    pub bank_account: Decimal,
}

impl VehiclePrices {
    pub fn new(
        credit_card: Decimal,
        bank_account: Decimal,
    ) -> Self {
        Self {
            credit_card,
            bank_account,
        }
    }

    pub fn get(
        &self,
        method: PaymentMethod,
    ) -> Decimal {
        match method {
            PaymentMethod::CreditCard => self.credit_card,
            PaymentMethod::BankAccount => self.bank_account,
        }
    }
}

/// Reads a JSON number into a [`Decimal`] through its shortest textual form,
/// so `1500000.50` becomes exactly `1500000.5` rather than a binary-float
/// approximation.
fn price_from_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| de::Error::custom(format!("invalid price '{text}': {e}")))
}

/// Order-preserving view of the top-level JSON object.
struct RawEntries(Vec<(String, VehiclePrices)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                f.write_str("a map of vehicle name to prices")
            }

            fn visit_map<A>(
                self,
                mut map: A,
            ) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, prices)) = map.next_entry::<String, VehiclePrices>()? {
                    entries.push((name, prices));
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Immutable vehicle price catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(String, VehiclePrices)>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from entries in display order.
    ///
    /// # Errors
    ///
    /// * [`CatalogError::EmptyName`] if a name is empty or whitespace.
    /// * [`CatalogError::DuplicateVehicle`] if a name repeats.
    /// * [`CatalogError::NegativePrice`] if any price is below zero.
    pub fn from_entries<I>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (String, VehiclePrices)>,
    {
        let mut catalog = Catalog::default();

        for (position, (name, prices)) in entries.into_iter().enumerate() {
            if name.trim().is_empty() {
                return Err(CatalogError::EmptyName { index: position });
            }
            if catalog.index.contains_key(&name) {
                return Err(CatalogError::DuplicateVehicle(name));
            }
            for method in PaymentMethod::all() {
                let price = prices.get(*method);
                if price.is_sign_negative() && !price.is_zero() {
                    return Err(CatalogError::NegativePrice {
                        vehicle: name,
                        method: method.wire_key(),
                        price,
                    });
                }
            }
            catalog.index.insert(name.clone(), catalog.entries.len());
            catalog.entries.push((name, prices));
        }

        debug!(vehicles = catalog.entries.len(), "catalog built");
        Ok(catalog)
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        let RawEntries(entries) = serde_json::from_str(input)?;
        Self::from_entries(entries)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let RawEntries(entries) = serde_json::from_reader(reader)?;
        Self::from_entries(entries)
    }

    /// Reads a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), vehicles = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// The catalog shipped with the application.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Vehicle names in catalog order.
    pub fn vehicles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn prices(
        &self,
        vehicle: &str,
    ) -> Option<&VehiclePrices> {
        self.index.get(vehicle).map(|&i| &self.entries[i].1)
    }

    pub fn price(
        &self,
        vehicle: &str,
        method: PaymentMethod,
    ) -> Option<Decimal> {
        self.prices(vehicle).map(|prices| prices.get(method))
    }

    pub fn contains(
        &self,
        vehicle: &str,
    ) -> bool {
        self.index.contains_key(vehicle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const CRONOS_ONLY: &str = r#"{"Cronos": {"tarjeta_credito": 1500000.50, "cbu": 1400000.00}}"#;

    #[test]
    fn parses_single_vehicle() {
        let catalog = Catalog::from_json_str(CRONOS_ONLY).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.price("Cronos", PaymentMethod::CreditCard),
            Some(dec!(1500000.50))
        );
        assert_eq!(
            catalog.price("Cronos", PaymentMethod::BankAccount),
            Some(dec!(1400000.00))
        );
    }

    #[test]
    fn preserves_file_order() {
        let json = r#"{
            "Toro":  {"tarjeta_credito": 3, "cbu": 3},
            "Argo":  {"tarjeta_credito": 1, "cbu": 1},
            "Pulse": {"tarjeta_credito": 2, "cbu": 2}
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();

        assert_eq!(catalog.vehicles().collect::<Vec<_>>(), vec!["Toro", "Argo", "Pulse"]);
    }

    #[test]
    fn prices_keep_their_decimal_digits() {
        let json = r#"{"Toro": {"tarjeta_credito": 2350000.99, "cbu": 0.01}}"#;
        let catalog = Catalog::from_json_str(json).unwrap();

        assert_eq!(
            catalog.price("Toro", PaymentMethod::CreditCard),
            Some(dec!(2350000.99))
        );
        assert_eq!(
            catalog.price("Toro", PaymentMethod::BankAccount),
            Some(dec!(0.01))
        );
    }

    #[test]
    fn unknown_vehicle_has_no_price() {
        let catalog = Catalog::from_json_str(CRONOS_ONLY).unwrap();

        assert!(!catalog.contains("Mobi"));
        assert_eq!(catalog.price("Mobi", PaymentMethod::CreditCard), None);
        assert_eq!(catalog.price("cronos", PaymentMethod::CreditCard), None);
    }

    #[test]
    fn empty_object_is_an_empty_catalog() {
        let catalog = Catalog::from_json_str("{}").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn missing_method_is_rejected() {
        let err = Catalog::from_json_str(r#"{"Argo": {"tarjeta_credito": 1}}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)), "got {err:?}");
    }

    #[test]
    fn string_price_is_rejected() {
        let err =
            Catalog::from_json_str(r#"{"Argo": {"tarjeta_credito": "1", "cbu": 1}}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)), "got {err:?}");
    }

    #[test]
    fn negative_price_is_rejected() {
        let err =
            Catalog::from_json_str(r#"{"Argo": {"tarjeta_credito": 1, "cbu": -5.5}}"#).unwrap_err();
        match err {
            CatalogError::NegativePrice {
                vehicle,
                method,
                price,
            } => {
                assert_eq!(vehicle, "Argo");
                assert_eq!(method, "cbu");
                assert_eq!(price, dec!(-5.5));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn zero_price_is_accepted() {
        let catalog =
            Catalog::from_json_str(r#"{"Argo": {"tarjeta_credito": 0, "cbu": 0.0}}"#).unwrap();
        assert_eq!(
            catalog.price("Argo", PaymentMethod::BankAccount),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Catalog::from_json_str(r#"{" ": {"tarjeta_credito": 1, "cbu": 1}}"#).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyName { index: 0 }), "got {err:?}");
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let entries = vec![
            ("Argo".to_string(), VehiclePrices::new(dec!(1), dec!(1))),
            ("Argo".to_string(), VehiclePrices::new(dec!(2), dec!(2))),
        ];
        let err = Catalog::from_entries(entries).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateVehicle(ref name) if name == "Argo"));
    }

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();

        assert!(!catalog.is_empty());
        assert!(catalog.contains("Cronos"));
    }
}
