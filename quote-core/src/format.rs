//! Price formatting for the `es-AR` locale.
//!
//! Argentine Spanish groups thousands with `.` and separates decimals with
//! `,`. Quotes always show exactly two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';
const CURRENCY_SYMBOL: &str = "$";

/// Rounds to two decimal places, midpoints away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount without currency symbol, e.g. `1.500.000,50`.
///
/// ```
/// use quote_core::format::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(1234.5)), "1.234,50");
/// assert_eq!(format_amount(dec!(0)), "0,00");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let rounded = round_cents(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    // `{:.2}` on an already-rounded value only pads, never re-rounds.
    let plain = format!("{:.2}", rounded.abs());
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut out = String::with_capacity(plain.len() + integer.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(digit);
    }
    out.push(DECIMAL_SEPARATOR);
    out.push_str(fraction);
    out
}

/// Formats a quote price for display, e.g. `$1.500.000,50`.
pub fn format_price(value: Decimal) -> String {
    format!("{CURRENCY_SYMBOL}{}", format_amount(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_millions() {
        assert_eq!(format_price(dec!(1500000.50)), "$1.500.000,50");
        assert_eq!(format_price(dec!(1400000.00)), "$1.400.000,00");
    }

    #[test]
    fn small_values_have_no_separator() {
        assert_eq!(format_price(dec!(0)), "$0,00");
        assert_eq!(format_price(dec!(7)), "$7,00");
        assert_eq!(format_price(dec!(999.9)), "$999,90");
    }

    #[test]
    fn group_boundaries() {
        assert_eq!(format_amount(dec!(1000)), "1.000,00");
        assert_eq!(format_amount(dec!(100000)), "100.000,00");
        assert_eq!(format_amount(dec!(1000000000)), "1.000.000.000,00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_amount(dec!(0.005)), "0,01");
        assert_eq!(format_amount(dec!(1.234)), "1,23");
        assert_eq!(format_amount(dec!(999.995)), "1.000,00");
    }

    #[test]
    fn negative_values_keep_sign() {
        assert_eq!(format_amount(dec!(-1234.5)), "-1.234,50");
        assert_eq!(format_amount(dec!(-0.001)), "0,00");
    }

    #[test]
    fn round_cents_midpoint() {
        assert_eq!(round_cents(dec!(2.345)), dec!(2.35));
        assert_eq!(round_cents(dec!(-2.345)), dec!(-2.35));
    }
}
