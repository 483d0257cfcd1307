/// Maximum number of digits in a national ID number (DNI).
pub const MAX_ID_DIGITS: usize = 8;

/// Keeps the first [`MAX_ID_DIGITS`] ASCII digits of `raw`, in order.
///
/// Everything else is dropped rather than rejected, so the result can be
/// stored straight back into the input field. Applying it twice yields the
/// same value as applying it once.
pub fn normalize_id_number(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(MAX_ID_DIGITS)
        .collect()
}

/// A normalized ID number: only ASCII digits, at most [`MAX_ID_DIGITS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IdNumber(String);

impl IdNumber {
    /// Replaces the value with the normalized form of `raw`.
    pub fn set(
        &mut self,
        raw: &str,
    ) {
        self.0 = normalize_id_number(raw);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drops_non_digits_and_truncates() {
        assert_eq!(normalize_id_number("12a3-456789xyz"), "12345678");
    }

    #[test]
    fn keeps_short_numeric_input() {
        assert_eq!(normalize_id_number("30111222"), "30111222");
        assert_eq!(normalize_id_number("42"), "42");
    }

    #[test]
    fn formatted_dni_is_flattened() {
        assert_eq!(normalize_id_number("30.111.222"), "30111222");
        assert_eq!(normalize_id_number(" 7 654 321 "), "7654321");
    }

    #[test]
    fn no_digits_yields_empty() {
        assert_eq!(normalize_id_number(""), "");
        assert_eq!(normalize_id_number("abc-_ "), "");
    }

    #[test]
    fn non_ascii_digits_are_dropped() {
        // Arabic-Indic and full-width digits are not decimal ASCII.
        assert_eq!(normalize_id_number("١٢٣12３4"), "124");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = ["", "12a3-456789xyz", "999999999999", "x1y2z3", "00000000"];
        for input in inputs {
            let once = normalize_id_number(input);
            assert_eq!(normalize_id_number(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn id_number_set_and_clear() {
        let mut id = IdNumber::default();
        assert!(id.is_empty());

        id.set("DNI 20-123.456-7");
        assert_eq!(id.as_str(), "20123456");

        id.clear();
        assert!(id.is_empty());
    }
}
