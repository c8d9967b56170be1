//! # Decimal Money Amounts
//!
//! Prices and order totals are integer minor units (cents) internally and
//! decimal strings (`"10.50"`) on the wire. Floats are never used for
//! money — a float cannot represent 10.10 exactly, and serialized floats
//! are not deterministic across platforms.

use crate::error::ValidationError;

/// A money amount in minor units (cents).
pub type Amount = i64;

/// Fractional digits of the wire format.
const SCALE: u32 = 2;

/// Parse a decimal amount string (`"10"`, `"10.5"`, `"10.50"`) into minor
/// units. Rejects negative values, more than two fractional digits, and
/// anything that is not a plain decimal number.
pub fn parse_amount(s: &str) -> Result<Amount, ValidationError> {
    let s = s.trim();
    let invalid = || ValidationError::InvalidAmount(s.to_string());

    let (whole, frac) = match s.split_once('.') {
        Some((_, "")) => return Err(invalid()),
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() || whole.len() > 15 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > SCALE as usize || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let mut cents = whole.checked_mul(100).ok_or_else(invalid)?;
    if !frac.is_empty() {
        let mut frac_value: i64 = frac.parse().map_err(|_| invalid())?;
        if frac.len() == 1 {
            frac_value *= 10;
        }
        cents = cents.checked_add(frac_value).ok_or_else(invalid)?;
    }
    Ok(cents)
}

/// Format minor units as a decimal string with exactly two fractional
/// digits. The inverse of [`parse_amount`].
pub fn format_amount(cents: Amount) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Compute an order total: unit price × quantity, in minor units.
///
/// Fails on overflow rather than wrapping — a total that does not fit in
/// `i64` cents is a malformed request.
pub fn total_price(unit_price: Amount, quantity: u32) -> Result<Amount, ValidationError> {
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or(ValidationError::OutOfRange {
            field: "quantity",
            reason: "total price overflows",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_whole_and_fractional_forms() {
        assert_eq!(parse_amount("10").unwrap(), 1000);
        assert_eq!(parse_amount("10.5").unwrap(), 1050);
        assert_eq!(parse_amount("10.50").unwrap(), 1050);
        assert_eq!(parse_amount("0.01").unwrap(), 1);
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", "-1", "1.234", "1,50", "ten", ".5", "1.", "1.5.0"] {
            assert!(parse_amount(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn formats_with_two_fraction_digits() {
        assert_eq!(format_amount(1050), "10.50");
        assert_eq!(format_amount(1), "0.01");
        assert_eq!(format_amount(0), "0.00");
    }

    #[test]
    fn order_total_is_price_times_quantity() {
        // 10.50 × 2 = 21.00
        let total = total_price(parse_amount("10.50").unwrap(), 2).unwrap();
        assert_eq!(format_amount(total), "21.00");
    }

    #[test]
    fn order_total_overflow_rejected() {
        assert!(total_price(i64::MAX / 2, 3).is_err());
    }

    proptest! {
        #[test]
        fn format_then_parse_round_trips(cents in 0i64..=10_000_000_00) {
            prop_assert_eq!(parse_amount(&format_amount(cents)).unwrap(), cents);
        }
    }
}
