//! Payment-coin selection and display-unit conversion.
//!
//! Selection picks the largest coin able to cover a payment, which avoids
//! multi-coin merging and keeps dust fragmentation down. Conversion from
//! display units to base units truncates; it never rounds up.

use crate::error::{Error, Result};
use crate::types::PaymentCoin;

/// Base units per display unit of the native currency.
pub const BASE_UNITS_PER_COIN: u64 = 1_000_000_000;

/// Pick a coin able to cover `required` base units.
///
/// Coins are considered in descending balance order and the first (i.e.
/// largest) coin with `balance >= required` wins. Returns `None` for an
/// empty set or when every coin is below the threshold; the caller surfaces
/// that as insufficient balance rather than attempting to merge coins.
///
/// Pure function over a point-in-time snapshot: the chosen coin is not
/// locked, and a race with a concurrent spend surfaces later as a
/// submission failure.
pub fn select_coin<'a>(coins: &'a [PaymentCoin], required: u64) -> Option<&'a PaymentCoin> {
    let mut candidates: Vec<&PaymentCoin> = coins.iter().collect();
    candidates.sort_by(|a, b| b.balance.cmp(&a.balance));
    candidates.into_iter().find(|c| c.balance >= required)
}

/// Convert a decimal display-unit amount (e.g. `"1.5"`) to base units.
///
/// Works on the digit string with integer arithmetic so the conversion is
/// exact: the integer part is scaled by [`BASE_UNITS_PER_COIN`] and the
/// first nine fractional digits are kept. Any further fractional digits are
/// dropped, not rounded.
pub fn display_to_base_units(amount: &str) -> Result<u64> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(Error::Validation("amount must not be empty".into()));
    }

    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(Error::Validation(format!("'{amount}' is not a decimal amount")));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation(format!("'{amount}' is not a decimal amount")));
    }

    let whole_units: u64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| Error::Validation(format!("'{amount}' is out of range")))?
    };

    // First nine fractional digits, right-padded; the rest are truncated.
    let mut frac_digits: String = frac.chars().take(9).collect();
    while frac_digits.len() < 9 {
        frac_digits.push('0');
    }
    let frac_units: u64 = frac_digits
        .parse()
        .map_err(|_| Error::Validation(format!("'{amount}' is not a decimal amount")))?;

    whole_units
        .checked_mul(BASE_UNITS_PER_COIN)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| Error::Validation(format!("'{amount}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, balance: u64) -> PaymentCoin {
        PaymentCoin {
            coin_object_id: id.to_string(),
            balance,
        }
    }

    #[test]
    fn selects_largest_sufficient_coin() {
        let coins = vec![coin("a", 500), coin("b", 2_000_000_000)];
        let picked = select_coin(&coins, 1_000_000_000).unwrap();
        assert_eq!(picked.coin_object_id, "b");
    }

    #[test]
    fn selection_ignores_input_order() {
        let coins = vec![coin("small", 10), coin("big", 100), coin("mid", 50)];
        // Both "big" and "mid" qualify; the larger one wins.
        assert_eq!(select_coin(&coins, 40).unwrap().coin_object_id, "big");
    }

    #[test]
    fn empty_set_yields_none() {
        assert!(select_coin(&[], 1).is_none());
    }

    #[test]
    fn all_below_threshold_yields_none() {
        let coins = vec![coin("a", 10), coin("b", 20)];
        assert!(select_coin(&coins, 21).is_none());
    }

    #[test]
    fn exact_balance_qualifies() {
        let coins = vec![coin("a", 42)];
        assert_eq!(select_coin(&coins, 42).unwrap().coin_object_id, "a");
    }

    #[test]
    fn conversion_scales_whole_units() {
        assert_eq!(display_to_base_units("2").unwrap(), 2_000_000_000);
        assert_eq!(display_to_base_units("0").unwrap(), 0);
    }

    #[test]
    fn conversion_keeps_nine_fractional_digits() {
        assert_eq!(display_to_base_units("1.999999999").unwrap(), 1_999_999_999);
        assert_eq!(display_to_base_units("0.000000001").unwrap(), 1);
        assert_eq!(display_to_base_units("0.5").unwrap(), 500_000_000);
    }

    #[test]
    fn conversion_truncates_instead_of_rounding() {
        // The tenth fractional digit is dropped even though it would round up.
        assert_eq!(display_to_base_units("1.9999999995").unwrap(), 1_999_999_999);
        assert_eq!(display_to_base_units("0.0000000009").unwrap(), 0);
    }

    #[test]
    fn conversion_accepts_bare_fraction_and_trailing_dot() {
        assert_eq!(display_to_base_units(".5").unwrap(), 500_000_000);
        assert_eq!(display_to_base_units("3.").unwrap(), 3_000_000_000);
    }

    #[test]
    fn conversion_rejects_garbage() {
        assert!(display_to_base_units("").is_err());
        assert!(display_to_base_units(".").is_err());
        assert!(display_to_base_units("-1").is_err());
        assert!(display_to_base_units("1.5.0").is_err());
        assert!(display_to_base_units("abc").is_err());
    }

    #[test]
    fn conversion_rejects_overflow() {
        assert!(display_to_base_units("99999999999999999999").is_err());
    }
}
