//! Decimal formatting for monetary output (§4.2): trailing zeros trimmed,
//! never rounded below the natural precision of the computation, and the
//! "no billable component below 1p" floor.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The minimum non-zero billable amount (§4.2, §4.5 step 7, §8 "Minimum
/// billing"). Exact zero is exempt.
pub const MIN_BILLABLE: Decimal = dec!(0.01);

/// Rounds a strictly-positive `ex_vat` that falls below [`MIN_BILLABLE`] up
/// to it. Exact zero and values already `>= MIN_BILLABLE` pass through
/// unchanged.
pub fn floor_to_min_billable(ex_vat: Decimal) -> Decimal {
    if ex_vat.is_zero() || ex_vat >= MIN_BILLABLE {
        ex_vat
    } else {
        MIN_BILLABLE
    }
}

/// Formats a decimal for wire output: trailing zeros trimmed, full natural
/// precision kept (no rounding), exact zero renders as `"0"`.
pub fn format_price(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_sub_penny_amounts() {
        assert_eq!(
            floor_to_min_billable(dec!(0.0000000001)),
            MIN_BILLABLE
        );
        assert_eq!(floor_to_min_billable(dec!(0)), Decimal::ZERO);
        assert_eq!(floor_to_min_billable(dec!(0.02)), dec!(0.02));
    }

    #[test]
    fn trims_trailing_zeros_without_rounding() {
        assert_eq!(format_price(dec!(1.00)), "1");
        assert_eq!(format_price(dec!(0.012000)), "0.012");
        assert_eq!(format_price(dec!(40.80)), "40.8");
    }
}
