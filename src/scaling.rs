//! Conversion between raw on-chain integer amounts and human readable decimals.

use rust_decimal::{prelude::FromPrimitive, Decimal};

/// `10^decimals` as a [`Decimal`].
///
/// Panics for `decimals > 28`, which is beyond what [`Decimal`] can hold.
fn scale_factor(decimals: u32) -> Decimal {
    (0..decimals).fold(Decimal::ONE, |acc, _| acc * Decimal::TEN)
}

/// Raw amount divided by `10^decimals`. Meant for display only.
pub fn to_decimal(raw_amount: u64, decimals: u32) -> Decimal {
    Decimal::from(raw_amount) / scale_factor(decimals)
}

/// [`to_decimal`] for `u128` balances. `None` beyond the 96 bits a [`Decimal`] can hold.
pub fn balance_to_decimal(raw_balance: u128, decimals: u32) -> Option<Decimal> {
    Decimal::from_u128(raw_balance).map(|raw| raw / scale_factor(decimals))
}

/// Decimal amount multiplied by `10^decimals`.
///
/// No rounding happens here. The result can still carry a fractional part, which is not a
/// valid on-chain amount, so callers must round it before building a transaction.
pub fn to_raw(decimal_amount: Decimal, decimals: u32) -> Decimal {
    decimal_amount * scale_factor(decimals)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use test_case::test_case;

    use super::*;

    #[test_case(5_000_000_000, 9, dec!(5) ; "whole coins")]
    #[test_case(1, 9, dec!(0.000000001) ; "one mist")]
    #[test_case(0, 9, dec!(0) ; "zero")]
    #[test_case(12_345, 0, dec!(12345) ; "no decimals")]
    fn to_decimal_divides_by_power_of_ten(raw: u64, decimals: u32, expected: Decimal) {
        assert_eq!(to_decimal(raw, decimals), expected);
    }

    #[test]
    fn balance_to_decimal_covers_u128() {
        let raw = u128::from(u64::MAX) * 10;
        assert_eq!(balance_to_decimal(raw, 9), Some(dec!(184467440737.09551615)));
        assert_eq!(balance_to_decimal(0, 9), Some(Decimal::ZERO));
        assert_eq!(balance_to_decimal(u128::MAX, 9), None);
    }

    #[test]
    fn to_raw_keeps_fractional_part() {
        assert_eq!(to_raw(dec!(1.5), 9), dec!(1500000000));
        assert_eq!(to_raw(dec!(0.0000000015), 9), dec!(1.5));
    }

    #[test]
    fn to_raw_inverts_to_decimal_for_whole_amounts() {
        let raw = 123_456_789_012u64;
        assert_eq!(to_raw(to_decimal(raw, 9), 9), Decimal::from(raw));
    }
}
