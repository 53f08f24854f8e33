//! Fixed-point money helpers.
//!
//! All prices, totals and costs are `rust_decimal::Decimal`. Line totals are
//! exact products; only the per-unit cost at sale is a quotient and is kept at
//! [`COST_SCALE`] decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for per-unit costs.
pub const COST_SCALE: u32 = 6;

/// Weighted-average per-unit cost of `quantity` units that cost `total_cost` in sum.
///
/// Truncated toward zero, so `unit_cost_of(t, q) * q <= t` always holds.
/// Returns zero for a non-positive quantity.
pub fn unit_cost_of(total_cost: Decimal, quantity: i64) -> Decimal {
    if quantity <= 0 {
        return Decimal::ZERO;
    }
    (total_cost / Decimal::from(quantity))
        .round_dp_with_strategy(COST_SCALE, RoundingStrategy::ToZero)
}

/// Sum for reporting rollups; clamps at the `Decimal` bounds instead of panicking.
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn average_of_mixed_batches_is_truncated() {
        let avg = unit_cost_of(dec!(800), 150);
        assert_eq!(avg, dec!(5.333333));
        assert!(avg * Decimal::from(150) <= dec!(800));
        assert!(dec!(800) - avg * Decimal::from(150) < dec!(0.01));
    }

    #[test]
    fn rollups_clamp_instead_of_overflowing() {
        assert_eq!(saturating_sum([dec!(1.5), dec!(2)]), dec!(3.5));
        assert_eq!(saturating_sum([Decimal::MAX, dec!(1)]), Decimal::MAX);
        assert_eq!(saturating_sum(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn exact_average_is_unchanged() {
        assert_eq!(unit_cost_of(dec!(500), 100), dec!(5));
    }

    #[test]
    fn zero_quantity_has_zero_cost() {
        assert_eq!(unit_cost_of(dec!(12), 0), Decimal::ZERO);
    }
}
