//! Price formatting and client-side price ranges.
//!
//! Prices are decimal amounts in Brazilian reais (BRL). The upstream catalog
//! cannot filter by price, so [`PriceRange`] is applied to each fetched page
//! after the fact.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An optional inclusive `[min, max]` price range.
///
/// Negative bounds are dropped on construction. An absent bound imposes no
/// constraint. A range with `min > max` is kept as-is and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PriceRange {
    min: Option<Decimal>,
    max: Option<Decimal>,
}

impl PriceRange {
    /// Create a range, discarding negative bounds.
    #[must_use]
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self {
            min: min.filter(|p| !p.is_sign_negative()),
            max: max.filter(|p| !p.is_sign_negative()),
        }
    }

    /// Lower bound, if any.
    #[must_use]
    pub const fn min(&self) -> Option<Decimal> {
        self.min
    }

    /// Upper bound, if any.
    #[must_use]
    pub const fn max(&self) -> Option<Decimal> {
        self.max
    }

    /// True when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Check whether a price falls inside the range (inclusive).
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// Format an amount as Brazilian currency, e.g. `R$ 1.234,56`.
#[must_use]
pub fn format_brl(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = rounded.abs().to_string();
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_range_drops_negative_bounds() {
        let range = PriceRange::new(Some(d("-1")), Some(d("50")));
        assert_eq!(range.min(), None);
        assert_eq!(range.max(), Some(d("50")));
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = PriceRange::new(Some(d("100")), Some(d("500")));
        assert!(range.contains(d("100")));
        assert!(range.contains(d("500")));
        assert!(!range.contains(d("99.99")));
        assert!(!range.contains(d("500.01")));
    }

    #[test]
    fn test_unbounded_range_matches_everything() {
        let range = PriceRange::default();
        assert!(range.is_unbounded());
        assert!(range.contains(Decimal::ZERO));
        assert!(range.contains(d("1000000")));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let range = PriceRange::new(Some(d("500")), Some(d("100")));
        for price in [d("0"), d("100"), d("300"), d("500"), d("1000")] {
            assert!(!range.contains(price));
        }
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(d("0")), "R$ 0,00");
        assert_eq!(format_brl(d("9.5")), "R$ 9,50");
        assert_eq!(format_brl(d("1234.567")), "R$ 1.234,57");
        assert_eq!(format_brl(d("1000000")), "R$ 1.000.000,00");
        assert_eq!(format_brl(d("-12.3")), "-R$ 12,30");
    }
}
