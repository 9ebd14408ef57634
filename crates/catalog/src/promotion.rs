//! Strike-through promotions on resolved price entries.

use serde::{Deserialize, Serialize};

use dailyround_core::CalendarDate;

use crate::schedule::{PriceEntry, PricingMode};

fn is_promotional(strike_through_price: f64, sell_price: f64) -> bool {
    strike_through_price > 0.0 && strike_through_price > sell_price
}

fn discount(strike_through_price: f64, sell_price: f64) -> Option<f64> {
    is_promotional(strike_through_price, sell_price)
        .then(|| (strike_through_price - sell_price) / strike_through_price * 100.0)
}

/// Whether the entry carries an active strike-through discount.
pub fn has_promotion(entry: &PriceEntry) -> bool {
    is_promotional(entry.strike_through_price, entry.sell_price)
}

/// Discount in percent; `None` unless [`has_promotion`] holds. Not rounded.
pub fn discount_percentage(entry: &PriceEntry) -> Option<f64> {
    discount(entry.strike_through_price, entry.sell_price)
}

/// An active promotion, as shown next to a price.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub strike_through_price: f64,
    pub sell_price: f64,
    pub discount_percentage: f64,
}

impl Promotion {
    pub fn evaluate(entry: &PriceEntry) -> Option<Self> {
        Self::from_prices(entry.strike_through_price, entry.sell_price)
    }

    /// Evaluate using the prices in effect on `date` (day-wise overrides in
    /// weekday mode).
    pub fn for_date(entry: &PriceEntry, date: CalendarDate, mode: PricingMode) -> Option<Self> {
        Self::from_prices(
            entry.effective_strike_price(date, mode),
            entry.effective_sell_price(date, mode),
        )
    }

    fn from_prices(strike_through_price: f64, sell_price: f64) -> Option<Self> {
        discount(strike_through_price, sell_price).map(|discount_percentage| Self {
            strike_through_price,
            sell_price,
            discount_percentage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_wise::DayWisePrices;
    use chrono::Weekday;

    fn priced(sell: f64, strike: f64) -> PriceEntry {
        PriceEntry::new(CalendarDate::from_raw(20240101), sell, sell).with_strike_through(strike)
    }

    #[test]
    fn strike_above_sell_is_a_promotion() {
        let entry = priced(100.0, 150.0);
        assert!(has_promotion(&entry));
        let pct = discount_percentage(&entry).unwrap();
        assert!((pct - 33.333_333).abs() < 1e-4);
    }

    #[test]
    fn no_strike_means_no_promotion() {
        let entry = priced(100.0, 0.0);
        assert!(!has_promotion(&entry));
        assert_eq!(discount_percentage(&entry), None);
    }

    #[test]
    fn strike_at_or_below_sell_is_not_a_promotion() {
        assert!(!has_promotion(&priced(100.0, 100.0)));
        assert!(!has_promotion(&priced(100.0, 90.0)));
        assert_eq!(Promotion::evaluate(&priced(100.0, 90.0)), None);
    }

    #[test]
    fn free_item_with_strike_is_full_discount() {
        assert_eq!(discount_percentage(&priced(0.0, 40.0)), Some(100.0));
    }

    #[test]
    fn promotion_for_date_uses_day_wise_prices() {
        let mut entry = priced(100.0, 0.0);
        entry.day_wise_strike_prices = Some(DayWisePrices::new().with(Weekday::Sun, 125.0));
        let sunday = CalendarDate::from_raw(20240609);

        let promo = Promotion::for_date(&entry, sunday, PricingMode::Weekday).unwrap();
        assert_eq!(promo.strike_through_price, 125.0);
        assert!((promo.discount_percentage - 20.0).abs() < 1e-9);
        assert_eq!(Promotion::for_date(&entry, sunday, PricingMode::Flat), None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the discount exists exactly when a promotion is active and lies in (0, 100].
            #[test]
            fn discount_is_defined_only_for_promotions(sell in 0.0f64..1000.0, strike in 0.0f64..1000.0) {
                let entry = priced(sell, strike);
                match discount_percentage(&entry) {
                    Some(pct) => {
                        prop_assert!(has_promotion(&entry));
                        prop_assert!(pct > 0.0 && pct <= 100.0);
                    }
                    None => prop_assert!(!has_promotion(&entry)),
                }
            }
        }
    }
}
