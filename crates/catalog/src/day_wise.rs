//! Per-weekday price overrides.
//!
//! Stored records carry these as maps keyed by a three-letter weekday
//! (`"Mon"` .. `"Sun"`). In memory they are a fixed array indexed by
//! [`Weekday`], so an unknown key can never reach pricing code.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use dailyround_core::{CalendarDate, ValueObject};

const WEEKDAY_KEYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Wire key for a weekday (first three letters, fixed case).
pub fn weekday_key(day: Weekday) -> &'static str {
    WEEKDAY_KEYS[day.num_days_from_monday() as usize]
}

/// Exact-match, case-sensitive key lookup.
pub fn weekday_from_key(key: &str) -> Option<Weekday> {
    WEEKDAY_KEYS
        .iter()
        .position(|k| *k == key)
        .map(|idx| WEEKDAYS[idx])
}

/// Optional price for each day of the week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct DayWisePrices([Option<f64>; 7]);

impl ValueObject for DayWisePrices {}

impl DayWisePrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: Weekday) -> Option<f64> {
        self.0[day.num_days_from_monday() as usize]
    }

    pub fn set(&mut self, day: Weekday, price: Option<f64>) {
        self.0[day.num_days_from_monday() as usize] = price;
    }

    pub fn with(mut self, day: Weekday, price: f64) -> Self {
        self.set(day, Some(price));
        self
    }

    /// Override for the weekday of `date`, if any.
    pub fn for_date(&self, date: CalendarDate) -> Option<f64> {
        date.weekday().and_then(|day| self.get(day))
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Days that carry an override, Monday first.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, f64)> + '_ {
        WEEKDAYS
            .iter()
            .zip(self.0.iter())
            .filter_map(|(day, price)| price.map(|p| (*day, p)))
    }

    /// Build from a string-keyed map. Unrecognised keys are ignored.
    pub fn from_keyed<K: AsRef<str>>(map: impl IntoIterator<Item = (K, f64)>) -> Self {
        let mut prices = Self::default();
        for (key, price) in map {
            match weekday_from_key(key.as_ref()) {
                Some(day) => prices.set(day, Some(price)),
                None => tracing::warn!(key = key.as_ref(), "ignoring unknown weekday key"),
            }
        }
        prices
    }

    /// String-keyed form; only days with an override are written.
    pub fn to_keyed(&self) -> BTreeMap<String, f64> {
        self.days()
            .map(|(day, price)| (weekday_key(day).to_string(), price))
            .collect()
    }
}

impl From<BTreeMap<String, f64>> for DayWisePrices {
    fn from(value: BTreeMap<String, f64>) -> Self {
        Self::from_keyed(value)
    }
}

impl From<DayWisePrices> for BTreeMap<String, f64> {
    fn from(value: DayWisePrices) -> Self {
        value.to_keyed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_three_letter_fixed_case() {
        assert_eq!(weekday_key(Weekday::Mon), "Mon");
        assert_eq!(weekday_key(Weekday::Sun), "Sun");
        assert_eq!(weekday_from_key("Wed"), Some(Weekday::Wed));
        assert_eq!(weekday_from_key("wed"), None);
        assert_eq!(weekday_from_key("WED"), None);
        assert_eq!(weekday_from_key("Wednesday"), None);
    }

    #[test]
    fn unknown_keys_are_ignored_when_reading() {
        let prices = DayWisePrices::from_keyed([("Mon", 10.0), ("mon", 99.0), ("Xyz", 5.0)]);
        assert_eq!(prices.get(Weekday::Mon), Some(10.0));
        assert_eq!(prices.days().count(), 1);
    }

    #[test]
    fn writing_never_fabricates_days() {
        let prices = DayWisePrices::new().with(Weekday::Sat, 12.5);
        let keyed = prices.to_keyed();
        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed.get("Sat"), Some(&12.5));
    }

    #[test]
    fn serializes_as_weekday_keyed_map() {
        let prices = DayWisePrices::new().with(Weekday::Tue, 3.0).with(Weekday::Fri, 4.0);
        let json = serde_json::to_value(prices).unwrap();
        assert_eq!(json, serde_json::json!({"Fri": 4.0, "Tue": 3.0}));

        let back: DayWisePrices =
            serde_json::from_value(serde_json::json!({"Tue": 3.0, "Fri": 4.0, "Funday": 1.0}))
                .unwrap();
        assert_eq!(back, prices);
    }

    #[test]
    fn looks_up_by_calendar_date() {
        // 2024-06-08 was a Saturday.
        let prices = DayWisePrices::new().with(Weekday::Sat, 7.0);
        assert_eq!(prices.for_date(CalendarDate::from_raw(20240608)), Some(7.0));
        assert_eq!(prices.for_date(CalendarDate::from_raw(20240607)), None);
        assert_eq!(prices.for_date(CalendarDate::UNSET), None);
    }
}
