//! Dated price schedules and effective-price resolution.

use serde::{Deserialize, Serialize};

use dailyround_core::{CalendarDate, PriceEntryId, ValueObject, VariantId};

use crate::day_wise::DayWisePrices;
use crate::tax::aggregate_tax_rate;

/// How an offering's price varies.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    /// One price regardless of delivery day.
    #[default]
    Flat,
    /// Day-wise overrides apply to the delivery date's weekday.
    Weekday,
    /// Priced per subscription term (`term_months`).
    Term,
}

/// One dated row of a price schedule.
///
/// Monetary fields are plain doubles in the merchant's currency. A
/// `strike_through_price` of `0` means "no promotion".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceEntry {
    pub id: Option<PriceEntryId>,
    /// `None` applies to the whole offering.
    pub variant_id: Option<VariantId>,
    pub applicable_date: CalendarDate,
    pub term_months: u32,
    pub base_price: f64,
    pub sell_price: f64,
    pub strike_through_price: f64,
    pub purchase_price: f64,
    pub delivery_charge_per_order: f64,
    pub delivery_charge_per_month: f64,
    pub day_wise_base_prices: Option<DayWisePrices>,
    pub day_wise_sell_prices: Option<DayWisePrices>,
    pub day_wise_strike_prices: Option<DayWisePrices>,
    pub day_wise_purchase_prices: Option<DayWisePrices>,
    pub tax_codes: Vec<String>,
}

impl ValueObject for PriceEntry {}

fn day_wise_or(
    overrides: Option<&DayWisePrices>,
    flat: f64,
    date: CalendarDate,
    mode: PricingMode,
) -> f64 {
    if mode != PricingMode::Weekday {
        return flat;
    }
    overrides.and_then(|o| o.for_date(date)).unwrap_or(flat)
}

impl PriceEntry {
    pub fn new(applicable_date: CalendarDate, base_price: f64, sell_price: f64) -> Self {
        Self {
            applicable_date,
            base_price,
            sell_price,
            ..Self::default()
        }
    }

    pub fn for_variant(mut self, variant_id: VariantId) -> Self {
        self.variant_id = Some(variant_id);
        self
    }

    pub fn with_strike_through(mut self, strike_through_price: f64) -> Self {
        self.strike_through_price = strike_through_price;
        self
    }

    pub fn with_tax_codes<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.tax_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Sum of the percentages of this entry's tax codes.
    pub fn tax_rate(&self) -> f64 {
        aggregate_tax_rate(&self.tax_codes)
    }

    /// Every monetary field, including day-wise overrides, paired with its name.
    pub fn monetary_fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("base price", self.base_price),
            ("sell price", self.sell_price),
            ("strike-through price", self.strike_through_price),
            ("purchase price", self.purchase_price),
            ("delivery charge per order", self.delivery_charge_per_order),
            ("delivery charge per month", self.delivery_charge_per_month),
        ];
        let overrides = [
            ("day-wise base price", &self.day_wise_base_prices),
            ("day-wise sell price", &self.day_wise_sell_prices),
            ("day-wise strike-through price", &self.day_wise_strike_prices),
            ("day-wise purchase price", &self.day_wise_purchase_prices),
        ];
        for (name, map) in overrides {
            if let Some(map) = map {
                fields.extend(map.days().map(|(_, price)| (name, price)));
            }
        }
        fields
    }

    pub fn effective_sell_price(&self, date: CalendarDate, mode: PricingMode) -> f64 {
        day_wise_or(self.day_wise_sell_prices.as_ref(), self.sell_price, date, mode)
    }

    pub fn effective_base_price(&self, date: CalendarDate, mode: PricingMode) -> f64 {
        day_wise_or(self.day_wise_base_prices.as_ref(), self.base_price, date, mode)
    }

    pub fn effective_strike_price(&self, date: CalendarDate, mode: PricingMode) -> f64 {
        day_wise_or(
            self.day_wise_strike_prices.as_ref(),
            self.strike_through_price,
            date,
            mode,
        )
    }

    pub fn effective_purchase_price(&self, date: CalendarDate, mode: PricingMode) -> f64 {
        day_wise_or(
            self.day_wise_purchase_prices.as_ref(),
            self.purchase_price,
            date,
            mode,
        )
    }
}

/// The ordered price history of an offering and its variants.
///
/// Entries keep insertion order; resolution never depends on it except to
/// break ties between entries sharing an applicable date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSchedule {
    entries: Vec<PriceEntry>,
}

impl PriceSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: PriceEntry) {
        self.entries.push(entry);
    }

    /// Replace the entry with the same variant and applicable date, or append.
    ///
    /// A replaced entry keeps its surrogate id so storage updates the same row.
    pub fn upsert(&mut self, mut entry: PriceEntry) {
        let existing = self.entries.iter_mut().rev().find(|e| {
            e.variant_id == entry.variant_id && e.applicable_date == entry.applicable_date
        });
        match existing {
            Some(slot) => {
                if entry.id.is_none() {
                    entry.id = slot.id;
                }
                *slot = entry;
            }
            None => self.entries.push(entry),
        }
    }

    /// Entries not superseded by a later entry of the same variant scope.
    /// Each governs every delivery from its date onwards.
    pub fn open_ended(&self) -> impl Iterator<Item = &PriceEntry> {
        self.entries.iter().filter(|entry| {
            !self.entries.iter().any(|other| {
                other.variant_id == entry.variant_id
                    && other.applicable_date > entry.applicable_date
            })
        })
    }

    /// Drop every entry scoped to `variant_id`. Returns how many were removed.
    pub fn remove_variant(&mut self, variant_id: &VariantId) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| e.variant_id.as_ref() != Some(variant_id));
        before - self.entries.len()
    }

    /// Latest date-eligible entry among those matching `scope`; ties go to
    /// the entry inserted last.
    fn latest_eligible(
        &self,
        as_of: CalendarDate,
        scope: Option<&VariantId>,
    ) -> Option<&PriceEntry> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.variant_id.as_ref() == scope && e.applicable_date <= as_of)
            .max_by_key(|(idx, e)| (e.applicable_date, *idx))
            .map(|(_, e)| e)
    }

    /// Resolve the entry in effect on `as_of`.
    ///
    /// With a variant, an eligible variant-specific entry wins; otherwise the
    /// offering-wide entries are consulted. Without a variant only
    /// offering-wide entries are considered. `None` means no price is
    /// available on that date.
    pub fn resolve(&self, as_of: CalendarDate, variant_id: Option<&VariantId>) -> Option<&PriceEntry> {
        if let Some(variant_id) = variant_id {
            if let Some(entry) = self.latest_eligible(as_of, Some(variant_id)) {
                return Some(entry);
            }
        }
        self.latest_eligible(as_of, None)
    }
}

impl FromIterator<PriceEntry> for PriceSchedule {
    fn from_iter<T: IntoIterator<Item = PriceEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
