//! Pre-write validation of offerings and the editor's draft price fields.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dailyround_core::{CalendarDate, VariantId};

use crate::day_wise::DayWisePrices;
use crate::offering::Offering;
use crate::schedule::{PriceEntry, PricingMode};
use crate::tax::{PriceField, aggregate_tax_rate, recompute_linked_price};

/// Tax codes the editor lets a user attach to one price.
pub const DEFAULT_MAX_TAX_CODES: usize = 4;

/// A caller-correctable problem with an offering or its draft prices.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("sell price must be a finite amount of zero or more (got {0})")]
    NegativeSellPrice(f64),

    #[error("base price must be a finite amount of zero or more (got {0})")]
    NegativeBasePrice(f64),

    #[error("strike-through price {strike} must exceed the sell price {sell}")]
    StrikeNotAboveSell { strike: f64, sell: f64 },

    #[error("term-based pricing needs a term length of at least one month")]
    MissingTerm,

    #[error("variants are enabled but none have been added")]
    NoVariants,

    #[error("at most {max} tax codes are allowed (got {count})")]
    TooManyTaxCodes { count: usize, max: usize },

    #[error("{field} must be a finite amount of zero or more (got {value}) in price entry dated {date}")]
    InvalidScheduledAmount {
        field: &'static str,
        value: f64,
        date: CalendarDate,
    },

    #[error("strike-through price {strike} must exceed the sell price {sell} in price entry dated {date}")]
    ScheduledStrikeNotAboveSell {
        strike: f64,
        sell: f64,
        date: CalendarDate,
    },

    #[error("term-based pricing needs a term length in price entry dated {date}")]
    MissingScheduledTerm { date: CalendarDate },

    #[error("at most {max} tax codes are allowed (got {count}) in price entry dated {date}")]
    TooManyScheduledTaxCodes {
        count: usize,
        max: usize,
        date: CalendarDate,
    },
}

/// The price fields being edited for an offering, before they are folded
/// into the schedule as the current entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceDraft {
    pub pricing_mode: PricingMode,
    pub base_price: f64,
    pub sell_price: f64,
    /// `0` = no promotion.
    pub strike_through_price: f64,
    pub purchase_price: f64,
    pub delivery_charge_per_order: f64,
    pub delivery_charge_per_month: f64,
    pub term_months: u32,
    pub tax_codes: Vec<String>,
    pub day_wise_base_prices: Option<DayWisePrices>,
    pub day_wise_sell_prices: Option<DayWisePrices>,
    pub day_wise_strike_prices: Option<DayWisePrices>,
    pub day_wise_purchase_prices: Option<DayWisePrices>,
}

impl PriceDraft {
    /// Draft reflecting the offering-wide entry in effect on `as_of`
    /// (all zero when there is none).
    pub fn from_offering(offering: &Offering, as_of: CalendarDate) -> Self {
        let mut draft = offering
            .resolve_price(as_of, None)
            .map(Self::from_entry)
            .unwrap_or_default();
        draft.pricing_mode = offering.pricing_mode;
        draft
    }

    pub fn from_entry(entry: &PriceEntry) -> Self {
        Self {
            pricing_mode: PricingMode::Flat,
            base_price: entry.base_price,
            sell_price: entry.sell_price,
            strike_through_price: entry.strike_through_price,
            purchase_price: entry.purchase_price,
            delivery_charge_per_order: entry.delivery_charge_per_order,
            delivery_charge_per_month: entry.delivery_charge_per_month,
            term_months: entry.term_months,
            tax_codes: entry.tax_codes.clone(),
            day_wise_base_prices: entry.day_wise_base_prices,
            day_wise_sell_prices: entry.day_wise_sell_prices,
            day_wise_strike_prices: entry.day_wise_strike_prices,
            day_wise_purchase_prices: entry.day_wise_purchase_prices,
        }
    }

    pub fn tax_rate(&self) -> f64 {
        aggregate_tax_rate(&self.tax_codes)
    }

    /// Apply a user edit to base or sell price and derive the other one once.
    pub fn edit_price(&mut self, field: PriceField, value: f64) {
        let linked = recompute_linked_price(field, value, self.tax_rate());
        self.base_price = linked.base;
        self.sell_price = linked.sell;
    }

    /// Assemble the schedule entry this draft describes. Term length is only
    /// carried in term mode; day-wise maps only in weekday mode.
    pub fn into_entry(self, applicable_date: CalendarDate, variant_id: Option<VariantId>) -> PriceEntry {
        let weekday = self.pricing_mode == PricingMode::Weekday;
        PriceEntry {
            id: None,
            variant_id,
            applicable_date,
            term_months: if self.pricing_mode == PricingMode::Term {
                self.term_months
            } else {
                0
            },
            base_price: self.base_price,
            sell_price: self.sell_price,
            strike_through_price: self.strike_through_price,
            purchase_price: self.purchase_price,
            delivery_charge_per_order: self.delivery_charge_per_order,
            delivery_charge_per_month: self.delivery_charge_per_month,
            day_wise_base_prices: self.day_wise_base_prices.filter(|_| weekday),
            day_wise_sell_prices: self.day_wise_sell_prices.filter(|_| weekday),
            day_wise_strike_prices: self.day_wise_strike_prices.filter(|_| weekday),
            day_wise_purchase_prices: self.day_wise_purchase_prices.filter(|_| weekday),
            tax_codes: self.tax_codes,
        }
    }
}

/// Limits applied by [`validate_with`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    pub max_tax_codes: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_tax_codes: DEFAULT_MAX_TAX_CODES,
        }
    }
}

fn is_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// A non-zero strike-through price only counts when it exceeds the sell price.
fn strike_is_valid(strike: f64, sell: f64) -> bool {
    strike == 0.0 || strike.partial_cmp(&sell) == Some(Ordering::Greater)
}

/// Validate with the default rules. An empty list means the write may proceed.
pub fn validate(offering: &Offering, draft: &PriceDraft) -> Vec<ValidationError> {
    validate_with(offering, draft, &ValidationRules::default())
}

/// Offering-level rules, the editor's draft price fields, and every entry
/// already in the schedule.
pub fn validate_with(
    offering: &Offering,
    draft: &PriceDraft,
    rules: &ValidationRules,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_offering(offering, &mut errors);
    check_draft(draft, rules, &mut errors);
    check_schedule(offering, rules, &mut errors);
    errors
}

/// Offering-level rules and every scheduled entry, without a draft. This is
/// what a write of an already-assembled offering is checked against; no
/// entry needs to be in effect on any particular day.
pub fn validate_offering(offering: &Offering, rules: &ValidationRules) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_offering(offering, &mut errors);
    check_schedule(offering, rules, &mut errors);
    errors
}

fn check_offering(offering: &Offering, errors: &mut Vec<ValidationError>) {
    if offering.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if offering.has_variants && offering.variants().is_empty() {
        errors.push(ValidationError::NoVariants);
    }
}

fn check_draft(draft: &PriceDraft, rules: &ValidationRules, errors: &mut Vec<ValidationError>) {
    if !is_amount(draft.sell_price) {
        errors.push(ValidationError::NegativeSellPrice(draft.sell_price));
    }
    if !is_amount(draft.base_price) {
        errors.push(ValidationError::NegativeBasePrice(draft.base_price));
    }
    if !strike_is_valid(draft.strike_through_price, draft.sell_price) {
        errors.push(ValidationError::StrikeNotAboveSell {
            strike: draft.strike_through_price,
            sell: draft.sell_price,
        });
    }
    if draft.pricing_mode == PricingMode::Term && draft.term_months == 0 {
        errors.push(ValidationError::MissingTerm);
    }
    if draft.tax_codes.len() > rules.max_tax_codes {
        errors.push(ValidationError::TooManyTaxCodes {
            count: draft.tax_codes.len(),
            max: rules.max_tax_codes,
        });
    }
}

fn check_schedule(offering: &Offering, rules: &ValidationRules, errors: &mut Vec<ValidationError>) {
    for entry in offering.prices.entries() {
        let date = entry.applicable_date;
        for (field, value) in entry.monetary_fields() {
            if !is_amount(value) {
                errors.push(ValidationError::InvalidScheduledAmount { field, value, date });
            }
        }
        if !strike_is_valid(entry.strike_through_price, entry.sell_price) {
            errors.push(ValidationError::ScheduledStrikeNotAboveSell {
                strike: entry.strike_through_price,
                sell: entry.sell_price,
                date,
            });
        }
        if entry.tax_codes.len() > rules.max_tax_codes {
            errors.push(ValidationError::TooManyScheduledTaxCodes {
                count: entry.tax_codes.len(),
                max: rules.max_tax_codes,
                date,
            });
        }
    }
    // Entries written before a switch to term pricing are history once a
    // later entry of the same scope exists.
    if offering.pricing_mode == PricingMode::Term {
        for entry in offering.prices.open_ended() {
            if entry.term_months == 0 {
                errors.push(ValidationError::MissingScheduledTerm {
                    date: entry.applicable_date,
                });
            }
        }
    }
}
