//! Offering catalog domain (pure).
//!
//! This crate contains the catalog model and its pricing rules, implemented
//! as deterministic domain logic (no IO, no HTTP, no storage): price
//! schedules, tax derivation, promotions, day-wise pricing, delivery
//! time-slot encoding and pre-write validation.

pub mod day_wise;
pub mod images;
pub mod offering;
pub mod promotion;
pub mod schedule;
pub mod slots;
pub mod tax;
pub mod validation;

pub use day_wise::{DayWisePrices, weekday_from_key, weekday_key};
pub use images::{ImageResolution, ImageUploader, UploadError, resolve_images};
pub use offering::{Category, Offering, OfferingKind, Source, Variant};
pub use promotion::{Promotion, discount_percentage, has_promotion};
pub use schedule::{PriceEntry, PriceSchedule, PricingMode};
pub use slots::{TimeSlot, decode_slots, encode_slots};
pub use tax::{
    LinkedPrices, PriceField, TaxCode, aggregate_tax_rate, derive_base_from_sell,
    derive_sell_from_base, recompute_linked_price,
};
pub use validation::{
    DEFAULT_MAX_TAX_CODES, PriceDraft, ValidationError, ValidationRules, validate, validate_offering,
    validate_with,
};
