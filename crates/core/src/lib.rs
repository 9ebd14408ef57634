//! `dailyround-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog and its
//! infrastructure (no IO, no storage concerns).

pub mod date;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use date::CalendarDate;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ImageId, OfferingGid, OwnerId, PriceEntryId, VariantId};
pub use value_object::ValueObject;
