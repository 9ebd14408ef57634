//! Tracing/logging setup shared by binaries and test harnesses.

pub mod tracing;

pub use crate::tracing::{init, init_with};
