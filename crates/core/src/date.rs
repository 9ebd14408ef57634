//! Calendar dates stored as `YYYYMMDD` integers.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A calendar day encoded as `YYYYMMDD` (e.g. `20240315`).
///
/// `0` is the "unset" sentinel. Because the encoding is positional, integer
/// ordering equals chronological ordering for any two set dates.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(u32);

/// Best-effort `YYYYMMDD` rendering of invalid components for error reports.
fn saturating_raw(year: i32, month: u32, day: u32) -> u32 {
    u32::try_from(year.max(0))
        .unwrap_or(0)
        .saturating_mul(10_000)
        .saturating_add(month.saturating_mul(100))
        .saturating_add(day)
}

impl CalendarDate {
    pub const UNSET: CalendarDate = CalendarDate(0);

    /// Wrap a raw `YYYYMMDD` value without checking it (records coming back
    /// from storage are taken as-is; `0` stays unset).
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Parse a raw `YYYYMMDD` value, rejecting days that do not exist.
    pub fn parse(value: u32) -> DomainResult<Self> {
        if value == 0 {
            return Ok(Self::UNSET);
        }
        let date = Self(value);
        date.to_naive().ok_or(DomainError::InvalidDate(value))?;
        Ok(date)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        // Years outside 0..=9999 cannot be represented; clamp to the sentinel.
        if !(0..=9999).contains(&date.year()) {
            return Self::UNSET;
        }
        Self(date.year() as u32 * 10_000 + date.month() * 100 + date.day())
    }

    /// Build from components. Days that do not exist and years outside
    /// `1..=9999` are rejected.
    pub fn ymd(year: i32, month: u32, day: u32) -> DomainResult<Self> {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) if (1..=9999).contains(&year) => Ok(Self::from_naive(date)),
            _ => Err(DomainError::InvalidDate(saturating_raw(year, month, day))),
        }
    }

    /// Today's date in the local time zone.
    pub fn today() -> Self {
        Self::from_naive(Local::now().date_naive())
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_set(self) -> bool {
        self.0 != 0
    }

    pub fn to_naive(self) -> Option<NaiveDate> {
        if self.0 == 0 {
            return None;
        }
        let year = (self.0 / 10_000) as i32;
        let month = (self.0 / 100) % 100;
        let day = self.0 % 100;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Weekday of this date, or `None` when unset or not a real day.
    pub fn weekday(self) -> Option<Weekday> {
        self.to_naive().map(|d| d.weekday())
    }
}

impl core::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_naive() {
            Some(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            None if self.0 == 0 => f.write_str("unset"),
            None => write!(f, "invalid({})", self.0),
        }
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self::from_naive(value)
    }
}
