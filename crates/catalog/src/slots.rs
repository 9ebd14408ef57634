//! Delivery time-slot codec.
//!
//! Slots are stored on an offering as a compact token string: one letter per
//! slot, concatenated in canonical order (`"ANP"`). One producer writes the
//! same letters comma-separated (`"A,N,P"`); both forms decode identically.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named delivery window.
///
/// Declaration order is the canonical encoding order (derived `Ord`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Noon,
    Evening,
    AlwaysAvailable,
    Asap,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 5] = [
        TimeSlot::Morning,
        TimeSlot::Noon,
        TimeSlot::Evening,
        TimeSlot::AlwaysAvailable,
        TimeSlot::Asap,
    ];

    /// Single-letter wire token.
    pub fn token(self) -> char {
        match self {
            TimeSlot::Morning => 'A',
            TimeSlot::Noon => 'N',
            TimeSlot::Evening => 'P',
            TimeSlot::AlwaysAvailable => 'L',
            TimeSlot::Asap => 'S',
        }
    }

    /// Case-sensitive, exact-match token lookup.
    pub fn from_token(token: char) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.token() == token)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "Morning",
            TimeSlot::Noon => "Noon",
            TimeSlot::Evening => "Evening",
            TimeSlot::AlwaysAvailable => "Always available",
            TimeSlot::Asap => "As soon as possible",
        }
    }
}

impl core::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Encode a set of slots as concatenated tokens in canonical order.
pub fn encode_slots<'a>(slots: impl IntoIterator<Item = &'a TimeSlot>) -> String {
    let unique: BTreeSet<TimeSlot> = slots.into_iter().copied().collect();
    unique.into_iter().map(TimeSlot::token).collect()
}

/// Decode a token string. Unknown tokens are dropped (and logged).
pub fn decode_slots(encoded: &str) -> BTreeSet<TimeSlot> {
    let mut slots = BTreeSet::new();

    if encoded.contains(',') {
        for part in encoded.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let mut chars = part.chars();
            match (chars.next().and_then(TimeSlot::from_token), chars.next()) {
                (Some(slot), None) => {
                    slots.insert(slot);
                }
                _ => tracing::warn!(token = part, "dropping unknown time-slot token"),
            }
        }
    } else {
        for c in encoded.chars().filter(|c| !c.is_whitespace()) {
            match TimeSlot::from_token(c) {
                Some(slot) => {
                    slots.insert(slot);
                }
                None => tracing::warn!(token = %c, "dropping unknown time-slot token"),
            }
        }
    }

    slots
}
