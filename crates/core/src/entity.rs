//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Two catalog records with the same id are the same entity even when every
/// other field differs (an edited offering is still the same offering).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether `other` denotes the same entity, regardless of its attributes.
    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
