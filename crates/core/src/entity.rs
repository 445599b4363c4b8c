//! Entity trait: records identified by a business key rather than by value.

/// Entity marker + minimal interface.
///
/// Tire records are keyed by part number and cart lines by their composite
/// line id; two entities with the same key are the same entity even when
/// their other fields differ.
pub trait Entity {
    /// Strongly-typed business key.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity key.
    fn id(&self) -> &Self::Id;

    /// Whether this entity carries the given key.
    fn has_id(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}
