//! Entity trait: things identified by a business key rather than by value.

/// Entity marker + minimal interface.
///
/// A stock-count line is an entity: two lines with the same item code describe
/// the same stock-keeping unit even when their quantities differ.
pub trait Entity {
    /// Business identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
