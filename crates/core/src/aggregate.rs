//! Aggregate root trait.

/// Aggregate root marker + minimal interface.
///
/// Aggregates decide pure state transitions; storage adapters persist them.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Bumped once per applied state change.
    fn version(&self) -> u64;
}
