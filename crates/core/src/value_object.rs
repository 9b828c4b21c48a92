//! Value object trait: equality by value, not identity.
//!
//! Value objects are immutable and have no identity; two instances holding the
//! same values are the same thing. A tax number is a value object, a farm is an
//! entity.

/// Marker trait for value objects.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
