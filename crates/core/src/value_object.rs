//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: a daily revenue
/// series built from the same dates and amounts is the same series, wherever
/// it came from. To "modify" one, build a new value (see
/// [`DailyRevenueSeries::with_values`](crate::DailyRevenueSeries::with_values)).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
