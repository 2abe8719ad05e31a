//! Value object trait: equality by value, not identity.
//!
//! Tiers, scores and user records are all value objects: computed on demand,
//! never mutated, and compared by their attributes.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct EngagementScore(u32);
///
/// impl ValueObject for EngagementScore {}
///
/// assert_eq!(EngagementScore(50), EngagementScore(50));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
