//! User classification rules (badges, engagement scores).
//!
//! This crate contains the two tier-producing rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). "Now" is always
//! passed in, either directly or through a [`tierbadge_core::Clock`].

pub mod recency;
pub mod rows;
pub mod score;
pub mod strategy;
pub mod tier;

pub use recency::{
    classify_by_recency, classify_by_recency_at, elapsed_hours, LastLogin, RecencyThresholds,
};
pub use rows::{score_rows, ScoredUser, UserRow};
pub use score::{
    email_domain_points, full_name_length, name_length_points, score_user, tier_for_score, EngagementScore,
    ScoreBand, UserRecord,
};
pub use strategy::{ClassificationInput, ClassificationStrategy};
pub use tier::ClassificationTier;
