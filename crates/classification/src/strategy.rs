//! Explicit selection between the two tier ladders.
//!
//! The recency ladder and the engagement-score ladder are not reconciled:
//! they use different inputs and different thresholds, and only recency can
//! produce `Nuevo`. Callers say which one they mean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recency::RecencyThresholds;
use crate::score::{score_user, tier_for_score, UserRecord};
use crate::ClassificationTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationStrategy {
    /// Time since the previous login.
    Recency,
    /// Name-length + email-domain score.
    Engagement,
}

/// What a caller knows about a user at classification time.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationInput<'a> {
    pub record: Option<&'a UserRecord>,
    pub previous_login: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

impl ClassificationStrategy {
    /// Classify with the default recency thresholds.
    pub fn classify(&self, input: &ClassificationInput<'_>) -> ClassificationTier {
        self.classify_with(&RecencyThresholds::default(), input)
    }

    /// Classify using `thresholds` for the recency ladder.
    ///
    /// Under `Engagement`, a missing record scores as an empty one.
    pub fn classify_with(
        &self,
        thresholds: &RecencyThresholds,
        input: &ClassificationInput<'_>,
    ) -> ClassificationTier {
        let tier = match self {
            ClassificationStrategy::Recency => thresholds.classify_at(input.previous_login, input.now),
            ClassificationStrategy::Engagement => match input.record {
                Some(record) => tier_for_score(score_user(record)),
                None => tier_for_score(score_user(&UserRecord::default())),
            },
        };
        tracing::trace!(strategy = ?self, %tier, "classified");
        tier
    }
}
