use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tierbadge_classification::ClassificationTier;

/// Per-user session entry, stored as JSON under `user_{id}`.
///
/// Only `lastLogin` is required to read an entry back; entries written by
/// older clients may lack the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    pub last_login: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl LoginRecord {
    /// Entry written at registration: first login is now, tier is `Nuevo`.
    pub fn registered(email: impl Into<String>, full_name: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            last_login: now,
            previous_login: None,
            classification: Some(ClassificationTier::Nuevo),
            updated_at: Some(now),
            email: Some(email.into()),
            full_name,
            created_at: Some(now),
        }
    }
}
