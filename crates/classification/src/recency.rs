//! Recency classification: time since the previous login → tier.
//!
//! Ladder (inclusive upper bounds, first match wins):
//! - no previous login: `Nuevo`
//! - `<= 12h`: `Hechicero`
//! - `<= 48h`: `Luchador`
//! - `<= 168h` (7 days): `Explorador`
//! - otherwise: `Olvidado`
//!
//! A previous login in the future yields a negative elapsed time, which lands
//! in the first bucket. This is accepted as-is, not clamped. A stored login
//! that is present but cannot be read as a timestamp fails every comparison
//! and lands in `Olvidado`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use tierbadge_core::{Clock, DomainError, DomainResult};

use crate::ClassificationTier;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// What the session store knows about the previous login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastLogin {
    /// No login was ever recorded.
    Never,
    At(DateTime<Utc>),
    /// Something was recorded but it is not a usable timestamp.
    Unreadable,
}

impl LastLogin {
    /// Read a stored timestamp string.
    ///
    /// Empty is `Never`. Accepts RFC 3339, a zone-less date-time (taken as
    /// UTC) and a bare date (midnight UTC); anything else is `Unreadable`.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return LastLogin::Never;
        }
        let trimmed = raw.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
            return LastLogin::At(at.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return LastLogin::At(naive.and_utc());
        }
        if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return LastLogin::At(midnight.and_utc());
        }
        LastLogin::Unreadable
    }

    /// Read a stored epoch-milliseconds value. Zero counts as never.
    pub fn from_epoch_millis(millis: i64) -> Self {
        if millis == 0 {
            return LastLogin::Never;
        }
        match Utc.timestamp_millis_opt(millis).single() {
            Some(at) => LastLogin::At(at),
            None => LastLogin::Unreadable,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            LastLogin::At(at) => Some(*at),
            LastLogin::Never | LastLogin::Unreadable => None,
        }
    }
}

impl From<Option<DateTime<Utc>>> for LastLogin {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(LastLogin::Never, LastLogin::At)
    }
}

/// Hour thresholds for the recency ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyThresholds {
    hechicero_hours: f64,
    luchador_hours: f64,
    explorador_hours: f64,
}

impl Default for RecencyThresholds {
    fn default() -> Self {
        Self {
            hechicero_hours: 12.0,
            luchador_hours: 48.0,
            explorador_hours: 7.0 * 24.0,
        }
    }
}

impl RecencyThresholds {
    /// Build a ladder; bounds must be finite and strictly ascending.
    pub fn new(hechicero_hours: f64, luchador_hours: f64, explorador_hours: f64) -> DomainResult<Self> {
        let bounds = [hechicero_hours, luchador_hours, explorador_hours];
        if bounds.iter().any(|h| !h.is_finite()) {
            return Err(DomainError::validation("recency thresholds must be finite"));
        }
        if !(hechicero_hours < luchador_hours && luchador_hours < explorador_hours) {
            return Err(DomainError::validation(format!(
                "recency thresholds must be ascending (got {hechicero_hours}, {luchador_hours}, {explorador_hours})"
            )));
        }
        Ok(Self {
            hechicero_hours,
            luchador_hours,
            explorador_hours,
        })
    }

    pub fn hechicero_hours(&self) -> f64 {
        self.hechicero_hours
    }

    pub fn luchador_hours(&self) -> f64 {
        self.luchador_hours
    }

    pub fn explorador_hours(&self) -> f64 {
        self.explorador_hours
    }

    /// Map an elapsed time in hours onto the ladder.
    pub fn tier_for_hours(&self, elapsed_hours: f64) -> ClassificationTier {
        match elapsed_hours {
            h if h <= self.hechicero_hours => ClassificationTier::Hechicero,
            h if h <= self.luchador_hours => ClassificationTier::Luchador,
            h if h <= self.explorador_hours => ClassificationTier::Explorador,
            _ => ClassificationTier::Olvidado,
        }
    }

    pub fn classify_at(
        &self,
        previous_login: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> ClassificationTier {
        self.classify_last_login(LastLogin::from(previous_login), now)
    }

    pub fn classify_last_login(&self, last_login: LastLogin, now: DateTime<Utc>) -> ClassificationTier {
        match last_login {
            LastLogin::Never => ClassificationTier::Nuevo,
            LastLogin::At(previous) => self.tier_for_hours(elapsed_hours(previous, now)),
            LastLogin::Unreadable => ClassificationTier::Olvidado,
        }
    }
}

/// Hours between `previous` and `now`, at millisecond resolution.
///
/// Negative when `previous` is after `now`.
pub fn elapsed_hours(previous: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - previous).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Classify with the default ladder against an explicit `now`.
pub fn classify_by_recency_at(
    previous_login: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ClassificationTier {
    RecencyThresholds::default().classify_at(previous_login, now)
}

/// Classify with the default ladder, reading `now` from `clock`.
pub fn classify_by_recency(
    previous_login: Option<DateTime<Utc>>,
    clock: &impl Clock,
) -> ClassificationTier {
    classify_by_recency_at(previous_login, clock.now())
}
