//! Engagement scoring: name length + email domain → score → tier.

use serde::{Deserialize, Serialize};

use tierbadge_core::ValueObject;

use crate::ClassificationTier;

/// Minimal profile fields used as scoring input.
///
/// No format rules are enforced here; absent fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
}

impl UserRecord {
    pub fn new(
        given_name: impl Into<String>,
        family_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            email: email.into(),
        }
    }

    /// `"{given} {family}"` with surrounding whitespace removed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim_matches(is_name_whitespace)
            .to_string()
    }
}

impl ValueObject for UserRecord {}

/// Whitespace stripped from the ends of a full name.
///
/// Unicode `White_Space` minus NEL (U+0085), plus the byte-order mark
/// (U+FEFF): the set web clients trim, so lengths agree with theirs.
fn is_name_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{0085}')
}

/// Length of a full name in UTF-16 code units.
///
/// Characters outside the BMP (most emoji, rare CJK) count as two.
pub fn full_name_length(full_name: &str) -> usize {
    full_name.encode_utf16().count()
}

/// Non-negative sum of the name-length and email-domain contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngagementScore(u32);

impl EngagementScore {
    /// Highest score the rules can produce (20 + 40).
    pub const MAX: EngagementScore = EngagementScore(60);

    pub fn new(points: u32) -> Self {
        Self(points)
    }

    pub fn points(&self) -> u32 {
        self.0
    }
}

impl ValueObject for EngagementScore {}

impl core::fmt::Display for EngagementScore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} pts", self.0)
    }
}

/// Points for the length (UTF-16 code units) of the trimmed full name.
pub fn name_length_points(full_name_len: usize) -> u32 {
    match full_name_len {
        n if n > 10 => 20,
        n if n >= 5 => 10,
        _ => 0,
    }
}

/// Points for the email domain, matched case-insensitively on the suffix.
///
/// Anything that is not gmail or hotmail (including addresses with no `@`)
/// gets the default 10.
pub fn email_domain_points(email: &str) -> u32 {
    let email = email.to_lowercase();
    if email.ends_with("@gmail.com") {
        40
    } else if email.ends_with("@hotmail.com") {
        20
    } else {
        10
    }
}

/// Score a user record. Total: every input, including empty strings, scores.
pub fn score_user(record: &UserRecord) -> EngagementScore {
    let name_points = name_length_points(full_name_length(&record.full_name()));
    let email_points = email_domain_points(&record.email);
    EngagementScore(name_points + email_points)
}

/// Map a score onto the tier space (descending, first match wins).
///
/// Independent of the recency ladder and never yields `Nuevo`.
pub fn tier_for_score(score: EngagementScore) -> ClassificationTier {
    match score.points() {
        p if p >= 60 => ClassificationTier::Hechicero,
        p if p >= 40 => ClassificationTier::Luchador,
        p if p >= 30 => ClassificationTier::Explorador,
        _ => ClassificationTier::Olvidado,
    }
}

/// Colour band used when a score is shown in a user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn for_score(score: EngagementScore) -> Self {
        match score.points() {
            p if p >= 50 => ScoreBand::High,
            p if p >= 30 => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }
}
