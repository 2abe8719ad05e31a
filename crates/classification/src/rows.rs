//! Rows from the external user listing and their scored form.

use serde::{Deserialize, Serialize};

use crate::score::{score_user, tier_for_score, EngagementScore, ScoreBand, UserRecord};
use crate::ClassificationTier;

/// One row of the user listing, in the listing's own field names.
///
/// Any missing field deserializes to an empty string so that scoring never
/// fails on a partial row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRow {
    pub id: String,
    pub nombre: String,
    pub apellidos: String,
    pub cedula: String,
    pub correo_electronico: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_ultimo_acceso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clasificacion: Option<String>,
}

impl From<&UserRow> for UserRecord {
    fn from(row: &UserRow) -> Self {
        UserRecord::new(&row.nombre, &row.apellidos, &row.correo_electronico)
    }
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord::new(row.nombre, row.apellidos, row.correo_electronico)
    }
}

/// A listing row after scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredUser {
    pub id: String,
    pub score: EngagementScore,
    pub tier: ClassificationTier,
    pub band: ScoreBand,
}

impl ScoredUser {
    pub fn from_row(row: &UserRow) -> Self {
        let score = score_user(&UserRecord::from(row));
        Self {
            id: row.id.clone(),
            score,
            tier: tier_for_score(score),
            band: ScoreBand::for_score(score),
        }
    }
}

/// Score every row of a listing, preserving order.
pub fn score_rows<'a>(rows: impl IntoIterator<Item = &'a UserRow>) -> Vec<ScoredUser> {
    rows.into_iter().map(ScoredUser::from_row).collect()
}
