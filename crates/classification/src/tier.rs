use core::str::FromStr;

use serde::{Deserialize, Serialize};

use tierbadge_core::{DomainError, ValueObject};

/// User-facing engagement badge.
///
/// Two independent rules produce tiers: the recency ladder (see
/// [`crate::recency`]) and the engagement-score ladder (see
/// [`crate::score::tier_for_score`]). Only the recency ladder yields `Nuevo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationTier {
    Hechicero,
    Luchador,
    Explorador,
    Olvidado,
    Nuevo,
}

impl ClassificationTier {
    pub const ALL: [ClassificationTier; 5] = [
        ClassificationTier::Hechicero,
        ClassificationTier::Luchador,
        ClassificationTier::Explorador,
        ClassificationTier::Olvidado,
        ClassificationTier::Nuevo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationTier::Hechicero => "Hechicero",
            ClassificationTier::Luchador => "Luchador",
            ClassificationTier::Explorador => "Explorador",
            ClassificationTier::Olvidado => "Olvidado",
            ClassificationTier::Nuevo => "Nuevo",
        }
    }

    /// Badge subtitle shown next to the tier.
    ///
    /// Worded for the recency ladder, which is where badges are rendered.
    pub fn description(&self) -> &'static str {
        match self {
            ClassificationTier::Hechicero => "Último acceso en las últimas 12 horas",
            ClassificationTier::Luchador => "Último acceso entre 12 y 48 horas",
            ClassificationTier::Explorador => "Último acceso entre 2 y 7 días",
            ClassificationTier::Olvidado => "Último acceso hace más de 7 días",
            ClassificationTier::Nuevo => "Primera vez en la aplicación",
        }
    }
}

impl ValueObject for ClassificationTier {}

impl core::fmt::Display for ClassificationTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| DomainError::unsupported(format!("classification tier '{s}'")))
    }
}
