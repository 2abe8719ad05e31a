//! Environment-driven configuration.
//!
//! | variable | default |
//! |---|---|
//! | `TIERBADGE_STORE_PATH` | `tierbadge-sessions.json` |
//! | `TIERBADGE_HECHICERO_HOURS` | `12` |
//! | `TIERBADGE_LUCHADOR_HOURS` | `48` |
//! | `TIERBADGE_EXPLORADOR_HOURS` | `168` |
//!
//! Bad values are logged and replaced by defaults; configuration never stops
//! the binary from starting.

use std::path::PathBuf;

use tierbadge_classification::RecencyThresholds;

pub const STORE_PATH_VAR: &str = "TIERBADGE_STORE_PATH";
pub const HECHICERO_HOURS_VAR: &str = "TIERBADGE_HECHICERO_HOURS";
pub const LUCHADOR_HOURS_VAR: &str = "TIERBADGE_LUCHADOR_HOURS";
pub const EXPLORADOR_HOURS_VAR: &str = "TIERBADGE_EXPLORADOR_HOURS";

pub const DEFAULT_STORE_PATH: &str = "tierbadge-sessions.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_path: PathBuf,
    pub thresholds: RecencyThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            thresholds: RecencyThresholds::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = RecencyThresholds::default();

        let store_path = lookup(STORE_PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));

        let hours = |name: &str, default: f64| -> f64 {
            let Some(raw) = lookup(name) else {
                return default;
            };
            match raw.trim().parse::<f64>() {
                Ok(h) => h,
                Err(e) => {
                    tracing::warn!(variable = name, value = %raw, error = %e, "invalid hours; using default");
                    default
                }
            }
        };

        let hechicero = hours(HECHICERO_HOURS_VAR, defaults.hechicero_hours());
        let luchador = hours(LUCHADOR_HOURS_VAR, defaults.luchador_hours());
        let explorador = hours(EXPLORADOR_HOURS_VAR, defaults.explorador_hours());

        let thresholds = RecencyThresholds::new(hechicero, luchador, explorador).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "recency thresholds rejected; using defaults");
            defaults
        });

        Self {
            store_path,
            thresholds,
        }
    }
}
