//! Session configuration with serde defaults and validation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::constants::{
    BITE_DELAY_MAX_SECS, BITE_DELAY_MIN_SECS, STARTING_COINS, STARTING_ROD, STARTING_ZONE,
};
use crate::minigame::MinigameVariant;

/// Longest bite delay a configuration may ask for, in seconds.
const BITE_DELAY_CEILING_SECS: f32 = 60.0;

/// Errors raised when a configuration violates its invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("configuration could not be parsed: {0}")]
    Parse(String),
    #[error("bite delay minimum {min:.2} exceeds maximum {max:.2}")]
    BiteDelayRange { min: f32, max: f32 },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("starting rod `{0}` is not in the catalog")]
    UnknownRod(String),
    #[error("starting zone `{0}` is not in the catalog")]
    UnknownZone(String),
}

/// Tunables for a fishing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishingConfig {
    #[serde(default = "FishingConfig::default_starting_coins")]
    pub starting_coins: u64,
    #[serde(default = "FishingConfig::default_starting_rod")]
    pub starting_rod: String,
    #[serde(default = "FishingConfig::default_starting_zone")]
    pub starting_zone: String,
    #[serde(default = "FishingConfig::default_bite_delay_min_secs")]
    pub bite_delay_min_secs: f32,
    #[serde(default = "FishingConfig::default_bite_delay_max_secs")]
    pub bite_delay_max_secs: f32,
    #[serde(default)]
    pub variant: MinigameVariant,
}

impl FishingConfig {
    const fn default_starting_coins() -> u64 {
        STARTING_COINS
    }

    fn default_starting_rod() -> String {
        String::from(STARTING_ROD)
    }

    fn default_starting_zone() -> String {
        String::from(STARTING_ZONE)
    }

    const fn default_bite_delay_min_secs() -> f32 {
        BITE_DELAY_MIN_SECS
    }

    const fn default_bite_delay_max_secs() -> f32 {
        BITE_DELAY_MAX_SECS
    }

    /// Parse and validate a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or the values are invalid.
    pub fn from_json(json: &str, catalog: &Catalog) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate(catalog)?;
        Ok(config)
    }

    #[must_use]
    pub fn with_variant(mut self, variant: MinigameVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Validate ranges and catalog references.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        for (field, value) in [
            ("bite_delay_min_secs", self.bite_delay_min_secs),
            ("bite_delay_max_secs", self.bite_delay_max_secs),
        ] {
            if !(0.0..=BITE_DELAY_CEILING_SECS).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: BITE_DELAY_CEILING_SECS,
                    value,
                });
            }
        }
        if self.bite_delay_min_secs > self.bite_delay_max_secs {
            return Err(ConfigError::BiteDelayRange {
                min: self.bite_delay_min_secs,
                max: self.bite_delay_max_secs,
            });
        }
        if catalog.rod(&self.starting_rod).is_none() {
            return Err(ConfigError::UnknownRod(self.starting_rod.clone()));
        }
        if catalog.zone(&self.starting_zone).is_none() {
            return Err(ConfigError::UnknownZone(self.starting_zone.clone()));
        }
        Ok(())
    }
}

impl Default for FishingConfig {
    fn default() -> Self {
        Self {
            starting_coins: Self::default_starting_coins(),
            starting_rod: Self::default_starting_rod(),
            starting_zone: Self::default_starting_zone(),
            bite_delay_min_secs: Self::default_bite_delay_min_secs(),
            bite_delay_max_secs: Self::default_bite_delay_max_secs(),
            variant: MinigameVariant::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;

    #[test]
    fn defaults_validate() {
        let config = FishingConfig::default();
        assert_eq!(config.starting_coins, 100);
        assert_eq!(config.starting_rod, "wooden");
        assert_eq!(config.variant, MinigameVariant::LineCrossing);
        assert_eq!(config.validate(catalog()), Ok(()));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = FishingConfig::from_json(
            r#"{ "starting_coins": 5000, "variant": "drifting_target" }"#,
            catalog(),
        )
        .expect("valid config");
        assert_eq!(config.starting_coins, 5000);
        assert_eq!(config.variant, MinigameVariant::DriftingTarget);
        assert_eq!(config.starting_zone, "starter-dock");
        assert!((config.bite_delay_max_secs - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn inverted_bite_window_is_rejected() {
        let config = FishingConfig {
            bite_delay_min_secs: 3.0,
            bite_delay_max_secs: 1.0,
            ..FishingConfig::default()
        };
        assert!(matches!(
            config.validate(catalog()),
            Err(ConfigError::BiteDelayRange { .. })
        ));
    }

    #[test]
    fn out_of_range_delay_is_rejected() {
        let config = FishingConfig {
            bite_delay_max_secs: 600.0,
            ..FishingConfig::default()
        };
        assert!(matches!(
            config.validate(catalog()),
            Err(ConfigError::RangeViolation {
                field: "bite_delay_max_secs",
                ..
            })
        ));
    }

    #[test]
    fn unknown_references_are_rejected() {
        let rod = FishingConfig {
            starting_rod: String::from("harpoon"),
            ..FishingConfig::default()
        };
        assert_eq!(
            rod.validate(catalog()),
            Err(ConfigError::UnknownRod(String::from("harpoon")))
        );
        let zone = FishingConfig::from_json(r#"{ "starting_zone": "moon" }"#, catalog());
        assert_eq!(zone, Err(ConfigError::UnknownZone(String::from("moon"))));
        assert!(matches!(
            FishingConfig::from_json("{", catalog()),
            Err(ConfigError::Parse(_))
        ));
    }
}
