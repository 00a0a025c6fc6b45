//! Static catalog of fish species, rods, bait and zones.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::{
    WEIGHT_COMMON, WEIGHT_EPIC, WEIGHT_LEGENDARY, WEIGHT_MYTHICAL, WEIGHT_RARE, WEIGHT_UNCOMMON,
    XP_COMMON, XP_EPIC, XP_LEGENDARY, XP_MYTHICAL, XP_RARE, XP_UNCOMMON,
};

const DEFAULT_CATALOG_DATA: &str = include_str!("../assets/data/catalog.json");

/// Ordered rarity tiers, common heaviest and mythical lightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythical,
}

impl Rarity {
    /// Every tier in ascending order.
    pub const ALL: [Self; 6] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
        Self::Mythical,
    ];

    /// Zero-based position in the tier ordering.
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Common => 0,
            Self::Uncommon => 1,
            Self::Rare => 2,
            Self::Epic => 3,
            Self::Legendary => 4,
            Self::Mythical => 5,
        }
    }

    /// Unmodified selection weight for the tier.
    #[must_use]
    pub const fn base_weight(self) -> f64 {
        match self {
            Self::Common => WEIGHT_COMMON,
            Self::Uncommon => WEIGHT_UNCOMMON,
            Self::Rare => WEIGHT_RARE,
            Self::Epic => WEIGHT_EPIC,
            Self::Legendary => WEIGHT_LEGENDARY,
            Self::Mythical => WEIGHT_MYTHICAL,
        }
    }

    /// Experience awarded for landing a fish of this tier.
    #[must_use]
    pub const fn xp_reward(self) -> u64 {
        match self {
            Self::Common => XP_COMMON,
            Self::Uncommon => XP_UNCOMMON,
            Self::Rare => XP_RARE,
            Self::Epic => XP_EPIC,
            Self::Legendary => XP_LEGENDARY,
            Self::Mythical => XP_MYTHICAL,
        }
    }

    /// Strikes needed to land a fish of this tier.
    #[must_use]
    pub const fn required_hits(self) -> u32 {
        self.tier() as u32 + 1
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
            Self::Mythical => "mythical",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable definition of a catchable species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishSpecies {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub base_value: u32,
    pub min_size: f32,
    pub max_size: f32,
    pub catch_difficulty: f32,
    pub zone: String,
    #[serde(default)]
    pub description: String,
}

impl FishSpecies {
    /// Midpoint of the size range; a fish of this size sells for its base value.
    #[must_use]
    pub fn size_midpoint(&self) -> f32 {
        (self.min_size + self.max_size) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rod {
    pub id: String,
    pub name: String,
    pub price: u64,
    /// Percent bonuses; only `rare_bonus` feeds the selector.
    #[serde(default)]
    pub catch_bonus: u32,
    #[serde(default)]
    pub rare_bonus: u32,
    #[serde(default)]
    pub speed_bonus: u32,
    pub unlock_level: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bait {
    pub id: String,
    pub name: String,
    pub price: u64,
    #[serde(default)]
    pub rare_bonus: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub unlock_level: u32,
    #[serde(default)]
    pub description: String,
}

/// Errors raised when catalog data violates its invariants.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog data could not be parsed: {0}")]
    Parse(String),
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("species `{id}` has min size {min:.1} above max size {max:.1}")]
    SizeRange { id: String, min: f32, max: f32 },
    #[error("species `{id}` has negative {field}")]
    Negative { id: String, field: &'static str },
    #[error("species `{species}` references unknown zone `{zone}`")]
    UnknownZone { species: String, zone: String },
    #[error("catalog has no {0}")]
    Empty(&'static str),
}

/// Load-once lookup tables consumed by the selector, minigame and ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub species: Vec<FishSpecies>,
    pub rods: Vec<Rod>,
    pub baits: Vec<Bait>,
    pub zones: Vec<Zone>,
}

impl Catalog {
    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the JSON is malformed or violates an invariant.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self =
            serde_json::from_str(json).map_err(|err| CatalogError::Parse(err.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog embedded in the crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded JSON is invalid, which the crate tests rule out.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CATALOG_DATA).expect("embedded catalog is valid")
    }

    /// Validate catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns the first `CatalogError` found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.species.is_empty() {
            return Err(CatalogError::Empty("species"));
        }
        if self.rods.is_empty() {
            return Err(CatalogError::Empty("rods"));
        }
        if self.zones.is_empty() {
            return Err(CatalogError::Empty("zones"));
        }
        ensure_unique("species", self.species.iter().map(|s| s.id.as_str()))?;
        ensure_unique("rod", self.rods.iter().map(|r| r.id.as_str()))?;
        ensure_unique("bait", self.baits.iter().map(|b| b.id.as_str()))?;
        ensure_unique("zone", self.zones.iter().map(|z| z.id.as_str()))?;

        for species in &self.species {
            for (field, value) in [
                ("min_size", species.min_size),
                ("max_size", species.max_size),
                ("catch_difficulty", species.catch_difficulty),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(CatalogError::Negative {
                        id: species.id.clone(),
                        field,
                    });
                }
            }
            if species.min_size > species.max_size {
                return Err(CatalogError::SizeRange {
                    id: species.id.clone(),
                    min: species.min_size,
                    max: species.max_size,
                });
            }
            if self.zone(&species.zone).is_none() {
                return Err(CatalogError::UnknownZone {
                    species: species.id.clone(),
                    zone: species.zone.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn species(&self, id: &str) -> Option<&FishSpecies> {
        self.species.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn rod(&self, id: &str) -> Option<&Rod> {
        self.rods.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn bait(&self, id: &str) -> Option<&Bait> {
        self.baits.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Species living in a zone, in catalog order.
    #[must_use]
    pub fn zone_pool(&self, zone_id: &str) -> Vec<&FishSpecies> {
        self.species.iter().filter(|s| s.zone == zone_id).collect()
    }

    #[must_use]
    pub fn species_count(&self) -> usize {
        self.species.len()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::load_from_static()
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Shared embedded catalog.
#[must_use]
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(Catalog::load_from_static)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_loads() {
        let catalog = catalog();
        assert_eq!(catalog.species_count(), 18);
        assert_eq!(catalog.rods.len(), 5);
        assert_eq!(catalog.baits.len(), 4);
        assert_eq!(catalog.zones.len(), 9);
        assert!(catalog.rod("wooden").is_some_and(|rod| rod.price == 0));
    }

    #[test]
    fn zone_pool_keeps_catalog_order() {
        let pool: Vec<_> = catalog()
            .zone_pool("starter-dock")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(pool, vec!["sardine", "anchovy", "mackerel", "bass"]);
        assert!(catalog().zone_pool("nowhere").is_empty());
    }

    #[test]
    fn rarity_tables_are_ordered() {
        for pair in Rarity::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].base_weight() > pair[1].base_weight());
            assert!(pair[0].xp_reward() < pair[1].xp_reward());
            assert_eq!(pair[0].required_hits() + 1, pair[1].required_hits());
        }
        assert_eq!(Rarity::Common.required_hits(), 1);
        assert_eq!(Rarity::Mythical.required_hits(), 6);
    }

    #[test]
    fn validation_rejects_inverted_size_range() {
        let mut broken = catalog().clone();
        broken.species[0].min_size = 10.0;
        broken.species[0].max_size = 2.0;
        assert!(matches!(
            broken.validate(),
            Err(CatalogError::SizeRange { .. })
        ));
    }

    #[test]
    fn validation_rejects_unknown_zone_and_duplicates() {
        let mut broken = catalog().clone();
        broken.species[1].zone = String::from("atlantis");
        assert_eq!(
            broken.validate(),
            Err(CatalogError::UnknownZone {
                species: String::from("anchovy"),
                zone: String::from("atlantis"),
            })
        );

        let mut dup = catalog().clone();
        let copy = dup.rods[0].clone();
        dup.rods.push(copy);
        assert!(matches!(
            dup.validate(),
            Err(CatalogError::DuplicateId { kind: "rod", .. })
        ));
    }

    #[test]
    fn validation_rejects_negative_difficulty() {
        let mut broken = catalog().clone();
        broken.species[2].catch_difficulty = -1.0;
        assert!(matches!(
            broken.validate(),
            Err(CatalogError::Negative {
                field: "catch_difficulty",
                ..
            })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Catalog::from_json("{ not json"),
            Err(CatalogError::Parse(_))
        ));
    }
}
