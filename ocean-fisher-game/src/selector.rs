//! Rarity-weighted fish selection.
//!
//! Every species starts from its tier's base weight. The rod's rare bonus
//! only boosts non-common species, while an active bait boosts every species
//! in the pool. Both bonuses are percentages of the unmodified base weight.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Bait, Catalog, FishSpecies, Rarity, Rod};

/// Equipment bonuses that shape a single draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionModifiers {
    /// Rod rare bonus percentage.
    pub rod_rare_bonus: u32,
    /// Bait rare bonus percentage when bait is active for this cast.
    pub bait_rare_bonus: Option<u32>,
}

impl SelectionModifiers {
    /// Build modifiers from the equipped rod and, when active, the bait.
    #[must_use]
    pub fn from_equipment(rod: &Rod, bait: Option<&Bait>) -> Self {
        Self {
            rod_rare_bonus: rod.rare_bonus,
            bait_rare_bonus: bait.map(|b| b.rare_bonus),
        }
    }
}

/// Effective weight of one species under the given modifiers.
#[must_use]
pub fn adjusted_weight(species: &FishSpecies, modifiers: SelectionModifiers) -> f64 {
    let base = species.rarity.base_weight();
    let mut weight = base;
    if species.rarity != Rarity::Common {
        weight += base * f64::from(modifiers.rod_rare_bonus) / 100.0;
    }
    if let Some(bait_bonus) = modifiers.bait_rare_bonus {
        weight += base * f64::from(bait_bonus) / 100.0;
    }
    weight
}

/// Effective weights for a pool, in pool order.
#[must_use]
pub fn adjusted_weights(pool: &[&FishSpecies], modifiers: SelectionModifiers) -> Vec<f64> {
    pool.iter()
        .map(|species| adjusted_weight(species, modifiers))
        .collect()
}

/// Draw one species from `pool`. Returns `None` only for an empty pool.
pub fn select_fish<'a, R>(
    pool: &[&'a FishSpecies],
    modifiers: SelectionModifiers,
    rng: &mut R,
) -> Option<&'a FishSpecies>
where
    R: Rng + ?Sized,
{
    let first = *pool.first()?;
    let weights = adjusted_weights(pool, modifiers);
    let total: f64 = weights.iter().sum();
    let roll = rng.r#gen::<f64>() * total;
    let picked = pick_index(&weights, roll).map_or_else(
        || {
            log::warn!(
                "weighted draw fell through (roll {roll:.4} of {total:.4}); using {}",
                first.id
            );
            first
        },
        |idx| pool[idx],
    );
    log::debug!(
        "selected {} ({}) with roll {roll:.3}/{total:.3}",
        picked.id,
        picked.rarity
    );
    Some(picked)
}

/// Draw from the species living in `zone_id`.
pub fn select_from_zone<'a, R>(
    catalog: &'a Catalog,
    zone_id: &str,
    modifiers: SelectionModifiers,
    rng: &mut R,
) -> Option<&'a FishSpecies>
where
    R: Rng + ?Sized,
{
    let pool = catalog.zone_pool(zone_id);
    select_fish(&pool, modifiers, rng)
}

/// Subtract weights in order until the remainder goes non-positive.
fn pick_index(weights: &[f64], roll: f64) -> Option<usize> {
    let mut remainder = roll;
    for (idx, weight) in weights.iter().enumerate() {
        remainder -= weight;
        if remainder <= 0.0 {
            return Some(idx);
        }
    }
    None
}
