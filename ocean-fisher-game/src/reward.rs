//! Size, value and experience for a landed fish.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{FishSpecies, Rarity};
use crate::constants::XP_PER_LEVEL;
use crate::numbers::{floor_f64_to_u64, round_to_tenth};

/// Reward granted for a successful catch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatchReward {
    pub size: f32,
    pub sell_value: u64,
    pub xp: u64,
}

/// Roll a size uniformly inside the species range, rounded to one decimal.
///
/// Rounding happens before clamping, so bounds that are not whole tenths
/// still hold.
pub fn roll_size<R>(species: &FishSpecies, rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    let span = species.max_size - species.min_size;
    let raw = species.min_size + rng.r#gen::<f32>() * span;
    round_to_tenth(raw).clamp(species.min_size, species.max_size)
}

/// Coins a fish of `size` sells for.
///
/// Scales the base value by size relative to the range midpoint, rounded
/// down. A zero midpoint sells for the base value.
#[must_use]
pub fn sell_value(species: &FishSpecies, size: f32) -> u64 {
    let base = f64::from(species.base_value);
    let midpoint = f64::from(species.size_midpoint());
    if midpoint <= 0.0 {
        return floor_f64_to_u64(base);
    }
    floor_f64_to_u64(base * f64::from(size) / midpoint)
}

#[must_use]
pub const fn xp_for_rarity(rarity: Rarity) -> u64 {
    rarity.xp_reward()
}

/// Level reached with `xp` total experience.
#[must_use]
pub const fn level_for_xp(xp: u64) -> u32 {
    let level = xp / XP_PER_LEVEL + 1;
    if level > u32::MAX as u64 {
        u32::MAX
    } else {
        level as u32
    }
}

/// Experience still needed to reach the next level.
#[must_use]
pub const fn xp_to_next_level(xp: u64) -> u64 {
    (level_for_xp(xp) as u64 * XP_PER_LEVEL).saturating_sub(xp)
}

/// Reward for a fish of `size`.
#[must_use]
pub fn compute_catch(species: &FishSpecies, size: f32) -> CatchReward {
    CatchReward {
        size,
        sell_value: sell_value(species, size),
        xp: xp_for_rarity(species.rarity),
    }
}
