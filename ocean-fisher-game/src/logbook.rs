//! Discovery log summary.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{Catalog, Rarity};
use crate::ledger::PlayerState;
use crate::numbers::u64_to_f64;

/// Discovered versus total species for one rarity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub discovered: usize,
    pub total: usize,
}

/// Completion of the discovery log against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverySummary {
    pub discovered: usize,
    pub total: usize,
    pub completion_pct: f64,
    pub by_rarity: BTreeMap<Rarity, TierProgress>,
}

impl DiscoverySummary {
    #[must_use]
    pub fn from_state(state: &PlayerState, catalog: &Catalog) -> Self {
        let mut by_rarity: BTreeMap<Rarity, TierProgress> = Rarity::ALL
            .iter()
            .map(|rarity| (*rarity, TierProgress::default()))
            .collect();
        let mut discovered = 0;
        for species in &catalog.species {
            let tier = by_rarity.entry(species.rarity).or_default();
            tier.total += 1;
            if state.discovered.contains_key(&species.id) {
                tier.discovered += 1;
                discovered += 1;
            }
        }
        let total = catalog.species_count();
        let completion_pct = if total == 0 {
            0.0
        } else {
            let found = u64::try_from(discovered).unwrap_or(u64::MAX);
            let all = u64::try_from(total).unwrap_or(u64::MAX);
            u64_to_f64(found) * 100.0 / u64_to_f64(all)
        };
        Self {
            discovered,
            total,
            completion_pct,
            by_rarity,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total > 0 && self.discovered == self.total
    }
}
