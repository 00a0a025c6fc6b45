//! Long-run playthroughs comparing strike strategies across seeds.
use anyhow::{Context, Result};
use ocean_fisher_game::FishingConfig;
use serde::Serialize;

use crate::logic::policy::StrikeStrategy;
use crate::logic::seeds::SeedInfo;
use crate::logic::simulation::{SimulationConfig, run_simulation};

/// Outcome of one strategy playing one seed with the full economy loop.
#[derive(Debug, Clone, Serialize)]
pub struct PlaythroughRecord {
    pub seed: u64,
    pub seed_label: Option<String>,
    pub strategy: String,
    pub rounds: usize,
    pub catches: usize,
    pub escapes: usize,
    pub catch_rate: f64,
    pub level: u32,
    pub coins: u64,
    pub lifetime_value: u64,
    pub discovered: usize,
    pub zones_unlocked: usize,
    pub final_zone: String,
}

/// Per-strategy averages over every seed.
#[derive(Debug, Clone, Serialize)]
pub struct PlaythroughAggregate {
    pub strategy: String,
    pub runs: usize,
    pub mean_catch_rate: f64,
    pub mean_level: f64,
    pub mean_discovered: f64,
    pub best_level: u32,
    pub best_seed: Option<u64>,
}

/// Play `rounds` casts per strategy for every seed.
///
/// # Errors
///
/// Returns an error when a session cannot be built from `fishing`.
pub fn run_playthroughs(
    fishing: &FishingConfig,
    seeds: &[SeedInfo],
    rounds: u32,
) -> Result<Vec<PlaythroughRecord>> {
    let mut records = Vec::with_capacity(seeds.len() * StrikeStrategy::ALL.len());
    for info in seeds {
        for strategy in StrikeStrategy::ALL {
            let config = SimulationConfig::new(strategy, info.seed)
                .with_rounds(rounds)
                .with_economy(true)
                .with_fishing(fishing.clone());
            let summary = run_simulation(&config)
                .with_context(|| format!("{strategy} playthrough on seed {}", info.seed))?;
            records.push(PlaythroughRecord {
                seed: info.seed,
                seed_label: info.label.clone(),
                strategy: strategy.label().to_string(),
                rounds: summary.rounds.len(),
                catches: summary.catches(),
                escapes: summary.escapes(),
                catch_rate: summary.catch_rate(),
                level: summary.final_state.level,
                coins: summary.final_state.coins,
                lifetime_value: summary.final_state.total_value,
                discovered: summary.discovery.discovered,
                zones_unlocked: summary.zones_unlocked.len(),
                final_zone: summary.final_state.current_zone.clone(),
            });
        }
    }
    Ok(records)
}

#[must_use]
pub fn aggregate_playthroughs(records: &[PlaythroughRecord]) -> Vec<PlaythroughAggregate> {
    StrikeStrategy::ALL
        .iter()
        .filter_map(|strategy| {
            let runs: Vec<_> = records
                .iter()
                .filter(|record| record.strategy == strategy.label())
                .collect();
            if runs.is_empty() {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let count = runs.len() as f64;
            let best = runs.iter().max_by_key(|record| record.level);
            Some(PlaythroughAggregate {
                strategy: strategy.label().to_string(),
                runs: runs.len(),
                mean_catch_rate: runs.iter().map(|r| r.catch_rate).sum::<f64>() / count,
                mean_level: runs.iter().map(|r| f64::from(r.level)).sum::<f64>() / count,
                mean_discovered: runs
                    .iter()
                    .map(|r| u32::try_from(r.discovered).map_or(f64::MAX, f64::from))
                    .sum::<f64>()
                    / count,
                best_level: best.map_or(0, |record| record.level),
                best_seed: best.map(|record| record.seed),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_rank_as_expected() {
        let seeds = [SeedInfo::from_numeric(1337), SeedInfo::from_numeric(2024)];
        let records = run_playthroughs(&FishingConfig::default(), &seeds, 8).expect("runs");
        assert_eq!(records.len(), seeds.len() * StrikeStrategy::ALL.len());

        let aggregates = aggregate_playthroughs(&records);
        let rate = |label: &str| {
            aggregates
                .iter()
                .find(|a| a.strategy == label)
                .map(|a| a.mean_catch_rate)
                .expect("strategy present")
        };
        assert!((rate("Perfect") - 1.0).abs() < f64::EPSILON);
        assert!(rate("Idle").abs() < f64::EPSILON);
        assert!(rate("Perfect") >= rate("Jittery"));
    }

    #[test]
    fn empty_records_aggregate_to_nothing() {
        assert!(aggregate_playthroughs(&[]).is_empty());
    }
}
