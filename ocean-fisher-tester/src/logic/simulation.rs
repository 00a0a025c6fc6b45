use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use ocean_fisher_game::{
    DiscoverySummary, FishingConfig, FishingSession, GameEngine, GameEvent, Intent,
    MinigamePhase, MinigameVariant, PlayerState, Rarity, StaticCatalog,
};
use sha2::{Digest, Sha256};

use crate::logic::policy::{StrikeDecision, StrikePolicy, StrikeStrategy};

const STEP_MS: u64 = 50;
/// Strikes one policy may throw within a single step before time moves on.
const MAX_STRIKES_PER_STEP: u32 = 8;
/// Upper bound on steps per round; a round that needs more is reported as halted.
const MAX_STEPS_PER_ROUND: u32 = 20_000;
const SELL_THRESHOLD: usize = 5;
const BAIT_BATCH: u32 = 5;

/// Configuration for a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: StrikeStrategy,
    pub rounds: u32,
    /// Sell, buy gear and move zones between casts.
    pub economy: bool,
    pub fishing: FishingConfig,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: StrikeStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            rounds: 10,
            economy: false,
            fishing: FishingConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    #[must_use]
    pub const fn with_economy(mut self, economy: bool) -> Self {
        self.economy = economy;
        self
    }

    #[must_use]
    pub fn with_fishing(mut self, fishing: FishingConfig) -> Self {
        self.fishing = fishing;
        self
    }
}

/// Result of a single cast.
#[derive(Debug, Clone, Default)]
pub struct RoundRecord {
    pub index: u32,
    pub zone_id: String,
    pub species_id: Option<String>,
    pub rarity: Option<Rarity>,
    pub no_bite: bool,
    pub success: bool,
    pub halted: bool,
    pub hits: u32,
    pub required_hits: u32,
    pub strikes: u32,
    pub misses: u32,
    pub duration_ms: u64,
}

/// Everything a scenario expectation may inspect after a run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: StrikeStrategy,
    pub variant: MinigameVariant,
    pub starting_coins: u64,
    pub rounds: Vec<RoundRecord>,
    pub final_state: PlayerState,
    pub discovery: DiscoverySummary,
    pub level_ups: u32,
    pub zones_unlocked: Vec<String>,
    pub coins_earned: u64,
    pub purchases: u32,
    pub refusals: u32,
    pub event_counts: BTreeMap<&'static str, usize>,
    /// SHA-256 over the JSON of every emitted event, in order.
    pub event_digest: String,
    pub rng_draws: u64,
}

impl SimulationSummary {
    #[must_use]
    pub fn bitten(&self) -> impl Iterator<Item = &RoundRecord> {
        self.rounds.iter().filter(|round| !round.no_bite)
    }

    #[must_use]
    pub fn catches(&self) -> usize {
        self.rounds.iter().filter(|round| round.success).count()
    }

    #[must_use]
    pub fn escapes(&self) -> usize {
        self.bitten()
            .filter(|round| !round.success && !round.halted)
            .count()
    }

    #[must_use]
    pub fn halted(&self) -> usize {
        self.rounds.iter().filter(|round| round.halted).count()
    }

    /// Landed share of rounds that produced a bite.
    #[must_use]
    pub fn catch_rate(&self) -> f64 {
        let bitten = self.bitten().count();
        if bitten == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.catches() as f64 / bitten as f64;
        rate
    }
}

/// Deterministic harness driving a [`FishingSession`] with a strike policy.
pub struct SimulationSession {
    session: FishingSession,
    strategy: StrikeStrategy,
    policy: Box<dyn StrikePolicy + Send>,
    rounds: u32,
    economy: bool,
    starting_coins: u64,
    digest: Sha256,
    event_counts: BTreeMap<&'static str, usize>,
    level_ups: u32,
    zones_unlocked: Vec<String>,
    coins_earned: u64,
    purchases: u32,
    refusals: u32,
}

impl SimulationSession {
    /// Build a session over the embedded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error when the fishing configuration is rejected.
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let engine = GameEngine::new(StaticCatalog);
        let session = engine
            .create_session(config.fishing.clone(), config.seed)
            .with_context(|| format!("creating session for seed {}", config.seed))?;
        Ok(Self {
            session,
            strategy: config.strategy,
            policy: config.strategy.create_policy(config.seed),
            rounds: config.rounds,
            economy: config.economy,
            starting_coins: config.fishing.starting_coins,
            digest: Sha256::new(),
            event_counts: BTreeMap::new(),
            level_ups: 0,
            zones_unlocked: Vec::new(),
            coins_earned: 0,
            purchases: 0,
            refusals: 0,
        })
    }

    /// Play every configured round.
    ///
    /// # Errors
    ///
    /// Returns an error if an event cannot be serialized into the digest.
    pub fn run(mut self) -> Result<SimulationSummary> {
        log::debug!(
            "{} policy playing {} rounds on seed {}",
            self.policy.name(),
            self.rounds,
            self.session.seed()
        );
        let mut records = Vec::new();
        for index in 0..self.rounds {
            if self.economy {
                self.tend_shop()?;
            }
            let record = self.play_round(index)?;
            log::debug!(
                "seed {} round {} in {}: {:?} success={} hits {}/{} after {}ms",
                self.session.seed(),
                index,
                record.zone_id,
                record.species_id,
                record.success,
                record.hits,
                record.required_hits,
                record.duration_ms
            );
            records.push(record);
        }
        let discovery = self.session.discovery_summary();
        let seed = self.session.seed();
        let variant = self.session.config().variant;
        let rng_draws = self.session.rng_draws();
        Ok(SimulationSummary {
            seed,
            strategy: self.strategy,
            variant,
            starting_coins: self.starting_coins,
            rounds: records,
            final_state: self.session.into_state(),
            discovery,
            level_ups: self.level_ups,
            zones_unlocked: self.zones_unlocked,
            coins_earned: self.coins_earned,
            purchases: self.purchases,
            refusals: self.refusals,
            event_counts: self.event_counts,
            event_digest: format!("{:x}", self.digest.finalize()),
            rng_draws,
        })
    }

    fn play_round(&mut self, index: u32) -> Result<RoundRecord> {
        self.policy.reset();
        let started_ms = self.session.clock_ms();
        let mut record = RoundRecord {
            index,
            zone_id: self.session.state().current_zone.clone(),
            ..RoundRecord::default()
        };

        let cast = self.session.dispatch(Intent::Cast);
        self.absorb(&cast, &mut record)?;

        let mut steps = 0;
        while self.session.phase().is_busy() {
            if steps >= MAX_STEPS_PER_ROUND {
                record.halted = true;
                break;
            }
            steps += 1;

            let mut strikes_this_step = 0;
            while self.session.phase() == MinigamePhase::Active
                && strikes_this_step < MAX_STRIKES_PER_STEP
            {
                let Some(snapshot) = self.session.snapshot() else {
                    break;
                };
                if self.policy.decide(&snapshot) == StrikeDecision::Wait {
                    break;
                }
                strikes_this_step += 1;
                record.strikes += 1;
                let at_ms = self.session.clock_ms();
                let events = self.session.dispatch(Intent::Strike { at_ms });
                self.absorb(&events, &mut record)?;
            }

            if self.session.phase().is_busy() {
                let to_ms = self.session.clock_ms() + STEP_MS;
                let events = self.session.dispatch(Intent::Advance { to_ms });
                self.absorb(&events, &mut record)?;
            }
        }

        record.duration_ms = self.session.clock_ms().saturating_sub(started_ms);
        Ok(record)
    }

    /// Sell a full hold, upgrade the rod, restock bait and head for the
    /// deepest reachable zone.
    fn tend_shop(&mut self) -> Result<()> {
        let mut scratch = RoundRecord::default();

        if self.session.state().inventory.len() >= SELL_THRESHOLD {
            let events = self.session.dispatch(Intent::SellAll);
            self.absorb(&events, &mut scratch)?;
        }

        if let Some(rod_id) = self.next_rod() {
            let events = self.session.dispatch(Intent::BuyRod { rod_id });
            self.absorb(&events, &mut scratch)?;
        }

        let catalog = self.session.catalog();
        let state = self.session.state();
        let restock = catalog
            .baits
            .iter()
            .filter(|bait| bait.price > 0)
            .filter(|bait| {
                let reserve = bait.price.saturating_mul(u64::from(BAIT_BATCH) * 2);
                state.can_afford(reserve)
            })
            .max_by_key(|bait| bait.rare_bonus)
            .map(|bait| bait.id.clone());
        if state.bait.is_none()
            && let Some(bait_id) = restock
        {
            let events = self.session.dispatch(Intent::BuyBait {
                bait_id,
                quantity: BAIT_BATCH,
            });
            self.absorb(&events, &mut scratch)?;
        }

        let catalog = self.session.catalog();
        let state = self.session.state();
        let deepest = catalog
            .zones
            .iter()
            .filter(|zone| state.is_zone_reachable(catalog, &zone.id))
            .max_by_key(|zone| zone.unlock_level)
            .map(|zone| zone.id.clone());
        if let Some(zone_id) = deepest.filter(|id| *id != state.current_zone) {
            let events = self.session.dispatch(Intent::ChangeZone { zone_id });
            self.absorb(&events, &mut scratch)?;
        }
        Ok(())
    }

    fn next_rod(&self) -> Option<String> {
        let catalog = self.session.catalog();
        let state = self.session.state();
        let current_bonus = catalog.rod(&state.rod_id).map_or(0, |rod| rod.rare_bonus);
        catalog
            .rods
            .iter()
            .filter(|rod| rod.rare_bonus > current_bonus)
            .filter(|rod| rod.unlock_level <= state.level && state.can_afford(rod.price))
            .max_by_key(|rod| rod.rare_bonus)
            .map(|rod| rod.id.clone())
    }

    fn absorb(&mut self, events: &[GameEvent], record: &mut RoundRecord) -> Result<()> {
        for event in events {
            let bytes = serde_json::to_vec(event).context("serializing event")?;
            self.digest.update(&bytes);
            *self.event_counts.entry(event.name()).or_default() += 1;
            match event {
                GameEvent::NoBite { .. } => record.no_bite = true,
                GameEvent::BiteStarted {
                    species_id,
                    rarity,
                    required_hits,
                    ..
                } => {
                    record.species_id = Some(species_id.clone());
                    record.rarity = Some(*rarity);
                    record.required_hits = *required_hits;
                }
                GameEvent::StrikeHit { hits, .. } => record.hits = *hits,
                GameEvent::StrikeMissed { .. } => record.misses += 1,
                GameEvent::CatchResolved { success, hits, .. } => {
                    record.success = *success;
                    record.hits = *hits;
                }
                GameEvent::LevelUp { from, to } => {
                    self.level_ups += to.saturating_sub(*from);
                }
                GameEvent::ZoneUnlocked { zone_id } => self.zones_unlocked.push(zone_id.clone()),
                GameEvent::SaleResult {
                    ok: true,
                    coins_earned,
                    ..
                } => self.coins_earned += coins_earned,
                GameEvent::PurchaseResult { ok: true, .. } => self.purchases += 1,
                GameEvent::PurchaseResult { ok: false, .. }
                | GameEvent::SaleResult { ok: false, .. }
                | GameEvent::ZoneChanged { ok: false, .. }
                | GameEvent::Rejected { .. } => self.refusals += 1,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Run one configured simulation to completion.
///
/// # Errors
///
/// Returns an error when the session cannot be created or an event fails to serialize.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationSummary> {
    let summary = SimulationSession::new(config)?.run()?;
    if summary.rounds.len() != usize::try_from(config.rounds).unwrap_or(usize::MAX) {
        bail!("simulation stopped after {} rounds", summary.rounds.len());
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_policy_lands_starter_fish() {
        let config = SimulationConfig::new(StrikeStrategy::Perfect, 1337).with_rounds(6);
        let summary = run_simulation(&config).expect("simulation runs");
        assert_eq!(summary.rounds.len(), 6);
        assert_eq!(summary.halted(), 0);
        assert_eq!(summary.catches(), 6);
        assert_eq!(summary.final_state.fish_caught, 6);
        assert!(summary.discovery.discovered >= 1);
        assert!((summary.catch_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn idle_policy_never_lands() {
        let config = SimulationConfig::new(StrikeStrategy::Idle, 7).with_rounds(3);
        let summary = run_simulation(&config).expect("simulation runs");
        assert_eq!(summary.catches(), 0);
        assert_eq!(summary.escapes(), 3);
        assert_eq!(summary.final_state.coins, summary.starting_coins);
        assert!(summary.rounds.iter().all(|round| round.strikes == 0));
    }

    #[test]
    fn economy_buys_bait_and_sells() {
        let config = SimulationConfig::new(StrikeStrategy::Perfect, 21)
            .with_rounds(12)
            .with_economy(true);
        let summary = run_simulation(&config).expect("simulation runs");
        assert!(summary.purchases >= 1);
        assert!(summary.coins_earned > 0);
        let state = &summary.final_state;
        assert_eq!(
            state.total_value,
            summary.coins_earned + state.inventory_value()
        );
    }

    #[test]
    fn digest_is_deterministic() {
        let config = SimulationConfig::new(StrikeStrategy::Jittery, 99).with_rounds(4);
        let first = run_simulation(&config).expect("simulation runs");
        let second = run_simulation(&config).expect("simulation runs");
        assert_eq!(first.event_digest, second.event_digest);
        assert_eq!(first.rng_draws, second.rng_draws);
        assert_eq!(first.event_digest.len(), 64);
    }
}
