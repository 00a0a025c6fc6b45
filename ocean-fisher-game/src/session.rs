//! Intent/event boundary binding the catalog, ledger, RNG and minigame.
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{Catalog, FishSpecies, catalog};
use crate::config::{ConfigError, FishingConfig};
use crate::constants::{TICK_MS, TICK_SECONDS};
use crate::events::{GameEvent, Intent, ItemKind};
use crate::ledger::{CatchId, CaughtFish, Ledger, LedgerError, LedgerEvent, PlayerState};
use crate::logbook::DiscoverySummary;
use crate::minigame::{
    CatchMinigame, CatchOutcome, MinigameError, MinigamePhase, MinigameTuning, StrikeOutcome,
    TickOutcome, TickSnapshot,
};
use crate::numbers::{secs_to_ticks, whole_ticks};
use crate::reward::{compute_catch, roll_size};
use crate::rng::RngBundle;
use crate::selector::{SelectionModifiers, select_from_zone};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FishingError {
    #[error("no fish live in the current zone")]
    EmptyZonePool,
    #[error("a fishing session is already in progress")]
    SessionAlreadyActive,
    #[error("no minigame round is active")]
    NotActive,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<MinigameError> for FishingError {
    fn from(err: MinigameError) -> Self {
        match err {
            MinigameError::SessionAlreadyActive => Self::SessionAlreadyActive,
            MinigameError::NotActive | MinigameError::NotBiting => Self::NotActive,
        }
    }
}

/// Zone and equipment captured when the line went in.
#[derive(Debug, Clone)]
struct CastContext {
    zone_id: String,
    modifiers: SelectionModifiers,
}

/// One player's fishing session.
///
/// All time is driven by the caller through [`Intent::Advance`] and
/// [`Intent::Strike`]; the session never reads a wall clock.
#[derive(Debug)]
pub struct FishingSession {
    catalog: Arc<Catalog>,
    config: FishingConfig,
    ledger: Ledger,
    rng: RngBundle,
    minigame: CatchMinigame,
    cast: Option<CastContext>,
    clock_ms: u64,
}

impl FishingSession {
    /// Build a session over `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` does not validate against the catalog.
    pub fn new(
        catalog: Arc<Catalog>,
        config: FishingConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate(&catalog)?;
        Ok(Self {
            ledger: Ledger::new(&config),
            rng: RngBundle::from_user_seed(seed),
            minigame: CatchMinigame::for_variant(config.variant),
            catalog,
            config,
            cast: None,
            clock_ms: 0,
        })
    }

    /// Session over the embedded catalog with default configuration.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let config = FishingConfig::default();
        Self {
            ledger: Ledger::new(&config),
            rng: RngBundle::from_user_seed(seed),
            minigame: CatchMinigame::for_variant(config.variant),
            catalog: Arc::new(catalog().clone()),
            config,
            cast: None,
            clock_ms: 0,
        }
    }

    /// Resume from an existing player state.
    ///
    /// The clock restarts one tick past the latest catch in the inventory so
    /// new catch ids never collide with held fish.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` does not validate against the catalog.
    pub fn from_state(
        catalog: Arc<Catalog>,
        config: FishingConfig,
        state: PlayerState,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let mut session = Self::new(catalog, config, seed)?;
        session.clock_ms = state
            .inventory
            .iter()
            .map(|fish| fish.caught_at_ms.saturating_add(TICK_MS))
            .max()
            .unwrap_or(0);
        session.ledger = Ledger::from_state(state);
        Ok(session)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &FishingConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        self.ledger.state()
    }

    #[must_use]
    pub const fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.total_draws()
    }

    #[must_use]
    pub const fn phase(&self) -> MinigamePhase {
        self.minigame.phase()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<TickSnapshot> {
        self.minigame.snapshot()
    }

    #[must_use]
    pub fn tuning(&self) -> Option<&MinigameTuning> {
        self.minigame.tuning()
    }

    #[must_use]
    pub fn discovery_summary(&self) -> DiscoverySummary {
        self.ledger.discovery_summary(&self.catalog)
    }

    #[must_use]
    pub fn into_state(self) -> PlayerState {
        self.ledger.into_state()
    }

    /// Apply one intent.
    ///
    /// # Errors
    ///
    /// Returns `FishingError` when the intent is refused; nothing is emitted then.
    pub fn handle(&mut self, intent: Intent) -> Result<Vec<GameEvent>, FishingError> {
        match intent {
            Intent::Cast => self.cast(),
            Intent::Strike { at_ms } => self.strike(at_ms),
            Intent::Advance { to_ms } => Ok(self.advance_to(to_ms)),
            Intent::Sell { selection } => self.sell(&selection),
            Intent::SellAll => {
                let selection: Vec<CatchId> =
                    self.state().inventory.iter().map(CaughtFish::id).collect();
                self.sell(&selection)
            }
            Intent::BuyRod { rod_id } => self.buy_rod(&rod_id),
            Intent::BuyBait { bait_id, quantity } => self.buy_bait(&bait_id, quantity),
            Intent::ChangeZone { zone_id } => self.change_zone(&zone_id),
        }
    }

    /// Apply one intent, turning a refusal into a result event.
    pub fn dispatch(&mut self, intent: Intent) -> Vec<GameEvent> {
        let refused = intent.clone();
        match self.handle(intent) {
            Ok(events) => events,
            Err(err) => {
                log::debug!("intent {refused:?} refused: {err}");
                vec![self.refusal_event(refused, &err)]
            }
        }
    }

    fn cast(&mut self) -> Result<Vec<GameEvent>, FishingError> {
        if self.minigame.phase().is_busy() {
            return Err(FishingError::SessionAlreadyActive);
        }
        let state = self.ledger.state();
        let zone_id = state.current_zone.clone();
        let rod = self
            .catalog
            .rod(&state.rod_id)
            .ok_or_else(|| LedgerError::UnknownItem(state.rod_id.clone()))?;

        let bait = self.ledger.consume_bait(&self.catalog);
        let modifiers = SelectionModifiers::from_equipment(rod, bait);
        let bait_id = bait.map(|bait| bait.id.clone());

        let delay_secs = self
            .rng
            .bite()
            .gen_range(self.config.bite_delay_min_secs..=self.config.bite_delay_max_secs);
        self.minigame.begin_bite(delay_secs)?;
        let bite_in_ms = u64::from(secs_to_ticks(delay_secs, TICK_SECONDS)) * TICK_MS;
        log::debug!(
            "cast into {zone_id} at {}ms (bait {bait_id:?}, bite in {bite_in_ms}ms)",
            self.clock_ms
        );
        self.cast = Some(CastContext {
            zone_id: zone_id.clone(),
            modifiers,
        });
        Ok(vec![GameEvent::LineCast {
            at_ms: self.clock_ms,
            zone_id,
            bait_id,
            bite_in_ms,
        }])
    }

    fn strike(&mut self, at_ms: u64) -> Result<Vec<GameEvent>, FishingError> {
        if self.minigame.phase() != MinigamePhase::Active {
            return Err(FishingError::NotActive);
        }
        let mut events = self.advance_to(at_ms);
        if self.minigame.phase() != MinigamePhase::Active {
            // the round ended before the strike landed
            return Ok(events);
        }
        match self.minigame.strike()? {
            StrikeOutcome::Hit {
                hits,
                required_hits,
            } => events.push(GameEvent::StrikeHit {
                at_ms: self.clock_ms,
                hits,
                required_hits,
            }),
            StrikeOutcome::Miss { position, speed } => events.push(GameEvent::StrikeMissed {
                at_ms: self.clock_ms,
                position,
                speed,
            }),
            StrikeOutcome::Resolved(outcome) => {
                events.push(GameEvent::StrikeHit {
                    at_ms: self.clock_ms,
                    hits: outcome.hits,
                    required_hits: outcome.required_hits,
                });
                self.resolve(outcome, &mut events);
            }
        }
        Ok(events)
    }

    /// Run every whole tick between the clock and `to_ms`.
    fn advance_to(&mut self, to_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut remaining = whole_ticks(to_ms.saturating_sub(self.clock_ms), TICK_MS);
        while remaining > 0 {
            if !self.minigame.phase().is_busy() {
                self.clock_ms = self.clock_ms.saturating_add(remaining * TICK_MS);
                break;
            }
            self.clock_ms = self.clock_ms.saturating_add(TICK_MS);
            remaining -= 1;
            self.step(&mut events);
        }
        events
    }

    fn step(&mut self, events: &mut Vec<GameEvent>) {
        match self.minigame.tick(self.rng.motion()) {
            TickOutcome::Idle | TickOutcome::Waiting { .. } => {}
            TickOutcome::BiteReady => self.on_bite(events),
            TickOutcome::Moved(snapshot) => events.push(GameEvent::MinigameTick {
                at_ms: self.clock_ms,
                snapshot,
            }),
            TickOutcome::Resolved(outcome) => self.resolve(outcome, events),
        }
    }

    fn on_bite(&mut self, events: &mut Vec<GameEvent>) {
        let cast = self.cast.take().unwrap_or_else(|| CastContext {
            zone_id: self.ledger.state().current_zone.clone(),
            modifiers: SelectionModifiers::default(),
        });
        let species = match self.draw_species(&cast) {
            Ok(species) => species,
            Err(err) => {
                log::warn!("{err}: `{}`", cast.zone_id);
                self.minigame.abandon();
                events.push(GameEvent::NoBite {
                    at_ms: self.clock_ms,
                    zone_id: cast.zone_id,
                });
                return;
            }
        };
        let species_id = species.id.clone();
        let rarity = species.rarity;
        if let Err(err) = self.minigame.activate(species) {
            log::warn!("bite on {species_id} could not start a round: {err}");
            return;
        }
        let (required_hits, time_budget_secs) = self
            .minigame
            .tuning()
            .map_or((0, 0.0), |tuning| {
                (tuning.required_hits, tuning.time_budget_secs)
            });
        log::debug!("{species_id} ({rarity}) bit at {}ms", self.clock_ms);
        events.push(GameEvent::BiteStarted {
            at_ms: self.clock_ms,
            species_id,
            rarity,
            required_hits,
            time_budget_secs,
        });
    }

    fn draw_species(&mut self, cast: &CastContext) -> Result<FishSpecies, FishingError> {
        select_from_zone(
            &self.catalog,
            &cast.zone_id,
            cast.modifiers,
            self.rng.selection(),
        )
        .cloned()
        .ok_or(FishingError::EmptyZonePool)
    }

    fn resolve(&mut self, outcome: CatchOutcome, events: &mut Vec<GameEvent>) {
        let at_ms = self.clock_ms;
        if !outcome.success {
            log::info!(
                "{} got away after {} ticks ({}/{} hits)",
                outcome.species.name,
                outcome.ticks_elapsed,
                outcome.hits,
                outcome.required_hits
            );
            events.push(GameEvent::CatchResolved {
                at_ms,
                species_id: outcome.species.id,
                success: false,
                hits: outcome.hits,
                required_hits: outcome.required_hits,
                fish: None,
            });
            return;
        }

        let species = outcome.species;
        let size = roll_size(&species, self.rng.size());
        let fish = CaughtFish::new(&species, compute_catch(&species, size), at_ms);
        log::info!(
            "caught {} {} ({size:.1}, {} coins)",
            species.rarity,
            species.name,
            fish.sell_value
        );
        let ledger_events = self.ledger.apply_catch(&self.catalog, fish.clone());
        events.push(GameEvent::CatchResolved {
            at_ms,
            species_id: species.id,
            success: true,
            hits: outcome.hits,
            required_hits: outcome.required_hits,
            fish: Some(fish),
        });
        for event in ledger_events {
            match event {
                LedgerEvent::LevelUp { from, to } => events.push(GameEvent::LevelUp { from, to }),
                LedgerEvent::ZoneUnlocked { zone_id } => {
                    events.push(GameEvent::ZoneUnlocked { zone_id });
                }
                _ => {}
            }
        }
    }

    fn sell(&mut self, selection: &[CatchId]) -> Result<Vec<GameEvent>, FishingError> {
        let events = self.ledger.sell(selection)?;
        Ok(events
            .into_iter()
            .filter_map(|event| match event {
                LedgerEvent::SaleCompleted { sold, coins_earned } => Some(GameEvent::SaleResult {
                    sold,
                    coins_earned,
                    ok: true,
                    coins: self.ledger.state().coins,
                    reason: None,
                }),
                _ => None,
            })
            .collect())
    }

    fn buy_rod(&mut self, rod_id: &str) -> Result<Vec<GameEvent>, FishingError> {
        let events = self.ledger.purchase_rod(&self.catalog, rod_id)?;
        Ok(self.purchase_events(events))
    }

    fn buy_bait(&mut self, bait_id: &str, quantity: u32) -> Result<Vec<GameEvent>, FishingError> {
        let events = self.ledger.purchase_bait(&self.catalog, bait_id, quantity)?;
        Ok(self.purchase_events(events))
    }

    fn purchase_events(&self, events: impl IntoIterator<Item = LedgerEvent>) -> Vec<GameEvent> {
        let coins = self.ledger.state().coins;
        events
            .into_iter()
            .filter_map(|event| match event {
                LedgerEvent::RodPurchased { rod_id, price } => Some(GameEvent::PurchaseResult {
                    kind: ItemKind::Rod,
                    item_id: rod_id,
                    quantity: 1,
                    ok: true,
                    cost: price,
                    coins,
                    reason: None,
                }),
                LedgerEvent::BaitPurchased {
                    bait_id,
                    quantity,
                    cost,
                } => Some(GameEvent::PurchaseResult {
                    kind: ItemKind::Bait,
                    item_id: bait_id,
                    quantity,
                    ok: true,
                    cost,
                    coins,
                    reason: None,
                }),
                _ => None,
            })
            .collect()
    }

    fn change_zone(&mut self, zone_id: &str) -> Result<Vec<GameEvent>, FishingError> {
        let events = self.ledger.change_zone(&self.catalog, zone_id)?;
        Ok(events
            .into_iter()
            .filter_map(|event| match event {
                LedgerEvent::ZoneChanged { zone_id } => Some(GameEvent::ZoneChanged {
                    zone_id,
                    ok: true,
                    reason: None,
                }),
                _ => None,
            })
            .collect())
    }

    fn refusal_event(&self, intent: Intent, err: &FishingError) -> GameEvent {
        let reason = Some(err.to_string());
        let coins = self.ledger.state().coins;
        match intent {
            Intent::BuyRod { rod_id } => GameEvent::PurchaseResult {
                kind: ItemKind::Rod,
                item_id: rod_id,
                quantity: 1,
                ok: false,
                cost: 0,
                coins,
                reason,
            },
            Intent::BuyBait { bait_id, quantity } => GameEvent::PurchaseResult {
                kind: ItemKind::Bait,
                item_id: bait_id,
                quantity,
                ok: false,
                cost: 0,
                coins,
                reason,
            },
            Intent::ChangeZone { zone_id } => GameEvent::ZoneChanged {
                zone_id,
                ok: false,
                reason,
            },
            Intent::Sell { .. } | Intent::SellAll => GameEvent::SaleResult {
                sold: 0,
                coins_earned: 0,
                ok: false,
                coins,
                reason,
            },
            Intent::Cast | Intent::Strike { .. } | Intent::Advance { .. } => GameEvent::Rejected {
                reason: err.to_string(),
            },
        }
    }
}
