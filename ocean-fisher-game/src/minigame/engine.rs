use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{
    CatchOutcome, CatchRule, FailureReason, Marker, MinigameError, MinigamePhase, MinigameTuning,
    MinigameVariant,
};
use crate::catalog::FishSpecies;
use crate::constants::TICK_SECONDS;
use crate::numbers::{secs_to_ticks, u32_to_f32};

/// Observable state of an active round after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub position: f32,
    pub direction: f32,
    pub speed: f32,
    pub time_remaining_secs: f32,
    pub hits: u32,
    pub required_hits: u32,
    pub in_strike_zone: bool,
}

/// What a single fixed step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing is running.
    Idle,
    /// Still waiting for the bite.
    Waiting { ticks_remaining: u32 },
    /// The bite delay elapsed; the caller should pick a species.
    BiteReady,
    Moved(TickSnapshot),
    Resolved(CatchOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrikeOutcome {
    Hit { hits: u32, required_hits: u32 },
    Miss { position: f32, speed: f32 },
    Resolved(CatchOutcome),
}

#[derive(Debug, Clone)]
struct ActiveRound {
    species: FishSpecies,
    tuning: MinigameTuning,
    marker: Marker,
    hits: u32,
    ticks_remaining: u32,
    ticks_elapsed: u32,
}

impl ActiveRound {
    fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            position: self.marker.position,
            direction: self.marker.direction,
            speed: self.marker.speed,
            time_remaining_secs: u32_to_f32(self.ticks_remaining) * TICK_SECONDS,
            hits: self.hits,
            required_hits: self.tuning.required_hits,
            in_strike_zone: self.tuning.in_strike_zone(self.marker.position),
        }
    }

    fn into_outcome(self, success: bool) -> CatchOutcome {
        CatchOutcome {
            species: self.species,
            success,
            hits: self.hits,
            required_hits: self.tuning.required_hits,
            ticks_elapsed: self.ticks_elapsed,
            failure: (!success).then_some(FailureReason::Timeout),
        }
    }
}

#[derive(Debug, Clone)]
enum Stage {
    Idle,
    Biting { ticks_remaining: u32 },
    Active(Box<ActiveRound>),
    Resolved { success: bool },
}

/// Fixed-step catch minigame.
///
/// A round is started with [`begin_bite`](Self::begin_bite), promoted with
/// [`activate`](Self::activate) once the bite lands, and resolved either by
/// enough strikes or by the clock. The terminal outcome is handed out once
/// and the round is dropped with it.
#[derive(Debug)]
pub struct CatchMinigame {
    rule: Box<dyn CatchRule>,
    stage: Stage,
}

impl CatchMinigame {
    #[must_use]
    pub fn new(rule: Box<dyn CatchRule>) -> Self {
        Self {
            rule,
            stage: Stage::Idle,
        }
    }

    #[must_use]
    pub fn for_variant(variant: MinigameVariant) -> Self {
        Self::new(variant.create_rule())
    }

    #[must_use]
    pub fn variant(&self) -> MinigameVariant {
        self.rule.variant()
    }

    #[must_use]
    pub const fn phase(&self) -> MinigamePhase {
        match &self.stage {
            Stage::Idle => MinigamePhase::Idle,
            Stage::Biting { .. } => MinigamePhase::Biting,
            Stage::Active(_) => MinigamePhase::Active,
            Stage::Resolved { success: true } => MinigamePhase::Success,
            Stage::Resolved { success: false } => MinigamePhase::Failure,
        }
    }

    /// Snapshot of the running round, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<TickSnapshot> {
        match &self.stage {
            Stage::Active(round) => Some(round.snapshot()),
            _ => None,
        }
    }

    /// Tuning of the running round, if any.
    #[must_use]
    pub fn tuning(&self) -> Option<&MinigameTuning> {
        match &self.stage {
            Stage::Active(round) => Some(&round.tuning),
            _ => None,
        }
    }

    /// Start waiting for a bite `delay_secs` from now.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::SessionAlreadyActive` while a bite or round is pending.
    pub fn begin_bite(&mut self, delay_secs: f32) -> Result<(), MinigameError> {
        if self.phase().is_busy() {
            return Err(MinigameError::SessionAlreadyActive);
        }
        let ticks_remaining = secs_to_ticks(delay_secs, TICK_SECONDS);
        log::debug!("bite scheduled in {delay_secs:.2}s ({ticks_remaining} ticks)");
        self.stage = Stage::Biting { ticks_remaining };
        Ok(())
    }

    /// Enter the active round against `species`.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::NotBiting` unless a bite is pending.
    pub fn activate(&mut self, species: FishSpecies) -> Result<TickSnapshot, MinigameError> {
        if !matches!(self.stage, Stage::Biting { .. }) {
            return Err(MinigameError::NotBiting);
        }
        let tuning = self.rule.tuning(&species);
        let marker = self.rule.spawn_marker(&tuning);
        let ticks_remaining = secs_to_ticks(tuning.time_budget_secs, TICK_SECONDS).max(1);
        log::debug!(
            "{} round against {} needs {} hits in {ticks_remaining} ticks",
            self.rule.variant(),
            species.id,
            tuning.required_hits
        );
        let round = ActiveRound {
            species,
            tuning,
            marker,
            hits: 0,
            ticks_remaining,
            ticks_elapsed: 0,
        };
        let snapshot = round.snapshot();
        self.stage = Stage::Active(Box::new(round));
        Ok(snapshot)
    }

    /// Advance one fixed step.
    pub fn tick(&mut self, rng: &mut dyn RngCore) -> TickOutcome {
        match &mut self.stage {
            Stage::Idle | Stage::Resolved { .. } => TickOutcome::Idle,
            Stage::Biting { ticks_remaining } => {
                *ticks_remaining = ticks_remaining.saturating_sub(1);
                if *ticks_remaining == 0 {
                    TickOutcome::BiteReady
                } else {
                    TickOutcome::Waiting {
                        ticks_remaining: *ticks_remaining,
                    }
                }
            }
            Stage::Active(round) => {
                self.rule.advance(&mut round.marker, &round.tuning, rng);
                round.ticks_elapsed = round.ticks_elapsed.saturating_add(1);
                round.ticks_remaining = round.ticks_remaining.saturating_sub(1);
                if round.ticks_remaining == 0 {
                    TickOutcome::Resolved(self.resolve(false))
                } else {
                    TickOutcome::Moved(round.snapshot())
                }
            }
        }
    }

    /// Strike at the marker's current position.
    ///
    /// # Errors
    ///
    /// Returns `MinigameError::NotActive` outside an active round.
    pub fn strike(&mut self) -> Result<StrikeOutcome, MinigameError> {
        let Stage::Active(round) = &mut self.stage else {
            return Err(MinigameError::NotActive);
        };
        if round.tuning.in_strike_zone(round.marker.position) {
            round.hits = round.hits.saturating_add(1);
            self.rule.on_hit(&mut round.marker, &round.tuning);
            log::debug!(
                "hit {}/{} at {:.1}",
                round.hits,
                round.tuning.required_hits,
                round.marker.position
            );
            if round.hits >= round.tuning.required_hits {
                return Ok(StrikeOutcome::Resolved(self.resolve(true)));
            }
            Ok(StrikeOutcome::Hit {
                hits: round.hits,
                required_hits: round.tuning.required_hits,
            })
        } else {
            self.rule.on_miss(&mut round.marker, &round.tuning);
            log::debug!(
                "miss at {:.1}, speed now {:.2}",
                round.marker.position,
                round.marker.speed
            );
            Ok(StrikeOutcome::Miss {
                position: round.marker.position,
                speed: round.marker.speed,
            })
        }
    }

    /// Drop any pending bite or round and return to idle.
    ///
    /// Returns whether anything was dropped.
    pub fn abandon(&mut self) -> bool {
        let busy = self.phase().is_busy();
        self.stage = Stage::Idle;
        busy
    }

    fn resolve(&mut self, success: bool) -> CatchOutcome {
        let stage = std::mem::replace(&mut self.stage, Stage::Resolved { success });
        let Stage::Active(round) = stage else {
            unreachable!("resolve is only called from an active round");
        };
        let outcome = round.into_outcome(success);
        log::debug!(
            "round against {} resolved: success={success} after {} ticks",
            outcome.species.id,
            outcome.ticks_elapsed
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Rarity, catalog};
    use crate::minigame::{LineCrossingRule, Track};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn species(id: &str) -> FishSpecies {
        catalog().species(id).expect("catalog species").clone()
    }

    fn active_game(id: &str) -> CatchMinigame {
        let mut game = CatchMinigame::new(Box::new(LineCrossingRule));
        game.begin_bite(1.0).expect("idle");
        game.activate(species(id)).expect("biting");
        game
    }

    /// Tick until the marker sits inside the strike window.
    fn tick_into_zone(game: &mut CatchMinigame, rng: &mut SmallRng) {
        for _ in 0..10_000 {
            if game.snapshot().is_some_and(|s| s.in_strike_zone) {
                return;
            }
            match game.tick(rng) {
                TickOutcome::Moved(_) => {}
                other => panic!("round ended early: {other:?}"),
            }
        }
        panic!("marker never reached the strike zone");
    }

    #[test]
    fn bite_counts_down_then_reports_ready() {
        let mut game = CatchMinigame::for_variant(MinigameVariant::LineCrossing);
        let mut rng = SmallRng::seed_from_u64(1);
        game.begin_bite(0.15).expect("idle");
        assert_eq!(game.phase(), MinigamePhase::Biting);
        assert_eq!(game.tick(&mut rng), TickOutcome::Waiting { ticks_remaining: 2 });
        assert_eq!(game.tick(&mut rng), TickOutcome::Waiting { ticks_remaining: 1 });
        assert_eq!(game.tick(&mut rng), TickOutcome::BiteReady);
    }

    #[test]
    fn second_bite_is_rejected() {
        let mut game = CatchMinigame::for_variant(MinigameVariant::LineCrossing);
        game.begin_bite(2.0).expect("idle");
        assert_eq!(
            game.begin_bite(1.0),
            Err(MinigameError::SessionAlreadyActive)
        );
        let mut active = active_game("sardine");
        assert_eq!(
            active.begin_bite(1.0),
            Err(MinigameError::SessionAlreadyActive)
        );
    }

    #[test]
    fn strike_outside_round_is_not_active() {
        let mut game = CatchMinigame::for_variant(MinigameVariant::LineCrossing);
        assert_eq!(game.strike(), Err(MinigameError::NotActive));
        game.begin_bite(1.0).expect("idle");
        assert_eq!(game.strike(), Err(MinigameError::NotActive));
        assert_eq!(
            CatchMinigame::for_variant(MinigameVariant::DriftingTarget)
                .activate(species("sardine")),
            Err(MinigameError::NotBiting)
        );
    }

    #[test]
    fn idle_round_times_out_exactly_once() {
        let mut game = active_game("bass");
        let mut rng = SmallRng::seed_from_u64(5);
        let budget = game.tuning().expect("active").time_budget_secs;
        let expected_ticks = secs_to_ticks(budget, TICK_SECONDS);
        let mut outcome = None;
        let mut ticks = 0;
        while outcome.is_none() {
            ticks += 1;
            if let TickOutcome::Resolved(result) = game.tick(&mut rng) {
                outcome = Some(result);
            }
        }
        let outcome = outcome.expect("resolved");
        assert_eq!(ticks, expected_ticks);
        assert!(!outcome.success);
        assert_eq!(outcome.failure, Some(FailureReason::Timeout));
        assert_eq!(outcome.ticks_elapsed, expected_ticks);
        assert_eq!(game.phase(), MinigamePhase::Failure);
        assert_eq!(game.tick(&mut rng), TickOutcome::Idle);
        assert_eq!(game.strike(), Err(MinigameError::NotActive));
    }

    #[test]
    fn single_hit_lands_a_common_fish() {
        let mut game = active_game("sardine");
        let mut rng = SmallRng::seed_from_u64(9);
        tick_into_zone(&mut game, &mut rng);
        match game.strike().expect("active") {
            StrikeOutcome::Resolved(outcome) => {
                assert!(outcome.success);
                assert_eq!(outcome.hits, 1);
                assert_eq!(outcome.failure, None);
                assert_eq!(outcome.species.rarity, Rarity::Common);
            }
            other => panic!("expected resolution, got {other:?}"),
        }
        assert_eq!(game.phase(), MinigamePhase::Success);
        assert_eq!(game.strike(), Err(MinigameError::NotActive));
        game.begin_bite(1.0).expect("terminal rounds can be replaced");
    }

    /// Tick until the next step would carry the marker out of the window.
    fn tick_to_zone_edge(game: &mut CatchMinigame, rng: &mut SmallRng) {
        let tuning = *game.tuning().expect("active");
        for _ in 0..10_000 {
            let snapshot = game.snapshot().expect("active");
            let next = snapshot.position + snapshot.speed * snapshot.direction;
            if snapshot.in_strike_zone && !tuning.in_strike_zone(next) {
                return;
            }
            assert!(matches!(game.tick(rng), TickOutcome::Moved(_)));
        }
        panic!("marker never reached the window edge");
    }

    #[test]
    fn rare_fish_needs_three_hits() {
        let mut game = active_game("tuna");
        let mut rng = SmallRng::seed_from_u64(13);
        for expected in 1..=2 {
            tick_to_zone_edge(&mut game, &mut rng);
            assert_eq!(
                game.strike().expect("active"),
                StrikeOutcome::Hit {
                    hits: expected,
                    required_hits: 3
                }
            );
        }
        tick_to_zone_edge(&mut game, &mut rng);
        assert!(matches!(
            game.strike().expect("active"),
            StrikeOutcome::Resolved(CatchOutcome {
                success: true,
                hits: 3,
                ..
            })
        ));
    }

    #[test]
    fn repeated_strikes_in_one_step_all_count() {
        let mut game = active_game("bass");
        let mut rng = SmallRng::seed_from_u64(17);
        tick_into_zone(&mut game, &mut rng);
        assert!(matches!(
            game.strike().expect("active"),
            StrikeOutcome::Hit { hits: 1, .. }
        ));
        assert!(matches!(
            game.strike().expect("active"),
            StrikeOutcome::Resolved(CatchOutcome { success: true, .. })
        ));
    }

    #[test]
    fn miss_speeds_marker_up() {
        let mut game = active_game("bass");
        let before = game.snapshot().expect("active");
        assert!(!before.in_strike_zone);
        match game.strike().expect("active") {
            StrikeOutcome::Miss { speed, .. } => assert!(speed > before.speed),
            other => panic!("expected miss, got {other:?}"),
        }
    }

    #[test]
    fn marker_never_leaves_track() {
        let mut game = active_game("dream-fish");
        let mut rng = SmallRng::seed_from_u64(21);
        let track = Track::new(5.0, 95.0);
        while let TickOutcome::Moved(snapshot) = game.tick(&mut rng) {
            assert!(track.contains(snapshot.position));
        }
    }

    #[test]
    fn abandon_returns_to_idle() {
        let mut game = CatchMinigame::for_variant(MinigameVariant::LineCrossing);
        assert!(!game.abandon());
        game.begin_bite(1.0).expect("idle");
        assert!(game.abandon());
        assert_eq!(game.phase(), MinigamePhase::Idle);
    }
}
