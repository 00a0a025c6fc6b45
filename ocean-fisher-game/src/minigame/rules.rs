//! Motion and feedback rules plugged into the minigame engine.
use rand::{Rng, RngCore};
use std::fmt;

use super::{DriftTuning, Marker, MinigameTuning, MinigameVariant, Track};
use crate::catalog::FishSpecies;
use crate::constants::{
    DIFFICULTY_SPEED_DIVISOR, DIFFICULTY_TIME_DIVISOR, DRIFT_BASE_SPEED, DRIFT_BASE_TIME_SECS,
    DRIFT_RETARGET_MIN_SECS, DRIFT_RETARGET_SPAN_SECS, DRIFT_STRIKE_POSITION,
    DRIFT_STRIKE_TOLERANCE, DRIFT_TIME_FLOOR_SECS, DRIFT_TRACK_MAX, DRIFT_TRACK_MIN,
    HIT_SLOWDOWN_FACTOR, LINE_BASE_SPEED, LINE_BASE_TIME_SECS, LINE_STRIKE_POSITION,
    LINE_STRIKE_TOLERANCE, LINE_TIME_FLOOR_SECS, LINE_TRACK_MAX, LINE_TRACK_MIN,
    MAX_MARKER_SPEED, MISS_SPEEDUP_FACTOR, TICK_SECONDS,
};

/// Difficulty beyond which drifting fish stop retargeting any faster.
const DRIFT_DIFFICULTY_CAP: f32 = 20.0;

/// Strategy behind the minigame state machine.
///
/// Rules derive per-species tuning and move the marker; the engine owns
/// phases, hit counting and the clock.
pub trait CatchRule: fmt::Debug + Send + Sync {
    fn variant(&self) -> MinigameVariant;

    /// Parameters for a round against `species`.
    fn tuning(&self, species: &FishSpecies) -> MinigameTuning;

    /// Initial marker for a round.
    fn spawn_marker(&self, tuning: &MinigameTuning) -> Marker {
        Marker::spawn(tuning)
    }

    /// Advance the marker by one tick.
    fn advance(&self, marker: &mut Marker, tuning: &MinigameTuning, rng: &mut dyn RngCore);

    /// Feedback after a strike inside the window.
    fn on_hit(&self, marker: &mut Marker, tuning: &MinigameTuning) {
        marker.speed *= tuning.hit_slowdown;
    }

    /// Feedback after a strike outside the window.
    fn on_miss(&self, marker: &mut Marker, tuning: &MinigameTuning) {
        marker.speed = (marker.speed * tuning.miss_speedup).min(tuning.max_speed);
    }
}

/// Time budget shrinking with difficulty down to a floor.
fn time_budget(base: f32, floor: f32, difficulty: f32) -> f32 {
    (base - difficulty / DIFFICULTY_TIME_DIVISOR).max(floor)
}

fn difficulty_speed(base: f32, difficulty: f32) -> f32 {
    base * (1.0 + difficulty / DIFFICULTY_SPEED_DIVISOR)
}

/// The fish swims back and forth and the angler strikes as it crosses the line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCrossingRule;

impl CatchRule for LineCrossingRule {
    fn variant(&self) -> MinigameVariant {
        MinigameVariant::LineCrossing
    }

    fn tuning(&self, species: &FishSpecies) -> MinigameTuning {
        let difficulty = species.catch_difficulty.max(0.0);
        MinigameTuning {
            track: Track::new(LINE_TRACK_MIN, LINE_TRACK_MAX),
            start_position: LINE_TRACK_MIN,
            strike_position: LINE_STRIKE_POSITION,
            tolerance: LINE_STRIKE_TOLERANCE,
            initial_speed: difficulty_speed(LINE_BASE_SPEED, difficulty),
            max_speed: MAX_MARKER_SPEED,
            hit_slowdown: HIT_SLOWDOWN_FACTOR,
            miss_speedup: MISS_SPEEDUP_FACTOR,
            required_hits: species.rarity.required_hits(),
            time_budget_secs: time_budget(LINE_BASE_TIME_SECS, LINE_TIME_FLOOR_SECS, difficulty),
            drift: None,
        }
    }

    fn advance(&self, marker: &mut Marker, tuning: &MinigameTuning, _rng: &mut dyn RngCore) {
        marker.step(tuning.track);
    }

    fn on_hit(&self, marker: &mut Marker, tuning: &MinigameTuning) {
        marker.speed *= tuning.hit_slowdown;
        marker.reverse();
    }
}

/// The fish wanders between random targets and the angler strikes as it
/// passes the hook.
///
/// Harder fish pick new targets more often.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftingTargetRule;

impl CatchRule for DriftingTargetRule {
    fn variant(&self) -> MinigameVariant {
        MinigameVariant::DriftingTarget
    }

    fn tuning(&self, species: &FishSpecies) -> MinigameTuning {
        let difficulty = species.catch_difficulty.max(0.0);
        let calm = 1.0 - difficulty.min(DRIFT_DIFFICULTY_CAP) / DRIFT_DIFFICULTY_CAP;
        let retarget_min_secs = DRIFT_RETARGET_MIN_SECS + calm * DRIFT_RETARGET_MIN_SECS * 2.0;
        MinigameTuning {
            track: Track::new(DRIFT_TRACK_MIN, DRIFT_TRACK_MAX),
            start_position: DRIFT_TRACK_MIN,
            strike_position: DRIFT_STRIKE_POSITION,
            tolerance: DRIFT_STRIKE_TOLERANCE,
            initial_speed: difficulty_speed(DRIFT_BASE_SPEED, difficulty),
            max_speed: MAX_MARKER_SPEED,
            hit_slowdown: HIT_SLOWDOWN_FACTOR,
            miss_speedup: MISS_SPEEDUP_FACTOR,
            required_hits: species.rarity.required_hits(),
            time_budget_secs: time_budget(DRIFT_BASE_TIME_SECS, DRIFT_TIME_FLOOR_SECS, difficulty),
            drift: Some(DriftTuning {
                retarget_min_secs,
                retarget_max_secs: retarget_min_secs + DRIFT_RETARGET_SPAN_SECS,
            }),
        }
    }

    fn advance(&self, marker: &mut Marker, tuning: &MinigameTuning, rng: &mut dyn RngCore) {
        let Some(drift) = tuning.drift else {
            marker.step(tuning.track);
            return;
        };
        marker.retarget_in -= TICK_SECONDS;
        let arrived = (marker.target - marker.position).abs() <= marker.speed;
        if marker.retarget_in <= 0.0 || arrived {
            marker.target = rng.gen_range(tuning.track.min..=tuning.track.max);
            marker.retarget_in = if drift.retarget_max_secs > drift.retarget_min_secs {
                rng.gen_range(drift.retarget_min_secs..drift.retarget_max_secs)
            } else {
                drift.retarget_min_secs
            };
        }
        marker.direction = if marker.target >= marker.position {
            1.0
        } else {
            -1.0
        };
        let next = marker.position + marker.speed * marker.direction;
        let next = if marker.direction > 0.0 {
            next.min(marker.target)
        } else {
            next.max(marker.target)
        };
        marker.position = next.clamp(tuning.track.min, tuning.track.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Rarity, catalog};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn species_with(rarity: Rarity, difficulty: f32) -> FishSpecies {
        FishSpecies {
            id: String::from("test-fish"),
            name: String::from("Test Fish"),
            rarity,
            base_value: 10,
            min_size: 1.0,
            max_size: 2.0,
            catch_difficulty: difficulty,
            zone: String::from("starter-dock"),
            description: String::new(),
        }
    }

    #[test]
    fn line_crossing_tuning_matches_difficulty() {
        let tuning = LineCrossingRule.tuning(&species_with(Rarity::Common, 1.0));
        assert!((tuning.initial_speed - 0.88).abs() < 1e-6);
        assert!((tuning.time_budget_secs - 7.75).abs() < 1e-6);
        assert_eq!(tuning.required_hits, 1);
        assert!((tuning.start_position - LINE_TRACK_MIN).abs() < f32::EPSILON);
    }

    #[test]
    fn drifting_tuning_scales_like_line_crossing() {
        let tuning = DriftingTargetRule.tuning(&species_with(Rarity::Common, 2.0));
        assert!((tuning.initial_speed - 1.2).abs() < 1e-6);
        assert!((tuning.time_budget_secs - 9.5).abs() < 1e-6);
        let floor = DriftingTargetRule
            .tuning(&species_with(Rarity::Common, 30.0))
            .time_budget_secs;
        assert!((floor - DRIFT_TIME_FLOOR_SECS).abs() < f32::EPSILON);
    }

    #[test]
    fn required_hits_scale_with_rarity() {
        let hits: Vec<u32> = Rarity::ALL
            .iter()
            .map(|rarity| LineCrossingRule.tuning(&species_with(*rarity, 1.0)).required_hits)
            .collect();
        assert_eq!(hits, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn time_budget_shrinks_until_floor() {
        for rule in [
            MinigameVariant::LineCrossing.create_rule(),
            MinigameVariant::DriftingTarget.create_rule(),
        ] {
            let floor = rule
                .tuning(&species_with(Rarity::Common, 1_000.0))
                .time_budget_secs;
            let mut previous = f32::INFINITY;
            for difficulty in 0..=40 {
                #[allow(clippy::cast_precision_loss)]
                let budget = rule
                    .tuning(&species_with(Rarity::Common, difficulty as f32))
                    .time_budget_secs;
                assert!(budget >= floor);
                if budget > floor {
                    assert!(budget < previous, "{:?} not decreasing", rule.variant());
                }
                previous = budget;
            }
        }
        let floor = LineCrossingRule
            .tuning(&species_with(Rarity::Mythical, 20.0))
            .time_budget_secs;
        assert!((floor - LINE_TIME_FLOOR_SECS).abs() < f32::EPSILON);
    }

    #[test]
    fn harder_fish_move_faster() {
        let slow = LineCrossingRule.tuning(&species_with(Rarity::Rare, 2.0));
        let fast = LineCrossingRule.tuning(&species_with(Rarity::Rare, 12.0));
        assert!(fast.initial_speed > slow.initial_speed);
    }

    #[test]
    fn line_hit_slows_and_reverses() {
        let tuning = LineCrossingRule.tuning(&species_with(Rarity::Rare, 5.0));
        let mut marker = LineCrossingRule.spawn_marker(&tuning);
        let before = marker.speed;
        LineCrossingRule.on_hit(&mut marker, &tuning);
        assert!((marker.speed - before * HIT_SLOWDOWN_FACTOR).abs() < 1e-6);
        assert!((marker.direction + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn misses_speed_up_to_cap() {
        let tuning = LineCrossingRule.tuning(&species_with(Rarity::Epic, 9.0));
        let mut marker = LineCrossingRule.spawn_marker(&tuning);
        for _ in 0..100 {
            LineCrossingRule.on_miss(&mut marker, &tuning);
        }
        assert!((marker.speed - MAX_MARKER_SPEED).abs() < f32::EPSILON);
    }

    #[test]
    fn drifting_marker_stays_on_track() {
        let species = catalog().species("dream-fish").expect("dream fish").clone();
        let tuning = DriftingTargetRule.tuning(&species);
        let mut marker = DriftingTargetRule.spawn_marker(&tuning);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut saw_left_turn = false;
        for _ in 0..2_000 {
            let before = marker.direction;
            DriftingTargetRule.advance(&mut marker, &tuning, &mut rng);
            assert!(tuning.track.contains(marker.position));
            saw_left_turn |= before > 0.0 && marker.direction < 0.0;
        }
        assert!(saw_left_turn);
    }

    #[test]
    fn drifting_fish_usually_pass_the_hook_in_time() {
        let tuning = DriftingTargetRule.tuning(&species_with(Rarity::Common, 1.0));
        let budget_ticks = crate::numbers::secs_to_ticks(tuning.time_budget_secs, TICK_SECONDS);
        let reached = (0..50_u64)
            .filter(|seed| {
                let mut rng = SmallRng::seed_from_u64(*seed);
                let mut marker = DriftingTargetRule.spawn_marker(&tuning);
                (0..budget_ticks).any(|_| {
                    DriftingTargetRule.advance(&mut marker, &tuning, &mut rng);
                    tuning.in_strike_zone(marker.position)
                })
            })
            .count();
        assert!(reached >= 45, "only {reached} of 50 drifts reached the hook");
    }

    #[test]
    fn harder_drifters_retarget_sooner() {
        let calm = DriftingTargetRule.tuning(&species_with(Rarity::Common, 1.0));
        let wild = DriftingTargetRule.tuning(&species_with(Rarity::Common, 18.0));
        let calm_drift = calm.drift.expect("drift tuning");
        let wild_drift = wild.drift.expect("drift tuning");
        assert!(wild_drift.retarget_min_secs < calm_drift.retarget_min_secs);
    }
}
