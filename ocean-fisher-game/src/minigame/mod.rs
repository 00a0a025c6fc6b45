//! Timed reflex minigame that decides whether a biting fish is landed.
//!
//! The engine is an explicit state machine (`Idle -> Biting -> Active ->
//! Success | Failure`) advanced by fixed ticks. How the marker moves and how
//! strikes feed back into it is delegated to a [`CatchRule`], so alternative
//! minigames can share the same contract.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::catalog::FishSpecies;

pub mod engine;
pub mod rules;

pub use engine::{CatchMinigame, StrikeOutcome, TickOutcome, TickSnapshot};
pub use rules::{CatchRule, DriftingTargetRule, LineCrossingRule};

/// Bounded one-dimensional track the marker travels on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub min: f32,
    pub max: f32,
}

impl Track {
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, position: f32) -> bool {
        (self.min..=self.max).contains(&position)
    }

    #[must_use]
    pub fn center(&self) -> f32 {
        (self.min + self.max) / 2.0
    }
}

/// Erratic-motion parameters used by drifting rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftTuning {
    pub retarget_min_secs: f32,
    pub retarget_max_secs: f32,
}

/// Per-species parameters derived by a rule when a round starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinigameTuning {
    pub track: Track,
    pub start_position: f32,
    pub strike_position: f32,
    pub tolerance: f32,
    /// Track units travelled per tick.
    pub initial_speed: f32,
    pub max_speed: f32,
    pub hit_slowdown: f32,
    pub miss_speedup: f32,
    pub required_hits: u32,
    pub time_budget_secs: f32,
    #[serde(default)]
    pub drift: Option<DriftTuning>,
}

impl MinigameTuning {
    /// Whether a marker at `position` lies inside the strike window.
    #[must_use]
    pub fn in_strike_zone(&self, position: f32) -> bool {
        (position - self.strike_position).abs() <= self.tolerance
    }
}

/// Moving marker state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: f32,
    pub speed: f32,
    /// `1.0` moving towards `track.max`, `-1.0` towards `track.min`.
    pub direction: f32,
    /// Point a drifting marker is swimming towards.
    pub target: f32,
    /// Seconds until a drifting marker picks a new target.
    pub retarget_in: f32,
}

impl Marker {
    #[must_use]
    pub const fn spawn(tuning: &MinigameTuning) -> Self {
        Self {
            position: tuning.start_position,
            speed: tuning.initial_speed,
            direction: 1.0,
            target: tuning.start_position,
            retarget_in: 0.0,
        }
    }

    /// Move one step and reflect off the track bounds.
    pub fn step(&mut self, track: Track) {
        let next = self.position + self.speed * self.direction;
        if next >= track.max {
            self.position = track.max;
            self.direction = -1.0;
        } else if next <= track.min {
            self.position = track.min;
            self.direction = 1.0;
        } else {
            self.position = next;
        }
    }

    pub fn reverse(&mut self) {
        self.direction = -self.direction;
    }
}

/// Public view of the engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinigamePhase {
    Idle,
    Biting,
    Active,
    Success,
    Failure,
}

impl MinigamePhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// A bite is pending or a round is running.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Biting | Self::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The clock ran out before enough hits landed.
    Timeout,
}

/// Terminal result of a round, produced exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchOutcome {
    pub species: FishSpecies,
    pub success: bool,
    pub hits: u32,
    pub required_hits: u32,
    pub ticks_elapsed: u32,
    pub failure: Option<FailureReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MinigameError {
    #[error("a fishing session is already in progress")]
    SessionAlreadyActive,
    #[error("no minigame round is active")]
    NotActive,
    #[error("no bite is pending")]
    NotBiting,
}

/// Selectable minigame rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinigameVariant {
    /// Multi-hit: strike while the fish crosses a fixed line.
    #[default]
    LineCrossing,
    /// Strike while an erratically drifting fish passes the hook.
    DriftingTarget,
}

impl MinigameVariant {
    pub const ALL: [Self; 2] = [Self::LineCrossing, Self::DriftingTarget];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LineCrossing => "line-crossing",
            Self::DriftingTarget => "drifting-target",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.label().eq_ignore_ascii_case(value.trim()))
    }

    #[must_use]
    pub fn create_rule(self) -> Box<dyn CatchRule> {
        match self {
            Self::LineCrossing => Box::new(LineCrossingRule),
            Self::DriftingTarget => Box::new(DriftingTargetRule),
        }
    }
}

impl fmt::Display for MinigameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
