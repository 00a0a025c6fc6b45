//! Centralized balance and tuning constants for Ocean Fisher game logic.
//!
//! These values define the deterministic math for catch resolution. Keeping
//! them together means gameplay can only be adjusted via reviewed code
//! changes, never through the catalog JSON.

// Selection weights --------------------------------------------------------
pub(crate) const WEIGHT_COMMON: f64 = 50.0;
pub(crate) const WEIGHT_UNCOMMON: f64 = 25.0;
pub(crate) const WEIGHT_RARE: f64 = 15.0;
pub(crate) const WEIGHT_EPIC: f64 = 7.0;
pub(crate) const WEIGHT_LEGENDARY: f64 = 2.5;
pub(crate) const WEIGHT_MYTHICAL: f64 = 0.5;

// Experience rewards ------------------------------------------------------
pub(crate) const XP_COMMON: u64 = 10;
pub(crate) const XP_UNCOMMON: u64 = 25;
pub(crate) const XP_RARE: u64 = 50;
pub(crate) const XP_EPIC: u64 = 100;
pub(crate) const XP_LEGENDARY: u64 = 200;
pub(crate) const XP_MYTHICAL: u64 = 500;
pub(crate) const XP_PER_LEVEL: u64 = 100;

// Session timing ----------------------------------------------------------
/// Length of one fixed simulation step in seconds.
pub const TICK_SECONDS: f32 = 0.05;
pub(crate) const TICK_MS: u64 = 50;
pub(crate) const BITE_DELAY_MIN_SECS: f32 = 1.0;
pub(crate) const BITE_DELAY_MAX_SECS: f32 = 4.0;

// Difficulty scaling ------------------------------------------------------
pub(crate) const DIFFICULTY_SPEED_DIVISOR: f32 = 10.0;
pub(crate) const DIFFICULTY_TIME_DIVISOR: f32 = 4.0;

// Line-crossing minigame --------------------------------------------------
pub(crate) const LINE_TRACK_MIN: f32 = 5.0;
pub(crate) const LINE_TRACK_MAX: f32 = 95.0;
pub(crate) const LINE_STRIKE_POSITION: f32 = 75.0;
pub(crate) const LINE_STRIKE_TOLERANCE: f32 = 8.0;
pub(crate) const LINE_BASE_SPEED: f32 = 0.8;
pub(crate) const LINE_BASE_TIME_SECS: f32 = 8.0;
pub(crate) const LINE_TIME_FLOOR_SECS: f32 = 4.0;

// Drifting-target minigame ------------------------------------------------
pub(crate) const DRIFT_TRACK_MIN: f32 = 0.0;
pub(crate) const DRIFT_TRACK_MAX: f32 = 100.0;
pub(crate) const DRIFT_STRIKE_POSITION: f32 = 50.0;
pub(crate) const DRIFT_STRIKE_TOLERANCE: f32 = 10.0;
pub(crate) const DRIFT_BASE_SPEED: f32 = 1.0;
pub(crate) const DRIFT_BASE_TIME_SECS: f32 = 10.0;
pub(crate) const DRIFT_TIME_FLOOR_SECS: f32 = 5.0;
pub(crate) const DRIFT_RETARGET_MIN_SECS: f32 = 0.3;
pub(crate) const DRIFT_RETARGET_SPAN_SECS: f32 = 1.2;

// Shared feedback ---------------------------------------------------------
pub(crate) const HIT_SLOWDOWN_FACTOR: f32 = 0.8;
pub(crate) const MISS_SPEEDUP_FACTOR: f32 = 1.1;
pub(crate) const MAX_MARKER_SPEED: f32 = 3.0;

// Player defaults ---------------------------------------------------------
pub(crate) const STARTING_COINS: u64 = 100;
pub(crate) const STARTING_ROD: &str = "wooden";
pub(crate) const STARTING_ZONE: &str = "starter-dock";
