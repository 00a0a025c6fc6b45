use std::fmt;

use ocean_fisher_game::TickSnapshot;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// What an automated angler does on the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeDecision {
    Strike,
    Wait,
}

/// Policy interface for automated strike strategies.
pub trait StrikePolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Decide on one step of an active round. May be asked again within the
    /// same step after a strike lands.
    fn decide(&mut self, snapshot: &TickSnapshot) -> StrikeDecision;

    /// Forget per-round memory before the next cast.
    fn reset(&mut self) {}
}

/// Built-in strike strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrikeStrategy {
    Perfect,
    Patient,
    Jittery,
    Idle,
}

impl StrikeStrategy {
    pub const ALL: [Self; 4] = [Self::Perfect, Self::Patient, Self::Jittery, Self::Idle];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Patient => "Patient",
            Self::Jittery => "Jittery",
            Self::Idle => "Idle",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn StrikePolicy + Send> {
        match self {
            Self::Perfect => Box::new(PerfectPolicy),
            Self::Patient => Box::new(PatientPolicy::default()),
            Self::Jittery => Box::new(JitteryPolicy::new(seed)),
            Self::Idle => Box::new(IdlePolicy),
        }
    }
}

impl fmt::Display for StrikeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strikes every time it is asked while the fish is in the window.
struct PerfectPolicy;

/// One strike per pass through the window.
#[derive(Default)]
struct PatientPolicy {
    was_in_zone: bool,
}

/// Human-ish reflexes: usually strikes in the window, sometimes panics outside it.
struct JitteryPolicy {
    rng: ChaCha20Rng,
    reflex: f64,
    panic: f64,
}

struct IdlePolicy;

impl JitteryPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            reflex: 0.6,
            panic: 0.03,
        }
    }
}

impl StrikePolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn decide(&mut self, snapshot: &TickSnapshot) -> StrikeDecision {
        if snapshot.in_strike_zone {
            StrikeDecision::Strike
        } else {
            StrikeDecision::Wait
        }
    }
}

impl StrikePolicy for PatientPolicy {
    fn name(&self) -> &'static str {
        "Patient"
    }

    fn decide(&mut self, snapshot: &TickSnapshot) -> StrikeDecision {
        let entered = snapshot.in_strike_zone && !self.was_in_zone;
        self.was_in_zone = snapshot.in_strike_zone;
        if entered {
            StrikeDecision::Strike
        } else {
            StrikeDecision::Wait
        }
    }

    fn reset(&mut self) {
        self.was_in_zone = false;
    }
}

impl StrikePolicy for JitteryPolicy {
    fn name(&self) -> &'static str {
        "Jittery"
    }

    fn decide(&mut self, snapshot: &TickSnapshot) -> StrikeDecision {
        let chance = if snapshot.in_strike_zone {
            self.reflex
        } else {
            self.panic
        };
        if self.rng.gen_bool(chance) {
            StrikeDecision::Strike
        } else {
            StrikeDecision::Wait
        }
    }
}

impl StrikePolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn decide(&mut self, _snapshot: &TickSnapshot) -> StrikeDecision {
        StrikeDecision::Wait
    }
}
