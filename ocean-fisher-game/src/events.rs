//! Intents accepted by a fishing session and the events it emits.
//!
//! Events are plain data so a presentation layer can render them, and so two
//! runs fed the same seed and intents can be compared event by event.
use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;
use crate::ledger::{CatchId, CaughtFish};
use crate::minigame::TickSnapshot;

/// Player action delivered to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Cast into the current zone at the current clock.
    Cast,
    /// Advance the clock to `at_ms`, then strike.
    Strike { at_ms: u64 },
    /// Run every whole tick up to `to_ms`.
    Advance { to_ms: u64 },
    Sell { selection: Vec<CatchId> },
    SellAll,
    BuyRod { rod_id: String },
    BuyBait { bait_id: String, quantity: u32 },
    ChangeZone { zone_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Rod,
    Bait,
}

/// Discrete change reported to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    LineCast {
        at_ms: u64,
        zone_id: String,
        bait_id: Option<String>,
        bite_in_ms: u64,
    },
    /// The bite came up empty; the session is idle again.
    NoBite { at_ms: u64, zone_id: String },
    BiteStarted {
        at_ms: u64,
        species_id: String,
        rarity: Rarity,
        required_hits: u32,
        time_budget_secs: f32,
    },
    MinigameTick { at_ms: u64, snapshot: TickSnapshot },
    StrikeHit {
        at_ms: u64,
        hits: u32,
        required_hits: u32,
    },
    StrikeMissed { at_ms: u64, position: f32, speed: f32 },
    CatchResolved {
        at_ms: u64,
        species_id: String,
        success: bool,
        hits: u32,
        required_hits: u32,
        /// The landed fish, present only on success.
        fish: Option<CaughtFish>,
    },
    LevelUp { from: u32, to: u32 },
    ZoneUnlocked { zone_id: String },
    PurchaseResult {
        kind: ItemKind,
        item_id: String,
        quantity: u32,
        ok: bool,
        cost: u64,
        coins: u64,
        reason: Option<String>,
    },
    ZoneChanged {
        zone_id: String,
        ok: bool,
        reason: Option<String>,
    },
    SaleResult {
        sold: usize,
        coins_earned: u64,
        ok: bool,
        coins: u64,
        reason: Option<String>,
    },
    /// An intent was refused outright, e.g. casting twice.
    Rejected { reason: String },
}

impl GameEvent {
    /// Short stable name, used by reports and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LineCast { .. } => "line_cast",
            Self::NoBite { .. } => "no_bite",
            Self::BiteStarted { .. } => "bite_started",
            Self::MinigameTick { .. } => "minigame_tick",
            Self::StrikeHit { .. } => "strike_hit",
            Self::StrikeMissed { .. } => "strike_missed",
            Self::CatchResolved { .. } => "catch_resolved",
            Self::LevelUp { .. } => "level_up",
            Self::ZoneUnlocked { .. } => "zone_unlocked",
            Self::PurchaseResult { .. } => "purchase_result",
            Self::ZoneChanged { .. } => "zone_changed",
            Self::SaleResult { .. } => "sale_result",
            Self::Rejected { .. } => "rejected",
        }
    }

    #[must_use]
    pub const fn is_tick(&self) -> bool {
        matches!(self, Self::MinigameTick { .. })
    }
}
