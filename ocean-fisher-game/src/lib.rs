//! Ocean Fisher Game Engine
//!
//! Platform-agnostic catch-resolution and reward engine for the Ocean Fisher
//! casual fishing game. This crate provides the weighted fish selector, the
//! timing minigame, reward math and player progression without UI or
//! platform-specific dependencies.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod events;
pub mod ledger;
pub mod logbook;
pub mod minigame;
pub mod numbers;
pub mod reward;
pub mod rng;
pub mod selector;
pub mod session;

use std::sync::Arc;

// Re-export commonly used types
pub use catalog::{Bait, Catalog, CatalogError, FishSpecies, Rarity, Rod, Zone, catalog};
pub use config::{ConfigError, FishingConfig};
pub use constants::TICK_SECONDS;
pub use events::{GameEvent, Intent, ItemKind};
pub use ledger::{
    CatchId, CaughtFish, HeldBait, Ledger, LedgerCommand, LedgerError, LedgerEvent, LedgerEvents,
    PlayerState, apply_command,
};
pub use logbook::{DiscoverySummary, TierProgress};
pub use minigame::{
    CatchMinigame, CatchOutcome, CatchRule, DriftingTargetRule, FailureReason, LineCrossingRule,
    MinigameError, MinigamePhase, MinigameTuning, MinigameVariant, StrikeOutcome, TickOutcome,
    TickSnapshot,
};
pub use reward::{
    CatchReward, compute_catch, level_for_xp, roll_size, sell_value, xp_for_rarity,
    xp_to_next_level,
};
pub use rng::{CountingRng, RngBundle};
pub use selector::{SelectionModifiers, adjusted_weight, adjusted_weights, select_fish};
pub use session::{FishingError, FishingSession};

/// Trait for abstracting catalog loading.
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the fish, rod, bait and zone tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// Loader for the catalog embedded in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl CatalogLoader for StaticCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Ok(catalog().clone())
    }
}

/// Loader for catalog JSON supplied at runtime.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    json: String,
}

impl JsonCatalog {
    #[must_use]
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl CatalogLoader for JsonCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Catalog::from_json(&self.json)
    }
}

/// Entry point creating fishing sessions over a loaded catalog
pub struct GameEngine<L>
where
    L: CatalogLoader,
{
    loader: L,
}

impl<L> GameEngine<L>
where
    L: CatalogLoader,
{
    /// Create a new game engine with the provided catalog loader
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load and validate the catalog.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when the catalog cannot be produced.
    pub fn load_catalog(&self) -> Result<Catalog, L::Error> {
        self.loader.load_catalog()
    }

    /// Create a session with the given configuration and seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the configuration is invalid.
    pub fn create_session(
        &self,
        config: FishingConfig,
        seed: u64,
    ) -> Result<FishingSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.loader.load_catalog().map_err(Into::into)?;
        let session = FishingSession::new(Arc::new(catalog), config, seed)?;
        log::debug!("session created with seed {seed:#x}");
        Ok(session)
    }

    /// Resume a session from a previously captured player state.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the configuration is invalid.
    pub fn resume_session(
        &self,
        config: FishingConfig,
        state: PlayerState,
        seed: u64,
    ) -> Result<FishingSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.loader.load_catalog().map_err(Into::into)?;
        Ok(FishingSession::from_state(
            Arc::new(catalog),
            config,
            state,
            seed,
        )?)
    }
}
