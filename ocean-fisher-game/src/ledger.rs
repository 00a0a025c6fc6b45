//! Player progression ledger.
//!
//! Every operation validates against the current state and the catalog
//! before touching anything, so a rejected command leaves the player exactly
//! as it was.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::catalog::{Bait, Catalog, FishSpecies, Rarity};
use crate::config::FishingConfig;
use crate::logbook::DiscoverySummary;
use crate::reward::{CatchReward, level_for_xp, xp_to_next_level};

/// Stable identity of a caught fish.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CatchId {
    pub species_id: String,
    pub caught_at_ms: u64,
}

impl fmt::Display for CatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.species_id, self.caught_at_ms)
    }
}

/// A fish sitting in the player's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaughtFish {
    pub species_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub size: f32,
    pub sell_value: u64,
    pub xp: u64,
    pub caught_at_ms: u64,
}

impl CaughtFish {
    #[must_use]
    pub fn new(species: &FishSpecies, reward: CatchReward, caught_at_ms: u64) -> Self {
        Self {
            species_id: species.id.clone(),
            name: species.name.clone(),
            rarity: species.rarity,
            size: reward.size,
            sell_value: reward.sell_value,
            xp: reward.xp,
            caught_at_ms,
        }
    }

    #[must_use]
    pub fn id(&self) -> CatchId {
        CatchId {
            species_id: self.species_id.clone(),
            caught_at_ms: self.caught_at_ms,
        }
    }
}

/// Bait stack carried by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldBait {
    pub bait_id: String,
    pub quantity: u32,
}

/// Complete player progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub level: u32,
    pub xp: u64,
    pub xp_to_next_level: u64,
    pub coins: u64,
    pub fish_caught: u64,
    pub total_value: u64,
    pub rod_id: String,
    pub bait: Option<HeldBait>,
    pub unlocked_zones: BTreeSet<String>,
    pub current_zone: String,
    pub inventory: Vec<CaughtFish>,
    /// First-seen record per species id. Never shrinks.
    pub discovered: BTreeMap<String, FishSpecies>,
}

impl PlayerState {
    #[must_use]
    pub fn new(config: &FishingConfig) -> Self {
        Self {
            level: level_for_xp(0),
            xp: 0,
            xp_to_next_level: xp_to_next_level(0),
            coins: config.starting_coins,
            fish_caught: 0,
            total_value: 0,
            rod_id: config.starting_rod.clone(),
            bait: None,
            unlocked_zones: BTreeSet::from([config.starting_zone.clone()]),
            current_zone: config.starting_zone.clone(),
            inventory: Vec::new(),
            discovered: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn can_afford(&self, price: u64) -> bool {
        self.coins >= price
    }

    /// Whether the player may fish in `zone_id`.
    ///
    /// A zone is reachable once the level threshold is met or after it was
    /// explicitly unlocked.
    #[must_use]
    pub fn is_zone_reachable(&self, catalog: &Catalog, zone_id: &str) -> bool {
        catalog.zone(zone_id).is_some_and(|zone| {
            self.level >= zone.unlock_level || self.unlocked_zones.contains(zone_id)
        })
    }

    /// Value of everything currently in the inventory.
    #[must_use]
    pub fn inventory_value(&self) -> u64 {
        self.inventory
            .iter()
            .fold(0_u64, |acc, fish| acc.saturating_add(fish.sell_value))
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(&FishingConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("not enough coins: need {price}, have {coins}")]
    Unaffordable { price: u64, coins: u64 },
    #[error("requires level {required} (currently {level})")]
    LevelTooLow { required: u32, level: u32 },
    #[error("zone `{0}` is locked")]
    ZoneLocked(String),
    #[error("selection does not match the inventory")]
    InvalidSelection,
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error("unknown zone `{0}`")]
    UnknownZone(String),
    #[error("quantity must be positive")]
    InvalidQuantity,
    #[error("rod `{0}` is already equipped")]
    AlreadyEquipped(String),
}

/// State change reported by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    CatchRecorded { catch_id: CatchId, first_discovery: bool },
    LevelUp { from: u32, to: u32 },
    ZoneUnlocked { zone_id: String },
    SaleCompleted { sold: usize, coins_earned: u64 },
    RodPurchased { rod_id: String, price: u64 },
    BaitPurchased { bait_id: String, quantity: u32, cost: u64 },
    BaitConsumed { bait_id: String, remaining: u32 },
    ZoneChanged { zone_id: String },
}

pub type LedgerEvents = SmallVec<[LedgerEvent; 4]>;

/// Replayable ledger operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LedgerCommand {
    RecordCatch { fish: CaughtFish },
    Sell { selection: Vec<CatchId> },
    PurchaseRod { rod_id: String },
    PurchaseBait { bait_id: String, quantity: u32 },
    ChangeZone { zone_id: String },
    ConsumeBait,
}

/// Apply `command` to a copy of `state`.
///
/// # Errors
///
/// Returns the `LedgerError` the command was rejected with; `state` is never modified.
pub fn apply_command(
    state: &PlayerState,
    catalog: &Catalog,
    command: LedgerCommand,
) -> Result<(PlayerState, LedgerEvents), LedgerError> {
    let mut ledger = Ledger::from_state(state.clone());
    let events = ledger.apply(catalog, command)?;
    Ok((ledger.into_state(), events))
}

/// Owner of the player state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    state: PlayerState,
}

impl Ledger {
    #[must_use]
    pub fn new(config: &FishingConfig) -> Self {
        Self::from_state(PlayerState::new(config))
    }

    #[must_use]
    pub const fn from_state(state: PlayerState) -> Self {
        Self { state }
    }

    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> PlayerState {
        self.state
    }

    /// Dispatch a command to the matching operation.
    ///
    /// # Errors
    ///
    /// Propagates the operation's `LedgerError`.
    pub fn apply(
        &mut self,
        catalog: &Catalog,
        command: LedgerCommand,
    ) -> Result<LedgerEvents, LedgerError> {
        match command {
            LedgerCommand::RecordCatch { fish } => Ok(self.apply_catch(catalog, fish)),
            LedgerCommand::Sell { selection } => self.sell(&selection),
            LedgerCommand::PurchaseRod { rod_id } => self.purchase_rod(catalog, &rod_id),
            LedgerCommand::PurchaseBait { bait_id, quantity } => {
                self.purchase_bait(catalog, &bait_id, quantity)
            }
            LedgerCommand::ChangeZone { zone_id } => self.change_zone(catalog, &zone_id),
            LedgerCommand::ConsumeBait => {
                let Some(bait) = self.consume_bait(catalog) else {
                    return Ok(LedgerEvents::new());
                };
                let remaining = self.state.bait.as_ref().map_or(0, |held| held.quantity);
                Ok(LedgerEvents::from_iter([LedgerEvent::BaitConsumed {
                    bait_id: bait.id.clone(),
                    remaining,
                }]))
            }
        }
    }

    /// Record a landed fish.
    ///
    /// Appends to the inventory, records a first discovery, and grants
    /// experience. Zones whose threshold the new level crosses are unlocked.
    pub fn apply_catch(&mut self, catalog: &Catalog, fish: CaughtFish) -> LedgerEvents {
        let mut events = LedgerEvents::new();
        let state = &mut self.state;
        let catch_id = fish.id();

        let mut first_discovery = false;
        if !state.discovered.contains_key(&fish.species_id) {
            if let Some(species) = catalog.species(&fish.species_id) {
                state
                    .discovered
                    .insert(fish.species_id.clone(), species.clone());
                log::info!("discovered {} ({})", species.name, species.rarity);
                first_discovery = true;
            }
        }

        state.fish_caught = state.fish_caught.saturating_add(1);
        state.total_value = state.total_value.saturating_add(fish.sell_value);
        state.xp = state.xp.saturating_add(fish.xp);
        state.xp_to_next_level = xp_to_next_level(state.xp);
        state.inventory.push(fish);
        events.push(LedgerEvent::CatchRecorded {
            catch_id,
            first_discovery,
        });

        let previous = state.level;
        let level = level_for_xp(state.xp);
        if level != previous {
            state.level = level;
            log::info!("level up: {previous} -> {level}");
            events.push(LedgerEvent::LevelUp {
                from: previous,
                to: level,
            });
            for zone in &catalog.zones {
                if zone.unlock_level > previous
                    && zone.unlock_level <= level
                    && state.unlocked_zones.insert(zone.id.clone())
                {
                    log::info!("zone unlocked: {}", zone.id);
                    events.push(LedgerEvent::ZoneUnlocked {
                        zone_id: zone.id.clone(),
                    });
                }
            }
        }
        events
    }

    /// Sell exactly the selected fish.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidSelection` when the selection is empty or
    /// any id fails to match a distinct inventory entry.
    pub fn sell(&mut self, selection: &[CatchId]) -> Result<LedgerEvents, LedgerError> {
        if selection.is_empty() {
            return Err(LedgerError::InvalidSelection);
        }
        let mut picked = BTreeSet::new();
        for id in selection {
            let idx = self
                .state
                .inventory
                .iter()
                .enumerate()
                .find_map(|(idx, fish)| {
                    (!picked.contains(&idx)
                        && fish.species_id == id.species_id
                        && fish.caught_at_ms == id.caught_at_ms)
                        .then_some(idx)
                })
                .ok_or(LedgerError::InvalidSelection)?;
            picked.insert(idx);
        }

        let mut earned = 0_u64;
        let mut idx = 0;
        self.state.inventory.retain(|fish| {
            let sold = picked.contains(&idx);
            idx += 1;
            if sold {
                earned = earned.saturating_add(fish.sell_value);
            }
            !sold
        });
        self.state.coins = self.state.coins.saturating_add(earned);
        log::info!("sold {} fish for {earned} coins", picked.len());
        Ok(LedgerEvents::from_iter([LedgerEvent::SaleCompleted {
            sold: picked.len(),
            coins_earned: earned,
        }]))
    }

    /// Buy and equip a rod. The previous rod is discarded without refund.
    ///
    /// # Errors
    ///
    /// `UnknownItem`, `AlreadyEquipped`, `LevelTooLow` or `Unaffordable`.
    pub fn purchase_rod(
        &mut self,
        catalog: &Catalog,
        rod_id: &str,
    ) -> Result<LedgerEvents, LedgerError> {
        let rod = catalog
            .rod(rod_id)
            .ok_or_else(|| LedgerError::UnknownItem(rod_id.to_string()))?;
        if self.state.rod_id == rod.id {
            return Err(LedgerError::AlreadyEquipped(rod.id.clone()));
        }
        if self.state.level < rod.unlock_level {
            return Err(LedgerError::LevelTooLow {
                required: rod.unlock_level,
                level: self.state.level,
            });
        }
        if !self.state.can_afford(rod.price) {
            return Err(LedgerError::Unaffordable {
                price: rod.price,
                coins: self.state.coins,
            });
        }
        self.state.coins -= rod.price;
        self.state.rod_id.clone_from(&rod.id);
        log::info!("equipped {} for {} coins", rod.name, rod.price);
        Ok(LedgerEvents::from_iter([LedgerEvent::RodPurchased {
            rod_id: rod.id.clone(),
            price: rod.price,
        }]))
    }

    /// Buy `quantity` units of bait. Same bait stacks; a different bait replaces it.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `UnknownItem` or `Unaffordable`.
    pub fn purchase_bait(
        &mut self,
        catalog: &Catalog,
        bait_id: &str,
        quantity: u32,
    ) -> Result<LedgerEvents, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        let bait = catalog
            .bait(bait_id)
            .ok_or_else(|| LedgerError::UnknownItem(bait_id.to_string()))?;
        let cost = bait
            .price
            .checked_mul(u64::from(quantity))
            .ok_or(LedgerError::InvalidQuantity)?;
        if !self.state.can_afford(cost) {
            return Err(LedgerError::Unaffordable {
                price: cost,
                coins: self.state.coins,
            });
        }
        let stacked = match &self.state.bait {
            Some(held) if held.bait_id == bait.id => held
                .quantity
                .checked_add(quantity)
                .ok_or(LedgerError::InvalidQuantity)?,
            _ => quantity,
        };
        self.state.coins -= cost;
        self.state.bait = Some(HeldBait {
            bait_id: bait.id.clone(),
            quantity: stacked,
        });
        log::info!("bought {quantity}x {} for {cost} coins", bait.name);
        Ok(LedgerEvents::from_iter([LedgerEvent::BaitPurchased {
            bait_id: bait.id.clone(),
            quantity,
            cost,
        }]))
    }

    /// Move to another zone.
    ///
    /// # Errors
    ///
    /// `UnknownZone` or `ZoneLocked`.
    pub fn change_zone(
        &mut self,
        catalog: &Catalog,
        zone_id: &str,
    ) -> Result<LedgerEvents, LedgerError> {
        if catalog.zone(zone_id).is_none() {
            return Err(LedgerError::UnknownZone(zone_id.to_string()));
        }
        if !self.state.is_zone_reachable(catalog, zone_id) {
            return Err(LedgerError::ZoneLocked(zone_id.to_string()));
        }
        self.state.current_zone = zone_id.to_string();
        log::debug!("moved to {zone_id}");
        Ok(LedgerEvents::from_iter([LedgerEvent::ZoneChanged {
            zone_id: zone_id.to_string(),
        }]))
    }

    /// Take one unit of held bait for a cast.
    ///
    /// Returns the bait that is active for the cast, or `None` when nothing
    /// usable is held. An emptied stack stays held at zero.
    pub fn consume_bait<'c>(&mut self, catalog: &'c Catalog) -> Option<&'c Bait> {
        let held = self.state.bait.as_mut()?;
        if held.quantity == 0 {
            return None;
        }
        let bait = catalog.bait(&held.bait_id)?;
        held.quantity -= 1;
        Some(bait)
    }

    #[must_use]
    pub const fn can_afford(&self, price: u64) -> bool {
        self.state.can_afford(price)
    }

    #[must_use]
    pub fn is_zone_reachable(&self, catalog: &Catalog, zone_id: &str) -> bool {
        self.state.is_zone_reachable(catalog, zone_id)
    }

    #[must_use]
    pub fn discovery_summary(&self, catalog: &Catalog) -> DiscoverySummary {
        DiscoverySummary::from_state(&self.state, catalog)
    }
}
