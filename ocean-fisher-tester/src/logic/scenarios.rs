use std::sync::Arc;

use anyhow::{Result, bail, ensure};
use ocean_fisher_game::{MinigameVariant, Rarity};

use crate::logic::policy::StrikeStrategy;
use crate::logic::simulation::SimulationSummary;

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// How a scenario drives the session and what it checks afterwards.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: StrikeStrategy,
    pub rounds: u32,
    pub economy: bool,
    /// Forces a minigame variant regardless of the tester configuration.
    pub variant: Option<MinigameVariant>,
    /// Run each iteration twice and require identical event digests.
    pub replay_check: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: StrikeStrategy, rounds: u32) -> Self {
        Self {
            strategy,
            rounds,
            economy: false,
            variant: None,
            replay_check: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_economy(mut self) -> Self {
        self.economy = true;
        self
    }

    #[must_use]
    pub const fn with_variant(mut self, variant: MinigameVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    #[must_use]
    pub const fn with_replay_check(mut self) -> Self {
        self.replay_check = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    fn new(key: &'static str, name: &str, plan: SimulationPlan) -> Self {
        Self {
            key,
            name: name.to_string(),
            plan,
        }
    }
}

const SCENARIOS: [(&str, &str); 8] = [
    ("smoke", "Smoke Test"),
    ("perfect-angler", "Perfect Strikes Land Every Fish"),
    ("patient-angler", "One Strike Per Pass"),
    ("jittery-angler", "Noisy Reflexes Keep State Consistent"),
    ("idle-timeout", "Idle Rounds Time Out"),
    ("economy-loop", "Sell, Restock and Upgrade"),
    ("deterministic-replay", "Deterministic Replay Verification"),
    ("drifting-target", "Drifting Target Variant"),
];

/// Every scenario key with its display name.
#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.to_vec()
}

/// Expand `all` into every known key, keeping other tokens in order.
#[must_use]
pub fn expand_scenarios(tokens: &[String]) -> Vec<String> {
    let mut expanded = Vec::new();
    for token in tokens {
        if token.eq_ignore_ascii_case("all") {
            expanded.extend(SCENARIOS.iter().map(|(key, _)| (*key).to_string()));
        } else {
            expanded.push(token.clone());
        }
    }
    expanded.dedup();
    expanded
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = name.to_lowercase();
    let (key, title) = SCENARIOS.iter().find(|(k, _)| *k == key)?;
    let plan = match *key {
        "smoke" => SimulationPlan::new(StrikeStrategy::Perfect, 3)
            .with_expectation(no_halted_rounds)
            .with_expectation(expect_some_catch),
        "perfect-angler" => SimulationPlan::new(StrikeStrategy::Perfect, 10)
            .with_expectation(no_halted_rounds)
            .with_expectation(every_bite_lands)
            .with_expectation(ledger_matches_rounds),
        "patient-angler" => SimulationPlan::new(StrikeStrategy::Patient, 10)
            .with_expectation(no_halted_rounds)
            .with_expectation(commons_land_on_first_pass),
        "jittery-angler" => SimulationPlan::new(StrikeStrategy::Jittery, 10)
            .with_expectation(no_halted_rounds)
            .with_expectation(ledger_matches_rounds)
            .with_expectation(strikes_cover_hits),
        "idle-timeout" => SimulationPlan::new(StrikeStrategy::Idle, 5)
            .with_expectation(no_halted_rounds)
            .with_expectation(nothing_landed),
        "economy-loop" => SimulationPlan::new(StrikeStrategy::Perfect, 40)
            .with_economy()
            .with_expectation(no_halted_rounds)
            .with_expectation(economy_turns_over),
        "deterministic-replay" => SimulationPlan::new(StrikeStrategy::Jittery, 8)
            .with_economy()
            .with_replay_check()
            .with_expectation(no_halted_rounds),
        "drifting-target" => SimulationPlan::new(StrikeStrategy::Perfect, 8)
            .with_variant(MinigameVariant::DriftingTarget)
            .with_expectation(no_halted_rounds)
            .with_expectation(half_of_drifters_land),
        _ => return None,
    };
    Some(TestScenario::new(*key, title, plan))
}

fn no_halted_rounds(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.halted() == 0,
        "{} rounds never resolved",
        summary.halted()
    );
    Ok(())
}

fn expect_some_catch(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.catches() > 0, "no fish landed");
    ensure!(
        summary.discovery.discovered > 0,
        "discovery log stayed empty after a catch"
    );
    Ok(())
}

fn every_bite_lands(summary: &SimulationSummary) -> Result<()> {
    if let Some(round) = summary.bitten().find(|round| !round.success) {
        bail!(
            "round {} lost {:?} with {}/{} hits",
            round.index,
            round.species_id,
            round.hits,
            round.required_hits
        );
    }
    Ok(())
}

fn ledger_matches_rounds(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    let catches = u64::try_from(summary.catches())?;
    ensure!(
        state.fish_caught == catches,
        "ledger counts {} catches, rounds landed {catches}",
        state.fish_caught
    );
    ensure!(
        state.inventory.len() == summary.catches(),
        "inventory holds {} fish",
        state.inventory.len()
    );
    ensure!(
        summary.discovery.discovered <= summary.catches(),
        "discovered more species than fish landed"
    );
    Ok(())
}

fn commons_land_on_first_pass(summary: &SimulationSummary) -> Result<()> {
    if let Some(round) = summary
        .bitten()
        .find(|round| round.rarity == Some(Rarity::Common) && !round.success)
    {
        bail!("round {} lost a common {:?}", round.index, round.species_id);
    }
    Ok(())
}

fn strikes_cover_hits(summary: &SimulationSummary) -> Result<()> {
    for round in &summary.rounds {
        ensure!(
            round.strikes >= round.hits + round.misses,
            "round {} counted {} strikes for {} hits and {} misses",
            round.index,
            round.strikes,
            round.hits,
            round.misses
        );
    }
    Ok(())
}

fn nothing_landed(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.catches() == 0, "an idle angler landed a fish");
    ensure!(
        summary.final_state.coins == summary.starting_coins,
        "coins moved without any action"
    );
    ensure!(
        summary.escapes() == summary.bitten().count(),
        "a bitten round did not time out"
    );
    Ok(())
}

fn economy_turns_over(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(summary.purchases > 0, "nothing was ever bought");
    ensure!(summary.coins_earned > 0, "nothing was ever sold");
    ensure!(
        state.total_value == summary.coins_earned + state.inventory_value(),
        "lifetime value {} differs from sold {} plus held {}",
        state.total_value,
        summary.coins_earned,
        state.inventory_value()
    );
    ensure!(state.level > 1, "forty catches never levelled up");
    Ok(())
}

fn half_of_drifters_land(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.catch_rate() >= 0.5,
        "only {:.0}% of drifting fish landed",
        summary.catch_rate() * 100.0
    );
    Ok(())
}
