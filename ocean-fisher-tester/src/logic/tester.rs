use colored::Colorize;
use ocean_fisher_game::FishingConfig;
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::logic::scenarios::{SimulationPlan, TestScenario};
use crate::logic::simulation::{SimulationConfig, SimulationSummary, run_simulation};

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_key: String,
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub catches: usize,
    pub bites: usize,
    pub failures: Vec<String>,
    #[serde(serialize_with = "millis::serialize")]
    pub average_duration: Duration,
    #[serde(serialize_with = "millis::serialize_all")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    fishing: FishingConfig,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(fishing: FishingConfig, verbose: bool) -> Self {
        Self { fishing, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (strategy: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.strategy,
                    seed
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut catches = 0;
        let mut bites = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let config = self.simulation_config(&scenario.plan, iteration_seed);

            match run_iteration(&scenario.plan, &config) {
                Ok(summary) => {
                    successes += 1;
                    catches += summary.catches();
                    bites += summary.bitten().count();
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    log::debug!(
                        "{} {} seed {}: {} variant, {} level ups, {} refusals, {} draws, events {:?}",
                        scenario.key,
                        summary.strategy,
                        summary.seed,
                        summary.variant.label(),
                        summary.level_ups,
                        summary.refusals,
                        summary.rng_draws,
                        summary.event_counts
                    );
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) landed {}/{} level {} coins {}",
                            i + 1,
                            iterations,
                            summary.catches(),
                            summary.bitten().count(),
                            summary.final_state.level,
                            summary.final_state.coins
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (strategy {}, seed {}): {err:#}",
                        i + 1,
                        scenario.plan.strategy,
                        iteration_seed
                    );
                    if self.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_key: scenario.key.to_string(),
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            catches,
            bites,
            failures,
            average_duration,
            performance_data,
        }
    }

    fn simulation_config(&self, plan: &SimulationPlan, seed: u64) -> SimulationConfig {
        let fishing = match plan.variant {
            Some(variant) => self.fishing.clone().with_variant(variant),
            None => self.fishing.clone(),
        };
        SimulationConfig::new(plan.strategy, seed)
            .with_rounds(plan.rounds)
            .with_economy(plan.economy)
            .with_fishing(fishing)
    }
}

fn run_iteration(
    plan: &SimulationPlan,
    config: &SimulationConfig,
) -> anyhow::Result<SimulationSummary> {
    let summary = run_simulation(config)?;
    for expectation in &plan.expectations {
        expectation.evaluate(&summary)?;
    }
    if plan.replay_check {
        let replay = run_simulation(config)?;
        anyhow::ensure!(
            replay.event_digest == summary.event_digest,
            "replay diverged: {} vs {}",
            summary.event_digest,
            replay.event_digest
        );
        anyhow::ensure!(
            replay.final_state == summary.final_state,
            "replay ended in a different player state"
        );
    }
    Ok(summary)
}

/// Durations are reported as whole milliseconds.
mod millis {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        duration.as_millis().serialize(serializer)
    }

    pub fn serialize_all<S: Serializer>(
        durations: &[Duration],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(durations.iter().map(Duration::as_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scenarios::get_scenario;

    #[test]
    fn smoke_scenario_passes() {
        let tester = LogicTester::new(FishingConfig::default(), false);
        let scenario = get_scenario("smoke").expect("smoke exists");
        let results = tester.run_scenario(&scenario, &[1337, 42], 2);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
        assert!(results.iter().all(|r| r.successful_iterations == 2));
        assert!(results.iter().all(|r| r.catches > 0));
    }

    #[test]
    fn replay_scenario_passes() {
        let tester = LogicTester::new(FishingConfig::default(), false);
        let scenario = get_scenario("deterministic-replay").expect("scenario exists");
        let results = tester.run_scenario(&scenario, &[7], 1);
        assert!(results[0].passed, "{:?}", results[0].failures);
    }

    #[test]
    fn failed_expectation_is_reported() {
        let tester = LogicTester::new(FishingConfig::default(), false);
        let mut scenario = get_scenario("idle-timeout").expect("scenario exists");
        scenario.plan = scenario
            .plan
            .with_expectation(|_: &SimulationSummary| -> anyhow::Result<()> {
                anyhow::bail!("forced")
            });
        let results = tester.run_scenario(&scenario, &[3], 2);
        assert!(!results[0].passed);
        assert_eq!(results[0].failures.len(), 2);
        assert!(results[0].failures[0].contains("forced"));

        let json = serde_json::to_value(&results[0]).expect("serializable");
        assert_eq!(json["scenario_key"], "idle-timeout");
    }
}
