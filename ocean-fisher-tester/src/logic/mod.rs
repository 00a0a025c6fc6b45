pub mod playthrough;
pub mod policy;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use playthrough::{
    PlaythroughAggregate, PlaythroughRecord, aggregate_playthroughs, run_playthroughs,
};
pub use scenarios::{expand_scenarios, get_scenario, list_scenarios};
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use tester::*;
