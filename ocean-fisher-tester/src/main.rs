mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use ocean_fisher_game::{FishingConfig, MinigameVariant, catalog};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use logic::{
    LogicTester, PlaythroughAggregate, PlaythroughRecord, ScenarioResult, SeedInfo,
    aggregate_playthroughs, expand_scenarios, get_scenario, list_scenarios, resolve_seed_inputs,
    run_playthroughs,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VariantArg {
    /// Multi-hit line crossing (default game rule)
    LineCrossing,
    /// Erratically drifting fish passing a hook
    DriftingTarget,
}

impl From<VariantArg> for MinigameVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::LineCrossing => Self::LineCrossing,
            VariantArg::DriftingTarget => Self::DriftingTarget,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ocean-fisher-tester", version = "0.1.0")]
#[command(about = "Automated QA for the Ocean Fisher catch engine using scripted strike policies")]
struct Args {
    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated numbers, 0x hex or phrases)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Casts per strategy playthrough
    #[arg(long, default_value_t = 20)]
    rounds: u32,

    /// Skip the strategy playthrough comparison
    #[arg(long)]
    skip_playthrough: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Minigame rule, overriding the configuration file
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// JSON fishing configuration (starting coins, gear, bite delays, variant)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let fishing = load_fishing_config(args.config.as_deref(), args.variant)?;
    let scenarios = expand_scenarios(&split_csv(&args.scenarios));
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();

    let results = run_logic_scenarios(&args, &fishing, &scenarios, &seeds);
    let (records, aggregates) = gather_playthroughs(&args, &fishing, &seed_infos)?;

    write_reports(&args, &results, &records, &aggregates, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎣 Ocean Fisher Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_fishing_config(path: Option<&Path>, variant: Option<VariantArg>) -> Result<FishingConfig> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            FishingConfig::from_json(&json, catalog())
                .with_context(|| format!("invalid fishing config in {}", path.display()))?
        }
        None => FishingConfig::default(),
    };
    Ok(match variant {
        Some(variant) => config.with_variant(variant.into()),
        None => config,
    })
}

fn run_logic_scenarios(
    args: &Args,
    fishing: &FishingConfig,
    scenarios: &[String],
    seeds: &[u64],
) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(fishing.clone(), args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }

    results
}

fn gather_playthroughs(
    args: &Args,
    fishing: &FishingConfig,
    seed_infos: &[SeedInfo],
) -> Result<(Vec<PlaythroughRecord>, Vec<PlaythroughAggregate>)> {
    if args.skip_playthrough || args.rounds == 0 {
        return Ok((Vec::new(), Vec::new()));
    }
    let records = run_playthroughs(fishing, seed_infos, args.rounds)?;
    let aggregates = aggregate_playthroughs(&records);
    Ok((records, aggregates))
}

fn write_reports(
    args: &Args,
    results: &[ScenarioResult],
    records: &[PlaythroughRecord],
    aggregates: &[PlaythroughAggregate],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, results, records, aggregates)?;
        }
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, results, aggregates)?;
        }
        _ => {
            if results.is_empty() && aggregates.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    aggregates,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
