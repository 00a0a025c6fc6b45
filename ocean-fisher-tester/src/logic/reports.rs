use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;
use super::playthrough::{PlaythroughAggregate, PlaythroughRecord};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    scenarios: &'a [ScenarioResult],
    playthroughs: &'a [PlaythroughRecord],
    strategies: &'a [PlaythroughAggregate],
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / results.len() as f64) * 100.0;
    rate
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    aggregates: &[PlaythroughAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenario runs: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful, landed {}/{} bites",
            result.successful_iterations, result.iterations_run, result.catches, result.bites
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if !aggregates.is_empty() {
        writeln!(out, "{}", "🎣 Strategy Playthroughs".bright_yellow().bold())?;
        writeln!(out, "{}", "=======================".yellow())?;
        for aggregate in aggregates {
            writeln!(
                out,
                "{:10} runs {:3} | catch rate {:5.1}% | mean level {:5.1} | species {:4.1} | best level {}{}",
                aggregate.strategy.bold(),
                aggregate.runs,
                aggregate.mean_catch_rate * 100.0,
                aggregate.mean_level,
                aggregate.mean_discovered,
                aggregate.best_level,
                aggregate
                    .best_seed
                    .map(|seed| format!(" (seed {seed})"))
                    .unwrap_or_default()
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    records: &[PlaythroughRecord],
    aggregates: &[PlaythroughAggregate],
) -> Result<()> {
    let report = JsonReport {
        generated_at: timestamp(),
        scenarios: results,
        playthroughs: records,
        strategies: aggregates,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    aggregates: &[PlaythroughAggregate],
) -> Result<()> {
    writeln!(out, "# Ocean Fisher Logic Test Results\n")?;
    writeln!(out, "_Generated {}_\n", timestamp())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenario runs**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "### {} {} (seed {})\n",
            status, result.scenario_name, result.seed
        )?;
        writeln!(
            out,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Landed**: {}/{} bites", result.catches, result.bites)?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }

    if !aggregates.is_empty() {
        writeln!(out, "## Strategy Playthroughs\n")?;
        writeln!(
            out,
            "| Strategy | Runs | Catch rate | Mean level | Mean species | Best level |"
        )?;
        writeln!(out, "|---|---|---|---|---|---|")?;
        for aggregate in aggregates {
            writeln!(
                out,
                "| {} | {} | {:.1}% | {:.1} | {:.1} | {} |",
                aggregate.strategy,
                aggregate.runs,
                aggregate.mean_catch_rate * 100.0,
                aggregate.mean_level,
                aggregate.mean_discovered,
                aggregate.best_level
            )?;
        }
    }
    Ok(())
}
