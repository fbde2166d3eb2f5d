mod scenarios;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use scenarios::{SCENARIOS, ScenarioReport, run_scenario};

#[derive(Debug, Parser)]
#[command(name = "pocketplay-tester", version = "0.3.0")]
#[command(about = "Headless QA replay for the Pocketplay progress engine")]
struct Args {
    /// Scenarios to run (comma-separated), or "all"
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seed for the synthetic score and duration streams
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Sessions to replay in the marathon scenario
    #[arg(long, default_value_t = 60)]
    sessions: u64,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_scenarios {
        for name in SCENARIOS {
            println!("{name}");
        }
        return Ok(());
    }

    let requested: Vec<&str> = if args.scenarios == "all" {
        SCENARIOS.to_vec()
    } else {
        args.scenarios
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    };
    if requested.is_empty() {
        bail!("no scenarios requested");
    }

    let mut reports = Vec::with_capacity(requested.len());
    for name in requested {
        log::info!("running scenario {name} with seed {}", args.seed);
        reports.push(run_scenario(name, args.seed, args.sessions)?);
    }

    match args.report.as_str() {
        "json" => emit_json(&reports)?,
        _ => emit_console(&reports),
    }

    let failed: Vec<&str> = reports
        .iter()
        .filter(|report| !report.passed())
        .map(|report| report.scenario.as_str())
        .collect();
    if !failed.is_empty() {
        bail!(
            "{} scenario(s) missed expected unlocks: {}",
            failed.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

fn emit_json(reports: &[ScenarioReport]) -> Result<()> {
    #[derive(serde::Serialize)]
    struct Envelope<'a> {
        generated_at: String,
        reports: &'a [ScenarioReport],
    }
    let envelope = Envelope {
        generated_at: chrono::Utc::now().to_rfc3339(),
        reports,
    };
    let rendered =
        serde_json::to_string_pretty(&envelope).context("serializing scenario reports")?;
    println!("{rendered}");
    Ok(())
}

fn emit_console(reports: &[ScenarioReport]) {
    for report in reports {
        let status = if report.passed() {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!(
            "{status} {} (seed {})",
            report.scenario.bold(),
            report.seed
        );
        println!(
            "  sessions: {}  play time: {}",
            report.sessions, report.play_time
        );
        println!(
            "  unlocked {}/{}: {}",
            report.earned_count,
            report.total,
            report.earned.join(", ")
        );
        if !report.missing.is_empty() {
            println!("  {} {}", "missing:".red(), report.missing.join(", "));
        }
    }
}
