//! netcost-runner: headless assessment runner.
//!
//! Usage:
//!   netcost-runner --strategy 4G_epc_microwave_baseline_baseline_baseline_baseline_baseline \
//!                  --regions regions.json --data-dir ./data --out results.json
//!   netcost-runner --strategy ... --regions regions.json --events events.jsonl

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use netcost_core::{
    config::AssessmentConfig,
    engine::{AssessmentEngine, AssessmentSummary},
    region::{AssessedRegion, Region},
    stage::RegionFailure,
    strategy::Strategy,
};
use std::env;
use std::io::Write;

#[derive(serde::Serialize)]
struct RunReport<'a> {
    run_id:       &'a str,
    generated_at: DateTime<Utc>,
    country:      &'a str,
    strategy:     &'a str,
    summary:      &'a AssessmentSummary,
    regions:      &'a [AssessedRegion],
    failures:     &'a [RegionFailure],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let strategy_arg = find_arg(&args, "--strategy")
        .ok_or_else(|| anyhow!("--strategy is required"))?;
    let regions_path = find_arg(&args, "--regions")
        .ok_or_else(|| anyhow!("--regions is required"))?;
    let data_dir = find_arg(&args, "--data-dir").unwrap_or("./data");
    let country = find_arg(&args, "--country").unwrap_or("unknown");
    let out = find_arg(&args, "--out");
    let events_path = find_arg(&args, "--events");

    // Stdout carries the report itself when no --out is given.
    if out.is_some() {
        println!("netcost-runner");
        println!("  strategy:  {strategy_arg}");
        println!("  regions:   {regions_path}");
        println!("  data_dir:  {data_dir}");
        println!("  country:   {country}");
        println!();
    }

    let strategy: Strategy = strategy_arg.parse()?;
    let config = AssessmentConfig::load(data_dir)?;

    let content = std::fs::read_to_string(regions_path)
        .map_err(|e| anyhow!("Cannot read {regions_path}: {e}"))?;
    let regions: Vec<Region> = serde_json::from_str(&content)?;

    let run_id = format!("run-{}", uuid::Uuid::new_v4());
    let mut engine = AssessmentEngine::build(run_id.clone(), country, strategy.clone(), config);
    let outcome = engine.run(regions)?;

    let report = RunReport {
        run_id:       &outcome.run_id,
        generated_at: Utc::now(),
        country,
        strategy:     strategy.as_str(),
        summary:      &outcome.summary,
        regions:      &outcome.regions,
        failures:     &outcome.failures,
    };
    let json = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| anyhow!("Cannot write {path}: {e}"))?;
            log::info!("Wrote {} regions to {path}", outcome.regions.len());
        }
        None => println!("{json}"),
    }

    if let Some(path) = events_path {
        let mut file = std::fs::File::create(path)
            .map_err(|e| anyhow!("Cannot create {path}: {e}"))?;
        for entry in &outcome.events {
            writeln!(file, "{}", serde_json::to_string(entry)?)?;
        }
        log::info!("Wrote {} events to {path}", outcome.events.len());
    }

    print_summary(&engine, &outcome.summary, &run_id);
    Ok(())
}

fn print_summary(engine: &AssessmentEngine, summary: &AssessmentSummary, run_id: &str) {
    eprintln!("=== RUN SUMMARY ===");
    eprintln!("  run_id:           {run_id}");
    eprintln!("  regions assessed: {}", summary.regions_assessed);
    eprintln!("  regions failed:   {}", summary.regions_failed);
    eprintln!("  network cost:     ${:.0}", summary.network_cost);
    eprintln!("  total cost:       ${:.0}", summary.total_cost);
    eprintln!("  total revenue:    ${:.0}", summary.total_revenue);
    if let Some(state) = engine.last_subsidy_state() {
        eprintln!();
        eprintln!("=== SUBSIDY SUMMARY ({:?}) ===", state.depletion_order);
        eprintln!("  cross-subsidy pool:  ${:.0}", state.pool);
        eprintln!("  total deficit:       ${:.0}", state.total_deficit);
        eprintln!("  used cross-subsidy:  ${:.0}", state.used_cross_subsidy);
        eprintln!("  pool remaining:      ${:.0}", state.pool_remaining);
        eprintln!("  state subsidy:       ${:.0}", state.required_state_subsidy);
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
