//! sim-runner: headless runner for the plan simulation.
//!
//! Usage:
//!   sim-runner --scenario baseline --census data/census.json --db run.db
//!   sim-runner --seed 7 --years 5 --json

use anyhow::Result;
use plansim_core::{
    analytics::deferral_distribution,
    census::load_census,
    config::SimConfig,
    engine::{RunSummary, SimEngine},
    snapshot::EmploymentStatus,
    store::SimStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = flag(&args, "--data-dir").unwrap_or("./data");
    let scenario = flag(&args, "--scenario");
    let census_path = flag(&args, "--census")
        .map(str::to_string)
        .unwrap_or_else(|| format!("{data_dir}/census.json"));
    let db = flag(&args, "--db").unwrap_or(":memory:");
    let json = args.iter().any(|a| a == "--json");

    let mut config = SimConfig::load(data_dir, scenario)?;
    config.simulation.random_seed = parse_arg(&args, "--seed", config.simulation.random_seed);
    config.simulation.num_years = parse_arg(&args, "--years", config.simulation.num_years);
    config.validate()?;

    let scenario_id = scenario.unwrap_or("default").to_string();
    if !json {
        println!("plansim sim-runner");
        println!("  scenario:  {scenario_id}");
        println!("  seed:      {}", config.simulation.random_seed);
        println!(
            "  years:     {}..={}",
            config.simulation.start_year,
            config.simulation.end_year()
        );
        println!("  census:    {census_path}");
        println!("  db:        {db}");
        println!();
    }

    let census = load_census(&census_path)?;
    let store = SimStore::open(db)?;
    let mut engine = SimEngine::build(scenario_id.clone(), config, store)?;
    let summary = engine.run(&census)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&engine, &summary)?;
    }
    Ok(())
}

fn print_summary(engine: &SimEngine, summary: &RunSummary) -> Result<()> {
    println!("=== RUN SUMMARY ===");
    println!("  scenario:        {}", summary.scenario_id);
    println!("  seed:            {}", summary.seed);
    println!("  quality issues:  {}", summary.data_quality_issues);
    println!();
    println!("  year | active | hires | exp terms | nh terms | particip | avg rate");
    for y in &summary.years {
        println!(
            "  {} | {:>6} | {:>5} | {:>9} | {:>8} | {:>7.1}% | {:>7.2}%",
            y.simulation_year,
            y.active,
            y.new_hires,
            y.experienced_terminations,
            y.new_hire_terminations,
            y.participation_rate * 100.0,
            y.average_deferral_rate * 100.0,
        );
    }

    let Some(last) = summary.years.last() else {
        return Ok(());
    };
    let rows = engine.store().snapshot_for_year(
        &summary.scenario_id,
        last.simulation_year,
        Some(EmploymentStatus::Active),
    )?;
    println!();
    println!("=== DEFERRAL DISTRIBUTION ({}) ===", last.simulation_year);
    let buckets = deferral_distribution(&rows);
    if buckets.is_empty() {
        println!("  (no participants)");
    }
    for b in buckets {
        println!("  {:>6} | {:>6} | {:>5.1}%", b.label, b.employees, b.percentage);
    }
    Ok(())
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == name).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], name: &str, default: T) -> T {
    flag(args, name).and_then(|v| v.parse().ok()).unwrap_or(default)
}
