//! feasibility-runner: headless runner for the housing feasibility engine.
//!
//! Usage:
//!   feasibility-runner --project demos/project.json --scenarios demos/scenarios.json
//!   feasibility-runner --project p.json --scenarios s.json --investment i.json --db run.db
//!   feasibility-runner --ipc-mode          (one JSON request per stdin line)

use anyhow::{Context, Result};
use feasibility_core::{
    engine::FeasibilityEngine,
    investment::InvestmentScenario,
    project::Project,
    request::{handle_request, EngineRequest},
    scenario::ScenarioRecord,
    store::{ScenarioRepository, SqliteStore},
};
use std::env;
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let growth = parse_arg(&args, "--growth", 2.5f64);
    let horizon = parse_arg(&args, "--horizon", 10u32);
    let months = parse_arg(&args, "--months", 24u32);

    let engine = FeasibilityEngine::build(db, data_dir)?;

    if ipc_mode {
        return run_ipc_loop(&engine);
    }

    let project_path = flag_value(&args, "--project").unwrap_or("demos/project.json");
    let scenarios_path = flag_value(&args, "--scenarios").unwrap_or("demos/scenarios.json");
    let investment_path = flag_value(&args, "--investment");

    println!("Housing feasibility runner");
    println!("  started:    {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  project:    {project_path}");
    println!("  scenarios:  {scenarios_path}");
    println!("  db:         {db}");
    println!("  data_dir:   {data_dir}");
    println!();

    let project: Project = read_json(project_path)?;
    let scenarios: Vec<ScenarioRecord> = read_json(scenarios_path)?;
    let investment: Option<InvestmentScenario> = investment_path
        .map(read_json::<InvestmentScenario>)
        .transpose()?;

    engine.store().put_project(&project)?;
    for scenario in &scenarios {
        engine.store().put_scenario(scenario)?;
    }

    print_summary(&engine, &project, investment.as_ref(), growth, horizon, months)
}

fn run_ipc_loop(engine: &FeasibilityEngine<SqliteStore>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    log::info!("IPC mode: one JSON request per line on stdin");

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let request: EngineRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "type": "error", "message": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        let response = handle_request(&engine.assumptions, &engine.rules, request);
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(
    engine: &FeasibilityEngine<SqliteStore>,
    project: &Project,
    investment: Option<&InvestmentScenario>,
    growth: f64,
    horizon: u32,
    months: u32,
) -> Result<()> {
    let comparison = engine.compare_scenarios(&project.id)?;

    println!("=== SCENARIOS: {} ===", project.name);
    for row in &comparison.rows {
        println!(
            "  {:<24} | {:>4} units | {:>5} people | cost {:>12.0} | {:>9.0}/unit | {:?} | {:?} | infra {:?}",
            row.name,
            row.total_units,
            row.estimated_population,
            row.total_project_cost,
            row.cost_per_unit,
            row.budget_status,
            row.density_class,
            row.infrastructure_status
        );
    }
    println!("  lowest cost/unit:   {}", comparison.lowest_cost_per_unit.as_deref().unwrap_or("-"));
    println!("  lowest cost/person: {}", comparison.lowest_cost_per_person.as_deref().unwrap_or("-"));
    println!("  most people served: {}", comparison.highest_population.as_deref().unwrap_or("-"));

    println!();
    println!("=== DEMAND FORECAST ({growth}%/yr, {horizon} years) ===");
    match engine.forecast_demand(&project.id, growth, horizon) {
        Ok(forecast) => {
            for p in &forecast.projections {
                println!(
                    "  year {:>2} | population {:>9} | demand {:>7} units | +{:>6} over today",
                    p.year, p.population, p.housing_demand, p.surplus_shortfall
                );
            }
        }
        Err(e) => println!("  (skipped: {e})"),
    }

    for row in &comparison.rows {
        println!();
        println!("=== {} ===", row.name);

        let timeline = engine.build_timeline(&row.scenario_id, months)?;
        for phase in &timeline.phases {
            println!(
                "  {:<22} months {:>2}-{:<2} | cost {:>12.0} | {:>4} worker-months | {}",
                phase.name, phase.start_month, phase.end_month, phase.cost, phase.labor_units, phase.milestone
            );
        }

        let compliance = engine.check_compliance(&row.scenario_id)?;
        println!(
            "  compliance: {:.0}% ({}/{} rules), remediation {:.0}",
            compliance.compliance_percentage,
            compliance.compliant_rules,
            compliance.total_rules,
            compliance.total_remediate_cost
        );
        for rec in &compliance.recommendations {
            println!("    [{:?}] {} (~{:.0})", rec.priority, rec.message, rec.estimated_cost);
        }

        if let Some(investment) = investment {
            let returns = engine.analyze_investment(&row.scenario_id, investment)?;
            println!(
                "  returns: profit {:.0} | ROI {:.1}% | IRR {:.1}% | payback {} | subsidy {:.0}",
                returns.net_profit,
                returns.roi_percentage,
                returns.irr_percentage,
                returns
                    .payback_month
                    .map(|m| format!("month {m}"))
                    .unwrap_or_else(|| "never".into()),
                returns.subsidy_required
            );
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Cannot parse {path}"))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
