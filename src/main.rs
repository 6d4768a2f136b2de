//! Noah Triage
//!
//! Command-line harness that feeds canned or synthetic patients through the
//! triage engine and prints what the ER dashboard would receive.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::info;

use noah_triage::config::load_config;
use noah_triage::logging::init_tracing;
use noah_triage::simulation::{Condition, Scenario};
use noah_triage::{Config, PatientRegistry};

#[derive(Parser)]
#[command(name = "noah-triage", version, about = "Pre-arrival triage engine harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one canned patient to arrival and print every output as JSON
    Scenario {
        /// stemi, stroke, trauma, sepsis or stable
        name: Scenario,
    },
    /// Drive several synthetic ambulances until every patient has arrived
    Simulate {
        #[arg(long, default_value_t = 3)]
        ambulances: usize,
        /// Seed for reproducible vitals
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    match cli.command {
        Command::Scenario { name } => run_scenario(config, name),
        Command::Simulate { ambulances, seed } => run_simulation(config, ambulances, seed),
    }
}

fn run_scenario(config: Config, scenario: Scenario) -> Result<()> {
    let registry = PatientRegistry::new(config);
    let case = scenario.case().stamped(Utc::now(), Duration::seconds(30));
    let patient_id = format!("P-{}", scenario.name().to_uppercase());

    registry.register(&patient_id, "AMB-001", case.info, Some(case.eta_minutes))?;
    for treatment in case.treatments {
        registry.record_treatment(&patient_id, treatment)?;
    }
    registry.ingest_symptoms(&patient_id, case.symptoms)?;
    let mut assessment = None;
    for sample in case.vitals {
        assessment = Some(registry.ingest_vitals(&patient_id, sample)?);
    }
    let handoff = registry.mark_arrived(&patient_id)?;

    let output = json!({
        "scenario": scenario.name(),
        "assessment": assessment,
        "handoff": &*handoff,
        "handoff_sheet": handoff.to_string(),
        "forecast": registry.forecast(),
        "shortfalls": registry.shortfalls(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_simulation(config: Config, ambulances: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let registry = PatientRegistry::new(config);

    let mut fleet = Vec::with_capacity(ambulances);
    for i in 0..ambulances {
        let condition = Condition::ALL[i % Condition::ALL.len()];
        let patient_id = format!("P-{:03}", i + 1);
        let eta: u32 = rng.gen_range(3..=8);
        registry.register(
            &patient_id,
            &format!("AMB-{:03}", i + 1),
            Default::default(),
            Some(eta),
        )?;
        registry.ingest_symptoms(&patient_id, condition.symptoms())?;
        info!(%patient_id, %condition, eta, "Ambulance dispatched");
        fleet.push((patient_id, condition, eta));
    }

    let start = Utc::now();
    let mut minute = 0;
    while fleet.iter().any(|(_, _, eta)| *eta > 0) {
        minute += 1;
        let now = start + Duration::minutes(minute);
        for (patient_id, condition, eta) in fleet.iter_mut().filter(|(_, _, eta)| *eta > 0) {
            registry.ingest_vitals(patient_id, condition.sample(&mut rng, now))?;
            *eta -= 1;
            if let Some(handoff) = registry.update_eta(patient_id, *eta)? {
                println!("{}\n", handoff);
            }
        }
    }

    let forecast = registry.forecast();
    let shortfalls = registry.shortfalls();
    let capacity = registry.config().capacity.clone();

    let mut roster = Vec::with_capacity(registry.len());
    for patient_id in registry.patient_ids() {
        let record = registry.discharge(&patient_id)?;
        roster.push(json!({
            "patient_id": record.patient_id,
            "ambulance_id": record.ambulance_id,
            "registered_at": record.registered_at,
            "severity": record.assessment().map(|assessment| assessment.severity),
        }));
    }

    let output = json!({
        "roster": roster,
        "capacity": capacity,
        "forecast": forecast,
        "shortfalls": shortfalls,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
