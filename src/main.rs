// src/main.rs
//
// Dry inspection of the configured search: builds the seed and initial
// population, turns every individual into a scenario, and writes one JSON
// line per scenario. Running the search itself needs a simulator behind
// `simulation::Simulator`, which lives outside this binary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scenario_search::error::ScenarioError;
use scenario_search::search::{CarFollowingProblem, ProceduralRoadProblem, SearchProblem};
use scenario_search::simulation::{Scenario, ScenarioKind};
use scenario_search::trajectory::speed_profile;
use scenario_search::Config;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Serialize)]
struct ScenarioRecord<'a, I: Serialize> {
    scenario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ScenarioKind>,
    individual: &'a I,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    road_nodes: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lead_speeds_kmh: Vec<f64>,
}

#[derive(Debug, Default)]
struct InspectionStats {
    total: usize,
    valid: usize,
}

fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = if Path::new(&path).exists() {
        Some(Config::load(&path)?)
    } else {
        None
    };
    let config_found = config.is_some();
    let config = config.unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scenario_search={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚦 Scenario search inspection starting");
    if config_found {
        info!("✓ Configuration loaded from {}", path);
    } else {
        warn!("No configuration at {}, using defaults", path);
    }
    info!(
        "Search: {:?}, budget={}, population={}, seed={:?}",
        config.search.strategy, config.search.budget, config.search.population_size, config.search.seed
    );

    let mut rng = match config.search.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = File::create(&config.output.report_path)
        .with_context(|| format!("creating report {}", config.output.report_path))?;
    let mut out = BufWriter::new(report);

    info!("🚗 Car-following scenarios");
    let car_following = CarFollowingProblem::new(config.car_following.clone(), config.simulation.clone())
        .context("building car-following problem")?;
    let cf_stats = inspect(&car_following, config.search.population_size, &mut rng, &mut out)?;

    info!("🛣️  Procedural-road scenarios");
    let procedural = ProceduralRoadProblem::new(
        config.procedural_road.clone(),
        config.simulation.clone(),
        config.search.max_road_attempts,
    );
    let pr_stats = inspect(&procedural, config.search.population_size, &mut rng, &mut out)?;

    out.flush().context("flushing report")?;

    info!("\n✓ Inspection complete");
    info!("  Car-following: {}/{} valid", cf_stats.valid, cf_stats.total);
    info!("  Procedural roads: {}/{} valid", pr_stats.valid, pr_stats.total);
    info!("  📄 Report written to {}", config.output.report_path);
    Ok(())
}

/// Seed first, then the initial population the genetic search would start from.
fn inspect<P: SearchProblem>(
    problem: &P,
    population_size: usize,
    rng: &mut StdRng,
    out: &mut impl Write,
) -> Result<InspectionStats> {
    let mut individuals = vec![problem.seed()];
    individuals.extend(problem.initial_population(population_size, rng));

    let mut stats = InspectionStats::default();
    for (index, individual) in individuals.iter().enumerate() {
        let name = format!("{}_{}", problem.scenario_prefix(), index);
        let built = problem.build_scenario(individual, name.clone());
        let record = record_for(name, individual, &built);

        stats.total += 1;
        match &built {
            Ok(scenario) => {
                stats.valid += 1;
                info!(
                    "  ✅ {}: {} road nodes, target ({:.1}, {:.1})",
                    scenario.name,
                    scenario.road_nodes.len(),
                    scenario.target.x,
                    scenario.target.y
                );
                if !record.lead_speeds_kmh.is_empty() {
                    info!("     lead speeds (km/h): {:.1?}", record.lead_speeds_kmh);
                }
            }
            Err(e) => warn!("  ⚠️  {}: {}", record.scenario, e),
        }

        let line = serde_json::to_string(&record).context("serializing scenario record")?;
        writeln!(out, "{}", line).context("writing scenario record")?;
    }
    Ok(stats)
}

fn record_for<'a, I: Serialize>(
    name: String,
    individual: &'a I,
    built: &Result<Scenario, ScenarioError>,
) -> ScenarioRecord<'a, I> {
    match built {
        Ok(scenario) => ScenarioRecord {
            scenario: name,
            kind: Some(scenario.kind),
            individual,
            valid: true,
            reason: None,
            road_nodes: Some(scenario.road_nodes.len()),
            lead_speeds_kmh: speed_profile(&scenario.lead_script),
        },
        Err(e) => ScenarioRecord {
            scenario: name,
            kind: None,
            individual,
            valid: false,
            reason: Some(e.to_string()),
            road_nodes: None,
            lead_speeds_kmh: Vec::new(),
        },
    }
}
