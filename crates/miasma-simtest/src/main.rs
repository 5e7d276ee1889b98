//! Miasma Headless Simulation Harness
//!
//! Runs an epidemic on a terrain map and re-checks the engine's guarantees
//! on the live run. No viewer, no plotting.
//!
//! Usage:
//!   cargo run -p miasma-simtest
//!   cargo run -p miasma-simtest -- --config configs/contact.toml --verbose
//!   cargo run -p miasma-simtest -- --map maps/clinic.map --ticks 200 --json

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use miasma_core::generation::standard_ward;
use miasma_core::prelude::*;
use miasma_logic::constants::droplets::CONCENTRATION;
use miasma_logic::{PathPlanner, TerrainBuilder, TerrainClass};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = include_str!("../../../configs/default.toml");

/// Ticks re-run with the same seed for the determinism check.
const REPLAY_TICKS: u64 = 50;

// ── Configuration ───────────────────────────────────────────────────────

/// Command-line arguments for the harness.
#[derive(Parser)]
#[command(name = "miasma-simtest", version, about = "Headless epidemic simulation harness")]
struct Cli {
    /// Path to a TOML run configuration (built-in default when absent).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of ticks to run.
    #[arg(short, long)]
    ticks: Option<u64>,
    /// RNG seed.
    #[arg(short, long)]
    seed: Option<u64>,
    /// ASCII map file (`.` open, `#` wall, `S` start, `T` target, `Q` quarantine).
    #[arg(short, long)]
    map: Option<PathBuf>,
    /// Print the full report as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Print every tick and every check.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct RunFile {
    simulation: SimConfig,
    run: RunConfig,
}

#[derive(Debug, Deserialize)]
struct RunConfig {
    ticks: u64,
    #[serde(default)]
    map: Option<PathBuf>,
}

fn load_run_file(path: Option<&Path>) -> Result<RunFile, Box<dyn Error>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read config '{}': {e}", path.display()))?;
            let file = toml::from_str(&content)
                .map_err(|e| format!("failed to parse config '{}': {e}", path.display()))?;
            log::info!("loaded config from '{}'", path.display());
            Ok(file)
        }
        None => {
            log::info!("no config file provided, using built-in default");
            Ok(toml::from_str(DEFAULT_CONFIG)?)
        }
    }
}

fn load_map(path: Option<&Path>) -> Result<TerrainMap, Box<dyn Error>> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read map '{}': {e}", path.display()))?;
            Ok(TerrainMap::from_ascii(&text)?)
        }
        None => Ok(standard_ward(true)?),
    }
}

// ── Report ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: String) -> Self {
        Self {
            name: name.into(),
            passed,
            detail,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a SimConfig,
    map_size: (usize, usize),
    ticks: &'a [TickSummary],
    checks: &'a [TestResult],
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();

    let mut file = load_run_file(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        file.simulation.seed = Some(seed);
    }
    let ticks = cli.ticks.unwrap_or(file.run.ticks);
    let map_path = cli.map.or(file.run.map);
    let config = file.simulation;

    let map = load_map(map_path.as_deref())?;
    let map_size = map.shape();

    let mut results = Vec::new();

    // 1. Terrain checks
    results.extend(validate_terrain(&map));

    // 2. Live run
    let mut engine = SimulationEngine::new(map.clone(), config.clone())?;
    let (curve, live) = run_checked(&mut engine, ticks, cli.verbose && !cli.json);
    results.extend(live);

    // 3. Replay with the same seed
    results.extend(validate_replay(&map, &config, &curve));

    // 4. Reference scenario on an open field
    results.extend(validate_open_field()?);

    if cli.json {
        let report = Report {
            config: &config,
            map_size,
            ticks: &curve,
            checks: &results,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_curve(&curve, cli.verbose);
        print_results(&results, cli.verbose);
    }

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

// ── 1. Terrain ──────────────────────────────────────────────────────────

fn validate_terrain(map: &TerrainMap) -> Vec<TestResult> {
    let mut results = Vec::new();
    let planner = PathPlanner::new(HeuristicKind::Euclidean);
    let start = map.zone(Zone::Start)[0];

    let to_self = planner.find_path(map.graph(), start, start);
    results.push(TestResult::new(
        "route_to_self_empty",
        matches!(&to_self, Ok(route) if route.is_empty()),
        format!("{start} -> {start}: {to_self:?}"),
    ));

    let mut walled = 0;
    let mut unreachable = 0;
    for target in map.zone(Zone::Target) {
        match planner.find_path(map.graph(), start, *target) {
            Ok(route) if route.iter().any(|c| map.is_wall(*c)) => walled += 1,
            Ok(_) => {}
            Err(_) => unreachable += 1,
        }
    }
    results.push(TestResult::new(
        "targets_reachable",
        unreachable == 0,
        format!(
            "{} target cells, {unreachable} unreachable, {walled} only through walls",
            map.zone(Zone::Target).len()
        ),
    ));

    results.push(TestResult::new(
        "zones_enterable",
        [Zone::Start, Zone::Target, Zone::Open]
            .iter()
            .all(|z| map.zone(*z).iter().all(|c| map.can_enter_cell(*c))),
        format!(
            "start {}, target {}, open {}, quarantine {}",
            map.zone(Zone::Start).len(),
            map.zone(Zone::Target).len(),
            map.zone(Zone::Open).len(),
            map.zone(Zone::Quarantine).len()
        ),
    ));

    results
}

// ── 2. Live run ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Violations {
    partition: Vec<u64>,
    transitions: Vec<String>,
    placement: Vec<String>,
    air: Vec<u64>,
}

fn run_checked(
    engine: &mut SimulationEngine,
    ticks: u64,
    echo: bool,
) -> (Vec<TickSummary>, Vec<TestResult>) {
    let population = engine.population_size();
    let mut curve = Vec::with_capacity(ticks as usize);
    let mut violations = Violations::default();
    let mut before: Vec<HealthStatus> = engine.agents().iter().map(|a| a.status).collect();

    for _ in 0..ticks {
        let summary = engine.model_step();
        if echo {
            let c = summary.census;
            println!(
                "  tick {:>5}  S {:>5}  I {:>5}  Q {:>5}  R {:>5}",
                summary.tick, c.susceptible, c.infected, c.quarantined, c.recovered
            );
        }

        let listed = engine.list_susceptible().len()
            + engine.list_infected().len()
            + engine.list_recovered().len();
        if listed != population {
            violations.partition.push(summary.tick);
        }

        let agents = engine.agents();
        let map = engine.terrain();
        for (agent, from) in agents.iter().zip(&before) {
            if *from != agent.status && !from.can_transition_to(agent.status) {
                violations.transitions.push(format!(
                    "tick {} agent {}: {:?} -> {:?}",
                    summary.tick, agent.id, from, agent.status
                ));
            }
            let misplaced = map.is_wall(agent.cell)
                || (agent.status == HealthStatus::Susceptible && !map.can_enter_cell(agent.cell));
            if misplaced {
                violations.placement.push(format!(
                    "tick {} agent {} ({:?}) at {}",
                    summary.tick, agent.id, agent.status, agent.cell
                ));
            }
        }
        if engine.miasma().peak() > CONCENTRATION >> 2 {
            violations.air.push(summary.tick);
        }

        before = agents.iter().map(|a| a.status).collect();
        curve.push(summary);
    }
    log::info!("ran {ticks} ticks");

    let results = vec![
        TestResult::new(
            "lists_partition_population",
            violations.partition.is_empty(),
            summarize_ticks(&violations.partition, population),
        ),
        TestResult::new(
            "legal_transitions",
            violations.transitions.is_empty(),
            summarize_lines(&violations.transitions, "every status change is legal"),
        ),
        TestResult::new(
            "terrain_legal_positions",
            violations.placement.is_empty(),
            summarize_lines(&violations.placement, "no agent in a wall or off-limits"),
        ),
        TestResult::new(
            "air_ventilated",
            violations.air.is_empty(),
            format!(
                "peak after ventilation never above {:#04x}; {} bad ticks",
                CONCENTRATION >> 2,
                violations.air.len()
            ),
        ),
    ];
    (curve, results)
}

fn summarize_ticks(ticks: &[u64], population: usize) -> String {
    match ticks.first() {
        None => format!("{population} agents listed exactly once every tick"),
        Some(first) => format!("{} bad ticks, first at {first}", ticks.len()),
    }
}

fn summarize_lines(lines: &[String], ok: &str) -> String {
    match lines.first() {
        None => ok.to_string(),
        Some(first) => format!("{} violations, first: {first}", lines.len()),
    }
}

// ── 3. Replay ───────────────────────────────────────────────────────────

fn validate_replay(map: &TerrainMap, config: &SimConfig, curve: &[TickSummary]) -> Vec<TestResult> {
    let Some(seed) = config.seed else {
        return vec![TestResult::new(
            "seeded_replay",
            true,
            "skipped: run is entropy-seeded".into(),
        )];
    };
    let ticks = REPLAY_TICKS.min(curve.len() as u64);
    let replay = SimulationEngine::new(map.clone(), config.clone()).map(|mut e| e.run(ticks));
    let passed = matches!(&replay, Ok(r) if r.as_slice() == &curve[..ticks as usize]);
    vec![TestResult::new(
        "seeded_replay",
        passed,
        format!("seed {seed}, {ticks} ticks replayed"),
    )]
}

// ── 4. Open field ───────────────────────────────────────────────────────

fn validate_open_field() -> Result<Vec<TestResult>, Box<dyn Error>> {
    let parts = TerrainBuilder::new(50, 50)?
        .zone(TerrainClass::Start, 0, 0, 10, 10)?
        .zone(TerrainClass::Target, 40, 40, 50, 50)?
        .build()?;
    let map = TerrainMap::from_parts(parts)?;
    let config = SimConfig::new(400, 8, 0.8, 0.0).with_seed(0x5EED);
    let mut engine = SimulationEngine::new(map, config)?;

    let first = engine.model_step();
    let carriers_kept = engine.agents()[..8]
        .iter()
        .all(|a| a.status == HealthStatus::Infected);

    let mut susceptible = first.census.susceptible;
    let mut rises = 0;
    for summary in engine.run(100) {
        if summary.census.susceptible > susceptible {
            rises += 1;
        }
        susceptible = summary.census.susceptible;
    }

    Ok(vec![
        TestResult::new(
            "open_field_carriers_stay_infected",
            carriers_kept && first.census.susceptible <= 392,
            format!("after 1 tick: {} susceptible", first.census.susceptible),
        ),
        TestResult::new(
            "open_field_susceptible_non_increasing",
            rises == 0,
            format!("{susceptible} susceptible after 101 ticks, {rises} rises"),
        ),
    ])
}

// ── Output ──────────────────────────────────────────────────────────────

fn print_curve(curve: &[TickSummary], verbose: bool) {
    println!("=== Miasma Simulation Harness ===\n");
    if verbose {
        // Already echoed tick by tick
        println!();
    } else {
        let stride = (curve.len() / 20).max(1);
        println!("  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}", "tick", "S", "I", "Q", "R");
        for summary in curve.iter().step_by(stride) {
            let c = summary.census;
            println!(
                "  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}",
                summary.tick, c.susceptible, c.infected, c.quarantined, c.recovered
            );
        }
    }

    let infections: u32 = curve.iter().map(|s| s.new_infections).sum();
    let recoveries: u32 = curve.iter().map(|s| s.recoveries).sum();
    let quarantines: u32 = curve.iter().map(|s| s.quarantines).sum();
    if let Some(peak) = curve.iter().max_by_key(|s| s.census.ill()) {
        println!(
            "\n  peak: {} ill at tick {}; totals: {infections} infections, {recoveries} recoveries, {quarantines} quarantines",
            peak.census.ill(),
            peak.tick,
        );
    }
}

fn print_results(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
}
