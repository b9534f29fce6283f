use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use evosim_config::load_world_config_from_path;
use evosim_core::{decode_gene, prune_dead_ends, Brain, Simulation, ACTION_COUNT, SENSOR_COUNT};
use evosim_types::{
    Action, Gene, GenerationSummary, SelectionMode, Sensor, SinkKind, SourceKind, WorldConfig,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

mod log;

use log::{read_records, write_snapshot, GenerationLog};

#[derive(Parser, Debug)]
#[command(name = "evosim")]
#[command(about = "Evolutionary neural-network creature simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command that builds a simulation. Each one
/// overrides the matching field of the loaded config.
#[derive(clap::Args, Debug, Clone)]
struct WorldArgs {
    /// TOML world config; the built-in default when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    scenario: Option<Scenario>,
    /// Enables the strike action.
    #[arg(long, default_value_t = false)]
    kill: bool,
    #[arg(long)]
    population: Option<u32>,
    #[arg(long)]
    steps: Option<u32>,
    #[arg(long)]
    genome_length: Option<u32>,
    #[arg(long)]
    mutation_rate: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run generations and log each one to an output directory.
    Run {
        #[command(flatten)]
        world: WorldArgs,
        /// Defaults to the config's max_generations.
        #[arg(long)]
        generations: Option<u32>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Save a world snapshot every N generations and after the last one.
        #[arg(long)]
        snapshot_interval: Option<u32>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Write a JSON Lines world snapshot after every step, for playback.
    Export {
        #[command(flatten)]
        world: WorldArgs,
        #[arg(long, default_value_t = 1)]
        generations: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// Summarize a generations.jsonl log from an earlier run.
    Replay {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the connections encoded by raw genes (decimal or 0x-prefixed hex).
    Decode {
        #[arg(required = true)]
        genes: Vec<String>,
        #[arg(long, default_value_t = 1)]
        internal_neurons: u32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    East,
    West,
    Strips,
    Corners,
    Center,
    Radiation,
    /// Center disk with killing enabled.
    Kill,
}

impl Scenario {
    fn selection_mode(self) -> SelectionMode {
        match self {
            Scenario::East => SelectionMode::East,
            Scenario::West => SelectionMode::West,
            Scenario::Strips => SelectionMode::edge_strips(),
            Scenario::Corners => SelectionMode::corners(),
            Scenario::Center | Scenario::Kill => SelectionMode::center_disk(),
            Scenario::Radiation => SelectionMode::radiation(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    scenario: String,
    generations: u32,
    elapsed_ms: u128,
    out_dir: PathBuf,
    last: Option<GenerationSummary>,
    best_survivor_connections: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "evosim_cli=info,evosim_core=info".to_owned()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            world,
            generations,
            out_dir,
            snapshot_interval,
            format,
        } => run_command(world, generations, out_dir, snapshot_interval, format),
        Commands::Export {
            world,
            generations,
            out,
        } => export_command(world, generations, out),
        Commands::Replay { input } => replay_command(input),
        Commands::Decode {
            genes,
            internal_neurons,
        } => decode_command(genes, internal_neurons),
    }
}

fn run_command(
    world: WorldArgs,
    generations: Option<u32>,
    out_dir: Option<PathBuf>,
    snapshot_interval: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let cfg = build_config(&world)?;
    let generations = generations.unwrap_or(cfg.max_generations);
    let mut sim = Simulation::from_config(cfg)?;
    let scenario = sim.selection_mode().name().to_owned();
    let out_dir = out_dir.unwrap_or_else(|| default_output_dir(&scenario, sim.seed()));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed creating output directory {}", out_dir.display()))?;

    info!(
        seed = sim.seed(),
        scenario = %scenario,
        generations,
        population = sim.config().population,
        out_dir = %out_dir.display(),
        "starting run"
    );

    let started = Instant::now();
    let mut log = GenerationLog::create(&out_dir)?;
    let mut last = None;
    for run_idx in 0..generations {
        let report = sim.run_generation();
        log.append(&report)?;
        let is_last = run_idx + 1 == generations;
        if should_snapshot(snapshot_interval, report.summary.generation, is_last) {
            let path = write_snapshot(&out_dir, &report.snapshot)?;
            debug!(
                generation = report.summary.generation,
                path = %path.display(),
                "saved snapshot"
            );
        }
        let summary = &report.summary;
        info!(
            generation = summary.generation,
            survivors = summary.survivors,
            survival_pct = %format!("{:.1}", summary.survival_pct),
            diversity = %format!("{:.3}", summary.diversity),
            murders = summary.murders,
            "generation"
        );
        last = Some(report);
    }
    log.flush()?;

    let best = last.as_ref().and_then(|report| report.best_survivor.as_ref());
    if let Some(best) = best {
        let brain = Brain::from_connections(
            &best.connections,
            sim.config().max_internal_neurons as usize,
        );
        info!(id = best.id.0, "best survivor\n{}", brain.summary());
    }

    let summary = RunSummary {
        seed: sim.seed(),
        scenario,
        generations,
        elapsed_ms: started.elapsed().as_millis(),
        out_dir,
        best_survivor_connections: best.map(|best| best.connections.len()),
        last: last.map(|report| report.summary),
    };
    print_run_summary(&summary, format)
}

fn print_run_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Pretty => {
            let last = match &summary.last {
                Some(last) => format!(
                    "last_generation={} survivors={}/{} survival_pct={:.1} diversity={:.3} murders={}",
                    last.generation,
                    last.survivors,
                    last.population,
                    last.survival_pct,
                    last.diversity,
                    last.murders
                ),
                None => "no generations run".to_owned(),
            };
            println!(
                "seed={} scenario={} generations={} elapsed_ms={} {} log={}",
                summary.seed,
                summary.scenario,
                summary.generations,
                summary.elapsed_ms,
                last,
                summary.out_dir.display()
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
    }
    Ok(())
}

fn export_command(world: WorldArgs, generations: u32, out: PathBuf) -> Result<()> {
    let cfg = build_config(&world)?;
    let mut sim = Simulation::from_config(cfg)?;
    let lines = sim.export_steps_jsonl(generations)?;

    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating output directory {}", parent.display()))?;
    }
    fs::write(&out, lines.join("\n"))
        .with_context(|| format!("failed writing export to {}", out.display()))?;
    println!(
        "exported {} snapshots (seed {}) to {}",
        lines.len(),
        sim.seed(),
        out.display()
    );
    Ok(())
}

fn replay_command(input: PathBuf) -> Result<()> {
    let content = fs::read_to_string(&input)
        .with_context(|| format!("failed to read replay input {}", input.display()))?;
    let records = read_records(&content)
        .with_context(|| format!("failed to parse replay input {}", input.display()))?;

    let last = records.last().context("replay input is empty")?;
    let peak = records
        .iter()
        .map(|record| record.summary.survival_pct)
        .fold(0.0_f64, f64::max);

    #[derive(Serialize)]
    struct ReplaySummary<'a> {
        generations: usize,
        peak_survival_pct: f64,
        last: &'a GenerationSummary,
        best_survivor_genome: Option<Vec<u32>>,
    }

    let summary = ReplaySummary {
        generations: records.len(),
        peak_survival_pct: peak,
        last: &last.summary,
        best_survivor_genome: last
            .best_survivor
            .as_ref()
            .map(|best| best.genome.to_raw()),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn decode_command(genes: Vec<String>, internal_neurons: u32) -> Result<()> {
    let internal_count = internal_neurons.max(1) as usize;
    let decoded = genes
        .iter()
        .map(|raw| {
            parse_gene(raw).map(|gene| decode_gene(gene, SENSOR_COUNT, ACTION_COUNT, internal_count))
        })
        .collect::<Result<Vec<_>>>()?;

    for (raw, connection) in genes.iter().zip(&decoded) {
        let source = match connection.source_kind {
            SourceKind::Sensor => Sensor::ALL[connection.source_id as usize].label().to_owned(),
            SourceKind::Internal => format!("internal_{}", connection.source_id),
        };
        let sink = match connection.sink_kind {
            SinkKind::Action => Action::ALL[connection.sink_id as usize].label().to_owned(),
            SinkKind::Internal => format!("internal_{}", connection.sink_id),
        };
        println!("{raw}: {source} -> {sink} ({:+.4})", connection.weight);
    }

    let kept = prune_dead_ends(&decoded, internal_count);
    let brain = Brain::from_connections(&kept, internal_count);
    println!(
        "{} of {} connections survive pruning",
        kept.len(),
        decoded.len()
    );
    print!("{}", brain.summary());
    Ok(())
}

fn should_snapshot(interval: Option<u32>, generation: u32, is_last: bool) -> bool {
    match interval {
        Some(0) | None => false,
        Some(interval) => is_last || generation % interval == 0,
    }
}

fn parse_gene(raw: &str) -> Result<Gene> {
    let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse::<u32>(),
    };
    value
        .map(Gene)
        .with_context(|| format!("`{raw}` is not a 32-bit gene"))
}

fn build_config(args: &WorldArgs) -> Result<WorldConfig> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    if let Some(scenario) = args.scenario {
        cfg.selection = scenario.selection_mode();
        if matches!(scenario, Scenario::Kill) {
            cfg.kill_enabled = true;
        }
    }
    if args.kill {
        cfg.kill_enabled = true;
    }
    if let Some(population) = args.population {
        cfg.population = population;
    }
    if let Some(steps) = args.steps {
        cfg.steps_per_generation = steps;
    }
    if let Some(genome_length) = args.genome_length {
        cfg.genome_length = genome_length;
    }
    if let Some(mutation_rate) = args.mutation_rate {
        cfg.mutation_rate = mutation_rate;
    }
    Ok(cfg)
}

fn load_config(path: Option<&Path>) -> Result<WorldConfig> {
    match path {
        Some(path) => load_world_config_from_path(path),
        None => Ok(WorldConfig::default()),
    }
}

fn default_output_dir(scenario: &str, seed: u64) -> PathBuf {
    let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from(format!("output/{scenario}_{timestamp}_seed_{seed}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genes_parse_from_hex_or_decimal() {
        assert_eq!(parse_gene("0x8000FFFF").expect("hex gene"), Gene(0x8000_FFFF));
        assert_eq!(parse_gene("0Xff").expect("upper-case prefix"), Gene(255));
        assert_eq!(parse_gene("4294967295").expect("decimal gene"), Gene(u32::MAX));
    }

    #[test]
    fn genes_wider_than_32_bits_are_rejected() {
        assert!(parse_gene("4294967296").is_err());
        assert!(parse_gene("0x1FFFFFFFF").is_err());
        assert!(parse_gene("-1").is_err());
        assert!(parse_gene("0xnope").is_err());
    }

    #[test]
    fn snapshots_follow_the_interval_and_always_cover_the_last_generation() {
        let taken: Vec<u32> = (0..6)
            .filter(|&generation| should_snapshot(Some(3), generation, generation == 5))
            .collect();
        assert_eq!(taken, vec![0, 3, 5]);

        assert!(!should_snapshot(None, 0, true));
        assert!(!should_snapshot(Some(0), 4, true));
    }
}
