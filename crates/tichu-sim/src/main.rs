use std::path::PathBuf;

use clap::Parser;

use tichu_sim::config::{ResolvedOutputs, SimConfig};
use tichu_sim::logging::init_logging;
use tichu_sim::runner::SimRunner;

/// Self-play harness for the Tichu rule engine.
#[derive(Debug, Parser)]
#[command(
    name = "tichu-sim",
    author,
    version,
    about = "Deterministic multi-room Tichu self-play"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "sim/sim.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of concurrent rooms.
    #[arg(long, value_name = "ROOMS")]
    rooms: Option<usize>,

    /// Override the number of turns played in each room.
    #[arg(long, value_name = "TURNS")]
    turns: Option<usize>,

    /// Override the master RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no rooms are opened).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = SimConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(rooms) = cli.rooms {
        config.rooms = rooms;
    }

    if let Some(turns) = cli.turns {
        config.turns = turns;
    }

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let rooms = config.rooms;
    let turns = config.turns;

    println!(
        "Loaded configuration '{run_id}' with {rooms} room{} ({turns} turns each)",
        if rooms == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: simulation skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = SimRunner::new(config, outputs);
    let summary = runner.run()?;

    println!(
        "Simulation complete for '{run_id}': {} rooms × {} turns → {} rows at {}",
        summary.rooms,
        summary.turns_per_room,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if summary.rejections > 0 {
        println!("  Refused agent intents: {}", summary.rejections);
    }
    for (room, [north_south, east_west]) in &summary.final_scores {
        println!("  {room}: north/south {north_south}, east/west {east_west}");
    }
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
