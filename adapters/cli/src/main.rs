#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs one fleet turn against a match snapshot.

mod config;
mod snapshot_transfer;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use orbital_conquest_core::TurnSnapshot;
use orbital_conquest_system_fleet::FleetControl;
use orbital_conquest_world::{self as world, World};

/// Plans one turn of fleet commands for a captured match snapshot.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file containing a turn snapshot.
    #[arg(conflicts_with = "transfer")]
    snapshot: Option<PathBuf>,

    /// Single-line `fleet:v1:<W>x<H>:<payload>` transfer string.
    #[arg(short, long)]
    transfer: Option<String>,

    /// TOML file overriding the planner configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the snapshot as a transfer string instead of planning.
    #[arg(long)]
    encode: bool,
}

/// Entry point for the Orbital Conquest command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let snapshot = load_snapshot(&args)?;
    if args.encode {
        println!("{}", snapshot_transfer::encode(&snapshot)?);
        return Ok(());
    }

    let planner_config = config::load_planner_config(args.config.as_deref())?;
    let mut world = World::new();
    let mut fleet = FleetControl::new(planner_config);
    let mut events = Vec::new();
    world::apply(&mut world, snapshot, &mut events);

    let mut commands = Vec::new();
    fleet.handle(&events, &world, &mut commands);
    info!("issued {} commands", commands.len());

    let rendered =
        serde_json::to_string_pretty(&commands).context("failed to render command batch")?;
    println!("{rendered}");
    Ok(())
}

fn load_snapshot(args: &Args) -> Result<TurnSnapshot> {
    if let Some(transfer) = &args.transfer {
        return snapshot_transfer::decode(transfer).context("failed to decode transfer string");
    }

    let Some(path) = &args.snapshot else {
        bail!("provide a snapshot file or a --transfer string");
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}
