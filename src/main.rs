mod app;
mod clock;
mod config;
mod input;
mod model;
mod render;
mod rng;
mod sim;
mod storage;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Raise a small, sassy terminal creature.
#[derive(Parser, Debug)]
#[command(name = "tamagotchi", version, about = "Raise a small, sassy terminal creature", long_about = None)]
pub(crate) struct Args {
    /// Pet to load or create; prompted for when omitted
    pub(crate) name: Option<String>,

    /// Directory holding `<name>.json` saves (default: current directory)
    #[arg(short, long)]
    pub(crate) dir: Option<PathBuf>,

    /// Seed the dice for a reproducible session
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Plain text output
    #[arg(long)]
    pub(crate) no_color: bool,

    /// Suspense before a dungeon fight resolves
    #[arg(long)]
    pub(crate) fight_pause_ms: Option<u64>,

    /// Redraw interval while the pet naps
    #[arg(long)]
    pub(crate) nap_poll_ms: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = "warn")]
    pub(crate) log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    app::run(args)
}
