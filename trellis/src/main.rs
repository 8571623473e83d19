//! # Trellis
//!
//! Command-line entry point. Resolves the run configuration from defaults, an
//! optional JSON file and flags, then runs one pass of the rollout pipeline.

use anyhow::Result;
use clap::Parser;
use trellis::app;
use trellis::config::{self, Args};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = config::resolve(&args)?;
    tracing::info!(?config, "resolved configuration");

    let summary = app::run(&config)?;
    tracing::info!(
        episodes = summary.episodes,
        batches = summary.batches,
        total_reward = summary.total_reward,
        mean_return = summary.mean_return,
        "done"
    );
    Ok(())
}
