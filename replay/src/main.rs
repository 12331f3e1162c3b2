use anyhow::{Context, Result};
use clap::Parser;
use commonware_runtime::{deterministic, Runner};
use std::path::PathBuf;
use tracing::info;

mod driver;
mod scenario;

use driver::Replay;
use scenario::Scenario;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Replay a matchmaking scenario through the arena execution layer.",
    long_about = None
)]
struct Args {
    /// Path to the YAML scenario.
    scenario: PathBuf,

    /// Maximum level of execution logs written to stderr.
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn main() {
    if let Err(err) = main_result() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn main_result() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let scenario = Scenario::load(&args.scenario)?;
    info!(
        players = scenario.players.len(),
        blocks = scenario.blocks.len(),
        "replaying scenario"
    );

    let executor = deterministic::Runner::default();
    let summary = executor.start(|_| async move {
        let mut replay = Replay::new(&scenario).await?;
        for steps in &scenario.blocks {
            replay.run_block(steps).await?;
        }
        replay.summary().await
    })?;

    let output = serde_json::to_string_pretty(&summary).context("serialize summary")?;
    println!("{output}");
    Ok(())
}
