#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Arena Clash matches without a renderer.

mod config;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_clash_core::Team;
use arena_clash_simulation::Battle;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::{config::RunConfig, report::MatchReport};

/// Headless Arena Clash battles.
#[derive(Debug, Parser)]
#[command(name = "arena-clash", version, about)]
struct Cli {
    /// Log filter used instead of `RUST_LOG`, e.g. `debug` or `arena_clash_world=trace`.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plays one bot-versus-bot match and prints a summary.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// TOML file describing the match, decks and bots.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the deck shuffle and both bots.
    #[arg(long)]
    seed: Option<u64>,

    /// Trophy count of the bot playing the away side.
    #[arg(long)]
    trophies: Option<u32>,

    /// Simulation step in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    step_ms: Option<u64>,
}

impl RunArgs {
    fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(trophies) = self.trophies {
            config.away.trophies = trophies;
        }
        if let Some(step_ms) = self.step_ms {
            config.step_ms = step_ms;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Command::Run(args) => {
            let config = args.resolve()?;
            let report = run(&config)?;
            print!("{report}");
        }
    }
    Ok(())
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level `{level}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

/// Plays a full match described by `config`.
fn run(config: &RunConfig) -> Result<MatchReport> {
    let mut battle =
        Battle::new(config.battle_config()).context("failed to set up the battle")?;
    let step = config.step();
    let mut report = MatchReport::default();

    while !battle.is_over() {
        battle.advance(step);
        report.record(battle.last_events());
    }
    report.finish(&battle);

    info!(
        winner = ?battle.winner(),
        elapsed_ms = battle.elapsed().as_millis() as u64,
        home_cards = report.cards_played(Team::Home),
        away_cards = report.cards_played(Team::Away),
        "headless match finished"
    );
    Ok(report)
}
