//! CLI module for MYE Runner
//!
//! Subcommands:
//! - `score` / `validate`: listing quality for an ASIN
//! - `run`: gate a treatment and create the experiment, or a batch with `--batch`
//! - `collect` / `report`: monitor a running experiment
//! - `list`: experiments on the platform, or local records with `--local`

pub mod experiment;
pub mod quality;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// MYE Runner - quality-gated listing experiments
#[derive(Parser)]
#[command(name = "mye-runner")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the listing quality score for an ASIN
    Score(quality::QualityArgs),

    /// Check whether an ASIN's listing may enter an experiment
    Validate(quality::QualityArgs),

    /// Gate a treatment and create the experiment when eligible
    Run(experiment::RunArgs),

    /// Pull metrics for an experiment and analyze them
    Collect(experiment::ExperimentArgs),

    /// Collect fresh metrics and write the experiment report
    Report(experiment::ExperimentArgs),

    /// List experiments
    List(experiment::ListArgs),
}

/// Load `.env` and configuration, then install logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    config.validate()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

/// Write a result to stdout as pretty JSON
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
