mod config;
mod error;
mod heat_index;
mod manager;
mod model;
mod outliers;
mod render;
mod sensor;
mod series;
mod stats;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// TOML configuration file (defaults are used when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read the sensors once and print a log line.
    Acquire,

    /// Reject outliers from a log file and plot it.
    Plot {
        #[arg(long)]
        log_file: PathBuf,

        /// Outlier threshold as a multiple of the median jump.
        #[arg(long)]
        multiplier: Option<f64>,

        /// Output image file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.config.as_ref()).context("failed to construct mgr")?;

    match args.command {
        Command::Acquire => mgr.acquire_sample()?,
        Command::Plot {
            log_file,
            multiplier,
            output,
        } => mgr.plot_log(log_file, multiplier, output)?,
    }

    Ok(())
}
