#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use clap::Parser;
use config::{AppConfig, CliArgs};
use std::io::{BufWriter, Write};
use telemetry::init_tracing;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_tracing()?;

    let config = AppConfig::try_from(args)?;
    tracing::debug!(?config, "starting");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    commands::run(&config, &mut out)?;
    out.flush()?;
    Ok(())
}
