//! Bridge Config CLI
//!
//! Validates the YAML configuration directory of a sensor-to-MQTT bridge and
//! writes environment-supplied values back into it.

use anyhow::Result;
use bridge_config::cli::check::{CheckArgs, run_check};
use bridge_config::cli::show::run_show;
use bridge_config::cli::sync::run_sync;
use bridge_config::cli::{Cli, Command, Context};
use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let ctx = Context::from_cli(&cli)?;
    debug!(dir = %ctx.config_dir.display(), "Resolved config directory");

    let ok = match &cli.command {
        None => run_check(&ctx, &CheckArgs::default())?,
        Some(Command::Check(args)) => run_check(&ctx, args)?,
        Some(Command::Show(args)) => {
            run_show(&ctx, args)?;
            true
        }
        Some(Command::Sync(args)) => run_sync(&ctx, args)?,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
