mod cli;
mod run;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let config = if args.config.exists() {
        meterlink_config::load_file(&args.config)
            .wrap_err_with(|| format!("loading config {}", args.config.display()))?
    } else {
        meterlink_config::Config::default()
    };

    init_logging(&args, &config)?;
    if !args.config.exists() {
        tracing::warn!(path = %args.config.display(), "config file not found; using defaults");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
        })
        .wrap_err("installing Ctrl-C handler")?;
    }

    match args.cmd {
        Commands::Run {
            ticks,
            sim_raw,
            sim_edges,
            offline,
        } => run::run_node(&config, ticks, sim_raw, sim_edges, offline, &shutdown),
        Commands::SelfCheck => run::self_check(&config),
    }
}

/// Console (or file) logging. The CLI flag wins; a level in the config file
/// applies when the flag is left at its default.
fn init_logging(args: &Cli, config: &meterlink_config::Config) -> Result<()> {
    let level = if args.log_level == "info" {
        config
            .logging
            .level
            .clone()
            .unwrap_or_else(|| args.log_level.clone())
    } else {
        args.log_level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &config.logging.file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("opening log file {path}"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
