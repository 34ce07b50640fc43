//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "meterlink", version, about = "Power/water telemetry node")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/meterlink.toml")]
    pub config: PathBuf,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the telemetry loop
    Run {
        /// Stop after this many ticks (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Simulated backend: constant raw converter count
        #[arg(long, value_name = "COUNTS")]
        sim_raw: Option<u16>,
        /// Simulated backend: flow edges delivered before the line goes quiet
        #[arg(long, value_name = "EDGES")]
        sim_edges: Option<u32>,
        /// Skip the connectivity handshake before the first tick
        #[arg(long, action = ArgAction::SetTrue)]
        offline: bool,
    },
    /// Quick health check (hardware presence / sim ok)
    SelfCheck,
}
