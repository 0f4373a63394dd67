// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Overrides;
use crate::types::MissedTickBehaviour;

/// Command-line arguments for `samplewatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "samplewatch",
    version,
    about = "Watch a large file for changes by sampling a few blocks instead of re-reading it.",
    long_about = None
)]
pub struct CliArgs {
    /// File to watch.
    ///
    /// If omitted, the last watched file is used.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Samplewatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Target bytes per sampled block.
    #[arg(long, value_name = "BYTES")]
    pub block_size: Option<u64>,

    /// Target number of sampled blocks.
    #[arg(long, value_name = "N")]
    pub sample_count: Option<usize>,

    /// Poll interval in milliseconds.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Stop watching after this many milliseconds without a change.
    #[arg(long, value_name = "MS")]
    pub max_delta_ms: Option<u64>,

    /// What the poll timer does after a tick overran: skip, delay or burst.
    #[arg(long, value_name = "MODE")]
    pub missed_ticks: Option<MissedTickBehaviour>,

    /// Print the sampled regions and coverage for the file, then exit.
    #[arg(long)]
    pub regions: bool,

    /// Forget the remembered last file and exit.
    #[arg(long, conflicts_with_all = ["path", "regions"])]
    pub forget: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SAMPLEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            block_size: self.block_size,
            sample_count: self.sample_count,
            watch_interval_ms: self.interval_ms,
            max_delta_ms: self.max_delta_ms,
            missed_tick_behaviour: self.missed_ticks,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
