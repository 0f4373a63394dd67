// src/logging.rs

//! Diagnostics for the `samplewatch` binary.
//!
//! Change notifications are the program's output and go to stdout as
//! `[samplewatch] ...` lines; everything emitted through `tracing` (session
//! start/stop, detected changes, read errors, baseline captures at `debug`)
//! goes to stderr, so piping stdout yields only the notifications.
//!
//! The level is taken from `--log-level`, then `SAMPLEWATCH_LOG`, then `info`.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "SAMPLEWATCH_LOG";

/// Install the stderr subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = cli_level
        .map(Level::from)
        .or_else(|| std::env::var(LOG_ENV_VAR).ok().and_then(|s| env_level(&s)))
        .unwrap_or(Level::INFO);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))?;

    Ok(())
}

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// `tracing` level names (any case, surrounding whitespace ignored);
/// unknown values fall through to the default.
fn env_level(raw: &str) -> Option<Level> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_env_levels() {
        assert_eq!(env_level(" Debug "), Some(Level::DEBUG));
        assert_eq!(env_level("WARN"), Some(Level::WARN));
        assert_eq!(env_level("loud"), None);
    }

    #[test]
    fn cli_level_maps_onto_tracing() {
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
    }
}
