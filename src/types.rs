use std::str::FromStr;

use serde::Deserialize;

/// What the poll timer does with ticks that were missed while a slow tick
/// (large reads, slow disk) was still running.
///
/// Ticks never overlap: the next tick is only observed once the previous one
/// finished. This only controls how the timer catches up afterwards.
///
/// - `Skip`: drop missed ticks and realign to the original schedule (default).
/// - `Delay`: restart the period from the moment the slow tick finished.
/// - `Burst`: fire missed ticks back to back until caught up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissedTickBehaviour {
    Skip,
    Delay,
    Burst,
}

impl Default for MissedTickBehaviour {
    fn default() -> Self {
        MissedTickBehaviour::Skip
    }
}

impl From<MissedTickBehaviour> for tokio::time::MissedTickBehavior {
    fn from(value: MissedTickBehaviour) -> Self {
        match value {
            MissedTickBehaviour::Skip => tokio::time::MissedTickBehavior::Skip,
            MissedTickBehaviour::Delay => tokio::time::MissedTickBehavior::Delay,
            MissedTickBehaviour::Burst => tokio::time::MissedTickBehavior::Burst,
        }
    }
}

impl FromStr for MissedTickBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(MissedTickBehaviour::Skip),
            "delay" => Ok(MissedTickBehaviour::Delay),
            "burst" => Ok(MissedTickBehaviour::Burst),
            other => Err(format!(
                "invalid missed_tick_behaviour: {other} (expected \"skip\", \"delay\" or \"burst\")"
            )),
        }
    }
}

/// Where the last watched file is remembered between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleStorageMode {
    /// Store the path in a file (`.samplewatch/last_resource`).
    File,
    /// Keep it in memory only (lost on restart).
    Memory,
}

impl Default for HandleStorageMode {
    fn default() -> Self {
        HandleStorageMode::File
    }
}
