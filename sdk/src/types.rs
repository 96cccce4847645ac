//! Shared identifiers and device-facing value types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Room/area addressing unit of the physical robot.
pub type SegmentId = u32;

/// Cleaning mode for a zone or an individual segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningMode {
    /// Vacuum only
    Sweeping,

    /// Vacuum and mop in one pass
    SweepingAndMopping,

    /// CleanGenius routine pass
    RoutineCleaning,

    /// CleanGenius deep pass
    DeepCleaning,
}

impl CleaningMode {
    /// Whether the mode is selected through the CleanGenius selector rather
    /// than the plain cleaning-mode selector.
    pub fn is_clean_genius(&self) -> bool {
        matches!(self, CleaningMode::RoutineCleaning | CleaningMode::DeepCleaning)
    }

    /// Wire name used in service payloads and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningMode::Sweeping => "sweeping",
            CleaningMode::SweepingAndMopping => "sweeping_and_mopping",
            CleaningMode::RoutineCleaning => "routine_cleaning",
            CleaningMode::DeepCleaning => "deep_cleaning",
        }
    }
}

impl fmt::Display for CleaningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleaningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sweeping" => Ok(CleaningMode::Sweeping),
            "sweeping_and_mopping" => Ok(CleaningMode::SweepingAndMopping),
            "routine_cleaning" => Ok(CleaningMode::RoutineCleaning),
            "deep_cleaning" => Ok(CleaningMode::DeepCleaning),
            other => Err(format!("unknown cleaning mode '{other}'")),
        }
    }
}

/// Activity state reported by the physical vacuum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    /// Actively cleaning
    Cleaning,

    /// Returning to the dock
    Returning,

    /// Parked on the dock
    #[default]
    Docked,

    /// Idle off the dock
    Idle,

    /// Job paused
    Paused,

    /// Device-reported error state
    Error,

    /// Anything the device reports that we do not model
    #[serde(other)]
    Unknown,
}

impl ActivityState {
    /// States in which the device rejects a new start command and must be
    /// stopped first.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ActivityState::Cleaning | ActivityState::Returning | ActivityState::Paused
        )
    }
}

/// Empty acknowledgment token returned by device commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ack;
