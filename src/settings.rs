//! Exercise options
//!
//! The four choices the option panel offers, plus an optional RNG seed.
//! Options can be loaded from a JSON file for headless runs.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_OBSTACLE_COUNT, FALLBACK_DELAY_MS};

/// How fast the runner moves from slot to slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Speed {
    VeryFast,
    Fast,
    Medium,
    #[default]
    Slow,
    VerySlow,
}

impl Speed {
    pub const ALL: [Speed; 5] = [
        Speed::VerySlow,
        Speed::Slow,
        Speed::Medium,
        Speed::Fast,
        Speed::VeryFast,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Speed::VeryFast => "Very Fast",
            Speed::Fast => "Fast",
            Speed::Medium => "Medium",
            Speed::Slow => "Slow",
            Speed::VerySlow => "Very Slow",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['_', '-'], " ").trim() {
            "very fast" | "veryfast" => Some(Speed::VeryFast),
            "fast" => Some(Speed::Fast),
            "medium" | "med" => Some(Speed::Medium),
            "slow" => Some(Speed::Slow),
            "very slow" | "veryslow" => Some(Speed::VerySlow),
            _ => None,
        }
    }

    /// Time between two sweep ticks
    pub fn delay(&self) -> Duration {
        Duration::from_millis(match self {
            Speed::VeryFast => 200,
            Speed::Fast => 500,
            Speed::Medium => 1000,
            Speed::Slow => 2000,
            Speed::VerySlow => 3000,
        })
    }

    /// Delay for a speed label coming from outside (unknown labels are slowest)
    pub fn delay_for_label(label: &str) -> Duration {
        Self::from_str(label)
            .map(|s| s.delay())
            .unwrap_or(Duration::from_millis(FALLBACK_DELAY_MS))
    }
}

/// Which end of the row the runner starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StartingSide {
    #[default]
    Left,
    Right,
    Random,
}

impl StartingSide {
    pub const ALL: [StartingSide; 3] = [StartingSide::Left, StartingSide::Right, StartingSide::Random];

    pub fn label(&self) -> &'static str {
        match self {
            StartingSide::Left => "Left",
            StartingSide::Right => "Right",
            StartingSide::Random => "Random",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().trim() {
            "left" => Some(StartingSide::Left),
            "right" => Some(StartingSide::Right),
            "random" => Some(StartingSide::Random),
            _ => None,
        }
    }
}

/// Whether obstacles are shown up front or only when the runner reaches them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObstacleMode {
    #[default]
    Known,
    Surprise,
}

impl ObstacleMode {
    pub const ALL: [ObstacleMode; 2] = [ObstacleMode::Known, ObstacleMode::Surprise];

    pub fn label(&self) -> &'static str {
        match self {
            ObstacleMode::Known => "Known Obstructions",
            ObstacleMode::Surprise => "Surprise Obstructions",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().trim() {
            "known" | "known obstructions" => Some(ObstacleMode::Known),
            "surprise" | "surprise obstructions" => Some(ObstacleMode::Surprise),
            _ => None,
        }
    }

    /// Obstacles start hidden and get hidden again by the sweep
    pub fn hides_obstacles(&self) -> bool {
        matches!(self, ObstacleMode::Surprise)
    }
}

/// Errors loading an options file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid options file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Selected exercise options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseOptions {
    /// Requested obstacle count (clamped to the row when laying out)
    pub obstacle_count: u32,
    pub speed: Speed,
    pub starting_side: StartingSide,
    pub obstacle_mode: ObstacleMode,
    /// Fixed RNG seed for reproducible layouts
    pub seed: Option<u64>,
}

impl Default for ExerciseOptions {
    fn default() -> Self {
        Self {
            obstacle_count: DEFAULT_OBSTACLE_COUNT,
            speed: Speed::default(),
            starting_side: StartingSide::default(),
            obstacle_mode: ObstacleMode::default(),
            seed: None,
        }
    }
}

impl ExerciseOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let options = Self::from_json(&json)?;
        log::info!("Loaded options from {}", path.as_ref().display());
        Ok(options)
    }

    pub fn to_json(&self) -> String {
        // Plain data with derived Serialize, cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
