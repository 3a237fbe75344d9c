//! Running Man - A timed runner/obstacle shooting drill
//!
//! A row of target slots is filled with "running man" targets and obstacle
//! targets. One slot is shown at a time and the visible slot sweeps across
//! the row at a configurable tempo. Hitting the runner scores a point,
//! hitting an obstacle resets the score, and every time the runner leaves
//! the row the obstacles are re-arranged.
//!
//! Core modules:
//! - `sim`: Layout builder, sweep state machine and scoring
//! - `settings`: Exercise options (obstacles, speed, starting side, mode)
//! - `host`: Collaborator contracts the embedding application implements
//! - `platform`: Deterministic headless host (virtual clock + target store)

pub mod host;
pub mod platform;
pub mod settings;
pub mod sim;

pub use host::{Host, PlacementError, TargetId};
pub use settings::{ExerciseOptions, ObstacleMode, Speed, StartingSide};
pub use sim::RunningMan;

/// Exercise configuration constants
pub mod consts {
    /// Space left free at both ends of the row (pixels)
    pub const TARGET_MARGIN: f32 = 30.0;
    /// Horizontal gap between neighbouring slots (pixels)
    pub const TARGET_GAP: f32 = 10.0;
    /// Where the throwaway measurement target is placed
    pub const MEASURE_POS: (f32, f32) = (10.0, 10.0);

    /// Obstacle count used until the user picks one
    pub const DEFAULT_OBSTACLE_COUNT: u32 = 1;
    /// Tick delay for a speed label that maps to no known tier
    pub const FALLBACK_DELAY_MS: u64 = 5000;

    /// Template files the host instantiates
    pub const RUNNING_MAN_TEMPLATE: &str = "@target/running_man.target";
    pub const OBSTACLE_TEMPLATE: &str = "@target/obstacle.target";

    /// Region tag carrying the sub-target classification
    pub const SUBTARGET_TAG: &str = "subtarget";
    pub const RUNNER_TAG_VALUE: &str = "running_man";
    pub const OBSTACLE_TAG_VALUE: &str = "obstacle";
}

/// Text shown on the camera feed for a score
#[inline]
pub fn score_text(score: u32) -> String {
    format!("Score: {}", score)
}
