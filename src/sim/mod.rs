//! Exercise simulation module
//!
//! All exercise logic lives here. Nothing in this module draws, sleeps or
//! touches a clock:
//! - Layout is a pure function of the host's geometry and a seeded RNG
//! - The sweep advances only when the host delivers a scheduled tick
//! - Every mutation goes through `&mut RunningMan` on the host's UI context

pub mod exercise;
pub mod layout;
pub mod role;
pub mod sweep;

pub use exercise::{ExerciseMetadata, Phase, RunningMan};
pub use layout::{Layout, Sequence, TargetSlot, build_layout, clamp_obstacles, interleave, target_count};
pub use role::Role;
pub use sweep::{Direction, Step, SweepState, hides_on_leave, start_index};
