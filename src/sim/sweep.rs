//! Sweep state machine
//!
//! The runner walks the row one slot per tick. When the walk runs off
//! either end the row is re-arranged and the walk starts over from the
//! configured side. Direction is only ever chosen at (re)initialization.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::settings::{ObstacleMode, StartingSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Left to right (increasing index)
    Forward,
    /// Right to left (decreasing index)
    Backward,
}

/// Outcome of advancing the walk by one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Runner moved to this slot
    Moved(usize),
    /// Runner left the row
    OffEnd,
}

/// First slot for a starting side
pub fn start_index<R: Rng>(side: StartingSide, len: usize, rng: &mut R) -> usize {
    let last = len.saturating_sub(1);
    match side {
        StartingSide::Left => 0,
        StartingSide::Right => last,
        StartingSide::Random => {
            if rng.random_bool(0.5) {
                0
            } else {
                last
            }
        }
    }
}

/// Whether leaving a slot hides it (obstacles stay up in known mode)
pub fn hides_on_leave(role: Role, mode: ObstacleMode) -> bool {
    !role.is_obstacle() || mode.hides_obstacles()
}

/// Current position and heading of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepState {
    pub index: usize,
    pub direction: Direction,
}

impl SweepState {
    /// Start a walk over `len` slots, or None if there is nothing to walk
    pub fn init<R: Rng>(side: StartingSide, len: usize, rng: &mut R) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let index = start_index(side, len, rng);
        Some(Self {
            index,
            direction: if index == 0 {
                Direction::Forward
            } else {
                Direction::Backward
            },
        })
    }

    /// Advance one slot in the current direction
    pub fn step(&mut self, len: usize) -> Step {
        let next = match self.direction {
            Direction::Forward => self.index.checked_add(1),
            Direction::Backward => self.index.checked_sub(1),
        };
        match next {
            Some(i) if i < len => {
                self.index = i;
                Step::Moved(i)
            }
            _ => Step::OffEnd,
        }
    }
}
