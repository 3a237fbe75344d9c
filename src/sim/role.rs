//! Runner / obstacle classification
//!
//! Targets carry their role as a string tag on their regions. Slots keep
//! the role they were placed with; hits are classified by the region tag.

use serde::{Deserialize, Serialize};

use crate::consts::{OBSTACLE_TAG_VALUE, RUNNER_TAG_VALUE, SUBTARGET_TAG};
use crate::host::{Region, TargetTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Runner,
    Obstacle,
}

impl Role {
    /// Role of a single region (`subtarget=running_man|obstacle`)
    pub fn from_region(region: &Region) -> Option<Self> {
        match region.tag(SUBTARGET_TAG)? {
            RUNNER_TAG_VALUE => Some(Role::Runner),
            OBSTACLE_TAG_VALUE => Some(Role::Obstacle),
            _ => None,
        }
    }

    /// Template a slot of this role is placed from
    pub fn template(&self) -> TargetTemplate {
        match self {
            Role::Runner => TargetTemplate::RunningMan,
            Role::Obstacle => TargetTemplate::Obstacle,
        }
    }

    pub fn is_obstacle(&self) -> bool {
        *self == Role::Obstacle
    }
}
