//! Layout builder
//!
//! Measures a reference running man target, works out how many equally
//! spaced slots fit across the arena, then fills them with a random
//! interleave of obstacles and runners. Every placed target is used exactly
//! once. Old targets are removed before the new row is created.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::consts::{MEASURE_POS, TARGET_GAP, TARGET_MARGIN};
use crate::host::{TargetHost, TargetId, TargetTemplate};
use crate::settings::ObstacleMode;

/// One placed target in the row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSlot {
    pub target: TargetId,
    pub role: Role,
    pub pos: Vec2,
    pub visible: bool,
}

/// The row of slots, left to right
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequence {
    slots: Vec<TargetSlot>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TargetSlot> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetSlot> {
        self.slots.iter()
    }

    pub fn contains(&self, target: TargetId) -> bool {
        self.slots.iter().any(|s| s.target == target)
    }

    pub fn count(&self, role: Role) -> usize {
        self.slots.iter().filter(|s| s.role == role).count()
    }

    /// Number of slots currently shown
    pub fn visible_count(&self) -> usize {
        self.slots.iter().filter(|s| s.visible).count()
    }

    /// Stop tracking a target. Returns the slot it held, if it was part of the row.
    pub fn remove(&mut self, target: TargetId) -> Option<usize> {
        let index = self.slots.iter().position(|s| s.target == target)?;
        self.slots.remove(index);
        Some(index)
    }

    /// Show or hide a slot, mirroring the change to the host
    pub fn set_visible(&mut self, host: &mut impl TargetHost, index: usize, visible: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.visible = visible;
            host.set_visible(slot.target, visible);
        }
    }

    /// Remove every target from the arena
    pub fn clear(&mut self, host: &mut impl TargetHost) {
        for slot in self.slots.drain(..) {
            host.remove_target(slot.target);
        }
    }
}

/// How many reference-sized slots fit across the arena
pub fn target_count(arena_width: f32, target_width: f32) -> u32 {
    let fit = ((arena_width - TARGET_MARGIN * 2.0) / (target_width + TARGET_GAP)).floor();
    if fit.is_finite() && fit >= 1.0 { fit as u32 } else { 0 }
}

/// Clamp a requested obstacle count so at least one runner slot remains
pub fn clamp_obstacles(requested: u32, target_count: u32) -> u32 {
    requested.min(target_count.saturating_sub(1))
}

/// Randomly interleave the given numbers of obstacles and runners
///
/// Walking left to right, an obstacle is picked when no runners are left or
/// when obstacles remain and a fair coin says so.
pub fn interleave<R: Rng>(mut obstacles: usize, mut runners: usize, rng: &mut R) -> Vec<Role> {
    let mut roles = Vec::with_capacity(obstacles + runners);
    while obstacles + runners > 0 {
        if runners == 0 || (obstacles > 0 && rng.random_bool(0.5)) {
            obstacles -= 1;
            roles.push(Role::Obstacle);
        } else {
            runners -= 1;
            roles.push(Role::Runner);
        }
    }
    roles
}

/// Result of a layout pass
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub sequence: Sequence,
    /// Slots that fit the arena (0 = degenerate arena, exercise idles)
    pub target_count: u32,
    /// Obstacle count actually requested after clamping
    pub obstacle_count: u32,
}

/// Tear down `old` and lay out a fresh row
pub fn build_layout<H: TargetHost, R: Rng>(
    host: &mut H,
    old: &mut Sequence,
    requested_obstacles: u32,
    mode: ObstacleMode,
    rng: &mut R,
) -> Layout {
    old.clear(host);

    // The measurement target is never part of the row, so the first slot
    // can still become an obstacle
    let measure_pos = Vec2::new(MEASURE_POS.0, MEASURE_POS.1);
    let probe = match host.add_target(TargetTemplate::RunningMan, measure_pos) {
        Ok(id) => id,
        Err(e) => {
            log::warn!("Cannot measure targets, exercise idle: {}", e);
            return Layout::default();
        }
    };
    let size = host.dimension(probe);
    host.remove_target(probe);
    let Some(size) = size else {
        log::warn!("Reference target has no dimension, exercise idle");
        return Layout::default();
    };

    let count = target_count(host.arena_width(), size.x);
    if count < 1 {
        log::warn!(
            "Arena width {} too small for {}px targets, exercise idle",
            host.arena_width(),
            size.x
        );
        return Layout::default();
    }

    let obstacle_count = clamp_obstacles(requested_obstacles, count);
    let y = host.arena_height() / 2.0 - size.y / 2.0;
    let placeholder = Vec2::new(TARGET_MARGIN, y);

    let mut obstacles = place_all(host, Role::Obstacle, obstacle_count as usize, placeholder);
    let runner_count = (count as usize).saturating_sub(obstacles.len());
    let mut runners = place_all(host, Role::Runner, runner_count, placeholder);

    let roles = interleave(obstacles.len(), runners.len(), rng);
    let mut sequence = Sequence::new();
    let mut x = TARGET_MARGIN;

    // Pools are drained front to back
    obstacles.reverse();
    runners.reverse();

    for role in roles {
        let (target, visible) = match role {
            Role::Obstacle => match obstacles.pop() {
                Some(t) => (t, !mode.hides_obstacles()),
                None => break,
            },
            Role::Runner => match runners.pop() {
                Some(t) => (t, false),
                None => break,
            },
        };
        let pos = Vec2::new(x, y);
        host.set_visible(target, visible);
        host.set_position(target, pos);
        sequence.slots.push(TargetSlot {
            target,
            role,
            pos,
            visible,
        });
        x += size.x + TARGET_GAP;
    }

    log::debug!(
        "Laid out {} slots ({} obstacles, {} runners)",
        sequence.len(),
        sequence.count(Role::Obstacle),
        sequence.count(Role::Runner)
    );

    Layout {
        sequence,
        target_count: count,
        obstacle_count,
    }
}

/// Place `n` targets for one role, skipping the ones the host refuses
fn place_all<H: TargetHost>(host: &mut H, role: Role, n: usize, pos: Vec2) -> Vec<TargetId> {
    let mut placed = Vec::with_capacity(n);
    for _ in 0..n {
        match host.add_target(role.template(), pos) {
            Ok(id) => placed.push(id),
            Err(e) => log::warn!("Skipping target placement: {}", e),
        }
    }
    placed
}
