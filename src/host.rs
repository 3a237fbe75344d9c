//! Host collaborator contracts
//!
//! The exercise never draws, hit-tests or times anything itself. The
//! embedding application implements these traits and calls back into
//! [`RunningMan`](crate::sim::RunningMan) when a timer fires, a dispatched
//! UI task runs, a shot lands or a target changes.
//!
//! All exercise state must only be touched from the host's UI context.
//! Timer callbacks may arrive off that context; the exercise marshals the
//! work that needs it through [`Scheduler::run_on_ui_context`].

use std::collections::HashMap;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{OBSTACLE_TEMPLATE, RUNNING_MAN_TEMPLATE};

/// Opaque handle to a target placed in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Target files the exercise places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetTemplate {
    RunningMan,
    Obstacle,
}

impl TargetTemplate {
    pub fn path(&self) -> &'static str {
        match self {
            TargetTemplate::RunningMan => RUNNING_MAN_TEMPLATE,
            TargetTemplate::Obstacle => OBSTACLE_TEMPLATE,
        }
    }
}

/// Why a target could not be placed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("target template {0} could not be instantiated")]
    TemplateUnavailable(&'static str),
    #[error("position ({x}, {y}) is outside the arena")]
    OutsideArena { x: f32, y: f32 },
}

/// A hit-testable region of a target, carrying string tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    tags: HashMap<String, String>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, name: &str, value: &str) -> Self {
        self.tags.insert(name.to_string(), value.to_string());
        self
    }

    pub fn tag_exists(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// A detected shot on the camera feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub pos: Vec2,
    /// Host timestamp (ms)
    pub timestamp: u64,
}

/// The target and region a shot landed in
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub target: TargetId,
    pub region: Region,
}

/// What happened to a target outside the exercise's control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetChange {
    Added,
    Removed,
}

/// Identifies one self-rescheduling sweep chain
///
/// Every `start` opens a new generation; a tick carrying an older
/// generation belongs to a chain that a later `start` superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SweepTicket {
    pub generation: u64,
}

/// Work the exercise hands to the host's UI context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiTask {
    /// Runner left the row: re-arrange and restart the sweep chain
    Rearrange(SweepTicket),
    /// Obstacle was hit off the UI context: re-arrange only
    RebuildLayout,
}

/// Target placement and arena geometry
pub trait TargetHost {
    fn add_target(&mut self, template: TargetTemplate, pos: Vec2) -> Result<TargetId, PlacementError>;
    fn remove_target(&mut self, target: TargetId);
    fn set_visible(&mut self, target: TargetId, visible: bool);
    fn is_visible(&self, target: TargetId) -> bool;
    fn set_position(&mut self, target: TargetId, pos: Vec2);
    /// Footprint (width, height) of a placed target
    fn dimension(&self, target: TargetId) -> Option<Vec2>;
    fn regions(&self, target: TargetId) -> Vec<Region>;
    fn arena_width(&self) -> f32;
    fn arena_height(&self) -> f32;
}

/// Score feedback
pub trait Feedback {
    fn show_text_on_feed(&mut self, text: &str);
    /// Spoken (or logged) announcement
    fn announce(&mut self, text: &str);
}

/// One-shot timers and UI context dispatch
pub trait Scheduler {
    /// Fire `RunningMan::on_tick(ticket)` once after `delay`
    fn schedule(&mut self, ticket: SweepTicket, delay: Duration);
    /// Queue `RunningMan::run_ui_task(task)` on the UI context
    fn run_on_ui_context(&mut self, task: UiTask);
    fn is_on_ui_context(&self) -> bool;
}

/// Everything the exercise needs from its host
pub trait Host: TargetHost + Feedback + Scheduler {}

impl<T: TargetHost + Feedback + Scheduler> Host for T {}
