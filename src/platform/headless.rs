//! Deterministic in-process host
//!
//! Time only moves when [`HeadlessHost::advance_to`] is called. Timers fire
//! in due-time order (ties in scheduling order) and count as running off
//! the UI context; UI tasks queued by a timer callback run right after it.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashSet, VecDeque};
use std::time::Duration;

use glam::Vec2;

use crate::consts::{OBSTACLE_TAG_VALUE, RUNNER_TAG_VALUE, SUBTARGET_TAG};
use crate::host::{
    Feedback, Hit, PlacementError, Region, Scheduler, SweepTicket, TargetHost, TargetId,
    TargetTemplate, UiTask,
};
use crate::sim::RunningMan;

/// A target living in the headless arena
#[derive(Debug, Clone)]
pub struct PlacedTarget {
    pub template: TargetTemplate,
    pub pos: Vec2,
    pub visible: bool,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PendingTimer {
    due: u64,
    seq: u64,
    ticket: SweepTicket,
}

/// Headless host with a virtual millisecond clock
#[derive(Debug)]
pub struct HeadlessHost {
    arena: Vec2,
    target_size: Vec2,
    /// Virtual time (ms)
    now: u64,
    targets: BTreeMap<TargetId, PlacedTarget>,
    next_id: u32,
    timers: BinaryHeap<Reverse<PendingTimer>>,
    timer_seq: u64,
    ui_tasks: VecDeque<UiTask>,
    on_ui_context: bool,
    unavailable: HashSet<TargetTemplate>,
    feed_text: String,
    announcements: Vec<String>,
}

impl HeadlessHost {
    pub fn new(arena_width: f32, arena_height: f32) -> Self {
        Self {
            arena: Vec2::new(arena_width, arena_height),
            target_size: Vec2::new(100.0, 200.0),
            now: 0,
            targets: BTreeMap::new(),
            next_id: 1,
            timers: BinaryHeap::new(),
            timer_seq: 0,
            ui_tasks: VecDeque::new(),
            on_ui_context: true,
            unavailable: HashSet::new(),
            feed_text: String::new(),
            announcements: Vec::new(),
        }
    }

    /// Footprint every placed target reports
    pub fn with_target_size(mut self, size: Vec2) -> Self {
        self.target_size = size;
        self
    }

    /// Make a template fail to instantiate
    pub fn with_unavailable(mut self, template: TargetTemplate) -> Self {
        self.unavailable.insert(template);
        self
    }

    pub fn set_arena_size(&mut self, width: f32, height: f32) {
        self.arena = Vec2::new(width, height);
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn feed_text(&self) -> &str {
        &self.feed_text
    }

    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    pub fn target(&self, id: TargetId) -> Option<&PlacedTarget> {
        self.targets.get(&id)
    }

    /// Number of targets in the arena
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Visible targets, ordered by id
    pub fn visible_targets(&self) -> Vec<TargetId> {
        self.targets
            .iter()
            .filter(|(_, t)| t.visible)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Due time of the next timer
    pub fn next_due(&self) -> Option<u64> {
        self.timers.peek().map(|Reverse(t)| t.due)
    }

    /// What the camera pipeline reports for a shot landing on `target`
    pub fn shoot(&self, target: TargetId) -> Option<Hit> {
        if !self.targets.contains_key(&target) {
            return None;
        }
        Some(Hit {
            target,
            region: self.regions(target).into_iter().next().unwrap_or_default(),
        })
    }

    /// Fire every timer due up to `t` (ms), then move the clock to `t`
    pub fn advance_to(&mut self, exercise: &mut RunningMan, t: u64) {
        while let Some(Reverse(next)) = self.timers.peek().copied() {
            if next.due > t {
                break;
            }
            self.timers.pop();
            self.now = next.due;

            self.on_ui_context = false;
            exercise.on_tick(next.ticket, self);
            self.on_ui_context = true;

            self.run_ui_tasks(exercise);
        }
        self.now = self.now.max(t);
        self.run_ui_tasks(exercise);
    }

    pub fn advance_by(&mut self, exercise: &mut RunningMan, dt: u64) {
        let t = self.now + dt;
        self.advance_to(exercise, t);
    }

    /// Drain queued UI tasks on the UI context
    pub fn run_ui_tasks(&mut self, exercise: &mut RunningMan) {
        let was_on_ui = self.on_ui_context;
        self.on_ui_context = true;
        while let Some(task) = self.ui_tasks.pop_front() {
            exercise.run_ui_task(task, self);
        }
        self.on_ui_context = was_on_ui;
    }

    /// Run `f` as if called from a timer thread
    pub fn off_ui_context<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let was_on_ui = self.on_ui_context;
        self.on_ui_context = false;
        let result = f(self);
        self.on_ui_context = was_on_ui;
        result
    }

    pub fn pending_ui_tasks(&self) -> usize {
        self.ui_tasks.len()
    }

    fn regions_for(template: TargetTemplate) -> Vec<Region> {
        let value = match template {
            TargetTemplate::RunningMan => RUNNER_TAG_VALUE,
            TargetTemplate::Obstacle => OBSTACLE_TAG_VALUE,
        };
        vec![Region::new().with_tag(SUBTARGET_TAG, value)]
    }
}

impl TargetHost for HeadlessHost {
    fn add_target(&mut self, template: TargetTemplate, pos: Vec2) -> Result<TargetId, PlacementError> {
        if self.unavailable.contains(&template) {
            return Err(PlacementError::TemplateUnavailable(template.path()));
        }
        // Targets taller than the arena hang over its edges
        if pos.x < 0.0 || pos.x > self.arena.x {
            return Err(PlacementError::OutsideArena { x: pos.x, y: pos.y });
        }

        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.insert(
            id,
            PlacedTarget {
                template,
                pos,
                visible: true,
                regions: Self::regions_for(template),
            },
        );
        Ok(id)
    }

    fn remove_target(&mut self, target: TargetId) {
        self.targets.remove(&target);
    }

    fn set_visible(&mut self, target: TargetId, visible: bool) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.visible = visible;
        }
    }

    fn is_visible(&self, target: TargetId) -> bool {
        self.targets.get(&target).is_some_and(|t| t.visible)
    }

    fn set_position(&mut self, target: TargetId, pos: Vec2) {
        if let Some(t) = self.targets.get_mut(&target) {
            t.pos = pos;
        }
    }

    fn dimension(&self, target: TargetId) -> Option<Vec2> {
        self.targets.get(&target).map(|_| self.target_size)
    }

    fn regions(&self, target: TargetId) -> Vec<Region> {
        self.targets
            .get(&target)
            .map(|t| t.regions.clone())
            .unwrap_or_default()
    }

    fn arena_width(&self) -> f32 {
        self.arena.x
    }

    fn arena_height(&self) -> f32 {
        self.arena.y
    }
}

impl Feedback for HeadlessHost {
    fn show_text_on_feed(&mut self, text: &str) {
        self.feed_text = text.to_string();
    }

    fn announce(&mut self, text: &str) {
        log::info!("[announce] {}", text);
        self.announcements.push(text.to_string());
    }
}

impl Scheduler for HeadlessHost {
    fn schedule(&mut self, ticket: SweepTicket, delay: Duration) {
        let due = self.now + delay.as_millis() as u64;
        self.timers.push(Reverse(PendingTimer {
            due,
            seq: self.timer_seq,
            ticket,
        }));
        self.timer_seq += 1;
    }

    fn run_on_ui_context(&mut self, task: UiTask) {
        self.ui_tasks.push_back(task);
    }

    fn is_on_ui_context(&self) -> bool {
        self.on_ui_context
    }
}
