//! Running man exercise
//!
//! Owns the row, the sweep and the score, and reacts to the host's
//! lifecycle hooks. All methods take `&mut self` and must be called from
//! the host's UI context; timer callbacks that land elsewhere are routed
//! back through [`UiTask`]s.

use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::layout::{Sequence, build_layout};
use super::role::Role;
use super::sweep::{Step, SweepState, hides_on_leave, start_index};
use crate::consts::SUBTARGET_TAG;
use crate::host::{Hit, Host, Shot, SweepTicket, TargetChange, TargetId, UiTask};
use crate::score_text;
use crate::settings::{ExerciseOptions, ObstacleMode, Speed, StartingSide};

/// Lifecycle phase of the exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// No sweep chain is alive
    Idle,
    /// A sweep chain is ticking
    Running,
    /// `reset` is rebuilding the row
    Resetting,
    /// `destroy` was called (terminal)
    Destroying,
}

/// How a tick or re-arrange relates to the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chain {
    /// Current chain, keeps rescheduling
    Live,
    /// Chain interrupted by a reset: finish the step, then stop
    Suspended,
    /// Superseded by a newer chain, or the exercise is gone
    Dead,
}

/// Exercise description shown by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseMetadata {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub description: &'static str,
}

/// The running man exercise state
#[derive(Debug)]
pub struct RunningMan {
    options: ExerciseOptions,
    sequence: Sequence,
    /// Slots that fit the arena at the last layout
    target_count: u32,
    sweep: Option<SweepState>,
    /// Generation opened by the last `start`; older tickets are dead
    generation: u64,
    phase: Phase,
    /// Layout is being torn down and rebuilt
    refreshing: bool,
    score: u32,
    rng: Pcg32,
}

impl RunningMan {
    pub fn new(options: ExerciseOptions) -> Self {
        let seed = options.seed.unwrap_or_else(rand::random);
        Self {
            options,
            sequence: Sequence::new(),
            target_count: 0,
            sweep: None,
            generation: 0,
            phase: Phase::Idle,
            refreshing: false,
            score: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn info() -> ExerciseMetadata {
        ExerciseMetadata {
            name: "Running Man",
            version: "1.0",
            author: "phrack",
            description: "Shoot gray targets as they pop up while avoiding red targets. \
                You get a point for each hit on a gray target, but your score \
                resets if you hit a red target. Every time the man runs off the \
                screen the obstacles are re-arranged.",
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn sweep(&self) -> Option<SweepState> {
        self.sweep
    }

    pub fn options(&self) -> &ExerciseOptions {
        &self.options
    }

    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    /// Obstacle counts the option panel offers (empty while idle)
    pub fn obstacle_count_choices(&self) -> Vec<u32> {
        (0..self.target_count).collect()
    }

    fn delay(&self) -> Duration {
        self.options.speed.delay()
    }

    fn is_guarded(&self) -> bool {
        self.refreshing || matches!(self.phase, Phase::Resetting | Phase::Destroying)
    }

    // === Lifecycle hooks ===

    /// Lay out the row, show the score and start the sweep
    pub fn init(&mut self, host: &mut impl Host) {
        log::info!("Running man starting with {:?}", self.options);
        self.rebuild_layout(host);
        host.show_text_on_feed(&score_text(0));
        self.start(host);
    }

    /// Start a new sweep chain from the configured side
    ///
    /// Any older chain still in flight is left to die on its next tick.
    pub fn start(&mut self, host: &mut impl Host) {
        if self.phase == Phase::Destroying {
            return;
        }
        let Some(sweep) = SweepState::init(self.options.starting_side, self.sequence.len(), &mut self.rng)
        else {
            log::info!("No targets fit the arena, sweep not started");
            self.sweep = None;
            self.phase = Phase::Idle;
            return;
        };

        // A suspended chain may have left a runner up
        let mode = self.options.obstacle_mode;
        let shown: Vec<usize> = self
            .sequence
            .iter()
            .enumerate()
            .filter(|(_, s)| s.visible && hides_on_leave(s.role, mode))
            .map(|(i, _)| i)
            .collect();
        for index in shown {
            self.sequence.set_visible(host, index, false);
        }

        self.generation += 1;
        self.sweep = Some(sweep);
        self.sequence.set_visible(host, sweep.index, true);
        self.phase = Phase::Running;

        let ticket = SweepTicket {
            generation: self.generation,
        };
        log::debug!("Sweep chain {} starts at slot {}", ticket.generation, sweep.index);
        host.schedule(ticket, self.delay());
    }

    /// Re-arrange, move the runner back to the start and zero the score
    ///
    /// The running sweep chain is suspended and stops at its next tick;
    /// call [`start`](Self::start) to run again.
    pub fn reset(&mut self, current_targets: &[TargetId], host: &mut impl Host) {
        if self.phase == Phase::Destroying {
            return;
        }
        log::info!("Resetting ({} targets on the arena)", current_targets.len());
        self.phase = Phase::Resetting;
        self.rebuild_layout(host);

        let index = start_index(self.options.starting_side, self.sequence.len(), &mut self.rng);
        self.sweep = match self.sweep {
            Some(sweep) => Some(SweepState { index, ..sweep }),
            None => SweepState::init(self.options.starting_side, self.sequence.len(), &mut self.rng),
        };

        self.score = 0;
        host.show_text_on_feed(&score_text(0));

        // The current chain finishes its step and stops rescheduling
        self.phase = Phase::Idle;
    }

    /// Stop for good and release the targets
    pub fn destroy(&mut self, host: &mut impl Host) {
        log::info!("Running man destroyed with score {}", self.score);
        self.phase = Phase::Destroying;
        self.sweep = None;
        self.sequence.clear(host);
    }

    /// Score a shot
    pub fn shot_listener(&mut self, shot: &Shot, hit: Option<&Hit>, host: &mut impl Host) {
        if self.phase == Phase::Destroying {
            return;
        }
        let Some(hit) = hit else { return };
        // Hidden targets cannot be hit
        if !host.is_visible(hit.target) {
            return;
        }
        if !hit.region.tag_exists(SUBTARGET_TAG) {
            return;
        }

        match Role::from_region(&hit.region) {
            Some(Role::Runner) => {
                self.score += 1;
                log::debug!("Runner hit at {:?}, score {}", shot.pos, self.score);
            }
            Some(Role::Obstacle) => {
                log::info!("Obstacle hit at {:?}, score was {}", shot.pos, self.score);
                host.announce(&format!("Your score was {}", self.score));
                self.score = 0;

                if host.is_on_ui_context() {
                    self.rebuild_layout(host);
                } else {
                    host.run_on_ui_context(UiTask::RebuildLayout);
                }
            }
            None => {}
        }

        host.show_text_on_feed(&score_text(self.score));
    }

    /// A target changed outside the exercise's control
    pub fn target_update(&mut self, target: TargetId, change: TargetChange, host: &mut impl Host) {
        if self.is_guarded() {
            return;
        }
        if change != TargetChange::Removed {
            return;
        }
        let Some(removed) = self.sequence.remove(target) else {
            return;
        };
        log::debug!("Target {:?} removed by the host from slot {}", target, removed);

        // Slots after the removed one shift left, the runner goes with them
        if let Some(sweep) = self.sweep.as_mut() {
            if removed < sweep.index {
                sweep.index -= 1;
            }
        }
        if self.sequence.is_empty() {
            self.rebuild_layout(host);
        }
    }

    // === Options ===

    pub fn set_obstacle_count(&mut self, count: u32, host: &mut impl Host) {
        self.options.obstacle_count = count;
        if !self.is_guarded() {
            self.rebuild_layout(host);
        }
    }

    pub fn set_obstacle_mode(&mut self, mode: ObstacleMode, host: &mut impl Host) {
        self.options.obstacle_mode = mode;
        if !self.is_guarded() {
            self.rebuild_layout(host);
        }
    }

    /// Takes effect from the next scheduled tick
    pub fn set_speed(&mut self, speed: Speed) {
        self.options.speed = speed;
    }

    /// Takes effect the next time the runner leaves the row
    pub fn set_starting_side(&mut self, side: StartingSide) {
        self.options.starting_side = side;
    }

    // === Host callbacks ===

    fn chain(&self, ticket: SweepTicket) -> Chain {
        if self.phase == Phase::Destroying || self.sweep.is_none() {
            return Chain::Dead;
        }
        if ticket.generation != self.generation {
            return Chain::Dead;
        }
        match self.phase {
            Phase::Running => Chain::Live,
            _ => Chain::Suspended,
        }
    }

    /// A scheduled sweep tick fired (possibly off the UI context)
    pub fn on_tick(&mut self, ticket: SweepTicket, host: &mut impl Host) {
        let chain = self.chain(ticket);
        if chain == Chain::Dead {
            log::debug!("Dropping tick of dead sweep chain {}", ticket.generation);
            return;
        }
        let Some(mut sweep) = self.sweep else { return };

        let hide = self
            .sequence
            .get(sweep.index)
            .is_some_and(|slot| hides_on_leave(slot.role, self.options.obstacle_mode));
        if hide {
            self.sequence.set_visible(host, sweep.index, false);
        }

        let step = sweep.step(self.sequence.len());
        self.sweep = Some(sweep);

        match step {
            Step::Moved(index) => {
                self.sequence.set_visible(host, index, true);
                if chain == Chain::Live {
                    host.schedule(ticket, self.delay());
                } else {
                    log::debug!("Sweep chain {} stopped by reset", ticket.generation);
                }
            }
            Step::OffEnd => host.run_on_ui_context(UiTask::Rearrange(ticket)),
        }
    }

    /// A task dispatched with [`Scheduler::run_on_ui_context`](crate::host::Scheduler::run_on_ui_context) runs
    pub fn run_ui_task(&mut self, task: UiTask, host: &mut impl Host) {
        match task {
            UiTask::Rearrange(ticket) => self.rearrange(ticket, host),
            UiTask::RebuildLayout => {
                if self.phase != Phase::Destroying {
                    self.rebuild_layout(host);
                }
            }
        }
    }

    /// Runner left the row: new layout, back to the start side
    fn rearrange(&mut self, ticket: SweepTicket, host: &mut impl Host) {
        let chain = self.chain(ticket);
        if chain == Chain::Dead {
            return;
        }
        self.rebuild_layout(host);

        let Some(sweep) = SweepState::init(self.options.starting_side, self.sequence.len(), &mut self.rng)
        else {
            log::info!("Row is empty after re-arrange, sweep stopped");
            self.sweep = None;
            if chain == Chain::Live {
                self.phase = Phase::Idle;
            }
            return;
        };
        self.sweep = Some(sweep);
        self.sequence.set_visible(host, sweep.index, true);
        log::debug!("Re-arranged, runner restarts at slot {} going {:?}", sweep.index, sweep.direction);

        if chain == Chain::Live {
            host.schedule(ticket, self.delay());
        }
    }

    fn rebuild_layout(&mut self, host: &mut impl Host) {
        self.refreshing = true;
        let layout = build_layout(
            host,
            &mut self.sequence,
            self.options.obstacle_count,
            self.options.obstacle_mode,
            &mut self.rng,
        );
        self.sequence = layout.sequence;
        self.target_count = layout.target_count;
        if layout.target_count > 0 {
            // The panel can only hold a selectable count
            self.options.obstacle_count = layout.obstacle_count;
        }
        self.refreshing = false;
    }
}
