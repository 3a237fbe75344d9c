//! End-to-end sweep scenarios against the headless host

use glam::Vec2;
use running_man::host::{Shot, TargetChange, TargetHost};
use running_man::platform::HeadlessHost;
use running_man::sim::{Direction, Phase, Role, RunningMan};
use running_man::{ExerciseOptions, ObstacleMode, Speed, StartingSide};

/// 640px arena with 100px targets fits 5 slots
fn setup(side: StartingSide, mode: ObstacleMode) -> (RunningMan, HeadlessHost) {
    let mut host = HeadlessHost::new(640.0, 480.0).with_target_size(Vec2::new(100.0, 200.0));
    let mut exercise = RunningMan::new(ExerciseOptions {
        obstacle_count: 2,
        speed: Speed::Medium,
        starting_side: side,
        obstacle_mode: mode,
        seed: Some(2024),
    });
    exercise.init(&mut host);
    (exercise, host)
}

fn index(exercise: &RunningMan) -> usize {
    exercise.sweep().map(|s| s.index).unwrap()
}

fn visible_runners(exercise: &RunningMan) -> usize {
    exercise
        .sequence()
        .iter()
        .filter(|s| s.role == Role::Runner && s.visible)
        .count()
}

fn shot() -> Shot {
    Shot {
        pos: Vec2::ZERO,
        timestamp: 0,
    }
}

#[test]
fn test_medium_left_timeline() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Surprise);
    assert_eq!(index(&exercise), 0);
    assert_eq!(exercise.sequence().visible_count(), 1);
    let first_row: Vec<_> = exercise.sequence().iter().map(|s| s.target).collect();

    for k in 1..=4u64 {
        host.advance_to(&mut exercise, k * 1000 - 1);
        assert_eq!(index(&exercise), (k - 1) as usize, "no tick before {}ms", k * 1000);

        host.advance_to(&mut exercise, k * 1000);
        assert_eq!(index(&exercise), k as usize);
        assert!(exercise.sequence().get(k as usize).unwrap().visible);
        assert!(!exercise.sequence().get(k as usize - 1).unwrap().visible);
        assert_eq!(exercise.sequence().visible_count(), 1);
        assert_eq!(host.next_due(), Some((k + 1) * 1000));
    }

    // Slot 4 -> off the end: re-arrange and restart at slot 0
    host.advance_to(&mut exercise, 5000);
    let sweep = exercise.sweep().unwrap();
    assert_eq!(sweep.index, 0);
    assert_eq!(sweep.direction, Direction::Forward);
    assert!(exercise.sequence().get(0).unwrap().visible);
    assert_eq!(exercise.sequence().visible_count(), 1);
    assert!(first_row.iter().all(|id| !exercise.sequence().contains(*id)));
    assert_eq!(exercise.sequence().len(), 5);
    assert_eq!(host.next_due(), Some(6000));
    assert_eq!(host.pending_timers(), 1);
}

#[test]
fn test_right_start_walks_backward() {
    let (mut exercise, mut host) = setup(StartingSide::Right, ObstacleMode::Surprise);
    assert_eq!(index(&exercise), 4);

    for expected in (0..4).rev() {
        host.advance_by(&mut exercise, 1000);
        assert_eq!(index(&exercise), expected);
        assert_eq!(exercise.sweep().unwrap().direction, Direction::Backward);
    }

    host.advance_by(&mut exercise, 1000);
    assert_eq!(index(&exercise), 4);
    assert_eq!(exercise.sweep().unwrap().direction, Direction::Backward);
}

#[test]
fn test_known_obstacles_stay_up() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Known);
    for _ in 0..12 {
        host.advance_by(&mut exercise, 1000);
        assert!(visible_runners(&exercise) <= 1);
        assert!(
            exercise
                .sequence()
                .iter()
                .filter(|s| s.role == Role::Obstacle)
                .all(|s| s.visible && host.is_visible(s.target))
        );
    }
}

#[test]
fn test_surprise_never_shows_two_slots() {
    let (mut exercise, mut host) = setup(StartingSide::Random, ObstacleMode::Surprise);
    for _ in 0..40 {
        host.advance_by(&mut exercise, 1000);
        assert_eq!(exercise.sequence().visible_count(), 1);
        assert_eq!(host.visible_targets().len(), 1);
    }
}

#[test]
fn test_direction_change_waits_for_boundary() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Surprise);
    host.advance_to(&mut exercise, 2000);
    exercise.set_starting_side(StartingSide::Right);

    host.advance_to(&mut exercise, 4000);
    assert_eq!(index(&exercise), 4);
    assert_eq!(exercise.sweep().unwrap().direction, Direction::Forward);

    host.advance_to(&mut exercise, 5000);
    assert_eq!(index(&exercise), 4);
    assert_eq!(exercise.sweep().unwrap().direction, Direction::Backward);
}

#[test]
fn test_speed_change_applies_to_next_tick() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Surprise);
    exercise.set_speed(Speed::VeryFast);

    // Already scheduled tick keeps its Medium delay
    host.advance_to(&mut exercise, 1000);
    assert_eq!(index(&exercise), 1);
    assert_eq!(host.next_due(), Some(1200));

    host.advance_to(&mut exercise, 1400);
    assert_eq!(index(&exercise), 3);
}

#[test]
fn test_reset_mid_sweep_stops_chain() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Surprise);
    host.advance_to(&mut exercise, 3000);
    assert_eq!(index(&exercise), 3);

    let on_arena = host.visible_targets();
    exercise.reset(&on_arena, &mut host);
    assert_eq!(exercise.phase(), Phase::Idle);
    assert_eq!(index(&exercise), 0);
    assert_eq!(exercise.score(), 0);
    assert_eq!(host.feed_text(), "Score: 0");
    // Timer from the old chain is still pending
    assert_eq!(host.pending_timers(), 1);

    // It finishes its own step and then does not reschedule
    host.advance_to(&mut exercise, 4000);
    assert_eq!(index(&exercise), 1);
    assert_eq!(host.pending_timers(), 0);

    host.advance_to(&mut exercise, 20_000);
    assert_eq!(index(&exercise), 1);

    // A fresh start brings the sweep back
    exercise.start(&mut host);
    assert_eq!(exercise.phase(), Phase::Running);
    assert_eq!(index(&exercise), 0);
    host.advance_to(&mut exercise, 21_000);
    assert_eq!(index(&exercise), 1);
    assert_eq!(host.pending_timers(), 1);
}

#[test]
fn test_restart_supersedes_old_chain() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Surprise);
    host.advance_to(&mut exercise, 500);
    exercise.reset(&[], &mut host);
    exercise.start(&mut host);
    // Old tick at 1000, new chain at 1500
    assert_eq!(host.pending_timers(), 2);

    host.advance_to(&mut exercise, 1000);
    assert_eq!(index(&exercise), 0, "stale tick must not move the new chain");
    assert_eq!(host.pending_timers(), 1);

    host.advance_to(&mut exercise, 1500);
    assert_eq!(index(&exercise), 1);
}

#[test]
fn test_second_reset_keeps_superseded_chain_dead() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Surprise);
    host.advance_to(&mut exercise, 500);
    exercise.reset(&[], &mut host);
    exercise.start(&mut host);
    host.advance_to(&mut exercise, 600);
    exercise.reset(&[], &mut host);

    // Only the newest chain takes its last step, at 1500
    host.advance_to(&mut exercise, 2000);
    assert_eq!(index(&exercise), 1);
    assert_eq!(exercise.sequence().visible_count(), 1);
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn test_removal_before_runner_keeps_one_visible() {
    let mut host = HeadlessHost::new(640.0, 480.0).with_target_size(Vec2::new(100.0, 200.0));
    let mut exercise = RunningMan::new(ExerciseOptions {
        obstacle_count: 0,
        speed: Speed::Medium,
        starting_side: StartingSide::Left,
        obstacle_mode: ObstacleMode::Known,
        seed: Some(7),
    });
    exercise.init(&mut host);
    host.advance_to(&mut exercise, 2000);
    assert_eq!(index(&exercise), 2);
    let showing = exercise.sequence().get(2).unwrap().target;

    let first = exercise.sequence().get(0).unwrap().target;
    host.remove_target(first);
    exercise.target_update(first, TargetChange::Removed, &mut host);
    assert_eq!(index(&exercise), 1);
    assert_eq!(exercise.sequence().get(1).unwrap().target, showing);

    host.advance_to(&mut exercise, 3000);
    assert_eq!(index(&exercise), 2);
    assert_eq!(visible_runners(&exercise), 1);
    assert_eq!(host.visible_targets().len(), 1);
    assert!(!host.is_visible(showing));
}

#[test]
fn test_destroy_stops_sweep() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Known);
    host.advance_to(&mut exercise, 2500);
    exercise.destroy(&mut host);
    assert_eq!(host.target_count(), 0);

    host.advance_to(&mut exercise, 10_000);
    assert_eq!(host.pending_timers(), 0);
    assert_eq!(host.target_count(), 0);
    assert!(exercise.sweep().is_none());
}

#[test]
fn test_obstacle_hit_off_ui_context_is_dispatched() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Known);
    let obstacle = exercise
        .sequence()
        .iter()
        .find(|s| s.role == Role::Obstacle)
        .unwrap()
        .target;

    let hit = host.shoot(obstacle);
    host.off_ui_context(|h| exercise.shot_listener(&shot(), hit.as_ref(), h));

    assert_eq!(exercise.score(), 0);
    assert_eq!(host.pending_ui_tasks(), 1);
    assert!(exercise.sequence().contains(obstacle));

    host.run_ui_tasks(&mut exercise);
    assert_eq!(host.pending_ui_tasks(), 0);
    assert!(!exercise.sequence().contains(obstacle));
    assert_eq!(exercise.sequence().len(), 5);
}

#[test]
fn test_scoring_the_running_man() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Surprise);
    let mut hits = 0;
    for _ in 0..10 {
        let current = exercise.sequence().get(index(&exercise)).copied().unwrap();
        if current.role == Role::Runner {
            let hit = host.shoot(current.target);
            exercise.shot_listener(&shot(), hit.as_ref(), &mut host);
            hits += 1;
            assert_eq!(host.feed_text(), format!("Score: {}", hits));
        }
        // The slot that was just left is hidden, shots pass through
        host.advance_by(&mut exercise, 1000);
        let hit = host.shoot(current.target);
        exercise.shot_listener(&shot(), hit.as_ref(), &mut host);
        assert_eq!(exercise.score(), hits);
    }
}

#[test]
fn test_degenerate_arena_never_ticks() {
    let mut host = HeadlessHost::new(120.0, 480.0).with_target_size(Vec2::new(100.0, 200.0));
    let mut exercise = RunningMan::new(ExerciseOptions::default());
    exercise.init(&mut host);
    host.advance_to(&mut exercise, 60_000);
    assert_eq!(exercise.phase(), Phase::Idle);
    assert_eq!(host.target_count(), 0);
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn test_arena_shrinking_to_nothing_stops_at_boundary() {
    let (mut exercise, mut host) = setup(StartingSide::Left, ObstacleMode::Known);
    host.set_arena_size(100.0, 480.0);

    // Current row keeps running until the runner leaves it
    host.advance_to(&mut exercise, 4000);
    assert_eq!(index(&exercise), 4);
    assert_eq!(exercise.phase(), Phase::Running);

    host.advance_to(&mut exercise, 5000);
    assert_eq!(exercise.phase(), Phase::Idle);
    assert!(exercise.sweep().is_none());
    assert_eq!(host.target_count(), 0);
    assert_eq!(host.pending_timers(), 0);
    assert!(exercise.obstacle_count_choices().is_empty());
}
