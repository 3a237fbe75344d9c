//! Running Man entry point
//!
//! Runs the exercise against the headless host and fires simulated shots
//! at whatever is showing.
//!
//! Usage: `running-man [options.json] [seconds]`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use running_man::host::Shot;
use running_man::platform::HeadlessHost;
use running_man::{ExerciseOptions, RunningMan};

/// Arena the demo runs in (a 720p projector)
const ARENA_WIDTH: f32 = 1280.0;
const ARENA_HEIGHT: f32 = 720.0;
/// Footprint of the running man target
const TARGET_SIZE: Vec2 = Vec2::new(90.0, 250.0);
/// How often the simulated shooter pulls the trigger (ms)
const SHOT_INTERVAL_MS: u64 = 700;
/// Chance a shot lands on a shown target
const HIT_CHANCE: f64 = 0.6;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let options = match args.next() {
        Some(path) => match ExerciseOptions::load(&path) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => ExerciseOptions::default(),
    };
    let seconds: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(30);

    let info = RunningMan::info();
    log::info!("{} v{} by {}", info.name, info.version, info.author);
    if let Ok(json) = serde_json::to_string(&info) {
        log::debug!("Exercise info: {}", json);
    }

    let mut shooter = Pcg32::seed_from_u64(options.seed.unwrap_or(0) ^ 0x5eed);
    let mut host = HeadlessHost::new(ARENA_WIDTH, ARENA_HEIGHT).with_target_size(TARGET_SIZE);
    let mut exercise = RunningMan::new(options);
    exercise.init(&mut host);

    let end = seconds * 1000;
    let mut best = 0;
    while host.now() < end {
        host.advance_by(&mut exercise, SHOT_INTERVAL_MS);

        let shown = host.visible_targets();
        let hit = if !shown.is_empty() && shooter.random_bool(HIT_CHANCE) {
            let target = shown[shooter.random_range(0..shown.len())];
            host.shoot(target)
        } else {
            None
        };
        let shot = Shot {
            pos: Vec2::new(
                shooter.random_range(0.0..ARENA_WIDTH),
                shooter.random_range(0.0..ARENA_HEIGHT),
            ),
            timestamp: host.now(),
        };
        exercise.shot_listener(&shot, hit.as_ref(), &mut host);

        best = best.max(exercise.score());
        log::debug!("t={}ms {}", host.now(), host.feed_text());
    }

    log::info!("Finished after {}s: {} (best {})", seconds, host.feed_text(), best);
    exercise.destroy(&mut host);
}
