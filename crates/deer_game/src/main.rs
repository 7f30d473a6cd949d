//! Deer run -- headless host and entry point.
//!
//! Loads the game config and an input replay, then drives the world one
//! replay frame at a time:
//!
//!   1. `sync_held()` -- turn the frame's held keys into press/release edges
//!   2. `World::frame()` -- update, fixed steps, late phase, animation
//!   3. `end_frame()` -- clear the edges
//!
//! Usage: `deer_game [config.json] [replay.json]`. Escape in the replay ends
//! the run early. The end-of-run summary goes to the log.

mod audio;
mod config;
mod physics;
mod replay;
mod scene;
mod world;

use std::path::{Path, PathBuf};

use deer_core::animation::{load_clip_set, ClipSet};
use deer_core::input::{InputState, Key};

use config::load_config_from_path;
use replay::load_replay_from_path;
use world::World;

const CONFIG_PATH: &str = "assets/config/game.json";
const REPLAY_PATH: &str = "assets/replays/run_forward.json";

fn load_clips(path: Option<&str>) -> Option<ClipSet> {
    let path = path?;
    match load_clip_set(Path::new(path)) {
        Ok(clips) => {
            log::info!("Loaded clip set '{}' from {path}", clips.animation_id);
            Some(clips)
        }
        Err(err) => {
            log::warn!("{err}; animating without clips");
            None
        }
    }
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().map_or_else(|| PathBuf::from(CONFIG_PATH), PathBuf::from);
    let replay_path = args.next().map_or_else(|| PathBuf::from(REPLAY_PATH), PathBuf::from);

    let config = load_config_from_path(&config_path)?;
    log::info!("Config loaded from {} (seed {})", config_path.display(), config.seed);
    let clips = load_clips(config.clip_set.as_deref());

    let replay = load_replay_from_path(&replay_path)?;
    let frames = replay.expanded_frames();
    log::info!(
        "Replay loaded from {}: {} frames, {:.1}s",
        replay_path.display(),
        frames.len(),
        replay.duration()
    );

    let mut world = World::new(config, clips);
    world.init();

    let mut input = InputState::new();
    for frame in &frames {
        input.sync_held(&frame.keys);
        if input.is_just_pressed(Key::Escape) {
            log::info!("Escape pressed, stopping replay");
            break;
        }
        world.frame(frame.dt, &input);
        input.end_frame();
    }

    let summary = world.summary();
    log::info!(
        "Run finished after {} frames ({} fixed steps)",
        summary.frames,
        summary.fixed_steps
    );
    log::info!(
        "Deer at ({:.2}, {:.2}), {:?}, animation {}, health {:.1}",
        summary.position.x,
        summary.position.y,
        summary.player_state,
        summary.animation,
        summary.health
    );
    log::info!(
        "Map ring {:?}, rotations {}, start removed: {}, end spawned: {}",
        summary.ring,
        summary.rotation_count,
        summary.start_segment_removed,
        summary.end_segment_spawned
    );
    log::info!(
        "Antidotes: {} spawned, {} collected, {} landed; deaths {}, restarts {}, sounds {}",
        summary.antidotes_spawned,
        summary.antidotes_collected,
        summary.antidotes_landed,
        summary.deaths,
        summary.restarts,
        summary.sounds_played
    );

    let scene = world.map().placer();
    if scene.is_empty() {
        log::warn!("Run ended without a map");
    } else {
        let prefabs: Vec<&str> = scene.sorted().iter().map(|s| s.prefab.as_str()).collect();
        log::info!(
            "Scene: {prefabs:?} live, {} placed, {} destroyed",
            scene.placed_total(),
            scene.destroyed_total()
        );
        let length = world.map().config().segment_length;
        if let Some(segment) = scene.segment_under(summary.position.x, length) {
            log::info!("Deer is standing on '{}' ({:?})", segment.prefab, segment.kind);
        }
    }
    log::info!(
        "Camera x={:.2}, health bar {:.0}px, sprite '{}', {} antidotes in flight, {} unassigned sound cues",
        world.camera().position.x,
        world.health_bar_px(),
        world.animator().sprite_id(),
        world.antidotes().len(),
        world.sounds().missing()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Deer run starting...");
    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
