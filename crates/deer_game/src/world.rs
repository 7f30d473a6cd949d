//! The headless game world. Owns every component and runs them in frame
//! order:
//!
//!   1. update: restart key, ground probe and movement input, health drain,
//!      antidote spawner
//!   2. fixed steps: velocity assignment, physics, antidote fall, trigger
//!      contacts
//!   3. publish the follow-target sample
//!   4. late: map ring, follow camera
//!   5. animation intent and clip playback, sound cues
//!
//! Components never talk to each other directly; the world routes health
//! events, collisions and sound cues between them.

use deer_core::animation::{ClipSet, DeerAnimator, DeerEvent, DeerState};
use deer_core::antidote::{Antidote, AntidoteSpawner};
use deer_core::camera::FollowCamera;
use deer_core::health::{health_bar_width, Health, HealthEvent};
use deer_core::input::{InputState, Key};
use deer_core::lifecycle::{
    CollisionListener, CollisionTag, EntityId, TargetHandle, TargetSample, Tickable,
};
use deer_core::map::MapManager;
use deer_core::movement::Movement;
use deer_core::player::{PlayerController, PlayerState};
use deer_core::time::FrameClock;
use glam::Vec2;

use crate::audio::SoundLibrary;
use crate::config::GameConfig;
use crate::physics::{Aabb, Body};
use crate::scene::SceneGraph;

const DEBUG_HEAL_AMOUNT: f32 = 10.0;
/// Horizontal speed under which the deer counts as standing still.
const IDLE_SPEED: f32 = 0.01;
const SPAWNER_SEED_SALT: u64 = 0xA471_D07E;

#[derive(Debug, Clone, Default)]
struct RunStats {
    antidotes_spawned: u32,
    antidotes_collected: u32,
    antidotes_landed: u32,
    deaths: u32,
    restarts: u32,
}

/// End-of-run report.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub fixed_steps: u64,
    pub position: Vec2,
    pub health: f32,
    pub player_state: PlayerState,
    pub animation: DeerState,
    pub ring: Vec<f32>,
    pub rotation_count: i32,
    pub start_segment_removed: bool,
    pub end_segment_spawned: bool,
    pub antidotes_spawned: u32,
    pub antidotes_collected: u32,
    pub antidotes_landed: u32,
    pub deaths: u32,
    pub restarts: u32,
    pub sounds_played: usize,
}

pub struct World {
    config: GameConfig,
    clock: FrameClock,
    target: TargetHandle,
    body: Body,
    movement: Movement,
    health: Health,
    player: PlayerController,
    animator: DeerAnimator,
    sounds: SoundLibrary,
    camera: FollowCamera,
    map: MapManager<SceneGraph>,
    spawner: AntidoteSpawner,
    antidotes: Vec<Antidote>,
    next_entity: u32,
    health_bar_px: f32,
    stats: RunStats,
}

impl World {
    pub fn new(config: GameConfig, clips: Option<ClipSet>) -> Self {
        let target = TargetHandle::default();
        let body = Body::new(Vec2::ZERO, config.physics.player_half_extents);

        Self {
            clock: FrameClock::new(config.fixed_dt),
            body,
            movement: Movement::new(config.movement),
            health: Health::new(config.health),
            player: PlayerController::new(),
            animator: DeerAnimator::new(clips),
            sounds: SoundLibrary::new(&config.audio),
            camera: FollowCamera::new(config.camera, target.clone()),
            map: MapManager::new(
                config.map.clone(),
                SceneGraph::new(),
                target.clone(),
                config.seed,
            ),
            spawner: AntidoteSpawner::new(
                config.spawner,
                target.clone(),
                config.seed ^ SPAWNER_SEED_SALT,
            ),
            antidotes: Vec::new(),
            next_entity: EntityId::GROUND.0 + 1,
            health_bar_px: 0.0,
            stats: RunStats::default(),
            target,
            config,
        }
    }

    /// Start-of-run hooks. The target is published first so everything that
    /// reads it at init sees the spawn position.
    pub fn init(&mut self) {
        self.publish_target();
        self.map.init();
        self.spawner.init();
        self.camera.init();
        self.drain_health_events();
        log::info!(
            "World ready: {} map segments, health {:.0}/{:.0}",
            self.map.len(),
            self.health.current(),
            self.health.max()
        );
    }

    /// Run one frame of `real_dt` seconds with the given input snapshot.
    pub fn frame(&mut self, real_dt: f32, input: &InputState) {
        let dt = self.clock.begin_frame(real_dt);

        // Update phase
        if input.is_just_pressed(Key::R) && !self.player.is_alive() {
            self.restart();
        }

        let grounded = self
            .body
            .probe_ground(self.movement.config.ground_check_distance, &self.config.physics);
        let moved = self.movement.update(
            input.horizontal_axis(),
            input.jump_pressed(),
            grounded,
            &mut self.body.velocity,
        );
        if moved.jumped {
            self.animate(DeerEvent::Jump);
        }

        if self.config.debug_keys && input.is_just_pressed(Key::Digit0) {
            log::debug!("Debug heal +{DEBUG_HEAL_AMOUNT}");
            self.health.modify(DEBUG_HEAL_AMOUNT);
        }

        self.health.on_tick(dt);
        self.drain_health_events();

        self.spawner.on_tick(dt);
        for position in self.spawner.take_spawns() {
            let id = EntityId(self.next_entity);
            self.next_entity += 1;
            self.antidotes
                .push(Antidote::new(id, position, self.config.antidote));
            self.stats.antidotes_spawned += 1;
        }

        // Fixed phase
        while self.clock.should_step() {
            let fixed_dt = self.clock.fixed_dt;
            self.movement.fixed_update(&mut self.body.velocity);
            self.body.step(fixed_dt, &self.config.physics);
            for antidote in &mut self.antidotes {
                antidote.on_fixed_tick(fixed_dt);
            }
            self.resolve_contacts();
            self.antidotes.retain(|a| !a.is_despawned());
        }
        self.drain_health_events();

        self.publish_target();

        // Late phase
        self.map.on_late_tick(dt);
        self.camera.on_late_tick(dt);

        self.update_locomotion();
        let dt_us = (f64::from(dt) * 1_000_000.0).round() as u64;
        if let Some(cue) = self.animator.tick(dt_us) {
            self.sounds.play(cue);
        }
    }

    /// Put the run back to its starting state after a death.
    pub fn restart(&mut self) {
        log::info!("Restarting run");
        self.health.reset();
        self.player.reset();
        self.movement.reset();
        self.body = Body::new(Vec2::ZERO, self.config.physics.player_half_extents);
        self.animator.reset();
        if self.map.reset().is_err() {
            log::warn!("Restarted without a map");
        }
        self.spawner.reset();
        self.antidotes.clear();
        self.publish_target();
        self.camera.snap();
        self.drain_health_events();
        self.stats.restarts += 1;
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.clock.frame_count,
            fixed_steps: self.clock.fixed_step_count,
            position: self.body.position,
            health: self.health.current(),
            player_state: self.player.state(),
            animation: self.animator.state(),
            ring: self.map.positions(),
            rotation_count: self.map.rotation_count(),
            start_segment_removed: self.map.start_segment_removed(),
            end_segment_spawned: self.map.end_segment_spawned(),
            antidotes_spawned: self.stats.antidotes_spawned,
            antidotes_collected: self.stats.antidotes_collected,
            antidotes_landed: self.stats.antidotes_landed,
            deaths: self.stats.deaths,
            restarts: self.stats.restarts,
            sounds_played: self.sounds.played().len(),
        }
    }

    pub fn map(&self) -> &MapManager<SceneGraph> {
        &self.map
    }

    pub fn camera(&self) -> &FollowCamera {
        &self.camera
    }

    pub fn animator(&self) -> &DeerAnimator {
        &self.animator
    }

    pub fn sounds(&self) -> &SoundLibrary {
        &self.sounds
    }

    pub fn antidotes(&self) -> &[Antidote] {
        &self.antidotes
    }

    pub fn health_bar_px(&self) -> f32 {
        self.health_bar_px
    }

    fn publish_target(&self) {
        self.target.publish(TargetSample {
            position: self.body.position.extend(0.0),
            velocity: self.body.velocity.extend(0.0),
        });
    }

    /// Trigger overlaps for this step. Each contact is delivered to both
    /// sides; the health side restores, the antidote side only despawns.
    fn resolve_contacts(&mut self) {
        let player_box = self.body.aabb();
        let alive = self.player.is_alive();
        let ground_y = self.config.physics.ground_y;

        for antidote in &mut self.antidotes {
            if antidote.is_despawned() {
                continue;
            }
            let bounds = Aabb::new(
                antidote.position.truncate(),
                Vec2::splat(antidote.half_extent()),
            );
            if alive && bounds.intersects(&player_box) {
                self.health.on_collision(antidote.id, CollisionTag::Antidote);
                antidote.on_collision(EntityId::PLAYER, CollisionTag::Player);
                self.stats.antidotes_collected += 1;
            } else if bounds.min().y <= ground_y {
                antidote.on_collision(EntityId::GROUND, CollisionTag::Ground);
                self.stats.antidotes_landed += 1;
            }
        }
    }

    fn drain_health_events(&mut self) {
        for event in self.health.take_events() {
            match event {
                HealthEvent::Changed { current, .. } => {
                    self.health_bar_px = health_bar_width(current);
                }
                HealthEvent::CriticalEntered => {
                    log::warn!("Health critical: {:.0}", self.health.current());
                }
                HealthEvent::AntidoteCollected => self.animate(DeerEvent::TakeAntidote),
                HealthEvent::Depleted => {}
            }

            if self.player.handle(&event) == Some(PlayerState::Dead) {
                self.movement.disable(&mut self.body.velocity);
                self.animate(DeerEvent::Die);
                self.stats.deaths += 1;
                log::info!(
                    "Deer died at x={:.1}; press R to restart",
                    self.body.position.x
                );
            }
        }
    }

    /// Idle/run intent from the body, once grounded and not mid one-shot.
    fn update_locomotion(&mut self) {
        if !self.player.is_alive()
            || self.animator.is_busy()
            || !self.body.on_ground
            || self.body.velocity.y > 0.0
        {
            return;
        }
        let speed = self.body.velocity.x.abs();
        if speed > IDLE_SPEED && self.movement.config.move_speed > 0.0 {
            self.animate(DeerEvent::Run(speed / self.movement.config.move_speed));
        } else {
            self.animate(DeerEvent::SetIdle);
        }
    }

    fn animate(&mut self, event: DeerEvent) {
        if let Some(cue) = self.animator.apply(event) {
            self.sounds.play(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioConfig;
    use crate::config::load_config_from_path;
    use crate::replay::load_replay_from_path;
    use deer_core::animation::load_clip_set;
    use deer_core::map::{MapConfig, SegmentKind};
    use glam::Vec3;

    const FRAME_DT: f32 = 1.0 / 60.0;

    fn test_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.seed = 7;
        config.map = MapConfig {
            start_prefab: Some("start".to_string()),
            end_prefab: Some("end".to_string()),
            connector_prefabs: vec![
                "meadow".to_string(),
                "creek".to_string(),
                "birch".to_string(),
            ],
            ..MapConfig::default()
        };
        config.audio = AudioConfig {
            jump: Some("sfx/jump.ogg".to_string()),
            death: Some("sfx/death.ogg".to_string()),
            antidote: Some("sfx/antidote.ogg".to_string()),
        };
        config
    }

    fn world(config: GameConfig) -> World {
        let mut world = World::new(config, None);
        world.init();
        world
    }

    fn run(world: &mut World, input: &mut InputState, keys: &[Key], seconds: f32) {
        let frames = (seconds / FRAME_DT).round() as u32;
        for _ in 0..frames {
            input.sync_held(keys);
            world.frame(FRAME_DT, input);
            input.end_frame();
        }
    }

    #[test]
    fn init_builds_the_ring_and_fills_the_health_bar() {
        let world = world(test_config());
        assert_eq!(world.map().positions(), vec![0.0, 30.0, 60.0]);
        assert_eq!(world.health_bar_px(), 300.0);
        let expected = world.target.position() + world.config.camera.offset;
        assert!((world.camera().position - expected).length() < 1e-5);
    }

    #[test]
    fn running_right_reaches_the_end_segment() {
        let mut world = world(test_config());
        let mut input = InputState::new();
        // 50s at 7 units/s ends inside cell 11, where the budget runs out.
        run(&mut world, &mut input, &[Key::Right], 50.0);

        let summary = world.summary();
        assert_eq!(summary.player_state, PlayerState::Alive);
        assert!(
            summary.position.x > 330.0 && summary.position.x < 360.0,
            "x = {}",
            summary.position.x
        );
        assert!(summary.start_segment_removed);
        assert!(summary.end_segment_spawned);
        assert_eq!(summary.rotation_count, 10);
        assert_eq!(summary.ring, vec![330.0, 360.0, 390.0]);
        assert_eq!(summary.animation, DeerState::Run);
        assert_eq!(
            world.map().segments().last().map(|s| s.kind),
            Some(SegmentKind::End)
        );
        assert_eq!(world.map().placer().len(), 3);
    }

    #[test]
    fn same_seed_same_run() {
        let script: [(&[Key], f32); 4] = [
            (&[Key::Right], 5.0),
            (&[Key::Right, Key::Space], 0.1),
            (&[Key::Left], 3.0),
            (&[], 4.0),
        ];
        let play = || {
            let mut world = world(test_config());
            let mut input = InputState::new();
            for (keys, seconds) in script {
                run(&mut world, &mut input, keys, seconds);
            }
            world.summary()
        };

        let first = play();
        assert!(first.antidotes_spawned > 0);
        assert_eq!(first, play());
    }

    #[test]
    fn death_freezes_the_deer_until_restart() {
        let mut config = test_config();
        config.health.drain_rate = 10.0;
        // Keep every drop clear of the idle deer.
        config.spawner.min_offset = 5.0;
        let mut world = world(config);
        let mut input = InputState::new();

        run(&mut world, &mut input, &[], 12.0);
        let summary = world.summary();
        assert_eq!(summary.player_state, PlayerState::Dead);
        assert_eq!(summary.animation, DeerState::Death);
        assert_eq!(summary.deaths, 1);
        assert!(world
            .sounds()
            .played()
            .contains(&"sfx/death.ogg".to_string()));

        run(&mut world, &mut input, &[Key::Right], 1.0);
        assert_eq!(world.body.position.x, 0.0);

        run(&mut world, &mut input, &[Key::R], FRAME_DT);
        let summary = world.summary();
        assert_eq!(summary.player_state, PlayerState::Alive);
        assert_eq!(summary.restarts, 1);
        assert_eq!(summary.ring, vec![0.0, 30.0, 60.0]);
        assert!(summary.health > 99.0);
        // Only the drop the restarted spawner makes straight away.
        assert_eq!(world.antidotes().len(), 1);
    }

    #[test]
    fn missing_prefabs_leave_an_empty_map() {
        let mut world = world(GameConfig::default());
        let mut input = InputState::new();
        run(&mut world, &mut input, &[Key::Right], 5.0);

        assert!(!world.map().is_initialized());
        assert!(world.map().is_empty());
        assert!(world.body.position.x > 30.0);
    }

    #[test]
    fn caught_antidote_restores_health_once() {
        let mut config = test_config();
        config.health.starting_health = 50.0;
        let mut world = world(config);
        world.spawner.stop();
        world.antidotes.push(Antidote::new(
            EntityId(100),
            Vec3::new(0.0, 1.0, 0.0),
            world.config.antidote,
        ));

        world.frame(0.02, &InputState::new());

        let summary = world.summary();
        assert_eq!(summary.antidotes_collected, 1);
        assert!((summary.health - 89.98).abs() < 1e-3, "health = {}", summary.health);
        assert!(world.antidotes().is_empty());
        assert!(world
            .sounds()
            .played()
            .contains(&"sfx/antidote.ogg".to_string()));
    }

    #[test]
    fn missed_antidote_lands_and_despawns() {
        let mut world = world(test_config());
        world.spawner.stop();
        world.antidotes.push(Antidote::new(
            EntityId(100),
            Vec3::new(10.0, 0.3, 0.0),
            world.config.antidote,
        ));

        world.frame(0.02, &InputState::new());

        let summary = world.summary();
        assert_eq!(summary.antidotes_landed, 1);
        assert_eq!(summary.antidotes_collected, 0);
        assert!(world.antidotes().is_empty());
    }

    #[test]
    fn jump_plays_its_cue_and_leaves_the_ground() {
        let mut world = world(test_config());
        let mut input = InputState::new();
        run(&mut world, &mut input, &[], 0.2);

        run(&mut world, &mut input, &[Key::Space], FRAME_DT);
        assert_eq!(world.animator().state(), DeerState::Jump);
        assert!(world.body.velocity.y > 0.0);
        assert_eq!(world.sounds().played(), ["sfx/jump.ogg".to_string()]);

        run(&mut world, &mut input, &[], 4.0);
        assert!(world.body.on_ground);
        assert_eq!(world.animator().state(), DeerState::Idle);
    }

    #[test]
    fn debug_heal_needs_the_flag() {
        let mut config = test_config();
        config.health.starting_health = 50.0;
        config.health.drain_rate = 0.0;

        let mut world = self::world(config.clone());
        let mut input = InputState::new();
        run(&mut world, &mut input, &[Key::Digit0], FRAME_DT);
        assert_eq!(world.health.current(), 50.0);

        config.debug_keys = true;
        let mut world = self::world(config);
        run(&mut world, &mut input, &[], FRAME_DT);
        run(&mut world, &mut input, &[Key::Digit0], FRAME_DT);
        assert_eq!(world.health.current(), 60.0);
    }

    #[test]
    fn shipped_assets_play_through() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config =
            load_config_from_path(&root.join("assets/config/game.json")).expect("shipped config");
        let clip_path = root.join(config.clip_set.as_deref().expect("config names a clip set"));
        let clips = load_clip_set(&clip_path).expect("shipped clip set");
        let replay =
            load_replay_from_path(&root.join("assets/replays/run_forward.json")).expect("replay");

        let mut world = World::new(config, Some(clips));
        world.init();
        let mut input = InputState::new();
        for frame in replay.expanded_frames() {
            input.sync_held(&frame.keys);
            if input.is_just_pressed(Key::Escape) {
                break;
            }
            world.frame(frame.dt, &input);
            input.end_frame();
        }

        let summary = world.summary();
        assert_eq!(summary.player_state, PlayerState::Alive);
        assert!(summary.start_segment_removed);
        assert!(summary.end_segment_spawned);
        assert!(world.animator().sprite_id().starts_with("deer_"));
        assert_eq!(world.sounds().missing(), 0);
    }
}
