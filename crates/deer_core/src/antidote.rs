//! Antidote pickups: they fall from above the player and are either caught
//! or land on the ground. The spawner drops one at random intervals.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::lifecycle::{CollisionListener, CollisionTag, EntityId, TargetHandle, Tickable};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AntidoteConfig {
    #[serde(default = "default_fall_speed")]
    pub fall_speed: f32,
    /// Degrees per second around z.
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default = "default_depth")]
    pub depth: f32,
    #[serde(default = "default_half_extent")]
    pub half_extent: f32,
}

impl Default for AntidoteConfig {
    fn default() -> Self {
        Self {
            fall_speed: default_fall_speed(),
            rotation_speed: default_rotation_speed(),
            depth: default_depth(),
            half_extent: default_half_extent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntidoteFate {
    Falling,
    Collected,
    Landed,
}

#[derive(Debug, Clone)]
pub struct Antidote {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation_deg: f32,
    pub fate: AntidoteFate,
    config: AntidoteConfig,
}

impl Antidote {
    pub fn new(id: EntityId, position: Vec3, config: AntidoteConfig) -> Self {
        log::debug!("Antidote {id} spawned at {position}");
        Self {
            id,
            position: Vec3::new(position.x, position.y, config.depth),
            velocity: Vec3::ZERO,
            rotation_deg: 0.0,
            fate: AntidoteFate::Falling,
            config,
        }
    }

    pub fn half_extent(&self) -> f32 {
        self.config.half_extent
    }

    pub fn is_despawned(&self) -> bool {
        self.fate != AntidoteFate::Falling
    }
}

impl Tickable for Antidote {
    fn on_fixed_tick(&mut self, fixed_dt: f32) {
        if self.is_despawned() {
            return;
        }
        self.velocity.y = -self.config.fall_speed;
        self.velocity.z = 0.0;
        self.position += self.velocity * fixed_dt;
        self.position.z = self.config.depth;
        self.rotation_deg = (self.rotation_deg + self.config.rotation_speed * fixed_dt) % 360.0;
    }
}

impl CollisionListener for Antidote {
    fn on_collision(&mut self, other: EntityId, tag: CollisionTag) {
        if self.is_despawned() {
            return;
        }
        match tag {
            CollisionTag::Player => {
                log::debug!("Antidote {} collected by {other}", self.id);
                self.fate = AntidoteFate::Collected;
            }
            CollisionTag::Ground => {
                log::debug!("Antidote {} hit the ground", self.id);
                self.fate = AntidoteFate::Landed;
            }
            CollisionTag::Antidote => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SpawnerConfig {
    #[serde(default = "default_spawn_height")]
    pub spawn_height: f32,
    /// z of each drop; the same render depth antidotes fall at.
    #[serde(default = "default_depth")]
    pub spawn_depth: f32,
    #[serde(default = "default_min_interval")]
    pub min_interval: f32,
    #[serde(default = "default_max_interval")]
    pub max_interval: f32,
    /// Offset from the player on x; negative is behind.
    #[serde(default = "default_min_offset")]
    pub min_offset: f32,
    #[serde(default = "default_max_offset")]
    pub max_offset: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_height: default_spawn_height(),
            spawn_depth: default_depth(),
            min_interval: default_min_interval(),
            max_interval: default_max_interval(),
            min_offset: default_min_offset(),
            max_offset: default_max_offset(),
        }
    }
}

impl SpawnerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_interval <= 0.0 || self.max_interval < self.min_interval {
            return Err(format!(
                "spawn interval range [{}, {}] is invalid",
                self.min_interval, self.max_interval
            ));
        }
        if self.max_offset < self.min_offset {
            return Err(format!(
                "spawn offset range [{}, {}] is invalid",
                self.min_offset, self.max_offset
            ));
        }
        Ok(())
    }
}

/// Drops antidotes around the follow target. Spawns once immediately, then
/// waits a random interval between drops.
pub struct AntidoteSpawner {
    config: SpawnerConfig,
    target: TargetHandle,
    rng: StdRng,
    spawning: bool,
    until_next: f32,
    pending: Vec<Vec3>,
}

impl AntidoteSpawner {
    pub fn new(config: SpawnerConfig, target: TargetHandle, seed: u64) -> Self {
        Self {
            config,
            target,
            rng: StdRng::seed_from_u64(seed),
            spawning: false,
            until_next: 0.0,
            pending: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.spawning = true;
        self.until_next = 0.0;
    }

    pub fn stop(&mut self) {
        self.spawning = false;
        self.pending.clear();
    }

    /// Stop, forget queued drops, and start over. The host clears live
    /// antidotes alongside this.
    pub fn reset(&mut self) {
        self.stop();
        self.start();
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    pub fn until_next(&self) -> f32 {
        self.until_next
    }

    /// Spawn positions produced since the last call.
    pub fn take_spawns(&mut self) -> Vec<Vec3> {
        std::mem::take(&mut self.pending)
    }

    fn spawn(&mut self) {
        let offset = sample_range(&mut self.rng, self.config.min_offset, self.config.max_offset);
        let x = self.target.position().x + offset;
        let position = Vec3::new(x, self.config.spawn_height, self.config.spawn_depth);
        self.pending.push(position);

        self.until_next = sample_range(
            &mut self.rng,
            self.config.min_interval,
            self.config.max_interval,
        );
        log::debug!(
            "Antidote drop at x={x:.1} (offset {offset:.1}); next in {:.1}s",
            self.until_next
        );
    }
}

impl Tickable for AntidoteSpawner {
    fn init(&mut self) {
        self.start();
    }

    fn on_tick(&mut self, dt: f32) {
        if !self.spawning {
            return;
        }
        self.until_next -= dt;
        if self.until_next <= 0.0 {
            self.spawn();
        }
    }
}

fn sample_range(rng: &mut StdRng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

const fn default_fall_speed() -> f32 {
    5.0
}

const fn default_rotation_speed() -> f32 {
    90.0
}

const fn default_depth() -> f32 {
    5.0
}

const fn default_half_extent() -> f32 {
    0.5
}

const fn default_spawn_height() -> f32 {
    15.0
}

const fn default_min_interval() -> f32 {
    3.0
}

const fn default_max_interval() -> f32 {
    7.0
}

const fn default_min_offset() -> f32 {
    -5.0
}

const fn default_max_offset() -> f32 {
    15.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::TargetSample;

    #[test]
    fn antidote_falls_spins_and_keeps_depth() {
        let mut antidote = Antidote::new(EntityId(5), Vec3::new(3.0, 15.0, 0.0), AntidoteConfig::default());
        assert_eq!(antidote.position.z, 5.0);

        for _ in 0..50 {
            antidote.on_fixed_tick(0.02);
        }
        assert!((antidote.position.y - 10.0).abs() < 1e-3);
        assert_eq!(antidote.position.x, 3.0);
        assert_eq!(antidote.position.z, 5.0);
        assert!((antidote.rotation_deg - 90.0).abs() < 1e-3);
    }

    #[test]
    fn contacts_decide_fate_once() {
        let mut caught = Antidote::new(EntityId(5), Vec3::ZERO, AntidoteConfig::default());
        caught.on_collision(EntityId::PLAYER, CollisionTag::Player);
        caught.on_collision(EntityId::GROUND, CollisionTag::Ground);
        assert_eq!(caught.fate, AntidoteFate::Collected);

        let mut dropped = Antidote::new(EntityId(6), Vec3::ZERO, AntidoteConfig::default());
        dropped.on_collision(EntityId::GROUND, CollisionTag::Ground);
        assert_eq!(dropped.fate, AntidoteFate::Landed);
        assert!(dropped.is_despawned());

        let position = dropped.position;
        dropped.on_fixed_tick(1.0);
        assert_eq!(dropped.position, position);
    }

    #[test]
    fn spawner_drops_immediately_then_waits() {
        let target = TargetHandle::new(TargetSample {
            position: Vec3::new(100.0, 0.0, 0.0),
            velocity: Vec3::ZERO,
        });
        let mut spawner = AntidoteSpawner::new(SpawnerConfig::default(), target, 3);
        spawner.init();

        spawner.on_tick(0.016);
        let first = spawner.take_spawns();
        assert_eq!(first.len(), 1);
        assert!(first[0].x >= 95.0 && first[0].x < 115.0);
        assert_eq!(first[0].y, 15.0);
        assert_eq!(first[0].z, 5.0);

        let wait = spawner.until_next();
        assert!((3.0..7.0).contains(&wait));

        spawner.on_tick(wait - 0.5);
        assert!(spawner.take_spawns().is_empty());
        spawner.on_tick(0.6);
        assert_eq!(spawner.take_spawns().len(), 1);
    }

    #[test]
    fn stopped_spawner_is_silent() {
        let mut spawner = AntidoteSpawner::new(SpawnerConfig::default(), TargetHandle::default(), 3);
        spawner.on_tick(100.0);
        assert!(spawner.take_spawns().is_empty());

        spawner.start();
        spawner.on_tick(0.0);
        spawner.stop();
        assert!(spawner.take_spawns().is_empty());
        assert!(!spawner.is_spawning());

        spawner.reset();
        spawner.on_tick(0.0);
        assert_eq!(spawner.take_spawns().len(), 1);
    }

    #[test]
    fn interval_count_over_a_minute_is_bounded() {
        let mut spawner = AntidoteSpawner::new(SpawnerConfig::default(), TargetHandle::default(), 11);
        spawner.start();
        let mut drops = 0;
        for _ in 0..3600 {
            spawner.on_tick(1.0 / 60.0);
            drops += spawner.take_spawns().len();
        }
        // One at t=0, then every 3..7 seconds.
        assert!((9..=21).contains(&drops), "drops = {drops}");
    }

    #[test]
    fn config_validation() {
        assert!(SpawnerConfig::default().validate().is_ok());
        let inverted = SpawnerConfig {
            min_interval: 5.0,
            max_interval: 1.0,
            ..SpawnerConfig::default()
        };
        assert!(inverted.validate().is_err());
    }
}
