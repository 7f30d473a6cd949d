//! Minimal physics stand-in for the headless host: gravity, a flat ground
//! plane, a downward ground probe, and box overlap for trigger contacts.
//!
//! The body's position is its feet. Velocity is integrated explicitly per
//! fixed step; anything that sinks below the ground is pushed back up and
//! loses its downward speed.

use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default)]
    pub ground_y: f32,
    #[serde(default = "default_player_half_extents")]
    pub player_half_extents: Vec2,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            ground_y: 0.0,
            player_half_extents: default_player_half_extents(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub on_ground: bool,
}

impl Body {
    pub fn new(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            half_extents,
            on_ground: false,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.position + Vec2::new(0.0, self.half_extents.y),
            self.half_extents,
        )
    }

    /// Downward probe of length `distance` from the feet.
    pub fn probe_ground(&self, distance: f32, config: &PhysicsConfig) -> bool {
        self.position.y - config.ground_y <= distance
    }

    pub fn step(&mut self, dt: f32, config: &PhysicsConfig) {
        self.velocity.y += config.gravity * dt;
        self.position += self.velocity * dt;

        // Contact comes from the ground resolve, not from a height check.
        if self.position.y <= config.ground_y {
            self.position.y = config.ground_y;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }
    }
}

const fn default_gravity() -> f32 {
    -9.81
}

fn default_player_half_extents() -> Vec2 {
    Vec2::new(0.5, 0.6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_and_rests_on_ground() {
        let config = PhysicsConfig::default();
        let mut body = Body::new(Vec2::new(0.0, 3.0), config.player_half_extents);
        for _ in 0..200 {
            body.step(0.02, &config);
        }
        assert_eq!(body.position.y, 0.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.on_ground);
        assert!(body.probe_ground(0.2, &config));
    }

    #[test]
    fn jump_arc_returns_to_ground() {
        let config = PhysicsConfig::default();
        let mut body = Body::new(Vec2::ZERO, config.player_half_extents);
        body.velocity.y = 12.0;

        body.step(0.02, &config);
        assert!(!body.on_ground);

        let mut peak: f32 = 0.0;
        for _ in 0..300 {
            body.step(0.02, &config);
            peak = peak.max(body.position.y);
        }
        // v^2 / 2g is about 7.3
        assert!(peak > 6.5 && peak < 7.8, "peak = {peak}");
        assert!(body.on_ground);
    }

    #[test]
    fn probe_reaches_only_its_distance() {
        let config = PhysicsConfig::default();
        let body = Body::new(Vec2::new(0.0, 0.3), config.player_half_extents);
        assert!(!body.probe_ground(0.2, &config));
        assert!(body.probe_ground(0.5, &config));
    }

    #[test]
    fn aabb_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(1.0));
        assert!(a.intersects(&Aabb::new(Vec2::new(1.5, 0.0), Vec2::splat(1.0))));
        assert!(!a.intersects(&Aabb::new(Vec2::new(2.0, 0.0), Vec2::splat(1.0))));
        assert!(!a.intersects(&Aabb::new(Vec2::new(0.0, -3.0), Vec2::splat(1.0))));
    }
}
