//! Follow camera with velocity look-ahead.
//!
//! The camera sits at `target + offset`, shifted along x toward where the
//! target is heading, and eases there with a critically damped spring so it
//! never overshoots.

use glam::Vec3;
use serde::Deserialize;

use crate::lifecycle::{TargetHandle, Tickable};

/// Below this horizontal speed the look-ahead relaxes back to centre.
const LOOK_AHEAD_MIN_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_offset")]
    pub offset: Vec3,
    #[serde(default = "default_follow_speed")]
    pub follow_speed: f32,
    #[serde(default = "default_look_ahead_distance")]
    pub look_ahead_distance: f32,
    #[serde(default = "default_look_ahead_speed")]
    pub look_ahead_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: default_offset(),
            follow_speed: default_follow_speed(),
            look_ahead_distance: default_look_ahead_distance(),
            look_ahead_speed: default_look_ahead_speed(),
        }
    }
}

pub struct FollowCamera {
    config: CameraConfig,
    target: TargetHandle,
    pub position: Vec3,
    velocity: Vec3,
    look_ahead_x: f32,
    target_look_ahead_x: f32,
}

impl FollowCamera {
    pub fn new(config: CameraConfig, target: TargetHandle) -> Self {
        let position = target.position() + config.offset;
        Self {
            config,
            target,
            position,
            velocity: Vec3::ZERO,
            look_ahead_x: 0.0,
            target_look_ahead_x: 0.0,
        }
    }

    pub fn look_ahead_x(&self) -> f32 {
        self.look_ahead_x
    }

    /// Change the offset and jump straight to it.
    pub fn set_offset(&mut self, offset: Vec3) {
        self.config.offset = offset;
        self.snap();
    }

    pub fn set_follow_speed(&mut self, speed: f32) {
        self.config.follow_speed = speed;
    }

    pub fn snap(&mut self) {
        self.position = self.target.position() + self.config.offset;
        self.velocity = Vec3::ZERO;
        self.look_ahead_x = 0.0;
        self.target_look_ahead_x = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        let sample = self.target.sample();

        self.target_look_ahead_x = if sample.velocity.x.abs() > LOOK_AHEAD_MIN_SPEED {
            self.config.look_ahead_distance * sample.velocity.x.signum()
        } else {
            0.0
        };
        self.look_ahead_x = lerp(
            self.look_ahead_x,
            self.target_look_ahead_x,
            dt * self.config.look_ahead_speed,
        );

        let mut goal = sample.position + self.config.offset;
        goal.x += self.look_ahead_x;

        let smooth_time = if self.config.follow_speed > 0.0 {
            1.0 / self.config.follow_speed
        } else {
            f32::MAX
        };
        self.position = smooth_damp(self.position, goal, &mut self.velocity, smooth_time, dt);

        if self.position.distance(goal) > 0.1 {
            log::trace!(
                "Camera following: goal {goal}, at {}, look-ahead {:.2}",
                self.position,
                self.look_ahead_x
            );
        }
    }
}

impl Tickable for FollowCamera {
    fn init(&mut self) {
        self.snap();
    }

    fn on_late_tick(&mut self, dt: f32) {
        self.update(dt);
    }
}

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Critically damped spring toward `target`, reaching it in about
/// `smooth_time` seconds. Never overshoots.
pub fn smooth_damp(current: Vec3, target: Vec3, velocity: &mut Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = (output - target) / dt;
    }
    output
}

fn default_offset() -> Vec3 {
    Vec3::new(0.0, 4.0, -10.0)
}

const fn default_follow_speed() -> f32 {
    5.0
}

const fn default_look_ahead_distance() -> f32 {
    3.0
}

const fn default_look_ahead_speed() -> f32 {
    2.0
}
