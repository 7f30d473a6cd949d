//! Runner movement: velocity is assigned directly from input every fixed step.
//!
//! Gravity and ground contact belong to whoever integrates the body. This type
//! only decides the horizontal speed, the jump impulse and which way the deer
//! faces.

use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MovementConfig {
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_jump_force")]
    pub jump_force: f32,
    /// How far below the feet the ground probe reaches.
    #[serde(default = "default_ground_check_distance")]
    pub ground_check_distance: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: default_move_speed(),
            jump_force: default_jump_force(),
            ground_check_distance: default_ground_check_distance(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementEvents {
    pub jumped: bool,
    pub jump_refused: bool,
    pub facing_flipped: bool,
    pub ground_changed: bool,
}

#[derive(Debug, Clone)]
pub struct Movement {
    pub config: MovementConfig,
    enabled: bool,
    axis: f32,
    grounded: bool,
    facing_right: bool,
}

impl Movement {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            enabled: true,
            axis: 0.0,
            grounded: false,
            facing_right: true,
        }
    }

    /// Per-frame input handling. `grounded` is this frame's ground probe result.
    pub fn update(
        &mut self,
        axis: f32,
        jump_pressed: bool,
        grounded: bool,
        velocity: &mut Vec2,
    ) -> MovementEvents {
        let mut events = MovementEvents::default();
        if !self.enabled {
            return events;
        }

        self.axis = axis.clamp(-1.0, 1.0);

        if self.grounded != grounded {
            events.ground_changed = true;
            log::debug!("Ground state changed: {grounded}");
        }
        self.grounded = grounded;

        if jump_pressed {
            if self.grounded {
                velocity.y = self.config.jump_force;
                events.jumped = true;
                log::debug!("Jump executed");
            } else {
                events.jump_refused = true;
                log::debug!("Jump attempted but not grounded");
            }
        }

        if self.axis != 0.0 {
            let should_face_right = self.axis > 0.0;
            if should_face_right != self.facing_right {
                self.facing_right = should_face_right;
                events.facing_flipped = true;
            }
        }

        events
    }

    /// Fixed-step velocity assignment. Vertical speed is left to gravity.
    pub fn fixed_update(&self, velocity: &mut Vec2) {
        if !self.enabled {
            return;
        }
        velocity.x = self.axis * self.config.move_speed;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self, velocity: &mut Vec2) {
        self.enabled = false;
        self.axis = 0.0;
        *velocity = Vec2::ZERO;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn axis(&self) -> f32 {
        self.axis
    }

    pub fn reset(&mut self) {
        self.enabled = true;
        self.axis = 0.0;
        self.grounded = false;
        self.facing_right = true;
    }
}

const fn default_move_speed() -> f32 {
    7.0
}

const fn default_jump_force() -> f32 {
    12.0
}

const fn default_ground_check_distance() -> f32 {
    0.2
}
