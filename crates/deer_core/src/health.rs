//! Poisoned-deer health: drains every frame, antidotes restore it.

use serde::Deserialize;

use crate::lifecycle::{CollisionListener, CollisionTag, EntityId, Tickable};

/// Health bar fill width per point of health (100 health = 300 px).
pub const HEALTH_BAR_PX_PER_POINT: f32 = 3.0;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_max_health")]
    pub max_health: f32,
    #[serde(default = "default_max_health")]
    pub starting_health: f32,
    /// Health lost per second.
    #[serde(default = "default_drain_rate")]
    pub drain_rate: f32,
    #[serde(default = "default_antidote_restore")]
    pub antidote_restore: f32,
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_health: default_max_health(),
            starting_health: default_max_health(),
            drain_rate: default_drain_rate(),
            antidote_restore: default_antidote_restore(),
            critical_threshold: default_critical_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthEvent {
    Changed { current: f32, max: f32 },
    CriticalEntered,
    Depleted,
    AntidoteCollected,
}

#[derive(Debug, Clone)]
pub struct Health {
    config: HealthConfig,
    current: f32,
    dead: bool,
    critical: bool,
    drain_paused: bool,
    events: Vec<HealthEvent>,
}

impl Health {
    pub fn new(config: HealthConfig) -> Self {
        let mut health = Self {
            config,
            current: 0.0,
            dead: false,
            critical: false,
            drain_paused: false,
            events: Vec::new(),
        };
        health.reset();
        health
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.config.max_health
    }

    pub fn percentage(&self) -> f32 {
        if self.config.max_health > 0.0 {
            self.current / self.config.max_health
        } else {
            0.0
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn drain_rate(&self) -> f32 {
        self.config.drain_rate
    }

    /// Add (or with a negative amount, remove) health, clamped to `[0, max]`.
    pub fn modify(&mut self, amount: f32) {
        if self.dead {
            return;
        }

        let previous = self.current;
        self.current = (self.current + amount).clamp(0.0, self.config.max_health);

        if self.current != previous {
            self.events.push(HealthEvent::Changed {
                current: self.current,
                max: self.config.max_health,
            });
        }

        if self.current <= 0.0 {
            self.dead = true;
            log::info!("Health depleted");
            self.events.push(HealthEvent::Depleted);
        }
    }

    pub fn collect_antidote(&mut self) {
        self.modify(self.config.antidote_restore);
        log::debug!("Antidote collected, health now {:.1}", self.current);
        self.events.push(HealthEvent::AntidoteCollected);
    }

    pub fn reset(&mut self) {
        self.current = self.config.starting_health.clamp(0.0, self.config.max_health);
        self.dead = false;
        self.critical = false;
        self.drain_paused = false;
        self.events.push(HealthEvent::Changed {
            current: self.current,
            max: self.config.max_health,
        });
    }

    pub fn set_drain_rate(&mut self, rate: f32) {
        self.config.drain_rate = rate.max(0.0);
    }

    pub fn pause_drain(&mut self) {
        self.drain_paused = true;
    }

    pub fn resume_drain(&mut self) {
        self.drain_paused = false;
    }

    /// Events raised since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<HealthEvent> {
        std::mem::take(&mut self.events)
    }

    fn check_critical(&mut self) {
        let critical = self.current <= self.config.critical_threshold;
        if critical && !self.critical {
            self.critical = true;
            log::debug!("Health critical at {:.1}", self.current);
            self.events.push(HealthEvent::CriticalEntered);
        } else if !critical {
            self.critical = false;
        }
    }
}

impl Tickable for Health {
    fn on_tick(&mut self, dt: f32) {
        if self.dead || self.drain_paused {
            return;
        }
        self.modify(-self.config.drain_rate * dt);
        self.check_critical();
    }
}

impl CollisionListener for Health {
    fn on_collision(&mut self, other: EntityId, tag: CollisionTag) {
        if tag == CollisionTag::Antidote {
            log::debug!("Player touched antidote {other}");
            self.collect_antidote();
        }
    }
}

/// Width of the health bar fill for a given health value.
pub fn health_bar_width(current: f32) -> f32 {
    current * HEALTH_BAR_PX_PER_POINT
}

const fn default_max_health() -> f32 {
    100.0
}

const fn default_drain_rate() -> f32 {
    1.0
}

const fn default_antidote_restore() -> f32 {
    40.0
}

const fn default_critical_threshold() -> f32 {
    30.0
}
