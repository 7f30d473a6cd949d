//! Per-frame hooks and contact callbacks shared by every gameplay component.
//!
//! The host loop owns scheduling. Within one frame it calls `on_tick` on every
//! component, then zero or more `on_fixed_tick` slices, then `on_late_tick`.
//! Anything that reads the follow target must do so in the late phase, after
//! the host has published that frame's target sample.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use glam::Vec3;

pub trait Tickable {
    /// Called once before the first frame and again after a full reset.
    fn init(&mut self) {}

    fn on_tick(&mut self, _dt: f32) {}

    fn on_fixed_tick(&mut self, _fixed_dt: f32) {}

    fn on_late_tick(&mut self, _dt: f32) {}
}

pub trait CollisionListener {
    fn on_collision(&mut self, other: EntityId, tag: CollisionTag);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const PLAYER: EntityId = EntityId(0);
    pub const GROUND: EntityId = EntityId(1);
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionTag {
    Player,
    Antidote,
    Ground,
}

/// Position and velocity of the object the camera and map follow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetSample {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Shared, single-threaded view of the follow target.
///
/// The host writes one sample per frame; readers get a copy. Cloning the
/// handle shares the same cell.
#[derive(Debug, Clone, Default)]
pub struct TargetHandle(Rc<Cell<TargetSample>>);

impl TargetHandle {
    pub fn new(sample: TargetSample) -> Self {
        Self(Rc::new(Cell::new(sample)))
    }

    pub fn publish(&self, sample: TargetSample) {
        self.0.set(sample);
    }

    pub fn sample(&self) -> TargetSample {
        self.0.get()
    }

    pub fn position(&self) -> Vec3 {
        self.0.get().position
    }

    pub fn velocity(&self) -> Vec3 {
        self.0.get().velocity
    }
}
