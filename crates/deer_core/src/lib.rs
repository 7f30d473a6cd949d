//! Deterministic game logic for the deer runner.
//!
//! Nothing in this crate touches a window, a GPU or an audio device. The host
//! (`deer_game`) owns the frame loop and calls into these types in a fixed
//! order each frame: update, fixed steps, then the late phase.

pub mod animation;
pub mod antidote;
pub mod camera;
pub mod health;
pub mod input;
pub mod lifecycle;
pub mod map;
pub mod movement;
pub mod player;
pub mod time;
