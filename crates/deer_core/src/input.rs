//! Keyboard state with both edge-triggered and level-triggered queries.
//!
//! - **Held:** true every frame the key is down. Drives the run axis.
//! - **Just pressed / just released:** true only on the frame the transition
//!   happened; cleared by `end_frame()` once the frame's update has run.
//!
//! Recorded input arrives as the set of keys held on each frame;
//! `sync_held` turns that into the same edges live key events would produce.

use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    Left,
    Right,
    A,
    D,
    Space,
    Up,
    W,
    R,
    Digit0,
    Escape,
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Make `keys` the exact held set, raising edges for every difference.
    pub fn sync_held(&mut self, keys: &[Key]) {
        let wanted: HashSet<Key> = keys.iter().copied().collect();
        let released: Vec<Key> = self.held.difference(&wanted).copied().collect();
        for key in released {
            self.key_up(key);
        }
        for key in wanted {
            self.key_down(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Raw run axis: -1, 0 or 1. Opposing keys cancel out.
    pub fn horizontal_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_held(Key::Left) || self.is_held(Key::A) {
            axis -= 1.0;
        }
        if self.is_held(Key::Right) || self.is_held(Key::D) {
            axis += 1.0;
        }
        axis
    }

    pub fn jump_pressed(&self) -> bool {
        self.is_just_pressed(Key::Space) || self.is_just_pressed(Key::Up) || self.is_just_pressed(Key::W)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::D);
        assert!(input.is_held(Key::D));
        assert!(input.is_just_pressed(Key::D));
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::A);
        assert!(!input.is_just_released(Key::A));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn end_frame_clears_edges_but_keeps_held() {
        let mut input = InputState::new();
        input.key_down(Key::Right);
        input.key_down(Key::Space);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Space));
        assert!(input.is_held(Key::Right));
        assert!(!input.jump_pressed());
    }

    #[test]
    fn sync_held_produces_edges() {
        let mut input = InputState::new();
        input.sync_held(&[Key::Right, Key::Space]);
        assert!(input.jump_pressed());
        input.end_frame();

        input.sync_held(&[Key::Right, Key::Space]);
        assert!(!input.jump_pressed(), "holding jump must not repeat it");
        input.end_frame();

        input.sync_held(&[Key::Left]);
        assert!(input.is_just_released(Key::Right));
        assert!(input.is_just_released(Key::Space));
        assert!(input.is_just_pressed(Key::Left));
        assert_eq!(input.horizontal_axis(), -1.0);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut input = InputState::new();
        assert_eq!(input.horizontal_axis(), 0.0);
        input.key_down(Key::A);
        input.key_down(Key::D);
        assert_eq!(input.horizontal_axis(), 0.0);
        input.key_up(Key::A);
        assert_eq!(input.horizontal_axis(), 1.0);
    }
}
