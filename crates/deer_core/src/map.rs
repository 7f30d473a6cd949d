//! Endless map built from a short ring of tile segments.
//!
//! The map never holds more than `active_count` segments. As the follow target
//! crosses a cell boundary the segment that fell behind is detached and moved
//! to the far end of the ring, so the world appears to extend forever while the
//! number of placed objects stays fixed.
//!
//! Three one-way events shape a run:
//!
//!   1. The first forward tick that lands beyond cell 1 evicts the head segment
//!      for good and appends a fresh connector. From then on the ring refuses
//!      to recycle backwards.
//!   2. Every forward recycle increments a rotation counter and every backward
//!      recycle decrements it.
//!   3. When the counter reaches [`END_SEGMENT_ROTATION_BUDGET`] the tail is
//!      replaced by the end segment. Further forward recycles destroy the head
//!      instead of reusing it, so the ring drains behind the player.
//!
//! The controller samples the target once per frame and rotates at most one
//! segment per tick. A target that crosses several cells in one frame leaves
//! the ring short; the cell index still jumps to the new value.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

use crate::lifecycle::{TargetHandle, Tickable};

/// Net forward recycles after which the end segment replaces the tail.
pub const END_SEGMENT_ROTATION_BUDGET: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Start,
    Connector,
    End,
}

/// Opaque handle returned by a [`SegmentPlacer`] for one placed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub handle: SegmentHandle,
    pub kind: SegmentKind,
    pub prefab: String,
    /// Anchor along the travel axis. The other axes are fixed at zero.
    pub x: f32,
}

/// Whatever owns the placed objects: a scene graph, an engine, a test double.
pub trait SegmentPlacer {
    fn place(&mut self, kind: SegmentKind, prefab: &str, x: f32) -> SegmentHandle;
    fn reposition(&mut self, handle: SegmentHandle, x: f32);
    fn destroy(&mut self, handle: SegmentHandle);
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub start_prefab: Option<String>,
    #[serde(default)]
    pub end_prefab: Option<String>,
    #[serde(default)]
    pub connector_prefabs: Vec<String>,
    #[serde(default = "default_segment_length")]
    pub segment_length: f32,
    #[serde(default = "default_active_count")]
    pub active_count: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            start_prefab: None,
            end_prefab: None,
            connector_prefabs: Vec::new(),
            segment_length: default_segment_length(),
            active_count: default_active_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("start segment prefab is not set")]
    MissingStartPrefab,
    #[error("end segment prefab is not set")]
    MissingEndPrefab,
    #[error("no connector segment prefabs are set")]
    NoConnectorPrefabs,
    #[error("invalid map layout: {0}")]
    InvalidLayout(String),
}

/// Prefab references resolved from a validated [`MapConfig`].
#[derive(Debug, Clone)]
struct TileSet {
    start: String,
    end: String,
    connectors: Vec<String>,
}

impl TileSet {
    fn from_config(config: &MapConfig) -> Result<Self, MapError> {
        let start = non_empty(&config.start_prefab).ok_or(MapError::MissingStartPrefab)?;
        let end = non_empty(&config.end_prefab).ok_or(MapError::MissingEndPrefab)?;
        let connectors: Vec<String> = config
            .connector_prefabs
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect();
        if connectors.is_empty() {
            return Err(MapError::NoConnectorPrefabs);
        }
        if !config.segment_length.is_finite() || config.segment_length <= 0.0 {
            return Err(MapError::InvalidLayout(format!(
                "segment_length must be a positive number, got {}",
                config.segment_length
            )));
        }
        if config.active_count == 0 {
            return Err(MapError::InvalidLayout(
                "active_count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            start,
            end,
            connectors,
        })
    }

    fn pick_connector(&self, rng: &mut StdRng) -> &str {
        &self.connectors[rng.gen_range(0..self.connectors.len())]
    }
}

fn non_empty(prefab: &Option<String>) -> Option<String> {
    prefab.as_ref().filter(|p| !p.is_empty()).cloned()
}

/// Owns the ring of active segments and rotates it as the target moves.
pub struct MapManager<P: SegmentPlacer> {
    config: MapConfig,
    placer: P,
    target: TargetHandle,
    rng: StdRng,
    /// `Some` once initialization succeeded. Every mutating path checks it.
    tiles: Option<TileSet>,
    segments: VecDeque<Segment>,
    current_cell: i32,
    start_segment_removed: bool,
    rotation_count: i32,
    end_segment_spawned: bool,
}

impl<P: SegmentPlacer> MapManager<P> {
    pub fn new(config: MapConfig, placer: P, target: TargetHandle, seed: u64) -> Self {
        Self {
            config,
            placer,
            target,
            rng: StdRng::seed_from_u64(seed),
            tiles: None,
            segments: VecDeque::new(),
            current_cell: 0,
            start_segment_removed: false,
            rotation_count: 0,
            end_segment_spawned: false,
        }
    }

    /// Place the start segment followed by random connectors.
    ///
    /// A missing prefab or a bad layout is reported once and leaves the
    /// manager inert: nothing is placed and later ticks do nothing. A ring
    /// that has drained empty is rebuilt from scratch.
    pub fn initialize(&mut self) -> Result<(), MapError> {
        if self.tiles.is_some() && !self.segments.is_empty() {
            log::warn!("Map is already initialized; call reset() to rebuild it");
            return Ok(());
        }
        self.clear_progress();

        let tiles = match TileSet::from_config(&self.config) {
            Ok(tiles) => tiles,
            Err(err) => {
                log::error!("Map initialization failed: {err}");
                return Err(err);
            }
        };

        for index in 0..self.config.active_count {
            let x = index as f32 * self.config.segment_length;
            let (kind, prefab) = if index == 0 {
                (SegmentKind::Start, tiles.start.as_str())
            } else {
                (SegmentKind::Connector, tiles.pick_connector(&mut self.rng))
            };
            let handle = self.placer.place(kind, prefab, x);
            self.segments.push_back(Segment {
                handle,
                kind,
                prefab: prefab.to_string(),
                x,
            });
        }

        self.tiles = Some(tiles);
        log::info!(
            "Map initialized with {} segments of length {}",
            self.segments.len(),
            self.config.segment_length
        );
        Ok(())
    }

    /// Rotate the ring for the target's position on the travel axis.
    pub fn tick(&mut self, target_x: f32) {
        if self.tiles.is_none() || self.segments.is_empty() || !target_x.is_finite() {
            return;
        }

        let target_cell = (target_x / self.config.segment_length).floor() as i32;

        if target_cell > self.current_cell {
            if !self.start_segment_removed && target_cell > 1 {
                self.evict_start_segment();
            } else {
                self.recycle_right();
                self.rotation_count += 1;
                log::debug!("Segment rotation count: {}", self.rotation_count);
            }
            self.current_cell = target_cell;
        } else if target_cell < self.current_cell {
            // Once the start segment is gone there is no way back.
            if !self.start_segment_removed && target_cell >= 0 {
                self.recycle_left();
                self.rotation_count -= 1;
                log::debug!("Segment rotation count: {}", self.rotation_count);
            }
            self.current_cell = target_cell;
        }

        if !self.end_segment_spawned && self.rotation_count >= END_SEGMENT_ROTATION_BUDGET {
            self.spawn_end_segment();
        }
    }

    /// Destroy every placed segment, clear all progress and rebuild the ring.
    pub fn reset(&mut self) -> Result<(), MapError> {
        for segment in self.segments.drain(..) {
            self.placer.destroy(segment.handle);
        }
        log::info!("Map reset");
        self.initialize()
    }

    /// Replace the layout used by the next `initialize` or `reset`.
    pub fn set_config(&mut self, config: MapConfig) {
        self.config = config;
    }

    fn clear_progress(&mut self) {
        self.tiles = None;
        self.current_cell = 0;
        self.start_segment_removed = false;
        self.rotation_count = 0;
        self.end_segment_spawned = false;
    }

    fn recycle_right(&mut self) {
        let Some(tail_x) = self.segments.back().map(|s| s.x) else {
            return;
        };
        let Some(mut segment) = self.segments.pop_front() else {
            return;
        };

        if self.end_segment_spawned {
            self.placer.destroy(segment.handle);
            log::debug!("Dropped segment at x={} behind the end segment", segment.x);
            return;
        }

        segment.x = tail_x + self.config.segment_length;
        self.placer.reposition(segment.handle, segment.x);
        log::debug!("Recycled segment to the right at x={}", segment.x);
        self.segments.push_back(segment);
    }

    fn recycle_left(&mut self) {
        let Some(head_x) = self.segments.front().map(|s| s.x) else {
            return;
        };
        let Some(mut segment) = self.segments.pop_back() else {
            return;
        };

        segment.x = head_x - self.config.segment_length;
        self.placer.reposition(segment.handle, segment.x);
        log::debug!("Recycled segment to the left at x={}", segment.x);
        self.segments.push_front(segment);
    }

    fn evict_start_segment(&mut self) {
        let Some(tiles) = self.tiles.as_ref() else {
            return;
        };
        let Some(evicted) = self.segments.pop_front() else {
            return;
        };
        self.placer.destroy(evicted.handle);

        let x = self.segments.back().map_or(evicted.x, |tail| tail.x) + self.config.segment_length;
        let prefab = tiles.pick_connector(&mut self.rng);
        let handle = self.placer.place(SegmentKind::Connector, prefab, x);
        self.segments.push_back(Segment {
            handle,
            kind: SegmentKind::Connector,
            prefab: prefab.to_string(),
            x,
        });

        self.start_segment_removed = true;
        log::info!("Start segment removed; backward recycling is now disabled");
    }

    fn spawn_end_segment(&mut self) {
        let Some(tiles) = self.tiles.as_ref() else {
            return;
        };
        let Some(evicted) = self.segments.pop_back() else {
            return;
        };
        self.placer.destroy(evicted.handle);

        let x = self
            .segments
            .back()
            .map_or(evicted.x, |tail| tail.x + self.config.segment_length);
        let handle = self.placer.place(SegmentKind::End, &tiles.end, x);
        self.segments.push_back(Segment {
            handle,
            kind: SegmentKind::End,
            prefab: tiles.end.clone(),
            x,
        });

        self.end_segment_spawned = true;
        log::info!("End segment placed at x={x}");
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn positions(&self) -> Vec<f32> {
        self.segments.iter().map(|s| s.x).collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.tiles.is_some()
    }

    pub fn current_cell(&self) -> i32 {
        self.current_cell
    }

    pub fn rotation_count(&self) -> i32 {
        self.rotation_count
    }

    pub fn start_segment_removed(&self) -> bool {
        self.start_segment_removed
    }

    pub fn end_segment_spawned(&self) -> bool {
        self.end_segment_spawned
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn placer(&self) -> &P {
        &self.placer
    }
}

impl<P: SegmentPlacer> Tickable for MapManager<P> {
    fn init(&mut self) {
        self.initialize().ok();
    }

    fn on_late_tick(&mut self, _dt: f32) {
        let x = self.target.position().x;
        self.tick(x);
    }
}

const fn default_segment_length() -> f32 {
    30.0
}

const fn default_active_count() -> usize {
    3
}
