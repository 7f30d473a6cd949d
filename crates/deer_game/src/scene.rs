//! Scene graph of placed map segments. Stands in for the engine's object
//! lifecycle: the map manager places, moves and destroys segments through it.

use std::collections::BTreeMap;

use deer_core::map::{SegmentHandle, SegmentKind, SegmentPlacer};

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSegment {
    pub kind: SegmentKind,
    pub prefab: String,
    pub x: f32,
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    next_handle: u64,
    segments: BTreeMap<SegmentHandle, PlacedSegment>,
    placed_total: u64,
    destroyed_total: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment whose span `[x, x + length)` contains `position`.
    pub fn segment_under(&self, position: f32, length: f32) -> Option<&PlacedSegment> {
        self.segments
            .values()
            .find(|s| position >= s.x && position < s.x + length)
    }

    /// Live segments ordered along the travel axis.
    pub fn sorted(&self) -> Vec<&PlacedSegment> {
        let mut live: Vec<&PlacedSegment> = self.segments.values().collect();
        live.sort_by(|a, b| a.x.total_cmp(&b.x));
        live
    }

    pub fn placed_total(&self) -> u64 {
        self.placed_total
    }

    pub fn destroyed_total(&self) -> u64 {
        self.destroyed_total
    }
}

impl SegmentPlacer for SceneGraph {
    fn place(&mut self, kind: SegmentKind, prefab: &str, x: f32) -> SegmentHandle {
        let handle = SegmentHandle(self.next_handle);
        self.next_handle += 1;
        self.placed_total += 1;
        log::debug!("Placed {kind:?} segment '{prefab}' at x={x} ({handle:?})");
        self.segments.insert(
            handle,
            PlacedSegment {
                kind,
                prefab: prefab.to_string(),
                x,
            },
        );
        handle
    }

    fn reposition(&mut self, handle: SegmentHandle, x: f32) {
        match self.segments.get_mut(&handle) {
            Some(segment) => segment.x = x,
            None => log::warn!("Reposition of unknown segment {handle:?}"),
        }
    }

    fn destroy(&mut self, handle: SegmentHandle) {
        if self.segments.remove(&handle).is_some() {
            self.destroyed_total += 1;
        } else {
            log::warn!("Destroy of unknown segment {handle:?}");
        }
    }
}
