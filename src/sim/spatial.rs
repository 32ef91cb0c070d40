//! Uniform-grid spatial hash for neighbour queries
//!
//! Rebuilt from scratch every tick. Each entry is a snapshot of an agent's
//! kinematics, so agents updated later in the tick still see where everyone
//! was when the hash was built.

use std::collections::HashMap;

use glam::Vec2;
use serde::Serialize;

use super::entity::{Archetype, EntityId};

/// Kinematic snapshot stored in a bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub archetype: Archetype,
}

/// One non-empty bucket, for debug overlays
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OccupiedCell {
    /// World-space top-left corner of the cell
    pub origin: Vec2,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Drop every entry. Bucket allocations are kept for the next rebuild.
    pub fn clear(&mut self) {
        self.cells.values_mut().for_each(Vec::clear);
    }

    #[inline]
    fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Insert a live entity into the bucket containing its centre
    pub fn insert(&mut self, entry: SpatialEntry) {
        let key = self.cell_of(entry.pos.x, entry.pos.y);
        self.cells.entry(key).or_default().push(entry);
    }

    /// Every entry whose centre lies within `radius` of `(x, y)`.
    ///
    /// Cells are visited row by row, entries in insertion order, so the result
    /// order is stable for a given build.
    pub fn query(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let (min_cx, min_cy) = self.cell_of(x - radius, y - radius);
        let (max_cx, max_cy) = self.cell_of(x + radius, y + radius);
        let center = Vec2::new(x, y);
        let radius_sq = radius * radius;

        let mut found = Vec::new();
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                let Some(bucket) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                found.extend(
                    bucket
                        .iter()
                        .filter(|e| e.pos.distance_squared(center) <= radius_sq),
                );
            }
        }
        found
    }

    /// `query` around an entity's position, excluding the entity itself
    pub fn query_near(&self, id: EntityId, pos: Vec2, radius: f32) -> Vec<SpatialEntry> {
        let mut found = self.query(pos.x, pos.y, radius);
        found.retain(|e| e.id != id);
        found
    }

    /// Non-empty buckets sorted by cell coordinate
    pub fn occupied_cells(&self) -> Vec<OccupiedCell> {
        let mut keys: Vec<_> = self
            .cells
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(key, bucket)| (*key, bucket.len()))
            .collect();
        keys.sort_by_key(|((cx, cy), _)| (*cy, *cx));
        keys.into_iter()
            .map(|((cx, cy), count)| OccupiedCell {
                origin: Vec2::new(cx as f32 * self.cell_size, cy as f32 * self.cell_size),
                count,
            })
            .collect()
    }

    /// Total number of entries across all buckets
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
