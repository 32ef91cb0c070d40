//! Sector geometry for melee swings
//!
//! A sector is defined by:
//! - origin: apex of the swing (the attacker's centre)
//! - direction: bearing of the swing's centreline
//! - range: reach from the origin
//! - angle: total angular width, split evenly either side of `direction`

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Circle, circle_in_arc, point_in_arc};
use crate::math::Vec2Ext;
use crate::polar_to_cartesian;

/// A pie-slice swept by a melee attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub origin: Vec2,
    /// Unit bearing of the centreline
    pub direction: Vec2,
    pub range: f32,
    /// Total angular width (radians)
    pub angle: f32,
}

impl Sector {
    pub fn new(origin: Vec2, direction: Vec2, range: f32, angle: f32) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            origin,
            direction: if direction.is_zero() { Vec2::X } else { direction },
            range,
            angle,
        }
    }

    /// Bearing of the leading edge
    pub fn start_angle(&self) -> f32 {
        self.direction.heading() - self.angle / 2.0
    }

    /// Bearing of the trailing edge
    pub fn end_angle(&self) -> f32 {
        self.direction.heading() + self.angle / 2.0
    }

    /// Check if a point lies inside the sector
    pub fn contains_point(&self, point: Vec2) -> bool {
        point_in_arc(point, self.origin, self.direction, self.range, self.angle)
    }

    /// Check if a circle's centre is within reach, counting its radius
    pub fn hits_circle(&self, circle: Circle) -> bool {
        circle_in_arc(circle, self.origin, self.direction, self.range, self.angle)
    }

    /// Sample points along the outer rim (for debug overlays)
    pub fn sample_rim(&self, num_points: usize) -> Vec<Vec2> {
        let start = self.start_angle();
        (0..num_points)
            .map(|i| {
                let t = i as f32 / (num_points - 1).max(1) as f32;
                self.origin + polar_to_cartesian(self.range, start + t * self.angle)
            })
            .collect()
    }
}
