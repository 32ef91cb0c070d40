//! Static arena geometry
//!
//! Obstacles are generated once per run from a linear congruential generator,
//! so a given seed always produces the same layout.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::WorldTuning;

/// Static axis-aligned rectangle; `(x, y)` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive point containment
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Closest point of the rectangle to `p` (p itself when inside)
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.x, self.right()), p.y.clamp(self.y, self.bottom()))
    }
}

/// Arena extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            right: width,
            top: 0.0,
            bottom: height,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Clamp a circle's centre so the whole circle stays inside. On an axis
    /// narrower than the circle the centre line is the only answer.
    pub fn clamp_circle(&self, pos: Vec2, radius: f32) -> Vec2 {
        let center = self.center();
        Vec2::new(
            clamp_axis(pos.x, self.left + radius, self.right - radius, center.x),
            clamp_axis(pos.y, self.top + radius, self.bottom - radius, center.y),
        )
    }
}

fn clamp_axis(value: f32, min: f32, max: f32, center: f32) -> f32 {
    if min <= max { value.clamp(min, max) } else { center }
}

/// Linear congruential generator used for world layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MULTIPLIER: u64 = 1_103_515_245;
    const INCREMENT: u64 = 12_345;
    const MASK: u64 = 0x7fff_ffff;

    pub fn new(seed: u64) -> Self {
        Self { state: seed & Self::MASK }
    }

    /// Next value in [0, 1]
    pub fn next_unit(&mut self) -> f32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
            & Self::MASK;
        (self.state as f64 / Self::MASK as f64) as f32
    }

    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_unit() * (max - min)
    }
}

/// Scatter obstacles across the arena, keeping the centre clear for the player
pub fn generate_obstacles(world: &WorldTuning) -> Vec<Obstacle> {
    let mut rng = Lcg::new(world.seed);
    let margin = world.obstacle_margin;
    let center = Vec2::new(world.width / 2.0, world.height / 2.0);
    let mut obstacles = Vec::with_capacity(world.obstacle_count as usize);

    for _ in 0..world.obstacle_count {
        let mut x;
        let mut y;
        let mut attempts = 0;
        loop {
            x = rng.range(margin, world.width - margin);
            y = rng.range(margin, world.height - margin);
            attempts += 1;
            let in_center = (x - center.x).abs() < world.center_exclusion
                && (y - center.y).abs() < world.center_exclusion;
            if attempts >= 20 || !in_center {
                break;
            }
        }

        let width = rng.range(world.obstacle_min_size, world.obstacle_max_size);
        let height = rng.range(world.obstacle_min_size, world.obstacle_max_size);
        obstacles.push(Obstacle::new(x - width / 2.0, y - height / 2.0, width, height));
    }

    log::debug!("Generated {} obstacles (seed {})", obstacles.len(), world.seed);
    obstacles
}
