//! Collision detection and response for circles and rectangles
//!
//! Overlap tests compare squared distances so the common "no hit" path never
//! takes a square root. Degenerate cases resolve to fixed fallbacks instead of
//! failing: coincident circle centres separate along +X, a circle centred
//! inside a rectangle leaves through the nearest edge.

use glam::Vec2;

use super::world::Obstacle;
use crate::normalize_angle;
use crate::math::Vec2Ext;

/// A circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub pos: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self { pos, radius }
    }
}

/// Penetration details for an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Penetration depth
    pub overlap: f32,
    /// Unit normal; for circle pairs it points from `a` toward `b`,
    /// for circle/rect it points out of the rectangle toward the circle
    pub normal: Vec2,
    /// Closest point on the rectangle (circle/rect contacts only)
    pub point: Option<Vec2>,
}

/// Boolean circle/circle overlap (touching does not count)
#[inline]
pub fn circle_circle(a: Circle, b: Circle) -> bool {
    let radii = a.radius + b.radius;
    a.pos.distance_squared(b.pos) < radii * radii
}

/// Circle/circle overlap with depth and separation normal
pub fn circle_circle_info(a: Circle, b: Circle) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let dist_sq = delta.length_squared();
    let radii = a.radius + b.radius;
    if dist_sq >= radii * radii {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist == 0.0 { Vec2::X } else { delta / dist };
    Some(Contact {
        overlap: radii - dist,
        normal,
        point: None,
    })
}

/// Boolean circle/rectangle overlap
#[inline]
pub fn circle_rect(circle: Circle, rect: &Obstacle) -> bool {
    let closest = rect.closest_point(circle.pos);
    circle.pos.distance_squared(closest) < circle.radius * circle.radius
}

/// Circle/rectangle overlap with depth and push-out normal
pub fn circle_rect_info(circle: Circle, rect: &Obstacle) -> Option<Contact> {
    let closest = rect.closest_point(circle.pos);
    let delta = circle.pos - closest;
    let dist_sq = delta.length_squared();
    if dist_sq >= circle.radius * circle.radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist > 0.0 {
        return Some(Contact {
            overlap: circle.radius - dist,
            normal: delta / dist,
            point: Some(closest),
        });
    }

    // Centre is inside the rectangle: leave through the shallowest edge.
    // The depth includes the edge distance so the circle ends up fully clear.
    let to_left = circle.pos.x - rect.x;
    let to_right = rect.right() - circle.pos.x;
    let to_top = circle.pos.y - rect.y;
    let to_bottom = rect.bottom() - circle.pos.y;
    let min = to_left.min(to_right).min(to_top).min(to_bottom);

    let normal = if min == to_left {
        Vec2::NEG_X
    } else if min == to_right {
        Vec2::X
    } else if min == to_top {
        Vec2::NEG_Y
    } else {
        Vec2::Y
    };

    Some(Contact {
        overlap: circle.radius + min,
        normal,
        point: Some(closest),
    })
}

/// Push two dynamic circles apart, half the overlap each.
/// Returns the contact that was resolved, if any.
pub fn separate_circles(a: &mut Circle, b: &mut Circle) -> Option<Contact> {
    let contact = circle_circle_info(*a, *b)?;
    let push = contact.normal * (contact.overlap * 0.5);
    a.pos -= push;
    b.pos += push;
    Some(contact)
}

/// Push a circle entirely out of a static rectangle
pub fn separate_circle_rect(circle: &mut Circle, rect: &Obstacle) -> Option<Contact> {
    let contact = circle_rect_info(*circle, rect)?;
    circle.pos += contact.normal * contact.overlap;
    Some(contact)
}

/// Sector containment test used for melee swings.
///
/// True when `point` is within `range` of `origin` and its bearing deviates from
/// `direction` by at most half of `arc_angle`. The origin itself always counts.
pub fn point_in_arc(point: Vec2, origin: Vec2, direction: Vec2, range: f32, arc_angle: f32) -> bool {
    let to_point = point - origin;
    let dist = to_point.length();
    if dist > range {
        return false;
    }
    if dist == 0.0 {
        return true;
    }

    let diff = normalize_angle(to_point.heading() - direction.heading());
    diff.abs() <= arc_angle / 2.0
}

/// Sector test for a circle: the reach grows by the circle's radius
#[inline]
pub fn circle_in_arc(circle: Circle, origin: Vec2, direction: Vec2, range: f32, arc_angle: f32) -> bool {
    point_in_arc(circle.pos, origin, direction, range + circle.radius, arc_angle)
}
