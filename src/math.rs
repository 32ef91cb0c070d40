//! Vector helpers on top of `glam::Vec2`
//!
//! glam already covers the arithmetic, length, normalize, distance, dot,
//! cross (`perp_dot`), lerp and `from_angle`. This trait adds the pieces the
//! steering code leans on. Methods without a `_mut` suffix return a new value
//! and leave `self` untouched; `_mut` variants write through and return
//! `&mut Self` so calls can be chained.
//!
//! Aliasing: `Vec2` is `Copy`, so a value captured before a `_mut` call keeps
//! its old components. Keep the `_mut` forms to integrator-style hot paths.

use glam::Vec2;

/// Tolerance used by [`Vec2Ext::approx_eq`]
pub const DEFAULT_EPSILON: f32 = 1e-4;

pub trait Vec2Ext: Sized {
    /// Divide by a scalar; dividing by zero yields the zero vector
    fn safe_div(self, s: f32) -> Self;
    /// In-place divide; a zero divisor leaves the vector unchanged
    fn safe_div_mut(&mut self, s: f32) -> &mut Self;
    /// In-place normalize; the zero vector stays zero
    fn normalize_mut(&mut self) -> &mut Self;
    /// Clamp the magnitude to at most `max`
    fn limit(self, max: f32) -> Self;
    fn limit_mut(&mut self, max: f32) -> &mut Self;
    /// Same direction, magnitude `len` (zero stays zero)
    fn with_magnitude(self, len: f32) -> Self;
    fn set_magnitude(&mut self, len: f32) -> &mut Self;
    /// Heading angle, `atan2(y, x)`
    fn heading(self) -> f32;
    /// Rotate counter-clockwise by `angle` radians
    fn rotated(self, angle: f32) -> Self;
    fn rotate_mut(&mut self, angle: f32) -> &mut Self;
    /// Both components exactly zero
    fn is_zero(self) -> bool;
    /// Component-wise comparison within `epsilon`
    fn approx_eq(self, other: Self, epsilon: f32) -> bool;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn safe_div(self, s: f32) -> Self {
        if s == 0.0 { Vec2::ZERO } else { self / s }
    }

    #[inline]
    fn safe_div_mut(&mut self, s: f32) -> &mut Self {
        if s != 0.0 {
            *self /= s;
        }
        self
    }

    #[inline]
    fn normalize_mut(&mut self) -> &mut Self {
        *self = self.normalize_or_zero();
        self
    }

    #[inline]
    fn limit(self, max: f32) -> Self {
        if self.length_squared() > max * max {
            self.normalize_or_zero() * max
        } else {
            self
        }
    }

    #[inline]
    fn limit_mut(&mut self, max: f32) -> &mut Self {
        *self = self.limit(max);
        self
    }

    #[inline]
    fn with_magnitude(self, len: f32) -> Self {
        self.normalize_or_zero() * len
    }

    #[inline]
    fn set_magnitude(&mut self, len: f32) -> &mut Self {
        *self = self.with_magnitude(len);
        self
    }

    #[inline]
    fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }

    #[inline]
    fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn rotate_mut(&mut self, angle: f32) -> &mut Self {
        *self = self.rotated(angle);
        self
    }

    #[inline]
    fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    #[inline]
    fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}
