//! Vector helpers layered on top of `glam::Vec2`.

use glam::Vec2;

/// Extra vector operations the simulation relies on.
pub trait VectorExt {
    /// Unit vector in the same direction, or `None` when the vector is too
    /// short to have one (including lengths that underflow to zero).
    fn normal(self) -> Option<Vec2>;

    /// This vector rotated counter-clockwise by `theta` radians.
    fn rotated(self, theta: f32) -> Vec2;

    /// Negate the x component in place.
    fn flip_x(&mut self);

    /// Negate the y component in place.
    fn flip_y(&mut self);
}

impl VectorExt for Vec2 {
    #[inline]
    fn normal(self) -> Option<Vec2> {
        self.try_normalize()
    }

    #[inline]
    fn rotated(self, theta: f32) -> Vec2 {
        Vec2::from_angle(theta).rotate(self)
    }

    #[inline]
    fn flip_x(&mut self) {
        self.x = -self.x;
    }

    #[inline]
    fn flip_y(&mut self) {
        self.y = -self.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_normal() {
        let n = Vec2::new(3.0, 4.0).normal().unwrap();
        assert!((n - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_normal_of_vanishing_vectors() {
        assert_eq!(Vec2::ZERO.normal(), None);
        // Non-zero, but its length underflows.
        let tiny = Vec2::new(1.5e-29, 0.0);
        assert_ne!(tiny, Vec2::ZERO);
        assert_eq!(tiny.normal(), None);
    }

    #[test]
    fn test_rotated_quarter_turn() {
        let r = Vec2::X.rotated(FRAC_PI_2);
        assert!((r - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn test_flip() {
        let mut v = Vec2::new(2.0, -3.0);
        v.flip_x();
        assert_eq!(v, Vec2::new(-2.0, -3.0));
        v.flip_y();
        assert_eq!(v, Vec2::new(-2.0, 3.0));
    }
}
