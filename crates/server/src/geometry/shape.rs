//! Axis-aligned shapes and their intersection predicates.

use glam::Vec2;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    /// Create a rectangle from its center and full extents.
    #[inline]
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        let half = Vec2::new(width, height) / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Create a square from its center and side length.
    #[inline]
    pub fn square(center: Vec2, side: f32) -> Self {
        Self::from_center(center, side, side)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Whether this rectangle lies entirely inside `boundary` (edges may touch).
    #[inline]
    pub fn fits_within(&self, boundary: &Rect) -> bool {
        self.min.x >= boundary.min.x
            && self.max.x <= boundary.max.x
            && self.min.y >= boundary.min.y
            && self.max.y <= boundary.max.y
    }

    /// Check if two rectangles overlap. Touching edges do not count.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.min.x >= self.max.x
            || other.max.x <= self.min.x
            || other.min.y >= self.max.y
            || other.max.y <= self.min.y)
    }

    /// The four equal quadrants: top-left, top-right, bottom-left, bottom-right.
    pub fn quadrants(&self) -> [Rect; 4] {
        let c = self.center();
        [
            Rect { min: self.min, max: c },
            Rect::new(c.x, self.min.y, self.max.x, c.y),
            Rect::new(self.min.x, c.y, c.x, self.max.y),
            Rect { min: c, max: self.max },
        ]
    }
}

/// A circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    #[inline]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Whether the circle lies strictly inside `boundary`.
    #[inline]
    pub fn fits_within(&self, boundary: &Rect) -> bool {
        boundary.min.x < self.center.x - self.radius
            && boundary.max.x > self.center.x + self.radius
            && boundary.min.y < self.center.y - self.radius
            && boundary.max.y > self.center.y + self.radius
    }

    #[inline]
    pub fn intersects(&self, other: &Circle) -> bool {
        let r = self.radius + other.radius;
        self.center.distance_squared(other.center) <= r * r
    }

    /// Circle/rectangle test via the closest point of the rectangle.
    #[inline]
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let closest = self.center.clamp(rect.min, rect.max);
        self.center.distance_squared(closest) <= self.radius * self.radius
    }
}

/// Any shape the spatial index and collision code can test against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rect(Rect),
}

impl Shape {
    #[inline]
    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Circle(c) => c.center,
            Shape::Rect(r) => r.center(),
        }
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle(c) => c.contains(point),
            Shape::Rect(r) => r.contains(point),
        }
    }

    #[inline]
    pub fn fits_within(&self, boundary: &Rect) -> bool {
        match self {
            Shape::Circle(c) => c.fits_within(boundary),
            Shape::Rect(r) => r.fits_within(boundary),
        }
    }

    /// Pairwise intersection across every shape combination.
    #[inline]
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects(b),
            (Shape::Circle(a), Shape::Rect(b)) | (Shape::Rect(b), Shape::Circle(a)) => a.intersects_rect(b),
            (Shape::Rect(a), Shape::Rect(b)) => a.intersects(b),
        }
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Rect> for Shape {
    fn from(r: Rect) -> Self {
        Shape::Rect(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 15.0, 15.0);
        let c = Rect::new(20.0, 20.0, 30.0, 30.0);
        let touching = Rect::new(10.0, 0.0, 20.0, 10.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!a.intersects(&touching));
    }

    #[test]
    fn test_circle_fits_within_is_strict() {
        let boundary = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(Circle::new(Vec2::new(50.0, 50.0), 10.0).fits_within(&boundary));
        assert!(!Circle::new(Vec2::new(10.0, 50.0), 10.0).fits_within(&boundary));
        assert!(!Circle::new(Vec2::new(95.0, 50.0), 10.0).fits_within(&boundary));
    }

    #[test]
    fn test_circle_rect_intersection() {
        let rect = Shape::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let near_corner = Shape::Circle(Circle::new(Vec2::new(13.0, 14.0), 5.0));
        let off_corner = Shape::Circle(Circle::new(Vec2::new(14.0, 14.0), 5.0));

        assert!(rect.intersects(&near_corner));
        assert!(near_corner.intersects(&rect));
        assert!(!rect.intersects(&off_corner));
    }

    #[test]
    fn test_circle_contains_uses_distance() {
        let c = Circle::new(Vec2::ZERO, 10.0);
        assert!(c.contains(Vec2::new(6.0, 8.0)));
        assert!(!c.contains(Vec2::new(9.0, 9.0)));
    }

    #[test]
    fn test_quadrants_cover_parent() {
        let parent = Rect::square(Vec2::new(50.0, 50.0), 100.0);
        let quads = parent.quadrants();
        let total: f32 = quads.iter().map(Rect::area).sum();
        assert_eq!(total, parent.area());
        assert!(quads.iter().all(|q| q.fits_within(&parent)));
        assert_eq!(quads[3].min, Vec2::new(50.0, 50.0));
    }
}
