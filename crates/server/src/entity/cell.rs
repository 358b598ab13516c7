//! Base cell type and common functionality.

use super::{CellId, PlayerId};
use crate::geometry::{Circle, Rect, Shape};
use crate::physics::{mass_to_radius, radius_to_mass};
use glam::Vec2;
use protocol::CellTag;

/// Common cell data shared by all cell types.
#[derive(Debug, Clone)]
pub struct CellData {
    /// Unique entity id.
    pub id: CellId,
    /// Position in world coordinates.
    pub position: Vec2,
    /// Self-propelled velocity, set from player input.
    pub velocity: Vec2,
    /// Impulse that decays by the arena friction every tick.
    pub boost: Vec2,
    radius: f32,
    /// Milliseconds since the cell was created.
    pub age_ms: u64,
    /// Cell that absorbed this one during the current collision pass.
    pub eater: Option<CellId>,
}

impl CellData {
    pub fn new(id: CellId, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            boost: Vec2::ZERO,
            radius: radius.max(0.0),
            age_ms: 0,
            eater: None,
        }
    }

    pub fn with_boost(mut self, boost: Vec2) -> Self {
        self.boost = boost;
        self
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Set the radius, clamping negatives (and NaN) to zero.
    #[inline]
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        radius_to_mass(self.radius)
    }

    #[inline]
    pub fn set_mass(&mut self, mass: f32) {
        self.set_radius(mass_to_radius(mass));
    }

    /// Add (or with a negative delta, remove) mass.
    #[inline]
    pub fn add_mass(&mut self, delta: f32) {
        self.set_mass(self.mass() + delta);
    }

    #[inline]
    pub fn boundary(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        Shape::Circle(self.boundary())
    }

    /// Advance by velocity and boost, then decay the boost.
    #[inline]
    pub fn integrate(&mut self, friction: f32) {
        self.position += self.velocity + self.boost;
        self.boost *= friction;
    }

    /// Clamp the center into the arena if the cell pokes outside it.
    ///
    /// Reports which axes had to be clamped.
    pub fn clamp_into(&mut self, arena: &Rect) -> WallContact {
        if self.boundary().fits_within(arena) {
            return WallContact::default();
        }

        let clamped = self.position.clamp(arena.min, arena.max);
        let contact = WallContact {
            x: clamped.x != self.position.x,
            y: clamped.y != self.position.y,
        };
        self.position = clamped;
        contact
    }
}

/// Axes on which a cell was pushed back inside the arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    pub x: bool,
    pub y: bool,
}

/// Trait for all cell types.
pub trait Cell: Send + Sync {
    /// Get the common cell data.
    fn data(&self) -> &CellData;

    /// Get mutable cell data.
    fn data_mut(&mut self) -> &mut CellData;

    /// Kind reported to clients.
    fn tag(&self) -> CellTag;

    /// Owning player, if any.
    fn owner(&self) -> Option<PlayerId> {
        None
    }

    /// Integrate one tick of motion.
    fn step_motion(&mut self, friction: f32) {
        self.data_mut().integrate(friction);
    }

    /// Keep the cell inside the arena after moving.
    fn handle_wall_bounce(&mut self, arena: &Rect) {
        self.data_mut().clamp_into(arena);
    }

    /// Advance the cell's age.
    fn tick(&mut self, tick_ms: u64) {
        self.data_mut().age_ms += tick_ms;
    }
}
