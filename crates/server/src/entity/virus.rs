//! Virus cell.

use super::cell::{Cell, CellData};
use super::CellId;
use crate::geometry::{Rect, VectorExt};
use glam::Vec2;
use protocol::CellTag;

/// A hazard that splits any player cell big enough to eat it.
///
/// Viruses can be shoved around by ejected mass and bounce off walls.
#[derive(Debug, Clone)]
pub struct Virus {
    data: CellData,
}

impl Virus {
    pub fn new(id: CellId, position: Vec2, radius: f32) -> Self {
        Self {
            data: CellData::new(id, position, radius),
        }
    }
}

impl Cell for Virus {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }

    fn tag(&self) -> CellTag {
        CellTag::Virus
    }

    fn handle_wall_bounce(&mut self, arena: &Rect) {
        let contact = self.data.clamp_into(arena);
        if contact.x {
            self.data.boost.flip_x();
        }
        if contact.y {
            self.data.boost.flip_y();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounces_off_wall() {
        let arena = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut virus = Virus::new(1, Vec2::new(95.0, 50.0), 10.0);
        virus.data_mut().boost = Vec2::new(20.0, 3.0);

        virus.step_motion(1.0);
        virus.handle_wall_bounce(&arena);

        assert_eq!(virus.data().position, Vec2::new(100.0, 53.0));
        assert_eq!(virus.data().boost, Vec2::new(-20.0, 3.0));
    }
}
