//! Food pellet cell.

use super::cell::{Cell, CellData};
use super::CellId;
use crate::geometry::Rect;
use glam::Vec2;
use protocol::CellTag;

/// A static pellet that player cells eat to grow.
#[derive(Debug, Clone)]
pub struct Pellet {
    data: CellData,
}

impl Pellet {
    pub fn new(id: CellId, position: Vec2, radius: f32) -> Self {
        Self {
            data: CellData::new(id, position, radius),
        }
    }
}

impl Cell for Pellet {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }

    fn tag(&self) -> CellTag {
        CellTag::Pellet
    }

    // Pellets never move.
    fn step_motion(&mut self, _friction: f32) {}

    fn handle_wall_bounce(&mut self, _arena: &Rect) {}
}
