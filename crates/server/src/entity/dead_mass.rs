//! Mass left behind by a disconnected player.

use super::cell::{Cell, CellData};
use super::CellId;
use glam::Vec2;
use protocol::CellTag;

/// Ownerless leftover of a player's cell. Edible, expires after a while.
#[derive(Debug, Clone)]
pub struct DeadMass {
    data: CellData,
}

impl DeadMass {
    /// Carry the old cell's momentum over as boost.
    pub fn new(id: CellId, position: Vec2, radius: f32, boost: Vec2) -> Self {
        Self {
            data: CellData::new(id, position, radius).with_boost(boost),
        }
    }

    /// Leftover of an abandoned cell, keeping its id and size.
    pub fn from_cell(data: &CellData) -> Self {
        Self::new(data.id, data.position, data.radius(), data.velocity + data.boost)
    }
}

impl Cell for DeadMass {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }

    fn tag(&self) -> CellTag {
        CellTag::DeadMass
    }
}
