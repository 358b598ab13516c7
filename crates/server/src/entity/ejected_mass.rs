//! Ejected mass cell.

use super::cell::{Cell, CellData};
use super::CellId;
use crate::geometry::{Circle, Rect, VectorExt};
use glam::Vec2;
use protocol::CellTag;

/// Mass ejected by a player cell.
#[derive(Debug, Clone)]
pub struct EjectedMass {
    data: CellData,
    parent: CellId,
    exited_parent: bool,
}

impl EjectedMass {
    pub fn new(id: CellId, parent: CellId, position: Vec2, radius: f32, boost: Vec2) -> Self {
        Self {
            data: CellData::new(id, position, radius).with_boost(boost),
            parent,
            exited_parent: false,
        }
    }

    /// Cell this mass was ejected from.
    #[inline]
    pub fn parent(&self) -> CellId {
        self.parent
    }

    /// Whether the mass has fully left its parent's circle at least once.
    #[inline]
    pub fn exited_parent(&self) -> bool {
        self.exited_parent
    }

    /// Latch `exited_parent` once the two circles no longer touch.
    ///
    /// A parent that no longer exists counts as exited.
    pub fn update_exited_parent(&mut self, parent: Option<Circle>) {
        if self.exited_parent {
            return;
        }
        self.exited_parent = match parent {
            Some(parent) => !parent.intersects(&self.data.boundary()),
            None => true,
        };
    }
}

impl Cell for EjectedMass {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }

    fn tag(&self) -> CellTag {
        CellTag::EjectedMass
    }

    fn handle_wall_bounce(&mut self, arena: &Rect) {
        if !self.data.boundary().fits_within(arena) {
            // Reaching a wall also frees the mass for pickup.
            self.exited_parent = true;
        }
        let contact = self.data.clamp_into(arena);
        if contact.x {
            self.data.boost.flip_x();
        }
        if contact.y {
            self.data.boost.flip_y();
        }
    }
}
