//! Arena entities (cells).
//!
//! Every entity is a circle with a position, a self-propelled velocity and a
//! decaying boost. The variants differ only in how they move, bounce and
//! which interaction rules apply to them.

mod cell;
mod dead_mass;
mod ejected_mass;
mod pellet;
mod player_cell;
mod virus;

pub use cell::{Cell, CellData, WallContact};
pub use dead_mass::DeadMass;
pub use ejected_mass::EjectedMass;
pub use pellet::Pellet;
pub use player_cell::PlayerCell;
pub use virus::Virus;

use crate::geometry::Rect;
use protocol::CellTag;

/// Entity id, unique for the lifetime of an arena.
pub type CellId = u32;

/// Player (controller) id.
pub type PlayerId = u32;

/// An entity stored in the arena.
#[derive(Debug, Clone)]
pub enum CellEntry {
    Player(PlayerCell),
    Pellet(Pellet),
    Ejected(EjectedMass),
    Virus(Virus),
    Dead(DeadMass),
}

impl CellEntry {
    fn cell(&self) -> &dyn Cell {
        match self {
            CellEntry::Player(c) => c,
            CellEntry::Pellet(c) => c,
            CellEntry::Ejected(c) => c,
            CellEntry::Virus(c) => c,
            CellEntry::Dead(c) => c,
        }
    }

    fn cell_mut(&mut self) -> &mut dyn Cell {
        match self {
            CellEntry::Player(c) => c,
            CellEntry::Pellet(c) => c,
            CellEntry::Ejected(c) => c,
            CellEntry::Virus(c) => c,
            CellEntry::Dead(c) => c,
        }
    }

    /// Get the common cell data.
    #[inline]
    pub fn data(&self) -> &CellData {
        self.cell().data()
    }

    /// Get mutable cell data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut CellData {
        self.cell_mut().data_mut()
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.data().id
    }

    #[inline]
    pub fn tag(&self) -> CellTag {
        self.cell().tag()
    }

    #[inline]
    pub fn owner(&self) -> Option<PlayerId> {
        self.cell().owner()
    }

    pub fn step_motion(&mut self, friction: f32) {
        self.cell_mut().step_motion(friction);
    }

    pub fn handle_wall_bounce(&mut self, arena: &Rect) {
        self.cell_mut().handle_wall_bounce(arena);
    }

    pub fn tick(&mut self, tick_ms: u64) {
        self.cell_mut().tick(tick_ms);
    }

    /// Snapshot in the form sent to clients.
    pub fn to_view(&self) -> protocol::CellData {
        let data = self.data();
        protocol::CellData {
            id: data.id,
            owner: self.owner(),
            tag: self.tag(),
            x: data.position.x,
            y: data.position.y,
            radius: data.radius(),
        }
    }
}
