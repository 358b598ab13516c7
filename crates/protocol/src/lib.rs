//! Shared protocol crate for cell-arena.
//!
//! This crate contains:
//! - Binary reading/writing utilities
//! - Packet definitions and builders
//! - The outbound cell tuple (`CellData`) and its stable variant tags

mod binary;
mod error;
pub mod packets;

pub use binary::{BinaryReader, BinaryWriter};
pub use error::ProtocolError;

/// Variant tag sent with every visible cell.
///
/// The numeric values are part of the wire contract and must stay stable
/// within a protocol version.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellTag {
    Pellet = 0,
    Player = 1,
    EjectedMass = 2,
    Virus = 3,
    DeadMass = 4,
}

impl CellTag {
    /// Decode a tag byte.
    pub fn from_u8(value: u8) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(CellTag::Pellet),
            1 => Ok(CellTag::Player),
            2 => Ok(CellTag::EjectedMass),
            3 => Ok(CellTag::Virus),
            4 => Ok(CellTag::DeadMass),
            other => Err(ProtocolError::InvalidCellTag(other)),
        }
    }
}

/// One visible entity as handed to the serialization layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellData {
    pub id: u32,
    /// Owning player id, `None` for everything but player cells.
    pub owner: Option<u32>,
    pub tag: CellTag,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Owner value written for cells without an owner.
pub const NO_OWNER: u32 = u32::MAX;
