//! Server -> Client packet building.

use super::ServerOpcode;
use crate::{BinaryWriter, CellData, NO_OWNER};

/// Bytes per cell entry in a GamestateUpdate packet.
const CELL_ENTRY_LEN: usize = 4 + 1 + 4 + 4 + 4 + 4;

/// Build a LoadWorld packet (0x00).
pub fn build_load_world(world_size: u16) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(3);
    w.put_u8(ServerOpcode::LoadWorld as u8);
    w.put_u16(world_size);
    w
}

/// Build a GamestateUpdate packet (0x01).
pub fn build_gamestate_update(view_x: f32, view_y: f32, cells: &[CellData]) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(9 + cells.len() * CELL_ENTRY_LEN);
    w.put_u8(ServerOpcode::GamestateUpdate as u8);
    w.put_f32(view_x);
    w.put_f32(view_y);
    for cell in cells {
        w.put_u32(cell.id);
        w.put_u8(cell.tag as u8);
        w.put_u32(cell.owner.unwrap_or(NO_OWNER));
        w.put_f32(cell.x);
        w.put_f32(cell.y);
        w.put_f32(cell.radius);
    }
    w
}

/// Build a PlayerUpdate packet (0x02).
pub fn build_player_update(pid: u8, nick: &str, skin: &str, same_team: bool) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(4 + nick.len() + skin.len());
    w.put_u8(ServerOpcode::PlayerUpdate as u8);
    w.put_u8(pid);
    w.put_string(nick);
    w.put_string(skin);
    w.put_u8(same_team as u8);
    w
}

/// Build a LeaderboardUpdate packet (0x03).
pub fn build_leaderboard_update(nicks: &[&str]) -> BinaryWriter {
    let mut w = BinaryWriter::new();
    w.put_u8(ServerOpcode::LeaderboardUpdate as u8);
    w.put_u8(nicks.len().min(u8::MAX as usize) as u8);
    for nick in nicks.iter().take(u8::MAX as usize) {
        w.put_string(nick);
    }
    w
}
