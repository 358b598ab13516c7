//! Packet definitions for the arena protocol.
//!
//! This module contains both client->server and server->client packet types.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Opcodes for client -> server packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOpcode {
    /// Nick/skin/team tag; the first one spawns the player.
    PlayerUpdate = 0,
    /// Request spectate mode.
    Spectate = 1,
    /// Pointer offset relative to the player's center.
    MouseMove = 2,
    /// Feed on/off.
    ToggleFeed = 3,
    /// Split with a macro count.
    Split = 4,
    StopMovement = 5,
    FreezeMouse = 6,
    LockLinesplit = 7,
    SaveReplay = 8,
}

/// Opcodes for server -> client packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOpcode {
    /// Arena size, sent on connect.
    LoadWorld = 0,
    /// Viewport center and visible cells (sent every tick).
    GamestateUpdate = 1,
    /// Another player's nick/skin.
    PlayerUpdate = 2,
    /// Top players by mass.
    LeaderboardUpdate = 3,
}
