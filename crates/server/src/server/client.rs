//! Client session state.

use crate::entity::PlayerId;
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::sync::mpsc::UnboundedSender;

/// What a connected client is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    /// Connected but never spawned (or dead and not yet respawned).
    #[default]
    Idle,
    Playing,
    Spectating,
}

/// A connected client session.
#[derive(Debug)]
pub struct Client {
    /// Player id inside the room.
    pub pid: PlayerId,
    /// Remote address.
    pub addr: SocketAddr,
    pub nick: String,
    pub skin: String,
    pub team_tag: String,
    pub state: ClientState,
    /// Outbound frames, drained by the connection task.
    tx: UnboundedSender<Bytes>,
}

impl Client {
    /// Create a new client session.
    pub fn new(pid: PlayerId, addr: SocketAddr, tx: UnboundedSender<Bytes>) -> Self {
        Self {
            pid,
            addr,
            nick: String::new(),
            skin: String::new(),
            team_tag: String::new(),
            state: ClientState::Idle,
            tx,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == ClientState::Playing
    }

    /// Whether `other` shares this client's (non-empty) team tag.
    pub fn same_team(&self, other: &Client) -> bool {
        !self.team_tag.is_empty() && self.team_tag == other.team_tag
    }

    /// Queue a frame. A closed connection just drops it.
    pub fn send(&self, frame: Bytes) {
        let _ = self.tx.send(frame);
    }
}
