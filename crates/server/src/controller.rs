//! Per-player input held between ticks.

use crate::entity::PlayerId;
use glam::Vec2;

/// What a player asked for since the last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Pointer offset from the player's center of mass.
    pub pointer: Vec2,
    /// Whether the feed key is held.
    pub ejecting: bool,
    /// Outstanding split generations.
    pub pending_splits: u32,
}

/// Input holder for one registered player.
///
/// The network side writes input at any time between ticks, the world reads
/// it once per tick.
#[derive(Debug, Clone)]
pub struct Controller {
    pid: PlayerId,
    input: PlayerInput,
    eject_cooldown_ms: u64,
}

impl Controller {
    pub fn new(pid: PlayerId) -> Self {
        Self {
            pid,
            input: PlayerInput::default(),
            eject_cooldown_ms: 0,
        }
    }

    #[inline]
    pub fn pid(&self) -> PlayerId {
        self.pid
    }

    #[inline]
    pub fn input(&self) -> PlayerInput {
        self.input
    }

    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.input.pointer = pointer;
    }

    pub fn set_ejecting(&mut self, ejecting: bool) {
        self.input.ejecting = ejecting;
    }

    /// Queue `count` split generations, replacing any still pending.
    pub fn request_splits(&mut self, count: u32) {
        self.input.pending_splits = count;
    }

    pub(crate) fn consume_split(&mut self) {
        self.input.pending_splits = self.input.pending_splits.saturating_sub(1);
    }

    /// Advance the eject cooldown by one tick.
    ///
    /// Returns true when the player ejects this tick, which restarts the
    /// cooldown.
    pub(crate) fn try_eject(&mut self, tick_ms: u64, cooldown_ms: u64) -> bool {
        if self.eject_cooldown_ms > 0 {
            self.eject_cooldown_ms = self.eject_cooldown_ms.saturating_sub(tick_ms);
            return false;
        }
        self.eject_cooldown_ms = cooldown_ms;
        true
    }
}
