//! Player id allocation for a room.

use crate::entity::PlayerId;
use fixedbitset::FixedBitSet;

/// Hands out the lowest free pid below a fixed capacity.
#[derive(Debug, Clone)]
pub struct PidManager {
    used: FixedBitSet,
}

impl PidManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            used: FixedBitSet::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.used.len()
    }

    /// Number of pids currently handed out.
    #[inline]
    pub fn in_use(&self) -> usize {
        self.used.count_ones(..)
    }

    /// Take the lowest free pid, or `None` when the room is full.
    pub fn acquire(&mut self) -> Option<PlayerId> {
        let pid = self.used.zeroes().next()?;
        self.used.insert(pid);
        Some(pid as PlayerId)
    }

    /// Return a pid to the pool. Unknown pids are ignored.
    pub fn release(&mut self, pid: PlayerId) {
        let idx = pid as usize;
        if idx < self.used.len() {
            self.used.set(idx, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_lowest_free() {
        let mut pids = PidManager::new(3);
        assert_eq!(pids.acquire(), Some(0));
        assert_eq!(pids.acquire(), Some(1));
        assert_eq!(pids.acquire(), Some(2));
        assert_eq!(pids.acquire(), None);
        assert_eq!(pids.in_use(), 3);

        pids.release(1);
        assert_eq!(pids.in_use(), 2);
        assert_eq!(pids.acquire(), Some(1));
    }

    #[test]
    fn test_release_out_of_range() {
        let mut pids = PidManager::new(1);
        pids.release(40);
        assert_eq!(pids.capacity(), 1);
        assert_eq!(pids.acquire(), Some(0));
    }
}
