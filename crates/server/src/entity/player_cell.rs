//! Player cell.

use super::cell::{Cell, CellData};
use super::{CellId, PlayerId};
use glam::Vec2;
use protocol::CellTag;

/// A cell controlled by a player.
#[derive(Debug, Clone)]
pub struct PlayerCell {
    data: CellData,
    owner: PlayerId,
}

impl PlayerCell {
    pub fn new(id: CellId, owner: PlayerId, position: Vec2, radius: f32) -> Self {
        Self {
            data: CellData::new(id, position, radius),
            owner,
        }
    }

    #[inline]
    pub fn owner_id(&self) -> PlayerId {
        self.owner
    }

    pub fn with_boost(mut self, boost: Vec2) -> Self {
        self.data.boost = boost;
        self
    }

    /// Age at which this cell may merge back with its siblings.
    ///
    /// Bigger cells wait longer: `base_ms + mass * scale`.
    pub fn merge_threshold_ms(&self, base_ms: u64, scale: f32) -> u64 {
        base_ms + (self.data.mass() * scale).max(0.0) as u64
    }

    pub fn can_merge(&self, base_ms: u64, scale: f32) -> bool {
        self.data.age_ms >= self.merge_threshold_ms(base_ms, scale)
    }

    /// Freshly split cells pass through their siblings for a short while.
    pub fn is_split_fresh(&self, resolve_delay_ms: u64) -> bool {
        self.data.age_ms < resolve_delay_ms
    }
}

impl Cell for PlayerCell {
    fn data(&self) -> &CellData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut CellData {
        &mut self.data
    }

    fn tag(&self) -> CellTag {
        CellTag::Player
    }

    fn owner(&self) -> Option<PlayerId> {
        Some(self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::mass_to_radius;

    #[test]
    fn test_merge_threshold_grows_with_mass() {
        let small = PlayerCell::new(1, 0, Vec2::ZERO, mass_to_radius(1000.0));
        let big = PlayerCell::new(2, 0, Vec2::ZERO, mass_to_radius(4000.0));

        let small_t = small.merge_threshold_ms(10_000, 0.5);
        let big_t = big.merge_threshold_ms(10_000, 0.5);
        assert!((10_499..=10_500).contains(&small_t));
        assert!(big_t > small_t);
    }

    #[test]
    fn test_can_merge_after_threshold() {
        let mut cell = PlayerCell::new(1, 0, Vec2::ZERO, 10.0);
        assert!(!cell.can_merge(1000, 0.0));
        assert!(cell.is_split_fresh(500));

        cell.data_mut().age_ms = 1000;
        assert!(cell.can_merge(1000, 0.0));
        assert!(!cell.is_split_fresh(500));
    }
}
