//! Pairwise interaction rules between neighbouring cells.

use super::{World, WorldAction};
use crate::config::EjectPickup;
use crate::entity::{Cell, CellEntry, CellId, PlayerCell};
use crate::geometry::VectorExt;
use crate::physics::{self, mass_to_radius};
use glam::Vec2;
use protocol::CellTag;
use rand::Rng;
use std::f32::consts::TAU;
use tracing::debug;

impl World {
    /// Apply the rule for `id` meeting `other` during the collision pass.
    pub(crate) fn resolve_pair(&mut self, id: CellId, other: CellId) {
        let (Some(a), Some(b)) = (self.get(id), self.get(other)) else {
            return;
        };

        match (a.tag(), b.tag()) {
            (CellTag::Player, CellTag::Player) => {
                if a.owner() == b.owner() {
                    self.resolve_siblings(id, other);
                } else {
                    self.resolve_eat(id, other);
                }
            }
            (CellTag::Player, CellTag::EjectedMass) => {
                let pickable = matches!(b, CellEntry::Ejected(_)) && self.ejected_pickable(other);
                if !pickable {
                    return;
                }
                let push = b.data().boost * self.settings.eject.push_multiplier;
                if let Some(predator) = self.resolve_eat(id, other) {
                    if let Some(entry) = self.get_mut(predator) {
                        entry.data_mut().boost += push;
                    }
                }
            }
            (CellTag::Player, CellTag::Pellet) => {
                if self.resolve_eat(id, other).is_some() {
                    self.spawn_pellet();
                }
            }
            (CellTag::Player, CellTag::DeadMass) => {
                self.resolve_eat(id, other);
            }
            (CellTag::Player, CellTag::Virus) => {
                let virus_mass = b.data().mass();
                if let Some(predator) = self.resolve_eat(id, other) {
                    self.pop_cell(predator, virus_mass);
                    self.spawn_virus();
                }
            }
            (CellTag::EjectedMass, CellTag::EjectedMass) | (CellTag::DeadMass, CellTag::DeadMass) => {
                self.separate(id, other);
            }
            (CellTag::EjectedMass, CellTag::Virus) => self.push_virus(id, other),
            _ => {}
        }
    }

    /// Merge, bump or pass through two cells of the same player.
    fn resolve_siblings(&mut self, id: CellId, other: CellId) {
        let (Some(CellEntry::Player(a)), Some(CellEntry::Player(b))) = (self.get(id), self.get(other)) else {
            return;
        };
        let player = &self.settings.player;
        let (merge_ms, merge_scale) = (player.merge_time_ms, player.merge_time_scale);
        let mergeable = a.can_merge(merge_ms, merge_scale) && b.can_merge(merge_ms, merge_scale);
        let settled = !a.is_split_fresh(player.split_resolve_delay_ms) && !b.is_split_fresh(player.split_resolve_delay_ms);

        if mergeable {
            self.resolve_eat(id, other);
        } else if settled {
            self.separate(id, other);
        }
    }

    /// Whether an ejected mass may be eaten yet.
    fn ejected_pickable(&self, id: CellId) -> bool {
        let Some(CellEntry::Ejected(ejected)) = self.get(id) else {
            return false;
        };
        let aged = ejected.data().age_ms > self.settings.eject.grace_ms;
        match self.settings.eject.pickup {
            EjectPickup::ExitedOrAged => ejected.exited_parent() || aged,
            EjectPickup::Exited => ejected.exited_parent(),
            EjectPickup::Aged => aged,
        }
    }

    /// Try to let `predator` eat `prey`.
    ///
    /// On success the eat is queued against the head of the predator's eater
    /// chain, the prey is marked as eaten, and that head is returned.
    pub(crate) fn resolve_eat(&mut self, predator: CellId, prey: CellId) -> Option<CellId> {
        let (hunter, target) = (self.get(predator)?, self.get(prey)?);
        if target.data().eater.is_some() {
            return None;
        }

        let (h, t) = (hunter.data(), target.data());
        let distance = h.position.distance(t.position);
        let overlap_ok = distance <= h.radius() - t.radius() * self.settings.world.eat_overlap;

        let siblings = matches!((hunter, target), (CellEntry::Player(_), CellEntry::Player(_)))
            && hunter.owner() == target.owner();
        let size_ok = if siblings {
            // Merging ignores the ratio, but never lets the smaller cell win.
            h.mass() >= t.mass()
        } else {
            h.mass() > t.mass() * self.settings.world.eat_size_ratio
        };

        if !overlap_ok || !size_ok {
            return None;
        }

        let head = self.eat_chain_head(predator);
        if head == prey {
            return None;
        }

        self.enqueue(WorldAction::Eat { predator: head, prey });
        if let Some(entry) = self.get_mut(prey) {
            entry.data_mut().eater = Some(head);
        }
        Some(head)
    }

    /// Follow eater links from `id` to the cell that ends up with the mass.
    fn eat_chain_head(&self, id: CellId) -> CellId {
        let mut head = id;
        // Each link points at a cell that was not yet eaten when it was set,
        // so the walk never revisits a cell.
        for _ in 0..self.cells.len() {
            match self.get(head).and_then(|c| c.data().eater) {
                Some(next) => head = next,
                None => break,
            }
        }
        head
    }

    /// Push two cells apart.
    fn separate(&mut self, id: CellId, other: CellId) {
        if let Some((a, b)) = self.pair_mut(id, other) {
            physics::resolve_collision(a.data_mut(), b.data_mut());
        }
    }

    /// Burst a player cell that swallowed a virus into equal fragments.
    ///
    /// The fragments take the remaining cell slots, counting pieces already
    /// queued this tick. With no slot left the cell simply keeps the mass.
    fn pop_cell(&mut self, id: CellId, virus_mass: f32) {
        let Some(CellEntry::Player(cell)) = self.get(id) else {
            return;
        };
        let pid = cell.owner_id();
        let (position, mass) = (cell.data().position, cell.data().mass() + virus_mass);

        let fragments = self.settings.player.max_cells.saturating_sub(self.projected_cell_count(pid));
        if fragments == 0 {
            debug!("Player {} popped with no free cell slots", pid);
            return;
        }

        let share = mass / (fragments + 1) as f32;
        let radius = mass_to_radius(share);
        let pop_boost = self.settings.virus.pop_boost;
        for _ in 0..fragments {
            let direction = Vec2::from_angle(self.rng.random_range(0.0..TAU));
            let piece_id = self.alloc_id();
            let piece = PlayerCell::new(piece_id, pid, position + direction, radius).with_boost(direction * pop_boost);
            self.enqueue(WorldAction::Create(CellEntry::Player(piece)));
        }
        self.enqueue(WorldAction::Update {
            id,
            delta_mass: -share * fragments as f32,
        });
        *self.pending_cells.entry(pid).or_default() += fragments;
        debug!("Player {} popped into {} fragments", pid, fragments);
    }

    /// Ejected mass hitting a virus is absorbed and shoves the virus.
    fn push_virus(&mut self, ejected: CellId, virus: CellId) {
        let Some(mass) = self.get(ejected).map(CellEntry::data) else {
            return;
        };
        if mass.eater.is_some() {
            return;
        }
        let motion = mass.velocity + mass.boost;
        let direction = motion.normal().unwrap_or(Vec2::X);
        let push = direction * self.settings.virus.push_boost;

        self.enqueue(WorldAction::Delete(ejected));
        if let Some(entry) = self.get_mut(ejected) {
            entry.data_mut().eater = Some(virus);
        }
        if let Some(entry) = self.get_mut(virus) {
            entry.data_mut().boost += push;
        }
    }
}
