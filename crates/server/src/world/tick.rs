//! The five ordered phases of a simulation tick.

use super::{World, WorldAction};
use crate::entity::{Cell, CellEntry, CellId, EjectedMass, PlayerCell, PlayerId};
use crate::geometry::VectorExt;
use crate::physics::{self, mass_to_radius};
use crate::spatial::{QuadItem, QuadTree};
use glam::Vec2;
use rand::Rng;
use std::time::Instant;
use tracing::debug;

impl World {
    /// Advance the simulation by one tick.
    pub fn tick(&mut self) {
        let tick_start = Instant::now();
        self.tick_count += 1;

        self.drain_actions();
        let drain_time = tick_start.elapsed();

        let input_start = Instant::now();
        self.apply_input();
        let input_time = input_start.elapsed();

        let motion_start = Instant::now();
        self.integrate_motion();
        let motion_time = motion_start.elapsed();

        let index_start = Instant::now();
        self.rebuild_index();
        self.advance_lifecycles();
        let index_time = index_start.elapsed();

        let collision_start = Instant::now();
        self.resolve_collisions();
        let collision_time = collision_start.elapsed();

        // Log performance metrics every 400 ticks
        if self.tick_count % 400 == 0 {
            debug!(
                "Tick #{}: {:.2}ms total | drain={:.2}ms input={:.2}ms move={:.2}ms index={:.2}ms collision={:.2}ms | {} cells, {} players, {} queued",
                self.tick_count,
                tick_start.elapsed().as_secs_f64() * 1000.0,
                drain_time.as_secs_f64() * 1000.0,
                input_time.as_secs_f64() * 1000.0,
                motion_time.as_secs_f64() * 1000.0,
                index_time.as_secs_f64() * 1000.0,
                collision_time.as_secs_f64() * 1000.0,
                self.cells.len(),
                self.controllers.len(),
                self.actions.len()
            );
        }
    }

    /// Phase 1: apply everything queued during the previous tick.
    pub(crate) fn drain_actions(&mut self) {
        while let Some(action) = self.actions.pop_front() {
            match action {
                WorldAction::Create(entry) => {
                    self.insert_cell(entry);
                }
                WorldAction::Delete(id) => {
                    self.remove_cell(id);
                }
                WorldAction::Update { id, delta_mass } => {
                    if let Some(entry) = self.get_mut(id) {
                        entry.data_mut().add_mass(delta_mass);
                    }
                }
                WorldAction::Eat { predator, prey } => {
                    if predator == prey || !self.id_to_index.contains_key(&predator) {
                        continue;
                    }
                    let Some(eaten) = self.remove_cell(prey) else {
                        continue;
                    };
                    if let Some(entry) = self.get_mut(predator) {
                        entry.data_mut().add_mass(eaten.data().mass());
                    }
                }
            }
        }
    }

    /// Phase 2: steer, eject and split from each player's input.
    fn apply_input(&mut self) {
        self.pending_cells.clear();
        let mut owned = self.cells_by_owner();
        let pids: Vec<PlayerId> = self.controllers.keys().copied().collect();

        for pid in pids {
            let cells = owned.remove(&pid).unwrap_or_default();
            self.apply_player_input(pid, &cells);
        }
    }

    fn apply_player_input(&mut self, pid: PlayerId, cells: &[CellId]) {
        let Some(center) = physics::center_of_mass(cells.iter().filter_map(|&id| self.get(id)).map(CellEntry::data))
        else {
            return;
        };

        let tick_ms = self.tick_ms;
        let Some(controller) = self.controllers.get_mut(&pid) else {
            return;
        };
        let input = controller.input();
        let eject_now = input.ejecting && controller.try_eject(tick_ms, self.settings.eject.cooldown_ms);
        let splitting = input.pending_splits > 0;
        if splitting {
            controller.consume_split();
        }

        let target = center + input.pointer;
        let max_cells = self.settings.player.max_cells;
        let mut projected = cells.len() + self.pending_cells.get(&pid).copied().unwrap_or(0);
        let mut declined = 0;

        for &id in cells {
            let Some(&idx) = self.id_to_index.get(&id) else {
                continue;
            };
            let data = self.cells[idx].data_mut();
            let offset = target - data.position;
            let direction = offset.normal();
            data.velocity = match direction {
                Some(direction) => direction * self.settings.player.speed(data.radius(), tick_ms),
                None => Vec2::ZERO,
            };

            let (position, radius, mass) = (data.position, data.radius(), data.mass());
            // Feeding and splitting with the pointer dead centre go right.
            let aim = direction.unwrap_or(Vec2::X);

            if eject_now && mass >= self.settings.player.min_eject_mass {
                self.eject_from(id, position, radius, aim);
            }

            if splitting && mass > self.settings.player.min_split_mass {
                if projected < max_cells {
                    self.split_cell(id, pid, position, radius, aim);
                    projected += 1;
                } else {
                    declined += 1;
                }
            }
        }

        if declined > 0 {
            debug!("Player {} at {} cells, declined {} splits", pid, max_cells, declined);
        }
    }

    /// Queue an ejected mass leaving `parent` along `direction`.
    fn eject_from(&mut self, parent: CellId, position: Vec2, radius: f32, direction: Vec2) {
        let eject = &self.settings.eject;
        let (mass, boost, dispersion) = (eject.mass, eject.boost, eject.dispersion.abs());
        let angle = self.rng.random_range(-dispersion..=dispersion);

        let id = self.alloc_id();
        let ejected = EjectedMass::new(
            id,
            parent,
            position + direction * radius,
            mass_to_radius(mass),
            (direction * boost).rotated(angle),
        );
        self.enqueue(WorldAction::Create(CellEntry::Ejected(ejected)));
        self.enqueue(WorldAction::Update {
            id: parent,
            delta_mass: -mass,
        });
    }

    /// Queue a half-mass copy of a cell launched along `direction`.
    fn split_cell(&mut self, parent: CellId, pid: PlayerId, position: Vec2, radius: f32, direction: Vec2) {
        let half_radius = (radius * radius / 2.0).sqrt();
        let id = self.alloc_id();
        let piece = PlayerCell::new(id, pid, position + direction, half_radius)
            .with_boost(direction * self.settings.player.split_boost);
        let piece_mass = piece.data().mass();

        self.enqueue(WorldAction::Create(CellEntry::Player(piece)));
        self.enqueue(WorldAction::Update {
            id: parent,
            delta_mass: -piece_mass,
        });
        *self.pending_cells.entry(pid).or_default() += 1;
    }

    /// Phase 3: move everything and keep it inside the arena.
    fn integrate_motion(&mut self) {
        let friction = self.settings.world.friction;
        let boundary = self.boundary;
        for entry in &mut self.cells {
            entry.step_motion(friction);
            entry.handle_wall_bounce(&boundary);
        }
    }

    /// Phase 4a: index every cell at its new position.
    fn rebuild_index(&mut self) {
        let mut tree = QuadTree::new(
            self.boundary,
            self.settings.world.quadtree_max_objects,
            self.settings.world.quadtree_max_depth,
        );
        for entry in &self.cells {
            tree.insert(QuadItem::new(entry.id(), entry.data().shape()));
        }
        self.quad_tree = tree;
    }

    /// Phase 4b: age cells, then queue decay and expiry.
    fn advance_lifecycles(&mut self) {
        let tick_ms = self.tick_ms;
        let player = &self.settings.player;
        let (decay_interval, decay_scale, decay_min) =
            (player.decay_interval_ms, player.decay_scale, player.decay_min_mass);
        let (eject_lifetime, dead_lifetime) = (self.settings.eject.lifetime_ms, self.settings.dead.lifetime_ms);

        let mut queued = Vec::new();
        for idx in 0..self.cells.len() {
            self.cells[idx].tick(tick_ms);

            let parent_bound = match &self.cells[idx] {
                CellEntry::Ejected(ejected) if !ejected.exited_parent() => {
                    Some(self.get(ejected.parent()).map(|p| p.data().boundary()))
                }
                _ => None,
            };
            if let (Some(parent), CellEntry::Ejected(ejected)) = (parent_bound, &mut self.cells[idx]) {
                ejected.update_exited_parent(parent);
            }

            let entry = &self.cells[idx];
            let data = entry.data();
            match entry {
                CellEntry::Player(_) if decay_interval > 0 => {
                    // Fires on the tick that crosses each multiple of the interval.
                    let mass = data.mass();
                    let crossed = data.age_ms.saturating_sub(tick_ms) / decay_interval < data.age_ms / decay_interval;
                    if crossed && mass > decay_min {
                        let kept = (mass * decay_scale).max(decay_min);
                        queued.push(WorldAction::Update {
                            id: data.id,
                            delta_mass: kept - mass,
                        });
                    }
                }
                CellEntry::Ejected(_) if data.age_ms > eject_lifetime => {
                    queued.push(WorldAction::Delete(data.id));
                }
                CellEntry::Dead(_) if data.age_ms > dead_lifetime => {
                    queued.push(WorldAction::Delete(data.id));
                }
                _ => {}
            }
        }
        self.actions.extend(queued);
    }

    /// Phase 5: look up each cell's neighbours and apply the interaction rules.
    fn resolve_collisions(&mut self) {
        for entry in &mut self.cells {
            entry.data_mut().eater = None;
        }

        let ids: Vec<CellId> = self.cells.iter().map(CellEntry::id).collect();
        let mut candidates = Vec::new();
        for id in ids {
            let Some(bound) = self.get(id).map(|c| c.data().shape()) else {
                continue;
            };
            candidates.clear();
            self.quad_tree.query_into(&bound, &mut candidates);
            for &other in &candidates {
                if other != id {
                    self.resolve_pair(id, other);
                }
            }
        }
    }
}
