//! The arena: entity storage, deferred actions and player bookkeeping.
//!
//! Structural changes (creating, deleting, resizing and eating cells) are
//! never applied while the arena is being iterated. They are queued as
//! [`WorldAction`]s and applied at the start of the next tick.

mod collision;
mod tick;


use crate::config::WorldSettings;
use crate::controller::Controller;
use crate::entity::{Cell, CellEntry, CellId, DeadMass, Pellet, PlayerCell, PlayerId, Virus};
use crate::geometry::{Circle, Rect, Shape};
use crate::physics::{self, mass_to_radius};
use crate::spatial::QuadTree;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::debug;

/// Placement attempts before a player spawns on top of a virus anyway.
const SPAWN_ATTEMPTS: usize = 32;

/// Structural change applied at the start of the next tick.
#[derive(Debug, Clone)]
pub enum WorldAction {
    Create(CellEntry),
    Delete(CellId),
    /// Add `delta_mass` (possibly negative) to a cell.
    Update { id: CellId, delta_mass: f32 },
    /// `predator` absorbs all of `prey`'s mass and `prey` is removed.
    Eat { predator: CellId, prey: CellId },
}

/// A single game arena.
pub struct World {
    settings: WorldSettings,
    tick_ms: u64,
    boundary: Rect,
    /// Dense entity storage.
    cells: Vec<CellEntry>,
    /// Map from cell id to index in `cells`.
    id_to_index: HashMap<CellId, usize>,
    quad_tree: QuadTree,
    actions: VecDeque<WorldAction>,
    controllers: BTreeMap<PlayerId, Controller>,
    /// Cells each player has queued for creation during the current tick.
    pending_cells: HashMap<PlayerId, usize>,
    next_id: CellId,
    tick_count: u64,
    rng: StdRng,
}

impl World {
    /// Create an arena stepped every `tick_ms` milliseconds.
    ///
    /// The configured pellets and viruses are queued and appear on the first
    /// tick.
    pub fn new(settings: WorldSettings, tick_ms: u64) -> Self {
        Self::with_rng(settings, tick_ms, StdRng::from_os_rng())
    }

    /// Like [`World::new`] with a deterministic random source.
    pub fn with_seed(settings: WorldSettings, tick_ms: u64, seed: u64) -> Self {
        Self::with_rng(settings, tick_ms, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: WorldSettings, tick_ms: u64, rng: StdRng) -> Self {
        let size = settings.world.size;
        let boundary = Rect::new(0.0, 0.0, size, size);
        let quad_tree = QuadTree::new(
            boundary,
            settings.world.quadtree_max_objects,
            settings.world.quadtree_max_depth,
        );
        let (pellets, viruses) = (settings.pellet.count, settings.virus.count);

        let mut world = Self {
            settings,
            tick_ms,
            boundary,
            cells: Vec::with_capacity(pellets + viruses),
            id_to_index: HashMap::with_capacity(pellets + viruses),
            quad_tree,
            actions: VecDeque::new(),
            controllers: BTreeMap::new(),
            pending_cells: HashMap::new(),
            next_id: 0,
            tick_count: 0,
            rng,
        };

        for _ in 0..pellets {
            world.spawn_pellet();
        }
        for _ in 0..viruses {
            world.spawn_virus();
        }
        world
    }

    #[inline]
    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    #[inline]
    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    #[inline]
    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Number of live cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, id: CellId) -> Option<&CellEntry> {
        self.id_to_index.get(&id).map(|&idx| &self.cells[idx])
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: CellId) -> Option<&mut CellEntry> {
        self.id_to_index.get(&id).map(|&idx| &mut self.cells[idx])
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellEntry> {
        self.cells.iter()
    }

    /// Spatial index as of the last tick.
    #[inline]
    pub fn quad_tree(&self) -> &QuadTree {
        &self.quad_tree
    }

    pub(crate) fn enqueue(&mut self, action: WorldAction) {
        self.actions.push_back(action);
    }

    fn alloc_id(&mut self) -> CellId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn insert_cell(&mut self, entry: CellEntry) {
        let id = entry.id();
        if let Some(&idx) = self.id_to_index.get(&id) {
            self.cells[idx] = entry;
            return;
        }
        self.id_to_index.insert(id, self.cells.len());
        self.cells.push(entry);
    }

    pub(crate) fn remove_cell(&mut self, id: CellId) -> Option<CellEntry> {
        let idx = self.id_to_index.remove(&id)?;
        let entry = self.cells.swap_remove(idx);

        // Update the index of the swapped cell
        if idx < self.cells.len() {
            let swapped_id = self.cells[idx].id();
            self.id_to_index.insert(swapped_id, idx);
        }
        Some(entry)
    }

    /// Two distinct cells borrowed mutably at once.
    pub(crate) fn pair_mut(&mut self, a: CellId, b: CellId) -> Option<(&mut CellEntry, &mut CellEntry)> {
        let ia = *self.id_to_index.get(&a)?;
        let ib = *self.id_to_index.get(&b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (lo, hi) = self.cells.split_at_mut(ib);
            Some((&mut lo[ia], &mut hi[0]))
        } else {
            let (lo, hi) = self.cells.split_at_mut(ia);
            Some((&mut hi[0], &mut lo[ib]))
        }
    }

    fn random_position(&mut self) -> Vec2 {
        let size = self.settings.world.size;
        Vec2::new(self.rng.random_range(0.0..=size), self.rng.random_range(0.0..=size))
    }

    /// Queue a pellet at a random position.
    pub fn spawn_pellet(&mut self) -> CellId {
        let id = self.alloc_id();
        let position = self.random_position();
        let radius = mass_to_radius(self.settings.pellet.mass);
        self.enqueue(WorldAction::Create(CellEntry::Pellet(Pellet::new(id, position, radius))));
        id
    }

    /// Queue a virus at a random position.
    pub fn spawn_virus(&mut self) -> CellId {
        let id = self.alloc_id();
        let position = self.random_position();
        let radius = mass_to_radius(self.settings.virus.mass);
        self.enqueue(WorldAction::Create(CellEntry::Virus(Virus::new(id, position, radius))));
        id
    }

    /// Queue a fresh cell for `pid`, placed clear of live viruses if possible.
    pub fn spawn_player_cell(&mut self, pid: PlayerId) -> CellId {
        let radius = mass_to_radius(self.settings.player.spawn_mass);
        let mut position = self.random_position();
        for _ in 0..SPAWN_ATTEMPTS {
            if !self.overlaps_virus(&Circle::new(position, radius)) {
                break;
            }
            position = self.random_position();
        }

        let id = self.alloc_id();
        self.enqueue(WorldAction::Create(CellEntry::Player(PlayerCell::new(id, pid, position, radius))));
        id
    }

    fn overlaps_virus(&self, area: &Circle) -> bool {
        self.cells
            .iter()
            .any(|c| matches!(c, CellEntry::Virus(_)) && c.data().boundary().intersects(area))
    }

    /// Register a controller for `pid`, optionally spawning its first cell.
    pub fn on_player_join(&mut self, pid: PlayerId, spawn: bool) {
        self.controllers.entry(pid).or_insert_with(|| Controller::new(pid));
        if spawn {
            let id = self.spawn_player_cell(pid);
            debug!("Player {} joined with cell {}", pid, id);
        } else {
            debug!("Player {} joined", pid);
        }
    }

    /// Deregister `pid` and leave its cells behind as dead mass.
    pub fn on_player_leave(&mut self, pid: PlayerId) {
        if self.controllers.remove(&pid).is_none() {
            return;
        }

        let mut abandoned = 0;
        for entry in self.cells.iter_mut() {
            let dead = match entry {
                CellEntry::Player(cell) if cell.owner() == Some(pid) => DeadMass::from_cell(cell.data()),
                _ => continue,
            };
            *entry = CellEntry::Dead(dead);
            abandoned += 1;
        }

        // Pieces still queued would otherwise go to the next holder of `pid`.
        for action in self.actions.iter_mut() {
            let dead = match action {
                WorldAction::Create(CellEntry::Player(cell)) if cell.owner_id() == pid => {
                    DeadMass::from_cell(cell.data())
                }
                _ => continue,
            };
            *action = WorldAction::Create(CellEntry::Dead(dead));
            abandoned += 1;
        }
        self.pending_cells.remove(&pid);
        debug!("Player {} left, {} cells abandoned", pid, abandoned);
    }

    #[inline]
    pub fn has_player(&self, pid: PlayerId) -> bool {
        self.controllers.contains_key(&pid)
    }

    #[inline]
    pub fn controller(&self, pid: PlayerId) -> Option<&Controller> {
        self.controllers.get(&pid)
    }

    #[inline]
    pub fn controller_mut(&mut self, pid: PlayerId) -> Option<&mut Controller> {
        self.controllers.get_mut(&pid)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &Controller> {
        self.controllers.values()
    }

    /// Live cells owned by `pid`.
    pub fn player_cells(&self, pid: PlayerId) -> impl Iterator<Item = &CellEntry> {
        self.cells
            .iter()
            .filter(move |c| matches!(c, CellEntry::Player(_)) && c.owner() == Some(pid))
    }

    /// Ids of live player cells grouped by owner.
    fn cells_by_owner(&self) -> HashMap<PlayerId, Vec<CellId>> {
        let mut owned: HashMap<PlayerId, Vec<CellId>> = HashMap::new();
        for entry in &self.cells {
            if let CellEntry::Player(cell) = entry {
                if let Some(pid) = cell.owner() {
                    owned.entry(pid).or_default().push(entry.id());
                }
            }
        }
        owned
    }

    /// Live cells plus cells already queued this tick.
    fn projected_cell_count(&self, pid: PlayerId) -> usize {
        self.player_cells(pid).count() + self.pending_cells.get(&pid).copied().unwrap_or(0)
    }

    /// Total mass of a player's live cells.
    pub fn player_mass(&self, pid: PlayerId) -> f32 {
        self.player_cells(pid).map(|c| c.data().mass()).sum()
    }

    /// Mass-weighted center of a player's cells, `None` if it owns none.
    pub fn player_center(&self, pid: PlayerId) -> Option<Vec2> {
        physics::center_of_mass(self.player_cells(pid).map(CellEntry::data))
    }

    /// Where a player's viewport is centred.
    pub fn view_center(&self, pid: PlayerId) -> Vec2 {
        self.player_center(pid).unwrap_or_else(|| self.boundary.center())
    }

    /// Square viewport of side `side` around a player's view center.
    pub fn viewport(&self, pid: PlayerId, side: f32) -> Shape {
        Shape::Rect(Rect::square(self.view_center(pid), side))
    }

    /// Entities intersecting `view`, ordered by id.
    pub fn cells_in_view(&self, view: &Shape) -> Vec<protocol::CellData> {
        let mut visible: Vec<protocol::CellData> = self
            .quad_tree
            .query(view)
            .into_iter()
            .filter_map(|id| self.get(id))
            .map(CellEntry::to_view)
            .collect();
        visible.sort_unstable_by_key(|c| c.id);
        visible
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("cells", &self.cells.len())
            .field("players", &self.controllers.len())
            .field("pending_actions", &self.actions.len())
            .field("tick_count", &self.tick_count)
            .finish()
    }
}
