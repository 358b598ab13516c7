//! A game room: one arena, its connected clients and its tick loop.

use super::client::{Client, ClientState};
use super::pid::PidManager;
use crate::config::{RoomConfig, WorldSettings};
use crate::entity::PlayerId;
use crate::geometry::{Rect, Shape};
use crate::world::World;
use bytes::Bytes;
use glam::Vec2;
use protocol::packets::{self, ClientPacket};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

/// How often the leaderboard is refreshed.
const LEADERBOARD_INTERVAL_MS: u64 = 1000;
/// Leaderboard length.
const LEADERBOARD_SIZE: usize = 10;

/// Shared state of a single room.
pub struct GameRoom {
    name: String,
    region: String,
    capacity: usize,
    view_size: f32,
    world: World,
    pids: PidManager,
    clients: BTreeMap<PlayerId, Client>,
}

impl GameRoom {
    pub fn new(config: &RoomConfig, settings: WorldSettings, view_size: f32) -> Self {
        Self::with_world(config, World::new(settings, config.tick_interval_ms), view_size)
    }

    /// Build a room around an existing arena.
    pub fn with_world(config: &RoomConfig, world: World, view_size: f32) -> Self {
        Self {
            name: config.name.clone(),
            region: config.region.clone(),
            capacity: config.capacity,
            view_size,
            world,
            pids: PidManager::new(config.capacity),
            clients: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Connected clients.
    #[inline]
    pub fn player_count(&self) -> usize {
        self.clients.len()
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn client(&self, pid: PlayerId) -> Option<&Client> {
        self.clients.get(&pid)
    }

    /// Register a new connection, or `None` when the room is full.
    ///
    /// The client is sent the arena size straight away.
    pub fn connect(&mut self, addr: SocketAddr, tx: UnboundedSender<Bytes>) -> Option<PlayerId> {
        let Some(pid) = self.pids.acquire() else {
            warn!("Room {:?} is full, refusing {}", self.name, addr);
            return None;
        };

        let client = Client::new(pid, addr, tx);
        let world_size = self.world.settings().world.size.clamp(0.0, u16::MAX as f32) as u16;
        client.send(packets::build_load_world(world_size).finish());

        self.world.on_player_join(pid, false);
        self.clients.insert(pid, client);
        info!("Player {} connected to {:?} from {}", pid, self.name, addr);
        Some(pid)
    }

    /// Drop a client and leave its cells behind as dead mass.
    pub fn disconnect(&mut self, pid: PlayerId) {
        let Some(client) = self.clients.remove(&pid) else {
            return;
        };
        self.world.on_player_leave(pid);
        self.pids.release(pid);
        info!("Player {} ({}) left {:?}", pid, client.addr, self.name);
    }

    /// Handle one binary message from a client.
    pub fn handle_packet(&mut self, pid: PlayerId, data: &[u8]) -> anyhow::Result<()> {
        if !self.clients.contains_key(&pid) {
            anyhow::bail!("Client {} not found", pid);
        }

        let packet = ClientPacket::parse(data)?;
        match packet {
            ClientPacket::PlayerUpdate { nick, skin, team_tag } => {
                self.handle_player_update(pid, nick, skin, team_tag);
            }
            ClientPacket::Spectate { .. } => {
                if let Some(client) = self.clients.get_mut(&pid) {
                    if !client.is_playing() {
                        client.state = ClientState::Spectating;
                    }
                }
            }
            ClientPacket::MouseMove { dx, dy } => {
                if let Some(controller) = self.world.controller_mut(pid) {
                    controller.set_pointer(Vec2::new(dx as f32, dy as f32));
                }
            }
            ClientPacket::ToggleFeed(feeding) => {
                if let Some(controller) = self.world.controller_mut(pid) {
                    controller.set_ejecting(feeding);
                }
            }
            ClientPacket::Split(macro_count) => {
                if let Some(controller) = self.world.controller_mut(pid) {
                    controller.request_splits(macro_count as u32 + 1);
                }
            }
            ClientPacket::Ignored(opcode) => {
                debug!("Player {} sent unhandled opcode {}", pid, opcode);
            }
        }
        Ok(())
    }

    fn handle_player_update(&mut self, pid: PlayerId, nick: String, skin: String, team_tag: String) {
        let Some(client) = self.clients.get_mut(&pid) else {
            return;
        };
        client.nick = nick;
        client.skin = skin;
        client.team_tag = team_tag;
        let spawn = !client.is_playing();
        if spawn {
            client.state = ClientState::Playing;
        }

        // Replicate the new details to everyone in the room.
        if let (Ok(wire_pid), Some(client)) = (u8::try_from(pid), self.clients.get(&pid)) {
            for other in self.clients.values() {
                let frame = packets::build_player_update(wire_pid, &client.nick, &client.skin, client.same_team(other));
                other.send(frame.finish());
            }
        }

        if spawn {
            let id = self.world.spawn_player_cell(pid);
            debug!("Player {} spawning with cell {}", pid, id);
        }
    }

    /// Step the arena and push the new state to every client.
    pub fn tick(&mut self) {
        self.world.tick();

        // Playing clients left with no cells have died.
        for client in self.clients.values_mut() {
            if client.is_playing() && self.world.player_cells(client.pid).next().is_none() {
                client.state = ClientState::Idle;
                debug!("Player {} lost all cells", client.pid);
            }
        }

        for client in self.clients.values() {
            let view = self.viewport(client);
            let center = view.center();
            let cells = self.world.cells_in_view(&view);
            client.send(packets::build_gamestate_update(center.x, center.y, &cells).finish());
        }

        let elapsed_ms = self.world.tick_count() * self.world.tick_ms();
        if elapsed_ms % LEADERBOARD_INTERVAL_MS < self.world.tick_ms() {
            let leaders = self.leaderboard();
            let nicks: Vec<&str> = leaders.iter().map(|(_, nick)| *nick).collect();
            let frame = packets::build_leaderboard_update(&nicks).finish();
            for client in self.clients.values() {
                client.send(frame.clone());
            }
        }
    }

    /// Area sent to a client: around its cells while playing, the whole
    /// arena otherwise.
    fn viewport(&self, client: &Client) -> Shape {
        if client.is_playing() {
            self.world.viewport(client.pid, self.view_size)
        } else {
            let arena = self.world.boundary();
            Shape::Rect(Rect::square(arena.center(), arena.width().max(arena.height())))
        }
    }

    /// Top players by total mass, heaviest first.
    pub fn leaderboard(&self) -> Vec<(PlayerId, &str)> {
        let mut scores: Vec<(PlayerId, &str, f32)> = self
            .clients
            .values()
            .filter(|c| c.is_playing())
            .map(|c| (c.pid, c.nick.as_str(), self.world.player_mass(c.pid)))
            .collect();
        scores.sort_by(|a, b| b.2.total_cmp(&a.2));
        scores
            .into_iter()
            .take(LEADERBOARD_SIZE)
            .map(|(pid, nick, _)| (pid, nick))
            .collect()
    }
}

/// Drive a room at a fixed period until the process exits.
pub async fn run_room_loop(room: Arc<RwLock<GameRoom>>, tick_interval_ms: u64) {
    let period = Duration::from_millis(tick_interval_ms);
    let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut room = room.write().await;
        let tick_start = Instant::now();
        room.tick();
        let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;

        // Warn if the tick ate most of its period
        let tick_budget = tick_interval_ms as f64 * 0.9;
        if tick_ms > tick_budget {
            warn!(
                "Slow tick #{} in {:?}: {:.3}ms (budget: {:.1}ms) - {} players, {} cells",
                room.world.tick_count(),
                room.name,
                tick_ms,
                tick_budget,
                room.clients.len(),
                room.world.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use protocol::BinaryReader;
    use protocol::packets::ClientOpcode;
    use protocol::{BinaryWriter, CellTag};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn room(capacity: usize) -> GameRoom {
        let mut settings = Config::default().world_settings();
        settings.world.size = 1000.0;
        settings.pellet.count = 5;
        settings.virus.count = 0;
        let config = RoomConfig {
            capacity,
            ..RoomConfig::default()
        };
        GameRoom::with_world(&config, World::with_seed(settings, 50, 11), 400.0)
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn join(room: &mut GameRoom) -> (PlayerId, UnboundedReceiver<Bytes>) {
        let (tx, rx) = unbounded_channel();
        let pid = room.connect(addr(), tx).unwrap();
        (pid, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Bytes>) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    fn player_update(nick: &str, team: &str) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.put_u8(ClientOpcode::PlayerUpdate as u8);
        w.put_string(nick);
        w.put_string("");
        w.put_string(team);
        w.as_slice().to_vec()
    }

    #[test]
    fn test_connect_sends_world_size() {
        let mut room = room(4);
        let (pid, mut rx) = join(&mut room);
        assert_eq!(pid, 0);
        assert!(room.world().has_player(pid));

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        let mut r = BinaryReader::new(frames[0].clone());
        assert_eq!(r.read_u8().unwrap(), 0);
        assert_eq!(r.read_u16().unwrap(), 1000);
    }

    #[test]
    fn test_full_room_refuses() {
        let mut room = room(1);
        let (first, _rx) = join(&mut room);
        let (tx, _rx2) = unbounded_channel();
        assert!(room.connect(addr(), tx).is_none());

        room.disconnect(first);
        assert_eq!(room.player_count(), 0);
        let (tx, _rx3) = unbounded_channel();
        assert_eq!(room.connect(addr(), tx), Some(0));
    }

    #[test]
    fn test_player_update_spawns_once_and_replicates() {
        let mut room = room(4);
        let (a, mut rx_a) = join(&mut room);
        let (b, mut rx_b) = join(&mut room);
        drain(&mut rx_a);
        drain(&mut rx_b);

        room.handle_packet(a, &player_update("alpha", "red")).unwrap();
        room.handle_packet(a, &player_update("alpha", "red")).unwrap();
        room.tick();
        assert_eq!(room.world().player_cells(a).count(), 1);
        assert!(room.client(a).unwrap().is_playing());
        assert!(!room.client(b).unwrap().is_playing());

        // Two replications each, then the state update.
        let frames = drain(&mut rx_b);
        let updates: Vec<&Bytes> = frames.iter().filter(|f| f[0] == 2).collect();
        assert_eq!(updates.len(), 2);
        let mut r = BinaryReader::new(updates[0].clone());
        assert_eq!(r.read_u8().unwrap(), 2);
        assert_eq!(r.read_u8().unwrap(), a as u8);
        assert_eq!(r.read_string(), "alpha");
        assert_eq!(r.read_string(), "");
        assert_eq!(r.read_u8().unwrap(), 0);
    }

    #[test]
    fn test_tick_sends_visible_cells() {
        let mut room = room(4);
        let (pid, mut rx) = join(&mut room);
        room.handle_packet(pid, &player_update("blob", "")).unwrap();
        room.tick();

        let frames = drain(&mut rx);
        let state = frames.iter().find(|f| f[0] == 1).unwrap();
        let mut r = BinaryReader::new(state.clone());
        r.read_u8().unwrap();
        let center = Vec2::new(r.read_f32().unwrap(), r.read_f32().unwrap());
        assert!(center.distance(room.world().view_center(pid)) < 1e-3);

        let mut own_cells = 0;
        while r.remaining() > 0 {
            r.read_u32().unwrap();
            let tag = CellTag::from_u8(r.read_u8().unwrap()).unwrap();
            let owner = r.read_u32().unwrap();
            r.read_f32().unwrap();
            r.read_f32().unwrap();
            r.read_f32().unwrap();
            if tag == CellTag::Player && owner == pid {
                own_cells += 1;
            }
        }
        assert_eq!(own_cells, 1);
    }

    #[test]
    fn test_input_reaches_controller() {
        let mut room = room(4);
        let (pid, _rx) = join(&mut room);

        room.handle_packet(pid, &[ClientOpcode::MouseMove as u8, 0x10, 0x00, 0xF0, 0xFF]).unwrap();
        room.handle_packet(pid, &[ClientOpcode::ToggleFeed as u8, 1]).unwrap();
        room.handle_packet(pid, &[ClientOpcode::Split as u8, 2]).unwrap();
        room.handle_packet(pid, &[ClientOpcode::SaveReplay as u8]).unwrap();

        let input = room.world().controller(pid).unwrap().input();
        assert_eq!(input.pointer, Vec2::new(16.0, -16.0));
        assert!(input.ejecting);
        assert_eq!(input.pending_splits, 3);
    }

    #[test]
    fn test_bad_packets_are_errors() {
        let mut room = room(4);
        let (pid, _rx) = join(&mut room);
        assert!(room.handle_packet(pid, &[0x42]).is_err());
        assert!(room.handle_packet(pid, &[]).is_err());
        assert!(room.handle_packet(pid + 1, &[ClientOpcode::ToggleFeed as u8, 1]).is_err());
    }

    #[test]
    fn test_leaderboard_sorted_by_mass() {
        let mut room = room(4);
        let (a, _rx_a) = join(&mut room);
        let (b, _rx_b) = join(&mut room);
        let (_c, _rx_c) = join(&mut room);
        room.handle_packet(a, &player_update("small", "")).unwrap();
        room.handle_packet(b, &player_update("big", "")).unwrap();
        room.tick();

        let cell = room.world.player_cells(b).next().unwrap().id();
        room.world.get_mut(cell).unwrap().data_mut().add_mass(5000.0);

        let leaders = room.leaderboard();
        assert_eq!(leaders, vec![(b, "big"), (a, "small")]);
    }

    #[test]
    fn test_leaderboard_sent_once_per_second() {
        let mut room = room(4);
        let (_pid, mut rx) = join(&mut room);
        drain(&mut rx);

        let mut boards = 0;
        for _ in 0..40 {
            room.tick();
            boards += drain(&mut rx).iter().filter(|f| f[0] == 3).count();
        }
        assert_eq!(boards, 2);
    }

    #[test]
    fn test_disconnect_leaves_dead_mass() {
        let mut room = room(4);
        let (pid, _rx) = join(&mut room);
        room.handle_packet(pid, &player_update("gone", "")).unwrap();
        room.tick();
        let cell = room.world().player_cells(pid).next().unwrap().id();

        room.disconnect(pid);
        assert!(!room.world().has_player(pid));
        assert_eq!(room.world().get(cell).unwrap().tag(), CellTag::DeadMass);
        assert_eq!(room.player_count(), 0);
    }
}
