//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("world size must be positive, got {0}")]
    WorldSize(f32),
    #[error("friction must be within [0, 1], got {0}")]
    Friction(f32),
    #[error("eat size ratio must be at least 1, got {0}")]
    EatSizeRatio(f32),
    #[error("player max cells must be at least 1")]
    MaxCells,
    #[error("room {0:?} has a zero tick interval")]
    TickInterval(String),
    #[error("room {0:?} capacity must be within 1..=256")]
    Capacity(String),
    #[error("no rooms configured")]
    NoRooms,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_rooms")]
    pub rooms: Vec<RoomConfig>,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub eject: EjectConfig,
    #[serde(default)]
    pub virus: VirusConfig,
    #[serde(default)]
    pub pellet: PelletConfig,
    #[serde(default)]
    pub dead: DeadConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("config.toml");
        let config = if path.exists() {
            Self::from_toml_str(&std::fs::read_to_string(path)?)?
        } else {
            info!("No config.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world.size > 0.0) {
            return Err(ConfigError::WorldSize(self.world.size));
        }
        if !(0.0..=1.0).contains(&self.world.friction) {
            return Err(ConfigError::Friction(self.world.friction));
        }
        if !(self.world.eat_size_ratio >= 1.0) {
            return Err(ConfigError::EatSizeRatio(self.world.eat_size_ratio));
        }
        if self.player.max_cells == 0 {
            return Err(ConfigError::MaxCells);
        }
        if self.rooms.is_empty() {
            return Err(ConfigError::NoRooms);
        }
        for room in &self.rooms {
            if room.tick_interval_ms == 0 {
                return Err(ConfigError::TickInterval(room.name.clone()));
            }
            if !(1..=256).contains(&room.capacity) {
                return Err(ConfigError::Capacity(room.name.clone()));
            }
        }
        Ok(())
    }

    /// The simulation settings shared by every room.
    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            world: self.world.clone(),
            player: self.player.clone(),
            eject: self.eject.clone(),
            virus: self.virus.clone(),
            pellet: self.pellet.clone(),
            dead: self.dead.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rooms: default_rooms(),
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            eject: EjectConfig::default(),
            virus: VirusConfig::default(),
            pellet: PelletConfig::default(),
            dead: DeadConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

/// Immutable settings a `World` is built from.
#[derive(Debug, Clone, Default)]
pub struct WorldSettings {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub eject: EjectConfig,
    pub virus: VirusConfig,
    pub pellet: PelletConfig,
    pub dead: DeadConfig,
}

/// Server networking settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port of the HTTP listing endpoint.
    #[serde(default = "default_listing_port")]
    pub listing_port: u16,
    /// Host name advertised in room urls.
    #[serde(default = "default_public_host")]
    pub public_host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            listing_port: default_listing_port(),
            public_host: default_public_host(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_listing_port() -> u16 {
    8080
}
fn default_public_host() -> String {
    "localhost".to_string()
}

/// One independent game room.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoomConfig {
    #[serde(default = "default_room_name")]
    pub name: String,
    /// Listing region: `na`, `eu` or `as`.
    #[serde(default = "default_room_region")]
    pub region: String,
    #[serde(default = "default_room_port")]
    pub port: u16,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Maximum simultaneous connections.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: default_room_name(),
            region: default_room_region(),
            port: default_room_port(),
            tick_interval_ms: default_tick_interval(),
            capacity: default_capacity(),
        }
    }
}

fn default_rooms() -> Vec<RoomConfig> {
    vec![RoomConfig::default()]
}
fn default_room_name() -> String {
    "Arena 1".to_string()
}
fn default_room_region() -> String {
    "na".to_string()
}
fn default_room_port() -> u16 {
    9001
}
fn default_tick_interval() -> u64 {
    50
}
fn default_capacity() -> usize {
    64
}

/// Arena and collision settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    /// Side of the square arena.
    #[serde(default = "default_world_size")]
    pub size: f32,
    /// Boost multiplier applied every tick.
    #[serde(default = "default_friction")]
    pub friction: f32,
    /// Fraction of the prey's radius allowed to stick out of the predator.
    #[serde(default = "default_eat_overlap")]
    pub eat_overlap: f32,
    /// Predator mass must exceed prey mass times this.
    #[serde(default = "default_eat_size_ratio")]
    pub eat_size_ratio: f32,
    #[serde(default = "default_quadtree_max_objects")]
    pub quadtree_max_objects: usize,
    #[serde(default = "default_quadtree_max_depth")]
    pub quadtree_max_depth: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: default_world_size(),
            friction: default_friction(),
            eat_overlap: default_eat_overlap(),
            eat_size_ratio: default_eat_size_ratio(),
            quadtree_max_objects: default_quadtree_max_objects(),
            quadtree_max_depth: default_quadtree_max_depth(),
        }
    }
}

fn default_world_size() -> f32 {
    8000.0
}
fn default_friction() -> f32 {
    0.9
}
fn default_eat_overlap() -> f32 {
    0.4
}
fn default_eat_size_ratio() -> f32 {
    1.2
}
fn default_quadtree_max_objects() -> usize {
    4
}
fn default_quadtree_max_depth() -> u32 {
    16
}

/// How cell speed falls off with radius.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeedCurve {
    /// `radius^-exponent`.
    Power { exponent: f32 },
    /// Linear from `max_factor` at `min_radius` down to `min_factor` at `max_radius`.
    Linear {
        min_radius: f32,
        max_radius: f32,
        max_factor: f32,
        min_factor: f32,
    },
}

impl SpeedCurve {
    pub fn factor(&self, radius: f32) -> f32 {
        match *self {
            SpeedCurve::Power { exponent } => radius.max(1.0).powf(-exponent),
            SpeedCurve::Linear {
                min_radius,
                max_radius,
                max_factor,
                min_factor,
            } => {
                let span = max_radius - min_radius;
                let t = if span > 0.0 {
                    ((radius - min_radius) / span).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                max_factor + (min_factor - max_factor) * t
            }
        }
    }
}

impl Default for SpeedCurve {
    fn default() -> Self {
        SpeedCurve::Power { exponent: 0.5 }
    }
}

/// Player cell settings. Masses are areas; durations are milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_spawn_mass")]
    pub spawn_mass: f32,
    /// Units per second at a speed factor of 1.
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,
    /// Upper bound on per-tick velocity.
    #[serde(default = "default_speed_cap")]
    pub speed_cap: f32,
    #[serde(default)]
    pub speed_curve: SpeedCurve,
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,
    #[serde(default = "default_merge_time")]
    pub merge_time_ms: u64,
    /// Extra merge delay per unit of mass.
    #[serde(default = "default_merge_time_scale")]
    pub merge_time_scale: f32,
    #[serde(default = "default_min_split_mass")]
    pub min_split_mass: f32,
    #[serde(default = "default_min_eject_mass")]
    pub min_eject_mass: f32,
    #[serde(default = "default_split_boost")]
    pub split_boost: f32,
    #[serde(default = "default_split_resolve_delay")]
    pub split_resolve_delay_ms: u64,
    /// Zero disables decay.
    #[serde(default = "default_decay_interval")]
    pub decay_interval_ms: u64,
    /// Fraction of mass kept on each decay step.
    #[serde(default = "default_decay_scale")]
    pub decay_scale: f32,
    #[serde(default = "default_decay_min_mass")]
    pub decay_min_mass: f32,
}

impl PlayerConfig {
    /// Per-tick speed of a cell with the given radius.
    pub fn speed(&self, radius: f32, tick_ms: u64) -> f32 {
        let per_tick = self.base_speed * tick_ms as f32 / 1000.0;
        (per_tick * self.speed_curve.factor(radius)).min(self.speed_cap)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn_mass: default_spawn_mass(),
            base_speed: default_base_speed(),
            speed_cap: default_speed_cap(),
            speed_curve: SpeedCurve::default(),
            max_cells: default_max_cells(),
            merge_time_ms: default_merge_time(),
            merge_time_scale: default_merge_time_scale(),
            min_split_mass: default_min_split_mass(),
            min_eject_mass: default_min_eject_mass(),
            split_boost: default_split_boost(),
            split_resolve_delay_ms: default_split_resolve_delay(),
            decay_interval_ms: default_decay_interval(),
            decay_scale: default_decay_scale(),
            decay_min_mass: default_decay_min_mass(),
        }
    }
}

fn default_spawn_mass() -> f32 {
    2000.0
}
fn default_base_speed() -> f32 {
    3000.0
}
fn default_speed_cap() -> f32 {
    30.0
}
fn default_max_cells() -> usize {
    16
}
fn default_merge_time() -> u64 {
    10_000
}
fn default_merge_time_scale() -> f32 {
    0.5
}
fn default_min_split_mass() -> f32 {
    1800.0
}
fn default_min_eject_mass() -> f32 {
    1500.0
}
fn default_split_boost() -> f32 {
    40.0
}
fn default_split_resolve_delay() -> u64 {
    500
}
fn default_decay_interval() -> u64 {
    1000
}
fn default_decay_scale() -> f32 {
    0.998
}
fn default_decay_min_mass() -> f32 {
    2000.0
}

/// Which condition frees ejected mass for pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EjectPickup {
    /// Either condition.
    #[default]
    ExitedOrAged,
    /// Only once it fully left its parent.
    Exited,
    /// Only once older than the grace period.
    Aged,
}

/// Ejected mass settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EjectConfig {
    #[serde(default = "default_eject_mass")]
    pub mass: f32,
    #[serde(default = "default_eject_boost")]
    pub boost: f32,
    #[serde(default = "default_eject_cooldown")]
    pub cooldown_ms: u64,
    /// Maximum random deviation of the launch angle, in radians.
    #[serde(default = "default_eject_dispersion")]
    pub dispersion: f32,
    #[serde(default = "default_eject_lifetime")]
    pub lifetime_ms: u64,
    /// Share of the ejected boost passed to whoever eats it.
    #[serde(default = "default_eject_push")]
    pub push_multiplier: f32,
    #[serde(default)]
    pub pickup: EjectPickup,
    /// Age the mass must exceed for the `aged` pickup condition.
    #[serde(default = "default_eject_grace")]
    pub grace_ms: u64,
}

impl Default for EjectConfig {
    fn default() -> Self {
        Self {
            mass: default_eject_mass(),
            boost: default_eject_boost(),
            cooldown_ms: default_eject_cooldown(),
            dispersion: default_eject_dispersion(),
            lifetime_ms: default_eject_lifetime(),
            push_multiplier: default_eject_push(),
            pickup: EjectPickup::default(),
            grace_ms: default_eject_grace(),
        }
    }
}

fn default_eject_mass() -> f32 {
    1000.0
}
fn default_eject_boost() -> f32 {
    60.0
}
fn default_eject_cooldown() -> u64 {
    100
}
fn default_eject_dispersion() -> f32 {
    0.1
}
fn default_eject_grace() -> u64 {
    1000
}
fn default_eject_lifetime() -> u64 {
    20_000
}
fn default_eject_push() -> f32 {
    0.1
}

/// Virus settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VirusConfig {
    /// Viruses kept alive in the arena.
    #[serde(default = "default_virus_count")]
    pub count: usize,
    #[serde(default = "default_virus_mass")]
    pub mass: f32,
    /// Impulse received when hit by ejected mass.
    #[serde(default = "default_virus_push_boost")]
    pub push_boost: f32,
    /// Launch boost of fragments when a player cell pops.
    #[serde(default = "default_virus_pop_boost")]
    pub pop_boost: f32,
}

impl Default for VirusConfig {
    fn default() -> Self {
        Self {
            count: default_virus_count(),
            mass: default_virus_mass(),
            push_boost: default_virus_push_boost(),
            pop_boost: default_virus_pop_boost(),
        }
    }
}

fn default_virus_count() -> usize {
    30
}
fn default_virus_mass() -> f32 {
    15_000.0
}
fn default_virus_push_boost() -> f32 {
    20.0
}
fn default_virus_pop_boost() -> f32 {
    30.0
}

/// Pellet settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PelletConfig {
    #[serde(default = "default_pellet_count")]
    pub count: usize,
    #[serde(default = "default_pellet_mass")]
    pub mass: f32,
}

impl Default for PelletConfig {
    fn default() -> Self {
        Self {
            count: default_pellet_count(),
            mass: default_pellet_mass(),
        }
    }
}

fn default_pellet_count() -> usize {
    1000
}
fn default_pellet_mass() -> f32 {
    100.0
}

/// Leftovers of disconnected players.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeadConfig {
    #[serde(default = "default_dead_lifetime")]
    pub lifetime_ms: u64,
}

impl Default for DeadConfig {
    fn default() -> Self {
        Self {
            lifetime_ms: default_dead_lifetime(),
        }
    }
}

fn default_dead_lifetime() -> u64 {
    15_000
}

/// Client viewport settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    /// Side of the square each player sees.
    #[serde(default = "default_view_size")]
    pub size: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            size: default_view_size(),
        }
    }
}

fn default_view_size() -> f32 {
    1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.rooms.len(), 1);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [world]
            size = 4000.0

            [player]
            speed_curve = { kind = "linear", min_radius = 10.0, max_radius = 200.0, max_factor = 1.0, min_factor = 0.2 }

            [eject]
            pickup = "exited"

            [[rooms]]
            name = "Tiny"
            region = "eu"
            port = 9100
            "#,
        )
        .unwrap();

        assert_eq!(config.world.size, 4000.0);
        assert_eq!(config.world.friction, default_friction());
        assert_eq!(config.eject.pickup, EjectPickup::Exited);
        assert!(matches!(config.player.speed_curve, SpeedCurve::Linear { .. }));
        assert_eq!(config.rooms[0].name, "Tiny");
        assert_eq!(config.rooms[0].tick_interval_ms, default_tick_interval());
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.player.speed_curve, SpeedCurve::default());
        assert_eq!(parsed.rooms[0].port, default_room_port());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.world.friction = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::Friction(1.5)));

        let mut config = Config::default();
        config.world.size = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::WorldSize(0.0)));

        let mut config = Config::default();
        config.rooms.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoRooms));

        let mut config = Config::default();
        config.rooms[0].tick_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::TickInterval(_))));
    }

    #[test]
    fn test_speed_decreases_with_radius() {
        let player = PlayerConfig::default();
        assert!(player.speed(20.0, 50) > player.speed(80.0, 50));
        assert!(player.speed(0.5, 50) <= player.speed_cap);

        let linear = SpeedCurve::Linear {
            min_radius: 10.0,
            max_radius: 110.0,
            max_factor: 1.0,
            min_factor: 0.5,
        };
        assert_eq!(linear.factor(5.0), 1.0);
        assert_eq!(linear.factor(60.0), 0.75);
        assert_eq!(linear.factor(500.0), 0.5);
    }
}
