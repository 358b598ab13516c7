//! Cell arena simulation core and room runtime.

pub mod config;
pub mod controller;
pub mod entity;
pub mod geometry;
pub mod physics;
pub mod server;
pub mod spatial;
pub mod world;

// Re-export commonly used types
pub use config::{Config, WorldSettings};
pub use server::{GameRoom, run};
pub use world::{World, WorldAction};
