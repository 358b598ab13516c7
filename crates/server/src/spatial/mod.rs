//! Spatial indexing utilities.

mod quadtree;

pub use quadtree::{QuadItem, QuadTree};
