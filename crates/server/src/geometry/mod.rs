//! 2D geometry primitives shared by the spatial index and the simulation.

mod shape;
mod vector;

pub use shape::{Circle, Rect, Shape};
pub use vector::VectorExt;
