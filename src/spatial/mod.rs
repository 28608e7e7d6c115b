//! Spatial indexing of individuals

pub mod grid;

pub use grid::{LocalityGrid, Occupant};
