//! Governance and elections

pub mod election;

pub use election::{GeoLevel, Governance, Policies};
