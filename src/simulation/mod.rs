//! The world orchestrator and its daily phases

pub mod runner;
pub mod snapshot;
pub mod stats;
pub mod systems;
pub mod world;

pub use runner::{RunSummary, Simulation, StopReason};
pub use snapshot::{SnapshotStore, WorldSnapshot, SNAPSHOT_VERSION};
pub use stats::{gini, Statistics, Summary};
pub use systems::PhaseTimings;
pub use world::World;
