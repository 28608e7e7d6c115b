//! Prime Society - a multi-generational socio-economic simulation
//!
//! Individuals learn prime numbers in order, companies combine what their
//! employees know into composite numbers, and a double-auction market prices
//! every number by its food value.

pub mod city;
pub mod core;
pub mod culture;
pub mod economy;
pub mod entity;
pub mod politics;
pub mod simulation;
pub mod spatial;

pub use crate::core::{Result, SimulationConfig, SocietyError};
pub use crate::simulation::{Simulation, World};
