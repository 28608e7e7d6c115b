//! Built environment

pub mod building;

pub use building::Building;
