//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulated day counter (the simulation's only time unit)
pub type Day = u64;

/// Days in a simulated year
pub const DAYS_PER_YEAR: u64 = 365;

/// Convert whole years to days
pub const fn years(n: u64) -> u64 {
    n * DAYS_PER_YEAR
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for individuals
    PersonId,
    "person"
);
numeric_id!(
    /// Unique identifier for companies
    CompanyId,
    "company"
);
numeric_id!(
    /// Unique identifier for structures
    BuildingId,
    "building"
);
numeric_id!(
    /// Unique identifier for cultural units
    MemeId,
    "meme"
);

/// Distance reported between two points in different districts of one region
pub const DISTRICT_FAR: f64 = 100.0;

/// Distance reported between two points in different regions
pub const REGION_FAR: f64 = 1000.0;

/// Position in the nested world geography
///
/// Region and district are coarse containers; inside a district positions are
/// a small square grid of cells plus a continuous elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub region: u32,
    pub district: u32,
    pub cell_x: i32,
    pub cell_y: i32,
    pub elevation: f64,
}

impl Location {
    pub fn new(region: u32, district: u32, cell_x: i32, cell_y: i32) -> Self {
        Self {
            region,
            district,
            cell_x,
            cell_y,
            elevation: 0.0,
        }
    }

    /// Distance to another location.
    ///
    /// Only positions inside the same district get a Euclidean distance;
    /// anything further away collapses to the fixed far sentinels.
    pub fn distance_to(&self, other: &Location) -> f64 {
        if self.region != other.region {
            return REGION_FAR;
        }
        if self.district != other.district {
            return DISTRICT_FAR;
        }

        let dx = f64::from(self.cell_x - other.cell_x);
        let dy = f64::from(self.cell_y - other.cell_y);
        let dz = self.elevation - other.elevation;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// True when both positions share region and district
    pub fn same_district(&self, other: &Location) -> bool {
        self.region == other.region && self.district == other.district
    }
}
