//! Locality grid: occupants of every (region, district, x, y) cell

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::WorldConfig;
use crate::core::types::{Location, PersonId};

/// Radius up to which `nearby` scans only the surrounding square of cells
pub const SQUARE_SCAN_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: PersonId,
    pub elevation: f64,
}

/// Dense cell storage for the nested geography.
///
/// Cells are laid out region-major, then district, then x, then y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalityGrid {
    regions: u32,
    districts: u32,
    side: i32,
    cells: Vec<Vec<Occupant>>,
}

impl LocalityGrid {
    pub fn new(regions: u32, districts: u32, side: i32) -> Self {
        let side = side.max(1);
        let count = regions as usize * districts as usize * (side as usize).pow(2);
        Self {
            regions,
            districts,
            side,
            cells: vec![Vec::new(); count],
        }
    }

    pub fn from_config(world: &WorldConfig) -> Self {
        Self::new(world.regions, world.districts_per_region, world.grid_side)
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    #[inline]
    fn index(&self, region: u32, district: u32, x: i32, y: i32) -> Option<usize> {
        if region >= self.regions
            || district >= self.districts
            || !(0..self.side).contains(&x)
            || !(0..self.side).contains(&y)
        {
            return None;
        }
        let side = self.side as usize;
        let district_index = region as usize * self.districts as usize + district as usize;
        Some(district_index * side * side + x as usize * side + y as usize)
    }

    #[inline]
    fn index_of(&self, location: &Location) -> Option<usize> {
        self.index(location.region, location.district, location.cell_x, location.cell_y)
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.index_of(location).is_some()
    }

    /// Register an occupant; out-of-bounds locations are ignored
    pub fn insert(&mut self, id: PersonId, location: &Location) -> bool {
        let Some(index) = self.index_of(location) else {
            return false;
        };
        let cell = &mut self.cells[index];
        if !cell.iter().any(|o| o.id == id) {
            cell.push(Occupant {
                id,
                elevation: location.elevation,
            });
        }
        true
    }

    pub fn remove(&mut self, id: PersonId, location: &Location) -> bool {
        let Some(index) = self.index_of(location) else {
            return false;
        };
        let cell = &mut self.cells[index];
        let before = cell.len();
        cell.retain(|o| o.id != id);
        cell.len() != before
    }

    pub fn relocate(&mut self, id: PersonId, from: &Location, to: &Location) {
        self.remove(id, from);
        self.insert(id, to);
    }

    pub fn occupants(&self, location: &Location) -> &[Occupant] {
        match self.index_of(location) {
            Some(index) => &self.cells[index],
            None => &[],
        }
    }

    /// Occupant ids near `location`, in scan order.
    ///
    /// Up to `SQUARE_SCAN_RADIUS` the square of cells within `radius` on each
    /// axis is collected as-is. Beyond it the whole district is scanned and
    /// filtered by exact distance. Other districts are never visited.
    pub fn nearby(&self, location: &Location, radius: f64) -> Vec<PersonId> {
        let mut found = Vec::new();

        if radius <= SQUARE_SCAN_RADIUS {
            let reach = radius.max(0.0) as i32;
            for dx in -reach..=reach {
                for dy in -reach..=reach {
                    let x = location.cell_x + dx;
                    let y = location.cell_y + dy;
                    if let Some(index) = self.index(location.region, location.district, x, y) {
                        found.extend(self.cells[index].iter().map(|o| o.id));
                    }
                }
            }
            return found;
        }

        for x in 0..self.side {
            for y in 0..self.side {
                let Some(index) = self.index(location.region, location.district, x, y) else {
                    continue;
                };
                for occupant in &self.cells[index] {
                    let position = Location {
                        elevation: occupant.elevation,
                        ..Location::new(location.region, location.district, x, y)
                    };
                    if position.distance_to(location) <= radius {
                        found.push(occupant.id);
                    }
                }
            }
        }
        found
    }

    /// Uniformly random cell anywhere in the world
    pub fn random_location<R: Rng>(&self, rng: &mut R) -> Location {
        Location::new(
            rng.gen_range(0..self.regions.max(1)),
            rng.gen_range(0..self.districts.max(1)),
            rng.gen_range(0..self.side),
            rng.gen_range(0..self.side),
        )
    }

    /// Total registered occupants
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }
}
