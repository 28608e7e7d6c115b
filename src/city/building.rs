//! Structures: owned space that individuals can live in

use serde::{Deserialize, Serialize};

use crate::core::config::ConstructionConfig;
use crate::core::types::{years, BuildingId, Day, Location, PersonId};
use crate::entity::Person;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub location: Location,
    pub total_space: f64,
    pub used_space: f64,
    /// Within [0.5, 1.0]
    pub quality: f64,
    pub build_day: Day,
    pub owner: Option<PersonId>,
    pub residents: Vec<PersonId>,
}

impl Building {
    pub fn new(
        id: BuildingId,
        location: Location,
        total_space: f64,
        quality: f64,
        build_day: Day,
        owner: Option<PersonId>,
    ) -> Self {
        Self {
            id,
            location,
            total_space,
            used_space: 0.0,
            quality,
            build_day,
            owner,
            residents: Vec::new(),
        }
    }

    /// Multiplier falling linearly with age, bounded below by the floor
    pub fn age_decay(&self, today: Day, config: &ConstructionConfig) -> f64 {
        let age = today.saturating_sub(self.build_day) as f64;
        let horizon = years(config.decay_horizon_years.max(1)) as f64;
        (1.0 - age / horizon).max(config.decay_floor)
    }

    /// Market value of the structure on `today`
    pub fn value(&self, today: Day, config: &ConstructionConfig) -> f64 {
        self.total_space * config.unit_value * self.quality * self.age_decay(today, config)
    }

    pub fn free_space(&self) -> f64 {
        (self.total_space - self.used_space).max(0.0)
    }

    pub fn has_resident(&self, id: PersonId) -> bool {
        self.residents.contains(&id)
    }

    /// Move a person in; their location becomes the structure's.
    ///
    /// The caller keeps the locality grid in sync.
    pub fn add_resident(&mut self, person: &mut Person) -> bool {
        if self.has_resident(person.id) {
            return false;
        }
        self.residents.push(person.id);
        self.used_space += person.rented_space;
        person.location = self.location;
        person.home = Some(self.id);
        true
    }

    pub fn remove_resident(&mut self, id: PersonId, rented_space: f64) -> bool {
        if !self.has_resident(id) {
            return false;
        }
        self.residents.retain(|&r| r != id);
        self.used_space = (self.used_space - rented_space).max(0.0);
        true
    }
}
