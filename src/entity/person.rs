//! Individuals and their daily state machine

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{LifeConfig, SimulationConfig};
use crate::core::types::{years, BuildingId, CompanyId, Day, Location, PersonId};
use crate::economy::valuation;
use crate::entity::traits::{TraitAxis, Traits};

pub const RELATIONSHIP_MIN: f64 = -100.0;
pub const RELATIONSHIP_MAX: f64 = 100.0;

const MAX_ENERGY: f64 = 100.0;
const STUDY_ENERGY: f64 = 20.0;
const SOCIAL_MIN_ENERGY: f64 = 10.0;
const SOCIAL_ENERGY_COST: f64 = 2.0;
const WORK_ENERGY: f64 = 40.0;

/// Links to relatives, stored as ids to keep the family graph acyclic in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyLinks {
    pub parents: Vec<PersonId>,
    pub children: Vec<PersonId>,
}

/// What happened to an individual during one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyOutcome {
    pub died: bool,
    /// Prime unlocked by today's study, if any
    pub learned: Option<u64>,
}

/// A single simulated individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    /// Age in days
    pub age: Day,
    pub birth_day: Day,
    pub alive: bool,

    pub traits: Traits,
    /// Fixed at birth, within [0, 200]
    pub intelligence: f64,

    /// Known commodity numbers, always a prefix of the primes
    pub known: BTreeSet<u64>,
    /// Study progress toward the next prime
    pub learning_progress: BTreeMap<u64, f64>,

    pub resources: f64,
    /// Within [0, needs.max_nutrition]
    pub nutrition_level: f64,
    pub energy: f64,
    pub stress: f64,
    pub happiness: f64,
    pub health: f64,

    /// Strength in [-100, 100] per acquaintance
    pub relationships: BTreeMap<PersonId, f64>,
    pub family: FamilyLinks,
    /// Non-owning reference into the company registry
    pub employer: Option<CompanyId>,
    pub salary: f64,

    pub location: Location,
    pub home: Option<BuildingId>,
    pub owned_space: f64,
    pub rented_space: f64,
}

impl Person {
    pub fn new<R: Rng>(
        id: PersonId,
        traits: Traits,
        location: Location,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let intelligence = (50.0
            - 0.3 * traits.get(TraitAxis::InventiveImitative)
            - 0.2 * traits.get(TraitAxis::ReflectiveImpulsive)
            + rng.gen_range(-10.0..=10.0))
        .clamp(0.0, 200.0);

        Self {
            id,
            age: 0,
            birth_day: 0,
            alive: true,
            traits,
            intelligence,
            known: BTreeSet::from([2]),
            learning_progress: BTreeMap::new(),
            resources: config.life.starting_resources,
            nutrition_level: 1.0,
            energy: MAX_ENERGY,
            stress: 0.0,
            happiness: 50.0,
            health: 100.0,
            relationships: BTreeMap::new(),
            family: FamilyLinks::default(),
            employer: None,
            salary: 0.0,
            location,
            home: None,
            owned_space: 0.0,
            rented_space: config.life.default_rented_space,
        }
    }

    /// Charisma from current traits and wellbeing, within [0, 100]
    pub fn charisma(&self) -> f64 {
        (50.0 - 0.3 * self.traits.get(TraitAxis::DiplomaticAggressive)
            - 0.2 * self.traits.get(TraitAxis::SocialPragmatic)
            + 0.1 * self.happiness
            + 0.1 * self.health)
            .clamp(0.0, 100.0)
    }

    pub fn ambition(&self) -> f64 {
        self.traits.get(TraitAxis::HumbleAmbitious)
    }

    pub fn is_starving(&self, config: &SimulationConfig) -> bool {
        self.nutrition_level < config.needs.starvation_threshold
    }

    /// Replace known commodities with the first `count` primes
    pub fn learn_prime_prefix(&mut self, primes: &[u64], count: usize) {
        self.known = primes.iter().take(count).copied().collect();
        self.learning_progress.clear();
    }

    /// Run one simulated day.
    ///
    /// `neighbours` is the raw locality query around this individual (it may
    /// include the individual itself) with each neighbour's current traits.
    pub fn daily_routine<R: Rng>(
        &mut self,
        neighbours: &[(PersonId, Traits)],
        config: &SimulationConfig,
        rng: &mut R,
    ) -> DailyOutcome {
        let mut outcome = DailyOutcome::default();
        if !self.alive {
            return outcome;
        }

        self.age_up(&config.life, rng);
        if !self.alive {
            outcome.died = true;
            return outcome;
        }

        self.energy = (MAX_ENERGY - (self.age as f64 / years(100) as f64) * 20.0).clamp(0.0, MAX_ENERGY);

        self.consume_nutrition(config);

        if self.employer.is_some() && self.age >= config.life.working_age() {
            self.work();
        }

        self.socialize(neighbours, &config.life);

        let young = self.age < years(config.life.study_age_limit_years);
        if self.energy > STUDY_ENERGY
            && (young || self.ambition() > config.life.study_ambition_threshold)
        {
            outcome.learned = self.study();
        }

        self.update_happiness();
        outcome
    }

    fn age_up<R: Rng>(&mut self, life: &LifeConfig, rng: &mut R) {
        self.age += 1;

        if self.age > years(life.health_decay_age_years) {
            self.health -= life.health_decay_rate;
        }
        if self.age > years(life.elder_decay_age_years) {
            self.health -= life.elder_decay_rate;
        }
        self.health = self.health.clamp(0.0, 100.0);

        let expectancy = years(life.base_life_expectancy_years) as f64;
        let ramp = years(life.mortality_ramp_years.max(1)) as f64;
        let death_probability = ((self.age as f64 - expectancy) / ramp).max(0.0);

        if self.health <= 0.0 || rng.gen::<f64>() < death_probability {
            self.alive = false;
        }
    }

    fn consume_nutrition(&mut self, config: &SimulationConfig) {
        let needs = &config.needs;
        let remaining = self.nutrition_level - needs.nutrition_requirement;
        if remaining < needs.starvation_threshold {
            self.health = (self.health - needs.starvation_health_loss).clamp(0.0, 100.0);
            self.stress = (self.stress + needs.starvation_stress).clamp(0.0, 100.0);
        }
        self.nutrition_level = remaining.clamp(0.0, needs.max_nutrition);
    }

    /// Absorb nutrition from food, clamped to the nutrition domain
    pub fn eat(&mut self, amount: f64, config: &SimulationConfig) {
        self.nutrition_level = (self.nutrition_level + amount).clamp(0.0, config.needs.max_nutrition);
    }

    fn work(&mut self) {
        let spent = WORK_ENERGY.min(self.energy);
        self.energy -= spent;
        self.resources += self.salary;
        self.stress = (self.stress + 5.0 * (1.0 + self.ambition() / 100.0)).clamp(0.0, 100.0);
    }

    fn socialize(&mut self, neighbours: &[(PersonId, Traits)], life: &LifeConfig) {
        if self.energy < SOCIAL_MIN_ENERGY {
            return;
        }

        for (other_id, other_traits) in neighbours.iter().take(life.max_social_contacts) {
            if *other_id == self.id {
                continue;
            }

            let compatibility = self.traits.compatibility(other_traits);
            let strength = self.relationships.entry(*other_id).or_insert(0.0);
            *strength = (*strength + compatibility * 0.1).clamp(RELATIONSHIP_MIN, RELATIONSHIP_MAX);

            self.energy -= SOCIAL_ENERGY_COST;
            if self.energy <= 0.0 {
                break;
            }
        }
        self.energy = self.energy.max(0.0);
    }

    /// Work toward the next prime in strict ascending order.
    ///
    /// Returns the prime if it was unlocked today.
    fn study(&mut self) -> Option<u64> {
        if self.energy < STUDY_ENERGY {
            return None;
        }
        self.energy -= STUDY_ENERGY;

        let max_known = self.known.iter().next_back().copied().unwrap_or(1);
        let next = valuation::next_prime_after(max_known);

        let prerequisites_met = valuation::primes_up_to(next - 1)
            .iter()
            .all(|p| self.known.contains(p));
        if !prerequisites_met {
            return None;
        }

        let progress = self.learning_progress.entry(next).or_insert(0.0);
        *progress += (self.intelligence / 100.0) * 10.0;

        let rank = valuation::prime_rank(next) as f64;
        if *progress >= rank * rank {
            self.learning_progress.remove(&next);
            self.known.insert(next);
            tracing::debug!(person = %self.id, prime = next, "Learned prime");
            return Some(next);
        }
        None
    }

    fn update_happiness(&mut self) {
        let relationship_quality = if self.relationships.is_empty() {
            0.0
        } else {
            self.relationships.values().sum::<f64>() / self.relationships.len() as f64
        };

        let happiness = 50.0
            + self.nutrition_level * 20.0
            + self.health * 0.2
            - self.stress * 0.3
            + relationship_quality * 0.2
            + (self.resources / 100.0).min(20.0);
        self.happiness = happiness.clamp(0.0, 100.0);
    }

    /// True if age lies inside the fertile window
    pub fn within_reproduction_window(&self, life: &LifeConfig) -> bool {
        self.age >= life.min_reproduction_age() && self.age <= life.max_reproduction_age()
    }

    /// The single strongest relationship, if any
    pub fn strongest_relationship(&self) -> Option<(PersonId, f64)> {
        self.relationships
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&id, &strength)| (id, strength))
    }

    /// Partner this individual would reproduce with, ignoring chance.
    ///
    /// Only the strongest relationship is considered, and only this
    /// individual's age and resources are checked here.
    pub fn reproduction_partner(&self, life: &LifeConfig) -> Option<PersonId> {
        if !self.alive || !self.within_reproduction_window(life) {
            return None;
        }
        if self.resources < life.child_cost {
            return None;
        }
        match self.strongest_relationship() {
            Some((partner, strength)) if strength > life.partner_threshold => Some(partner),
            _ => None,
        }
    }

    /// True when known commodities are exactly the first `n` primes
    pub fn knowledge_is_sequential(&self) -> bool {
        let mut expected = 2;
        for &p in &self.known {
            if p != expected {
                return false;
            }
            expected = valuation::next_prime_after(p);
        }
        true
    }
}
