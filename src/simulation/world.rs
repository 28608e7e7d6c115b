//! World - owner of every registry and the simulation random generator

use std::collections::BTreeMap;
use std::time::Instant;

use ahash::AHashSet;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::city::Building;
use crate::core::error::{Result, SocietyError};
use crate::core::types::{years, BuildingId, CompanyId, Day, Location, MemeId, PersonId};
use crate::core::SimulationConfig;
use crate::culture::Meme;
use crate::economy::valuation;
use crate::economy::{Company, Market};
use crate::entity::{Person, Traits};
use crate::politics::Governance;
use crate::simulation::stats::Statistics;
use crate::simulation::systems::{self, PhaseTimings};
use crate::spatial::LocalityGrid;

/// Next free id for every registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub next_person: u64,
    pub next_company: u64,
    pub next_building: u64,
    pub next_meme: u64,
}

/// The complete simulated society
///
/// Registries are keyed by numeric ids and iterated in id order. Entities
/// refer to one another only by id, so every cross-reference is checked
/// against the registry before use.
pub struct World {
    pub day: Day,
    pub config: SimulationConfig,
    pub people: BTreeMap<PersonId, Person>,
    pub companies: BTreeMap<CompanyId, Company>,
    pub buildings: BTreeMap<BuildingId, Building>,
    pub memes: BTreeMap<MemeId, Meme>,
    pub grid: LocalityGrid,
    pub market: Market,
    pub governance: Governance,
    pub stats: Statistics,
    /// Children of individuals no longer in the registry, kept for lineage queries
    pub departed_children: BTreeMap<PersonId, Vec<PersonId>>,
    /// Random number generator (deterministic)
    pub rng: ChaCha8Rng,
    pub(crate) counters: IdCounters,
}

impl World {
    /// A world with no inhabitants
    pub fn empty(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            day: 0,
            grid: LocalityGrid::from_config(&config.world),
            market: Market::new(config.economy.price_history_len),
            governance: Governance::new(&config.politics),
            rng: ChaCha8Rng::seed_from_u64(config.world.seed),
            people: BTreeMap::new(),
            companies: BTreeMap::new(),
            buildings: BTreeMap::new(),
            memes: BTreeMap::new(),
            stats: Statistics::default(),
            departed_children: BTreeMap::new(),
            counters: IdCounters::default(),
            config,
        })
    }

    /// A world with its initial population
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut world = Self::empty(config)?;
        world.initialize_population();
        Ok(world)
    }

    fn initialize_population(&mut self) {
        let count = self.config.world.initial_population;
        let max_age = years(self.config.life.initial_max_age_years);

        for _ in 0..count {
            let age = self.rng.gen_range(0..=max_age);
            let resources = self.rng.gen_range(50.0..500.0);
            let id = self.create_person(age, resources);

            if age > years(16) {
                let max_prime = 7.min(2 + age / years(10));
                let primes = valuation::primes_up_to(max_prime);
                let known = self.rng.gen_range(1..=primes.len());
                if let Some(person) = self.people.get_mut(&id) {
                    person.learn_prime_prefix(&primes, known);
                }
            }
        }

        tracing::info!(population = count, "Initialized population");
    }

    // === IDS ===

    pub fn next_person_id(&mut self) -> PersonId {
        self.counters.next_person += 1;
        PersonId(self.counters.next_person)
    }

    pub fn next_company_id(&mut self) -> CompanyId {
        self.counters.next_company += 1;
        CompanyId(self.counters.next_company)
    }

    pub fn next_building_id(&mut self) -> BuildingId {
        self.counters.next_building += 1;
        BuildingId(self.counters.next_building)
    }

    pub fn next_meme_id(&mut self) -> MemeId {
        self.counters.next_meme += 1;
        MemeId(self.counters.next_meme)
    }

    // === PEOPLE ===

    /// Create an individual with random traits at a random location
    pub fn create_person(&mut self, age: Day, resources: f64) -> PersonId {
        let id = self.next_person_id();
        let traits = Traits::random(&mut self.rng);
        let location = self.grid.random_location(&mut self.rng);

        let mut person = Person::new(id, traits, location, &self.config, &mut self.rng);
        person.age = age;
        person.birth_day = self.day;
        person.resources = resources;
        self.add_person(person);
        id
    }

    /// Register an individual and index their location
    pub fn add_person(&mut self, person: Person) {
        self.grid.insert(person.id, &person.location);
        self.people.insert(person.id, person);
    }

    /// Remove an individual from every registry and index
    pub fn remove_person(&mut self, id: PersonId) -> Option<Person> {
        let person = self.people.remove(&id)?;

        self.grid.remove(id, &person.location);

        if let Some(company_id) = person.employer {
            if let Some(company) = self.companies.get_mut(&company_id) {
                company.remove_employee(id, &self.people);
            }
        }

        for meme in self.memes.values_mut() {
            meme.forget(id);
        }

        if let Some(building) = person.home.and_then(|b| self.buildings.get_mut(&b)) {
            building.remove_resident(id, person.rented_space);
        }

        if !person.family.children.is_empty() {
            self.departed_children
                .insert(id, person.family.children.clone());
        }

        Some(person)
    }

    /// Move an individual, keeping the locality grid in sync
    pub fn move_person(&mut self, id: PersonId, to: Location) {
        if let Some(person) = self.people.get_mut(&id) {
            self.grid.relocate(id, &person.location, &to);
            person.location = to;
        }
    }

    pub fn population(&self) -> usize {
        self.people.len()
    }

    pub fn living(&self) -> impl Iterator<Item = &Person> {
        self.people.values().filter(|p| p.alive)
    }

    /// Ids and traits of up to `limit` individuals near `location`
    pub fn neighbours_of(
        &self,
        location: &Location,
        radius: f64,
        limit: usize,
    ) -> Vec<(PersonId, Traits)> {
        self.grid
            .nearby(location, radius)
            .into_iter()
            .take(limit)
            .filter_map(|id| self.people.get(&id).map(|p| (id, p.traits)))
            .collect()
    }

    // === EMPLOYMENT ===

    /// Employ a person, releasing them from any previous employer first
    pub fn hire(&mut self, company_id: CompanyId, person_id: PersonId, salary: f64) -> bool {
        if !self.companies.contains_key(&company_id) {
            return false;
        }
        let previous = match self.people.get(&person_id) {
            Some(person) => person.employer,
            None => return false,
        };
        if let Some(previous) = previous {
            self.fire(previous, person_id);
        }

        match (
            self.companies.get_mut(&company_id),
            self.people.get_mut(&person_id),
        ) {
            (Some(company), Some(person)) => {
                company.add_employee(person, salary);
                true
            }
            _ => false,
        }
    }

    /// Release an employee and clear their back-reference
    pub fn fire(&mut self, company_id: CompanyId, person_id: PersonId) -> bool {
        let Some(company) = self.companies.get_mut(&company_id) else {
            return false;
        };
        let removed = company.remove_employee(person_id, &self.people);

        if let Some(person) = self.people.get_mut(&person_id) {
            if person.employer == Some(company_id) {
                person.employer = None;
                person.salary = 0.0;
            }
        }
        removed
    }

    /// Found a company with half the founder's resources.
    ///
    /// The founder becomes its first employee at no salary.
    pub fn found_company(&mut self, founder: PersonId) -> Option<CompanyId> {
        let person = self.people.get_mut(&founder)?;
        let capital = person.resources * 0.5;
        person.resources -= capital;

        let id = self.next_company_id();
        self.companies
            .insert(id, Company::new(id, founder, capital, self.day));
        self.hire(id, founder, 0.0);
        self.stats.companies_founded += 1;

        tracing::info!(day = self.day, company = %id, founder = %founder, capital, "Company founded");
        Some(id)
    }

    /// Remove a company after releasing all of its employees
    pub fn dissolve_company(&mut self, id: CompanyId) -> Option<Company> {
        let mut company = self.companies.remove(&id)?;
        if !company.employees.is_empty() || company.capital != 0.0 {
            company.bankruptcy(&mut self.people);
        }
        self.stats.companies_failed += 1;
        Some(company)
    }

    // === FAMILY ===

    /// Partner for a birth today, if the individual reproduces.
    ///
    /// Only the individual's own strongest relationship is considered.
    pub fn check_reproduction(&mut self, id: PersonId) -> Option<PersonId> {
        let life = &self.config.life;
        let partner_id = self.people.get(&id)?.reproduction_partner(life)?;
        let partner = self.people.get(&partner_id)?;
        if !partner.alive || partner.resources <= life.child_cost / 2.0 {
            return None;
        }

        if self.rng.gen::<f64>() < life.reproduction_chance {
            Some(partner_id)
        } else {
            None
        }
    }

    /// Create a child of two parents at the first parent's location
    pub fn birth(&mut self, parent_id: PersonId, partner_id: PersonId) -> Option<PersonId> {
        let parent = self.people.get(&parent_id)?;
        let partner = self.people.get(&partner_id)?;
        let location = parent.location;

        let traits = Traits::inherit(
            &parent.traits,
            &partner.traits,
            self.config.life.trait_inheritance_variance,
            &mut self.rng,
        );

        let id = self.next_person_id();
        let mut child = Person::new(id, traits, location, &self.config, &mut self.rng);
        child.birth_day = self.day;
        child.family.parents = vec![parent_id, partner_id];

        let share = self.config.life.child_cost / 2.0;
        for parent in [parent_id, partner_id] {
            if let Some(p) = self.people.get_mut(&parent) {
                p.resources -= share;
                p.family.children.push(id);
            }
        }

        self.add_person(child);
        self.stats.births += 1;
        tracing::debug!(day = self.day, child = %id, parent = %parent_id, partner = %partner_id, "Birth");
        Some(id)
    }

    /// Every descendant currently in the registry, each listed once
    pub fn descendants(&self, id: PersonId) -> Vec<PersonId> {
        let mut visited: AHashSet<PersonId> = AHashSet::new();
        visited.insert(id);
        let mut frontier = self.children_of(id);
        let mut found = Vec::new();

        while let Some(next) = frontier.pop() {
            if !visited.insert(next) {
                continue;
            }
            if self.people.contains_key(&next) {
                found.push(next);
            }
            frontier.extend(self.children_of(next));
        }

        found.sort();
        found
    }

    fn children_of(&self, id: PersonId) -> Vec<PersonId> {
        match self.people.get(&id) {
            Some(person) => person.family.children.clone(),
            None => self
                .departed_children
                .get(&id)
                .cloned()
                .unwrap_or_default(),
        }
    }

    // === DAY ===

    /// Advance one day through every phase, in order
    pub fn simulate_day(&mut self) -> PhaseTimings {
        self.day += 1;
        let span = tracing::info_span!("day", day = self.day);
        let _guard = span.enter();

        let mut timings = PhaseTimings::default();

        let start = Instant::now();
        systems::run_individuals(self);
        timings.individual = start.elapsed();

        let start = Instant::now();
        systems::run_labor(self);
        timings.labor = start.elapsed();

        let start = Instant::now();
        systems::run_market(self);
        timings.market = start.elapsed();

        let start = Instant::now();
        systems::run_social(self);
        timings.social = start.elapsed();

        let start = Instant::now();
        systems::run_maintenance(self);
        timings.maintenance = start.elapsed();

        let start = Instant::now();
        systems::collect_statistics(self);
        systems::stabilize(self);
        timings.statistics = start.elapsed();

        timings.days = 1;
        tracing::debug!(population = self.people.len(), "Day complete");
        timings
    }

    /// Verify cross-registry consistency
    pub fn check_invariants(&self) -> Result<()> {
        let violation = |detail: String| {
            Err(SocietyError::InvariantViolation {
                day: self.day,
                detail,
            })
        };

        for person in self.people.values() {
            if !person.knowledge_is_sequential() {
                return violation(format!("{} knows primes out of order", person.id));
            }
            if !(0.0..=100.0).contains(&person.happiness)
                || !(0.0..=100.0).contains(&person.health)
                || !(0.0..=self.config.needs.max_nutrition).contains(&person.nutrition_level)
            {
                return violation(format!("{} has state outside its range", person.id));
            }
            if let Some(company_id) = person.employer {
                match self.companies.get(&company_id) {
                    Some(company) if company.employs(person.id) => {}
                    _ => {
                        return violation(format!(
                            "{} claims employer {} which does not list them",
                            person.id, company_id
                        ))
                    }
                }
            }
        }

        for company in self.companies.values() {
            for employee in &company.employees {
                match self.people.get(employee) {
                    Some(p) if p.employer == Some(company.id) => {}
                    _ => {
                        return violation(format!(
                            "{} lists {} who does not work there",
                            company.id, employee
                        ))
                    }
                }
            }
        }

        let crossed = self.market.crossed_books();
        if !crossed.is_empty() {
            return violation(format!("crossed order books for {:?}", crossed));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(population: usize) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.initial_population = population;
        config
    }

    #[test]
    fn test_initial_population_is_indexed() {
        let world = World::new(small_config(50)).unwrap();
        assert_eq!(world.population(), 50);
        assert_eq!(world.grid.len(), 50);
        assert!(world.people.values().all(|p| p.knowledge_is_sequential()));
        assert!(world.check_invariants().is_ok());
    }

    #[test]
    fn test_hire_moves_employee_between_companies() {
        let mut world = World::empty(small_config(0)).unwrap();
        let a = world.create_person(years(30), 5000.0);
        let b = world.create_person(years(30), 100.0);

        let first = world.found_company(a).unwrap();
        assert_eq!(world.people[&a].resources, 2500.0);
        assert!(world.hire(first, b, 10.0));

        let c = world.create_person(years(30), 5000.0);
        let second = world.found_company(c).unwrap();
        assert!(world.hire(second, b, 20.0));

        assert!(!world.companies[&first].employs(b));
        assert!(world.companies[&second].employs(b));
        assert_eq!(world.people[&b].employer, Some(second));
        assert!(world.check_invariants().is_ok());
    }

    #[test]
    fn test_remove_person_clears_references() {
        let mut world = World::empty(small_config(0)).unwrap();
        let founder = world.create_person(years(30), 5000.0);
        let company = world.found_company(founder).unwrap();

        let removed = world.remove_person(founder).unwrap();
        assert_eq!(removed.id, founder);
        assert!(world.companies[&company].employees.is_empty());
        assert!(world.grid.is_empty());
        assert!(world.check_invariants().is_ok());
    }

    #[test]
    fn test_birth_links_family_and_charges_parents() {
        let mut world = World::empty(small_config(0)).unwrap();
        let a = world.create_person(years(30), 100_000.0);
        let b = world.create_person(years(30), 100_000.0);

        let child = world.birth(a, b).unwrap();
        assert_eq!(world.people[&child].family.parents, vec![a, b]);
        assert_eq!(world.people[&a].family.children, vec![child]);
        assert_eq!(world.people[&b].resources, 100_000.0 - 32_850.0);
        assert_eq!(world.people[&child].location, world.people[&a].location);
        assert_eq!(world.stats.births, 1);
    }

    #[test]
    fn test_descendants_survive_departed_ancestors() {
        let mut world = World::empty(small_config(0)).unwrap();
        let a = world.create_person(years(40), 200_000.0);
        let b = world.create_person(years(40), 200_000.0);
        let child = world.birth(a, b).unwrap();
        let c = world.create_person(years(20), 200_000.0);
        let grandchild = world.birth(child, c).unwrap();

        assert_eq!(world.descendants(a), vec![child, grandchild]);

        world.remove_person(child);
        assert_eq!(world.descendants(a), vec![grandchild]);
        assert!(world.descendants(grandchild).is_empty());
    }

    #[test]
    fn test_dangling_employer_is_a_violation() {
        let mut world = World::empty(small_config(0)).unwrap();
        let id = world.create_person(years(30), 100.0);
        if let Some(person) = world.people.get_mut(&id) {
            person.employer = Some(CompanyId(99));
        }
        assert!(matches!(
            world.check_invariants(),
            Err(SocietyError::InvariantViolation { .. })
        ));
    }
}
