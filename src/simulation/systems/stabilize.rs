//! Heuristics that keep long runs from collapsing

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::{years, PersonId};
use crate::simulation::world::World;

/// Commodities every immigrant already knows
const IMMIGRANT_KNOWLEDGE: [u64; 3] = [2, 3, 5];

/// Interventions applied at the end of one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilizationReport {
    pub immigrants: usize,
    pub injected: usize,
    pub fed: usize,
}

pub fn stabilize(world: &mut World) -> StabilizationReport {
    let mut report = StabilizationReport::default();
    let rules = world.config.stabilization.clone();
    let population = world.people.len();

    let floor = world.config.world.initial_population as f64 * rules.population_floor_fraction;
    if (population as f64) < floor {
        tracing::warn!(population, "Population critically low, admitting immigrants");
        for _ in 0..rules.immigrant_count {
            let age = world.rng.gen_range(years(20)..=years(40));
            let resources = world.rng.gen_range(100.0..500.0);
            let id = world.create_person(age, resources);
            if let Some(person) = world.people.get_mut(&id) {
                person.known = IMMIGRANT_KNOWLEDGE.into_iter().collect();
            }
            report.immigrants += 1;
        }
    }

    if world.stats.latest_gdp().is_some_and(|gdp| gdp < rules.gdp_floor) {
        tracing::warn!("Economic collapse detected, injecting resources");
        let ids: Vec<PersonId> = world.people.keys().copied().collect();
        let sample: Vec<PersonId> = ids
            .choose_multiple(&mut world.rng, rules.injection_sample.min(ids.len()))
            .copied()
            .collect();
        for id in sample {
            if let Some(person) = world.people.get_mut(&id) {
                person.resources += rules.injection_amount;
                report.injected += 1;
            }
        }
    }

    let threshold = world.config.needs.starvation_threshold;
    let starving: Vec<PersonId> = world
        .living()
        .filter(|p| p.nutrition_level < threshold)
        .map(|p| p.id)
        .collect();
    if starving.len() as f64 > population as f64 * rules.starvation_fraction {
        tracing::warn!(starving = starving.len(), "Mass starvation, distributing emergency food");
        for id in starving {
            if let Some(person) = world.people.get_mut(&id) {
                person.nutrition_level = 1.0;
                report.fed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SimulationConfig;

    fn world(initial: usize) -> World {
        let mut config = SimulationConfig::default();
        config.world.initial_population = initial;
        World::empty(config).unwrap()
    }

    #[test]
    fn test_collapse_brings_immigrants() {
        let mut w = world(1000);
        let report = stabilize(&mut w);

        assert_eq!(report.immigrants, 50);
        assert_eq!(w.population(), 50);
        for person in w.people.values() {
            assert!(person.age >= years(20) && person.age <= years(40));
            assert!((100.0..500.0).contains(&person.resources));
            assert_eq!(person.known.len(), 3);
        }
    }

    #[test]
    fn test_low_gdp_injects_resources() {
        let mut w = world(0);
        for _ in 0..10 {
            w.create_person(years(30), 0.0);
        }
        w.stats.gdp.push(0.0);

        let report = stabilize(&mut w);
        assert_eq!(report.injected, 10);
        assert!(w.people.values().all(|p| p.resources == 100.0));
    }

    #[test]
    fn test_mass_starvation_resets_nutrition() {
        let mut w = world(0);
        for _ in 0..10 {
            w.create_person(years(30), 100.0);
        }
        for p in w.people.values_mut().take(4) {
            p.nutrition_level = 0.0;
        }

        let report = stabilize(&mut w);
        assert_eq!(report.fed, 4);
        assert!(w.people.values().all(|p| p.nutrition_level == 1.0));
    }

    #[test]
    fn test_healthy_world_untouched() {
        let mut w = world(0);
        for _ in 0..10 {
            w.create_person(years(30), 100.0);
        }
        w.stats.gdp.push(1_000.0);
        assert_eq!(stabilize(&mut w), StabilizationReport::default());
    }
}
