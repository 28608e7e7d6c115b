//! End-of-day statistics

use crate::simulation::stats::{gini, mean};
use crate::simulation::world::World;

/// Append one entry to every statistics series.
///
/// Means over an empty population are recorded as 0.
pub fn collect_statistics(world: &mut World) {
    let population = world.people.len();
    let gdp = world.market.calculate_gdp();

    let resources: Vec<f64> = world.living().map(|p| p.resources).collect();
    let inequality = gini(&resources);
    let happiness = mean(world.living().map(|p| p.happiness));
    let knowledge = mean(world.living().map(|p| p.known.len() as f64));
    let carriers: usize = world.memes.values().map(|m| m.carriers.len()).sum();

    let stats = &mut world.stats;
    stats.population.push(population);
    stats.gdp.push(gdp);
    stats.gini.push(inequality);
    stats.happiness.push(happiness);
    stats.knowledge.push(knowledge);
    stats.innovation.push(stats.discoveries.len());
    stats.meme_spread.push(carriers);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SimulationConfig;

    #[test]
    fn test_empty_world_records_zeros() {
        let mut config = SimulationConfig::default();
        config.world.initial_population = 0;
        let mut world = World::empty(config).unwrap();

        collect_statistics(&mut world);

        assert_eq!(world.stats.population, vec![0]);
        assert_eq!(world.stats.happiness, vec![0.0]);
        assert_eq!(world.stats.knowledge, vec![0.0]);
        assert_eq!(world.stats.gini, vec![0.0]);
    }
}
