//! Phase 4: cultural units appear, spread between neighbours and fade

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::{MemeId, PersonId};
use crate::culture::Meme;
use crate::simulation::world::World;

pub fn run_social(world: &mut World) {
    maybe_spawn_meme(world);

    let ids: Vec<MemeId> = world.memes.keys().copied().collect();
    for id in ids {
        spread_meme(world, id);
    }
}

fn maybe_spawn_meme(world: &mut World) {
    if world.rng.gen::<f64>() >= world.config.culture.spawn_chance {
        return;
    }

    let candidates: Vec<PersonId> = world.people.keys().copied().collect();
    let Some(&creator) = candidates.choose(&mut world.rng) else {
        return;
    };
    if !world.people.get(&creator).is_some_and(|p| p.alive) {
        return;
    }

    let id = world.next_meme_id();
    let meme = Meme::new(id, creator, world.day, &world.config.culture, &mut world.rng);
    tracing::info!(meme = %id, creator = %creator, "New meme appeared");
    world.memes.insert(id, meme);
}

fn spread_meme(world: &mut World, id: MemeId) {
    let World {
        memes,
        people,
        grid,
        config,
        rng,
        ..
    } = &mut *world;
    let culture = &config.culture;
    let Some(meme) = memes.get_mut(&id) else {
        return;
    };

    let carriers: Vec<PersonId> = meme
        .carriers
        .iter()
        .copied()
        .filter(|c| people.contains_key(c))
        .collect();

    for carrier in carriers {
        let location = match people.get(&carrier) {
            Some(p) if p.alive => p.location,
            _ => continue,
        };

        let targets = grid.nearby(&location, culture.spread_radius);
        for target in targets.into_iter().take(culture.spread_attempts) {
            if let Some(person) = people.get_mut(&target) {
                meme.spread(carrier, person, culture, rng);
            }
        }
    }

    meme.decay(culture, rng);
    meme.update_peak();

    if meme.is_extinct() {
        tracing::debug!(meme = %id, peak = meme.peak_carriers, "Meme died out");
        memes.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{years, Location};
    use crate::core::SimulationConfig;

    #[test]
    fn test_meme_reaches_cellmates_and_extinct_memes_are_pruned() {
        let mut config = SimulationConfig::default();
        config.world.initial_population = 0;
        config.culture.spread_base_rate = 1.0;
        config.culture.decay_rate = 0.0;
        let mut world = World::empty(config).unwrap();

        let a = world.create_person(years(30), 100.0);
        let b = world.create_person(years(30), 100.0);
        let here = Location::new(0, 0, 5, 5);
        world.move_person(a, here);
        world.move_person(b, here);

        let id = world.next_meme_id();
        let mut meme = Meme::new(id, a, 0, &world.config.culture, &mut world.rng);
        meme.transmissibility = 1.0;
        world.memes.insert(id, meme);

        run_social(&mut world);
        assert!(world.memes[&id].is_carrier(b));
        assert_eq!(world.memes[&id].peak_carriers, 2);

        if let Some(meme) = world.memes.get_mut(&id) {
            meme.carriers.clear();
        }
        run_social(&mut world);
        assert!(!world.memes.contains_key(&id));
    }
}
