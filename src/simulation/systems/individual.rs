//! Phase 1: individual routines, births and the purge of the dead

use rand::seq::SliceRandom;

use crate::core::types::PersonId;
use crate::simulation::world::World;

/// Run every living individual's day in random order
pub fn run_individuals(world: &mut World) {
    let mut order: Vec<PersonId> = world.people.keys().copied().collect();
    order.shuffle(&mut world.rng);

    let radius = world.config.life.relationship_radius;
    let contacts = world.config.life.max_social_contacts;

    for id in order {
        let location = match world.people.get(&id) {
            Some(person) if person.alive => person.location,
            _ => continue,
        };
        let neighbours = world.neighbours_of(&location, radius, contacts);

        let World {
            people, config, rng, ..
        } = &mut *world;
        let Some(person) = people.get_mut(&id) else {
            continue;
        };
        let outcome = person.daily_routine(&neighbours, config, rng);
        if outcome.died {
            continue;
        }

        if let Some(partner) = world.check_reproduction(id) {
            world.birth(id, partner);
        }
    }

    purge_dead(world);
}

/// Remove dead individuals from every registry
fn purge_dead(world: &mut World) {
    let dead: Vec<PersonId> = world
        .people
        .values()
        .filter(|p| !p.alive)
        .map(|p| p.id)
        .collect();

    for id in dead {
        if let Some(person) = world.remove_person(id) {
            world.stats.deaths += 1;
            tracing::debug!(person = %id, age_days = person.age, "Death");
        }
    }
}
