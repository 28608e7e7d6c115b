//! Phase 5: elections, construction, bankruptcies and discovery tracking

use rand::seq::SliceRandom;
use rand::Rng;

use crate::city::Building;
use crate::core::types::{CompanyId, PersonId};
use crate::simulation::world::World;

pub fn run_maintenance(world: &mut World) {
    let World {
        governance,
        people,
        config,
        rng,
        day,
        ..
    } = &mut *world;
    governance.tick(*day, people, &config.politics, rng);

    maybe_construct(world);
    sweep_bankruptcies(world);
    track_discoveries(world);
}

fn maybe_construct(world: &mut World) {
    let construction = world.config.construction.clone();
    if world.rng.gen::<f64>() >= construction.chance {
        return;
    }

    let location = world.grid.random_location(&mut world.rng);
    let wealthy: Vec<PersonId> = world
        .living()
        .filter(|p| p.resources > construction.wealth_threshold)
        .map(|p| p.id)
        .collect();
    let Some(&builder) = wealthy.choose(&mut world.rng) else {
        return;
    };

    let space = world
        .rng
        .gen_range(construction.min_space..=construction.max_space);
    let quality = world.rng.gen_range(0.5..=1.0);
    let id = world.next_building_id();
    let mut building = Building::new(id, location, space, quality, world.day, Some(builder));

    let Some(person) = world.people.get_mut(&builder) else {
        return;
    };
    person.resources -= space * construction.unit_value;

    let previous_home = person.home;
    let previous_location = person.location;
    let rented = person.rented_space;
    building.add_resident(person);
    world.grid.relocate(builder, &previous_location, &location);

    if let Some(old) = previous_home.and_then(|h| world.buildings.get_mut(&h)) {
        old.remove_resident(builder, rented);
    }

    world.buildings.insert(id, building);
    world.stats.buildings_constructed += 1;
    tracing::info!(building = %id, builder = %builder, space, "Building constructed");
}

fn sweep_bankruptcies(world: &mut World) {
    let failing: Vec<CompanyId> = world
        .companies
        .values()
        .filter(|c| c.capital < 0.0)
        .map(|c| c.id)
        .collect();

    for id in failing {
        if let Some(company) = world.companies.get_mut(&id) {
            company.bankruptcy(&mut world.people);
        }
        world.dissolve_company(id);
    }
}

fn track_discoveries(world: &mut World) {
    let day = world.day;
    for person in world.people.values() {
        for &n in &person.known {
            if !world.stats.discoveries.contains_key(&n) {
                world.stats.discoveries.insert(n, day);
                tracing::info!(commodity = n, "First discovery");
            }
        }
    }
}
