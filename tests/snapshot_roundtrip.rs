//! Integration tests for saving and restoring whole worlds
//!
//! A restored world must be indistinguishable from the one that was saved,
//! including its random number generator: continuing a restored run has to
//! produce exactly the history the original run went on to produce.

use prime_society::simulation::{SnapshotStore, World};
use prime_society::{SimulationConfig, SocietyError};

fn seeded_world(seed: u64) -> World {
    let mut config = SimulationConfig::default();
    config.world.initial_population = 100;
    config.world.seed = seed;
    World::new(config).unwrap()
}

#[test]
fn test_save_mutate_load_restores_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path(), 5);

    let mut world = seeded_world(21);
    for _ in 0..15 {
        world.simulate_day();
    }
    let day = world.day;
    let population = world.population();
    let prices = world.market.last_prices().clone();

    let path = store.save(&world, None).unwrap();
    assert!(path.exists());

    for _ in 0..10 {
        world.simulate_day();
    }
    assert_ne!(world.day, day);

    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    let restored = store.load_world(&name).unwrap();
    assert_eq!(restored.day, day);
    assert_eq!(restored.population(), population);
    assert_eq!(restored.market.last_prices(), &prices);
    assert!(restored.check_invariants().is_ok());
}

#[test]
fn test_restored_run_continues_identically() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path(), 5);

    let mut original = seeded_world(5);
    for _ in 0..10 {
        original.simulate_day();
    }
    store.save(&original, Some("midpoint")).unwrap();

    for _ in 0..10 {
        original.simulate_day();
    }

    let mut restored = store.load_world("day_00000010_midpoint").unwrap();
    for _ in 0..10 {
        restored.simulate_day();
    }

    assert_eq!(restored.day, original.day);
    assert_eq!(restored.stats, original.stats);
    assert_eq!(
        serde_json::to_string(&restored.snapshot()).unwrap(),
        serde_json::to_string(&original.snapshot()).unwrap()
    );
}

#[test]
fn test_restore_in_place_replaces_state() {
    let mut world = seeded_world(8);
    world.simulate_day();
    let saved = world.snapshot();
    let people = world.people.clone();

    for _ in 0..5 {
        world.simulate_day();
    }
    world.restore(saved).unwrap();

    assert_eq!(world.day, 1);
    assert_eq!(world.people, people);
}

#[test]
fn test_retention_keeps_newest_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path(), 2);
    let mut world = seeded_world(3);

    for _ in 0..4 {
        world.simulate_day();
        store.save(&world, None).unwrap();
    }

    let names = store.list().unwrap();
    assert_eq!(names, vec!["day_00000003.json", "day_00000004.json"]);
}

#[test]
fn test_missing_snapshot_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path(), 2);

    match store.load("day_00000099") {
        Err(SocietyError::SnapshotNotFound(path)) => {
            assert!(path.ends_with("day_00000099.json"));
        }
        other => panic!("expected SnapshotNotFound, got {:?}", other.map(|s| s.day)),
    }
}
