//! Versioned world snapshots and the on-disk snapshot directory

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::city::Building;
use crate::core::config::PersistenceConfig;
use crate::core::error::{Result, SocietyError};
use crate::core::types::{BuildingId, CompanyId, Day, MemeId, PersonId};
use crate::core::SimulationConfig;
use crate::culture::Meme;
use crate::economy::{Company, Market};
use crate::entity::Person;
use crate::politics::Governance;
use crate::simulation::stats::Statistics;
use crate::simulation::world::{IdCounters, World};
use crate::spatial::LocalityGrid;

/// Schema version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_PREFIX: &str = "day_";
const SNAPSHOT_EXTENSION: &str = "json";

/// Complete, self-contained world state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub day: Day,
    pub config: SimulationConfig,
    pub rng: ChaCha8Rng,
    pub counters: IdCounters,
    pub people: BTreeMap<PersonId, Person>,
    pub companies: BTreeMap<CompanyId, Company>,
    pub buildings: BTreeMap<BuildingId, Building>,
    pub memes: BTreeMap<MemeId, Meme>,
    pub grid: LocalityGrid,
    pub market: Market,
    pub governance: Governance,
    pub stats: Statistics,
    pub departed_children: BTreeMap<PersonId, Vec<PersonId>>,
}

impl World {
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            version: SNAPSHOT_VERSION,
            day: self.day,
            config: self.config.clone(),
            rng: self.rng.clone(),
            counters: self.counters.clone(),
            people: self.people.clone(),
            companies: self.companies.clone(),
            buildings: self.buildings.clone(),
            memes: self.memes.clone(),
            grid: self.grid.clone(),
            market: self.market.clone(),
            governance: self.governance.clone(),
            stats: self.stats.clone(),
            departed_children: self.departed_children.clone(),
        }
    }

    /// Rebuild a world, rejecting snapshots from another schema version
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SocietyError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        snapshot.config.validate()?;

        Ok(Self {
            day: snapshot.day,
            config: snapshot.config,
            people: snapshot.people,
            companies: snapshot.companies,
            buildings: snapshot.buildings,
            memes: snapshot.memes,
            grid: snapshot.grid,
            market: snapshot.market,
            governance: snapshot.governance,
            stats: snapshot.stats,
            departed_children: snapshot.departed_children,
            rng: snapshot.rng,
            counters: snapshot.counters,
        })
    }

    /// Replace this world with a snapshot; on error the world is unchanged
    pub fn restore(&mut self, snapshot: WorldSnapshot) -> Result<()> {
        *self = Self::from_snapshot(snapshot)?;
        Ok(())
    }
}

/// A directory of snapshot files, pruned oldest-first
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    max_snapshots: usize,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, max_snapshots: usize) -> Self {
        Self {
            dir: dir.into(),
            max_snapshots,
        }
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(config.snapshot_dir.clone(), config.max_snapshots)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(day: Day, label: Option<&str>) -> String {
        match label {
            Some(label) => {
                let label: String = label
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                    .collect();
                format!("{}{:08}_{}.{}", SNAPSHOT_PREFIX, day, label, SNAPSHOT_EXTENSION)
            }
            None => format!("{}{:08}.{}", SNAPSHOT_PREFIX, day, SNAPSHOT_EXTENSION),
        }
    }

    /// Write a snapshot of `world` and return its path.
    ///
    /// The file is written under a temporary name and renamed into place, so
    /// an existing snapshot is never left half-written.
    pub fn save(&self, world: &World, label: Option<&str>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let name = Self::file_name(world.day, label);
        let final_path = self.dir.join(&name);
        let temp_path = self.dir.join(format!(".{}.tmp", name));

        let write = || -> Result<()> {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            serde_json::to_writer(&mut writer, &world.snapshot())?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            Ok(())
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, &final_path)?;

        let pruned = self.prune()?;
        tracing::info!(path = %final_path.display(), pruned, "Snapshot saved");
        Ok(final_path)
    }

    /// Snapshot file names, oldest first (other files in the directory are ignored)
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with(SNAPSHOT_PREFIX) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read and decode a snapshot by file name (extension optional)
    pub fn load(&self, name: &str) -> Result<WorldSnapshot> {
        let mut path = self.dir.join(name);
        if !path.exists() && path.extension().is_none() {
            path.set_extension(SNAPSHOT_EXTENSION);
        }
        if !path.exists() {
            return Err(SocietyError::SnapshotNotFound(path));
        }

        let bytes = fs::read(&path)?;
        let snapshot: WorldSnapshot = serde_json::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SocietyError::SnapshotVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn load_world(&self, name: &str) -> Result<World> {
        World::from_snapshot(self.load(name)?)
    }

    /// Delete the oldest snapshots beyond the retention limit
    fn prune(&self) -> Result<usize> {
        let names = self.list()?;
        let excess = names.len().saturating_sub(self.max_snapshots.max(1));
        for name in &names[..excess] {
            fs::remove_file(self.dir.join(name))?;
        }
        Ok(excess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_world() -> World {
        let mut config = SimulationConfig::default();
        config.world.initial_population = 20;
        World::new(config).unwrap()
    }

    #[test]
    fn test_file_names_sort_by_day() {
        assert_eq!(SnapshotStore::file_name(7, None), "day_00000007.json");
        assert_eq!(
            SnapshotStore::file_name(12, Some("before war!")),
            "day_00000012_before_war_.json"
        );
        assert!(SnapshotStore::file_name(99, None) < SnapshotStore::file_name(100, None));
    }

    #[test]
    fn test_wrong_version_rejected_without_touching_world() {
        let mut world = tiny_world();
        let mut snapshot = world.snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        snapshot.day = 999;

        let result = world.restore(snapshot);
        assert!(matches!(result, Err(SocietyError::SnapshotVersion { .. })));
        assert_eq!(world.day, 0);
    }

    #[test]
    fn test_retention_prunes_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path(), 2);
        let mut world = tiny_world();

        for day in 1..=3 {
            world.day = day;
            store.save(&world, None).unwrap();
        }

        assert_eq!(
            store.list().unwrap(),
            vec!["day_00000002.json".to_string(), "day_00000003.json".to_string()]
        );
    }

    #[test]
    fn test_missing_snapshot_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path(), 2);
        assert!(matches!(
            store.load("nope"),
            Err(SocietyError::SnapshotNotFound(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }
}
