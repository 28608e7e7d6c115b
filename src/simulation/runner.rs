//! Multi-day runner with auto-snapshots and profiling

use serde::Serialize;

use crate::core::types::Day;
use crate::simulation::snapshot::SnapshotStore;
use crate::simulation::stats::Summary;
use crate::simulation::systems::PhaseTimings;
use crate::simulation::world::World;

/// Why a run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StopReason {
    Completed,
    Extinct,
    InvariantViolation(String),
}

/// Outcome of `Simulation::run`
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub days_run: Day,
    pub stop_reason: StopReason,
    pub summary: Summary,
    /// Present when profiling was enabled
    pub timings: Option<PhaseTimings>,
    pub snapshots_written: usize,
}

pub struct Simulation {
    pub world: World,
    store: Option<SnapshotStore>,
    profile: bool,
}

impl Simulation {
    pub fn new(world: World) -> Self {
        Self {
            world,
            store: None,
            profile: false,
        }
    }

    /// Save a snapshot every `persistence.snapshot_period_days` into `store`
    pub fn with_snapshots(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    /// Advance up to `days` days.
    ///
    /// Stops early on extinction or a failed consistency check; the final
    /// statistics are reported either way.
    pub fn run(&mut self, days: Day) -> RunSummary {
        let mut timings = PhaseTimings::default();
        let mut stop_reason = StopReason::Completed;
        let mut days_run = 0;
        let mut snapshots_written = 0;

        let period = self.world.config.persistence.snapshot_period_days;
        let auto_snapshot = self.world.config.persistence.auto_snapshot;

        for _ in 0..days {
            let day_timings = self.world.simulate_day();
            timings.accumulate(&day_timings);
            days_run += 1;

            if let Err(e) = self.world.check_invariants() {
                tracing::error!(error = %e, "Stopping simulation");
                stop_reason = StopReason::InvariantViolation(e.to_string());
                break;
            }

            if auto_snapshot && period > 0 && self.world.day % period == 0 {
                if let Some(store) = &self.store {
                    match store.save(&self.world, None) {
                        Ok(_) => snapshots_written += 1,
                        Err(e) => tracing::warn!(error = %e, "Auto-snapshot failed"),
                    }
                }
            }

            if self.world.day % 100 == 0 {
                tracing::info!(
                    day = self.world.day,
                    population = self.world.population(),
                    companies = self.world.companies.len(),
                    gdp = self.world.stats.latest_gdp().unwrap_or(0.0),
                    "Progress"
                );
            }

            if self.world.people.is_empty() {
                tracing::warn!(day = self.world.day, "Population extinct");
                stop_reason = StopReason::Extinct;
                break;
            }
        }

        RunSummary {
            days_run,
            stop_reason,
            summary: self.world.summary(),
            timings: self.profile.then_some(timings),
            snapshots_written,
        }
    }
}
