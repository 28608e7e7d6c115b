//! Daily phases, run by `World::simulate_day` in this order:
//! individuals, labor, market, social, maintenance, census, stabilization.

mod census;
mod individual;
mod labor;
mod maintenance;
mod social;
mod stabilize;
mod trade;

use std::fmt;
use std::time::Duration;

pub use census::collect_statistics;
pub use individual::run_individuals;
pub use labor::run_labor;
pub use maintenance::run_maintenance;
pub use social::run_social;
pub use stabilize::{stabilize, StabilizationReport};
pub use trade::run_market;

/// Wall-clock time spent in each phase
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTimings {
    pub individual: Duration,
    pub labor: Duration,
    pub market: Duration,
    pub social: Duration,
    pub maintenance: Duration,
    /// Census and stabilization
    pub statistics: Duration,
    pub days: u64,
}

impl PhaseTimings {
    pub fn accumulate(&mut self, other: &PhaseTimings) {
        self.individual += other.individual;
        self.labor += other.labor;
        self.market += other.market;
        self.social += other.social;
        self.maintenance += other.maintenance;
        self.statistics += other.statistics;
        self.days += other.days;
    }

    pub fn total(&self) -> Duration {
        self.individual + self.labor + self.market + self.social + self.maintenance + self.statistics
    }

    fn phases(&self) -> [(&'static str, Duration); 6] {
        [
            ("individual", self.individual),
            ("labor", self.labor),
            ("market", self.market),
            ("social", self.social),
            ("maintenance", self.maintenance),
            ("statistics", self.statistics),
        ]
    }
}

impl fmt::Display for PhaseTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total().as_secs_f64();
        writeln!(f, "=== PHASE TIMINGS ({} days) ===", self.days)?;
        for (name, duration) in self.phases() {
            let share = if total > 0.0 {
                duration.as_secs_f64() / total * 100.0
            } else {
                0.0
            };
            writeln!(f, "{:<12} {:>10.3} ms ({:>5.1}%)", name, duration.as_secs_f64() * 1000.0, share)?;
        }
        if self.days > 0 {
            writeln!(f, "per day      {:>10.3} ms", total * 1000.0 / self.days as f64)?;
        }
        Ok(())
    }
}
