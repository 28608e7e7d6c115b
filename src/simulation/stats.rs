//! Daily statistics and the end-of-run summary

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Day, PersonId};
use crate::simulation::world::World;

/// Time series (one entry per simulated day) plus running counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub population: Vec<usize>,
    pub gdp: Vec<f64>,
    pub gini: Vec<f64>,
    pub happiness: Vec<f64>,
    pub knowledge: Vec<f64>,
    /// Distinct commodities discovered so far
    pub innovation: Vec<usize>,
    /// Total cultural-unit carriers
    pub meme_spread: Vec<usize>,

    pub births: u64,
    pub deaths: u64,
    pub companies_founded: u64,
    pub companies_failed: u64,
    pub buildings_constructed: u64,
    /// Commodity → day it was first known by anyone
    pub discoveries: BTreeMap<u64, Day>,
}

impl Statistics {
    pub fn days_recorded(&self) -> usize {
        self.population.len()
    }

    pub fn latest_gdp(&self) -> Option<f64> {
        self.gdp.last().copied()
    }

    /// Largest commodity ever discovered
    pub fn highest_discovery(&self) -> Option<u64> {
        self.discoveries.keys().next_back().copied()
    }

    /// Write the series as pretty JSON for external plotting
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Gini coefficient of a set of non-negative values.
///
/// 0 for empty input, a single value, or an all-zero total.
pub fn gini(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i as f64 + 1.0) * x)
        .sum();

    (2.0 * weighted) / (n * total) - (n + 1.0) / n
}

pub fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub days: Day,
    pub population: usize,
    pub births: u64,
    pub deaths: u64,
    pub companies_founded: u64,
    pub companies_failed: u64,
    pub active_companies: usize,
    pub buildings_constructed: u64,
    pub active_memes: usize,
    pub commodities_discovered: usize,
    pub highest_discovery: Option<u64>,
    pub gdp: f64,
    pub gini: f64,
    pub happiness: f64,
    pub knowledge: f64,
    pub richest: Option<(PersonId, f64)>,
    pub most_knowledgeable: Option<(PersonId, usize)>,
    pub happiest: Option<(PersonId, f64)>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SIMULATION SUMMARY ===")?;
        writeln!(f, "Days simulated:        {}", self.days)?;
        writeln!(f, "Final population:      {}", self.population)?;
        writeln!(f, "Births / deaths:       {} / {}", self.births, self.deaths)?;
        writeln!(
            f,
            "Companies:             {} founded, {} failed, {} active",
            self.companies_founded, self.companies_failed, self.active_companies
        )?;
        writeln!(f, "Buildings constructed: {}", self.buildings_constructed)?;
        writeln!(f, "Active memes:          {}", self.active_memes)?;
        match self.highest_discovery {
            Some(n) => writeln!(
                f,
                "Discoveries:           {} (highest {})",
                self.commodities_discovered, n
            )?,
            None => writeln!(f, "Discoveries:           none")?,
        }
        writeln!(f, "GDP:                   {:.2}", self.gdp)?;
        writeln!(f, "Gini:                  {:.3}", self.gini)?;
        writeln!(f, "Mean happiness:        {:.1}", self.happiness)?;
        writeln!(f, "Mean knowledge:        {:.2}", self.knowledge)?;

        if let Some((id, resources)) = self.richest {
            writeln!(f, "Richest:               {} ({:.0})", id, resources)?;
        }
        if let Some((id, known)) = self.most_knowledgeable {
            writeln!(f, "Most knowledgeable:    {} ({} commodities)", id, known)?;
        }
        if let Some((id, happiness)) = self.happiest {
            writeln!(f, "Happiest:              {} ({:.1})", id, happiness)?;
        }
        Ok(())
    }
}

impl World {
    /// End-of-run report from the current state and counters
    pub fn summary(&self) -> Summary {
        let richest = self
            .living()
            .max_by(|a, b| a.resources.total_cmp(&b.resources))
            .map(|p| (p.id, p.resources));
        let most_knowledgeable = self
            .living()
            .max_by_key(|p| p.known.len())
            .map(|p| (p.id, p.known.len()));
        let happiest = self
            .living()
            .max_by(|a, b| a.happiness.total_cmp(&b.happiness))
            .map(|p| (p.id, p.happiness));

        Summary {
            days: self.day,
            population: self.people.len(),
            births: self.stats.births,
            deaths: self.stats.deaths,
            companies_founded: self.stats.companies_founded,
            companies_failed: self.stats.companies_failed,
            active_companies: self.companies.len(),
            buildings_constructed: self.stats.buildings_constructed,
            active_memes: self.memes.len(),
            commodities_discovered: self.stats.discoveries.len(),
            highest_discovery: self.stats.highest_discovery(),
            gdp: self.market.calculate_gdp(),
            gini: self.stats.gini.last().copied().unwrap_or(0.0),
            happiness: self.stats.happiness.last().copied().unwrap_or(0.0),
            knowledge: self.stats.knowledge.last().copied().unwrap_or(0.0),
            richest,
            most_knowledgeable,
            happiest,
        }
    }
}
