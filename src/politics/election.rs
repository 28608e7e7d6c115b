//! Elections at four nested geographic levels

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::PoliticsConfig;
use crate::core::types::{years, Day, PersonId};
use crate::entity::{Person, TraitAxis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeoLevel {
    Block,
    Quarter,
    District,
    Region,
}

impl GeoLevel {
    pub const ALL: [GeoLevel; 4] = [
        GeoLevel::Block,
        GeoLevel::Quarter,
        GeoLevel::District,
        GeoLevel::Region,
    ];

    /// Days between elections at this level
    pub fn period(self, config: &PoliticsConfig) -> u32 {
        match self {
            GeoLevel::Block => config.block_period,
            GeoLevel::Quarter => config.quarter_period,
            GeoLevel::District => config.district_period,
            GeoLevel::Region => config.region_period,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GeoLevel::Block => "block",
            GeoLevel::Quarter => "quarter",
            GeoLevel::District => "district",
            GeoLevel::Region => "region",
        }
    }
}

/// Shared policy parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Policies {
    pub tax_rate: f64,
    pub welfare_spending: f64,
    pub education_funding: f64,
    pub research_grants: f64,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            tax_rate: 0.1,
            welfare_spending: 0.2,
            education_funding: 0.15,
            research_grants: 0.1,
        }
    }
}

/// Election state for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub level: GeoLevel,
    /// Days until the next election
    pub countdown: u32,
    /// Election day → winner
    pub winners: BTreeMap<Day, PersonId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectionResult {
    pub level: GeoLevel,
    pub day: Day,
    pub winner: PersonId,
    pub votes: u64,
    pub turnout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Governance {
    seats: Vec<Seat>,
    pub policies: Policies,
    pub corruption_level: f64,
}

impl Governance {
    pub fn new(config: &PoliticsConfig) -> Self {
        let seats = GeoLevel::ALL
            .iter()
            .map(|&level| Seat {
                level,
                countdown: level.period(config),
                winners: BTreeMap::new(),
            })
            .collect();

        Self {
            seats,
            policies: Policies::default(),
            corruption_level: 0.0,
        }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, level: GeoLevel) -> Option<&Seat> {
        self.seats.iter().find(|s| s.level == level)
    }

    /// Most recent office holder at a level
    pub fn current_holder(&self, level: GeoLevel) -> Option<PersonId> {
        self.seat(level)
            .and_then(|s| s.winners.values().next_back().copied())
    }

    /// Advance every countdown by one day, holding elections that come due
    pub fn tick<R: Rng>(
        &mut self,
        day: Day,
        people: &BTreeMap<PersonId, Person>,
        config: &PoliticsConfig,
        rng: &mut R,
    ) -> Vec<ElectionResult> {
        let mut results = Vec::new();

        for index in 0..self.seats.len() {
            let level = self.seats[index].level;
            let seat = &mut self.seats[index];
            seat.countdown = seat.countdown.saturating_sub(1);
            if seat.countdown > 0 {
                continue;
            }
            seat.countdown = level.period(config);

            if let Some(result) = hold_election(level, day, people, config, rng) {
                self.seats[index].winners.insert(day, result.winner);
                results.push(result);
            }
        }
        results
    }
}

/// Run one election among living adults.
///
/// Returns `None` when nobody voted.
pub fn hold_election<R: Rng>(
    level: GeoLevel,
    day: Day,
    people: &BTreeMap<PersonId, Person>,
    config: &PoliticsConfig,
    rng: &mut R,
) -> Option<ElectionResult> {
    let voting_age = years(config.voting_age_years);
    let voters: Vec<&Person> = people
        .values()
        .filter(|p| p.alive && p.age >= voting_age)
        .collect();

    let count = config
        .max_candidates
        .min(voters.len() / config.voters_per_candidate.max(1));
    let candidates: Vec<&Person> = voters.choose_multiple(rng, count).copied().collect();
    if candidates.is_empty() {
        return None;
    }

    let mut votes: BTreeMap<PersonId, u64> = BTreeMap::new();
    for voter in &voters {
        if let Some(choice) = voter_decision(voter, &candidates, config, rng) {
            *votes.entry(choice).or_insert(0) += 1;
        }
    }

    let turnout = votes.values().sum();
    let (&winner, &count) = votes
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))?;

    tracing::info!(
        day,
        level = level.name(),
        winner = %winner,
        votes = count,
        turnout,
        "Election held"
    );

    Some(ElectionResult {
        level,
        day,
        winner,
        votes: count,
        turnout,
    })
}

/// Trait alignment (0 for identical traits, -10 for opposite ones)
pub fn alignment(voter: &Person, candidate: &Person) -> f64 {
    TraitAxis::ALL
        .iter()
        .map(|&axis| -(voter.traits.get(axis) - candidate.traits.get(axis)).abs() / 200.0)
        .sum()
}

/// Pick the best-scoring candidate, or abstain
pub fn voter_decision<R: Rng>(
    voter: &Person,
    candidates: &[&Person],
    config: &PoliticsConfig,
    rng: &mut R,
) -> Option<PersonId> {
    let mut best: Option<(PersonId, f64)> = None;

    for candidate in candidates {
        let score = alignment(voter, candidate)
            + candidate.charisma() / 100.0
            + rng.gen_range(-0.2..=0.2);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate.id, score));
        }
    }

    let (choice, score) = best?;
    if score < config.apathy_threshold || rng.gen::<f64>() < config.abstention_rate {
        return None;
    }
    Some(choice)
}
