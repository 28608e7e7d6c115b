//! Simulation configuration with documented constants
//!
//! All tunable numbers live here. A single `SimulationConfig` is built once
//! (from defaults or a TOML file) and handed by reference to every subsystem.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SocietyError};
use crate::core::types::{years, Day};

/// Configuration for the whole simulation
///
/// Every section uses `#[serde(default)]`, so a TOML file only needs to name
/// the values it wants to override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub needs: NeedsConfig,
    pub life: LifeConfig,
    pub economy: EconomyConfig,
    pub culture: CultureConfig,
    pub politics: PoliticsConfig,
    pub construction: ConstructionConfig,
    pub stabilization: StabilizationConfig,
    pub persistence: PersistenceConfig,
}

// === WORLD ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Individuals created at initialization
    ///
    /// Also the reference for the population-collapse heuristic.
    pub initial_population: usize,
    /// Number of top-level regions
    pub regions: u32,
    /// Districts inside each region
    pub districts_per_region: u32,
    /// Side of the square cell grid inside a district
    pub grid_side: i32,
    /// Seed for the single simulation random generator
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_population: 1000,
            regions: 5,
            districts_per_region: 4,
            grid_side: 10,
            seed: 12345,
        }
    }
}

// === NEEDS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    /// Nutrition consumed by every individual each day
    pub nutrition_requirement: f64,
    /// Below this nutrition level an individual is starving
    pub starvation_threshold: f64,
    /// Upper bound of the nutrition level
    pub max_nutrition: f64,
    /// Units of the base commodity "1" produced per person per day
    pub daily_one_production: f64,
    /// Health lost per starving day
    pub starvation_health_loss: f64,
    /// Stress gained per starving day
    pub starvation_stress: f64,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            nutrition_requirement: 1.0,
            starvation_threshold: 0.3,
            max_nutrition: 10.0,
            daily_one_production: 1.0,
            starvation_health_loss: 5.0,
            starvation_stress: 10.0,
        }
    }
}

// === LIFE CYCLE ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeConfig {
    /// Age (years) after which death becomes increasingly likely
    pub base_life_expectancy_years: u64,
    /// Years past life expectancy at which death becomes certain
    ///
    /// Death probability ramps linearly from 0 at life expectancy to 1 after
    /// this many additional years.
    pub mortality_ramp_years: u64,
    /// Age (years) after which health starts to decay
    pub health_decay_age_years: u64,
    /// Daily health loss past `health_decay_age_years`
    pub health_decay_rate: f64,
    /// Age (years) after which health decays faster
    pub elder_decay_age_years: u64,
    /// Additional daily health loss past `elder_decay_age_years`
    pub elder_decay_rate: f64,
    /// Youngest age (years) at which an individual can reproduce
    pub min_reproduction_age_years: u64,
    /// Oldest age (years) at which an individual can reproduce
    pub max_reproduction_age_years: u64,
    /// Total resources needed to raise a child, split between parents
    pub child_cost: f64,
    /// Daily chance of a birth once every other condition holds
    pub reproduction_chance: f64,
    /// Relationship strength a partner must exceed
    pub partner_threshold: f64,
    /// Half-width of the uniform variation added to inherited traits
    pub trait_inheritance_variance: f64,
    /// Age (years) from which individuals work and look for jobs
    pub working_age_years: u64,
    /// Individuals younger than this (years) always study
    pub study_age_limit_years: u64,
    /// Ambition above which adults keep studying
    pub study_ambition_threshold: f64,
    /// Radius (cells) of the socialization neighbourhood
    pub relationship_radius: f64,
    /// Neighbours an individual interacts with per day
    pub max_social_contacts: usize,
    /// Oldest age (years) of the initial population
    pub initial_max_age_years: u64,
    /// Resources an individual starts with
    pub starting_resources: f64,
    /// Living space rented by default
    pub default_rented_space: f64,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            base_life_expectancy_years: 75,
            mortality_ramp_years: 10,
            health_decay_age_years: 55,
            health_decay_rate: 0.01,
            elder_decay_age_years: 70,
            elder_decay_rate: 0.02,
            min_reproduction_age_years: 16,
            max_reproduction_age_years: 55,
            child_cost: 10.0 * 365.0 * 18.0,
            reproduction_chance: 0.001,
            partner_threshold: 50.0,
            trait_inheritance_variance: 20.0,
            working_age_years: 16,
            study_age_limit_years: 25,
            study_ambition_threshold: 50.0,
            relationship_radius: 3.0,
            max_social_contacts: 5,
            initial_max_age_years: 60,
            starting_resources: 100.0,
            default_rented_space: 10.0,
        }
    }
}

impl LifeConfig {
    pub fn working_age(&self) -> Day {
        years(self.working_age_years)
    }

    pub fn min_reproduction_age(&self) -> Day {
        years(self.min_reproduction_age_years)
    }

    pub fn max_reproduction_age(&self) -> Day {
        years(self.max_reproduction_age_years)
    }
}

// === ECONOMY ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Fraction of every production run lost to inefficiency
    pub entropy_loss: f64,
    /// Maximum employees per company
    pub max_employees: usize,
    /// Resources an individual needs before founding a company
    pub founding_wealth: f64,
    /// Daily chance an eligible individual founds a company
    pub founding_chance: f64,
    /// Salary offered per commodity the hire knows and the company does not
    pub salary_per_gap: f64,
    /// Days of salary a company must be able to cover before hiring
    pub salary_horizon_days: f64,
    /// Units produced per employee per day
    pub capacity_per_employee: f64,
    /// Markup over the market price when companies list output
    pub sell_markup: f64,
    /// Discount under the market price when individuals bid for food
    pub bid_discount: f64,
    /// Trades remembered per commodity
    pub price_history_len: usize,
    /// Companies consider producing commodities `2..max_product`
    pub max_product: u64,
    /// Individuals consider buying commodities `1..max_food_candidate`
    pub max_food_candidate: u64,
    /// Largest quantity bought in one purchase
    pub max_purchase_quantity: f64,
    /// Fraction of a purchase's nutrition absorbed immediately
    pub consumption_fraction: f64,
    /// Unemployed individuals processed by the job market per day
    pub job_seekers_per_day: usize,
    /// Companies each job seeker samples
    pub companies_sampled: usize,
    /// Inventory of "1" above which a company lists half of it
    pub one_listing_threshold: f64,
    /// Ask price for listed "1"
    pub one_listing_price: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            entropy_loss: 0.05,
            max_employees: 20,
            founding_wealth: 1000.0,
            founding_chance: 0.01,
            salary_per_gap: 10.0,
            salary_horizon_days: 30.0,
            capacity_per_employee: 10.0,
            sell_markup: 1.1,
            bid_discount: 0.9,
            price_history_len: 365,
            max_product: 20,
            max_food_candidate: 10,
            max_purchase_quantity: 10.0,
            consumption_fraction: 0.1,
            job_seekers_per_day: 100,
            companies_sampled: 5,
            one_listing_threshold: 10.0,
            one_listing_price: 1.0,
        }
    }
}

// === CULTURE ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CultureConfig {
    /// Base probability of a successful spread attempt
    pub spread_base_rate: f64,
    /// Bonus per affected trait whose sign matches the target's trait
    pub trait_bonus: f64,
    /// Daily chance one carrier becomes immune
    pub decay_rate: f64,
    /// Daily chance a new cultural unit appears
    pub spawn_chance: f64,
    /// Neighbourhood radius used for spreading
    pub spread_radius: f64,
    /// Neighbours each carrier tries to reach per day
    pub spread_attempts: usize,
    /// Largest absolute trait shift a unit applies
    pub effect_magnitude: f64,
}

impl Default for CultureConfig {
    fn default() -> Self {
        Self {
            spread_base_rate: 0.1,
            trait_bonus: 0.1,
            decay_rate: 0.05,
            spawn_chance: 0.001,
            spread_radius: 2.0,
            spread_attempts: 3,
            effect_magnitude: 20.0,
        }
    }
}

// === POLITICS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoliticsConfig {
    pub block_period: u32,
    pub quarter_period: u32,
    pub district_period: u32,
    pub region_period: u32,
    /// Minimum age (years) to vote or stand
    pub voting_age_years: u64,
    /// Most candidates sampled per election
    pub max_candidates: usize,
    /// One candidate per this many eligible voters
    pub voters_per_candidate: usize,
    /// Chance any voter stays home
    pub abstention_rate: f64,
    /// Voters whose best score is below this abstain
    pub apathy_threshold: f64,
}

impl Default for PoliticsConfig {
    fn default() -> Self {
        Self {
            block_period: 180,
            quarter_period: 365,
            district_period: 730,
            region_period: 1095,
            voting_age_years: 18,
            max_candidates: 5,
            voters_per_candidate: 100,
            abstention_rate: 0.2,
            apathy_threshold: -0.5,
        }
    }
}

// === CONSTRUCTION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionConfig {
    /// Daily chance a structure is built
    pub chance: f64,
    /// Resources a builder must exceed
    pub wealth_threshold: f64,
    pub min_space: f64,
    pub max_space: f64,
    /// Value (and construction cost) of one unit of space
    pub unit_value: f64,
    /// Years over which a structure's value decays to the floor
    pub decay_horizon_years: u64,
    /// Lowest age multiplier applied to a structure's value
    pub decay_floor: f64,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            chance: 0.01,
            wealth_threshold: 5000.0,
            min_space: 100.0,
            max_space: 500.0,
            unit_value: 10.0,
            decay_horizon_years: 50,
            decay_floor: 0.5,
        }
    }
}

// === STABILIZATION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizationConfig {
    /// Fraction of the initial population below which immigrants arrive
    pub population_floor_fraction: f64,
    pub immigrant_count: usize,
    /// GDP below which resources are injected
    pub gdp_floor: f64,
    pub injection_amount: f64,
    /// Individuals receiving an injection
    pub injection_sample: usize,
    /// Fraction of starving individuals that triggers food relief
    pub starvation_fraction: f64,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            population_floor_fraction: 0.1,
            immigrant_count: 50,
            gdp_floor: 100.0,
            injection_amount: 100.0,
            injection_sample: 100,
            starvation_fraction: 0.3,
        }
    }
}

// === PERSISTENCE ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub snapshot_dir: PathBuf,
    /// Days between automatic snapshots
    pub snapshot_period_days: u64,
    /// Snapshots kept on disk before the oldest is pruned
    pub max_snapshots: usize,
    pub auto_snapshot: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("checkpoints"),
            snapshot_period_days: 100,
            max_snapshots: 10,
            auto_snapshot: true,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SocietyError::InvalidConfig(msg));

        if self.world.regions == 0 || self.world.districts_per_region == 0 {
            return invalid("regions and districts_per_region must be positive".into());
        }
        if self.world.grid_side <= 0 {
            return invalid(format!("grid_side ({}) must be positive", self.world.grid_side));
        }
        if self.life.min_reproduction_age_years > self.life.max_reproduction_age_years {
            return invalid(format!(
                "min_reproduction_age_years ({}) should be <= max_reproduction_age_years ({})",
                self.life.min_reproduction_age_years, self.life.max_reproduction_age_years
            ));
        }
        if self.construction.min_space > self.construction.max_space {
            return invalid("construction.min_space exceeds max_space".into());
        }
        if self.economy.max_product < 3 || self.economy.max_food_candidate < 2 {
            return invalid("product and food scan ranges are too small".into());
        }

        let fractions = [
            ("needs.starvation_threshold", self.needs.starvation_threshold),
            ("economy.entropy_loss", self.economy.entropy_loss),
            ("economy.founding_chance", self.economy.founding_chance),
            ("life.reproduction_chance", self.life.reproduction_chance),
            ("culture.decay_rate", self.culture.decay_rate),
            ("culture.spawn_chance", self.culture.spawn_chance),
            ("politics.abstention_rate", self.politics.abstention_rate),
            ("construction.chance", self.construction.chance),
            ("construction.decay_floor", self.construction.decay_floor),
            (
                "stabilization.population_floor_fraction",
                self.stabilization.population_floor_fraction,
            ),
            (
                "stabilization.starvation_fraction",
                self.stabilization.starvation_fraction,
            ),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{} ({}) must be within [0, 1]", name, value));
            }
        }

        let periods = [
            self.politics.block_period,
            self.politics.quarter_period,
            self.politics.district_period,
            self.politics.region_period,
        ];
        if periods.contains(&0) {
            return invalid("election periods must be positive".into());
        }

        Ok(())
    }
}
