//! Cultural units that spread between neighbours and shift their traits

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::CultureConfig;
use crate::core::types::{Day, MemeId, PersonId};
use crate::entity::{Person, TraitAxis};

/// Number of trait axes each unit affects
pub const AFFECTED_AXES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meme {
    pub id: MemeId,
    pub creator: PersonId,
    pub created_day: Day,
    /// Shift applied to each affected axis on infection
    pub effects: Vec<(TraitAxis, f64)>,
    pub transmissibility: f64,
    /// Disjoint from `immune`
    pub carriers: BTreeSet<PersonId>,
    pub immune: BTreeSet<PersonId>,
    pub total_infections: u64,
    pub peak_carriers: usize,
}

impl Meme {
    /// A new unit carried by its creator alone
    pub fn new<R: Rng>(
        id: MemeId,
        creator: PersonId,
        created_day: Day,
        config: &CultureConfig,
        rng: &mut R,
    ) -> Self {
        let magnitude = config.effect_magnitude.abs();
        let effects = TraitAxis::ALL
            .choose_multiple(rng, AFFECTED_AXES)
            .map(|&axis| (axis, rng.gen_range(-magnitude..=magnitude)))
            .collect();

        Self {
            id,
            creator,
            created_day,
            effects,
            transmissibility: rng.gen_range(0.5..=1.5),
            carriers: BTreeSet::from([creator]),
            immune: BTreeSet::new(),
            total_infections: 1,
            peak_carriers: 1,
        }
    }

    pub fn is_carrier(&self, id: PersonId) -> bool {
        self.carriers.contains(&id)
    }

    pub fn is_immune(&self, id: PersonId) -> bool {
        self.immune.contains(&id)
    }

    /// Probability that an attempt to reach `target` succeeds
    pub fn spread_probability(&self, target: &Person, config: &CultureConfig) -> f64 {
        let matching = self
            .effects
            .iter()
            .filter(|(axis, effect)| effect * target.traits.get(*axis) > 0.0)
            .count();
        config.spread_base_rate * self.transmissibility * (1.0 + config.trait_bonus * matching as f64)
    }

    /// Try to pass the unit from `from` to `target`.
    ///
    /// Carriers and immune individuals are skipped. On success the target's
    /// affected traits shift by the unit's effects.
    pub fn spread<R: Rng>(
        &mut self,
        from: PersonId,
        target: &mut Person,
        config: &CultureConfig,
        rng: &mut R,
    ) -> bool {
        if self.is_carrier(target.id) || self.is_immune(target.id) {
            return false;
        }

        if rng.gen::<f64>() >= self.spread_probability(target, config) {
            return false;
        }

        self.carriers.insert(target.id);
        self.total_infections += 1;
        for &(axis, effect) in &self.effects {
            target.traits.shift(axis, effect);
        }
        tracing::trace!(meme = %self.id, from = %from, to = %target.id, "Meme spread");
        true
    }

    /// With the configured daily chance, one random carrier becomes immune
    pub fn decay<R: Rng>(&mut self, config: &CultureConfig, rng: &mut R) -> Option<PersonId> {
        if self.carriers.is_empty() || rng.gen::<f64>() >= config.decay_rate {
            return None;
        }
        let pick = rng.gen_range(0..self.carriers.len());
        let recovered = self.carriers.iter().nth(pick).copied()?;
        self.carriers.remove(&recovered);
        self.immune.insert(recovered);
        Some(recovered)
    }

    pub fn update_peak(&mut self) {
        self.peak_carriers = self.peak_carriers.max(self.carriers.len());
    }

    /// Drop every trace of an individual (used when they die)
    pub fn forget(&mut self, id: PersonId) {
        self.carriers.remove(&id);
        self.immune.remove(&id);
    }

    pub fn is_extinct(&self) -> bool {
        self.carriers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Location;
    use crate::entity::Traits;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn target(id: u64) -> Person {
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(id);
        Person::new(
            PersonId(id),
            Traits::default(),
            Location::new(0, 0, 0, 0),
            &config,
            &mut rng,
        )
    }

    #[test]
    fn test_new_meme_has_three_distinct_axes() {
        let config = CultureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let meme = Meme::new(MemeId(1), PersonId(1), 0, &config, &mut rng);

        assert_eq!(meme.effects.len(), AFFECTED_AXES);
        let axes: BTreeSet<TraitAxis> = meme.effects.iter().map(|(a, _)| *a).collect();
        assert_eq!(axes.len(), AFFECTED_AXES);
        assert!(meme.effects.iter().all(|(_, e)| e.abs() <= 20.0));
        assert!((0.5..=1.5).contains(&meme.transmissibility));
        assert!(meme.is_carrier(PersonId(1)));
    }

    #[test]
    fn test_guaranteed_spread_shifts_traits() {
        let config = CultureConfig {
            spread_base_rate: 1.0,
            ..CultureConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut meme = Meme::new(MemeId(1), PersonId(1), 0, &config, &mut rng);
        meme.transmissibility = 1.0;
        let mut person = target(2);

        assert!(meme.spread(PersonId(1), &mut person, &config, &mut rng));
        for &(axis, effect) in &meme.effects {
            assert_eq!(person.traits.get(axis), effect);
        }
        assert_eq!(meme.total_infections, 2);

        // already a carrier
        assert!(!meme.spread(PersonId(1), &mut person, &config, &mut rng));
    }

    #[test]
    fn test_immune_cannot_be_reinfected() {
        let config = CultureConfig {
            spread_base_rate: 1.0,
            decay_rate: 1.0,
            ..CultureConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut meme = Meme::new(MemeId(1), PersonId(1), 0, &config, &mut rng);

        assert_eq!(meme.decay(&config, &mut rng), Some(PersonId(1)));
        assert!(meme.is_extinct());
        assert!(meme.is_immune(PersonId(1)));

        let mut creator = target(1);
        assert!(!meme.spread(PersonId(2), &mut creator, &config, &mut rng));
    }

    #[test]
    fn test_matching_traits_raise_spread_probability() {
        let config = CultureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut meme = Meme::new(MemeId(1), PersonId(1), 0, &config, &mut rng);
        meme.transmissibility = 1.0;
        meme.effects = vec![
            (TraitAxis::GenerosityGreed, 10.0),
            (TraitAxis::HumbleAmbitious, -10.0),
            (TraitAxis::SocialPragmatic, 5.0),
        ];

        let mut person = target(2);
        assert!((meme.spread_probability(&person, &config) - 0.1).abs() < 1e-12);

        person.traits.set(TraitAxis::GenerosityGreed, 50.0);
        person.traits.set(TraitAxis::HumbleAmbitious, -50.0);
        assert!((meme.spread_probability(&person, &config) - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_forget_clears_both_sets() {
        let config = CultureConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut meme = Meme::new(MemeId(1), PersonId(1), 0, &config, &mut rng);
        meme.immune.insert(PersonId(2));
        meme.forget(PersonId(1));
        meme.forget(PersonId(2));
        assert!(meme.carriers.is_empty() && meme.immune.is_empty());
    }
}
