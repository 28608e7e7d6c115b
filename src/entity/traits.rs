//! Personality axes
//!
//! Ten bipolar axes in [-100, 100]. The negative pole is the first word of the
//! variant name (e.g. -100 = generous, +100 = greedy).

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const TRAIT_MIN: f64 = -100.0;
pub const TRAIT_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraitAxis {
    GenerosityGreed,
    InventiveImitative,
    DiplomaticAggressive,
    HumbleAmbitious,
    SocialPragmatic,
    SincereDeceptive,
    SharingExploiting,
    ReflectiveImpulsive,
    ConservativeProgressive,
    MaterialistSpiritual,
}

impl TraitAxis {
    pub const COUNT: usize = 10;

    pub const ALL: [TraitAxis; TraitAxis::COUNT] = [
        TraitAxis::GenerosityGreed,
        TraitAxis::InventiveImitative,
        TraitAxis::DiplomaticAggressive,
        TraitAxis::HumbleAmbitious,
        TraitAxis::SocialPragmatic,
        TraitAxis::SincereDeceptive,
        TraitAxis::SharingExploiting,
        TraitAxis::ReflectiveImpulsive,
        TraitAxis::ConservativeProgressive,
        TraitAxis::MaterialistSpiritual,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Values for every axis, always within [-100, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits([f64; TraitAxis::COUNT]);

impl Default for Traits {
    fn default() -> Self {
        Self([0.0; TraitAxis::COUNT])
    }
}

impl Traits {
    /// Build from raw values, clamping each into range
    pub fn from_values(values: [f64; TraitAxis::COUNT]) -> Self {
        Self(values.map(|v| v.clamp(TRAIT_MIN, TRAIT_MAX)))
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut values = [0.0; TraitAxis::COUNT];
        for value in values.iter_mut() {
            *value = rng.gen_range(TRAIT_MIN..=TRAIT_MAX);
        }
        Self(values)
    }

    /// Parental mean plus uniform variation per axis, clamped
    pub fn inherit<R: Rng>(a: &Traits, b: &Traits, variance: f64, rng: &mut R) -> Self {
        let mut values = [0.0; TraitAxis::COUNT];
        for axis in TraitAxis::ALL {
            let mean = (a.get(axis) + b.get(axis)) / 2.0;
            let variation = if variance > 0.0 {
                rng.gen_range(-variance..=variance)
            } else {
                0.0
            };
            values[axis.index()] = mean + variation;
        }
        Self::from_values(values)
    }

    #[inline]
    pub fn get(&self, axis: TraitAxis) -> f64 {
        self.0[axis.index()]
    }

    pub fn set(&mut self, axis: TraitAxis, value: f64) {
        self.0[axis.index()] = value.clamp(TRAIT_MIN, TRAIT_MAX);
    }

    /// Add `delta` to an axis, clamped
    pub fn shift(&mut self, axis: TraitAxis, delta: f64) {
        self.set(axis, self.get(axis) + delta);
    }

    pub fn values(&self) -> &[f64; TraitAxis::COUNT] {
        &self.0
    }

    /// Sum of absolute per-axis differences
    pub fn total_distance(&self, other: &Traits) -> f64 {
        TraitAxis::ALL
            .iter()
            .map(|&axis| (self.get(axis) - other.get(axis)).abs())
            .sum()
    }

    /// 100 minus the mean absolute per-axis difference
    pub fn compatibility(&self, other: &Traits) -> f64 {
        100.0 - self.total_distance(other) / TraitAxis::COUNT as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_axis_indices_are_dense() {
        for (i, axis) in TraitAxis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
    }

    #[test]
    fn test_shift_clamps() {
        let mut traits = Traits::default();
        traits.shift(TraitAxis::HumbleAmbitious, 250.0);
        assert_eq!(traits.get(TraitAxis::HumbleAmbitious), TRAIT_MAX);
        traits.shift(TraitAxis::HumbleAmbitious, -500.0);
        assert_eq!(traits.get(TraitAxis::HumbleAmbitious), TRAIT_MIN);
    }

    #[test]
    fn test_identical_traits_fully_compatible() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let traits = Traits::random(&mut rng);
        assert_eq!(traits.compatibility(&traits), 100.0);
    }

    #[test]
    fn test_inheritance_without_variance_is_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let a = Traits::from_values([100.0; 10]);
        let b = Traits::from_values([0.0; 10]);
        let child = Traits::inherit(&a, &b, 0.0, &mut rng);
        assert!(child.values().iter().all(|&v| v == 50.0));
    }

    #[test]
    fn test_inheritance_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let a = Traits::from_values([100.0; 10]);
        for _ in 0..100 {
            let child = Traits::inherit(&a, &a, 20.0, &mut rng);
            assert!(child
                .values()
                .iter()
                .all(|&v| (TRAIT_MIN..=TRAIT_MAX).contains(&v)));
        }
    }
}
