use super::cistron_spec::*;
use crate::error::{CistronError, Result};
use crate::types::{Allele, Value};
use rand::seq::index::sample;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Reproduction rates decoded from a parent genome's meta cistrons.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationParameters {
    pub mutation_rate: f64,
    pub mutation_rate_std_dev: f64,
    pub insertion_rate: f64,
    pub insertion_rate_std_dev: f64,
    pub removal_rate: f64,
    pub removal_rate_std_dev: f64,
    /// Cumulative probabilities of 0, 1, 2, ... crossover points.
    pub cumulative_crossover: Vec<f64>,
}

impl Default for MutationParameters {
    fn default() -> Self {
        Self {
            mutation_rate: DEFAULT_MUTATION_RATE,
            mutation_rate_std_dev: DEFAULT_MUTATION_RATE_STD_DEV,
            insertion_rate: DEFAULT_BIT_INSERTION_RATE,
            insertion_rate_std_dev: DEFAULT_BIT_INSERTION_RATE_STD_DEV,
            removal_rate: DEFAULT_BIT_REMOVAL_RATE,
            removal_rate_std_dev: DEFAULT_BIT_REMOVAL_RATE_STD_DEV,
            cumulative_crossover: default_cumulative_crossover(),
        }
    }
}

pub fn default_cumulative_crossover() -> Vec<f64> {
    let mut running = 0.0;
    DEFAULT_CROSSOVER_WEIGHTS
        .iter()
        .map(|w| {
            running += w;
            running
        })
        .collect()
}

impl MutationParameters {
    /// All rates zero and no crossover.
    pub fn none() -> Self {
        Self {
            mutation_rate: 0.0,
            mutation_rate_std_dev: 0.0,
            insertion_rate: 0.0,
            insertion_rate_std_dev: 0.0,
            removal_rate: 0.0,
            removal_rate_std_dev: 0.0,
            cumulative_crossover: vec![1.0],
        }
    }

    /// Resolves every rate through `lookup`, falling back to the built-in
    /// default for alleles the genome does not carry.
    pub fn from_lookup<'v, F>(mut lookup: F) -> Result<Self>
    where
        F: FnMut(Allele) -> Result<Option<&'v Value>>,
    {
        let mut float = |allele: Allele, default: f64| -> Result<f64> {
            match lookup(allele)? {
                None => Ok(default),
                Some(value) => value.as_f64().ok_or_else(|| {
                    CistronError::Decode(format!("{} decoded to non-numeric {:?}", allele, value))
                }),
            }
        };

        let mutation_rate = float(Allele::BitMutationRate, DEFAULT_MUTATION_RATE)?;
        let mutation_rate_std_dev = float(Allele::BitMutationRateStdDev, DEFAULT_MUTATION_RATE_STD_DEV)?;
        let insertion_rate = float(Allele::BitInsertionRate, DEFAULT_BIT_INSERTION_RATE)?;
        let insertion_rate_std_dev = float(Allele::BitInsertionRateStdDev, DEFAULT_BIT_INSERTION_RATE_STD_DEV)?;
        let removal_rate = float(Allele::BitRemovalRate, DEFAULT_BIT_REMOVAL_RATE)?;
        let removal_rate_std_dev = float(Allele::BitRemovalRateStdDev, DEFAULT_BIT_REMOVAL_RATE_STD_DEV)?;
        drop(float);

        let cumulative_crossover = match lookup(Allele::CrossoverRate)? {
            None => default_cumulative_crossover(),
            Some(value) => value
                .as_float_list()
                .map(<[f64]>::to_vec)
                .ok_or_else(|| {
                    CistronError::Decode(format!(
                        "{} decoded to non-list {:?}",
                        Allele::CrossoverRate,
                        value
                    ))
                })?,
        };

        Ok(Self {
            mutation_rate,
            mutation_rate_std_dev,
            insertion_rate,
            insertion_rate_std_dev,
            removal_rate,
            removal_rate_std_dev,
            cumulative_crossover,
        })
    }
}

/// Draws an event count from `N(rate * length, std_dev * length)`,
/// truncated toward zero and floored at `minimum`.
pub fn sample_count<R: Rng + ?Sized>(
    rate: f64,
    std_dev: f64,
    length: u64,
    minimum: usize,
    rng: &mut R,
) -> usize {
    let mean = rate * length as f64;
    let sigma = std_dev * length as f64;
    let drawn = if sigma > 0.0 && sigma.is_finite() {
        match Normal::new(mean, sigma) {
            Ok(normal) => normal.sample(rng),
            Err(_) => mean,
        }
    } else {
        mean
    };
    let count = if drawn.is_finite() && drawn > 0.0 {
        drawn as usize
    } else {
        0
    };
    count.max(minimum)
}

/// `count` unique indices drawn uniformly from `[0, upper)`, ascending.
/// The count is clamped to `upper`.
pub fn unique_sorted_indices<R: Rng + ?Sized>(count: usize, upper: u64, rng: &mut R) -> Vec<u64> {
    let count = count.min(upper as usize);
    if count == 0 {
        return Vec::new();
    }
    let mut indices: Vec<u64> = sample(rng, upper as usize, count)
        .into_iter()
        .map(|i| i as u64)
        .collect();
    indices.sort_unstable();
    indices
}

/// Number of cumulative thresholds a uniform draw exceeds.
pub fn crossover_count<R: Rng + ?Sized>(cumulative: &[f64], rng: &mut R) -> usize {
    let u: f64 = rng.gen();
    cumulative.iter().filter(|&&threshold| u > threshold).count()
}

/// Inverse CDF of a linearly decaying density on `[-1, 1]` (slope -1).
pub fn linear_decay_draw(u: f64) -> f64 {
    const ALPHA: f64 = -1.0;
    ((ALPHA * ALPHA - 2.0 * ALPHA + 4.0 * ALPHA * u + 1.0).max(0.0).sqrt() - 1.0) / ALPHA
}

/// Index into a population sorted best-first; low indices are favoured.
pub fn draw_mating_index<R: Rng + ?Sized>(population_size: usize, rng: &mut R) -> usize {
    let u: f64 = rng.gen();
    let p = (linear_decay_draw(u) + 1.0) / 2.0;
    ((p * population_size as f64) as usize).min(population_size - 1)
}

/// Two distinct indices drawn with [`draw_mating_index`].
pub fn draw_mating_pair<R: Rng + ?Sized>(population_size: usize, rng: &mut R) -> (usize, usize) {
    assert!(population_size >= 3, "mating needs a population of at least 3");
    let first = draw_mating_index(population_size, rng);
    let mut second = first;
    while second == first {
        second = draw_mating_index(population_size, rng);
    }
    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_linear_decay_draw_spans_domain() {
        assert!((linear_decay_draw(0.0) + 1.0).abs() < 1e-12);
        assert!((linear_decay_draw(1.0) - 1.0).abs() < 1e-12);
        assert!(linear_decay_draw(0.5) < 0.0);
    }

    #[test]
    fn test_mating_index_prefers_top_ranks() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let size = 10;
        let mut counts = vec![0usize; size];
        for _ in 0..20_000 {
            counts[draw_mating_index(size, &mut rng)] += 1;
        }
        assert!(counts[0] > counts[size / 2]);
        assert!(counts[size / 2] > counts[size - 1]);
    }

    #[test]
    fn test_crossover_count_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cumulative = default_cumulative_crossover();
        for _ in 0..1000 {
            assert!(crossover_count(&cumulative, &mut rng) <= 2);
        }
        assert_eq!(crossover_count(&[1.0], &mut rng), 0);
    }

    #[test]
    fn test_sample_count_respects_floor() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(sample_count(0.0, 0.0, 100, 3, &mut rng), 3);
        assert_eq!(sample_count(0.5, 0.0, 2, 0, &mut rng), 1);
        assert_eq!(sample_count(-1.0, 0.0, 10, 0, &mut rng), 0);
    }

    #[test]
    fn test_unique_sorted_indices_clamps() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let indices = unique_sorted_indices(50, 10, &mut rng);
        assert_eq!(indices, (0..10).collect::<Vec<u64>>());
        assert!(unique_sorted_indices(3, 0, &mut rng).is_empty());
    }
}
