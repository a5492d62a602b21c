use cistron::config::NatureConfig;
use cistron::encoding::BitBuffer;
use cistron::engines::generation::{Chromosome, MutationParameters, Nature};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Nature without specs or rate floors, so only the given rates act
fn bare_nature(seed: u64) -> Arc<Nature> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Nature::new(Vec::new(), NatureConfig::without_minimums(), &mut rng).unwrap()
}

fn random_chromosome(nature: &Arc<Nature>, len: u64, rng: &mut ChaCha8Rng) -> Chromosome {
    Chromosome::new(Arc::clone(nature), BitBuffer::random(len, rng))
}

fn structural_only(insertion_rate: f64, removal_rate: f64) -> MutationParameters {
    MutationParameters {
        insertion_rate,
        removal_rate,
        ..MutationParameters::none()
    }
}

proptest! {
    #[test]
    fn prop_buffer_length_after_insertions_and_removals(
        len in 0u64..400,
        insertions in prop::collection::btree_set(0u64..400, 0..40),
        removals in prop::collection::btree_set(0u64..440, 0..40),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut buffer = BitBuffer::random(len, &mut rng);

        let positions: Vec<u64> = insertions.into_iter().filter(|&p| p <= len).collect();
        let bits: Vec<bool> = positions.iter().map(|p| p % 3 == 0).collect();
        buffer.insert_bits(&positions, &bits);
        let grown = len + positions.len() as u64;
        prop_assert_eq!(buffer.len(), grown);

        let removed: Vec<u64> = removals.into_iter().filter(|&p| p < grown).collect();
        buffer.remove_bits(&removed);
        prop_assert_eq!(buffer.len(), len + positions.len() as u64 - removed.len() as u64);
    }

    #[test]
    fn prop_mutation_changes_length_by_insertions_minus_removals(
        len in 1u64..300,
        insertion_rate in 0.0f64..0.5,
        removal_rate in 0.0f64..0.5,
        seed in any::<u64>(),
    ) {
        let nature = bare_nature(1);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut chromosome = random_chromosome(&nature, len, &mut rng);

        chromosome.mutate(&structural_only(insertion_rate, removal_rate), &mut rng);

        let inserted = (insertion_rate * len as f64) as u64;
        let grown = len + inserted;
        let removed = ((removal_rate * grown as f64) as u64).min(grown);
        prop_assert_eq!(chromosome.len(), grown - removed);
    }

    #[test]
    fn prop_crossover_length_is_a_parent_length(
        len_a in 0u64..300,
        len_b in 0u64..300,
        seed in any::<u64>(),
    ) {
        let nature = bare_nature(2);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let a = random_chromosome(&nature, len_a, &mut rng);
        let b = random_chromosome(&nature, len_b, &mut rng);

        // Two crossover points whenever the draw is above zero
        let offspring = a.crossover(&b, &[0.0, 0.0, 1.0], &mut rng);
        prop_assert!(offspring.len() == len_a || offspring.len() == len_b);

        let shared = len_a.min(len_b);
        for i in 0..shared.min(offspring.len()) {
            let bit = offspring.data().get(i);
            prop_assert!(bit == a.data().get(i) || bit == b.data().get(i));
        }
    }

    #[test]
    fn prop_crossover_without_points_copies_a_parent(
        len in 1u64..300,
        seed in any::<u64>(),
    ) {
        let nature = bare_nature(3);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let a = random_chromosome(&nature, len, &mut rng);
        let b = random_chromosome(&nature, len, &mut rng);

        let offspring = a.crossover(&b, &[1.0], &mut rng);
        prop_assert!(offspring.data() == a.data() || offspring.data() == b.data());
    }
}

#[test]
fn test_single_point_crossover_joins_prefix_and_suffix() {
    let nature = bare_nature(4);
    let mut rng = ChaCha8Rng::seed_from_u64(44);
    let a = Chromosome::new(Arc::clone(&nature), BitBuffer::zeros(64));
    let b = Chromosome::new(Arc::clone(&nature), BitBuffer::from_words(vec![u64::MAX], 64));

    for _ in 0..50 {
        // Exactly one point unless the draw is exactly zero
        let offspring = a.crossover(&b, &[0.0, 1.0], &mut rng);
        let bits: Vec<bool> = offspring.data().iter().collect();
        let switches = bits.windows(2).filter(|w| w[0] != w[1]).count();
        assert!(switches <= 1, "more than one switch in {}", offspring.data());
    }
}

#[test]
fn test_flip_mutation_keeps_length() {
    let nature = bare_nature(5);
    let mut rng = ChaCha8Rng::seed_from_u64(55);
    let original = random_chromosome(&nature, 200, &mut rng);
    let mut mutated = original.clone();

    let params = MutationParameters {
        mutation_rate: 0.05,
        ..MutationParameters::none()
    };
    mutated.mutate(&params, &mut rng);

    assert_eq!(mutated.len(), 200);
    let differences = original
        .data()
        .iter()
        .zip(mutated.data().iter())
        .filter(|(x, y)| x != y)
        .count();
    assert_eq!(differences, 10);
}

#[test]
fn test_minimum_counts_apply_without_rates() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let config = NatureConfig {
        minimum_insertions_per_offspring: 3,
        minimum_removals_per_offspring: 1,
        minimum_mutations_per_offspring: 0,
        ..NatureConfig::default()
    };
    let nature = Nature::new(Vec::new(), config, &mut rng).unwrap();
    let mut chromosome = random_chromosome(&nature, 50, &mut rng);

    chromosome.mutate(&MutationParameters::none(), &mut rng);
    assert_eq!(chromosome.len(), 52);
}

#[test]
fn test_insertion_at_end_of_two_bit_chromosome() {
    println!("\n=== Insertion at the chromosome boundary ===");

    let nature = bare_nature(7);
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let original = BitBuffer::from_bits(&[true, false]);
    let params = structural_only(0.5, 0.0);

    // [1, 0, 1] can only come from appending a set bit after the original two
    let appended = BitBuffer::from_bits(&[true, false, true]);
    let mut observed = 0;
    for trial in 0..200 {
        let mut chromosome = Chromosome::new(Arc::clone(&nature), original.clone());
        chromosome.mutate(&params, &mut rng);
        assert_eq!(chromosome.len(), 3, "trial {} did not insert exactly one bit", trial);

        if chromosome.data() == &appended {
            observed += 1;
        }
    }

    println!("✓ Bit appended at the end in {}/200 trials", observed);
    assert!(observed > 0, "no trial inserted at the end");
}

#[test]
fn test_reproduce_leaves_parent_untouched() {
    use cistron::engines::generation::Ploidy;

    let nature = bare_nature(8);
    let mut rng = ChaCha8Rng::seed_from_u64(88);
    let parent = random_chromosome(&nature, 128, &mut rng);
    let snapshot = parent.data().clone();

    let child = parent.reproduce(&MutationParameters::default(), &mut rng);
    assert_eq!(parent.data(), &snapshot);
    assert!(!child.is_frozen());
}
