use cistron::config::NatureConfig;
use cistron::decoders::{ByteDecoder, Decoder, FirstViable, IntegerDecoder};
use cistron::encoding::{BitBuffer, BitReader};
use cistron::engines::generation::{Chromosome, CistronSpec, Nature};
use cistron::error::Result;
use cistron::types::{Allele, Value};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

const BYTE: Allele = Allele::Custom(300);
const WORD: Allele = Allele::Custom(301);
const TAIL: Allele = Allele::Custom(302);

/// Counts the set bits of whatever payload it is given
struct OnesCounter;

impl Decoder for OnesCounter {
    type Output = i64;

    fn decode(&self, reader: &mut BitReader<'_>) -> Result<i64> {
        let mut ones = 0;
        while reader.remaining_length() > 0 {
            ones += reader.read_bit()? as i64;
        }
        Ok(ones)
    }

    fn min_bit_count(&self) -> u64 {
        0
    }

    fn max_bit_count(&self) -> u64 {
        u64::MAX
    }
}

fn create_nature(seed: u64) -> Arc<Nature> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let specs = vec![
        CistronSpec::new(BYTE, ByteDecoder),
        CistronSpec::new(WORD, IntegerDecoder::new(12).unwrap()).optional(),
        CistronSpec::new(TAIL, OnesCounter).optional(),
    ];
    Nature::new(specs, NatureConfig::default(), &mut rng).unwrap()
}

fn payload(value: u64, width: u32) -> BitBuffer {
    BitBuffer::from_value(value, width)
}

#[test]
fn test_single_cistron_range_excludes_codons() {
    let nature = create_nature(1);
    let data = nature.wrap_cistron(0, &payload(0xA7, 8));

    let matches: Vec<_> = nature.find_all_codons(&data).collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].start_codon, nature.start_codon_of(0));
    assert_eq!(matches[0].range, 16..24);
    assert!(!matches[0].implicit_stop);
}

#[test]
fn test_cistrons_are_found_in_bit_order() {
    let nature = create_nature(2);
    let mut data = BitBuffer::zeros(5);
    data.append(&nature.wrap_cistron(1, &payload(0x5A5, 12)));
    data.append(&BitBuffer::zeros(3));
    data.append(&nature.wrap_cistron(0, &payload(0xFF, 8)));

    let found: Vec<_> = nature
        .find_all_cistrons(&data)
        .map(|c| (c.spec.allele(), c.range))
        .collect();

    let second_start = 5 + 16 + 12 + 16 + 3 + 16;
    assert_eq!(
        found,
        vec![(WORD, 21..33), (BYTE, second_start..second_start + 8)]
    );
}

#[test]
fn test_scanning_is_idempotent() {
    let nature = create_nature(3);
    let mut rng = ChaCha8Rng::seed_from_u64(33);
    let chromosome = cistron::engines::generation::seeding::random_chromosome(&nature, &mut rng);

    let scan = |data: &BitBuffer| -> Vec<_> {
        nature
            .find_all_cistrons(data)
            .map(|c| (c.spec_index, c.range, c.implicit_stop))
            .collect()
    };
    let first = scan(chromosome.data());
    let second = scan(chromosome.data());
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_missing_stop_codon_runs_to_end() {
    let nature = create_nature(4);
    let mut data = BitBuffer::from_value(nature.start_codon_of(0), 16);
    data.append(&payload(0xFF, 8));

    let matches: Vec<_> = nature.find_all_codons(&data).collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].range, 16..24);
    assert!(matches[0].implicit_stop);
}

#[test]
fn test_implicit_stop_is_inviable_for_bounded_decoder() {
    let nature = create_nature(5);
    let mut data = BitBuffer::from_value(nature.start_codon_of(0), 16);
    data.append(&payload(0xFF, 8));

    let chromosome = Chromosome::new(Arc::clone(&nature), data);
    let error = chromosome.find_cistrons().unwrap_err();
    assert!(error.is_inviable(), "unexpected error {:?}", error);
}

#[test]
fn test_implicit_stop_is_accepted_for_unbounded_decoder() {
    let nature = create_nature(6);
    let mut data = nature.wrap_cistron(0, &payload(0x0F, 8));
    data.append(&BitBuffer::from_value(nature.start_codon_of(2), 16));
    data.append(&payload(0b1101_1111, 8));

    let chromosome = Chromosome::new(Arc::clone(&nature), data);
    let found = chromosome.find_cistrons().unwrap();
    assert_eq!(found.len(), 2);

    let mut values = Vec::new();
    for cistron in found {
        values.push((cistron.spec_index, (cistron.decode)().unwrap()));
    }
    assert_eq!(values[1], (2, Value::Integer(7)));
}

#[test]
fn test_wrong_length_is_inviable_at_scan_time() {
    let nature = create_nature(7);
    let data = nature.wrap_cistron(0, &payload(0x3, 4));

    let chromosome = Chromosome::new(Arc::clone(&nature), data);
    let error = chromosome.find_cistrons().unwrap_err();
    assert!(error.is_inviable());
}

#[test]
fn test_tolerant_merger_defers_length_check_to_decode() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let specs = vec![CistronSpec::new(BYTE, ByteDecoder).with_merger(FirstViable)];
    let nature = Nature::new(specs, NatureConfig::default(), &mut rng).unwrap();
    let data = nature.wrap_cistron(0, &payload(0x3, 4));

    let chromosome = Chromosome::new(Arc::clone(&nature), data);
    let found = chromosome.find_cistrons().unwrap();
    assert_eq!(found.len(), 1);
    let error = found.into_iter().next().map(|c| (c.decode)()).unwrap().unwrap_err();
    assert!(error.is_inviable());
}

#[test]
fn test_duplicate_alleles_are_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let specs = vec![
        CistronSpec::new(BYTE, ByteDecoder),
        CistronSpec::new(BYTE, ByteDecoder),
    ];
    assert!(Nature::new(specs, NatureConfig::default(), &mut rng).is_err());
}

#[test]
fn test_start_codons_are_unique_and_avoid_stop_codon() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let specs = (0..40)
        .map(|i| CistronSpec::new(Allele::Custom(500 + i), ByteDecoder))
        .collect();
    let config = NatureConfig {
        start_codon_bit_count: 6,
        ..NatureConfig::default()
    };
    let nature = Nature::new(specs, config, &mut rng).unwrap();

    let mut codons = nature.start_codons().to_vec();
    codons.sort_unstable();
    codons.dedup();
    assert_eq!(codons.len(), 40);
    assert!(codons.iter().all(|&c| c > 0 && c < 64 && c != nature.stop_codon()));
}

#[test]
fn test_codon_space_exhaustion_is_a_schema_error() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let specs = (0..4)
        .map(|i| CistronSpec::new(Allele::Custom(500 + i), ByteDecoder))
        .collect();
    let config = NatureConfig {
        start_codon_bit_count: 2,
        ..NatureConfig::default()
    };
    assert!(Nature::new(specs, config, &mut rng).is_err());
}

#[test]
fn test_codon_one_is_usable_when_not_the_stop_codon() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let specs = (0..2)
        .map(|i| CistronSpec::new(Allele::Custom(500 + i), ByteDecoder))
        .collect();
    let config = NatureConfig {
        start_codon_bit_count: 2,
        stop_codon: 3,
        ..NatureConfig::default()
    };
    let nature = Nature::new(specs, config, &mut rng).unwrap();

    let mut codons = nature.start_codons().to_vec();
    codons.sort_unstable();
    assert_eq!(codons, vec![1, 2]);
}
