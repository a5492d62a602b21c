//! Random construction of chromosomes for the initial population and for
//! fresh injections.

use super::chromosome::Chromosome;
use super::diploid::DiploidChromosome;
use super::genome::{DiploidGenome, HaploidGenome};
use super::nature::Nature;
use crate::encoding::BitBuffer;
use crate::types::Allele;
use rand::Rng;
use std::sync::Arc;

/// One encoded cistron (codons included) for the spec at `spec_index`.
///
/// Uses the decoder's initial encoding when it has one; otherwise draws a
/// random payload of `min + U[0, min(max - min, cap)]` bits.
pub fn random_cistron<R: Rng + ?Sized>(nature: &Nature, spec_index: usize, rng: &mut R) -> BitBuffer {
    let decoder = nature.specs()[spec_index].decoder();
    let payload = match decoder.initial_encoded_value() {
        Some(initial) => initial,
        None => {
            let min = decoder.min_bit_count();
            let span = (decoder.max_bit_count() - min).min(nature.config().max_random_cistron_bits);
            let length = min + rng.gen_range(0..=span);
            BitBuffer::random(length, rng)
        }
    };
    nature.wrap_cistron(spec_index, &payload)
}

/// Junk ratio taken from the initial encoding of the junk-ratio spec, if any.
fn initial_junk_ratio(nature: &Nature) -> f64 {
    let Some(spec) = nature.spec_of(Allele::JunkRatio) else {
        return 0.0;
    };
    let Some(initial) = spec.decoder().initial_encoded_value() else {
        return 0.0;
    };
    match spec.decoder().decode_value(&mut initial.reader()) {
        Ok(value) => value.as_f64().unwrap_or(0.0).clamp(0.0, 0.99),
        Err(e) => {
            log::debug!("Junk ratio initial value did not decode: {}", e);
            0.0
        }
    }
}

/// A chromosome holding one cistron per spec, in spec order, scattered
/// through random junk.
pub fn random_chromosome<R: Rng + ?Sized>(nature: &Arc<Nature>, rng: &mut R) -> Chromosome {
    let cistrons: Vec<BitBuffer> = (0..nature.spec_count())
        .map(|index| random_cistron(nature, index, rng))
        .collect();

    let coding_length: u64 = cistrons.iter().map(BitBuffer::len).sum();
    let ratio = initial_junk_ratio(nature);
    let total_length = coding_length.max((coding_length as f64 / (1.0 - ratio)) as u64);
    let junk_length = total_length - coding_length;

    let mut offsets: Vec<u64> = (0..cistrons.len())
        .map(|_| rng.gen_range(0..=junk_length))
        .collect();
    offsets.sort_unstable();

    let mut data = BitBuffer::new();
    let mut junk_written = 0;
    for (offset, cistron) in offsets.into_iter().zip(&cistrons) {
        data.append(&BitBuffer::random(offset - junk_written, rng));
        junk_written = offset;
        data.append(cistron);
    }
    data.append(&BitBuffer::random(junk_length - junk_written, rng));

    Chromosome::new(Arc::clone(nature), data)
}

pub fn random_diploid<R: Rng + ?Sized>(nature: &Arc<Nature>, rng: &mut R) -> DiploidChromosome {
    let a = random_chromosome(nature, rng);
    let b = random_chromosome(nature, rng);
    DiploidChromosome::new(a, b)
}

pub fn create_random_haploid<R: Rng + ?Sized>(nature: &Arc<Nature>, rng: &mut R) -> HaploidGenome {
    HaploidGenome::new(Arc::clone(nature), vec![random_chromosome(nature, rng)])
}

pub fn create_random_diploid<R: Rng + ?Sized>(nature: &Arc<Nature>, rng: &mut R) -> DiploidGenome {
    DiploidGenome::new(Arc::clone(nature), vec![random_diploid(nature, rng)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NatureConfig;
    use crate::decoders::UniformFloatDecoder;
    use crate::engines::generation::CistronSpec;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_chromosome_carries_every_spec() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let specs = vec![CistronSpec::new(
            Allele::Custom(400),
            UniformFloatDecoder::new(0.0, 10.0),
        )];
        let config = NatureConfig {
            start_codon_bit_count: 32,
            ..NatureConfig::default()
        };
        let nature = Nature::with_defaults(specs, config, &mut rng).unwrap();
        let chromosome = random_chromosome(&nature, &mut rng);

        let alleles = chromosome.alleles();
        for spec in nature.specs() {
            assert!(alleles.contains(&spec.allele()), "missing {}", spec.allele());
        }
    }

    #[test]
    fn test_junk_ratio_grows_chromosome() {
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let plain = Nature::new(
            vec![CistronSpec::new(Allele::Custom(400), UniformFloatDecoder::new(0.0, 1.0))],
            NatureConfig::default(),
            &mut rng,
        )
        .unwrap();
        let coding = random_chromosome(&plain, &mut rng).len();
        assert_eq!(coding, 16 + 8 + 16);

        let junky = Nature::new(
            vec![CistronSpec::new(
                Allele::JunkRatio,
                UniformFloatDecoder::new(0.0, 0.9).with_initial(0.5),
            )],
            NatureConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert!(random_chromosome(&junky, &mut rng).len() > 40);
    }
}
