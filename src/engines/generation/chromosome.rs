use super::cistron_spec::CistronSpec;
use super::nature::Nature;
use super::operators::{crossover_count, sample_count, unique_sorted_indices, MutationParameters};
use super::seeding;
use crate::decoders::DeferredDecode;
use crate::encoding::BitBuffer;
use crate::error::{CistronError, Result};
use crate::types::Allele;
use rand::Rng;
use std::fmt;
use std::iter;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A homologous set of chromosomes: one strand for haploid genomes, a pair
/// for diploid ones.
pub trait Ploidy: Clone + Send + Sync + Sized + 'static {
    /// Number of strands in the set.
    const COUNT: usize;

    fn nature(&self) -> &Arc<Nature>;

    /// Length in bits of the longest strand.
    fn length(&self) -> u64;

    fn strands(&self) -> Vec<&BitBuffer>;

    /// Locates every cistron on every strand and freezes the strands.
    fn find_cistrons(&self) -> Result<Vec<FoundCistron<'_>>>;

    fn reproduce<R: Rng + ?Sized>(&self, params: &MutationParameters, rng: &mut R) -> Self;

    fn reproduce_with<R: Rng + ?Sized>(
        &self,
        mate: &Self,
        params: &MutationParameters,
        rng: &mut R,
    ) -> Self;

    fn random<R: Rng + ?Sized>(nature: &Arc<Nature>, rng: &mut R) -> Self;
}

/// A located cistron whose decode has not run yet.
pub struct FoundCistron<'a> {
    pub spec_index: usize,
    pub decode: DeferredDecode<'a>,
}

impl fmt::Debug for FoundCistron<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoundCistron")
            .field("spec_index", &self.spec_index)
            .finish_non_exhaustive()
    }
}

/// One packed strand of genetic material.
///
/// A chromosome is frozen the first time its cistrons are located; from then
/// on its decoded values may be cached by the owning genome and it must not
/// be mutated. Clones start unfrozen.
pub struct Chromosome {
    nature: Arc<Nature>,
    data: BitBuffer,
    frozen: AtomicBool,
}

impl Clone for Chromosome {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.nature), self.data.clone())
    }
}

impl fmt::Debug for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chromosome")
            .field("len", &self.data.len())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

fn check_length(spec: &CistronSpec, range: &Range<u64>) -> Result<()> {
    let length = range.end - range.start;
    let decoder = spec.decoder();
    if length < decoder.min_bit_count() {
        return Err(CistronError::inviable(format!(
            "cistron {} too short: {} < {} bits",
            spec.allele(),
            length,
            decoder.min_bit_count()
        )));
    }
    if length > decoder.max_bit_count() {
        return Err(CistronError::inviable(format!(
            "cistron {} too long: {} > {} bits",
            spec.allele(),
            length,
            decoder.max_bit_count()
        )));
    }
    Ok(())
}

impl Chromosome {
    pub fn new(nature: Arc<Nature>, data: BitBuffer) -> Self {
        Self {
            nature,
            data,
            frozen: AtomicBool::new(false),
        }
    }

    pub fn nature(&self) -> &Arc<Nature> {
        &self.nature
    }

    pub fn data(&self) -> &BitBuffer {
        &self.data
    }

    pub fn len(&self) -> u64 {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Alleles of the recognised cistrons, in bit order.
    pub fn alleles(&self) -> Vec<Allele> {
        self.nature
            .find_all_cistrons(&self.data)
            .map(|cistron| cistron.spec.allele())
            .collect()
    }

    pub fn find_cistrons(&self) -> Result<Vec<FoundCistron<'_>>> {
        self.frozen.store(true, Ordering::Release);

        let mut found = Vec::new();
        for cistron in self.nature.find_all_cistrons(&self.data) {
            let spec = Arc::clone(cistron.spec);
            if cistron.implicit_stop && !spec.decoder().implicit_stop_allowed() {
                return Err(CistronError::inviable(format!(
                    "cistron {} runs to the end of the chromosome without a stop codon",
                    spec.allele()
                )));
            }
            if !spec.tolerates_invalid_cistrons() {
                check_length(&spec, &cistron.range)?;
            }

            let data = &self.data;
            let range = cistron.range;
            found.push(FoundCistron {
                spec_index: cistron.spec_index,
                decode: Box::new(move || {
                    check_length(&spec, &range)?;
                    let mut reader = data.reader_for(range);
                    spec.decoder().decode_value(&mut reader)
                }),
            });
        }
        Ok(found)
    }

    /// Flips bits, then inserts bits, then removes bits, with counts drawn
    /// from `params` and floored by the nature's minimums.
    pub fn mutate<R: Rng + ?Sized>(&mut self, params: &MutationParameters, rng: &mut R) {
        assert!(!self.is_frozen(), "cannot mutate a frozen chromosome");
        let config = self.nature.config();

        let flips = sample_count(
            params.mutation_rate,
            params.mutation_rate_std_dev,
            self.len(),
            config.minimum_mutations_per_offspring,
            rng,
        );
        for index in unique_sorted_indices(flips, self.len(), rng) {
            self.data.flip(index);
        }

        let insertions = sample_count(
            params.insertion_rate,
            params.insertion_rate_std_dev,
            self.len(),
            config.minimum_insertions_per_offspring,
            rng,
        );
        // the end of the strand is a valid insertion point
        let positions = unique_sorted_indices(insertions, self.len() + 1, rng);
        let bits: Vec<bool> = positions.iter().map(|_| rng.gen()).collect();
        self.data.insert_bits(&positions, &bits);

        let removals = sample_count(
            params.removal_rate,
            params.removal_rate_std_dev,
            self.len(),
            config.minimum_removals_per_offspring,
            rng,
        );
        let positions = unique_sorted_indices(removals, self.len(), rng);
        self.data.remove_bits(&positions);
    }

    /// Builds an offspring by alternating segments of `self` and `mate`
    /// between randomly drawn split points.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        mate: &Chromosome,
        cumulative_crossover: &[f64],
        rng: &mut R,
    ) -> Chromosome {
        assert!(
            Arc::ptr_eq(&self.nature, &mate.nature),
            "crossover between chromosomes of different natures"
        );

        let count = crossover_count(cumulative_crossover, rng);
        let splits = unique_sorted_indices(count, self.len().min(mate.len()), rng);
        let start_side = rng.gen_range(0..2usize);
        let ends_on_self = (start_side == 0) == (splits.len() % 2 == 0);
        let length = if ends_on_self { self.len() } else { mate.len() };

        let mut data = BitBuffer::zeros(length);
        let mut side = start_side;
        let mut from = 0;
        for to in splits.into_iter().chain(iter::once(length)) {
            let source = if side == 0 { &self.data } else { &mate.data };
            source.copy_range_to(&mut data, from, to - from, from);
            from = to;
            side = 1 - side;
        }
        Chromosome::new(Arc::clone(&self.nature), data)
    }
}

impl Ploidy for Chromosome {
    const COUNT: usize = 1;

    fn nature(&self) -> &Arc<Nature> {
        &self.nature
    }

    fn length(&self) -> u64 {
        self.len()
    }

    fn strands(&self) -> Vec<&BitBuffer> {
        vec![&self.data]
    }

    fn find_cistrons(&self) -> Result<Vec<FoundCistron<'_>>> {
        Chromosome::find_cistrons(self)
    }

    fn reproduce<R: Rng + ?Sized>(&self, params: &MutationParameters, rng: &mut R) -> Self {
        let mut offspring = self.clone();
        offspring.mutate(params, rng);
        offspring
    }

    fn reproduce_with<R: Rng + ?Sized>(
        &self,
        mate: &Self,
        params: &MutationParameters,
        rng: &mut R,
    ) -> Self {
        let mut offspring = self.crossover(mate, &params.cumulative_crossover, rng);
        offspring.mutate(params, rng);
        offspring
    }

    fn random<R: Rng + ?Sized>(nature: &Arc<Nature>, rng: &mut R) -> Self {
        seeding::random_chromosome(nature, rng)
    }
}
