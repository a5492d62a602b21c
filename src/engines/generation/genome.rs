use super::chromosome::{Chromosome, Ploidy};
use super::diploid::DiploidChromosome;
use super::nature::Nature;
use super::operators::MutationParameters;
use crate::decoders::DeferredDecode;
use crate::error::{CistronError, Result};
use crate::types::{Allele, Value};
use rand::Rng;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// The heritable material of one individual: a list of homologous sets all
/// built under the same [`Nature`].
///
/// Decoded values are computed on the first successful [`Genome::interpret`]
/// and cached; the chromosomes are frozen from then on.
pub struct Genome<P: Ploidy> {
    nature: Arc<Nature>,
    chromosomes: Vec<P>,
    interpretations: OnceLock<Vec<Option<Value>>>,
}

pub type HaploidGenome = Genome<Chromosome>;
pub type DiploidGenome = Genome<DiploidChromosome>;

impl<P: Ploidy> Clone for Genome<P> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.nature), self.chromosomes.clone())
    }
}

impl<P: Ploidy + fmt::Debug> fmt::Debug for Genome<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Genome")
            .field("chromosomes", &self.chromosomes)
            .field("interpreted", &self.interpretations.get().is_some())
            .finish()
    }
}

impl<P: Ploidy> Genome<P> {
    pub fn new(nature: Arc<Nature>, chromosomes: Vec<P>) -> Self {
        assert!(
            chromosomes.iter().all(|c| Arc::ptr_eq(c.nature(), &nature)),
            "genome built from chromosomes of a different nature"
        );
        Self {
            nature,
            chromosomes,
            interpretations: OnceLock::new(),
        }
    }

    pub fn random<R: Rng + ?Sized>(nature: &Arc<Nature>, rng: &mut R) -> Self {
        Self::new(Arc::clone(nature), vec![P::random(nature, rng)])
    }

    pub fn nature(&self) -> &Arc<Nature> {
        &self.nature
    }

    pub fn chromosomes(&self) -> &[P] {
        &self.chromosomes
    }

    /// Length of the longest strand.
    pub fn max_length(&self) -> u64 {
        self.chromosomes.iter().map(Ploidy::length).max().unwrap_or(0)
    }

    /// One deferred decode per spec, duplicates merged.
    fn interpreters(&self) -> Result<Vec<Option<DeferredDecode<'_>>>> {
        let specs = self.nature.specs();
        let mut interpreters: Vec<Option<DeferredDecode<'_>>> =
            specs.iter().map(|_| None).collect();

        for chromosome in &self.chromosomes {
            for found in chromosome.find_cistrons()? {
                let slot = &mut interpreters[found.spec_index];
                *slot = match slot.take() {
                    None => Some(found.decode),
                    Some(previous) => {
                        let spec = &specs[found.spec_index];
                        let merger = spec.merger().ok_or_else(|| {
                            CistronError::inviable(format!(
                                "multiple cistrons of unmergeable {}",
                                spec.allele()
                            ))
                        })?;
                        Some(merger.merge(previous, found.decode))
                    }
                };
            }
        }

        for (spec, interpreter) in specs.iter().zip(&interpreters) {
            if spec.is_required() && interpreter.is_none() {
                return Err(CistronError::inviable(format!(
                    "required cistron {} not present",
                    spec.allele()
                )));
            }
        }
        Ok(interpreters)
    }

    /// Decoded value per spec, in registration order.
    pub fn interpret(&self) -> Result<&[Option<Value>]> {
        if let Some(values) = self.interpretations.get() {
            return Ok(values);
        }

        let values = self
            .interpreters()?
            .into_iter()
            .map(|interpreter| interpreter.map(|decode| decode()).transpose())
            .collect::<Result<Vec<_>>>()?;

        Ok(self.interpretations.get_or_init(|| values))
    }

    /// The decoded value of `allele`, or `None` when the nature has no such
    /// spec or the genome carries no cistron for it.
    pub fn value_of(&self, allele: Allele) -> Result<Option<&Value>> {
        let Some(index) = self.nature.spec_index_of(allele) else {
            return Ok(None);
        };
        Ok(self.interpret()?[index].as_ref())
    }

    pub fn mutation_parameters(&self) -> Result<MutationParameters> {
        MutationParameters::from_lookup(|allele| self.value_of(allele))
    }

    /// An offspring of this genome alone, mutated with rates read from this
    /// genome's own meta cistrons.
    pub fn reproduce<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Genome<P>> {
        let params = self.mutation_parameters()?;
        let chromosomes = self
            .chromosomes
            .iter()
            .map(|c| c.reproduce(&params, rng))
            .collect();
        Ok(Genome::new(Arc::clone(&self.nature), chromosomes))
    }

    /// An offspring of this genome and `mate`. Rates come from this genome.
    pub fn reproduce_with<R: Rng + ?Sized>(&self, mate: &Genome<P>, rng: &mut R) -> Result<Genome<P>> {
        assert!(
            Arc::ptr_eq(&self.nature, &mate.nature),
            "mating genomes of different natures"
        );
        let params = self.mutation_parameters()?;
        let chromosomes = self
            .chromosomes
            .iter()
            .zip(&mate.chromosomes)
            .map(|(own, other)| own.reproduce_with(other, &params, rng))
            .collect();
        Ok(Genome::new(Arc::clone(&self.nature), chromosomes))
    }
}
