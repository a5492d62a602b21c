use super::chromosome::{Chromosome, FoundCistron, Ploidy};
use super::nature::Nature;
use super::operators::MutationParameters;
use super::seeding;
use crate::encoding::BitBuffer;
use crate::error::Result;
use rand::Rng;
use std::sync::Arc;

/// A homologous pair of chromosomes sharing one nature.
#[derive(Debug, Clone)]
pub struct DiploidChromosome {
    a: Chromosome,
    b: Chromosome,
}

impl DiploidChromosome {
    pub fn new(a: Chromosome, b: Chromosome) -> Self {
        assert!(
            Arc::ptr_eq(a.nature(), b.nature()),
            "diploid pair built from chromosomes of different natures"
        );
        Self { a, b }
    }

    pub fn a(&self) -> &Chromosome {
        &self.a
    }

    pub fn b(&self) -> &Chromosome {
        &self.b
    }

    /// Crosses the pair over against itself and mutates the result.
    fn recombine<R: Rng + ?Sized>(&self, params: &MutationParameters, rng: &mut R) -> Chromosome {
        self.a.reproduce_with(&self.b, params, rng)
    }
}

impl Ploidy for DiploidChromosome {
    const COUNT: usize = 2;

    fn nature(&self) -> &Arc<Nature> {
        self.a.nature()
    }

    fn length(&self) -> u64 {
        self.a.len().max(self.b.len())
    }

    fn strands(&self) -> Vec<&BitBuffer> {
        vec![self.a.data(), self.b.data()]
    }

    fn find_cistrons(&self) -> Result<Vec<FoundCistron<'_>>> {
        let mut found = self.a.find_cistrons()?;
        found.extend(self.b.find_cistrons()?);
        Ok(found)
    }

    fn reproduce<R: Rng + ?Sized>(&self, params: &MutationParameters, rng: &mut R) -> Self {
        log::warn!("Diploid chromosome reproducing with itself");
        self.reproduce_with(self, params, rng)
    }

    /// One strand from each parent, each the product of a crossover within
    /// that parent's pair.
    fn reproduce_with<R: Rng + ?Sized>(
        &self,
        mate: &Self,
        params: &MutationParameters,
        rng: &mut R,
    ) -> Self {
        assert!(
            Arc::ptr_eq(self.nature(), mate.nature()),
            "reproduction between diploids of different natures"
        );
        let a = self.recombine(params, rng);
        let b = mate.recombine(params, rng);
        DiploidChromosome::new(a, b)
    }

    fn random<R: Rng + ?Sized>(nature: &Arc<Nature>, rng: &mut R) -> Self {
        seeding::random_diploid(nature, rng)
    }
}
