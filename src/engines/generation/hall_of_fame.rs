use crate::engines::generation::chromosome::Ploidy;
use crate::engines::generation::genome::Genome;
use crate::encoding::BitBuffer;

use std::collections::HashSet;

#[derive(Clone, Debug)]
pub struct EliteGenome<P: Ploidy> {
    pub genome: Genome<P>,
    pub score: f64,
    pub generation: usize,
    pub signature: Vec<BitBuffer>, // For deduplication
}

impl<P: Ploidy> EliteGenome<P> {
    pub fn new(genome: Genome<P>, score: f64, generation: usize) -> Self {
        let signature = genome_signature(&genome);
        Self {
            genome,
            score,
            generation,
            signature,
        }
    }
}

pub struct HallOfFame<P: Ploidy> {
    genomes: Vec<EliteGenome<P>>,
    max_size: usize,
    seen_signatures: HashSet<Vec<BitBuffer>>,
}

impl<P: Ploidy> HallOfFame<P> {
    pub fn new(max_size: usize) -> Self {
        Self {
            genomes: Vec::new(),
            max_size,
            seen_signatures: HashSet::new(),
        }
    }

    /// Attempt to add a genome to the Hall of Fame
    pub fn try_add(&mut self, elite: EliteGenome<P>) -> bool {
        if self.max_size == 0 || !elite.score.is_finite() {
            return false;
        }
        // Deduplication check
        if self.seen_signatures.contains(&elite.signature) {
            return false;
        }
        // Full and no better than the worst entry
        if self.genomes.len() >= self.max_size
            && self.genomes.last().map_or(false, |worst| elite.score <= worst.score)
        {
            return false;
        }

        self.seen_signatures.insert(elite.signature.clone());
        self.genomes.push(elite);
        self.sort_and_trim();
        true
    }

    fn sort_and_trim(&mut self) {
        // Sort by score (descending); ties keep insertion order
        self.genomes.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.genomes.len() > self.max_size {
            if let Some(removed) = self.genomes.pop() {
                self.seen_signatures.remove(&removed.signature);
            }
        }
    }

    /// Get all elite genomes
    pub fn get_all(&self) -> &[EliteGenome<P>] {
        &self.genomes
    }

    /// Get top N genomes
    pub fn get_top_n(&self, n: usize) -> &[EliteGenome<P>] {
        &self.genomes[..n.min(self.genomes.len())]
    }

    pub fn best(&self) -> Option<&EliteGenome<P>> {
        self.genomes.first()
    }

    /// Filter by minimum score threshold
    pub fn filter_by_threshold(&self, min_score: f64) -> Vec<EliteGenome<P>> {
        self.genomes
            .iter()
            .filter(|e| e.score >= min_score)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }
}

/// Bit contents of every strand, for deduplication
pub fn genome_signature<P: Ploidy>(genome: &Genome<P>) -> Vec<BitBuffer> {
    genome
        .chromosomes()
        .iter()
        .flat_map(|c| c.strands())
        .cloned()
        .collect()
}
