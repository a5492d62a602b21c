use super::cistron_spec::CistronSpec;
use crate::config::{ConfigSection, NatureConfig};
use crate::encoding::{BitBuffer, BitReader};
use crate::error::{CistronError, Result};
use crate::types::Allele;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

/// The shared schema of an evolutionary run: codon widths, the stop codon,
/// the start codon assigned to each cistron spec, and the reproduction floors.
///
/// A `Nature` is immutable once built and shared by reference (`Arc`) between
/// every chromosome and genome of a run. The random generator is not part of
/// it; callers pass their generator explicitly to every operation that draws.
#[derive(Debug)]
pub struct Nature {
    config: NatureConfig,
    specs: Vec<Arc<CistronSpec>>,
    start_codons: Vec<u64>,
    spec_by_codon: HashMap<u64, usize>,
    spec_by_allele: HashMap<Allele, usize>,
}

/// A start codon and the half-open payload range it introduces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonMatch {
    pub start_codon: u64,
    /// Excludes both codons.
    pub range: Range<u64>,
    /// Set when no stop codon followed and the range runs to the end.
    pub implicit_stop: bool,
}

/// A located cistron with its spec resolved.
#[derive(Debug, Clone)]
pub struct CistronMatch<'a> {
    pub spec_index: usize,
    pub spec: &'a Arc<CistronSpec>,
    pub range: Range<u64>,
    pub implicit_stop: bool,
}

impl Nature {
    /// Builds the schema, drawing one unique start codon per spec.
    pub fn new<R: Rng + ?Sized>(
        specs: Vec<CistronSpec>,
        config: NatureConfig,
        rng: &mut R,
    ) -> Result<Arc<Nature>> {
        config.validate()?;

        let mut spec_by_allele = HashMap::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            if spec.decoder().min_bit_count() > spec.decoder().max_bit_count() {
                return Err(CistronError::Schema(format!(
                    "decoder of {} has min bit count above max bit count",
                    spec.allele()
                )));
            }
            if spec_by_allele.insert(spec.allele(), index).is_some() {
                return Err(CistronError::Schema(format!(
                    "allele {} registered more than once",
                    spec.allele()
                )));
            }
        }

        let start_codons = Self::draw_start_codons(specs.len(), &config, rng)?;
        let spec_by_codon = start_codons
            .iter()
            .enumerate()
            .map(|(index, &codon)| (codon, index))
            .collect();

        for (spec, codon) in specs.iter().zip(&start_codons) {
            log::debug!("Assigned start codon {:#x} to {}", codon, spec.allele());
        }

        Ok(Arc::new(Nature {
            config,
            specs: specs.into_iter().map(Arc::new).collect(),
            start_codons,
            spec_by_codon,
            spec_by_allele,
        }))
    }

    /// Like [`Nature::new`], with [`CistronSpec::defaults`] appended for every
    /// allele the caller did not register.
    pub fn with_defaults<R: Rng + ?Sized>(
        mut specs: Vec<CistronSpec>,
        config: NatureConfig,
        rng: &mut R,
    ) -> Result<Arc<Nature>> {
        let present: HashSet<Allele> = specs.iter().map(|s| s.allele()).collect();
        specs.extend(
            CistronSpec::defaults()
                .into_iter()
                .filter(|spec| !present.contains(&spec.allele())),
        );
        Self::new(specs, config, rng)
    }

    fn draw_start_codons<R: Rng + ?Sized>(
        count: usize,
        config: &NatureConfig,
        rng: &mut R,
    ) -> Result<Vec<u64>> {
        let width = config.start_codon_bit_count;
        let max = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        // 0 and the stop codon are never start codons
        let reserved = if config.stop_codon <= max { 1 } else { 0 };
        let available = max.saturating_sub(reserved);
        if (count as u64) > available {
            return Err(CistronError::Schema(format!(
                "{} specs do not fit in {}-bit start codons",
                count, width
            )));
        }

        let mut drawn = HashSet::with_capacity(count);
        let mut codons = Vec::with_capacity(count);
        while codons.len() < count {
            let codon = rng.gen_range(1..=max);
            if codon == config.stop_codon || !drawn.insert(codon) {
                continue;
            }
            codons.push(codon);
        }
        Ok(codons)
    }

    pub fn config(&self) -> &NatureConfig {
        &self.config
    }

    pub fn start_codon_bit_count(&self) -> u32 {
        self.config.start_codon_bit_count
    }

    pub fn stop_codon_bit_count(&self) -> u32 {
        self.config.stop_codon_bit_count
    }

    pub fn stop_codon(&self) -> u64 {
        self.config.stop_codon
    }

    pub fn specs(&self) -> &[Arc<CistronSpec>] {
        &self.specs
    }

    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }

    pub fn start_codons(&self) -> &[u64] {
        &self.start_codons
    }

    pub fn start_codon_of(&self, spec_index: usize) -> u64 {
        self.start_codons[spec_index]
    }

    pub fn spec_for_codon(&self, codon: u64) -> Option<(usize, &Arc<CistronSpec>)> {
        self.spec_by_codon
            .get(&codon)
            .map(|&index| (index, &self.specs[index]))
    }

    pub fn spec_index_of(&self, allele: Allele) -> Option<usize> {
        self.spec_by_allele.get(&allele).copied()
    }

    pub fn spec_of(&self, allele: Allele) -> Option<&Arc<CistronSpec>> {
        self.spec_index_of(allele).map(|index| &self.specs[index])
    }

    /// Surrounds `payload` with the spec's start codon and the stop codon.
    pub fn wrap_cistron(&self, spec_index: usize, payload: &BitBuffer) -> BitBuffer {
        let mut encoded = BitBuffer::from_value(
            self.start_codon_of(spec_index),
            self.start_codon_bit_count(),
        );
        encoded.append(payload);
        encoded.append(&BitBuffer::from_value(
            self.stop_codon(),
            self.stop_codon_bit_count(),
        ));
        encoded
    }

    /// Scans `data` left to right for start codons and their stop codons.
    ///
    /// The returned iterator is lazy; calling this again restarts the scan.
    pub fn find_all_codons<'a>(&'a self, data: &'a BitBuffer) -> CodonScanner<'a> {
        CodonScanner {
            nature: self,
            reader: data.reader(),
            finished: false,
        }
    }

    /// [`find_all_codons`](Self::find_all_codons) with every codon resolved to its spec.
    pub fn find_all_cistrons<'a>(
        &'a self,
        data: &'a BitBuffer,
    ) -> impl Iterator<Item = CistronMatch<'a>> + 'a {
        self.find_all_codons(data).filter_map(move |m| {
            self.spec_for_codon(m.start_codon)
                .map(|(spec_index, spec)| CistronMatch {
                    spec_index,
                    spec,
                    range: m.range,
                    implicit_stop: m.implicit_stop,
                })
        })
    }
}

/// Lazy single pass over a chromosome's codons.
pub struct CodonScanner<'a> {
    nature: &'a Nature,
    reader: BitReader<'a>,
    finished: bool,
}

impl<'a> Iterator for CodonScanner<'a> {
    type Item = CodonMatch;

    fn next(&mut self) -> Option<CodonMatch> {
        if self.finished {
            return None;
        }

        let start_width = self.nature.start_codon_bit_count();
        let stop_width = self.nature.stop_codon_bit_count();

        let Some((codon_start, codon_index)) =
            self.reader
                .find_any(&self.nature.start_codons, start_width, None)
        else {
            self.finished = true;
            return None;
        };

        let start_codon = self.nature.start_codons[codon_index];
        let payload_start = codon_start + start_width as u64;

        match self.reader.find_last_consecutive(
            self.nature.stop_codon(),
            stop_width,
            Some(payload_start),
        ) {
            Some(stop_start) => Some(CodonMatch {
                start_codon,
                range: payload_start..stop_start,
                implicit_stop: false,
            }),
            None => {
                self.finished = true;
                Some(CodonMatch {
                    start_codon,
                    range: payload_start..self.reader.len(),
                    implicit_stop: true,
                })
            }
        }
    }
}
