use crate::decoders::{CistronDecoder, CumulativeWeightsDecoder, MultiCistronMerger, UniformFloatDecoder};
use crate::types::Allele;
use std::fmt;
use std::sync::Arc;

// Fallbacks used when a genome carries no cistron for the corresponding meta allele.
pub const DEFAULT_MUTATION_RATE: f64 = 0.01;
pub const DEFAULT_MUTATION_RATE_STD_DEV: f64 = DEFAULT_MUTATION_RATE / 4.0;
pub const DEFAULT_BIT_INSERTION_RATE: f64 = 0.001;
pub const DEFAULT_BIT_INSERTION_RATE_STD_DEV: f64 = DEFAULT_BIT_INSERTION_RATE;
pub const DEFAULT_BIT_REMOVAL_RATE: f64 = 0.001;
pub const DEFAULT_BIT_REMOVAL_RATE_STD_DEV: f64 = DEFAULT_BIT_REMOVAL_RATE;
/// Probabilities of 0, 1 and 2 crossover points.
pub const DEFAULT_CROSSOVER_WEIGHTS: [f64; 3] = [0.3, 0.5, 0.2];
pub const DEFAULT_JUNK_RATIO: f64 = 0.25;

/// Binds an allele to the decoder of its cistrons.
#[derive(Clone)]
pub struct CistronSpec {
    allele: Allele,
    decoder: Arc<dyn CistronDecoder>,
    required: bool,
    meta: bool,
    merger: Option<Arc<dyn MultiCistronMerger>>,
}

impl CistronSpec {
    /// A required, non-meta spec without a merger.
    pub fn new<D: CistronDecoder + 'static>(allele: Allele, decoder: D) -> Self {
        Self {
            allele,
            decoder: Arc::new(decoder),
            required: true,
            meta: false,
            merger: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_merger<M: MultiCistronMerger + 'static>(mut self, merger: M) -> Self {
        self.merger = Some(Arc::new(merger));
        self
    }

    pub fn allele(&self) -> Allele {
        self.allele
    }

    pub fn decoder(&self) -> &dyn CistronDecoder {
        self.decoder.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_meta(&self) -> bool {
        self.meta
    }

    pub fn merger(&self) -> Option<&dyn MultiCistronMerger> {
        self.merger.as_deref()
    }

    pub fn tolerates_invalid_cistrons(&self) -> bool {
        self.merger
            .as_ref()
            .map_or(false, |m| m.tolerates_invalid_cistrons())
    }

    /// Optional meta specs that tune reproduction of the genome carrying them.
    pub fn defaults() -> Vec<CistronSpec> {
        let rate = |allele, initial| {
            CistronSpec::new(allele, UniformFloatDecoder::new(0.0, 0.05).with_initial(initial))
                .optional()
                .meta()
        };

        vec![
            CistronSpec::new(
                Allele::JunkRatio,
                UniformFloatDecoder::new(0.0, 0.9).with_initial(DEFAULT_JUNK_RATIO),
            )
            .optional()
            .meta(),
            rate(Allele::BitMutationRate, DEFAULT_MUTATION_RATE),
            rate(Allele::BitMutationRateStdDev, DEFAULT_MUTATION_RATE_STD_DEV),
            rate(Allele::BitInsertionRate, DEFAULT_BIT_INSERTION_RATE),
            rate(Allele::BitInsertionRateStdDev, DEFAULT_BIT_INSERTION_RATE_STD_DEV),
            rate(Allele::BitRemovalRate, DEFAULT_BIT_REMOVAL_RATE),
            rate(Allele::BitRemovalRateStdDev, DEFAULT_BIT_REMOVAL_RATE_STD_DEV),
            CistronSpec::new(
                Allele::CrossoverRate,
                CumulativeWeightsDecoder::new(DEFAULT_CROSSOVER_WEIGHTS.len())
                    .with_initial_weights(DEFAULT_CROSSOVER_WEIGHTS.to_vec()),
            )
            .optional()
            .meta(),
        ]
    }
}

impl fmt::Debug for CistronSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CistronSpec")
            .field("allele", &self.allele)
            .field("min_bits", &self.decoder.min_bit_count())
            .field("max_bits", &self.decoder.max_bit_count())
            .field("required", &self.required)
            .field("meta", &self.meta)
            .field("merger", &self.merger.is_some())
            .finish()
    }
}
