use super::traits::Decoder;
use crate::encoding::{BitBuffer, BitReader};
use crate::error::Result;

/// Reads one byte per outcome and yields normalised cumulative probabilities.
///
/// The last entry is always `1.0`. Each byte is offset by one so an all-zero
/// payload still decodes to a uniform distribution.
pub struct CumulativeWeightsDecoder {
    outcomes: usize,
    initial: Option<Vec<f64>>,
}

impl CumulativeWeightsDecoder {
    pub fn new(outcomes: usize) -> Self {
        assert!(outcomes > 0, "a distribution needs at least one outcome");
        Self { outcomes, initial: None }
    }

    /// Seeds fresh chromosomes with bytes approximating these (non-cumulative) weights.
    pub fn with_initial_weights(mut self, weights: Vec<f64>) -> Self {
        assert_eq!(weights.len(), self.outcomes, "one weight per outcome");
        self.initial = Some(weights);
        self
    }

    pub fn cumulative(weights: &[f64]) -> Vec<f64> {
        let total: f64 = weights.iter().sum();
        let mut running = 0.0;
        let mut result: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w;
                running / total
            })
            .collect();
        if let Some(last) = result.last_mut() {
            *last = 1.0;
        }
        result
    }
}

impl Decoder for CumulativeWeightsDecoder {
    type Output = Vec<f64>;

    fn decode(&self, reader: &mut BitReader<'_>) -> Result<Vec<f64>> {
        let mut weights = Vec::with_capacity(self.outcomes);
        for _ in 0..self.outcomes {
            weights.push(reader.read_u8(8)? as f64 + 1.0);
        }
        Ok(Self::cumulative(&weights))
    }

    fn min_bit_count(&self) -> u64 {
        8 * self.outcomes as u64
    }

    fn max_bit_count(&self) -> u64 {
        8 * self.outcomes as u64
    }

    fn initial_encoded_value(&self) -> Option<BitBuffer> {
        let weights = self.initial.as_ref()?;
        let largest = weights.iter().cloned().fold(f64::MIN, f64::max);
        let mut encoded = BitBuffer::zeros(8 * self.outcomes as u64);
        for (i, weight) in weights.iter().enumerate() {
            let byte = if largest > 0.0 {
                ((weight / largest) * 255.0).round().clamp(0.0, 255.0) as u64
            } else {
                0
            };
            encoded.write_value(8 * i as u64, byte.saturating_sub(1), 8);
        }
        Some(encoded)
    }
}
