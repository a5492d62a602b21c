use super::traits::Decoder;
use crate::encoding::{BitBuffer, BitReader};
use crate::error::{CistronError, Result};
use crate::types::Value;
use std::sync::OnceLock;

/// Ranks every byte by number of set bits, then by value.
///
/// Bytes that are a single bit flip apart land near each other, so small
/// mutations give small changes in the decoded value.
fn proximity_order() -> &'static [u8; 256] {
    static ORDER: OnceLock<[u8; 256]> = OnceLock::new();
    ORDER.get_or_init(|| {
        let mut bytes: Vec<u8> = (0..=255u8).collect();
        bytes.sort_by_key(|b| (b.count_ones(), *b));
        let mut rank = [0u8; 256];
        for (position, byte) in bytes.into_iter().enumerate() {
            rank[byte as usize] = position as u8;
        }
        rank
    })
}

pub struct BoolDecoder;

impl Decoder for BoolDecoder {
    type Output = bool;

    fn decode(&self, reader: &mut BitReader<'_>) -> Result<bool> {
        reader.read_bit()
    }

    fn min_bit_count(&self) -> u64 {
        1
    }

    fn max_bit_count(&self) -> u64 {
        1
    }
}

/// Fixed-width unsigned integer.
pub struct IntegerDecoder {
    bit_count: u32,
}

impl IntegerDecoder {
    pub fn new(bit_count: u32) -> Result<Self> {
        if bit_count == 0 || bit_count > 63 {
            return Err(CistronError::InvalidBitCount {
                element: "integer decoder",
                bit_count,
                max: 63,
            });
        }
        Ok(Self { bit_count })
    }
}

impl Decoder for IntegerDecoder {
    type Output = i64;

    fn decode(&self, reader: &mut BitReader<'_>) -> Result<i64> {
        Ok(reader.read_bits(self.bit_count)? as i64)
    }

    fn min_bit_count(&self) -> u64 {
        self.bit_count as u64
    }

    fn max_bit_count(&self) -> u64 {
        self.bit_count as u64
    }
}

/// One byte, remapped through the popcount proximity order.
pub struct ByteDecoder;

impl Decoder for ByteDecoder {
    type Output = u8;

    fn decode(&self, reader: &mut BitReader<'_>) -> Result<u8> {
        let raw = reader.read_u8(8)?;
        Ok(proximity_order()[raw as usize])
    }

    fn min_bit_count(&self) -> u64 {
        8
    }

    fn max_bit_count(&self) -> u64 {
        8
    }
}

/// One byte mapped linearly onto `[min, max]`: `0` is `min`, `255` is `max`.
pub struct UniformFloatDecoder {
    min: f64,
    max: f64,
    initial: Option<f64>,
}

impl UniformFloatDecoder {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max, initial: None }
    }

    /// Seeds fresh chromosomes with the byte closest to `value`.
    pub fn with_initial(mut self, value: f64) -> Self {
        self.initial = Some(value);
        self
    }

    pub fn encode(&self, value: f64) -> u8 {
        if self.max == self.min {
            return 0;
        }
        let normalized = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        (normalized * 255.0).round() as u8
    }

    pub fn value_of(&self, byte: u8) -> f64 {
        self.min + (self.max - self.min) * byte as f64 / 255.0
    }
}

impl Decoder for UniformFloatDecoder {
    type Output = f64;

    fn decode(&self, reader: &mut BitReader<'_>) -> Result<f64> {
        Ok(self.value_of(reader.read_u8(8)?))
    }

    fn min_bit_count(&self) -> u64 {
        8
    }

    fn max_bit_count(&self) -> u64 {
        8
    }

    fn initial_encoded_value(&self) -> Option<BitBuffer> {
        self.initial
            .map(|value| BitBuffer::from_value(self.encode(value) as u64, 8))
    }
}

/// Ignores its payload and always yields the same value.
pub struct ConstantDecoder<T> {
    value: T,
}

impl<T> ConstantDecoder<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Decoder for ConstantDecoder<T>
where
    T: Clone + Into<Value> + Send + Sync,
{
    type Output = T;

    fn decode(&self, _reader: &mut BitReader<'_>) -> Result<T> {
        Ok(self.value.clone())
    }

    fn min_bit_count(&self) -> u64 {
        0
    }

    fn max_bit_count(&self) -> u64 {
        0
    }
}
