use super::traits::{Decoder, DeferredDecode, MultiCistronMerger};
use crate::encoding::{BitBuffer, BitReader};
use crate::error::{CistronError, Result};
use crate::types::Value;

const DISCRIMINATOR_BIT_COUNT: u32 = 4;

/// The earliest cistron in bit order wins; later duplicates are never decoded.
pub struct KeepFirst;

impl MultiCistronMerger for KeepFirst {
    fn merge<'a>(&self, previous: DeferredDecode<'a>, _current: DeferredDecode<'a>) -> DeferredDecode<'a> {
        previous
    }
}

/// The latest cistron in bit order wins.
pub struct KeepLast;

impl MultiCistronMerger for KeepLast {
    fn merge<'a>(&self, _previous: DeferredDecode<'a>, current: DeferredDecode<'a>) -> DeferredDecode<'a> {
        current
    }
}

/// Uses the earliest cistron that decodes without inviability.
pub struct FirstViable;

impl MultiCistronMerger for FirstViable {
    fn merge<'a>(&self, previous: DeferredDecode<'a>, current: DeferredDecode<'a>) -> DeferredDecode<'a> {
        Box::new(move || match previous() {
            Err(e) if e.is_inviable() => current(),
            other => other,
        })
    }
}

/// Averages numeric values. Every duplicate must be structurally valid.
pub struct MeanMerger;

impl MeanMerger {
    fn mean(a: &Value, b: &Value) -> Result<Value> {
        match (a, b) {
            (Value::FloatList(x), Value::FloatList(y)) if x.len() == y.len() => Ok(Value::FloatList(
                x.iter().zip(y).map(|(p, q)| (p + q) / 2.0).collect(),
            )),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Ok(Value::Float((x + y) / 2.0)),
                _ => Err(CistronError::Decode(format!(
                    "cannot average {:?} and {:?}",
                    a, b
                ))),
            },
        }
    }
}

impl MultiCistronMerger for MeanMerger {
    fn tolerates_invalid_cistrons(&self) -> bool {
        false
    }

    fn merge<'a>(&self, previous: DeferredDecode<'a>, current: DeferredDecode<'a>) -> DeferredDecode<'a> {
        Box::new(move || {
            let a = previous()?;
            let b = current()?;
            Self::mean(&a, &b)
        })
    }
}

/// For [`MergeableDecoder`] values: the smallest discriminator dominates,
/// ties go to the earlier cistron.
pub struct LowestDiscriminator;

impl MultiCistronMerger for LowestDiscriminator {
    fn tolerates_invalid_cistrons(&self) -> bool {
        false
    }

    fn merge<'a>(&self, previous: DeferredDecode<'a>, current: DeferredDecode<'a>) -> DeferredDecode<'a> {
        Box::new(move || {
            let a = previous()?;
            let b = current()?;
            match (a.discriminator(), b.discriminator()) {
                (Some(da), Some(db)) if db < da => Ok(b),
                (Some(_), Some(_)) => Ok(a),
                _ => Err(CistronError::Decode(
                    "LowestDiscriminator requires discriminated values".to_string(),
                )),
            }
        })
    }
}

/// Prefixes an inner decoder with a 4-bit discriminator field that mergers
/// can use to decide which same-allele cistrons cooperate.
pub struct MergeableDecoder<D> {
    inner: D,
}

impl<D: Decoder> MergeableDecoder<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: Decoder> Decoder for MergeableDecoder<D> {
    type Output = Value;

    fn decode(&self, reader: &mut BitReader<'_>) -> Result<Value> {
        let discriminator = reader.read_u16(DISCRIMINATOR_BIT_COUNT)?;
        let value = self.inner.decode(reader)?.into();
        Ok(Value::Discriminated {
            discriminator,
            value: Box::new(value),
        })
    }

    fn min_bit_count(&self) -> u64 {
        self.inner.min_bit_count() + DISCRIMINATOR_BIT_COUNT as u64
    }

    fn max_bit_count(&self) -> u64 {
        self.inner.max_bit_count().saturating_add(DISCRIMINATOR_BIT_COUNT as u64)
    }

    fn initial_encoded_value(&self) -> Option<BitBuffer> {
        let inner = self.inner.initial_encoded_value()?;
        let mut encoded = BitBuffer::zeros(DISCRIMINATOR_BIT_COUNT as u64);
        encoded.append(&inner);
        Some(encoded)
    }
}
