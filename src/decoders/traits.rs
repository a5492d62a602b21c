use crate::encoding::{BitBuffer, BitReader};
use crate::error::Result;
use crate::types::Value;

/// Decoders whose maximum exceeds this are treated as unbounded and may be
/// terminated by the end of the chromosome instead of a stop codon.
pub const UNBOUNDED_BIT_COUNT: u64 = (i32::MAX / 2) as u64;

/// Typed decoder of one cistron's payload bits.
pub trait Decoder: Send + Sync {
    type Output: Into<Value>;

    /// Decodes a value from a reader positioned at the start of the payload.
    fn decode(&self, reader: &mut BitReader<'_>) -> Result<Self::Output>;

    /// Smallest payload any decode can succeed on.
    fn min_bit_count(&self) -> u64;

    /// Largest payload this decoder could ever read; extra bits are ignored.
    fn max_bit_count(&self) -> u64;

    /// Literal payload used when seeding a fresh chromosome.
    fn initial_encoded_value(&self) -> Option<BitBuffer> {
        None
    }

    fn implicit_stop_allowed(&self) -> bool {
        self.max_bit_count() > UNBOUNDED_BIT_COUNT
    }
}

/// Object-safe view of a [`Decoder`] producing a [`Value`].
///
/// Implemented for every `Decoder`, so cistron specs can hold heterogeneous
/// decoders behind one trait object.
pub trait CistronDecoder: Send + Sync {
    fn decode_value(&self, reader: &mut BitReader<'_>) -> Result<Value>;
    fn min_bit_count(&self) -> u64;
    fn max_bit_count(&self) -> u64;
    fn initial_encoded_value(&self) -> Option<BitBuffer>;
    fn implicit_stop_allowed(&self) -> bool;
}

impl<D: Decoder> CistronDecoder for D {
    fn decode_value(&self, reader: &mut BitReader<'_>) -> Result<Value> {
        self.decode(reader).map(Into::into)
    }

    fn min_bit_count(&self) -> u64 {
        Decoder::min_bit_count(self)
    }

    fn max_bit_count(&self) -> u64 {
        Decoder::max_bit_count(self)
    }

    fn initial_encoded_value(&self) -> Option<BitBuffer> {
        Decoder::initial_encoded_value(self)
    }

    fn implicit_stop_allowed(&self) -> bool {
        Decoder::implicit_stop_allowed(self)
    }
}

/// A decode of one cistron that has been located but not yet run.
pub type DeferredDecode<'a> = Box<dyn FnOnce() -> Result<Value> + 'a>;

/// Combines several cistrons that share a spec into one value.
pub trait MultiCistronMerger: Send + Sync {
    /// When true, length validation of duplicates is postponed until the
    /// merged decode actually runs, so a merger may skip an invalid cistron.
    fn tolerates_invalid_cistrons(&self) -> bool {
        true
    }

    fn merge<'a>(&self, previous: DeferredDecode<'a>, current: DeferredDecode<'a>) -> DeferredDecode<'a>;
}
