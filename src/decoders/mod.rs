pub mod traits;
pub mod numeric;
pub mod cumulative;
pub mod mergers;

pub use traits::{CistronDecoder, Decoder, DeferredDecode, MultiCistronMerger, UNBOUNDED_BIT_COUNT};
pub use numeric::{BoolDecoder, ByteDecoder, ConstantDecoder, IntegerDecoder, UniformFloatDecoder};
pub use cumulative::CumulativeWeightsDecoder;
pub use mergers::{FirstViable, KeepFirst, KeepLast, LowestDiscriminator, MeanMerger, MergeableDecoder};
