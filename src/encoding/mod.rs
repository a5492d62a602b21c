pub mod bit_buffer;
pub mod bit_reader;

pub use bit_buffer::BitBuffer;
pub use bit_reader::BitReader;
