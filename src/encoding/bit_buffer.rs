use super::bit_reader::{extract_bits, low_mask, BitReader, WORD_BITS};
use rand::Rng;
use std::fmt;
use std::ops::Range;

fn words_for(len: u64) -> usize {
    ((len + WORD_BITS - 1) / WORD_BITS) as usize
}

/// Growable packed bit sequence backed by 64-bit words.
///
/// Bits past `len` in the last word are always zero, so equality and hashing
/// only depend on the logical contents.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitBuffer {
    words: Vec<u64>,
    len: u64,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zeros(len: u64) -> Self {
        Self {
            words: vec![0; words_for(len)],
            len,
        }
    }

    /// Builds a buffer from raw words; words past `len` are dropped and the
    /// unused tail of the last word is cleared.
    pub fn from_words(mut words: Vec<u64>, len: u64) -> Self {
        let needed = words_for(len);
        assert!(
            words.len() >= needed,
            "{} words cannot hold {} bits",
            words.len(),
            len
        );
        words.truncate(needed);
        let mut buffer = Self { words, len };
        buffer.clear_tail();
        buffer
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        let mut buffer = Self::zeros(bits.len() as u64);
        for (i, &bit) in bits.iter().enumerate() {
            buffer.set(i as u64, bit);
        }
        buffer
    }

    pub fn random<R: Rng + ?Sized>(len: u64, rng: &mut R) -> Self {
        let words = (0..words_for(len)).map(|_| rng.gen::<u64>()).collect();
        Self::from_words(words, len)
    }

    /// Encodes the low `width` bits of `value`.
    pub fn from_value(value: u64, width: u32) -> Self {
        let mut buffer = Self::zeros(width as u64);
        buffer.write_value(0, value, width);
        buffer
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(&self.words, self.len)
    }

    pub fn reader_for(&self, range: Range<u64>) -> BitReader<'_> {
        assert!(range.end <= self.len, "range {:?} exceeds length {}", range, self.len);
        BitReader::with_range(&self.words, range)
    }

    fn clear_tail(&mut self) {
        let used = (self.len % WORD_BITS) as u32;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= low_mask(used);
            }
        }
    }

    pub fn get(&self, index: u64) -> bool {
        assert!(index < self.len, "bit index {} out of range {}", index, self.len);
        (self.words[(index / WORD_BITS) as usize] >> (index % WORD_BITS)) & 1 == 1
    }

    pub fn set(&mut self, index: u64, bit: bool) {
        assert!(index < self.len, "bit index {} out of range {}", index, self.len);
        let word = &mut self.words[(index / WORD_BITS) as usize];
        let mask = 1u64 << (index % WORD_BITS);
        if bit {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    pub fn flip(&mut self, index: u64) {
        assert!(index < self.len, "bit index {} out of range {}", index, self.len);
        self.words[(index / WORD_BITS) as usize] ^= 1u64 << (index % WORD_BITS);
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % WORD_BITS == 0 {
            self.words.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, bit);
    }

    pub fn append(&mut self, other: &BitBuffer) {
        let at = self.len;
        self.resize(self.len + other.len);
        other.copy_range_to(self, 0, other.len, at);
    }

    pub fn resize(&mut self, len: u64) {
        self.words.resize(words_for(len), 0);
        self.len = len;
        self.clear_tail();
    }

    pub fn value_at(&self, at: u64, width: u32) -> u64 {
        assert!(at + width as u64 <= self.len, "read of {} bits at {} exceeds {}", width, at, self.len);
        extract_bits(&self.words, at, width)
    }

    pub fn write_value(&mut self, at: u64, value: u64, width: u32) {
        assert!((1..=64).contains(&width), "width {} outside 1..=64", width);
        assert!(at + width as u64 <= self.len, "write of {} bits at {} exceeds {}", width, at, self.len);
        let value = value & low_mask(width);
        let word = (at / WORD_BITS) as usize;
        let offset = (at % WORD_BITS) as u32;

        if offset + width <= 64 {
            let mask = low_mask(width) << offset;
            self.words[word] = (self.words[word] & !mask) | (value << offset);
        } else {
            let low_bits = 64 - offset;
            let high_bits = width - low_bits;
            self.words[word] = (self.words[word] & low_mask(offset)) | (value << offset);
            self.words[word + 1] =
                (self.words[word + 1] & !low_mask(high_bits)) | (value >> low_bits);
        }
    }

    /// Copies `length` bits from `self[source_start..]` into `dest[dest_start..]`.
    pub fn copy_range_to(&self, dest: &mut BitBuffer, source_start: u64, length: u64, dest_start: u64) {
        assert!(source_start + length <= self.len, "copy source out of range");
        assert!(dest_start + length <= dest.len, "copy destination out of range");
        let mut copied = 0;
        while copied < length {
            let width = (length - copied).min(WORD_BITS) as u32;
            let chunk = extract_bits(&self.words, source_start + copied, width);
            dest.write_value(dest_start + copied, chunk, width);
            copied += width as u64;
        }
    }

    pub fn slice(&self, range: Range<u64>) -> BitBuffer {
        assert!(range.start <= range.end && range.end <= self.len, "slice {:?} out of range", range);
        let mut result = BitBuffer::zeros(range.end - range.start);
        self.copy_range_to(&mut result, range.start, range.end - range.start, 0);
        result
    }

    /// Inserts `bits[i]` before original index `positions[i]`.
    ///
    /// `positions` are ascending indices into the buffer as it was before the
    /// call (`len` means append), so each insertion accounts for the shift
    /// caused by the ones before it.
    pub fn insert_bits(&mut self, positions: &[u64], bits: &[bool]) {
        assert_eq!(positions.len(), bits.len(), "one bit per insertion position");
        if positions.is_empty() {
            return;
        }
        assert!(positions.windows(2).all(|w| w[0] <= w[1]), "insertion positions must be sorted");
        assert!(positions[positions.len() - 1] <= self.len, "insertion position out of range");

        let mut result = BitBuffer::zeros(0);
        result.words.reserve(words_for(self.len + positions.len() as u64));
        let mut next = 0;
        for index in 0..self.len {
            while next < positions.len() && positions[next] == index {
                result.push(bits[next]);
                next += 1;
            }
            result.push(self.get(index));
        }
        for &bit in &bits[next..] {
            result.push(bit);
        }
        *self = result;
    }

    /// Removes the bits at the given ascending, unique indices.
    pub fn remove_bits(&mut self, positions: &[u64]) {
        if positions.is_empty() {
            return;
        }
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "removal positions must be sorted and unique");
        assert!(positions[positions.len() - 1] < self.len, "removal position out of range");

        let mut result = BitBuffer::zeros(0);
        let mut next = 0;
        for index in 0..self.len {
            if next < positions.len() && positions[next] == index {
                next += 1;
                continue;
            }
            result.push(self.get(index));
        }
        *self = result;
    }

    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| w.count_ones() as u64).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len <= 128 {
            write!(f, "BitBuffer({})", self)
        } else {
            write!(f, "BitBuffer(len={}, ones={})", self.len, self.count_ones())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_words_clears_tail() {
        let buffer = BitBuffer::from_words(vec![u64::MAX, u64::MAX], 70);
        assert_eq!(buffer.words().len(), 2);
        assert_eq!(buffer.words()[1], 0b11_1111);
        assert_eq!(buffer.count_ones(), 70);
    }

    #[test]
    fn test_write_value_across_boundary() {
        let mut buffer = BitBuffer::zeros(128);
        buffer.write_value(60, 0b1011_0110, 8);
        assert_eq!(buffer.value_at(60, 8), 0b1011_0110);
        assert_eq!(buffer.value_at(0, 60), 0);
        assert_eq!(buffer.value_at(68, 60), 0);
    }

    #[test]
    fn test_resize_shrinks_and_clears() {
        let mut buffer = BitBuffer::from_bits(&[true; 10]);
        buffer.resize(4);
        buffer.resize(10);
        assert_eq!(buffer.to_string(), "1111000000");
    }
}
