use crate::error::{CistronError, Result};
use half::f16;
use std::ops::Range;

pub const WORD_BITS: u64 = 64;

#[inline]
pub(crate) fn low_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Extracts `width` bits starting at absolute bit index `at`.
///
/// Bit `i` of the stream is bit `i % 64` of word `i / 64`, so the first bit
/// read becomes the least significant bit of the result. A span that crosses
/// a word boundary takes its low part from the top of the current word and
/// its high part from the bottom of the next one.
#[inline]
pub(crate) fn extract_bits(words: &[u64], at: u64, width: u32) -> u64 {
    debug_assert!((1..=64).contains(&width));
    let word = (at / WORD_BITS) as usize;
    let offset = (at % WORD_BITS) as u32;

    if offset + width <= 64 {
        (words[word] >> offset) & low_mask(width)
    } else {
        let low_bits = 64 - offset;
        let low = words[word] >> offset;
        let high = words[word + 1] & low_mask(width - low_bits);
        low | (high << low_bits)
    }
}

/// Cursor-based, single-pass reader over a packed bit range.
///
/// Positions (`position`, `seek`, `find`) are relative to the start of the
/// range the reader was created for.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    words: &'a [u64],
    start: u64,
    end: u64,
    cursor: u64,
}

impl<'a> BitReader<'a> {
    pub fn new(words: &'a [u64], len: u64) -> Self {
        assert!(
            len <= words.len() as u64 * WORD_BITS,
            "bit length {} exceeds backing storage of {} words",
            len,
            words.len()
        );
        Self {
            words,
            start: 0,
            end: len,
            cursor: 0,
        }
    }

    pub fn with_range(words: &'a [u64], range: Range<u64>) -> Self {
        assert!(range.start <= range.end, "inverted bit range {:?}", range);
        assert!(
            range.end <= words.len() as u64 * WORD_BITS,
            "bit range {:?} exceeds backing storage",
            range
        );
        Self {
            words,
            start: range.start,
            end: range.end,
            cursor: range.start,
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn position(&self) -> u64 {
        self.cursor - self.start
    }

    pub fn remaining_length(&self) -> u64 {
        self.end - self.cursor
    }

    pub fn seek(&mut self, bit_index: u64) -> Result<()> {
        if bit_index > self.len() {
            return Err(CistronError::InsufficientBits {
                element: "seek",
                requested: bit_index,
                remaining: self.len(),
            });
        }
        self.cursor = self.start + bit_index;
        Ok(())
    }

    fn ensure(&self, element: &'static str, bit_count: u32, max: u32) -> Result<()> {
        if bit_count == 0 || bit_count > max {
            return Err(CistronError::InvalidBitCount {
                element,
                bit_count,
                max,
            });
        }
        if self.remaining_length() < bit_count as u64 {
            return Err(CistronError::InsufficientBits {
                element,
                requested: bit_count as u64,
                remaining: self.remaining_length(),
            });
        }
        Ok(())
    }

    fn take(&mut self, bit_count: u32) -> u64 {
        let value = extract_bits(self.words, self.cursor, bit_count);
        self.cursor += bit_count as u64;
        value
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        self.ensure("bit", 1, 1)?;
        Ok(self.take(1) == 1)
    }

    /// Reads 1..=64 bits into the low bits of a `u64`.
    pub fn read_bits(&mut self, bit_count: u32) -> Result<u64> {
        self.ensure("bits", bit_count, 64)?;
        Ok(self.take(bit_count))
    }

    pub fn read_u8(&mut self, bit_count: u32) -> Result<u8> {
        self.ensure("u8", bit_count, 8)?;
        Ok(self.take(bit_count) as u8)
    }

    pub fn read_u16(&mut self, bit_count: u32) -> Result<u16> {
        self.ensure("u16", bit_count, 16)?;
        Ok(self.take(bit_count) as u16)
    }

    pub fn read_u32(&mut self, bit_count: u32) -> Result<u32> {
        self.ensure("u32", bit_count, 32)?;
        Ok(self.take(bit_count) as u32)
    }

    pub fn read_u64(&mut self, bit_count: u32) -> Result<u64> {
        self.ensure("u64", bit_count, 64)?;
        Ok(self.take(bit_count))
    }

    pub fn read_f16(&mut self) -> Result<f16> {
        self.ensure("f16", 16, 16)?;
        Ok(f16::from_bits(self.take(16) as u16))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure("f32", 32, 32)?;
        Ok(f32::from_bits(self.take(32) as u32))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure("f64", 64, 64)?;
        Ok(f64::from_bits(self.take(64)))
    }

    fn matches_at(&self, at: u64, width: u32) -> u64 {
        extract_bits(self.words, at, width)
    }

    /// Finds the first offset at or after `start` (default: the cursor) where
    /// the `width`-bit `pattern` occurs.
    ///
    /// On a match the cursor is left just past the pattern; otherwise at the
    /// end of the range.
    pub fn find(&mut self, pattern: u64, width: u32, start: Option<u64>) -> Option<u64> {
        self.find_any(&[pattern], width, start).map(|(offset, _)| offset)
    }

    /// Like [`find`](Self::find) but for several candidate patterns; returns
    /// the earliest offset and the index of the pattern found there.
    pub fn find_any(
        &mut self,
        patterns: &[u64],
        width: u32,
        start: Option<u64>,
    ) -> Option<(u64, usize)> {
        assert!(
            (1..=64).contains(&width),
            "pattern width {} outside 1..=64",
            width
        );
        let mut at = match start {
            Some(offset) => self.start + offset,
            None => self.cursor,
        };
        let width64 = width as u64;

        while at + width64 <= self.end {
            let window = self.matches_at(at, width);
            if let Some(index) = patterns.iter().position(|&p| p == window) {
                self.cursor = at + width64;
                return Some((at - self.start, index));
            }
            at += 1;
        }
        self.cursor = self.end;
        None
    }

    /// Finds `pattern` and then slides forward while the pattern still matches
    /// one bit further on, returning the last offset of that consecutive run.
    ///
    /// An all-zero pattern preceded by zero-valued payload bits is therefore
    /// attributed to the trailing occurrence.
    pub fn find_last_consecutive(
        &mut self,
        pattern: u64,
        width: u32,
        start: Option<u64>,
    ) -> Option<u64> {
        let first = self.find(pattern, width, start)?;
        let mut at = self.start + first;
        let width64 = width as u64;
        while at + 1 + width64 <= self.end && self.matches_at(at + 1, width) == pattern {
            at += 1;
        }
        self.cursor = at + width64;
        Some(at - self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_mask_edges() {
        assert_eq!(low_mask(1), 1);
        assert_eq!(low_mask(63), u64::MAX >> 1);
        assert_eq!(low_mask(64), u64::MAX);
    }

    #[test]
    fn test_extract_across_word_boundary() {
        let words = [(0b1001u64 << 60) | 1234, 0b1100];
        assert_eq!(extract_bits(&words, 0, 60), 1234);
        assert_eq!(extract_bits(&words, 60, 8), 0b1100_1001);
    }
}
