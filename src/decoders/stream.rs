use std::iter::{self, RepeatN};

/// Unsigned integers of a fixed bit width read from a packed payload.
///
/// A width of zero yields `length` zeros without touching the payload.
pub(crate) enum BitStream<T> {
    ZeroSized(RepeatN<u32>),
    NonZeroSized(NBitwiseIterator<T>),
}

impl<T> BitStream<T> {
    pub(crate) fn new(data: T, unit_size: usize, length: usize) -> Self {
        if unit_size == 0 {
            Self::ZeroSized(iter::repeat_n(0, length))
        } else {
            Self::NonZeroSized(NBitwiseIterator::new(data, unit_size))
        }
    }
}

impl<T: AsRef<[u8]>> Iterator for BitStream<T> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::ZeroSized(zeros) => zeros.next(),
            Self::NonZeroSized(words) => words.next(),
        }
    }
}

/// Reads `size`-bit big-endian words, which may straddle byte boundaries.
/// Widths up to 32 bits are supported.
#[derive(Clone)]
pub(crate) struct NBitwiseIterator<T> {
    data: T,
    size: usize,
    bit_pos: usize,
}

impl<T> NBitwiseIterator<T> {
    pub(crate) fn new(data: T, size: usize) -> Self {
        Self {
            data,
            size,
            bit_pos: 0,
        }
    }

    /// Starts reading `offset_bits` bits into the data.
    pub(crate) fn with_offset(self, offset_bits: usize) -> Self {
        Self {
            bit_pos: offset_bits,
            ..self
        }
    }
}

impl<T: AsRef<[u8]>> Iterator for NBitwiseIterator<T> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.data.as_ref();
        let end = self.bit_pos + self.size;
        if self.size == 0 || end > bytes.len() * 8 {
            return None;
        }

        let first = self.bit_pos / 8;
        let last = (end - 1) / 8;
        // at most 5 bytes for a 32-bit word starting mid-byte
        let window = bytes[first..=last]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        let trailing = (last + 1) * 8 - end;
        let mask = (1u64 << self.size) - 1;

        self.bit_pos = end;
        Some(((window >> trailing) & mask) as u32)
    }
}
