use num::ToPrimitive;

use crate::datatypes::SimplePacking;

/// Turns packed integers into physical values: `10^-D * (R + U * 2^E)`.
pub(crate) struct SimplePackingDecodeIterator<I> {
    iter: I,
    m: f64,
    b: f64,
}

impl<I> SimplePackingDecodeIterator<I> {
    pub(crate) fn new(iter: I, packing: &SimplePacking) -> Self {
        Self {
            iter,
            m: packing.m,
            b: packing.b,
        }
    }
}

impl<I: Iterator<Item = N>, N: ToPrimitive> Iterator for SimplePackingDecodeIterator<I> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let encoded = self.iter.next()?.to_f64()?;
        Some(self.b + encoded * self.m)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::decoders::stream::{BitStream, NBitwiseIterator};

    #[test]
    fn decode_simple_packing() {
        // R = 4419.25, E = -3, D = 1
        let packing = SimplePacking::new(4419.25, -3, 1, 16);
        let input: Vec<u8> = vec![0x00, 0x08, 0x01, 0x00];
        let expected = [442.025, 445.125];

        let iter = NBitwiseIterator::new(&input, usize::from(packing.word_size));
        let actual = SimplePackingDecodeIterator::new(iter, &packing).collect::<Vec<_>>();

        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1.0e-9, "{a} != {e}");
        }
    }

    #[test]
    fn decode_simple_packing_when_word_size_is_zero() {
        let packing = SimplePacking::new(273.0, 0, 0, 0);
        let input: Vec<u8> = Vec::new();

        let iter = BitStream::new(&input, 0, 4);
        let actual = SimplePackingDecodeIterator::new(iter, &packing).collect::<Vec<_>>();
        assert_eq!(actual, vec![273.0; 4]);
    }
}
