use crate::field::MISSING_VALUE;

/// Spreads decoded values over the cells whose bitmap bit is set; cleared
/// bits yield [`MISSING_VALUE`] and do not consume a value.
pub(crate) struct BitmapDecodeIterator<B, I> {
    bitmap: B,
    values: I,
    byte: u8,
    mask: u8,
}

impl<'b, B, I> BitmapDecodeIterator<B, I>
where
    B: Iterator<Item = &'b u8>,
{
    pub(crate) fn new(bitmap: B, values: I) -> Self {
        Self {
            bitmap,
            values,
            byte: 0,
            mask: 0,
        }
    }
}

impl<'b, B, I> Iterator for BitmapDecodeIterator<B, I>
where
    B: Iterator<Item = &'b u8>,
    I: Iterator<Item = f64>,
{
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.mask == 0 {
            self.byte = *self.bitmap.next()?;
            self.mask = 0b10000000;
        }
        let present = self.byte & self.mask != 0;
        self.mask >>= 1;

        if present {
            self.values.next()
        } else {
            Some(MISSING_VALUE)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = if self.mask == 0 {
            0
        } else {
            self.mask.trailing_zeros() as usize + 1
        };
        let (_, max_bytes) = self.bitmap.size_hint();
        let max = max_bytes
            .and_then(|n| n.checked_mul(8))
            .and_then(|n| n.checked_add(pending));
        (0, max)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bitmap_iterator_works() {
        let bitmap = vec![0b01001100u8, 0b01110000, 0b11110000];
        let values = (0..10).map(f64::from);

        let iter = BitmapDecodeIterator::new(bitmap.iter(), values);
        let actual = iter.collect::<Vec<_>>();
        let m = MISSING_VALUE;
        let expected = vec![
            m, 0.0, m, m, 1.0, 2.0, m, m, m, 3.0, 4.0, 5.0, m, m, m, m, 6.0, 7.0, 8.0, 9.0, m, m,
            m, m,
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn bitmap_iterator_stops_when_values_run_out() {
        let bitmap = vec![0b11000000u8];
        let values = vec![1.0].into_iter();

        let actual = BitmapDecodeIterator::new(bitmap.iter(), values).collect::<Vec<_>>();
        assert_eq!(actual, vec![1.0]);
    }
}
