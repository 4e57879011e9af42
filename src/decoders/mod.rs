use crate::{
    datatypes::BinaryRecord,
    decoders::{
        bitmap::BitmapDecodeIterator,
        simple::SimplePackingDecodeIterator,
        stream::{BitStream, NBitwiseIterator},
    },
    error::*,
};

mod bitmap;
mod simple;
mod stream;

impl BinaryRecord {
    /// Returns the number of values in the packed payload: the number of set
    /// bitmap bits, or every grid point when there is no bitmap.
    pub fn num_packed_values(&self) -> Result<usize, GribError> {
        let num_points = self.scan_order()?.len();
        let count = match &self.bms {
            Some(bitmap) => bitmap.count_present(num_points),
            None => num_points,
        };
        Ok(count)
    }

    /// Decodes the `k`-th packed value without unpacking the whole field.
    ///
    /// Bitmapped-out cells are not counted, so `k` indexes present values
    /// only.
    pub fn data_value(&self, k: usize) -> Result<f64, GribError> {
        let count = self.num_packed_values()?;
        if k >= count {
            return Err(DecodeError::ValueIndexOutOfRange { index: k, count }.into());
        }

        let packing = &self.packing;
        let word_size = usize::from(packing.word_size);
        if word_size == 0 {
            return Ok(packing.b);
        }

        let encoded = NBitwiseIterator::new(self.bds.packed(), word_size)
            .with_offset(k * word_size)
            .next()
            .ok_or(DecodeError::ValueIndexOutOfRange { index: k, count })?;
        Ok(packing.decode(f64::from(encoded)))
    }

    /// Decodes every grid point in the order the record stores them.
    /// Cells cleared in the bitmap get
    /// [`MISSING_VALUE`](crate::MISSING_VALUE).
    pub fn unpack(&self) -> Result<Vec<f64>, GribError> {
        let num_points = self.scan_order()?.len();
        let count = self.num_packed_values()?;
        let stream = BitStream::new(self.bds.packed(), usize::from(self.packing.word_size), count);
        let values = SimplePackingDecodeIterator::new(stream.take(count), &self.packing);

        let decoded = match &self.bms {
            Some(bitmap) => BitmapDecodeIterator::new(bitmap.bits().iter(), values)
                .take(num_points)
                .collect::<Vec<_>>(),
            None => values.collect::<Vec<_>>(),
        };

        if decoded.len() != num_points {
            return Err(DecodeError::LengthMismatch {
                expected: num_points,
                found: decoded.len(),
            }
            .into());
        }
        Ok(decoded)
    }
}
