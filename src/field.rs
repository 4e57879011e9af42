use chrono::{DateTime, Utc};

use crate::{datatypes::BinaryRecord, error::*, grid::ScanOrder};

/// Value given to grid points that carry no data.
pub const MISSING_VALUE: f64 = -9999.0;

/// Returns `true` if `value` is [`MISSING_VALUE`].
#[inline]
pub fn is_missing(value: f64) -> bool {
    value == MISSING_VALUE
}

/// A decoded field laid out row-major, `values[y * nx + x]`, with `x`
/// growing eastward and `y` growing northward.
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackedField {
    pub nx: usize,
    pub ny: usize,
    pub values: Vec<f64>,
    pub init: DateTime<Utc>,
    pub valid: DateTime<Utc>,
    /// Seconds from `init` to `valid`.
    pub lead: i64,
    /// Accumulation period in seconds, 0 if the field is not accumulated.
    pub accumulation: i64,
    pub code: u8,
    pub level_type: u8,
    pub lower: i32,
    pub upper: i32,
}

impl UnpackedField {
    /// Decodes `record` and lays its values out through `order`.
    pub fn from_record(record: &BinaryRecord, order: &ScanOrder) -> Result<Self, GribError> {
        let raster = record.unpack()?;
        let values = reorder(&raster, order)?;

        let pds = record.product_definition();
        let time = pds.forecast_time()?;
        let (lower, upper) = match pds.level() {
            Some(level) => (level.lower, level.upper),
            None => {
                let value = i32::from(u16::from_be_bytes(pds.level_octets()));
                (value, value)
            }
        };

        Ok(Self {
            nx: order.nx(),
            ny: order.ny(),
            values,
            init: time.init,
            valid: time.valid,
            lead: time.lead(),
            accumulation: time.accumulation,
            code: record.code(),
            level_type: pds.level_type(),
            lower,
            upper,
        })
    }

    /// Returns the value at grid point `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<f64, ValidationError> {
        if x >= self.nx || y >= self.ny {
            return Err(ValidationError::GridPointOutOfRange {
                x,
                y,
                nx: self.nx,
                ny: self.ny,
            });
        }
        Ok(self.values[y * self.nx + x])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of points holding [`MISSING_VALUE`].
    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|v| is_missing(**v)).count()
    }
}

pub(crate) fn reorder(raster: &[f64], order: &ScanOrder) -> Result<Vec<f64>, GribError> {
    if raster.len() != order.len() {
        return Err(DecodeError::LengthMismatch {
            expected: order.len(),
            found: raster.len(),
        }
        .into());
    }

    let nx = order.nx();
    let mut values = vec![MISSING_VALUE; raster.len()];
    for (n, value) in raster.iter().enumerate() {
        let (x, y) = order.one_to_two(n)?;
        values[y * nx + x] = *value;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ScanningMode;

    macro_rules! test_reorder {
        ($(($name:ident, $mode:expr, $expected:expr),)*) => ($(
            #[test]
            fn $name() {
                let raster = (0..6).map(f64::from).collect::<Vec<_>>();
                let order = ScanOrder::new(3, 2, ScanningMode($mode));
                let actual = reorder(&raster, &order).unwrap();
                let expected: Vec<f64> = $expected.iter().map(|v: &i32| f64::from(*v)).collect();
                assert_eq!(actual, expected);
            }
        )*);
    }

    test_reorder! {
        (reorder_north_to_south, 0b00000000, [3, 4, 5, 0, 1, 2]),
        (reorder_south_to_north, 0b01000000, [0, 1, 2, 3, 4, 5]),
        (reorder_east_to_west, 0b11000000, [2, 1, 0, 5, 4, 3]),
        (reorder_column_major, 0b01100000, [0, 2, 4, 1, 3, 5]),
    }

    #[test]
    fn reorder_rejects_length_mismatch() {
        let order = ScanOrder::new(3, 2, ScanningMode(0));
        let result = reorder(&[1.0, 2.0], &order);
        assert_eq!(
            result,
            Err(GribError::DecodeError(DecodeError::LengthMismatch {
                expected: 6,
                found: 2
            }))
        );
    }

    #[test]
    fn missing_value_detection() {
        assert!(is_missing(MISSING_VALUE));
        assert!(!is_missing(0.0));
    }
}
