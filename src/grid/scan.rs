use crate::error::ValidationError;

/// Scanning mode octet of the grid description (flag table 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanningMode(pub u8);

impl ScanningMode {
    pub fn scans_positively_for_i(&self) -> bool {
        self.0 & 0b10000000 == 0
    }

    pub fn scans_positively_for_j(&self) -> bool {
        self.0 & 0b01000000 != 0
    }

    pub fn is_consecutive_for_i(&self) -> bool {
        self.0 & 0b00100000 == 0
    }
}

/// Translates between offsets in the stored raster and `(x, y)` grid points,
/// where `x` grows eastward and `y` grows northward from the lower-left
/// corner.
///
/// Covers all eight combinations of the three scanning mode bits.
///
/// # Examples
///
/// ```
/// use grib1::{ScanOrder, ScanningMode};
///
/// // Points scan in -x and +y directions with y varying fastest.
/// let order = ScanOrder::new(4, 3, ScanningMode(0b11100000));
/// assert_eq!(order.two_to_one(3, 0), Ok(0));
/// assert_eq!(order.two_to_one(3, 1), Ok(1));
/// assert_eq!(order.one_to_two(3), Ok((2, 0)));
/// assert!(order.two_to_one(4, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanOrder {
    nx: usize,
    ny: usize,
    mode: ScanningMode,
}

impl ScanOrder {
    pub fn new(nx: usize, ny: usize, mode: ScanningMode) -> Self {
        Self { nx, ny, mode }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn scanning_mode(&self) -> ScanningMode {
        self.mode
    }

    /// Returns the number of grid points.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the raster offset of grid point `(x, y)`.
    pub fn two_to_one(&self, x: usize, y: usize) -> Result<usize, ValidationError> {
        if x >= self.nx || y >= self.ny {
            return Err(ValidationError::GridPointOutOfRange {
                x,
                y,
                nx: self.nx,
                ny: self.ny,
            });
        }

        let i = if self.mode.scans_positively_for_i() {
            x
        } else {
            self.nx - 1 - x
        };
        let j = if self.mode.scans_positively_for_j() {
            y
        } else {
            self.ny - 1 - y
        };

        let n = if self.mode.is_consecutive_for_i() {
            j * self.nx + i
        } else {
            i * self.ny + j
        };
        Ok(n)
    }

    /// Returns the grid point `(x, y)` stored at raster offset `n`.
    pub fn one_to_two(&self, n: usize) -> Result<(usize, usize), ValidationError> {
        if n >= self.len() {
            return Err(ValidationError::OffsetOutOfRange {
                offset: n,
                len: self.len(),
            });
        }

        let (i, j) = if self.mode.is_consecutive_for_i() {
            (n % self.nx, n / self.nx)
        } else {
            (n / self.ny, n % self.ny)
        };

        let x = if self.mode.scans_positively_for_i() {
            i
        } else {
            self.nx - 1 - i
        };
        let y = if self.mode.scans_positively_for_j() {
            j
        } else {
            self.ny - 1 - j
        };
        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [u8; 8] = [
        0b00000000, 0b00100000, 0b01000000, 0b01100000, 0b10000000, 0b10100000, 0b11000000,
        0b11100000,
    ];

    #[test]
    fn round_trip_for_all_modes_and_shapes() {
        for mode in ALL_MODES {
            for (nx, ny) in [(1, 1), (4, 3), (3, 4), (7, 2), (1, 5)] {
                let order = ScanOrder::new(nx, ny, ScanningMode(mode));
                for n in 0..nx * ny {
                    let (x, y) = order.one_to_two(n).unwrap();
                    assert_eq!(order.two_to_one(x, y), Ok(n), "mode {mode:#010b}");
                }
                for y in 0..ny {
                    for x in 0..nx {
                        let n = order.two_to_one(x, y).unwrap();
                        assert_eq!(order.one_to_two(n), Ok((x, y)), "mode {mode:#010b}");
                    }
                }
            }
        }
    }

    #[test]
    fn out_of_range_fails_for_all_modes() {
        for mode in ALL_MODES {
            let order = ScanOrder::new(4, 3, ScanningMode(mode));
            assert_eq!(
                order.two_to_one(4, 0),
                Err(ValidationError::GridPointOutOfRange {
                    x: 4,
                    y: 0,
                    nx: 4,
                    ny: 3
                })
            );
            assert!(order.two_to_one(0, 3).is_err());
            assert!(order.two_to_one(usize::MAX, usize::MAX).is_err());
            assert_eq!(
                order.one_to_two(12),
                Err(ValidationError::OffsetOutOfRange {
                    offset: 12,
                    len: 12
                })
            );
        }
    }

    #[test]
    fn empty_grid_rejects_everything() {
        let order = ScanOrder::new(0, 0, ScanningMode(0b01000000));
        assert!(order.is_empty());
        assert!(order.one_to_two(0).is_err());
        assert!(order.two_to_one(0, 0).is_err());
    }

    macro_rules! test_raster_offsets {
        ($(($name:ident, $mode:expr, $expected:expr),)*) => ($(
            #[test]
            fn $name() {
                let order = ScanOrder::new(3, 2, ScanningMode($mode));
                let actual = (0..6)
                    .map(|n| order.one_to_two(n).unwrap())
                    .collect::<Vec<_>>();
                assert_eq!(actual, $expected);
            }
        )*);
    }

    test_raster_offsets! {
        (
            raster_offsets_for_plus_x_minus_y_x_fastest,
            0b00000000,
            vec![(0, 1), (1, 1), (2, 1), (0, 0), (1, 0), (2, 0)]
        ),
        (
            raster_offsets_for_plus_x_plus_y_x_fastest,
            0b01000000,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        ),
        (
            raster_offsets_for_plus_x_plus_y_y_fastest,
            0b01100000,
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]
        ),
        (
            raster_offsets_for_minus_x_plus_y_x_fastest,
            0b11000000,
            vec![(2, 0), (1, 0), (0, 0), (2, 1), (1, 1), (0, 1)]
        ),
    }
}
