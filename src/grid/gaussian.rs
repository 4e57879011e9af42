use std::f64::consts::PI;

use crate::{
    datatypes::GridDescription,
    error::GribError,
    helpers::{lat_lon_from_bytes, rescale_deg, rescale_lon},
};

/// A global Gaussian grid. Rows sit on the Gaussian latitudes, ordered from
/// south to north; columns are evenly spaced starting at `lon_zero`
/// (degrees west-positive).
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianGridDefinition {
    pub lon_zero: f64,
    pub nx: usize,
    pub ny: usize,
    latitudes: Vec<f64>,
}

impl GaussianGridDefinition {
    pub fn new(lon_zero: f64, nx: usize, ny: usize) -> Self {
        Self {
            lon_zero,
            nx,
            ny,
            latitudes: gaussian_latitudes(ny),
        }
    }

    /// Returns the shape of the grid, i.e. a tuple of the number of grids in
    /// the x and y directions.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Returns the grid type.
    pub fn short_name(&self) -> &'static str {
        "regular_gg"
    }

    /// Returns the row latitudes from south to north.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    fn delta_lon(&self) -> f64 {
        360.0 / self.nx as f64
    }

    pub fn xy_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = rescale_lon(self.lon_zero - x * self.delta_lon());
        (self.row_to_lat(y), lon)
    }

    pub fn latlon_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = rescale_deg(self.lon_zero - lon, 0.0, 360.0) / self.delta_lon();
        (x, self.lat_to_row(lat))
    }

    fn row_to_lat(&self, y: f64) -> f64 {
        let lats = &self.latitudes;
        match lats.len() {
            0 => f64::NAN,
            1 => lats[0],
            n => {
                let j = (y.floor().max(0.0) as usize).min(n - 2);
                let frac = y - j as f64;
                lats[j] + frac * (lats[j + 1] - lats[j])
            }
        }
    }

    fn lat_to_row(&self, lat: f64) -> f64 {
        let lats = &self.latitudes;
        match lats.len() {
            0 => f64::NAN,
            1 => 0.0,
            n => {
                let j = lats
                    .windows(2)
                    .position(|w| lat < w[1])
                    .unwrap_or(n - 2);
                j as f64 + (lat - lats[j]) / (lats[j + 1] - lats[j])
            }
        }
    }

    pub(crate) fn from_grid_description(gds: &GridDescription) -> Result<Self, GribError> {
        let lon_zero = -rescale_lon(lat_lon_from_bytes(gds.octets(14, 17)?));
        Ok(Self::new(lon_zero, gds.nx(), gds.ny()))
    }
}

/// Computes the `n` Gaussian latitudes, the arcsines of the roots of the
/// Legendre polynomial of degree `n`, from south to north.
pub fn gaussian_latitudes(n: usize) -> Vec<f64> {
    let mut lats = (0..n)
        .map(|i| {
            let guess = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            let mu = find_root(guess, |x| {
                let (p, dp) = legendre(n, x);
                p / dp
            });
            mu.asin().to_degrees()
        })
        .collect::<Vec<_>>();
    lats.reverse();
    lats
}

/// Returns `P_n(x)` and its derivative.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    if n == 0 {
        return (p0, 0.0);
    }
    for k in 2..=n {
        let k = k as f64;
        let p2 = ((2.0 * k - 1.0) * x * p1 - (k - 1.0) * p0) / k;
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

const MAX_ITERATIONS: usize = 100;

// Finds a root (zero point) of the given function using Newton-Raphson
// method; `f` returns the Newton step.
fn find_root<F>(initial_guess: f64, f: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let mut x = initial_guess;
    for _ in 0..MAX_ITERATIONS {
        let dx = f(x);
        x -= dx;
        if dx.abs() < 1.0e-15 {
            break;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::helpers::test_helpers::{assert_almost_eq, gds_payload, lat_lon_octets};

    #[test]
    fn finding_root() {
        let actual = find_root(1.0, |x| {
            let fx = x * x - 2.0;
            let fpx = x * 2.0;
            fx / fpx
        });
        let expected = 1.41421356;
        assert_almost_eq!(actual, expected, 1.0e-8)
    }

    macro_rules! test_gaussian_latitudes {
        ($(($name:ident, $n:expr, $expected:expr),)*) => ($(
            #[test]
            fn $name() {
                let actual = gaussian_latitudes($n);
                let expected: &[f64] = &$expected;
                assert_eq!(actual.len(), expected.len());
                for (a, e) in actual.iter().zip(expected.iter()) {
                    assert_almost_eq!(*a, *e, 1.0e-9);
                }
            }
        )*);
    }

    test_gaussian_latitudes! {
        (gaussian_latitudes_of_degree_2, 2, [-35.26438968275466, 35.26438968275466]),
        (
            gaussian_latitudes_of_degree_4,
            4,
            [-59.44440828916677, -19.875719147440904, 19.875719147440904, 59.44440828916677]
        ),
    }

    #[test]
    fn gaussian_latitudes_are_symmetric_and_increasing() {
        let lats = gaussian_latitudes(94);
        assert!(lats.windows(2).all(|w| w[0] < w[1]));
        for (s, n) in lats.iter().zip(lats.iter().rev()) {
            assert_almost_eq!(*s, -*n, 1.0e-9);
        }
        assert!(lats[93] < 90.0);
    }

    #[test]
    fn rows_sit_on_gaussian_latitudes() {
        let def = GaussianGridDefinition::new(0.0, 192, 94);
        let (lat, lon) = def.xy_to_latlon(96.0, 10.0);
        assert_almost_eq!(lat, def.latitudes()[10], 1.0e-12);
        assert_almost_eq!(lon, -180.0, 1.0e-9);

        let (x, y) = def.latlon_to_xy(lat, lon);
        assert_almost_eq!(x, 96.0, 1.0e-9);
        assert_almost_eq!(y, 10.0, 1.0e-9);
    }

    #[test]
    fn fractional_rows_are_interpolated() {
        let def = GaussianGridDefinition::new(0.0, 8, 4);
        let (lat, _) = def.xy_to_latlon(0.0, 1.5);
        assert_almost_eq!(lat, 0.0, 1.0e-9);
        let (_, y) = def.latlon_to_xy(0.0, 0.0);
        assert_almost_eq!(y, 1.5, 1.0e-9);
    }

    #[test]
    fn definition_from_grid_description() {
        let mut gds = gds_payload(4, 192, 94, 0b00000000);
        gds[13..16].copy_from_slice(&lat_lon_octets(0.0));
        let gds = GridDescription::from_payload(gds).unwrap();

        let actual = GaussianGridDefinition::from_grid_description(&gds).unwrap();
        assert_eq!(actual.grid_shape(), (192, 94));
        assert_eq!(actual.latitudes().len(), 94);
    }
}
