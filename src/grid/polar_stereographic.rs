use tracing::warn;

use super::{EARTH_RADIUS_KM, Hemisphere};
use crate::{
    datatypes::GridDescription,
    error::GribError,
    helpers::{lat_lon_from_bytes, rescale_lon, uint_from_be_bytes},
};

/// Latitude at which a GRIB1 polar stereographic grid is true to scale.
pub const TRUE_SCALE_LATITUDE: f64 = 60.0;

/// A polar stereographic grid on a spherical earth. Longitudes are degrees
/// west-positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarStereographicGridDefinition {
    pub hemisphere: Hemisphere,
    /// Latitude of true scale, `+60` or `-60` by hemisphere.
    pub scale_lat: f64,
    pub lat_pin: f64,
    pub lon_pin: f64,
    pub lon_orient: f64,
    pub d_km: f64,
    pub r_km: f64,
    pub nx: usize,
    pub ny: usize,
}

impl PolarStereographicGridDefinition {
    /// Returns the shape of the grid, i.e. a tuple of the number of grids in
    /// the x and y directions.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Returns the grid type.
    pub fn short_name(&self) -> &'static str {
        "polar_stereographic"
    }

    fn is_north(&self) -> bool {
        self.hemisphere == Hemisphere::North
    }

    /// Signed angle from the orientation meridian, mirrored in the south.
    fn theta(&self, lon: f64) -> f64 {
        let theta = rescale_lon(self.lon_orient - lon);
        if self.is_north() { theta } else { -theta }
    }

    fn st_func(&self, lat: f64) -> f64 {
        if self.is_north() {
            tand(45.0 - 0.5 * lat)
        } else {
            tand(45.0 + 0.5 * lat)
        }
    }

    fn alpha(&self) -> f64 {
        (1.0 + sind(self.scale_lat.abs())) * (self.r_km / self.d_km)
    }

    fn origin(&self) -> (f64, f64) {
        let alpha = self.alpha();
        let r0 = self.st_func(self.lat_pin);
        let theta0 = self.theta(self.lon_pin);
        (-alpha * r0 * sind(theta0), alpha * r0 * cosd(theta0))
    }

    pub fn latlon_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let alpha = self.alpha();
        let (bx, by) = self.origin();
        let r = self.st_func(lat);
        let theta = self.theta(lon);
        (bx + alpha * r * sind(theta), by - alpha * r * cosd(theta))
    }

    pub fn xy_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let alpha = self.alpha();
        let (bx, by) = self.origin();
        let x = (x - bx) / alpha;
        let y = (y - by) / alpha;
        let r = x.hypot(y);

        let lat = 90.0 - 2.0 * r.atan().to_degrees();
        let theta = if r.abs() < 1.0e-5 {
            0.0
        } else {
            x.atan2(-y).to_degrees()
        };
        if self.is_north() {
            (lat, rescale_lon(self.lon_orient - theta))
        } else {
            (-lat, rescale_lon(self.lon_orient + theta))
        }
    }

    /// Returns the angle in degrees from grid y to true north at `(x, y)`.
    pub fn rotation_grid_to_earth(&self, x: f64, y: f64) -> f64 {
        let (_, lon) = self.xy_to_latlon(x, y);
        self.theta(lon)
    }

    pub(crate) fn from_grid_description(gds: &GridDescription) -> Result<Self, GribError> {
        let hemisphere = Hemisphere::from_projection_centre_flag(gds.octets(27, 28)?[0]);
        let scale_lat = match hemisphere {
            Hemisphere::North => TRUE_SCALE_LATITUDE,
            Hemisphere::South => -TRUE_SCALE_LATITUDE,
        };
        let dx = uint_from_be_bytes(gds.octets(21, 24)?);
        let dy = uint_from_be_bytes(gds.octets(24, 27)?);
        if dx != dy {
            warn!(dx, dy, "Polar stereographic grid spacing differs in x and y, using dx");
        }

        Ok(Self {
            hemisphere,
            scale_lat,
            lat_pin: lat_lon_from_bytes(gds.octets(11, 14)?),
            lon_pin: -rescale_lon(lat_lon_from_bytes(gds.octets(14, 17)?)),
            lon_orient: -rescale_lon(lat_lon_from_bytes(gds.octets(18, 21)?)),
            d_km: f64::from(dx) / 1000.0,
            r_km: EARTH_RADIUS_KM,
            nx: gds.nx(),
            ny: gds.ny(),
        })
    }
}

fn sind(deg: f64) -> f64 {
    deg.to_radians().sin()
}

fn cosd(deg: f64) -> f64 {
    deg.to_radians().cos()
}

fn tand(deg: f64) -> f64 {
    deg.to_radians().tan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::helpers::test_helpers::{assert_almost_eq, gds_payload, lat_lon_octets};

    fn alaska() -> PolarStereographicGridDefinition {
        PolarStereographicGridDefinition {
            hemisphere: Hemisphere::North,
            scale_lat: 60.0,
            lat_pin: 42.085,
            lon_pin: 175.641,
            lon_orient: 150.0,
            d_km: 11.25,
            r_km: EARTH_RADIUS_KM,
            nx: 825,
            ny: 553,
        }
    }

    fn antarctic() -> PolarStereographicGridDefinition {
        PolarStereographicGridDefinition {
            hemisphere: Hemisphere::South,
            scale_lat: -60.0,
            lat_pin: -36.0,
            lon_pin: -135.0,
            lon_orient: 0.0,
            d_km: 47.625,
            r_km: EARTH_RADIUS_KM,
            nx: 147,
            ny: 110,
        }
    }

    macro_rules! test_pin_point {
        ($(($name:ident, $def:expr),)*) => ($(
            #[test]
            fn $name() {
                let def = $def;
                let (x, y) = def.latlon_to_xy(def.lat_pin, def.lon_pin);
                assert_almost_eq!(x, 0.0, 1.0e-9);
                assert_almost_eq!(y, 0.0, 1.0e-9);

                let (lat, lon) = def.xy_to_latlon(0.0, 0.0);
                assert_almost_eq!(lat, def.lat_pin, 1.0e-9);
                assert_almost_eq!(lon, def.lon_pin, 1.0e-9);
            }
        )*);
    }

    test_pin_point! {
        (northern_pin_point_is_grid_origin, alaska()),
        (southern_pin_point_is_grid_origin, antarctic()),
    }

    macro_rules! test_round_trip {
        ($(($name:ident, $def:expr, $x:expr, $y:expr),)*) => ($(
            #[test]
            fn $name() {
                let def = $def;
                let (lat, lon) = def.xy_to_latlon($x, $y);
                let (x, y) = def.latlon_to_xy(lat, lon);
                assert_almost_eq!(x, $x, 1.0e-6);
                assert_almost_eq!(y, $y, 1.0e-6);
            }
        )*);
    }

    test_round_trip! {
        (northern_round_trip_at_corner, alaska(), 824.0, 552.0),
        (northern_round_trip_inside, alaska(), 400.5, 100.25),
        (southern_round_trip_at_corner, antarctic(), 146.0, 109.0),
        (southern_round_trip_inside, antarctic(), 73.0, 55.0),
    }

    #[test]
    fn pole_lies_on_orientation_meridian() {
        let def = antarctic();
        let (x_pole, y_pole) = def.latlon_to_xy(-90.0, 0.0);
        let (x, y) = def.latlon_to_xy(-70.0, def.lon_orient);
        assert_almost_eq!(x, x_pole, 1.0e-9);
        assert!(y != y_pole);
    }

    #[test]
    fn scale_is_true_at_sixty_degrees() {
        let def = alaska();
        let (x0, y0) = def.latlon_to_xy(60.0, 150.0);
        let (x1, y1) = def.latlon_to_xy(60.0 + 11.25 / 111.19893 * 0.1, 150.0);
        assert_almost_eq!((x1 - x0).hypot(y1 - y0), 0.1, 1.0e-4);
    }

    macro_rules! test_rotation {
        ($(($name:ident, $def:expr, $lon:expr, $expected:expr),)*) => ($(
            #[test]
            fn $name() {
                let def = $def;
                let (x, y) = def.latlon_to_xy(def.scale_lat, $lon);
                assert_almost_eq!(def.rotation_grid_to_earth(x, y), $expected, 1.0e-6);
            }
        )*);
    }

    test_rotation! {
        (northern_rotation_east_of_orientation, alaska(), 140.0, 10.0),
        (northern_rotation_west_of_orientation, alaska(), 165.0, -15.0),
        (southern_rotation_is_mirrored, antarctic(), 20.0, 20.0),
    }

    #[test]
    fn definition_from_grid_description() {
        let mut gds = gds_payload(5, 147, 110, 0b01000000);
        gds[10..13].copy_from_slice(&lat_lon_octets(-36.0));
        gds[13..16].copy_from_slice(&lat_lon_octets(135.0));
        gds[17..20].copy_from_slice(&lat_lon_octets(0.0));
        gds[20..23].copy_from_slice(&47625u32.to_be_bytes()[1..]);
        gds[23..26].copy_from_slice(&47625u32.to_be_bytes()[1..]);
        gds[26] = 0b10000000;
        let gds = GridDescription::from_payload(gds).unwrap();

        let actual = PolarStereographicGridDefinition::from_grid_description(&gds).unwrap();
        assert_eq!(actual.hemisphere, Hemisphere::South);
        assert_almost_eq!(actual.scale_lat, -60.0, 1.0e-9);
        assert_almost_eq!(actual.lat_pin, -36.0, 1.0e-9);
        assert_almost_eq!(actual.lon_pin, -135.0, 1.0e-9);
        assert_almost_eq!(actual.d_km, 47.625, 1.0e-9);
    }
}
