use crate::{
    datatypes::GridDescription,
    error::GribError,
    helpers::{lat_lon_from_bytes, rescale_deg, rescale_lon},
};

/// A regular latitude/longitude grid. Longitudes are degrees west-positive.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGridDefinition {
    /// Latitude of the lower-left (south-west) point.
    pub lat_ll: f64,
    /// Longitude of the lower-left (south-west) point.
    pub lon_ll: f64,
    pub delta_lat: f64,
    pub delta_lon: f64,
    pub nlat: usize,
    pub nlon: usize,
}

impl LatLonGridDefinition {
    /// Returns the shape of the grid, i.e. a tuple of the number of grids in
    /// the x and y directions.
    ///
    /// # Examples
    ///
    /// ```
    /// let def = grib1::LatLonGridDefinition {
    ///     lat_ll: -90.0,
    ///     lon_ll: 0.0,
    ///     delta_lat: 2.5,
    ///     delta_lon: 2.5,
    ///     nlat: 73,
    ///     nlon: 144,
    /// };
    /// assert_eq!(def.grid_shape(), (144, 73));
    /// ```
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.nlon, self.nlat)
    }

    /// Returns the grid type.
    pub fn short_name(&self) -> &'static str {
        "regular_ll"
    }

    pub fn xy_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let lat = self.lat_ll + y * self.delta_lat;
        let lon = rescale_lon(self.lon_ll - x * self.delta_lon);
        (lat, lon)
    }

    pub fn latlon_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = rescale_deg(self.lon_ll - lon, 0.0, 360.0) / self.delta_lon;
        let y = (lat - self.lat_ll) / self.delta_lat;
        (x, y)
    }

    pub(crate) fn from_grid_description(gds: &GridDescription) -> Result<Self, GribError> {
        let lat1 = lat_lon_from_bytes(gds.octets(11, 14)?);
        let lon1 = lat_lon_from_bytes(gds.octets(14, 17)?);
        let lat2 = lat_lon_from_bytes(gds.octets(18, 21)?);
        let lon2 = lat_lon_from_bytes(gds.octets(21, 24)?);
        let mode = gds.scanning_mode();

        let lat_ll = if mode.scans_positively_for_j() {
            lat1
        } else {
            lat2
        };
        let lon_ll = if mode.scans_positively_for_i() {
            lon1
        } else {
            lon2
        };

        let nlat = gds.ny();
        let nlon = gds.nx();

        // all bits set means the increment is not given
        let delta_lat = if gds.octets_all_bits_set(26, 28)? {
            (lat1 - lat2).abs() / nlat as f64
        } else {
            lat_lon_from_bytes(gds.octets(26, 28)?)
        };
        let delta_lon = if gds.octets_all_bits_set(24, 26)? {
            (lon1 - lon2).abs() / nlon as f64
        } else {
            lat_lon_from_bytes(gds.octets(24, 26)?)
        };

        Ok(Self {
            lat_ll,
            lon_ll: -rescale_lon(lon_ll),
            delta_lat,
            delta_lon,
            nlat,
            nlon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::helpers::test_helpers::{assert_almost_eq, gds_payload};

    fn global_2p5() -> LatLonGridDefinition {
        LatLonGridDefinition {
            lat_ll: -90.0,
            lon_ll: 0.0,
            delta_lat: 2.5,
            delta_lon: 2.5,
            nlat: 73,
            nlon: 144,
        }
    }

    #[test]
    fn definition_from_north_to_south_scan() {
        let mut gds = gds_payload(0, 144, 73, 0b00000000);
        gds[10..13].copy_from_slice(&[0x01, 0x5f, 0x90]); // 90.000
        gds[13..16].copy_from_slice(&[0, 0, 0]);
        gds[17..20].copy_from_slice(&[0x81, 0x5f, 0x90]); // -90.000
        gds[20..23].copy_from_slice(&[0x05, 0x74, 0x7c]); // 357.500
        gds[23..25].copy_from_slice(&[0x09, 0xc4]); // 2.500
        gds[25..27].copy_from_slice(&[0x09, 0xc4]);
        let gds = GridDescription::from_payload(gds).unwrap();

        let actual = LatLonGridDefinition::from_grid_description(&gds).unwrap();
        assert_eq!(actual, global_2p5());
    }

    #[test]
    fn increments_are_derived_when_not_given() {
        let mut gds = gds_payload(0, 10, 5, 0b01000000);
        gds[10..13].copy_from_slice(&[0x00, 0x27, 0x10]); // 10.000
        gds[13..16].copy_from_slice(&[0x01, 0xd4, 0xc0]); // 120.000
        gds[17..20].copy_from_slice(&[0x00, 0x9c, 0x40]); // 40.000
        gds[20..23].copy_from_slice(&[0x02, 0x49, 0xf0]); // 150.000
        gds[23..27].copy_from_slice(&[0xff; 4]);
        let gds = GridDescription::from_payload(gds).unwrap();

        let actual = LatLonGridDefinition::from_grid_description(&gds).unwrap();
        assert_almost_eq!(actual.lat_ll, 10.0, 1.0e-9);
        assert_almost_eq!(actual.lon_ll, -120.0, 1.0e-9);
        assert_almost_eq!(actual.delta_lat, 6.0, 1.0e-9);
        assert_almost_eq!(actual.delta_lon, 3.0, 1.0e-9);
    }

    macro_rules! test_xy_latlon {
        ($(($name:ident, $xy:expr, $latlon:expr),)*) => ($(
            #[test]
            fn $name() {
                let def = global_2p5();
                let (x, y) = $xy;
                let (lat, lon) = def.xy_to_latlon(x, y);
                assert_almost_eq!(lat, $latlon.0, 1.0e-9);
                assert_almost_eq!(lon, $latlon.1, 1.0e-9);

                let (x2, y2) = def.latlon_to_xy(lat, lon);
                assert_almost_eq!(x2, x, 1.0e-9);
                assert_almost_eq!(y2, y, 1.0e-9);
            }
        )*);
    }

    test_xy_latlon! {
        (latlon_of_origin, (0.0, 0.0), (-90.0, 0.0)),
        (latlon_of_first_step_east, (1.0, 0.0), (-90.0, -2.5)),
        (latlon_of_equator_dateline, (72.0, 36.0), (0.0, -180.0)),
        (latlon_of_western_hemisphere, (143.0, 72.0), (90.0, 2.5)),
    }
}
