use crate::{
    datatypes::GridDescription,
    error::GribError,
    helpers::{lat_lon_from_bytes, rescale_deg, rescale_lon},
};

/// A Mercator grid spanning two corner points. Longitudes are degrees
/// west-positive.
#[derive(Debug, Clone, PartialEq)]
pub struct MercatorGridDefinition {
    pub lat_ll: f64,
    pub lon_ll: f64,
    pub lat_ur: f64,
    pub lon_ur: f64,
    /// Latitude at which the projection cylinder intersects the earth.
    pub latin: f64,
    pub nx: usize,
    pub ny: usize,
}

impl MercatorGridDefinition {
    /// Returns the shape of the grid, i.e. a tuple of the number of grids in
    /// the x and y directions.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Returns the grid type.
    pub fn short_name(&self) -> &'static str {
        "mercator"
    }

    /// Returns the longitude span covered eastward from the lower-left to
    /// the upper-right corner.
    pub fn lon_span(&self) -> f64 {
        let span = rescale_deg(self.lon_ll - self.lon_ur, 0.0, 360.0);
        if span < 0.01 { 359.9999 } else { span }
    }

    pub fn latlon_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = rescale_deg(self.lon_ll - lon, 0.0, 360.0) / self.lon_span()
            * (self.nx as f64 - 1.0);
        let v_ll = merc_func(self.lat_ll);
        let v_ur = merc_func(self.lat_ur);
        let y = (merc_func(lat) - v_ll) / (v_ur - v_ll) * (self.ny as f64 - 1.0);
        (x, y)
    }

    pub fn xy_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = rescale_lon(self.lon_ll - x * self.lon_span() / (self.nx as f64 - 1.0));
        let v_ll = merc_func(self.lat_ll);
        let v_ur = merc_func(self.lat_ur);
        let v = v_ll + y * (v_ur - v_ll) / (self.ny as f64 - 1.0);
        (merc_inv_func(v), lon)
    }

    pub(crate) fn from_grid_description(gds: &GridDescription) -> Result<Self, GribError> {
        let lat1 = lat_lon_from_bytes(gds.octets(11, 14)?);
        let lon1 = -rescale_lon(lat_lon_from_bytes(gds.octets(14, 17)?));
        let lat2 = lat_lon_from_bytes(gds.octets(18, 21)?);
        let lon2 = -rescale_lon(lat_lon_from_bytes(gds.octets(21, 24)?));
        let mode = gds.scanning_mode();

        let (lat_ll, lat_ur) = if mode.scans_positively_for_j() {
            (lat1, lat2)
        } else {
            (lat2, lat1)
        };
        let (lon_ll, lon_ur) = if mode.scans_positively_for_i() {
            (lon1, lon2)
        } else {
            (lon2, lon1)
        };

        Ok(Self {
            lat_ll,
            lon_ll,
            lat_ur,
            lon_ur,
            latin: lat_lon_from_bytes(gds.octets(24, 27)?),
            nx: gds.nx(),
            ny: gds.ny(),
        })
    }
}

fn merc_func(lat: f64) -> f64 {
    (45.0 + 0.5 * lat).to_radians().tan().ln()
}

fn merc_inv_func(v: f64) -> f64 {
    2.0 * v.exp().atan().to_degrees() - 90.0
}
