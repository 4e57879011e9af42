use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use tracing::warn;

use super::{EARTH_RADIUS_KM, Hemisphere};
use crate::{
    datatypes::GridDescription,
    error::GribError,
    helpers::{lat_lon_from_bytes, rescale_lon, uint_from_be_bytes},
};

/// A Lambert conformal conic grid on a spherical earth. Longitudes are
/// degrees west-positive.
#[derive(Debug, Clone, PartialEq)]
pub struct LambertGridDefinition {
    /// Projection centre flag as decoded. The cone math takes the hemisphere
    /// from the sign of `scale_lat_1` instead.
    pub hemisphere: Hemisphere,
    pub scale_lat_1: f64,
    pub scale_lat_2: f64,
    /// Latitude of grid point `(0, 0)`.
    pub lat_pin: f64,
    /// Longitude of grid point `(0, 0)`.
    pub lon_pin: f64,
    /// Orientation longitude, along which grid y points north.
    pub lon_orient: f64,
    pub d_km: f64,
    pub r_km: f64,
    pub nx: usize,
    pub ny: usize,
}

struct Cone {
    n: f64,
    alpha: f64,
    bx: f64,
    by: f64,
}

impl LambertGridDefinition {
    /// Returns the shape of the grid, i.e. a tuple of the number of grids in
    /// the x and y directions.
    ///
    /// # Examples
    ///
    /// ```
    /// let def = grib1::LambertGridDefinition {
    ///     hemisphere: grib1::Hemisphere::North,
    ///     scale_lat_1: 25.0,
    ///     scale_lat_2: 25.0,
    ///     lat_pin: 12.19,
    ///     lon_pin: 133.459,
    ///     lon_orient: 95.0,
    ///     d_km: 40.635,
    ///     r_km: 6371.2,
    ///     nx: 185,
    ///     ny: 129,
    /// };
    /// assert_eq!(def.grid_shape(), (185, 129));
    /// ```
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Returns the grid type.
    pub fn short_name(&self) -> &'static str {
        "lambert"
    }

    /// Returns the cone constant.
    pub fn cone_constant(&self) -> f64 {
        let phi1 = self.scale_lat_1.to_radians();
        let phi2 = self.scale_lat_2.to_radians();
        if (phi1 - phi2).abs() < 1.0e-5 {
            phi1.sin()
        } else {
            let t = phi1.cos() / phi2.cos();
            let b = (FRAC_PI_4 - 0.5 * phi1).tan() / (FRAC_PI_4 - 0.5 * phi2).tan();
            t.ln() / b.ln()
        }
    }

    fn cone(&self) -> Cone {
        let n = self.cone_constant();
        let phi1 = self.scale_lat_1.to_radians();
        let alpha = (-1.0 / lc_der_func(phi1, n)) * (self.r_km / self.d_km);

        let r0 = lc_func(self.lat_pin.to_radians(), n);
        let theta0 = n * rescale_lon(self.lon_orient - self.lon_pin).to_radians();
        Cone {
            n,
            alpha,
            bx: -alpha * r0 * theta0.sin(),
            by: alpha * r0 * theta0.cos(),
        }
    }

    pub fn latlon_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let cone = self.cone();
        let r = lc_func(lat.to_radians(), cone.n);
        let theta = cone.n * rescale_lon(self.lon_orient - lon).to_radians();
        let x = cone.bx + cone.alpha * r * theta.sin();
        let y = cone.by - cone.alpha * r * theta.cos();
        (x, y)
    }

    pub fn xy_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let cone = self.cone();
        let x = (x - cone.bx) / cone.alpha;
        let y = (y - cone.by) / cone.alpha;
        let r = x.hypot(y);

        let lat = (FRAC_PI_2 - 2.0 * r.powf(1.0 / cone.n).atan()).to_degrees();
        let theta = if r.abs() < 1.0e-5 { 0.0 } else { x.atan2(-y) };
        let lon = rescale_lon(self.lon_orient - (theta / cone.n).to_degrees());
        (lat, lon)
    }

    /// Returns the angle in degrees from grid y to true north at `(x, y)`.
    pub fn rotation_grid_to_earth(&self, x: f64, y: f64) -> f64 {
        let (_, lon) = self.xy_to_latlon(x, y);
        let hemi = if self.scale_lat_1 < 0.0 { -1.0 } else { 1.0 };
        rescale_lon(self.lon_orient - lon) * self.cone_constant() * hemi
    }

    pub(crate) fn from_grid_description(gds: &GridDescription) -> Result<Self, GribError> {
        let hemisphere = Hemisphere::from_projection_centre_flag(gds.octets(27, 28)?[0]);
        let dx = uint_from_be_bytes(gds.octets(21, 24)?);
        let dy = uint_from_be_bytes(gds.octets(24, 27)?);
        if dx != dy {
            warn!(dx, dy, "Lambert grid spacing differs in x and y, using dx");
        }

        Ok(Self {
            hemisphere,
            scale_lat_1: lat_lon_from_bytes(gds.octets(29, 32)?),
            scale_lat_2: lat_lon_from_bytes(gds.octets(32, 35)?),
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

fn lc_func(lat: f64, cone: f64) -> f64 {
    (FRAC_PI_4 - 0.5 * lat).tan().powf(cone)
}

fn lc_der_func(lat: f64, cone: f64) -> f64 {
    -(cone / lat.cos()) * lc_func(lat, cone)
}
