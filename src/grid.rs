use crate::{
    codetables::{Code, ProjectionType},
    datatypes::GridDescription,
    error::GribError,
};

pub use self::{
    gaussian::{GaussianGridDefinition, gaussian_latitudes},
    lambert::LambertGridDefinition,
    latlon::LatLonGridDefinition,
    mercator::MercatorGridDefinition,
    polar_stereographic::{PolarStereographicGridDefinition, TRUE_SCALE_LATITUDE},
    scan::{ScanOrder, ScanningMode},
};

mod gaussian;
#[cfg(test)]
pub(crate) mod helpers;
mod lambert;
mod latlon;
mod mercator;
mod polar_stereographic;
mod scan;

/// Radius of the spherical earth assumed by GRIB1 projections.
pub const EARTH_RADIUS_KM: f64 = 6371.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Reads the projection centre flag; bit 1 set means the south pole is
    /// on the projection plane.
    pub(crate) fn from_projection_centre_flag(flag: u8) -> Self {
        if flag & 0b10000000 != 0 {
            Self::South
        } else {
            Self::North
        }
    }
}

/// The map projection of a file's data, derived from the grid description of
/// its first record.
///
/// All longitudes taken and returned are degrees west-positive, in
/// `[-180, 180]`. Grid coordinates `(x, y)` count grid points eastward and
/// northward from the lower-left corner and may be fractional.
#[derive(Debug, Clone, PartialEq)]
pub enum GridDescriptor {
    LatLon(LatLonGridDefinition),
    Mercator(MercatorGridDefinition),
    Lambert(LambertGridDefinition),
    PolarStereographic(PolarStereographicGridDefinition),
    Gaussian(GaussianGridDefinition),
}

impl GridDescriptor {
    pub fn from_grid_description(gds: &GridDescription) -> Result<Self, GribError> {
        let projection_type = gds.projection_type();
        let grid = match Code::from(ProjectionType::try_from(projection_type)) {
            Code::Name(ProjectionType::LatLon) => {
                Self::LatLon(LatLonGridDefinition::from_grid_description(gds)?)
            }
            Code::Name(ProjectionType::Mercator) => {
                Self::Mercator(MercatorGridDefinition::from_grid_description(gds)?)
            }
            Code::Name(ProjectionType::LambertConformal) => {
                Self::Lambert(LambertGridDefinition::from_grid_description(gds)?)
            }
            Code::Name(ProjectionType::PolarStereographic) => Self::PolarStereographic(
                PolarStereographicGridDefinition::from_grid_description(gds)?,
            ),
            Code::Name(ProjectionType::Gaussian) => {
                Self::Gaussian(GaussianGridDefinition::from_grid_description(gds)?)
            }
            Code::Name(other) => {
                return Err(GribError::NotSupported(format!(
                    "grid type {projection_type} ({other:?})"
                )));
            }
            Code::Num(n) => {
                return Err(GribError::NotSupported(format!("grid type {n}")));
            }
        };
        Ok(grid)
    }

    /// Returns the shape of the grid, i.e. a tuple of the number of grids in
    /// the x and y directions.
    pub fn grid_shape(&self) -> (usize, usize) {
        match self {
            Self::LatLon(def) => def.grid_shape(),
            Self::Mercator(def) => def.grid_shape(),
            Self::Lambert(def) => def.grid_shape(),
            Self::PolarStereographic(def) => def.grid_shape(),
            Self::Gaussian(def) => def.grid_shape(),
        }
    }

    /// Returns the grid type.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::LatLon(def) => def.short_name(),
            Self::Mercator(def) => def.short_name(),
            Self::Lambert(def) => def.short_name(),
            Self::PolarStereographic(def) => def.short_name(),
            Self::Gaussian(def) => def.short_name(),
        }
    }

    /// Returns `(lat, lon)` of grid coordinates `(x, y)`.
    pub fn xy_to_latlon(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::LatLon(def) => def.xy_to_latlon(x, y),
            Self::Mercator(def) => def.xy_to_latlon(x, y),
            Self::Lambert(def) => def.xy_to_latlon(x, y),
            Self::PolarStereographic(def) => def.xy_to_latlon(x, y),
            Self::Gaussian(def) => def.xy_to_latlon(x, y),
        }
    }

    /// Returns grid coordinates `(x, y)` of `(lat, lon)`.
    pub fn latlon_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        match self {
            Self::LatLon(def) => def.latlon_to_xy(lat, lon),
            Self::Mercator(def) => def.latlon_to_xy(lat, lon),
            Self::Lambert(def) => def.latlon_to_xy(lat, lon),
            Self::PolarStereographic(def) => def.latlon_to_xy(lat, lon),
            Self::Gaussian(def) => def.latlon_to_xy(lat, lon),
        }
    }

    /// Returns `true` if the projection preserves angles, so that grid
    /// relative vectors can be turned to earth relative ones by a rotation.
    pub fn is_conformal(&self) -> bool {
        matches!(
            self,
            Self::Mercator(_) | Self::Lambert(_) | Self::PolarStereographic(_)
        )
    }

    /// Returns the angle in degrees, clockwise, from grid y to true north at
    /// `(x, y)`.
    pub fn rotation_grid_to_earth(&self, x: f64, y: f64) -> Result<f64, GribError> {
        match self {
            Self::Mercator(_) => Ok(0.0),
            Self::Lambert(def) => Ok(def.rotation_grid_to_earth(x, y)),
            Self::PolarStereographic(def) => Ok(def.rotation_grid_to_earth(x, y)),
            Self::LatLon(_) | Self::Gaussian(_) => Err(GribError::NotSupported(format!(
                "rotation of winds on a {} grid",
                self.short_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::helpers::test_helpers::gds_payload;

    macro_rules! test_grid_dispatch {
        ($(($name:ident, $projection_type:expr, $short_name:expr),)*) => ($(
            #[test]
            fn $name() {
                let gds = GridDescription::from_payload(gds_payload($projection_type, 4, 3, 0))
                    .unwrap();
                let grid = GridDescriptor::from_grid_description(&gds).unwrap();
                assert_eq!(grid.short_name(), $short_name);
                assert_eq!(grid.grid_shape(), (4, 3));
            }
        )*);
    }

    test_grid_dispatch! {
        (dispatch_latlon, 0, "regular_ll"),
        (dispatch_gaussian, 4, "regular_gg"),
    }

    macro_rules! test_unsupported_grid {
        ($(($name:ident, $projection_type:expr),)*) => ($(
            #[test]
            fn $name() {
                let gds = GridDescription::from_payload(gds_payload($projection_type, 4, 3, 0))
                    .unwrap();
                let result = GridDescriptor::from_grid_description(&gds);
                assert!(matches!(result, Err(GribError::NotSupported(_))));
            }
        )*);
    }

    test_unsupported_grid! {
        (rotated_latlon_is_not_supported, 10),
        (space_view_is_not_supported, 90),
        (unknown_grid_type_is_not_supported, 201),
    }

    #[test]
    fn rotation_is_not_supported_on_latlon_grid() {
        let gds = GridDescription::from_payload(gds_payload(0, 4, 3, 0)).unwrap();
        let grid = GridDescriptor::from_grid_description(&gds).unwrap();
        assert!(!grid.is_conformal());
        assert!(matches!(
            grid.rotation_grid_to_earth(0.0, 0.0),
            Err(GribError::NotSupported(_))
        ));
    }

    #[test]
    fn projection_centre_flag() {
        assert_eq!(Hemisphere::from_projection_centre_flag(0), Hemisphere::North);
        assert_eq!(
            Hemisphere::from_projection_centre_flag(0b10000000),
            Hemisphere::South
        );
    }
}
