use crate::{
    error::{GribError, ValidationError},
    field::{MISSING_VALUE, UnpackedField, is_missing},
    grid::GridDescriptor,
    helpers::rescale_deg,
};

/// Fails unless `u` and `v` cover the same grid, level and times.
pub(crate) fn check_alignment(u: &UnpackedField, v: &UnpackedField) -> Result<(), ValidationError> {
    if (u.nx, u.ny) != (v.nx, v.ny) {
        return Err(ValidationError::WindComponentMismatch(format!(
            "u grid is {}x{}, v grid is {}x{}",
            u.nx, u.ny, v.nx, v.ny
        )));
    }
    if !same_level_and_time(u, v) {
        return Err(ValidationError::WindComponentMismatch(format!(
            "u at level {} {}-{} valid {}, v at level {} {}-{} valid {}",
            u.level_type, u.lower, u.upper, u.valid, v.level_type, v.lower, v.upper, v.valid
        )));
    }
    Ok(())
}

pub(crate) fn same_level_and_time(a: &UnpackedField, b: &UnpackedField) -> bool {
    a.level_type == b.level_type
        && a.lower == b.lower
        && a.upper == b.upper
        && a.init == b.init
        && a.valid == b.valid
}

fn zip_present<F>(u: &[f64], v: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    u.iter()
        .zip(v)
        .map(|(u, v)| {
            if is_missing(*u) || is_missing(*v) {
                MISSING_VALUE
            } else {
                f(*u, *v)
            }
        })
        .collect()
}

pub(crate) fn wind_speed(u: &[f64], v: &[f64]) -> Vec<f64> {
    zip_present(u, v, f64::hypot)
}

/// Degrees clockwise from north of the vector `(u, v)`.
pub(crate) fn wind_direction(u: &[f64], v: &[f64]) -> Vec<f64> {
    zip_present(u, v, |u, v| rescale_deg(u.atan2(v).to_degrees(), 0.0, 360.0))
}

/// Returns the grid-to-earth rotation angle of every grid point, laid out
/// like [`UnpackedField::values`].
pub(crate) fn rotation_angles(
    grid: &GridDescriptor,
    nx: usize,
    ny: usize,
) -> Result<Vec<f64>, GribError> {
    let mut angles = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            angles.push(grid.rotation_grid_to_earth(x as f64, y as f64)?);
        }
    }
    Ok(angles)
}

/// Turns grid relative u components to earth relative ones.
pub(crate) fn rotate_u(u: &mut [f64], v: &[f64], angles: &[f64]) {
    rotate(u, v, angles, |u, v, (sin, cos)| cos * u + sin * v);
}

/// Turns grid relative v components to earth relative ones.
pub(crate) fn rotate_v(v: &mut [f64], u: &[f64], angles: &[f64]) {
    rotate(v, u, angles, |v, u, (sin, cos)| -sin * u + cos * v);
}

fn rotate<F>(values: &mut [f64], companion: &[f64], angles: &[f64], f: F)
where
    F: Fn(f64, f64, (f64, f64)) -> f64,
{
    for ((value, other), angle) in values.iter_mut().zip(companion).zip(angles) {
        if is_missing(*value) || is_missing(*other) {
            *value = MISSING_VALUE;
        } else {
            *value = f(*value, *other, angle.to_radians().sin_cos());
        }
    }
}

pub(crate) fn rotate_direction(directions: &mut [f64], angles: &[f64]) {
    for (direction, angle) in directions.iter_mut().zip(angles) {
        if !is_missing(*direction) {
            *direction = rescale_deg(*direction + angle, 0.0, 360.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::helpers::test_helpers::assert_almost_eq;

    macro_rules! test_wind {
        ($(($name:ident, $u:expr, $v:expr, $speed:expr, $direction:expr),)*) => ($(
            #[test]
            fn $name() {
                let speed = wind_speed(&[$u], &[$v]);
                let direction = wind_direction(&[$u], &[$v]);
                assert_almost_eq!(speed[0], $speed, 1.0e-12);
                assert_almost_eq!(direction[0], $direction, 1.0e-12);
            }
        )*);
    }

    test_wind! {
        (northward_wind, 0.0, 1.0, 1.0, 0.0),
        (eastward_wind, 1.0, 0.0, 1.0, 90.0),
        (southward_wind, 0.0, -2.0, 2.0, 180.0),
        (westward_wind, -1.0, 0.0, 1.0, 270.0),
        (three_four_five, 3.0, 4.0, 5.0, 36.86989764584402),
    }

    #[test]
    fn missing_component_gives_missing_wind() {
        let u = [MISSING_VALUE, 3.0, 1.0];
        let v = [1.0, MISSING_VALUE, 0.0];
        assert_eq!(wind_speed(&u, &v), vec![MISSING_VALUE, MISSING_VALUE, 1.0]);
        assert_eq!(
            wind_direction(&u, &v),
            vec![MISSING_VALUE, MISSING_VALUE, 90.0]
        );
    }

    #[test]
    fn rotation_preserves_speed() {
        let angles = [30.0, -45.0];
        let u0 = [3.0, -1.0];
        let v0 = [4.0, 2.0];

        let mut u = u0;
        let mut v = v0;
        rotate_u(&mut u, &v0, &angles);
        rotate_v(&mut v, &u0, &angles);
        for i in 0..2 {
            assert_almost_eq!(u[i].hypot(v[i]), u0[i].hypot(v0[i]), 1.0e-12);
        }
    }

    #[test]
    fn quarter_turn_rotation() {
        let angles = [90.0];
        let mut u = [0.0];
        let mut v = [1.0];
        rotate_u(&mut u, &[1.0], &angles);
        rotate_v(&mut v, &[0.0], &angles);
        assert_almost_eq!(u[0], 1.0, 1.0e-12);
        assert_almost_eq!(v[0], 0.0, 1.0e-12);
    }

    #[test]
    fn direction_rotation_wraps() {
        let mut directions = [350.0, MISSING_VALUE, 10.0];
        rotate_direction(&mut directions, &[20.0, 20.0, -20.0]);
        assert_almost_eq!(directions[0], 10.0, 1.0e-12);
        assert_eq!(directions[1], MISSING_VALUE);
        assert_almost_eq!(directions[2], 350.0, 1.0e-12);
    }
}
