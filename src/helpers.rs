/// Decodes a big-endian unsigned integer of up to 4 octets.
///
/// GRIB1 stores lengths in 3 octets and point counts in 2, so the width is
/// taken from the slice.
///
/// # Examples
///
/// ```
/// assert_eq!(grib1::uint_from_be_bytes(&[0x01, 0x02]), 0x0102);
/// assert_eq!(grib1::uint_from_be_bytes(&[0x00, 0x01, 0x00]), 256);
/// ```
pub fn uint_from_be_bytes(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

/// Decodes a sign-magnitude integer of up to 4 octets, where the most
/// significant bit carries the sign.
pub fn grib_int_from_bytes(bytes: &[u8]) -> i32 {
    let Some((first, rest)) = bytes.split_first() else {
        return 0;
    };
    let negative = first.leading_zeros() == 0;
    let abs = rest
        .iter()
        .take(3)
        .fold(u32::from(first << 1 >> 1), |acc, b| (acc << 8) | u32::from(*b));
    let abs = abs as i32;
    if negative { -abs } else { abs }
}

/// Decodes a 32-bit IBM System/360 floating-point number: a sign bit, a
/// 7-bit excess-64 base-16 exponent and a 24-bit mantissa.
///
/// A zero mantissa always yields `0.0`.
///
/// # Examples
///
/// ```
/// assert_eq!(grib1::ibm_to_f64([0x42, 0x64, 0x00, 0x00]), 100.0);
/// assert_eq!(grib1::ibm_to_f64([0xc1, 0x10, 0x00, 0x00]), -1.0);
/// assert_eq!(grib1::ibm_to_f64([0xff, 0x00, 0x00, 0x00]), 0.0);
/// ```
pub fn ibm_to_f64(bytes: [u8; 4]) -> f64 {
    let mantissa = uint_from_be_bytes(&bytes[1..]);
    if mantissa == 0 {
        return 0.0;
    }
    let exponent = i32::from(bytes[0] & 0x7f) - 64;
    let value = f64::from(mantissa) / 16_777_216.0 * 16f64.powi(exponent);
    if bytes[0] & 0x80 != 0 { -value } else { value }
}

/// Decodes a latitude or longitude stored in millidegrees as a
/// sign-magnitude integer.
pub fn lat_lon_from_bytes(bytes: &[u8]) -> f64 {
    0.001 * f64::from(grib_int_from_bytes(bytes))
}

pub(crate) fn all_bits_set(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0xff)
}

/// Brings a longitude into `[-180, 180]`.
pub fn rescale_lon(lon: f64) -> f64 {
    let mut lon = lon;
    while lon < -180.0 {
        lon += 360.0;
    }
    while lon > 180.0 {
        lon -= 360.0;
    }
    lon
}

/// Brings an angle into `[lower, upper]`, where the limits span 360 degrees.
pub fn rescale_deg(deg: f64, lower: f64, upper: f64) -> f64 {
    let mut deg = deg;
    while deg < lower {
        deg += 360.0;
    }
    while deg > upper {
        deg -= 360.0;
    }
    deg
}
