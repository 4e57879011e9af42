#![allow(dead_code)]

use std::io::{self, Write};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::NamedTempFile;

pub(crate) const NX: u16 = 4;
pub(crate) const NY: u16 = 3;

pub(crate) const HTGL: u8 = 105;
pub(crate) const ISBL: u8 = 100;

/// Reference time written by [`Message::to_bytes`].
pub(crate) fn init_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// A GRIB1 message packed with 8-bit words, reference value 0 and no
/// scaling, so that every decoded value equals its packed octet.
#[derive(Debug, Clone)]
pub(crate) struct Message {
    pub(crate) table_version: u8,
    pub(crate) center: u8,
    pub(crate) subcenter: u8,
    pub(crate) code: u8,
    pub(crate) level_type: u8,
    pub(crate) level: u16,
    pub(crate) p1: u8,
    pub(crate) p2: u8,
    pub(crate) time_range_indicator: u8,
    pub(crate) gds: Option<Vec<u8>>,
    pub(crate) bitmap: Option<Vec<bool>>,
    pub(crate) values: Vec<u8>,
}

impl Message {
    /// A field on the 4x3 lat-lon grid, valid 6 hours after [`init_time`].
    pub(crate) fn new(code: u8, level_type: u8, level: u16, values: Vec<u8>) -> Self {
        Self {
            table_version: 2,
            center: 7,
            subcenter: 1,
            code,
            level_type,
            level,
            p1: 6,
            p2: 0,
            time_range_indicator: 0,
            gds: Some(latlon_gds(NX, NY, 0b01000000)),
            bitmap: None,
            values,
        }
    }

    pub(crate) fn with_gds(mut self, gds: Option<Vec<u8>>) -> Self {
        self.gds = gds;
        self
    }

    pub(crate) fn with_bitmap(mut self, bitmap: Vec<bool>) -> Self {
        self.bitmap = Some(bitmap);
        self
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut flag = 0;
        if self.gds.is_some() {
            flag |= 0b10000000;
        }
        if self.bitmap.is_some() {
            flag |= 0b01000000;
        }

        let mut pds = vec![0u8; 28];
        pds[..3].copy_from_slice(&u24(28));
        pds[3] = self.table_version;
        pds[4] = self.center;
        pds[5] = 96;
        pds[6] = 255;
        pds[7] = flag;
        pds[8] = self.code;
        pds[9] = self.level_type;
        pds[10..12].copy_from_slice(&self.level.to_be_bytes());
        pds[12] = 24;
        pds[13] = 3;
        pds[14] = 1;
        pds[15] = 12;
        pds[17] = 1;
        pds[18] = self.p1;
        pds[19] = self.p2;
        pds[20] = self.time_range_indicator;
        pds[24] = 21;
        pds[25] = self.subcenter;

        let mut body = pds;
        if let Some(gds) = &self.gds {
            body.extend_from_slice(gds);
        }
        if let Some(bitmap) = &self.bitmap {
            let nbytes = bitmap.len().div_ceil(8);
            let mut bms = vec![0u8; 6 + nbytes];
            let bms_len = bms.len();
            bms[..3].copy_from_slice(&u24(bms_len));
            bms[3] = (nbytes * 8 - bitmap.len()) as u8;
            for (i, present) in bitmap.iter().enumerate() {
                if *present {
                    bms[6 + i / 8] |= 0b10000000 >> (i % 8);
                }
            }
            body.extend_from_slice(&bms);
        }

        let mut bds = vec![0u8; 11];
        bds[..3].copy_from_slice(&u24(11 + self.values.len()));
        bds[10] = 8;
        bds.extend_from_slice(&self.values);
        body.extend_from_slice(&bds);

        let total = 8 + body.len() + 4;
        let mut bytes = b"GRIB".to_vec();
        bytes.extend_from_slice(&u24(total));
        bytes.push(1);
        bytes.extend_from_slice(&body);
        bytes.extend_from_slice(b"7777");
        bytes
    }
}

fn u24(n: usize) -> [u8; 3] {
    let b = (n as u32).to_be_bytes();
    [b[1], b[2], b[3]]
}

/// Encodes degrees as a 3-octet sign-magnitude millidegree value.
pub(crate) fn lat_lon_octets(deg: f64) -> [u8; 3] {
    let milli = (deg * 1000.0).round() as i32;
    let mut octets = u24(milli.unsigned_abs() as usize);
    if milli < 0 {
        octets[0] |= 0b10000000;
    }
    octets
}

/// A 1-degree lat-lon grid with its first point at 30N 0E.
pub(crate) fn latlon_gds(nx: u16, ny: u16, scanning_mode: u8) -> Vec<u8> {
    let mut gds = vec![0u8; 32];
    gds[..3].copy_from_slice(&u24(32));
    gds[4] = 255;
    gds[5] = 0;
    gds[6..8].copy_from_slice(&nx.to_be_bytes());
    gds[8..10].copy_from_slice(&ny.to_be_bytes());
    gds[10..13].copy_from_slice(&lat_lon_octets(30.0));
    gds[13..16].copy_from_slice(&lat_lon_octets(0.0));
    gds[16] = 0b10000000;
    gds[17..20].copy_from_slice(&lat_lon_octets(30.0 + f64::from(ny - 1)));
    gds[20..23].copy_from_slice(&lat_lon_octets(f64::from(nx - 1)));
    gds[23..25].copy_from_slice(&1000u16.to_be_bytes());
    gds[25..27].copy_from_slice(&1000u16.to_be_bytes());
    gds[27] = scanning_mode;
    gds
}

/// A 40 km Lambert conformal grid tangent at 25N, oriented along 95W, with
/// its first point at 12.19N 133.459W.
pub(crate) fn lambert_gds(nx: u16, ny: u16, grid_relative_winds: bool) -> Vec<u8> {
    let mut gds = vec![0u8; 42];
    gds[..3].copy_from_slice(&u24(42));
    gds[4] = 255;
    gds[5] = 3;
    gds[6..8].copy_from_slice(&nx.to_be_bytes());
    gds[8..10].copy_from_slice(&ny.to_be_bytes());
    gds[10..13].copy_from_slice(&lat_lon_octets(12.19));
    gds[13..16].copy_from_slice(&lat_lon_octets(226.541));
    gds[16] = if grid_relative_winds {
        0b10001000
    } else {
        0b10000000
    };
    gds[17..20].copy_from_slice(&lat_lon_octets(265.0));
    gds[20..23].copy_from_slice(&u24(40635));
    gds[23..26].copy_from_slice(&u24(40635));
    gds[27] = 0b01000000;
    gds[28..31].copy_from_slice(&lat_lon_octets(25.0));
    gds[31..34].copy_from_slice(&lat_lon_octets(25.0));
    gds
}

pub(crate) fn grib_bytes(messages: &[Message]) -> Vec<u8> {
    messages.iter().flat_map(Message::to_bytes).collect()
}

pub(crate) fn write_tempfile(bytes: &[u8]) -> Result<NamedTempFile, io::Error> {
    let mut out = NamedTempFile::new()?;
    out.write_all(bytes)?;
    out.flush()?;
    Ok(out)
}

/// Returns `n` values counting up from `start`.
pub(crate) fn ramp(start: u8, n: usize) -> Vec<u8> {
    (0..n).map(|i| start + i as u8).collect()
}

pub(crate) fn filled(value: u8) -> Vec<u8> {
    vec![value; usize::from(NX) * usize::from(NY)]
}
