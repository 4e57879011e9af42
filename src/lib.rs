pub mod codetables;
mod context;
mod datatypes;
mod decoders;
mod error;
mod field;
mod grid;
mod helpers;
pub mod matcher;
mod reader;
mod time;

pub use crate::{
    context::*,
    datatypes::*,
    error::*,
    field::*,
    grid::*,
    helpers::{
        grib_int_from_bytes, ibm_to_f64, lat_lon_from_bytes, rescale_deg, rescale_lon,
        uint_from_be_bytes,
    },
    reader::{Grib1Read, SeekableGrib1Reader},
};
