use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GribError {
    ParseError(ParseError),
    ValidationError(ValidationError),
    DecodeError(DecodeError),
    NotSupported(String),
    InvalidValueError(String),
    ParameterLookup(String),
    OperationError(String),
}

impl Error for GribError {
    fn description(&self) -> &str {
        "grib error"
    }
}

impl From<ParseError> for GribError {
    fn from(e: ParseError) -> Self {
        Self::ParseError(e)
    }
}

impl From<ValidationError> for GribError {
    fn from(e: ValidationError) -> Self {
        Self::ValidationError(e)
    }
}

impl From<DecodeError> for GribError {
    fn from(e: DecodeError) -> Self {
        Self::DecodeError(e)
    }
}

impl From<BuildError> for GribError {
    fn from(e: BuildError) -> Self {
        Self::ParseError(e.into())
    }
}

impl From<io::Error> for GribError {
    fn from(e: io::Error) -> Self {
        Self::ParseError(e.into())
    }
}

impl Display for GribError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::ParseError(e) => write!(f, "{e}"),
            Self::ValidationError(e) => write!(f, "{e}"),
            Self::DecodeError(e) => write!(f, "{e}"),
            Self::NotSupported(s) => write!(f, "Not supported: {s}"),
            Self::InvalidValueError(s) => write!(f, "Invalid value: {s}"),
            Self::ParameterLookup(s) => write!(f, "Parameter lookup failed: {s}"),
            Self::OperationError(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseError {
    ReadError(String),
    NotGRIB,
    GRIBVersionMismatch(u8),
    EndSectionMismatch {
        offset: u64,
    },
    UnexpectedEndOfData {
        offset: u64,
        expected: usize,
        found: usize,
    },
    SectionLengthOverflow {
        section: u8,
        offset: u64,
        declared: usize,
        available: usize,
    },
    NoGridDefinition(u64),
    NoRecords,
}

impl ParseError {
    /// Returns `true` if the error damages only the record being read, so
    /// that records preceding it are still usable.
    pub fn is_record_corruption(&self) -> bool {
        matches!(
            self,
            Self::EndSectionMismatch { .. } | Self::UnexpectedEndOfData { .. }
        )
    }
}

impl Error for ParseError {
    fn description(&self) -> &str {
        "grib parse error"
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::ReadError(s) => write!(f, "Read error: {s}"),
            Self::NotGRIB => write!(f, "Not GRIB data: marker \"GRIB\" not found"),
            Self::GRIBVersionMismatch(i) => write!(f, "Not GRIB version 1: {i}"),
            Self::EndSectionMismatch { offset } => {
                write!(f, "Trailing \"7777\" not found in record at {offset}")
            }
            Self::UnexpectedEndOfData {
                offset,
                expected,
                found,
            } => write!(
                f,
                "Unexpected end of data in record at {offset}: expected {expected} bytes, found {found}"
            ),
            Self::SectionLengthOverflow {
                section,
                offset,
                declared,
                available,
            } => write!(
                f,
                "Section {section} of record at {offset} declares {declared} bytes but only {available} remain"
            ),
            Self::NoGridDefinition(i) => {
                write!(f, "Grid Description Section not found in record at {i}")
            }
            Self::NoRecords => write!(f, "No valid GRIB records found"),
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        Self::ReadError(e.to_string())
    }
}

impl From<BuildError> for ParseError {
    fn from(e: BuildError) -> Self {
        Self::ReadError(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildError {
    SectionSizeTooSmall { section: u8, size: usize },
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::SectionSizeTooSmall { section, size } => {
                write!(f, "Section {section} size is too small: {size}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DecodeError {
    SphericalHarmonicsUnsupported,
    SecondOrderPackingUnsupported,
    WordSizeTooLarge(u8),
    ValueIndexOutOfRange { index: usize, count: usize },
    LengthMismatch { expected: usize, found: usize },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::SphericalHarmonicsUnsupported => {
                write!(f, "Spherical harmonic coefficients are not supported")
            }
            Self::SecondOrderPackingUnsupported => {
                write!(f, "Second order packing is not supported")
            }
            Self::WordSizeTooLarge(w) => {
                write!(f, "Word size must be 32 bits or less: {w}")
            }
            Self::ValueIndexOutOfRange { index, count } => {
                write!(f, "Packed value {index} requested but only {count} present")
            }
            Self::LengthMismatch { expected, found } => {
                write!(f, "Length mismatch: expected {expected}, found {found}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationError {
    GridPointOutOfRange {
        x: usize,
        y: usize,
        nx: usize,
        ny: usize,
    },
    OffsetOutOfRange {
        offset: usize,
        len: usize,
    },
    RecordIndexOutOfRange {
        index: usize,
        len: usize,
    },
    WindComponentMismatch(String),
}

impl Error for ValidationError {}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::GridPointOutOfRange { x, y, nx, ny } => {
                write!(f, "Grid point ({x}, {y}) is outside a {nx}x{ny} grid")
            }
            Self::OffsetOutOfRange { offset, len } => {
                write!(f, "Offset {offset} is outside a grid of {len} points")
            }
            Self::RecordIndexOutOfRange { index, len } => {
                write!(f, "Record index {index} is out of range (file has {len} records)")
            }
            Self::WindComponentMismatch(s) => {
                write!(f, "U and V components do not align: {s}")
            }
        }
    }
}
