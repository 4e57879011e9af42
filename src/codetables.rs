//! Code tables needed to interpret GRIB edition 1 records.

use num_enum::{TryFromPrimitive, TryFromPrimitiveError};

pub use self::{grib1::*, levels::*, params::*};

mod grib1;
mod levels;
mod params;

/// A code looked up in a table: either a known table entry or the raw number
/// when the table has no entry for it.
#[derive(Debug, PartialEq, Eq)]
pub enum Code<Enum, N> {
    Name(Enum),
    Num(N),
}

impl<Enum, N> From<Result<Enum, TryFromPrimitiveError<Enum>>> for Code<Enum, N>
where
    Enum: TryFromPrimitive<Primitive = N>,
{
    fn from(result: Result<Enum, TryFromPrimitiveError<Enum>>) -> Self {
        match result {
            Ok(e) => Self::Name(e),
            Err(TryFromPrimitiveError { number: n }) => Self::Num(n),
        }
    }
}

pub use Code::{Name, Num};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_from_lookup_result() {
        assert_eq!(
            Code::from(ProjectionType::try_from(3u8)),
            Name(ProjectionType::LambertConformal)
        );
        assert_eq!(Code::from(ProjectionType::try_from(99u8)), Num(99));
    }
}
