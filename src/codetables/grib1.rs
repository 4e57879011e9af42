use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Table 6: data representation type, i.e. the map projection of the grid.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ProjectionType {
    LatLon = 0,
    Mercator,
    Gnomonic,
    LambertConformal,
    Gaussian,
    PolarStereographic,
    UniversalTransverseMercator,
    SimplePolyconic,
    AlbersEqualArea,
    MillersCylindrical,
    RotatedLatLon,
    ObliqueLambertConformal = 13,
    RotatedGaussian,
    StretchedLatLon = 20,
    StretchedGaussian = 24,
    StretchedRotatedLatLon = 30,
    StretchedRotatedGaussian = 34,
    SphericalHarmonics = 50,
    RotatedSphericalHarmonics = 60,
    StretchedSphericalHarmonics = 70,
    StretchedRotatedSphericalHarmonics = 80,
    SpaceView = 90,
}

/// Table 4: unit of time used for P1 and P2.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TimeUnit {
    Minute = 0,
    Hour,
    Day,
    Month,
    Year,
    Decade,
    Normal,
    Century,
    ThreeHours = 10,
    SixHours,
    TwelveHours,
    QuarterHour,
    HalfHour,
    Second = 254,
}

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86400;

impl TimeUnit {
    /// Returns the length of the unit in seconds. Months count 30 days and
    /// years 365 days.
    pub fn seconds(&self) -> i64 {
        match self {
            Self::Minute => SECONDS_PER_MINUTE,
            Self::Hour => SECONDS_PER_HOUR,
            Self::Day => SECONDS_PER_DAY,
            Self::Month => SECONDS_PER_DAY * 30,
            Self::Year => SECONDS_PER_DAY * 365,
            Self::Decade => SECONDS_PER_DAY * 365 * 10,
            Self::Normal => SECONDS_PER_DAY * 365 * 30,
            Self::Century => SECONDS_PER_DAY * 365 * 100,
            Self::ThreeHours => SECONDS_PER_HOUR * 3,
            Self::SixHours => SECONDS_PER_HOUR * 6,
            Self::TwelveHours => SECONDS_PER_HOUR * 12,
            Self::QuarterHour => SECONDS_PER_MINUTE * 15,
            Self::HalfHour => SECONDS_PER_MINUTE * 30,
            Self::Second => 1,
        }
    }

    pub fn short_expr(&self) -> &'static str {
        match self {
            Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "D",
            Self::Month => "M",
            Self::Year => "Y",
            Self::Decade => "10Y",
            Self::Normal => "30Y",
            Self::Century => "C",
            Self::ThreeHours => "3h",
            Self::SixHours => "6h",
            Self::TwelveHours => "12h",
            Self::QuarterHour => "15m",
            Self::HalfHour => "30m",
            Self::Second => "s",
        }
    }
}

/// Table 5: time range indicator, telling how P1 and P2 relate the reference
/// time to the valid time.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TimeRangeIndicator {
    /// Valid at reference time + P1.
    ValidAtP1 = 0,
    /// Initialized analysis valid at reference time.
    InitializedAnalysis,
    /// Valid between reference time + P1 and reference time + P2.
    ValidBetween,
    Average,
    Accumulation,
    Difference,
    AverageBeforeReference,
    AverageAroundReference,
    /// P1 occupies octets 19 and 20.
    LongP1 = 10,
    ClimatologicalMean = 51,
    ClimatologicalStandardDeviation = 136,
}
