use chrono::{DateTime, LocalResult, TimeDelta, TimeZone, Utc};

use crate::{
    codetables::{Code, Name, Num, TimeRangeIndicator, TimeUnit},
    error::GribError,
};

#[inline]
pub(crate) fn create_date_time(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<DateTime<Utc>, GribError> {
    let result = Utc.with_ymd_and_hms(year, month, day, hour, minute, second);
    match result {
        LocalResult::Single(dt) => Ok(dt),
        _ => Err(GribError::InvalidValueError(format!(
            "invalid date time: {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
        ))),
    }
}

/// Returns the valid time and the accumulation length in seconds for a
/// record initialized at `init`.
pub(crate) fn valid_time_and_accumulation(
    init: DateTime<Utc>,
    unit: u8,
    p1: u8,
    p2: u8,
    indicator: u8,
) -> Result<(DateTime<Utc>, i64), GribError> {
    let unit_seconds = match Code::from(TimeUnit::try_from(unit)) {
        Name(unit) => unit.seconds(),
        Num(n) => {
            return Err(GribError::InvalidValueError(format!(
                "unexpected forecast time unit: {n}"
            )));
        }
    };
    let p1 = i64::from(p1);
    let p2 = i64::from(p2);
    let after = |periods: i64| {
        TimeDelta::try_seconds(periods * unit_seconds)
            .and_then(|delta| init.checked_add_signed(delta))
            .ok_or_else(|| {
                GribError::InvalidValueError(format!(
                    "valid time out of range: {periods} periods of {unit_seconds} s from {init}"
                ))
            })
    };

    let indicator = match Code::from(TimeRangeIndicator::try_from(indicator)) {
        Name(tri) => tri,
        Num(n) => {
            return Err(GribError::InvalidValueError(format!(
                "unexpected time range indicator: {n}"
            )));
        }
    };

    let times = match indicator {
        TimeRangeIndicator::ValidAtP1 => (after(p1)?, 0),
        TimeRangeIndicator::InitializedAnalysis
        | TimeRangeIndicator::ClimatologicalMean
        | TimeRangeIndicator::ClimatologicalStandardDeviation => (init, 0),
        TimeRangeIndicator::ValidBetween
        | TimeRangeIndicator::Average
        | TimeRangeIndicator::Difference
        | TimeRangeIndicator::AverageAroundReference => (after(p2)?, 0),
        TimeRangeIndicator::Accumulation => (after(p2)?, (p2 - p1) * unit_seconds),
        TimeRangeIndicator::AverageBeforeReference => (after(-p2)?, 0),
        TimeRangeIndicator::LongP1 => (after((p1 << 8) | p2)?, 0),
    };
    Ok(times)
}
