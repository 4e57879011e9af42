use tracing::debug;

use super::{FieldRequest, LevelKind, MatchConfig, MatchKind, ProbabilityRequest};
use crate::{
    codetables::{
        LevelCategory, ParameterKey, ParameterTable, TABLES_ENV_VAR, UGRD, VGRD, lookup_level,
    },
    datatypes::{ProbabilityInfo, ProductDefinition},
    error::GribError,
};

pub const HI_RES_CTL: &str = "hi_res_ctl";
pub const LOW_RES_CTL: &str = "low_res_ctl";

const NCEP_ENSEMBLE_APPLICATION: u8 = 1;
const NCEP_CENTER: u8 = 7;
const NCEP_ENSEMBLE_SUBCENTER: u8 = 2;
const ACCUMULATION_INDICATOR: u8 = 4;

/// Checks a record against a request and reports whether its level bounds
/// equal or fall within the requested ones.
pub(crate) fn classify(
    request: &FieldRequest,
    pds: &ProductDefinition,
    rec_num: usize,
    table: &ParameterTable,
    config: &MatchConfig,
) -> Result<Option<MatchKind>, GribError> {
    if !is_prelim_match(request, pds, rec_num, table, config)? {
        return Ok(None);
    }
    let Some(level) = pds.level() else {
        return Ok(None);
    };

    let req = &request.level;
    if req.type_num.is_some_and(|t| t != level.type_num) {
        return Ok(None);
    }
    if !req.compares_bounds() || (level.lower == req.lower && level.upper == req.upper) {
        return Ok(Some(MatchKind::Exact));
    }
    if level.lower >= req.lower && level.upper <= req.upper {
        return Ok(Some(MatchKind::Range));
    }

    debug!(
        rec_num,
        requested_lower = req.lower,
        requested_upper = req.upper,
        lower = level.lower,
        upper = level.upper,
        "Level outside the requested bounds"
    );
    Ok(None)
}

/// The checks shared by exact and range matching. Errors are returned only
/// for requests that can never be satisfied.
pub(crate) fn is_prelim_match(
    request: &FieldRequest,
    pds: &ProductDefinition,
    rec_num: usize,
    table: &ParameterTable,
    config: &MatchConfig,
) -> Result<bool, GribError> {
    let table_version = request.table_version.unwrap_or(pds.table_version());
    let center = request.center.unwrap_or(pds.center());
    let subcenter = request.subcenter.unwrap_or(pds.subcenter());

    let member_matches = match (pds.ensemble(), &request.ensemble) {
        (Some(ens), Some(selector))
            if ens.application == NCEP_ENSEMBLE_APPLICATION
                && pds.center() == NCEP_CENTER
                && pds.subcenter() == NCEP_ENSEMBLE_SUBCENTER =>
        {
            parse_ensemble_member(selector)? == (ens.kind, ens.number)
        }
        _ => true,
    };

    if table_version != pds.table_version()
        || center != pds.center()
        || subcenter != pds.subcenter()
        || !member_matches
    {
        return Ok(false);
    }

    let Some(code) = resolve_code(request, table_version, center, subcenter, table, config)?
    else {
        return Ok(false);
    };

    let level = &request.level;
    if let Some(type_num) = level.type_num {
        if type_num != pds.level_type() {
            debug!(
                rec_num,
                requested = type_num,
                found = pds.level_type(),
                "Level type differs"
            );
            return Ok(false);
        }
    }

    let record_code = i32::from(pds.parameter_code());
    if level.kind == LevelKind::RecNumber {
        return Ok(usize::try_from(level.lower) == Ok(rec_num) && code == record_code);
    }
    if code != record_code {
        return Ok(false);
    }

    let time = pds.forecast_time()?;
    if request.init.is_some_and(|t| t != time.init)
        || request.valid.is_some_and(|t| t != time.valid)
        || request.lead.is_some_and(|s| s != time.lead())
    {
        return Ok(false);
    }

    if level.kind == LevelKind::Accum
        && (pds.time_range_indicator() != ACCUMULATION_INDICATOR
            || i64::from(level.lower) != time.accumulation
            || i64::from(level.upper) != time.accumulation)
    {
        return Ok(false);
    }

    if request
        .time_range_indicator
        .is_some_and(|tri| tri != pds.time_range_indicator())
    {
        return Ok(false);
    }

    if let Some(prob) = request.probability.filter(ProbabilityRequest::is_active) {
        if !probability_matches(&prob, pds.probability(), config.prob_tolerance) {
            return Ok(false);
        }
    }

    let Some(entry) = lookup_level(pds.level_type()) else {
        debug!(rec_num, level_type = pds.level_type(), "Unknown level type");
        return Ok(false);
    };
    let category_matches = match level.kind {
        LevelKind::Pres => entry.category == LevelCategory::Pressure,
        LevelKind::Vert => entry.category == LevelCategory::Vertical,
        _ => true,
    };
    Ok(category_matches)
}

/// Returns the parameter code the request stands for under the given table
/// keys, or `None` if the requested name is unknown there.
fn resolve_code(
    request: &FieldRequest,
    table_version: u8,
    center: u8,
    subcenter: u8,
    table: &ParameterTable,
    config: &MatchConfig,
) -> Result<Option<i32>, GribError> {
    let code = request.code;
    let name = match request.name.as_deref() {
        Some("WIND") if matches!(code, Some(UGRD | VGRD)) => None,
        name => name.map(normalize_name),
    };

    let key = ParameterKey {
        table_number: Some(i32::from(table_version)),
        code,
        center: Some(i32::from(center)),
        subcenter: Some(i32::from(subcenter)),
    };
    let fallback = ParameterKey {
        table_number: Some(i32::from(config.default_table_version)),
        code,
        center: Some(i32::from(config.default_center)),
        subcenter: Some(i32::from(config.default_subcenter)),
    };

    if let Some(name) = name {
        let entry = table
            .lookup_by_name(name, &key)
            .or_else(|| table.lookup_by_name(name, &fallback));
        return Ok(entry.map(|e| e.code));
    }

    let code = code.ok_or_else(|| {
        GribError::InvalidValueError("either a parameter name or code must be given".to_owned())
    })?;
    table
        .lookup_by_code(code, &key)
        .or_else(|| table.lookup_by_code(code, &fallback))
        .map(|e| Some(e.code))
        .ok_or_else(|| {
            GribError::ParameterLookup(format!(
                "no parameter with code {code} in table {table_version} of center {center}; \
                 list additional tables in {TABLES_ENV_VAR}"
            ))
        })
}

/// Maps accumulation-suffixed precipitation names such as `APCP_06` to
/// `APCP`.
fn normalize_name(name: &str) -> &str {
    match name.strip_prefix("APCP_") {
        Some(suffix) if suffix.bytes().all(|b| b.is_ascii_digit()) => "APCP",
        _ => name,
    }
}

/// Parses an NCEP ensemble member selector into `(type, number)`.
pub(crate) fn parse_ensemble_member(selector: &str) -> Result<(u8, u8), GribError> {
    match selector {
        HI_RES_CTL => return Ok((1, 1)),
        LOW_RES_CTL => return Ok((1, 2)),
        _ => {}
    }

    let invalid = || {
        GribError::InvalidValueError(format!(
            "unrecognized ensemble member '{selector}': expected '{HI_RES_CTL}', \
             '{LOW_RES_CTL}' or '+'/'-' followed by a number"
        ))
    };
    let (kind, digits) = if let Some(digits) = selector.strip_prefix('+') {
        (3, digits)
    } else if let Some(digits) = selector.strip_prefix('-') {
        (2, digits)
    } else {
        return Err(invalid());
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let number = digits.parse::<u8>().map_err(|_| invalid())?;
    Ok((kind, number))
}

fn probability_matches(
    request: &ProbabilityRequest,
    record: Option<ProbabilityInfo>,
    tolerance: f64,
) -> bool {
    let Some(record) = record else {
        return false;
    };
    request.code == record.code
        && threshold_matches(request.lower, record.lower, tolerance)
        && threshold_matches(request.upper, record.upper, tolerance)
}

fn threshold_matches(requested: Option<f64>, found: Option<f64>, tolerance: f64) -> bool {
    match (requested, found) {
        (_, None) => true,
        (Some(r), Some(f)) => (r - f).abs() < tolerance,
        (None, Some(_)) => false,
    }
}
