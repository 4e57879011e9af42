//! Selection of fields by parameter, level, time, ensemble member and
//! probability, with wind speed and direction derived from their components.

use tracing::{debug, warn};

pub use self::{
    predicate::{HI_RES_CTL, LOW_RES_CTL},
    request::{FieldRequest, LevelKind, LevelRequest, ProbabilityRequest},
};
use crate::{
    codetables::{ParameterTable, UGRD, VGRD, WDIR, WIND},
    context::Grib1,
    datatypes::{BinaryRecord, GridDescription},
    error::*,
    field::UnpackedField,
    grid::GridDescriptor,
    reader::Grib1Read,
};

mod predicate;
mod request;
mod wind;

/// Tunables of the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// Absolute tolerance for probability thresholds.
    pub prob_tolerance: f64,
    /// Parameter table keys tried when a lookup with the record's own keys
    /// fails.
    pub default_table_version: u8,
    pub default_center: u8,
    pub default_subcenter: u8,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            prob_tolerance: 1.0e-4,
            default_table_version: 2,
            default_center: 7,
            default_subcenter: 1,
        }
    }
}

/// How a record's level relates to the requested bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// The record's bounds equal the requested ones.
    Exact,
    /// The record's bounds lie within the requested ones.
    Range,
}

/// Result of matching one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    NoMatch,
    /// Exact match of the record at the given file offset.
    Exact(u64),
    /// Range match of the record at the given file offset.
    Range(u64),
}

/// A selected field, earth relative when it is a wind quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: UnpackedField,
    pub grid: GridDescriptor,
    pub kind: MatchKind,
    /// 0-based record index; for derived winds, that of the u component.
    pub index: usize,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    index: usize,
    offset: u64,
    kind: MatchKind,
}

/// Answers [`FieldRequest`]s against one file.
///
/// # Examples
///
/// ```no_run
/// use grib1::{
///     codetables::ParameterTable,
///     matcher::{FieldRequest, LevelRequest, MatchConfig, Matcher},
/// };
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let grib1 = grib1::open("gfs.t00z.pgrbf06")?;
///     let table = ParameterTable::from_env()?;
///     let config = MatchConfig::default();
///     let matcher = Matcher::new(&grib1, &table, &config);
///
///     let request = FieldRequest::named("TMP").with_level(LevelRequest::pressure(500, 500));
///     if let Some(found) = matcher.find_first(&request)? {
///         println!("{} points, lead {} s", found.field.len(), found.field.lead);
///     }
///     Ok(())
/// }
/// ```
pub struct Matcher<'a, R> {
    grib1: &'a Grib1<R>,
    table: &'a ParameterTable,
    config: &'a MatchConfig,
}

impl<'a, R: Grib1Read> Matcher<'a, R> {
    pub fn new(
        grib1: &'a Grib1<R>,
        table: &'a ParameterTable,
        config: &'a MatchConfig,
    ) -> Self {
        Self {
            grib1,
            table,
            config,
        }
    }

    /// Matches record `i` against `request`.
    pub fn match_record(&self, i: usize, request: &FieldRequest) -> Result<MatchOutcome, GribError> {
        let record = self.grib1.read_record(i)?;
        self.match_binary_record(&record, request)
    }

    /// Matches an already read record against `request`.
    pub fn match_binary_record(
        &self,
        record: &BinaryRecord,
        request: &FieldRequest,
    ) -> Result<MatchOutcome, GribError> {
        let kind = predicate::classify(
            request,
            record.product_definition(),
            record.rec_num(),
            self.table,
            self.config,
        )?;
        let outcome = match kind {
            Some(MatchKind::Exact) => MatchOutcome::Exact(record.offset()),
            Some(MatchKind::Range) => MatchOutcome::Range(record.offset()),
            None => MatchOutcome::NoMatch,
        };
        Ok(outcome)
    }

    /// Returns the field best answering `request`: the first exact match
    /// for pressure and height requests, otherwise the first range match.
    /// Wind speed and direction are derived from u and v when the file has
    /// no record of them.
    pub fn find_first(&self, request: &FieldRequest) -> Result<Option<FieldMatch>, GribError> {
        if let Some(found) = self.find_first_stored(request)? {
            return Ok(Some(found));
        }
        match derived_quantity(request) {
            Some(code) => self.derive_first(request, code),
            None => Ok(None),
        }
    }

    /// Returns every field whose level lies within the requested bounds, in
    /// file order.
    pub fn find_all(&self, request: &FieldRequest) -> Result<Vec<FieldMatch>, GribError> {
        let found = self.find_all_stored(request)?;
        if !found.is_empty() {
            return Ok(found);
        }
        match derived_quantity(request) {
            Some(code) => self.derive_all(request, code),
            None => Ok(found),
        }
    }

    fn candidates(&self, request: &FieldRequest) -> Result<Vec<Candidate>, GribError> {
        let mut record = BinaryRecord::default();
        let mut candidates = Vec::new();
        for index in 0..self.grib1.len() {
            self.grib1.read_record_into(index, &mut record)?;
            let kind = predicate::classify(
                request,
                record.product_definition(),
                record.rec_num(),
                self.table,
                self.config,
            )?;
            if let Some(kind) = kind {
                candidates.push(Candidate {
                    index,
                    offset: record.offset(),
                    kind,
                });
            }
        }
        Ok(candidates)
    }

    fn find_first_stored(&self, request: &FieldRequest) -> Result<Option<FieldMatch>, GribError> {
        let candidates = self.candidates(request)?;
        let exact = candidates.iter().find(|c| c.kind == MatchKind::Exact);
        let chosen = match exact {
            Some(c) if request.level.prefers_exact() => Some(c),
            _ => {
                if candidates.len() > 1 {
                    warn!(
                        matches = candidates.len(),
                        offset = candidates[0].offset,
                        "Several records match the request, using the first"
                    );
                }
                candidates.first()
            }
        };
        chosen.map(|c| self.load(c)).transpose()
    }

    fn find_all_stored(&self, request: &FieldRequest) -> Result<Vec<FieldMatch>, GribError> {
        self.candidates(request)?
            .iter()
            .map(|c| self.load(c))
            .collect()
    }

    fn load(&self, candidate: &Candidate) -> Result<FieldMatch, GribError> {
        let record = self.grib1.read_record(candidate.index)?;
        let mut field = self.grib1.unpack_record(&record)?;
        self.to_earth_relative(&record, &mut field)?;
        Ok(FieldMatch {
            field,
            grid: self.grib1.grid().clone(),
            kind: candidate.kind,
            index: candidate.index,
            offset: candidate.offset,
        })
    }

    /// Rotates grid relative wind components and directions to earth
    /// relative ones. Scalars are left alone.
    fn to_earth_relative(
        &self,
        record: &BinaryRecord,
        field: &mut UnpackedField,
    ) -> Result<(), GribError> {
        let code = i32::from(record.code());
        if !matches!(code, UGRD | VGRD | WDIR) {
            return Ok(());
        }
        let grid_relative = record
            .grid_description()
            .map_or(self.grib1.has_grid_relative_winds(), GridDescription::has_grid_relative_winds);
        if !grid_relative {
            return Ok(());
        }
        let grid = self.grib1.grid();
        if !grid.is_conformal() {
            debug!(
                rec_num = record.rec_num(),
                grid = grid.short_name(),
                "Grid relative winds on a grid without rotation, leaving as is"
            );
            return Ok(());
        }

        let angles = wind::rotation_angles(grid, field.nx, field.ny)?;
        match code {
            UGRD => {
                let v = self.companion(record, field, VGRD)?;
                wind::rotate_u(&mut field.values, &v.values, &angles);
            }
            VGRD => {
                let u = self.companion(record, field, UGRD)?;
                wind::rotate_v(&mut field.values, &u.values, &angles);
            }
            _ => wind::rotate_direction(&mut field.values, &angles),
        }
        debug!(
            rec_num = record.rec_num(),
            code,
            "Rotated grid relative winds to earth relative"
        );
        Ok(())
    }

    /// Finds the other wind component at the same level and time as `field`.
    fn companion(
        &self,
        record: &BinaryRecord,
        field: &UnpackedField,
        code: i32,
    ) -> Result<UnpackedField, GribError> {
        let mut candidate = BinaryRecord::default();
        for (index, entry) in self.grib1.index().iter().enumerate() {
            if i32::from(entry.code) != code {
                continue;
            }
            self.grib1.read_record_into(index, &mut candidate)?;
            if candidate.product_definition().level_type() != field.level_type {
                continue;
            }
            let other = self.grib1.unpack_record(&candidate)?;
            if wind::same_level_and_time(field, &other) {
                return Ok(other);
            }
        }
        Err(GribError::OperationError(format!(
            "no record with code {code} at level {} {}-{} valid {} to rotate record {}",
            field.level_type,
            field.lower,
            field.upper,
            field.valid,
            record.rec_num()
        )))
    }

    fn derive_first(
        &self,
        request: &FieldRequest,
        code: i32,
    ) -> Result<Option<FieldMatch>, GribError> {
        let u = self.find_first_stored(&request.for_parameter("UGRD"))?;
        let v = self.find_first_stored(&request.for_parameter("VGRD"))?;
        match (u, v) {
            (None, None) => Ok(None),
            (Some(u), Some(v)) => derive(u, v, code).map(Some),
            (u, _) => Err(ValidationError::WindComponentMismatch(format!(
                "only the {} component was found",
                if u.is_some() { "u" } else { "v" }
            ))
            .into()),
        }
    }

    fn derive_all(&self, request: &FieldRequest, code: i32) -> Result<Vec<FieldMatch>, GribError> {
        let u = self.find_all_stored(&request.for_parameter("UGRD"))?;
        let v = self.find_all_stored(&request.for_parameter("VGRD"))?;
        if u.len() != v.len() {
            return Err(ValidationError::WindComponentMismatch(format!(
                "{} u and {} v components found",
                u.len(),
                v.len()
            ))
            .into());
        }
        u.into_iter()
            .zip(v)
            .map(|(u, v)| derive(u, v, code))
            .collect()
    }
}

/// Returns the code of the wind quantity a request asks for, if it can be
/// derived from u and v.
fn derived_quantity(request: &FieldRequest) -> Option<i32> {
    match (request.name.as_deref(), request.code) {
        (Some("WIND"), None | Some(WIND)) | (None, Some(WIND)) => Some(WIND),
        (Some("WDIR"), None | Some(WDIR)) | (None, Some(WDIR)) => Some(WDIR),
        _ => None,
    }
}

fn derive(u: FieldMatch, v: FieldMatch, code: i32) -> Result<FieldMatch, GribError> {
    wind::check_alignment(&u.field, &v.field)?;
    let values = if code == WDIR {
        wind::wind_direction(&u.field.values, &v.field.values)
    } else {
        wind::wind_speed(&u.field.values, &v.field.values)
    };
    debug!(
        code,
        u_offset = u.offset,
        v_offset = v.offset,
        "Derived wind from its components"
    );
    Ok(FieldMatch {
        field: UnpackedField {
            values,
            code: code as u8,
            ..u.field
        },
        ..u
    })
}
