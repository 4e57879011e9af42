use chrono::{DateTime, Utc};

/// How the bounds of a [`LevelRequest`] are read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    /// Any level type; bounds are compared as stored in the record.
    #[default]
    None,
    /// Bounds are an accumulation period in seconds.
    Accum,
    /// Bounds are heights or depths; the record must have a vertical level
    /// type.
    Vert,
    /// Bounds are pressures; the record must have a pressure level type.
    Pres,
    /// `lower` is a 1-based record number.
    RecNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelRequest {
    pub kind: LevelKind,
    /// GRIB1 level type (Table 3) the record must carry, if set.
    pub type_num: Option<u8>,
    pub lower: i32,
    pub upper: i32,
}

impl Default for LevelRequest {
    fn default() -> Self {
        Self::any()
    }
}

impl LevelRequest {
    /// Accepts every level.
    pub fn any() -> Self {
        Self {
            kind: LevelKind::None,
            type_num: None,
            lower: i32::MIN,
            upper: i32::MAX,
        }
    }

    /// A single pressure level or a range of them, in hPa.
    pub fn pressure(lower: i32, upper: i32) -> Self {
        Self {
            kind: LevelKind::Pres,
            type_num: None,
            lower,
            upper,
        }
    }

    /// A single height level or a range of them.
    pub fn vertical(lower: i32, upper: i32) -> Self {
        Self {
            kind: LevelKind::Vert,
            type_num: None,
            lower,
            upper,
        }
    }

    /// Fields accumulated over exactly `seconds`.
    pub fn accumulation(seconds: i32) -> Self {
        Self {
            kind: LevelKind::Accum,
            type_num: None,
            lower: seconds,
            upper: seconds,
        }
    }

    /// The record at 1-based position `rec_num`.
    pub fn record_number(rec_num: i32) -> Self {
        Self {
            kind: LevelKind::RecNumber,
            type_num: None,
            lower: rec_num,
            upper: rec_num,
        }
    }

    pub fn with_type_num(mut self, type_num: u8) -> Self {
        self.type_num = Some(type_num);
        self
    }

    /// Returns `true` if exact and range matching look at the bounds.
    pub(crate) fn compares_bounds(&self) -> bool {
        !matches!(self.kind, LevelKind::Accum | LevelKind::RecNumber)
    }

    /// Returns `true` if an exact match is preferred over a range match.
    pub(crate) fn prefers_exact(&self) -> bool {
        matches!(self.kind, LevelKind::Pres | LevelKind::Vert)
    }
}

/// Probability field selection: the parameter the probability refers to and
/// its thresholds.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProbabilityRequest {
    pub code: u8,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ProbabilityRequest {
    /// Returns `true` if the request constrains anything.
    pub(crate) fn is_active(&self) -> bool {
        self.code > 0 && (self.lower.is_some() || self.upper.is_some())
    }
}

/// What a caller asks for. Unset fields are unconstrained.
///
/// # Examples
///
/// ```
/// use grib1::matcher::{FieldRequest, LevelRequest};
///
/// let request = FieldRequest::named("TMP").with_level(LevelRequest::pressure(500, 500));
/// assert_eq!(request.name.as_deref(), Some("TMP"));
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldRequest {
    pub name: Option<String>,
    pub code: Option<i32>,
    /// Parameter table version; defaults to the record's own.
    pub table_version: Option<u8>,
    pub center: Option<u8>,
    pub subcenter: Option<u8>,
    pub level: LevelRequest,
    pub valid: Option<DateTime<Utc>>,
    pub init: Option<DateTime<Utc>>,
    /// Seconds from init to valid.
    pub lead: Option<i64>,
    pub time_range_indicator: Option<u8>,
    /// NCEP ensemble member: `hi_res_ctl`, `low_res_ctl`, `+N` or `-N`.
    pub ensemble: Option<String>,
    pub probability: Option<ProbabilityRequest>,
}

impl FieldRequest {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }

    pub fn coded(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: LevelRequest) -> Self {
        self.level = level;
        self
    }

    pub fn with_valid(mut self, valid: DateTime<Utc>) -> Self {
        self.valid = Some(valid);
        self
    }

    pub fn with_init(mut self, init: DateTime<Utc>) -> Self {
        self.init = Some(init);
        self
    }

    pub fn with_lead(mut self, seconds: i64) -> Self {
        self.lead = Some(seconds);
        self
    }

    pub fn with_ensemble(mut self, member: &str) -> Self {
        self.ensemble = Some(member.to_owned());
        self
    }

    pub fn with_probability(mut self, probability: ProbabilityRequest) -> Self {
        self.probability = Some(probability);
        self
    }

    /// Returns a copy asking for another parameter with the same level, time
    /// and member constraints.
    pub(crate) fn for_parameter(&self, name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            code: None,
            ..self.clone()
        }
    }
}
