/// How a level type relates to the vertical coordinate requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelCategory {
    Other,
    /// Height or depth measured in length units.
    Vertical,
    /// Pressure surfaces.
    Pressure,
}

/// How octets 11-12 of the product definition carry the level value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelEncoding {
    /// The level type needs no value; the octets still hold a 2-octet number.
    NoValue,
    /// Both octets hold one 2-octet value.
    Single,
    /// Octet 11 is the top of the layer and octet 12 the bottom.
    Layer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelTableEntry {
    pub code: u8,
    pub category: LevelCategory,
    pub encoding: LevelEncoding,
    pub abbrev: &'static str,
    pub name: &'static str,
}

impl LevelTableEntry {
    /// Returns the lower and upper bounds of a level from octets 11-12.
    ///
    /// # Examples
    ///
    /// ```
    /// use grib1::codetables::lookup_level;
    ///
    /// let isobaric = lookup_level(100).unwrap();
    /// assert_eq!(isobaric.bounds([0x01, 0xf4]), (500, 500));
    ///
    /// let layer = lookup_level(101).unwrap();
    /// assert_eq!(layer.bounds([50, 100]), (50, 100));
    /// ```
    pub fn bounds(&self, octets: [u8; 2]) -> (i32, i32) {
        match self.encoding {
            LevelEncoding::NoValue | LevelEncoding::Single => {
                let value = i32::from(u16::from_be_bytes(octets));
                (value, value)
            }
            LevelEncoding::Layer => (i32::from(octets[0]), i32::from(octets[1])),
        }
    }
}

macro_rules! level {
    ($code:expr, $category:ident, $encoding:ident, $abbrev:expr, $name:expr) => {
        LevelTableEntry {
            code: $code,
            category: LevelCategory::$category,
            encoding: LevelEncoding::$encoding,
            abbrev: $abbrev,
            name: $name,
        }
    };
}

/// GRIB1 Table 3, fixed levels or layers, restricted to the types the matcher
/// understands.
pub const LEVEL_TABLE: &[LevelTableEntry] = &[
    level!(1, Vertical, NoValue, "SFC", "Ground or water surface"),
    level!(2, Other, NoValue, "CBL", "Cloud base level"),
    level!(3, Other, NoValue, "CTL", "Cloud top level"),
    level!(4, Other, NoValue, "0DEG", "Level of 0 deg (C) isotherm"),
    level!(5, Other, NoValue, "ADCL", "Level of adiabatic condensation lifted from the surface"),
    level!(6, Other, NoValue, "MWSL", "Maximum wind level"),
    level!(7, Other, NoValue, "TRO", "Tropopause"),
    level!(8, Other, NoValue, "NTAT", "Nominal top of atmosphere"),
    level!(9, Other, NoValue, "SEAB", "Sea bottom"),
    level!(20, Other, Layer, "TMPL", "Isothermal level (temperature in 1/100 K in octets 11 and 12)"),
    level!(100, Pressure, Single, "ISBL", "isobaric level"),
    level!(101, Pressure, Layer, "ISBY", "layer between two isobaric levels"),
    level!(102, Vertical, NoValue, "MSL", "mean sea level"),
    level!(103, Vertical, Single, "GPML", "Specified altitude above MSL"),
    level!(104, Vertical, Layer, "GPMY", "layer between two specified altitudes above MSL"),
    level!(105, Vertical, Single, "HTGL", "specified height level above ground"),
    level!(106, Vertical, Layer, "HTGY", "layer between two specified height levels above ground"),
    level!(107, Other, Single, "SIGL", "sigma level"),
    level!(108, Other, Layer, "SIGY", "layer between two sigma levels"),
    level!(109, Other, Single, "HYBL", "Hybrid level"),
    level!(110, Other, Layer, "HYBY", "layer between two hybrid levels"),
    level!(111, Vertical, Single, "DBLL", "depth below land surface"),
    level!(112, Vertical, Layer, "DBLY", "layer between two depths below land surface"),
    level!(113, Other, Single, "THEL", "isentropic (theta) level"),
    level!(114, Other, Layer, "THEY", "layer between two isentropic levels"),
    level!(115, Other, Single, "SPDL", "level at specified pressure difference from ground to level"),
    level!(116, Other, Layer, "SPDY", "layer between two levels at specified pressure difference from ground to level"),
    level!(117, Other, Single, "PVL", "potential vorticity(pv) surface"),
    level!(119, Other, Single, "NAML", "NAM level"),
    level!(120, Other, Layer, "NAMY", "layer between two NAM levels"),
    level!(121, Other, Layer, "IBYH", "layer between two isobaric surfaces (high precision)"),
    level!(125, Vertical, Single, "HGLH", "specified height level above ground (high precision)"),
    level!(126, Pressure, Single, "ISBP", "isobaric level"),
    level!(128, Other, Layer, "SGYH", "layer between two sigma levels (high precision)"),
    level!(141, Other, Layer, "IBYM", "layer between two isobaric surfaces (mixed precision)"),
    level!(160, Vertical, Single, "DBSL", "depth below sea level"),
    level!(200, Other, NoValue, "EATM", "entire atmosphere (considered as a single layer)"),
    level!(201, Other, NoValue, "EOCN", "entire ocean (considered as a single layer)"),
    level!(204, Other, NoValue, "HTFL", "Highest tropospheric freezing level"),
    level!(206, Other, NoValue, "GCBL", "Grid scale cloud bottom level"),
    level!(207, Other, NoValue, "GCTL", "Grid scale cloud top level"),
    level!(209, Other, NoValue, "BCBL", "Boundary layer cloud bottom level"),
    level!(210, Other, NoValue, "BCTL", "Boundary layer cloud top level"),
    level!(211, Other, NoValue, "BCY", "Boundary layer cloud layer"),
    level!(212, Other, NoValue, "LCBL", "Low cloud bottom level"),
    level!(213, Other, NoValue, "LCTL", "Low cloud top level"),
    level!(214, Other, NoValue, "LCY", "Low cloud layer"),
    level!(215, Other, NoValue, "CEIL", "Cloud ceiling"),
    level!(216, Other, NoValue, "CBB", "Cumulonimbus Base (m)"),
    level!(217, Other, NoValue, "CBT", "Cumulonimbus Top (m)"),
    level!(220, Other, NoValue, "PBLRI", "Planetary Boundary Layer (derived from Richardson number)"),
    level!(222, Other, NoValue, "MCBL", "Middle cloud bottom level"),
    level!(223, Other, NoValue, "MCTL", "Middle cloud top level"),
    level!(224, Other, NoValue, "MCY", "Middle cloud layer"),
    level!(232, Other, NoValue, "HCBL", "High cloud bottom level"),
    level!(233, Other, NoValue, "HCTL", "High cloud top level"),
    level!(234, Other, NoValue, "HCY", "High cloud layer"),
    level!(235, Other, NoValue, "OITL", "Ocean Isotherm Level (1/10 deg C)"),
    level!(236, Other, Layer, "OLYR", "Layer between two depths below ocean surface"),
    level!(237, Other, NoValue, "OBML", "Bottom of Ocean Mixed Layer (m)"),
    level!(238, Other, NoValue, "OBIL", "Bottom of Ocean Isothermal Layer (m)"),
    level!(239, Other, NoValue, "S26CY", "Layer Ocean Surface and 26C Ocean Isothermal Level"),
    level!(240, Other, NoValue, "OMXL", "Ocean Mixed Layer"),
    level!(241, Other, NoValue, "OSEQD", "Ordered Sequence of Data"),
    level!(242, Other, NoValue, "CCBL", "Convective cloud bottom level"),
    level!(243, Other, NoValue, "CCTL", "Convective cloud top level"),
    level!(244, Other, NoValue, "CCY", "Convective cloud layer"),
    level!(245, Other, NoValue, "LLTW", "Lowest level of the wet bulb zero"),
    level!(246, Other, NoValue, "MTHE", "Maximum equivalent potential temperature level"),
    level!(247, Other, NoValue, "EHLT", "Equilibrium level"),
    level!(248, Other, NoValue, "SCBL", "Shallow convective cloud bottom level"),
    level!(249, Other, NoValue, "SCTL", "Shallow convective cloud top level"),
    level!(251, Other, NoValue, "DCBL", "Deep convective cloud bottom level"),
    level!(252, Other, NoValue, "DCTL", "Deep convective cloud top level"),
    level!(253, Other, NoValue, "LBLSW", "Lowest bottom level of supercooled liquid water layer"),
    level!(254, Other, NoValue, "HTLSW", "Highest top level of supercooled liquid water layer"),
    level!(255, Other, NoValue, "NA", "Missing"),
];

/// Looks up a level type in [`LEVEL_TABLE`].
pub fn lookup_level(code: u8) -> Option<&'static LevelTableEntry> {
    LEVEL_TABLE.iter().find(|entry| entry.code == code)
}
