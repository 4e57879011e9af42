use std::{
    env, fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::{GribError, ParseError};

pub const WDIR: i32 = 31;
pub const WIND: i32 = 32;
pub const UGRD: i32 = 33;
pub const VGRD: i32 = 34;

/// Environment variable listing user parameter tables, separated by `:`.
pub const TABLES_ENV_VAR: &str = "GRIB1_TABLES";

const BUILTIN_TABLE_NUMBER: i32 = 2;
const BUILTIN_CENTER: i32 = 7;
const ANY_SUBCENTER: i32 = -1;

/// One row of a GRIB1 parameter table (Table 2 or a local version of it).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterEntry {
    pub code: i32,
    pub table_number: i32,
    pub center: i32,
    /// `-1` matches any subcenter.
    pub subcenter: i32,
    pub name: String,
    pub long_name: String,
    pub units: String,
}

impl ParameterEntry {
    fn matches_subcenter(&self, subcenter: i32) -> bool {
        self.subcenter == ANY_SUBCENTER || self.subcenter == subcenter
    }
}

/// Keys for a parameter lookup. `None` leaves a key unconstrained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParameterKey {
    pub table_number: Option<i32>,
    pub code: Option<i32>,
    pub center: Option<i32>,
    pub subcenter: Option<i32>,
}

/// Parameter tables searched in order: user tables first, then the built-in
/// NCEP Table 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterTable {
    entries: Vec<ParameterEntry>,
}

impl Default for ParameterTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ParameterTable {
    /// Returns a table holding only the built-in NCEP Table 2 entries.
    pub fn builtin() -> Self {
        let entries = NCEP_TABLE_2
            .iter()
            .map(|(code, name, long_name, units)| ParameterEntry {
                code: *code,
                table_number: BUILTIN_TABLE_NUMBER,
                center: BUILTIN_CENTER,
                subcenter: ANY_SUBCENTER,
                name: (*name).to_owned(),
                long_name: (*long_name).to_owned(),
                units: (*units).to_owned(),
            })
            .collect();
        Self { entries }
    }

    /// Builds a table from the files and directories named in the
    /// `GRIB1_TABLES` environment variable, followed by the built-in entries.
    pub fn from_env() -> Result<Self, GribError> {
        match env::var(TABLES_ENV_VAR) {
            Ok(list) => Self::from_path_list(&list),
            Err(_) => Ok(Self::builtin()),
        }
    }

    /// Builds a table from a `:`-separated list of files and directories.
    /// Directories contribute their `grib1*.txt` files in sorted order.
    pub fn from_path_list(list: &str) -> Result<Self, GribError> {
        let mut entries = Vec::new();
        for item in list.split(':').filter(|s| !s.is_empty()) {
            for path in table_files(Path::new(item))? {
                let text = fs::read_to_string(&path)?;
                let mut parsed = parse_table(&text, &path.display().to_string())?;
                debug!(
                    entries = parsed.len(),
                    path = %path.display(),
                    "Read parameter table"
                );
                entries.append(&mut parsed);
            }
        }
        entries.extend(Self::builtin().entries);
        Ok(Self { entries })
    }

    /// Adds entries ahead of the existing ones.
    pub fn prepend(&mut self, mut entries: Vec<ParameterEntry>) {
        entries.append(&mut self.entries);
        self.entries = entries;
    }

    pub fn entries(&self) -> &[ParameterEntry] {
        &self.entries
    }

    /// Finds the first entry with the given name whose other fields satisfy
    /// `key`.
    pub fn lookup_by_name(&self, name: &str, key: &ParameterKey) -> Option<&ParameterEntry> {
        let mut matches = self.entries.iter().filter(|e| {
            e.name == name
                && key.table_number.is_none_or(|n| e.table_number == n)
                && key.code.is_none_or(|c| e.code == c)
                && key.center.is_none_or(|c| e.center == c)
                && key.subcenter.is_none_or(|s| e.matches_subcenter(s))
        });
        let first = matches.next()?;
        let rest = matches.count();
        if rest > 0 {
            debug!(
                name,
                ?key,
                matches = rest + 1,
                code = first.code,
                table = first.table_number,
                "Several parameter table entries match, using the first"
            );
        }
        Some(first)
    }

    /// Finds the first entry with the given code whose other fields satisfy
    /// `key`. `key.code` is ignored.
    pub fn lookup_by_code(&self, code: i32, key: &ParameterKey) -> Option<&ParameterEntry> {
        self.entries.iter().find(|e| {
            e.code == code
                && key.table_number.is_none_or(|n| e.table_number == n)
                && key.center.is_none_or(|c| e.center == c)
                && key.subcenter.is_none_or(|s| e.matches_subcenter(s))
        })
    }
}

fn table_files(path: &Path) -> Result<Vec<PathBuf>, GribError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("grib1") && n.ends_with(".txt"))
        })
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

/// Parses a parameter table file.
///
/// Each non-blank line holds four integers (code, table number, center,
/// subcenter) followed by three double-quoted strings (name, long name,
/// units).
///
/// # Examples
///
/// ```
/// let text = "61 2 7 -1 \"APCP\" \"Total precipitation\" \"kg/m^2\"\n";
/// let entries = grib1::codetables::parse_table(text, "local.txt").unwrap();
/// assert_eq!(entries[0].name, "APCP");
/// assert_eq!(entries[0].subcenter, -1);
/// ```
pub fn parse_table(text: &str, source: &str) -> Result<Vec<ParameterEntry>, ParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            parse_line(line).ok_or_else(|| {
                ParseError::ReadError(format!(
                    "malformed parameter table line {} in {source}: {line}",
                    i + 1
                ))
            })
        })
        .collect()
}

fn parse_line(line: &str) -> Option<ParameterEntry> {
    let mut rest = line.trim_start();
    let mut numbers = [0i32; 4];
    for number in numbers.iter_mut() {
        let end = rest.find(char::is_whitespace)?;
        *number = rest[..end].parse().ok()?;
        rest = rest[end..].trim_start();
    }

    let mut strings = Vec::with_capacity(3);
    for _ in 0..3 {
        rest = rest.strip_prefix('"')?;
        let end = rest.find('"')?;
        strings.push(rest[..end].to_owned());
        rest = rest[end + 1..].trim_start();
    }
    if !rest.is_empty() {
        return None;
    }

    let [code, table_number, center, subcenter] = numbers;
    let units = strings.pop()?;
    let long_name = strings.pop()?;
    let name = strings.pop()?;
    Some(ParameterEntry {
        code,
        table_number,
        center,
        subcenter,
        name,
        long_name,
        units: if units.is_empty() {
            "NA".to_owned()
        } else {
            units
        },
    })
}

const NCEP_TABLE_2: &[(i32, &str, &str, &str)] = &[
    (1, "PRES", "Pressure", "Pa"),
    (2, "PRMSL", "Pressure reduced to MSL", "Pa"),
    (3, "PTEND", "Pressure tendency", "Pa/s"),
    (4, "PVORT", "Potential vorticity", "K m^2 kg^-1 s^-1"),
    (5, "ICAHT", "ICAO Standard Atmosphere Reference Height", "m"),
    (6, "GP", "Geopotential", "m^2/s^2"),
    (7, "HGT", "Geopotential height", "gpm"),
    (8, "DIST", "Geometric height", "m"),
    (9, "HSTDV", "Standard deviation of height", "m"),
    (10, "TOZNE", "Total ozone", "Dobson"),
    (11, "TMP", "Temperature", "K"),
    (12, "VTMP", "Virtual temperature", "K"),
    (13, "POT", "Potential temperature", "K"),
    (14, "EPOT", "Pseudo-adiabatic potential temperature", "K"),
    (15, "TMAX", "Maximum temperature", "K"),
    (16, "TMIN", "Minimum temperature", "K"),
    (17, "DPT", "Dew point temperature", "K"),
    (18, "DEPR", "Dew point depression", "K"),
    (19, "LAPR", "Lapse rate", "K/m"),
    (20, "VIS", "Visibility", "m"),
    (21, "RDSP1", "Radar Spectra (1)", "NA"),
    (22, "RDSP2", "Radar Spectra (2)", "NA"),
    (23, "RDSP3", "Radar Spectra (3)", "NA"),
    (24, "PLI", "Parcel lifted index (to 500 hPa)", "K"),
    (25, "TMPA", "Temperature anomaly", "K"),
    (26, "PRESA", "Pressure anomaly", "Pa"),
    (27, "GPA", "Geopotential height anomaly", "gpm"),
    (28, "WVSP1", "Wave Spectra (1)", "NA"),
    (29, "WVSP2", "Wave Spectra (2)", "NA"),
    (30, "WVSP3", "Wave Spectra (3)", "NA"),
    (WDIR, "WDIR", "Wind direction (from which blowing)", "deg true"),
    (WIND, "WIND", "Wind speed", "m/s"),
    (UGRD, "UGRD", "u-component of wind", "m/s"),
    (VGRD, "VGRD", "v-component of wind", "m/s"),
    (35, "STRM", "Stream function", "m^2/s"),
    (36, "VPOT", "Velocity potential", "m^2/s"),
    (37, "MNTSF", "Montgomery stream function", "m^2/s^2"),
    (38, "SGCVV", "Sigma coordinate vertical velocity", "1/s"),
    (39, "VVEL", "Vertical velocity (pressure)", "Pa/s"),
    (40, "DZDT", "Vertical velocity (geometric)", "m/s"),
    (41, "ABSV", "Absolute vorticity", "1/s"),
    (42, "ABSD", "Absolute divergence", "1/s"),
    (43, "RELV", "Relative vorticity", "1/s"),
    (44, "RELD", "Relative divergence", "1/s"),
    (45, "VUCSH", "Vertical u-component shear", "1/s"),
    (46, "VVCSH", "Vertical v-component shear", "1/s"),
    (47, "DIRC", "Direction of current", "Degree true"),
    (48, "SPC", "Speed of current", "m/s"),
    (49, "UOGRD", "u-component of current", "m/s"),
    (50, "VOGRD", "v-component of current", "m/s"),
    (51, "SPFH", "Specific humidity", "kg/kg"),
    (52, "RH", "Relative humidity", "%"),
    (53, "MIXR", "Humidity mixing ratio", "kg/kg"),
    (54, "PWAT", "Precipitable water", "kg/m^2"),
    (55, "VAPP", "Vapor pressure", "Pa"),
    (56, "SATD", "Saturation deficit", "Pa"),
    (57, "EVP", "Evaporation", "kg/m^2"),
    (58, "CICE", "Cloud Ice", "kg/m^2"),
    (59, "PRATE", "Precipitation rate", "kg/m^2/s"),
    (60, "TSTM", "Thunderstorm probability", "%"),
    (61, "APCP", "Total precipitation", "kg/m^2"),
    (62, "NCPCP", "Large scale precipitation (non-conv.)", "kg/m^2"),
    (63, "ACPCP", "Convective precipitation", "kg/m^2"),
    (64, "SRWEQ", "Snowfall rate water equivalent", "kg/m^2/s"),
    (65, "WEASD", "Water equiv. of accum. snow depth", "kg/m^2"),
    (66, "SNOD", "Snow depth", "m"),
    (67, "MIXHT", "Mixed layer depth", "m"),
    (71, "TCDC", "Total cloud cover", "%"),
    (72, "CDCON", "Convective cloud cover", "%"),
    (73, "LCDC", "Low cloud cover", "%"),
    (74, "MCDC", "Medium cloud cover", "%"),
    (75, "HCDC", "High cloud cover", "%"),
    (76, "CWAT", "Cloud water", "kg/m^2"),
    (81, "LAND", "Land cover (land=1, sea=0)", "proportion"),
    (83, "SFCR", "Surface roughness", "m"),
    (84, "ALBDO", "Albedo", "%"),
    (85, "TSOIL", "Soil temperature", "K"),
    (86, "SOILM", "Soil moisture content", "kg/m^2"),
    (87, "VEG", "Vegetation", "%"),
    (91, "ICEC", "Ice cover (ice=1, no ice=0)", "proportion"),
    (111, "NSWRS", "Net short-wave radiation flux (surface)", "W/m^2"),
    (112, "NLWRS", "Net long wave radiation flux (surface)", "W/m^2"),
    (121, "LHTFL", "Latent heat net flux", "W/m^2"),
    (122, "SHTFL", "Sensible heat net flux", "W/m^2"),
    (124, "UFLX", "Momentum flux, u component", "N/m^2"),
    (125, "VFLX", "Momentum flux, v component", "N/m^2"),
    (130, "MSLET", "Mean Sea Level Pressure (Eta Reduction)", "Pa"),
    (131, "LFTX", "Surface lifted index", "K"),
    (132, "4LFTX", "Best (4 layer) lifted index", "K"),
    (140, "CRAIN", "Categorical rain (yes=1; no=0)", "non-dim"),
    (141, "CFRZR", "Categorical freezing rain (yes=1; no=0)", "non-dim"),
    (142, "CICEP", "Categorical ice pellets (yes=1; no=0)", "non-dim"),
    (143, "CSNOW", "Categorical snow (yes=1; no=0)", "non-dim"),
    (153, "CLWMR", "Cloud mixing ratio", "kg/kg"),
    (154, "O3MR", "Ozone mixing ratio", "kg/kg"),
    (156, "CIN", "Convective inhibition", "J/kg"),
    (157, "CAPE", "Convective Available Potential Energy", "J/kg"),
    (190, "HLCY", "Storm relative helicity", "m^2/s^2"),
    (204, "DSWRF", "Downward short wave rad. flux", "W/m^2"),
    (205, "DLWRF", "Downward long wave rad. flux", "W/m^2"),
    (211, "USWRF", "Upward short wave rad. flux", "W/m^2"),
    (212, "ULWRF", "Upward long wave rad. flux", "W/m^2"),
    (214, "CPRAT", "Convective precipitation rate", "kg/m^2/s"),
    (221, "HPBL", "Planetary boundary layer height", "m"),
    (222, "5WAVH", "5-wave geopotential height", "gpm"),
    (223, "CNWAT", "Plant canopy surface water", "kg/m^2"),
];

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    const LOCAL_TABLE: &str = "\
11 129 7 -1 \"TMP\" \"Local temperature\" \"K\"

200 2 7 1 \"MYVAR\" \"Local variable\" \"\"
";

    #[test]
    fn parsing_table_skips_blank_lines_and_fills_empty_units() {
        let entries = parse_table(LOCAL_TABLE, "local").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].table_number, 129);
        assert_eq!(entries[1].name, "MYVAR");
        assert_eq!(entries[1].units, "NA");
    }

    macro_rules! test_malformed_table_line {
        ($(($name:ident, $line:expr),)*) => ($(
            #[test]
            fn $name() {
                let result = parse_table($line, "bad.txt");
                assert!(matches!(result, Err(ParseError::ReadError(_))));
            }
        )*);
    }

    test_malformed_table_line! {
        (malformed_table_line_with_too_few_numbers, "11 2 7 \"TMP\" \"Temperature\" \"K\""),
        (malformed_table_line_with_non_numeric_code, "x 2 7 -1 \"TMP\" \"Temperature\" \"K\""),
        (malformed_table_line_with_missing_string, "11 2 7 -1 \"TMP\" \"Temperature\""),
        (malformed_table_line_with_unterminated_string, "11 2 7 -1 \"TMP\" \"Temperature\" \"K"),
        (malformed_table_line_with_trailing_text, "11 2 7 -1 \"TMP\" \"Temperature\" \"K\" x"),
    }

    #[test]
    fn malformed_line_error_names_file_and_line() {
        let err = parse_table("\n11 2\n", "bad.txt").unwrap_err();
        assert_eq!(
            err,
            ParseError::ReadError("malformed parameter table line 2 in bad.txt: 11 2".to_owned())
        );
    }

    #[test]
    fn builtin_lookup_by_name_with_wildcard_subcenter() {
        let table = ParameterTable::builtin();
        let key = ParameterKey {
            table_number: Some(2),
            code: None,
            center: Some(7),
            subcenter: Some(4),
        };
        let entry = table.lookup_by_name("UGRD", &key).unwrap();
        assert_eq!(entry.code, UGRD);
    }

    #[test]
    fn lookup_by_code_respects_center() {
        let table = ParameterTable::builtin();
        let key = ParameterKey {
            table_number: Some(2),
            center: Some(98),
            ..Default::default()
        };
        assert!(table.lookup_by_code(11, &key).is_none());
        let key = ParameterKey {
            center: Some(7),
            ..key
        };
        assert_eq!(table.lookup_by_code(11, &key).unwrap().name, "TMP");
    }

    #[test]
    fn user_entries_take_precedence() {
        let mut table = ParameterTable::builtin();
        table.prepend(parse_table(LOCAL_TABLE, "local").unwrap());
        let entry = table.lookup_by_name("TMP", &ParameterKey::default()).unwrap();
        assert_eq!(entry.table_number, 129);
    }

    #[test]
    fn loading_tables_from_directory_and_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("grib1_local.txt"), LOCAL_TABLE).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a table").unwrap();
        let extra = dir.path().join("extra.dat");
        fs::write(&extra, "250 140 98 0 \"XTRA\" \"Extra\" \"1\"\n").unwrap();

        let list = format!("{}:{}", dir.path().display(), extra.display());
        let table = ParameterTable::from_path_list(&list).unwrap();
        let builtin_len = ParameterTable::builtin().entries().len();
        assert_eq!(table.entries().len(), builtin_len + 3);
        assert_eq!(table.entries()[0].name, "TMP");
        assert_eq!(table.entries()[2].name, "XTRA");
    }

    #[test]
    fn loading_missing_table_file_fails() {
        let result = ParameterTable::from_path_list("/nonexistent/grib1_tables.txt");
        assert!(result.is_err());
    }
}
