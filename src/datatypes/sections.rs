use chrono::{DateTime, Utc};

use crate::{
    codetables::lookup_level,
    datatypes::*,
    error::*,
    grid::{ScanOrder, ScanningMode},
    helpers::{all_bits_set, grib_int_from_bytes, ibm_to_f64, uint_from_be_bytes},
    time::{create_date_time, valid_time_and_accumulation},
};

pub(crate) const INDICATOR_MAGIC: &[u8] = b"GRIB";
pub(crate) const INDICATOR_SIZE: usize = 8;
pub(crate) const END_MAGIC: &[u8] = b"7777";
pub(crate) const END_SIZE: usize = END_MAGIC.len();

const PDS_MIN_SIZE: usize = 28;
const PDS_ENSEMBLE_SIZE: usize = 43;
const PDS_PROBABILITY_SIZE: usize = 60;
const GDS_MIN_SIZE: usize = 28;
const BMS_HEADER_SIZE: usize = 6;
const BDS_HEADER_SIZE: usize = 11;

/// Section 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Indicator {
    /// Total length of the record in octets, including Sections 0 and 5.
    pub total_length: u32,
    pub edition: u8,
}

impl Indicator {
    pub(crate) fn from_slice(slice: &[u8]) -> Result<Self, ParseError> {
        if slice.len() < INDICATOR_SIZE || &slice[..INDICATOR_MAGIC.len()] != INDICATOR_MAGIC {
            return Err(ParseError::NotGRIB);
        }
        let edition = slice[7];
        if edition != 1 {
            return Err(ParseError::GRIBVersionMismatch(edition));
        }

        Ok(Self {
            total_length: uint_from_be_bytes(&slice[4..7]),
            edition,
        })
    }
}

/// Section 1, the product definition.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ProductDefinition {
    payload: Vec<u8>,
}

impl ProductDefinition {
    pub fn from_payload(payload: Vec<u8>) -> Result<Self, BuildError> {
        let mut section = Self::default();
        section.refill(&payload)?;
        Ok(section)
    }

    pub(crate) fn refill(&mut self, slice: &[u8]) -> Result<(), BuildError> {
        check_size(1, slice, PDS_MIN_SIZE)?;
        self.payload.clear();
        self.payload.extend_from_slice(slice);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Parameter table version number (octet 4)
    #[inline]
    pub fn table_version(&self) -> u8 {
        self.payload[3]
    }

    /// Identification of originating center (octet 5)
    #[inline]
    pub fn center(&self) -> u8 {
        self.payload[4]
    }

    /// Generating process identification number (octet 6)
    #[inline]
    pub fn process(&self) -> u8 {
        self.payload[5]
    }

    /// Grid identification (octet 7)
    #[inline]
    pub fn grid_id(&self) -> u8 {
        self.payload[6]
    }

    #[inline]
    pub fn flag(&self) -> u8 {
        self.payload[7]
    }

    pub fn has_grid_description(&self) -> bool {
        self.flag() & 0b10000000 != 0
    }

    pub fn has_bitmap(&self) -> bool {
        self.flag() & 0b01000000 != 0
    }

    /// Indicator of parameter (octet 9)
    #[inline]
    pub fn parameter_code(&self) -> u8 {
        self.payload[8]
    }

    /// Indicator of type of level or layer (octet 10)
    #[inline]
    pub fn level_type(&self) -> u8 {
        self.payload[9]
    }

    /// Height, pressure, etc. of the level or layer (octets 11-12)
    #[inline]
    pub fn level_octets(&self) -> [u8; 2] {
        [self.payload[10], self.payload[11]]
    }

    /// Returns the level, or `None` if the level type is not in
    /// [`LEVEL_TABLE`](crate::codetables::LEVEL_TABLE).
    pub fn level(&self) -> Option<Level> {
        let type_num = self.level_type();
        let entry = lookup_level(type_num)?;
        let (lower, upper) = entry.bounds(self.level_octets());
        Some(Level {
            type_num,
            lower,
            upper,
            entry,
        })
    }

    /// Year of century (octet 13)
    #[inline]
    pub fn year_of_century(&self) -> u8 {
        self.payload[12]
    }

    /// Unit of time range (octet 18)
    #[inline]
    pub fn time_unit(&self) -> u8 {
        self.payload[17]
    }

    #[inline]
    pub fn p1(&self) -> u8 {
        self.payload[18]
    }

    #[inline]
    pub fn p2(&self) -> u8 {
        self.payload[19]
    }

    /// Time range indicator (octet 21)
    #[inline]
    pub fn time_range_indicator(&self) -> u8 {
        self.payload[20]
    }

    /// Century of reference time of data (octet 25)
    #[inline]
    pub fn century(&self) -> u8 {
        self.payload[24]
    }

    /// Identification of sub-center (octet 26)
    #[inline]
    pub fn subcenter(&self) -> u8 {
        self.payload[25]
    }

    /// Decimal scale factor D (octets 27-28)
    pub fn decimal_scale(&self) -> i32 {
        grib_int_from_bytes(&self.payload[26..28])
    }

    /// Reference time of data
    pub fn ref_time(&self) -> Result<DateTime<Utc>, GribError> {
        let year = i32::from(self.year_of_century()) + (i32::from(self.century()) - 1) * 100;
        create_date_time(
            year,
            self.payload[13].into(),
            self.payload[14].into(),
            self.payload[15].into(),
            self.payload[16].into(),
            0,
        )
    }

    /// Returns the reference, valid and accumulation times.
    pub fn forecast_time(&self) -> Result<ForecastTime, GribError> {
        let init = self.ref_time()?;
        let (valid, accumulation) = valid_time_and_accumulation(
            init,
            self.time_unit(),
            self.p1(),
            self.p2(),
            self.time_range_indicator(),
        )?;
        Ok(ForecastTime {
            init,
            valid,
            accumulation,
        })
    }

    /// Returns the ensemble extension when the section is long enough to
    /// carry one.
    pub fn ensemble(&self) -> Option<EnsembleInfo> {
        if self.payload.len() < PDS_ENSEMBLE_SIZE {
            return None;
        }
        Some(EnsembleInfo {
            application: self.payload[40],
            kind: self.payload[41],
            number: self.payload[42],
        })
    }

    /// Returns the probability extension when the section is long enough to
    /// carry one.
    pub fn probability(&self) -> Option<ProbabilityInfo> {
        if self.payload.len() < PDS_PROBABILITY_SIZE {
            return None;
        }
        let payload = &self.payload;
        let t1 = ibm_to_f64([payload[47], payload[48], payload[49], payload[50]]);
        let t2 = ibm_to_f64([payload[51], payload[52], payload[53], payload[54]]);
        Some(ProbabilityInfo::new(payload[45], payload[46], t1, t2))
    }
}

/// Section 2, the grid description.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct GridDescription {
    payload: Vec<u8>,
}

impl GridDescription {
    pub fn from_payload(payload: Vec<u8>) -> Result<Self, BuildError> {
        let mut section = Self::default();
        section.refill(&payload)?;
        Ok(section)
    }

    pub(crate) fn refill(&mut self, slice: &[u8]) -> Result<(), BuildError> {
        check_size(2, slice, GDS_MIN_SIZE)?;
        self.payload.clear();
        self.payload.extend_from_slice(slice);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Number of vertical coordinate parameters (octet 4)
    #[inline]
    pub fn nv(&self) -> u8 {
        self.payload[3]
    }

    /// Location of the vertical coordinate parameters or of the list of
    /// numbers of points in each row (octet 5)
    #[inline]
    pub fn pv_pl(&self) -> u8 {
        self.payload[4]
    }

    /// Data representation type (octet 6), see
    /// [`ProjectionType`](crate::codetables::ProjectionType).
    #[inline]
    pub fn projection_type(&self) -> u8 {
        self.payload[5]
    }

    pub fn nx(&self) -> usize {
        uint_from_be_bytes(&self.payload[6..8]) as usize
    }

    pub fn ny(&self) -> usize {
        uint_from_be_bytes(&self.payload[8..10]) as usize
    }

    /// Resolution and component flags (octet 17)
    #[inline]
    pub fn resolution_flags(&self) -> u8 {
        self.payload[16]
    }

    /// Returns `true` if vector components are resolved relative to the
    /// grid's x and y directions rather than to easterly and northerly
    /// directions.
    pub fn has_grid_relative_winds(&self) -> bool {
        self.resolution_flags() & 0b00001000 != 0
    }

    /// Scanning mode (octet 28)
    #[inline]
    pub fn scanning_mode(&self) -> ScanningMode {
        ScanningMode(self.payload[27])
    }

    pub fn scan_order(&self) -> ScanOrder {
        ScanOrder::new(self.nx(), self.ny(), self.scanning_mode())
    }

    /// Returns octets `start..end` (1-based, `end` exclusive) of the
    /// section, or an error naming the shortfall.
    pub(crate) fn octets(&self, start: usize, end: usize) -> Result<&[u8], BuildError> {
        self.payload
            .get(start - 1..end - 1)
            .ok_or(BuildError::SectionSizeTooSmall {
                section: 2,
                size: self.payload.len(),
            })
    }

    pub(crate) fn octets_all_bits_set(&self, start: usize, end: usize) -> Result<bool, BuildError> {
        Ok(all_bits_set(self.octets(start, end)?))
    }
}

/// Section 3, the bitmap.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Bitmap {
    payload: Vec<u8>,
}

impl Bitmap {
    pub fn from_payload(payload: Vec<u8>) -> Result<Self, GribError> {
        let mut section = Self::default();
        section.refill(&payload)?;
        Ok(section)
    }

    pub(crate) fn refill(&mut self, slice: &[u8]) -> Result<(), GribError> {
        check_size(3, slice, BMS_HEADER_SIZE)?;
        let table_reference = uint_from_be_bytes(&slice[4..6]);
        if table_reference != 0 {
            return Err(GribError::NotSupported(format!(
                "predefined bitmap {table_reference}"
            )));
        }
        self.payload.clear();
        self.payload.extend_from_slice(slice);
        Ok(())
    }

    /// Number of unused bits at the end of the section (octet 4)
    #[inline]
    pub fn unused_bits(&self) -> u8 {
        self.payload[3]
    }

    /// Returns the bitmap bytes, one bit per grid point, set where a value
    /// is present.
    pub fn bits(&self) -> &[u8] {
        &self.payload[BMS_HEADER_SIZE..]
    }

    /// Returns the number of set bits among the first `num_points` bits.
    pub fn count_present(&self, num_points: usize) -> usize {
        let bits = self.bits();
        let full_bytes = (num_points / 8).min(bits.len());
        let mut count = bits[..full_bytes]
            .iter()
            .map(|b| b.count_ones() as usize)
            .sum::<usize>();
        let rest = num_points % 8;
        if rest > 0 {
            if let Some(last) = bits.get(full_bytes) {
                count += (last >> (8 - rest)).count_ones() as usize;
            }
        }
        count
    }
}

/// Section 4, the binary data.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct BinaryData {
    payload: Vec<u8>,
}

impl BinaryData {
    pub fn from_payload(payload: Vec<u8>) -> Result<Self, GribError> {
        let mut section = Self::default();
        section.refill(&payload)?;
        Ok(section)
    }

    pub(crate) fn refill(&mut self, slice: &[u8]) -> Result<(), GribError> {
        check_size(4, slice, BDS_HEADER_SIZE)?;
        let flag = slice[3];
        if flag & 0b10000000 != 0 {
            return Err(DecodeError::SphericalHarmonicsUnsupported.into());
        }
        if flag & 0b01000000 != 0 {
            return Err(DecodeError::SecondOrderPackingUnsupported.into());
        }
        let word_size = slice[10];
        if word_size > 32 {
            return Err(DecodeError::WordSizeTooLarge(word_size).into());
        }
        self.payload.clear();
        self.payload.extend_from_slice(slice);
        Ok(())
    }

    #[inline]
    pub fn flag(&self) -> u8 {
        self.payload[3]
    }

    /// Binary scale factor E (octets 5-6)
    pub fn binary_scale(&self) -> i32 {
        grib_int_from_bytes(&self.payload[4..6])
    }

    /// Reference value R (octets 7-10)
    pub fn reference_value(&self) -> f64 {
        let payload = &self.payload;
        ibm_to_f64([payload[6], payload[7], payload[8], payload[9]])
    }

    /// Number of bits into which a datum point is packed (octet 11)
    #[inline]
    pub fn word_size(&self) -> u8 {
        self.payload[10]
    }

    /// Returns the packed values.
    pub fn packed(&self) -> &[u8] {
        &self.payload[BDS_HEADER_SIZE..]
    }
}

fn check_size(section: u8, slice: &[u8], min: usize) -> Result<(), BuildError> {
    if slice.len() < min {
        Err(BuildError::SectionSizeTooSmall {
            section,
            size: slice.len(),
        })
    } else {
        Ok(())
    }
}

/// Coefficients of simple packing: `value = b + U * m`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SimplePacking {
    pub reference_value: f64,
    pub binary_scale: i32,
    pub decimal_scale: i32,
    pub word_size: u8,
    pub m: f64,
    pub b: f64,
}

impl SimplePacking {
    pub fn new(reference_value: f64, binary_scale: i32, decimal_scale: i32, word_size: u8) -> Self {
        let t = 10_f64.powi(-decimal_scale);
        Self {
            reference_value,
            binary_scale,
            decimal_scale,
            word_size,
            m: t * 2_f64.powi(binary_scale),
            b: t * reference_value,
        }
    }

    #[inline]
    pub fn decode(&self, encoded: f64) -> f64 {
        self.b + encoded * self.m
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionInfo {
    pub num: u8,
    /// Offset from the start of the record.
    pub offset: usize,
    pub size: usize,
}

impl SectionInfo {
    /// Returns the offset of the section from the start of the file.
    pub fn file_offset(&self, record_offset: u64) -> u64 {
        record_offset + self.offset as u64
    }
}

/// One decoded record.
///
/// Holds its own copy of every section, so a record stays usable after the
/// reader moves on. [`Grib1::read_record_into`](crate::Grib1::read_record_into)
/// refills an existing record in place.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BinaryRecord {
    pub(crate) rec_num: usize,
    pub(crate) offset: u64,
    pub(crate) indicator: Indicator,
    pub(crate) pds: ProductDefinition,
    pub(crate) gds: Option<GridDescription>,
    pub(crate) bms: Option<Bitmap>,
    pub(crate) bds: BinaryData,
    pub(crate) sections: Vec<SectionInfo>,
    pub(crate) packing: SimplePacking,
    pub(crate) scan_order: Option<ScanOrder>,
}

impl BinaryRecord {
    /// Decodes a whole record, from "GRIB" to "7777" inclusive, found at
    /// `offset` in the file.
    pub fn from_bytes(bytes: &[u8], rec_num: usize, offset: u64) -> Result<Self, GribError> {
        let mut record = Self::default();
        record.refill(bytes, rec_num, offset)?;
        Ok(record)
    }

    pub(crate) fn refill(
        &mut self,
        bytes: &[u8],
        rec_num: usize,
        offset: u64,
    ) -> Result<(), GribError> {
        self.indicator = Indicator::from_slice(bytes)?;
        let total = self.indicator.total_length as usize;
        if bytes.len() < total {
            return Err(ParseError::UnexpectedEndOfData {
                offset,
                expected: total,
                found: bytes.len(),
            }
            .into());
        }
        if total < INDICATOR_SIZE + END_SIZE || &bytes[total - END_SIZE..total] != END_MAGIC {
            return Err(ParseError::EndSectionMismatch { offset }.into());
        }

        self.rec_num = rec_num;
        self.offset = offset;
        self.sections.clear();
        self.sections.push(SectionInfo {
            num: 0,
            offset: 0,
            size: INDICATOR_SIZE,
        });

        let mut walker = SectionWalker {
            bytes: &bytes[..total - END_SIZE],
            pos: INDICATOR_SIZE,
            record_offset: offset,
        };

        let pds = walker.next_section(1)?;
        self.pds.refill(pds)?;
        self.sections.push(walker.last_info(1, pds.len()));

        if self.pds.has_grid_description() {
            let slice = walker.next_section(2)?;
            self.gds.get_or_insert_with(Default::default).refill(slice)?;
            self.sections.push(walker.last_info(2, slice.len()));
            self.scan_order = self.gds.as_ref().map(GridDescription::scan_order);
        } else {
            self.gds = None;
            self.scan_order = None;
        }

        if self.pds.has_bitmap() {
            let slice = walker.next_section(3)?;
            self.bms.get_or_insert_with(Default::default).refill(slice)?;
            self.sections.push(walker.last_info(3, slice.len()));
        } else {
            self.bms = None;
        }

        let bds = walker.next_section(4)?;
        self.bds.refill(bds)?;
        self.sections.push(walker.last_info(4, bds.len()));
        self.sections.push(SectionInfo {
            num: 5,
            offset: total - END_SIZE,
            size: END_SIZE,
        });

        self.packing = SimplePacking::new(
            self.bds.reference_value(),
            self.bds.binary_scale(),
            self.pds.decimal_scale(),
            self.bds.word_size(),
        );
        Ok(())
    }

    /// Returns the 1-based position of the record in its file.
    pub fn rec_num(&self) -> usize {
        self.rec_num
    }

    /// Returns the offset of Section 0 in the file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    pub fn product_definition(&self) -> &ProductDefinition {
        &self.pds
    }

    pub fn grid_description(&self) -> Option<&GridDescription> {
        self.gds.as_ref()
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bms.as_ref()
    }

    pub fn binary_data(&self) -> &BinaryData {
        &self.bds
    }

    pub fn sections(&self) -> &[SectionInfo] {
        &self.sections
    }

    pub fn packing(&self) -> &SimplePacking {
        &self.packing
    }

    /// Returns the GRIB parameter code (PDS octet 9).
    pub fn code(&self) -> u8 {
        self.pds.parameter_code()
    }

    /// Returns the scan order used to lay out the record's values. Records
    /// without their own grid description take the file's.
    pub fn scan_order(&self) -> Result<ScanOrder, GribError> {
        self.scan_order
            .ok_or(GribError::from(ParseError::NoGridDefinition(self.offset)))
    }

    pub(crate) fn set_scan_order(&mut self, order: ScanOrder) {
        self.scan_order = Some(order);
    }
}

/// Checks the section lengths of a whole record and returns its parameter
/// code, without copying any section.
pub(crate) fn peek_code(bytes: &[u8], offset: u64) -> Result<u8, ParseError> {
    let total = bytes.len();
    if total < INDICATOR_SIZE + END_SIZE {
        return Err(ParseError::EndSectionMismatch { offset });
    }
    let mut walker = SectionWalker {
        bytes: &bytes[..total - END_SIZE],
        pos: INDICATOR_SIZE,
        record_offset: offset,
    };

    let pds = walker.next_section(1)?;
    check_size(1, pds, PDS_MIN_SIZE)?;
    let flag = pds[7];
    if flag & 0b10000000 != 0 {
        walker.next_section(2)?;
    }
    if flag & 0b01000000 != 0 {
        walker.next_section(3)?;
    }
    walker.next_section(4)?;
    Ok(pds[8])
}

struct SectionWalker<'a> {
    bytes: &'a [u8],
    pos: usize,
    record_offset: u64,
}

impl<'a> SectionWalker<'a> {
    fn next_section(&mut self, num: u8) -> Result<&'a [u8], ParseError> {
        let available = self.bytes.len().saturating_sub(self.pos);
        let overflow = |declared| ParseError::SectionLengthOverflow {
            section: num,
            offset: self.record_offset,
            declared,
            available,
        };
        if available < 3 {
            return Err(overflow(3));
        }
        let declared = uint_from_be_bytes(&self.bytes[self.pos..self.pos + 3]) as usize;
        if declared < 3 || declared > available {
            return Err(overflow(declared));
        }
        let slice = &self.bytes[self.pos..self.pos + declared];
        self.pos += declared;
        Ok(slice)
    }

    fn last_info(&self, num: u8, size: usize) -> SectionInfo {
        SectionInfo {
            num,
            offset: self.pos - size,
            size,
        }
    }
}
