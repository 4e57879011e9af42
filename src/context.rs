use std::{
    cell::RefCell,
    fs::File,
    io::{BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
};

use tracing::{debug, trace, warn};

use crate::{
    datatypes::*,
    error::*,
    field::UnpackedField,
    grid::{GridDescriptor, ScanOrder},
    reader::{Grib1Read, SeekableGrib1Reader},
};

/// Opens a GRIB1 file and indexes its records.
///
/// # Examples
///
/// ```no_run
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let grib1 = grib1::open("gfs.t00z.pgrbf06")?;
///     for entry in grib1.index().iter() {
///         println!("{:>10} {}", entry.offset, entry.code);
///     }
///     Ok(())
/// }
/// ```
pub fn open<P: AsRef<Path>>(
    path: P,
) -> Result<Grib1<SeekableGrib1Reader<BufReader<File>>>, GribError> {
    let f = File::open(path)?;
    from_reader(BufReader::new(f))
}

/// Reads a [`Grib1`] instance from an I/O stream of GRIB1.
pub fn from_reader<SR: Read + Seek>(
    reader: SR,
) -> Result<Grib1<SeekableGrib1Reader<SR>>, GribError> {
    Grib1::<SeekableGrib1Reader<SR>>::read_with_seekable(reader)
}

/// Reads a [`Grib1`] instance from bytes of GRIB1.
pub fn from_slice(bytes: &[u8]) -> Result<Grib1<SeekableGrib1Reader<Cursor<&[u8]>>>, GribError> {
    let reader = Cursor::new(bytes);
    Grib1::<SeekableGrib1Reader<Cursor<&[u8]>>>::read_with_seekable(reader)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordIndexEntry {
    /// Offset of the record's "GRIB" marker in the file.
    pub offset: u64,
    pub code: u8,
}

/// Record locations gathered in one pass when the file is opened.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileIndex {
    entries: Vec<RecordIndexEntry>,
}

impl FileIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&RecordIndexEntry> {
        self.entries.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordIndexEntry> {
        self.entries.iter()
    }
}

/// An indexed GRIB1 file.
///
/// All records are assumed to share the grid of the first one. Record
/// indexes are 0-based; [`BinaryRecord::rec_num`] is 1-based.
pub struct Grib1<R> {
    reader: RefCell<R>,
    index: FileIndex,
    grid: GridDescriptor,
    scan_order: ScanOrder,
    grid_relative_winds: bool,
}

impl<R> Grib1<R> {
    /// Returns the number of indexed records.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if `self` has zero records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    /// Returns the file offset of record `i`.
    pub fn offset(&self, i: usize) -> Result<u64, ValidationError> {
        self.entry(i).map(|e| e.offset)
    }

    /// Returns the parameter code of record `i`.
    pub fn code(&self, i: usize) -> Result<u8, ValidationError> {
        self.entry(i).map(|e| e.code)
    }

    /// Returns `true` if any record carries parameter code `code`.
    pub fn has_code(&self, code: u8) -> bool {
        self.index.iter().any(|e| e.code == code)
    }

    /// Returns the grid derived from the first record.
    pub fn grid(&self) -> &GridDescriptor {
        &self.grid
    }

    pub fn scan_order(&self) -> &ScanOrder {
        &self.scan_order
    }

    /// Returns `true` if the first record's vector components are resolved
    /// relative to the grid rather than to east and north.
    pub fn has_grid_relative_winds(&self) -> bool {
        self.grid_relative_winds
    }

    fn entry(&self, i: usize) -> Result<&RecordIndexEntry, ValidationError> {
        self.index
            .get(i)
            .ok_or(ValidationError::RecordIndexOutOfRange {
                index: i,
                len: self.len(),
            })
    }
}

impl<R: Grib1Read> Grib1<R> {
    /// Indexes every record from the first "GRIB" marker to the end of the
    /// stream, stopping early at the first corrupt record.
    pub fn read(mut r: R) -> Result<Self, GribError> {
        let mut offset = r.skip_header()?;
        let mut entries = Vec::new();
        let mut first = None;

        loop {
            let len = match r.read_record_bytes(offset) {
                Ok(bytes) => {
                    let code = peek_code(bytes, offset)?;
                    if first.is_none() {
                        first = Some(BinaryRecord::from_bytes(bytes, 1, offset)?);
                    }
                    trace!(rec_num = entries.len() + 1, offset, code, "Indexed record");
                    entries.push(RecordIndexEntry { offset, code });
                    bytes.len() as u64
                }
                Err(e) if e.is_record_corruption() => {
                    warn!(
                        offset,
                        valid_records = entries.len(),
                        error = %e,
                        "Corrupt record, ignoring the rest of the file"
                    );
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            r.seek(SeekFrom::Start(offset + len))?;
            match r.next_marker()? {
                Some(next) => offset = next,
                None => break,
            }
        }

        let first = first.ok_or(ParseError::NoRecords)?;
        let gds = first
            .grid_description()
            .ok_or(ParseError::NoGridDefinition(first.offset()))?;
        let grid = GridDescriptor::from_grid_description(gds)?;
        let scan_order = gds.scan_order();
        debug!(?grid, ?scan_order, records = entries.len(), "Indexed file");

        Ok(Self {
            reader: RefCell::new(r),
            index: FileIndex { entries },
            grid,
            scan_order,
            grid_relative_winds: gds.has_grid_relative_winds(),
        })
    }

    pub fn read_with_seekable<SR: Read + Seek>(
        r: SR,
    ) -> Result<Grib1<SeekableGrib1Reader<SR>>, GribError> {
        let r = SeekableGrib1Reader::new(r);
        Grib1::<SeekableGrib1Reader<SR>>::read(r)
    }

    /// Positions the underlying stream at record `i` and returns its offset.
    pub fn seek_record(&self, i: usize) -> Result<u64, GribError> {
        let offset = self.offset(i)?;
        self.reader.borrow_mut().seek(SeekFrom::Start(offset))?;
        Ok(offset)
    }

    pub fn read_record(&self, i: usize) -> Result<BinaryRecord, GribError> {
        let mut record = BinaryRecord::default();
        self.read_record_into(i, &mut record)?;
        Ok(record)
    }

    /// Reads record `i` into `record`, reusing its allocations.
    pub fn read_record_into(&self, i: usize, record: &mut BinaryRecord) -> Result<(), GribError> {
        let offset = self.offset(i)?;
        let mut reader = self.reader.borrow_mut();
        let bytes = reader.read_record_bytes(offset)?;
        record.refill(bytes, i + 1, offset)?;
        if record.grid_description().is_none() {
            record.set_scan_order(self.scan_order);
        }
        Ok(())
    }

    /// Iterates over all records in file order.
    pub fn records(&self) -> Records<'_, R> {
        Records { grib1: self, pos: 0 }
    }

    /// Decodes record `i` into a row-major field.
    pub fn unpack(&self, i: usize) -> Result<UnpackedField, GribError> {
        let record = self.read_record(i)?;
        self.unpack_record(&record)
    }

    pub fn unpack_record(&self, record: &BinaryRecord) -> Result<UnpackedField, GribError> {
        let order = record.scan_order().unwrap_or(self.scan_order);
        UnpackedField::from_record(record, &order)
    }
}

impl<'a, R: Grib1Read> IntoIterator for &'a Grib1<R> {
    type Item = Result<BinaryRecord, GribError>;
    type IntoIter = Records<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}

pub struct Records<'a, R> {
    grib1: &'a Grib1<R>,
    pos: usize,
}

impl<R: Grib1Read> Iterator for Records<'_, R> {
    type Item = Result<BinaryRecord, GribError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.grib1.len() {
            return None;
        }
        let record = self.grib1.read_record(self.pos);
        self.pos += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.grib1.len().saturating_sub(self.pos);
        (size, Some(size))
    }
}
