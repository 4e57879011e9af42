use std::io::{self, Read, Seek, SeekFrom};

use crate::{
    datatypes::{END_MAGIC, END_SIZE, INDICATOR_MAGIC, INDICATOR_SIZE, Indicator},
    error::*,
};

/// Number of bytes searched for the first "GRIB" marker, and the size of the
/// chunks scanned between records.
pub(crate) const MARKER_SEARCH_SIZE: usize = 100;

pub trait Grib1Read: Read + Seek {
    /// Positions the stream at the first "GRIB" marker, which must lie in
    /// the first [`MARKER_SEARCH_SIZE`] bytes, and returns its offset.
    fn skip_header(&mut self) -> Result<u64, ParseError>;

    /// Scans forward from the current position for the next "GRIB" marker.
    /// Returns `None` when the stream ends first.
    fn next_marker(&mut self) -> Result<Option<u64>, ParseError>;

    /// Reads the whole record starting at `offset`, closing "7777"
    /// included, into a buffer owned by the reader.
    fn read_record_bytes(&mut self, offset: u64) -> Result<&[u8], ParseError>;
}

pub struct SeekableGrib1Reader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R> SeekableGrib1Reader<R> {
    pub fn new(r: R) -> Self {
        Self {
            reader: r,
            buf: Vec::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Read for SeekableGrib1Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.reader.read_exact(buf)
    }
}

impl<S: Seek> Seek for SeekableGrib1Reader<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl<R: Read + Seek> Grib1Read for SeekableGrib1Reader<R> {
    fn skip_header(&mut self) -> Result<u64, ParseError> {
        self.seek(SeekFrom::Start(0))?;
        let mut head = [0; MARKER_SEARCH_SIZE];
        let n = read_up_to(&mut self.reader, &mut head)?;
        let pos = find_marker(&head[..n]).ok_or(ParseError::NotGRIB)?;

        let offset = pos as u64;
        self.seek(SeekFrom::Start(offset))?;
        Ok(offset)
    }

    fn next_marker(&mut self) -> Result<Option<u64>, ParseError> {
        let mut base = self.stream_position()?;
        let mut window = Vec::with_capacity(MARKER_SEARCH_SIZE + INDICATOR_MAGIC.len());
        let mut chunk = [0; MARKER_SEARCH_SIZE];

        loop {
            let n = read_up_to(&mut self.reader, &mut chunk)?;
            window.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find_marker(&window) {
                let offset = base + pos as u64;
                self.seek(SeekFrom::Start(offset))?;
                return Ok(Some(offset));
            }
            if n < chunk.len() {
                return Ok(None);
            }

            // a marker may straddle two chunks
            let keep = window.len().min(INDICATOR_MAGIC.len() - 1);
            let drop = window.len() - keep;
            window.drain(..drop);
            base += drop as u64;
        }
    }

    fn read_record_bytes(&mut self, offset: u64) -> Result<&[u8], ParseError> {
        self.seek(SeekFrom::Start(offset))?;

        let mut header = [0; INDICATOR_SIZE];
        let n = read_up_to(&mut self.reader, &mut header)?;
        if n < INDICATOR_SIZE {
            return Err(ParseError::UnexpectedEndOfData {
                offset,
                expected: INDICATOR_SIZE,
                found: n,
            });
        }
        let indicator = Indicator::from_slice(&header)?;
        let total = indicator.total_length as usize;
        if total < INDICATOR_SIZE + END_SIZE {
            return Err(ParseError::EndSectionMismatch { offset });
        }

        self.buf.clear();
        self.buf.resize(total, 0);
        self.buf[..INDICATOR_SIZE].copy_from_slice(&header);
        let n = read_up_to(&mut self.reader, &mut self.buf[INDICATOR_SIZE..])?;
        let found = INDICATOR_SIZE + n;
        if found < total {
            return Err(ParseError::UnexpectedEndOfData {
                offset,
                expected: total,
                found,
            });
        }
        if &self.buf[total - END_SIZE..] != END_MAGIC {
            return Err(ParseError::EndSectionMismatch { offset });
        }

        Ok(&self.buf)
    }
}

/// Fills `buf` as far as the stream allows and returns the number of bytes
/// read, which is less than `buf.len()` only at the end of the stream.
fn read_up_to<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize, ParseError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn find_marker(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(INDICATOR_MAGIC.len())
        .position(|w| w == INDICATOR_MAGIC)
}
