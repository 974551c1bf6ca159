//! Sequential record decoder
//!
//! Records carry a NUL-terminated filename between two fixed-size parts, so
//! the start of record N is only known after decoding records 0..N. The
//! decoder is therefore a forward-only cursor over the whole buffer.

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::error::{TraceError, TraceResult};
use crate::record::{TraceRecord, HEADER_SIZE, LINE_NUMBER_SIZE};

/// Decode the record starting at `*offset`.
///
/// On success `*offset` is moved past the record. On failure it is left
/// untouched and the error carries the offset of the record that failed.
pub fn decode_next(buffer: &[u8], offset: &mut usize) -> TraceResult<TraceRecord> {
    let start = *offset;
    let rest = buffer.get(start..).unwrap_or_default();

    if rest.len() < HEADER_SIZE {
        return Err(TraceError::TruncatedHeader {
            offset: start,
            remaining: rest.len(),
        });
    }
    let (header, rest) = rest.split_at(HEADER_SIZE);

    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(TraceError::UnterminatedFilename { offset: start })?;
    let source_file = std::str::from_utf8(&rest[..nul])
        .map_err(|source| TraceError::InvalidTextEncoding {
            offset: start,
            source,
        })?
        .to_owned();
    let rest = &rest[nul + 1..];

    if rest.len() < LINE_NUMBER_SIZE {
        return Err(TraceError::TruncatedLineNumber {
            offset: start,
            remaining: rest.len(),
        });
    }

    let record = TraceRecord {
        trace_id: LittleEndian::read_u64(&header[0..8]),
        timestamp: LittleEndian::read_u64(&header[8..16]),
        originating_uid: LittleEndian::read_u32(&header[16..20]),
        header_length: header[20],
        function_id: header[21],
        seq_and_options: header[22],
        error_and_reserved: header[23],
        source_file,
        source_line: LittleEndian::read_i32(&rest[..LINE_NUMBER_SIZE]),
    };

    *offset = start + HEADER_SIZE + nul + 1 + LINE_NUMBER_SIZE;
    trace!(
        offset = start,
        trace_id = record.trace_id,
        len = *offset - start,
        "decoded record"
    );

    Ok(record)
}

/// Cursor that yields records until the buffer is exhausted
///
/// Iteration stops for good after the first error: without a decoded
/// filename there is no way to find the next record boundary.
pub struct RecordDecoder<'a> {
    buffer: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            failed: false,
        }
    }

    pub fn decode_next(&mut self) -> TraceResult<TraceRecord> {
        decode_next(self.buffer, &mut self.offset)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset == self.buffer.len()
    }
}

impl<'a> Iterator for RecordDecoder<'a> {
    type Item = TraceResult<TraceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.is_exhausted() {
            return None;
        }

        let result = self.decode_next();
        self.failed = result.is_err();
        Some(result)
    }
}

impl<'a> std::iter::FusedIterator for RecordDecoder<'a> {}
