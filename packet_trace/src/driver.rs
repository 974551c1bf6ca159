//! Decode a whole trace buffer and write one line per record

use std::io::Write;

use tracing::debug;

use crate::decoder::RecordDecoder;
use crate::error::{TraceError, TraceResult};
use crate::formatter::{format_record, OutputFormat};
use crate::summary::TraceSummary;

/// Decode every record in `bytes` and write it to `out`.
///
/// Lines are written as soon as each record decodes, so on a decode error
/// everything before the corrupt record has already been emitted.
pub fn dump<W: Write>(
    bytes: &[u8],
    out: &mut W,
    format: OutputFormat,
) -> TraceResult<TraceSummary> {
    let mut decoder = RecordDecoder::new(bytes);
    let mut summary = TraceSummary::default();
    let mut previous_timestamp = None;

    while !decoder.is_exhausted() {
        let record = match decoder.decode_next() {
            Ok(record) => record,
            Err(err) => {
                out.flush().map_err(TraceError::Output)?;
                return Err(err);
            }
        };

        writeln!(out, "{}", format_record(&record, previous_timestamp, format))
            .map_err(TraceError::Output)?;

        previous_timestamp = Some(record.timestamp);
        summary.observe(&record);
    }

    out.flush().map_err(TraceError::Output)?;
    debug!(
        records = summary.records,
        bytes = decoder.offset(),
        "reached end of trace"
    );

    Ok(summary)
}
