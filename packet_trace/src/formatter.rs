//! Line formatters for decoded records
//!
//! Supports the classic text line and JSON lines. Both are pure functions of
//! the record and the previous record's timestamp; the caller threads the
//! timestamp from one call to the next.

use serde::Serialize;

use crate::base58;
use crate::record::{PacketError, TraceKind, TraceRecord};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format '{}'. Use 'text' or 'json'", s)),
        }
    }
}

/// Signed distance from the previous record's timestamp.
///
/// The first record of a run has no predecessor and gets a delta of zero.
pub fn timestamp_delta(timestamp: u64, previous_timestamp: Option<u64>) -> i128 {
    let previous = previous_timestamp.unwrap_or(timestamp);
    i128::from(timestamp) - i128::from(previous)
}

/// Format one record in the requested format.
pub fn format_record(
    record: &TraceRecord,
    previous_timestamp: Option<u64>,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => format_text(record, previous_timestamp),
        OutputFormat::Json => format_json(record, previous_timestamp),
    }
}

/// Format one record as a text line.
pub fn format_text(record: &TraceRecord, previous_timestamp: Option<u64>) -> String {
    format!(
        "I: {:>20}, T: {} {:>+10}, U: {:<6}, L: {:>3}, F: {:>3}, S: {:>2}, R: {}, E: {} -> {}:{}",
        record.trace_id,
        record.timestamp,
        timestamp_delta(record.timestamp, previous_timestamp),
        base58::encode(u64::from(record.originating_uid)),
        record.header_length,
        record.function_id,
        record.sequence_number(),
        record.option_flag(),
        record.error_code(),
        record.source_file,
        record.source_line
    )
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    trace_id: u64,
    kind: TraceKind,
    timestamp: u64,
    delta: i64,
    uid: String,
    length: u8,
    function_id: u8,
    sequence_number: u8,
    option: u8,
    error_code: u8,
    error_name: PacketError,
    seq_and_options: u8,
    error_and_reserved: u8,
    file: &'a str,
    line: i32,
}

/// Format one record as a single-line JSON object.
pub fn format_json(record: &TraceRecord, previous_timestamp: Option<u64>) -> String {
    let delta = timestamp_delta(record.timestamp, previous_timestamp);
    let json_record = JsonRecord {
        trace_id: record.trace_id,
        kind: record.kind(),
        timestamp: record.timestamp,
        // u64 differences always fit in 65 bits; clamp the pathological cases
        delta: delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
        uid: base58::encode(u64::from(record.originating_uid)),
        length: record.header_length,
        function_id: record.function_id,
        sequence_number: record.sequence_number(),
        option: record.option_flag(),
        error_code: record.error_code(),
        error_name: record.packet_error(),
        seq_and_options: record.seq_and_options,
        error_and_reserved: record.error_and_reserved,
        file: &record.source_file,
        line: record.source_line,
    };

    serde_json::to_string(&json_record).unwrap_or_else(|_| "{}".to_string())
}
