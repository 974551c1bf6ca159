//! Run statistics printed after the decoded records

use serde::Serialize;

use crate::formatter::OutputFormat;
use crate::record::{TraceKind, TraceRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceSummary {
    pub records: usize,
    pub bytes: usize,
    pub first_timestamp: Option<u64>,
    pub last_timestamp: Option<u64>,
    pub requests: usize,
    pub responses: usize,
    pub invalid: usize,
    pub errors: usize,
}

impl TraceSummary {
    pub fn observe(&mut self, record: &TraceRecord) {
        self.records += 1;
        self.bytes += record.encoded_len();
        self.first_timestamp.get_or_insert(record.timestamp);
        self.last_timestamp = Some(record.timestamp);

        match record.kind() {
            TraceKind::Request => self.requests += 1,
            TraceKind::Response => self.responses += 1,
            TraceKind::Invalid => self.invalid += 1,
        }
        if record.error_code() != 0 {
            self.errors += 1;
        }
    }

    /// Signed distance between the last and the first timestamp.
    pub fn span(&self) -> i128 {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => i128::from(last) - i128::from(first),
            _ => 0,
        }
    }

    pub fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.format_text(),
            OutputFormat::Json => self.format_json(),
        }
    }

    fn format_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Records:   {}\n", self.records));
        output.push_str(&format!("Bytes:     {}\n", self.bytes));
        if let (Some(first), Some(last)) = (self.first_timestamp, self.last_timestamp) {
            output.push_str(&format!("Time:      {} .. {} ({:+})\n", first, last, self.span()));
        }
        output.push_str(&format!("Requests:  {}\n", self.requests));
        output.push_str(&format!("Responses: {}\n", self.responses));
        if self.invalid > 0 {
            output.push_str(&format!("Invalid:   {}\n", self.invalid));
        }
        output.push_str(&format!("Errors:    {}", self.errors));

        output
    }

    fn format_json(&self) -> String {
        #[derive(Serialize)]
        struct JsonSummary<'a> {
            summary: &'a TraceSummary,
        }

        serde_json::to_string(&JsonSummary { summary: self }).unwrap_or_else(|_| "{}".to_string())
    }
}
