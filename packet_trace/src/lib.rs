//! Packet trace decoder
//!
//! Reads the binary trace log a daemon writes when built with packet tracing
//! and renders each record as a line of text (or JSON).
//!
//! ```no_run
//! use packet_trace::{dump, OutputFormat, TraceFile};
//!
//! let trace = TraceFile::open("/tmp/daemonlib-packet-trace")?;
//! let summary = dump(trace.bytes(), &mut std::io::stdout().lock(), OutputFormat::Text)?;
//! eprintln!("{} records", summary.records);
//! # Ok::<(), packet_trace::TraceError>(())
//! ```

pub mod base58;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod formatter;
pub mod record;
pub mod source;
pub mod summary;

pub use decoder::{decode_next, RecordDecoder};
pub use driver::dump;
pub use error::{TraceError, TraceResult};
pub use formatter::{format_json, format_record, format_text, timestamp_delta, OutputFormat};
pub use record::{PacketError, TraceKind, TraceRecord, HEADER_SIZE, LINE_NUMBER_SIZE};
pub use source::TraceFile;
pub use summary::TraceSummary;
