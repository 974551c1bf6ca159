//! Packet trace record layout
//!
//! One record per trace point, written back to back with no framing:
//!
//! ```text
//! offset  size  field
//! 0       8     trace_id
//! 8       8     timestamp
//! 16      4     originating_uid
//! 20      1     header_length
//! 21      1     function_id
//! 22      1     seq_and_options      (hi nibble = seq#, bit 2 = option)
//! 23      1     error_and_reserved   (top 2 bits = error code)
//! 24      N     source_file          (NUL-terminated)
//! 24+N    4     source_line          (signed)
//! ```
//!
//! All integers are little-endian.

use std::fmt;
use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use serde::Serialize;

/// Size of the fixed prefix: trace id, timestamp and the 8-byte packet header.
pub const HEADER_SIZE: usize = 24;

/// Size of the trailing signed line number.
pub const LINE_NUMBER_SIZE: usize = 4;

/// Smallest possible record: header, empty filename, line number.
pub const MIN_RECORD_SIZE: usize = HEADER_SIZE + 1 + LINE_NUMBER_SIZE;

const SEQUENCE_NUMBER_SHIFT: u8 = 4;
const OPTION_FLAG_SHIFT: u8 = 2;
const ERROR_CODE_SHIFT: u8 = 6;

/// A decoded trace record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub trace_id: u64,
    pub timestamp: u64,
    pub originating_uid: u32,
    pub header_length: u8,
    pub function_id: u8,
    pub seq_and_options: u8,
    pub error_and_reserved: u8,
    pub source_file: String,
    pub source_line: i32,
}

impl TraceRecord {
    pub fn sequence_number(&self) -> u8 {
        self.seq_and_options >> SEQUENCE_NUMBER_SHIFT
    }

    /// Bit 2 of the sequence byte. Bits 0, 1 and 3 are not interpreted.
    pub fn option_flag(&self) -> u8 {
        (self.seq_and_options >> OPTION_FLAG_SHIFT) & 0x01
    }

    /// Top two bits of the error byte. The low six bits are reserved.
    pub fn error_code(&self) -> u8 {
        self.error_and_reserved >> ERROR_CODE_SHIFT
    }

    pub fn packet_error(&self) -> PacketError {
        PacketError::from(self.error_code())
    }

    pub fn kind(&self) -> TraceKind {
        TraceKind::from(self.trace_id)
    }

    /// Number of bytes this record occupies in a trace file.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.source_file.len() + 1 + LINE_NUMBER_SIZE
    }

    /// Write the record in trace file layout.
    ///
    /// `source_file` must not contain a NUL byte; the terminator is the only
    /// record boundary the format has.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        if self.source_file.as_bytes().contains(&0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "source_file contains a NUL byte",
            ));
        }

        w.write_u64::<LittleEndian>(self.trace_id)?;
        w.write_u64::<LittleEndian>(self.timestamp)?;
        w.write_u32::<LittleEndian>(self.originating_uid)?;
        w.write_u8(self.header_length)?;
        w.write_u8(self.function_id)?;
        w.write_u8(self.seq_and_options)?;
        w.write_u8(self.error_and_reserved)?;
        w.write_all(self.source_file.as_bytes())?;
        w.write_u8(0)?;
        w.write_i32::<LittleEndian>(self.source_line)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

/// Direction of a traced packet, derived from its trace id.
///
/// The daemon hands out even ids to requests counting up from 2 and odd ids
/// to responses counting down from `u64::MAX`; zero marks an untraced packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Request,
    Response,
    Invalid,
}

impl From<u64> for TraceKind {
    fn from(trace_id: u64) -> Self {
        match trace_id {
            0 => TraceKind::Invalid,
            id if id % 2 == 0 => TraceKind::Request,
            _ => TraceKind::Response,
        }
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceKind::Request => write!(f, "request"),
            TraceKind::Response => write!(f, "response"),
            TraceKind::Invalid => write!(f, "invalid"),
        }
    }
}

/// Error code carried in the top two bits of the packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketError {
    Success,
    InvalidParameter,
    FunctionNotSupported,
    UnknownError,
}

impl From<u8> for PacketError {
    fn from(code: u8) -> Self {
        match code & 0x03 {
            0 => PacketError::Success,
            1 => PacketError::InvalidParameter,
            2 => PacketError::FunctionNotSupported,
            _ => PacketError::UnknownError,
        }
    }
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::Success => write!(f, "success"),
            PacketError::InvalidParameter => write!(f, "invalid parameter"),
            PacketError::FunctionNotSupported => write!(f, "function not supported"),
            PacketError::UnknownError => write!(f, "unknown error"),
        }
    }
}
