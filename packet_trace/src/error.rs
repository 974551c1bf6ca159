use std::{io, path::PathBuf, str::Utf8Error};

use thiserror::Error;

use crate::record::{HEADER_SIZE, LINE_NUMBER_SIZE};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error(
        "truncated header at offset {offset}: need {need} bytes, {remaining} remaining",
        need = HEADER_SIZE
    )]
    TruncatedHeader { offset: usize, remaining: usize },

    #[error("unterminated filename at offset {offset}: no NUL byte before end of stream")]
    UnterminatedFilename { offset: usize },

    #[error(
        "truncated line number at offset {offset}: need {need} bytes, {remaining} remaining",
        need = LINE_NUMBER_SIZE
    )]
    TruncatedLineNumber { offset: usize, remaining: usize },

    #[error("invalid text encoding in filename at offset {offset}: {source}")]
    InvalidTextEncoding {
        offset: usize,
        #[source]
        source: Utf8Error,
    },

    #[error("trace file not found: {path:?}")]
    InputNotFound { path: PathBuf },

    #[error("io error at {path:?}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

pub type TraceResult<T> = Result<T, TraceError>;

impl TraceError {
    /// Classify an error raised while opening or mapping `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::InputNotFound { path }
        } else {
            Self::InputUnreadable { path, source }
        }
    }

    /// Byte offset of the record that failed to decode, if this is a decode error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedHeader { offset, .. }
            | Self::UnterminatedFilename { offset }
            | Self::TruncatedLineNumber { offset, .. }
            | Self::InvalidTextEncoding { offset, .. } => Some(*offset),
            Self::InputNotFound { .. } | Self::InputUnreadable { .. } | Self::Output(_) => None,
        }
    }

    pub fn is_decode_error(&self) -> bool {
        self.offset().is_some()
    }

    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Output(source) if source.kind() == io::ErrorKind::BrokenPipe)
    }
}
