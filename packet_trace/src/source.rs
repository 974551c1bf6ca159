//! Trace file loading
//!
//! The daemon writes its trace buffer in one go and never appends to a file
//! that is being read, so regular files are mapped read-only up front. Pipes,
//! character devices and other streams report no useful length and are read
//! to the end into an owned buffer instead.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::decoder::RecordDecoder;
use crate::error::{TraceError, TraceResult};

enum TraceBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl TraceBytes {
    fn as_slice(&self) -> &[u8] {
        match self {
            TraceBytes::Mapped(mmap) => &mmap[..],
            TraceBytes::Owned(buf) => buf.as_slice(),
        }
    }
}

/// Trace file held fully in memory
pub struct TraceFile {
    path: PathBuf,
    bytes: TraceBytes,
}

impl TraceFile {
    /// Open a trace file and load all of its bytes
    pub fn open(path: impl AsRef<Path>) -> TraceResult<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| TraceError::io(path, e))?;
        let metadata = file.metadata().map_err(|e| TraceError::io(path, e))?;

        // Zero-length files cannot be mapped on every platform, and streams
        // report a length of zero whatever they hold.
        let bytes = if metadata.is_file() && metadata.len() > 0 {
            // SAFETY: the mapping is read-only and trace files are not
            // modified after the daemon flushes them.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| TraceError::io(path, e))?;
            debug!(path = %path.display(), bytes = mmap.len(), "mapped trace file");
            TraceBytes::Mapped(mmap)
        } else {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).map_err(|e| TraceError::io(path, e))?;
            debug!(path = %path.display(), bytes = buf.len(), "read trace stream");
            TraceBytes::Owned(buf)
        };

        Ok(TraceFile {
            path: path.to_path_buf(),
            bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.bytes, TraceBytes::Mapped(_))
    }

    pub fn records(&self) -> RecordDecoder<'_> {
        RecordDecoder::new(self.bytes())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::record::TraceRecord;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_trace_file(record_count: u64) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();

        for i in 0..record_count {
            let record = TraceRecord {
                trace_id: 2 + i * 2,
                timestamp: 1000 + i * 100,
                originating_uid: 54544,
                header_length: 8,
                function_id: 1,
                seq_and_options: 0x18,
                error_and_reserved: 0,
                source_file: "src/brickd/network.c".to_string(),
                source_line: 100 + i as i32,
            };
            record.write_to(&mut file).unwrap();
        }

        file.flush().unwrap();
        file
    }

    #[test]
    fn trace_file__open_valid__then_all_records() {
        let file = create_test_trace_file(10);
        let trace = TraceFile::open(file.path()).unwrap();

        assert_eq!(trace.path(), file.path());
        assert!(trace.is_mapped());
        let records: Vec<_> = trace.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[9].timestamp, 1900);
        assert_eq!(records[9].source_line, 109);
    }

    #[test]
    fn trace_file__open_empty__then_no_bytes() {
        let file = NamedTempFile::new().unwrap();
        let trace = TraceFile::open(file.path()).unwrap();

        assert!(trace.is_empty());
        assert!(!trace.is_mapped());
        assert_eq!(trace.records().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn trace_file__open_fifo__then_reads_stream_to_end() {
        let file = create_test_trace_file(3);
        let expected = std::fs::read(file.path()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("trace.fifo");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(status.success());

        let writer = {
            let fifo = fifo.clone();
            let expected = expected.clone();
            std::thread::spawn(move || std::fs::write(fifo, expected).unwrap())
        };
        let trace = TraceFile::open(&fifo).unwrap();
        writer.join().unwrap();

        assert!(!trace.is_mapped());
        assert_eq!(trace.bytes(), &expected[..]);
        let records: Vec<_> = trace.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].source_line, 102);
    }

    #[test]
    fn trace_file__open_missing__then_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("daemonlib-packet-trace");

        let err = TraceFile::open(&missing).err().unwrap();
        assert!(matches!(err, TraceError::InputNotFound { ref path } if path == &missing));
    }

    #[test]
    fn trace_file__open_directory__then_input_unreadable() {
        let dir = tempfile::tempdir().unwrap();

        let err = TraceFile::open(dir.path()).err().unwrap();
        assert!(matches!(err, TraceError::InputUnreadable { .. }));
    }
}
