use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use packet_trace::{dump, OutputFormat, TraceError, TraceFile};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "packet-trace",
    author,
    version,
    about = "Decode a daemon packet-trace log into readable lines",
    long_about = None
)]
pub struct Args {
    /// Trace file written by the daemon (e.g. /tmp/daemonlib-packet-trace)
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Print record statistics after the last record
    #[arg(short, long)]
    pub summary: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct DumpConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub summary: bool,
    pub log_level: &'static str,
}

impl From<Args> for DumpConfig {
    fn from(value: Args) -> Self {
        Self {
            path: value.path,
            format: value.format,
            summary: value.summary,
            log_level: if value.verbose { "debug" } else { "warn" },
        }
    }
}

pub fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries the decoded records
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run(config: DumpConfig) -> Result<()> {
    let trace = TraceFile::open(&config.path)
        .with_context(|| format!("failed to load trace {}", config.path.display()))?;
    info!(path = %trace.path().display(), bytes = trace.len(), "decoding trace");

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let summary = match dump(trace.bytes(), &mut out, config.format) {
        Ok(summary) => summary,
        Err(err) if err.is_broken_pipe() => {
            debug!("stdout closed, stopping");
            return Ok(());
        }
        Err(err) => {
            if let Some(offset) = err.offset() {
                warn!(offset, "trace is corrupt, remaining records skipped");
            }
            return Err(err)
                .with_context(|| format!("failed to decode {}", config.path.display()));
        }
    };

    if config.summary {
        let written =
            writeln!(out, "{}", summary.format(config.format)).and_then(|_| out.flush());
        match written.map_err(TraceError::Output) {
            Err(err) if err.is_broken_pipe() => return Ok(()),
            other => other.context("failed to write summary")?,
        }
    }

    Ok(())
}
