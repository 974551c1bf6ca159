//! packet-trace - dump a daemon packet-trace log
//!
//! Usage:
//!   packet-trace /tmp/daemonlib-packet-trace
//!   packet-trace /tmp/daemonlib-packet-trace --format json --summary

mod app;

use anyhow::Result;
use clap::Parser;

use crate::app::{Args, DumpConfig};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = DumpConfig::from(args);
    app::init_tracing(config.log_level);
    app::run(config)
}
