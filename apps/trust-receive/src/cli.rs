//! Command line interface definition

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// trust-receive - detect conflicting content reports
///
/// Reads one JSON report per line (`url`, `hash`, `size`, `last_modified`)
/// and prints one JSON result per line.
#[derive(Parser, Debug)]
#[command(name = "trust-receive")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect conflicting content reports for the same resource version")]
#[command(long_about = None)]
pub struct Cli {
    /// Report file in JSON-lines format (stdin when omitted or `-`)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Store backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Database file for the sqlite backend
    #[arg(long, value_name = "PATH")]
    pub store_path: Option<PathBuf>,

    /// Store key namespace
    #[arg(long)]
    pub key_prefix: Option<String>,

    /// Number of distinct versions the filter is sized for
    #[arg(long)]
    pub capacity: Option<u64>,

    /// Target filter false-positive rate
    #[arg(long)]
    pub fp_rate: Option<f64>,

    /// Per-report deadline for store I/O, in milliseconds
    #[arg(long, value_name = "MS")]
    pub deadline_ms: Option<u64>,

    /// Command to run per conflict, as one whitespace-separated string
    /// (e.g. "notify --team cdn"); the alert text is appended as the last argument
    #[arg(long, value_name = "CMD", value_delimiter = ' ')]
    pub alert_command: Option<Vec<String>>,

    /// Print conflict counters in Prometheus text format after the run
    #[arg(long)]
    pub metrics: bool,

    /// Print membership filter statistics after the run
    #[arg(long)]
    pub stats: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Memory,
    Sqlite,
}

impl Cli {
    /// Input path, or `None` for stdin
    #[must_use]
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }
}
