use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Минимальный CLI для QuiverLog
#[derive(Parser, Debug)]
#[command(name = "qlog", version, about = "QuiverLog CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create a new log (fails if the file exists)
    Create {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        data_type: String,
        #[arg(long, default_value = "")]
        data_layout: String,
        /// Record size incl. timestamp; 0 = variable-size records
        #[arg(long, default_value_t = 0)]
        record_size: u32,
        /// Variable-size only: 24-byte (64-bit) pointer records
        #[arg(long, default_value_t = false)]
        large_data: bool,
        /// Separator written after each variable-size payload
        #[arg(long, default_value = "")]
        gap_data: String,
    },
    /// Append one record (opens the existing log without type checks)
    Append {
        #[arg(long)]
        path: PathBuf,
        /// Timestamp; must be greater than the last one in the log
        #[arg(long)]
        timestamp: u64,
        /// Payload as hex bytes, e.g. --hex deadbeef
        #[arg(long)]
        hex: Option<String>,
        /// Payload as a UTF-8 string
        #[arg(long)]
        string: Option<String>,
        /// Payload as an 8-byte LE double
        #[arg(long)]
        double: Option<f64>,
    },
    /// Print header fields, record count and last timestamp
    ///
    /// Пример:
    ///   qlog info --path ./telemetry.qlog
    ///   qlog info --path ./telemetry.qlog --json
    Info {
        #[arg(long)]
        path: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Dump records as "index timestamp payload" (hex + UTF-8 best effort)
    Dump {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Maximum number of records to print
        #[arg(long, default_value_t = usize::MAX)]
        count: usize,
        /// JSONL output (one object per record)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Lower-bound search: index of the first record with ts >= timestamp
    Find {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        timestamp: u64,
    },
}
