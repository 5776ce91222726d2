//! Centralized configuration for QuiverLog.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - LogConfig::from_env() reads QL_* env vars; fluent with_* setters for code.
//!
//! Units:
//! - initial_size / max_grow_size are in RECORDS and are multiplied by the
//!   record size when applied to the time slab.
//! - initial_data_size / max_data_grow_size are in BYTES (data slab).
//! - max_map_size is a hard cap (bytes) on a single mapping; growth past it
//!   fails instead of remapping.

use std::fmt;

/// Top-level configuration for a log open (writer/reader).
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Open read-only: no mutation, no truncation on close.
    pub read_only: bool,

    /// Validate header dataType against the requested one on reopen.
    pub check_type: bool,

    /// Validate header dataLayout against the requested one on reopen.
    pub check_layout: bool,

    /// Validate header recordSize/fixedSize against the request on reopen.
    pub check_size: bool,

    /// Enforce strictly increasing timestamps on append.
    /// Env: QL_CHECK_MONOTONIC (default true; "0|false|off|no" => false)
    pub check_monotonic: bool,

    /// On create with variable-size records, use 24-byte (64-bit pointer)
    /// records instead of 16-byte (32-bit pointer) ones.
    /// Env: QL_LARGE_DATA (default false)
    pub large_data: bool,

    /// Byte-string written after each variable-size payload in the data file.
    /// Env: QL_GAP_DATA (default empty)
    pub gap_data: String,

    /// Initial time-slab growth quantum, in records.
    /// Env: QL_INITIAL_SIZE (default 1024)
    pub initial_size: u64,

    /// Growth quantum ceiling for the time slab, in records.
    /// Env: QL_MAX_GROW_SIZE (default 1048576)
    pub max_grow_size: u64,

    /// Hard cap on a single mapping, in bytes.
    /// Env: QL_MAX_MAP_SIZE (default unlimited)
    pub max_map_size: u64,

    /// Initial data-slab growth quantum, in bytes.
    /// Env: QL_INITIAL_DATA_SIZE (default 65536)
    pub initial_data_size: u64,

    /// Growth quantum ceiling for the data slab, in bytes.
    /// Env: QL_MAX_DATA_GROW_SIZE (default 16777216)
    pub max_data_grow_size: u64,

    /// Auto-flush every N successful appends; 0 disables.
    /// Env: QL_PERIODIC_FLUSH (default 0)
    pub periodic_flush: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            read_only: false,
            check_type: true,
            check_layout: true,
            check_size: true,
            check_monotonic: true,
            large_data: false,
            gap_data: String::new(),
            initial_size: 1024,
            max_grow_size: 1024 * 1024,
            max_map_size: u64::MAX,
            initial_data_size: 64 * 1024,
            max_data_grow_size: 16 * 1024 * 1024,
            periodic_flush: 0,
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => {
            let s = v.trim().to_ascii_lowercase();
            if default {
                !(s == "0" || s == "false" || s == "off" || s == "no")
            } else {
                s == "1" || s == "true" || s == "on" || s == "yes"
            }
        }
        Err(_) => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

impl LogConfig {
    /// Load configuration from environment variables (QL_*).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        cfg.check_monotonic = env_bool("QL_CHECK_MONOTONIC", cfg.check_monotonic);
        cfg.large_data = env_bool("QL_LARGE_DATA", cfg.large_data);

        if let Ok(v) = std::env::var("QL_GAP_DATA") {
            cfg.gap_data = v;
        }

        cfg.initial_size = env_u64("QL_INITIAL_SIZE", cfg.initial_size);
        cfg.max_grow_size = env_u64("QL_MAX_GROW_SIZE", cfg.max_grow_size);
        cfg.max_map_size = env_u64("QL_MAX_MAP_SIZE", cfg.max_map_size);
        cfg.initial_data_size = env_u64("QL_INITIAL_DATA_SIZE", cfg.initial_data_size);
        cfg.max_data_grow_size = env_u64("QL_MAX_DATA_GROW_SIZE", cfg.max_data_grow_size);
        cfg.periodic_flush = env_u64("QL_PERIODIC_FLUSH", cfg.periodic_flush as u64) as u32;

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_read_only(mut self, on: bool) -> Self {
        self.read_only = on;
        self
    }

    pub fn with_check_type(mut self, on: bool) -> Self {
        self.check_type = on;
        self
    }

    pub fn with_check_layout(mut self, on: bool) -> Self {
        self.check_layout = on;
        self
    }

    pub fn with_check_size(mut self, on: bool) -> Self {
        self.check_size = on;
        self
    }

    pub fn with_check_monotonic(mut self, on: bool) -> Self {
        self.check_monotonic = on;
        self
    }

    pub fn with_large_data(mut self, on: bool) -> Self {
        self.large_data = on;
        self
    }

    pub fn with_gap_data<S: Into<String>>(mut self, gap: S) -> Self {
        self.gap_data = gap.into();
        self
    }

    pub fn with_initial_size(mut self, records: u64) -> Self {
        self.initial_size = records;
        self
    }

    pub fn with_max_grow_size(mut self, records: u64) -> Self {
        self.max_grow_size = records;
        self
    }

    pub fn with_max_map_size(mut self, bytes: u64) -> Self {
        self.max_map_size = bytes;
        self
    }

    pub fn with_initial_data_size(mut self, bytes: u64) -> Self {
        self.initial_data_size = bytes;
        self
    }

    pub fn with_max_data_grow_size(mut self, bytes: u64) -> Self {
        self.max_data_grow_size = bytes;
        self
    }

    pub fn with_periodic_flush(mut self, every: u32) -> Self {
        self.periodic_flush = every;
        self
    }
}

impl fmt::Display for LogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogConfig {{ \
             read_only: {}, \
             check_type: {}, check_layout: {}, check_size: {}, \
             check_monotonic: {}, \
             large_data: {}, \
             gap_data: {:?}, \
             initial_size: {}, max_grow_size: {}, max_map_size: {}, \
             initial_data_size: {}, max_data_grow_size: {}, \
             periodic_flush: {} \
             }}",
            self.read_only,
            self.check_type,
            self.check_layout,
            self.check_size,
            self.check_monotonic,
            self.large_data,
            self.gap_data,
            self.initial_size,
            self.max_grow_size,
            self.max_map_size,
            self.initial_data_size,
            self.max_data_grow_size,
            self.periodic_flush,
        )
    }
}
