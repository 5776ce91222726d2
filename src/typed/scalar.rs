//! typed/scalar — скалярные кодеки фиксированного размера.
//!
//! Провод: LE bit pattern примитива сразу после timestamp'а.
//! recordSize = 8 + sizeof(T): double 16, float 12, int64 16, boolean 9.

use anyhow::Result;
use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;

use crate::config::LogConfig;
use crate::rawlog::RawLog;
use crate::slab::Disposition;

/// 8-байтный IEEE-754 double на запись.
pub struct DoubleLog {
    raw: RawLog,
}

impl DoubleLog {
    pub const DATA_TYPE: &'static str = "double";
    pub const DATA_LAYOUT: &'static str = "float64";

    pub fn open(filename: &Path, disp: Disposition, config: &LogConfig) -> Result<Self> {
        let raw = RawLog::open(filename, Self::DATA_TYPE, Self::DATA_LAYOUT, 16, disp, config)?;
        Ok(Self { raw })
    }

    pub fn append(&mut self, timestamp: u64, value: f64) -> Result<()> {
        let out = self.raw.append_start(timestamp, 8)?;
        LittleEndian::write_f64(out, value);
        self.raw.append_finish(8)
    }

    /// (timestamp, value); (0, 0.0) за пределами лога.
    pub fn get(&mut self, n: usize) -> (u64, f64) {
        let (ts, rec) = self.raw.read_raw(n);
        if rec.len() < 8 {
            return (0, 0.0);
        }
        (ts, LittleEndian::read_f64(&rec[..8]))
    }

    pub fn size(&self) -> usize {
        self.raw.size()
    }

    pub fn find(&mut self, timestamp: u64) -> usize {
        self.raw.find(timestamp)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.raw.flush()
    }

    pub fn raw(&self) -> &RawLog {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut RawLog {
        &mut self.raw
    }

    pub fn into_raw(self) -> RawLog {
        self.raw
    }
}

/// 4-байтный IEEE-754 float на запись.
pub struct FloatLog {
    raw: RawLog,
}

impl FloatLog {
    pub const DATA_TYPE: &'static str = "float";
    pub const DATA_LAYOUT: &'static str = "float32";

    pub fn open(filename: &Path, disp: Disposition, config: &LogConfig) -> Result<Self> {
        let raw = RawLog::open(filename, Self::DATA_TYPE, Self::DATA_LAYOUT, 12, disp, config)?;
        Ok(Self { raw })
    }

    pub fn append(&mut self, timestamp: u64, value: f32) -> Result<()> {
        let out = self.raw.append_start(timestamp, 4)?;
        LittleEndian::write_f32(out, value);
        self.raw.append_finish(4)
    }

    pub fn get(&mut self, n: usize) -> (u64, f32) {
        let (ts, rec) = self.raw.read_raw(n);
        if rec.len() < 4 {
            return (0, 0.0);
        }
        (ts, LittleEndian::read_f32(&rec[..4]))
    }

    pub fn size(&self) -> usize {
        self.raw.size()
    }

    pub fn find(&mut self, timestamp: u64) -> usize {
        self.raw.find(timestamp)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.raw.flush()
    }

    pub fn raw_mut(&mut self) -> &mut RawLog {
        &mut self.raw
    }
}

/// Знаковое 64-битное целое на запись.
pub struct Int64Log {
    raw: RawLog,
}

impl Int64Log {
    pub const DATA_TYPE: &'static str = "int64";
    pub const DATA_LAYOUT: &'static str = "int64";

    pub fn open(filename: &Path, disp: Disposition, config: &LogConfig) -> Result<Self> {
        let raw = RawLog::open(filename, Self::DATA_TYPE, Self::DATA_LAYOUT, 16, disp, config)?;
        Ok(Self { raw })
    }

    pub fn append(&mut self, timestamp: u64, value: i64) -> Result<()> {
        let out = self.raw.append_start(timestamp, 8)?;
        LittleEndian::write_i64(out, value);
        self.raw.append_finish(8)
    }

    pub fn get(&mut self, n: usize) -> (u64, i64) {
        let (ts, rec) = self.raw.read_raw(n);
        if rec.len() < 8 {
            return (0, 0);
        }
        (ts, LittleEndian::read_i64(&rec[..8]))
    }

    pub fn size(&self) -> usize {
        self.raw.size()
    }

    pub fn find(&mut self, timestamp: u64) -> usize {
        self.raw.find(timestamp)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.raw.flush()
    }

    pub fn raw_mut(&mut self) -> &mut RawLog {
        &mut self.raw
    }
}

/// Один байт 0/1 на запись.
pub struct BooleanLog {
    raw: RawLog,
}

impl BooleanLog {
    pub const DATA_TYPE: &'static str = "boolean";
    pub const DATA_LAYOUT: &'static str = "u8 0/1";

    pub fn open(filename: &Path, disp: Disposition, config: &LogConfig) -> Result<Self> {
        let raw = RawLog::open(filename, Self::DATA_TYPE, Self::DATA_LAYOUT, 9, disp, config)?;
        Ok(Self { raw })
    }

    pub fn append(&mut self, timestamp: u64, value: bool) -> Result<()> {
        let out = self.raw.append_start(timestamp, 1)?;
        out[0] = value as u8;
        self.raw.append_finish(1)
    }

    pub fn get(&mut self, n: usize) -> (u64, bool) {
        let (ts, rec) = self.raw.read_raw(n);
        if rec.is_empty() {
            return (0, false);
        }
        (ts, rec[0] != 0)
    }

    pub fn size(&self) -> usize {
        self.raw.size()
    }

    pub fn find(&mut self, timestamp: u64) -> usize {
        self.raw.find(timestamp)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.raw.flush()
    }

    pub fn raw_mut(&mut self) -> &mut RawLog {
        &mut self.raw
    }
}
