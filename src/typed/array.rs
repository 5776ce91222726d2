//! typed/array — массивы фиксированных элементов в вариативных записях.
//!
//! BooleanArray: по байту 0/1 на элемент; вход/выход и как bool, и как i32.
//! DoubleArray: N*8 байт IEEE-754 LE; чтение — в Vec или ленивым view.

use anyhow::Result;
use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;

use crate::config::LogConfig;
use crate::rawlog::RawLog;
use crate::slab::Disposition;

/// Массив булевых значений на запись (вариативный размер).
pub struct BooleanArrayLog {
    raw: RawLog,
}

impl BooleanArrayLog {
    pub const DATA_TYPE: &'static str = "boolean[]";
    pub const DATA_LAYOUT: &'static str = "u8 0/1 per element";

    pub fn open(filename: &Path, disp: Disposition, config: &LogConfig) -> Result<Self> {
        let raw = RawLog::open(filename, Self::DATA_TYPE, Self::DATA_LAYOUT, 0, disp, config)?;
        Ok(Self { raw })
    }

    pub fn append_bools(&mut self, timestamp: u64, values: &[bool]) -> Result<()> {
        let out = self.raw.append_start(timestamp, values.len())?;
        for (dst, &v) in out.iter_mut().zip(values) {
            *dst = v as u8;
        }
        self.raw.append_finish(values.len())
    }

    /// Целочисленный вход: любой ненулевой элемент пишется как 1.
    pub fn append_ints(&mut self, timestamp: u64, values: &[i32]) -> Result<()> {
        let out = self.raw.append_start(timestamp, values.len())?;
        for (dst, &v) in out.iter_mut().zip(values) {
            *dst = (v != 0) as u8;
        }
        self.raw.append_finish(values.len())
    }

    pub fn get_bools(&mut self, n: usize) -> (u64, Vec<bool>) {
        let (ts, rec) = self.raw.read_raw(n);
        (ts, rec.iter().map(|&b| b != 0).collect())
    }

    pub fn get_ints(&mut self, n: usize) -> (u64, Vec<i32>) {
        let (ts, rec) = self.raw.read_raw(n);
        (ts, rec.iter().map(|&b| (b != 0) as i32).collect())
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

/// Ленивый view массива double поверх байтов записи.
pub struct DoubleArrayView<'a> {
    data: &'a [u8],
}

impl<'a> DoubleArrayView<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / 8
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Элемент i; None за пределами записи.
    #[inline]
    pub fn get(&self, i: usize) -> Option<f64> {
        if i >= self.len() {
            return None;
        }
        Some(LittleEndian::read_f64(&self.data[i * 8..i * 8 + 8]))
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| LittleEndian::read_f64(&self.data[i * 8..i * 8 + 8]))
    }
}

/// Массив double на запись (вариативный размер).
pub struct DoubleArrayLog {
    raw: RawLog,
}

impl DoubleArrayLog {
    pub const DATA_TYPE: &'static str = "double[]";
    pub const DATA_LAYOUT: &'static str = "float64 per element";

    pub fn open(filename: &Path, disp: Disposition, config: &LogConfig) -> Result<Self> {
        let raw = RawLog::open(filename, Self::DATA_TYPE, Self::DATA_LAYOUT, 0, disp, config)?;
        Ok(Self { raw })
    }

    pub fn append(&mut self, timestamp: u64, values: &[f64]) -> Result<()> {
        let len = values.len() * 8;
        let out = self.raw.append_start(timestamp, len)?;
        LittleEndian::write_f64_into(values, out);
        self.raw.append_finish(len)
    }

    pub fn get(&mut self, n: usize) -> (u64, Vec<f64>) {
        let (ts, rec) = self.raw.read_raw(n);
        let count = rec.len() / 8;
        let mut out = vec![0f64; count];
        LittleEndian::read_f64_into(&rec[..count * 8], &mut out);
        (ts, out)
    }

    /// Ленивый доступ без копирования; view живёт до следующей операции.
    pub fn view(&mut self, n: usize) -> (u64, DoubleArrayView<'_>) {
        let (ts, rec) = self.raw.read_raw(n);
        (ts, DoubleArrayView { data: rec })
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
