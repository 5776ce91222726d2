//! typed/string_array — строковые кодеки (вариативные записи).
//!
//! StringLog: запись = сырые UTF-8 байты строки.
//!
//! StringArrayLog, формат записи (LE):
//!   [count u32]
//!   count * [offset u32][length u32]   -- offset от начала записи
//!   конкатенация строк, после каждой один 0x00
//! Нулевой байт входит в размер записи, но не учитывается в length.
//! Чтение — ленивый StringArrayView, индексирующий элементы по месту.

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;

use crate::config::LogConfig;
use crate::rawlog::RawLog;
use crate::slab::Disposition;

/// Одна UTF-8 строка на запись.
pub struct StringLog {
    raw: RawLog,
}

impl StringLog {
    pub const DATA_TYPE: &'static str = "string";
    pub const DATA_LAYOUT: &'static str = "utf-8";

    pub fn open(filename: &Path, disp: Disposition, config: &LogConfig) -> Result<Self> {
        let raw = RawLog::open(filename, Self::DATA_TYPE, Self::DATA_LAYOUT, 0, disp, config)?;
        Ok(Self { raw })
    }

    pub fn append(&mut self, timestamp: u64, value: &str) -> Result<()> {
        self.raw.append_raw(timestamp, value.as_bytes())
    }

    pub fn get(&mut self, n: usize) -> (u64, String) {
        let (ts, rec) = self.raw.read_raw(n);
        (ts, String::from_utf8_lossy(rec).into_owned())
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

/// Ленивый view массива строк поверх байтов записи.
pub struct StringArrayView<'a> {
    rec: &'a [u8],
}

impl<'a> StringArrayView<'a> {
    /// Заявленное количество элементов (0 для битой записи).
    pub fn len(&self) -> usize {
        if self.rec.len() < 4 {
            return 0;
        }
        let count = LittleEndian::read_u32(&self.rec[..4]) as usize;
        // Таблица (offset, length) обязана умещаться в запись.
        if 4 + count * 8 > self.rec.len() {
            return 0;
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Элемент i; None за пределами массива или при битых границах.
    pub fn get(&self, i: usize) -> Option<&'a str> {
        if i >= self.len() {
            return None;
        }
        let p = 4 + i * 8;
        let off = LittleEndian::read_u32(&self.rec[p..p + 4]) as usize;
        let len = LittleEndian::read_u32(&self.rec[p + 4..p + 8]) as usize;
        let end = off.checked_add(len)?;
        if end > self.rec.len() {
            return None;
        }
        std::str::from_utf8(&self.rec[off..end]).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&'a str>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

/// Массив строк на запись (вариативный размер внутри одной записи).
pub struct StringArrayLog {
    raw: RawLog,
}

impl StringArrayLog {
    pub const DATA_TYPE: &'static str = "string[]";
    pub const DATA_LAYOUT: &'static str = "u32 count; u32 off/len pairs; nul-terminated utf-8";

    pub fn open(filename: &Path, disp: Disposition, config: &LogConfig) -> Result<Self> {
        let raw = RawLog::open(filename, Self::DATA_TYPE, Self::DATA_LAYOUT, 0, disp, config)?;
        Ok(Self { raw })
    }

    pub fn append<S: AsRef<str>>(&mut self, timestamp: u64, values: &[S]) -> Result<()> {
        // Размер: count + таблица + строки с завершающими нулями.
        let mut total = 4usize + 8 * values.len();
        for v in values {
            total += v.as_ref().len() + 1;
        }
        if total > u32::MAX as usize {
            return Err(anyhow!(
                "string array record {} bytes exceeds u32 offsets",
                total
            ));
        }

        let out = self.raw.append_start(timestamp, total)?;
        LittleEndian::write_u32(&mut out[..4], values.len() as u32);

        let mut off = (4 + 8 * values.len()) as u32;
        let mut p = 4usize;
        for v in values {
            let s = v.as_ref();
            LittleEndian::write_u32(&mut out[p..p + 4], off);
            LittleEndian::write_u32(&mut out[p + 4..p + 8], s.len() as u32);
            off += s.len() as u32 + 1;
            p += 8;
        }
        for v in values {
            let s = v.as_ref().as_bytes();
            out[p..p + s.len()].copy_from_slice(s);
            p += s.len();
            out[p] = 0;
            p += 1;
        }

        self.raw.append_finish(total)
    }

    /// Ленивый доступ без копирования; view живёт до следующей операции.
    pub fn view(&mut self, n: usize) -> (u64, StringArrayView<'_>) {
        let (ts, rec) = self.raw.read_raw(n);
        (ts, StringArrayView { rec })
    }

    /// Скопировать все элементы записи (битые элементы — пустые строки).
    pub fn get(&mut self, n: usize) -> (u64, Vec<String>) {
        let (ts, view) = self.view(n);
        let mut out = Vec::with_capacity(view.len());
        for i in 0..view.len() {
            out.push(view.get(i).unwrap_or_default().to_string());
        }
        (ts, out)
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
