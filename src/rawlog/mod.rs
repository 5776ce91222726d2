//! rawlog — append-only лог с монотонными метками времени.
//!
//! Формат хранения:
//!
//! **Time-файл** (имя = то, что передал пользователь):
//! - 4096-байтный заголовок: JSON + '\n' + нулевой паддинг (см. header.rs);
//! - 0+ записей фиксированной ширины recordSize.
//!
//! Запись (LE):
//! - [timestamp u64] — эпоха/разрешение на усмотрение пользователя
//!   (обычно микросекунды); для поиска метки должны строго расти;
//! - fixedSize=true: остаток записи — payload;
//! - fixedSize=false: (offset, length) в data-файл; ширина указателей
//!   определяется recordSize (16 — u32, 24 — u64).
//!
//! **Data-файл** (<имя>.data, только fixedSize=false): подряд идущие
//! payload'ы, каждый опционально завершён gapData. Без заголовка.
//!
//! Разнесение:
//! - header.rs — JSON-заголовок (parse/encode/паддинг);
//! - open.rs   — протокол открытия (disposition, check*, прайминг, lock);
//! - append.rs — append_raw + split append_start/append_finish;
//! - read.rs   — read_raw и lower-bound поиск по времени.

pub mod header;

mod append;
mod open;
mod read;

pub use header::LogHeader;
pub use open::data_file_path;

use anyhow::Result;

use crate::consts::HEADER_SIZE;
use crate::lock::LockGuard;
use crate::metrics::record_flush;
use crate::slab::FileSlab;

/// Низкоуровневый движок лога: два слэба, поля заголовка, позиция writer'а.
///
/// Модель владения — один логический writer; все операции синхронные.
/// Возвращаемые из read_raw срезы живут до следующего переотображения
/// (т.е. до следующей операции, способной растить файл).
#[derive(Debug)]
pub struct RawLog {
    pub(crate) time: FileSlab,
    pub(crate) data: Option<FileSlab>,

    pub(crate) data_type: String,
    pub(crate) data_layout: String,
    pub(crate) record_size: u32,
    pub(crate) fixed_size: bool,
    pub(crate) gap_data: String,

    pub(crate) last_timestamp: u64,
    pub(crate) check_monotonic: bool,
    pub(crate) periodic_flush: u32,
    pub(crate) periodic_flush_count: u32,

    pub(crate) closed: bool,
    // Эксклюзивный writer-lock (None для read-only). Держим до close/Drop.
    pub(crate) _lock: Option<LockGuard>,
}

impl RawLog {
    /// Количество записей: (timeWritePos - 4096) / recordSize.
    #[inline]
    pub fn size(&self) -> usize {
        let hdr = HEADER_SIZE as u64;
        if self.time.write_pos <= hdr || self.record_size == 0 {
            return 0;
        }
        ((self.time.write_pos - hdr) / self.record_size as u64) as usize
    }

    #[inline]
    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    #[inline]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    #[inline]
    pub fn data_layout(&self) -> &str {
        &self.data_layout
    }

    #[inline]
    pub fn record_size(&self) -> u32 {
        self.record_size
    }

    #[inline]
    pub fn is_fixed_size(&self) -> bool {
        self.fixed_size
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.time.is_read_only()
    }

    /// Текущие значения заголовка (write-позиции — живые).
    pub fn header(&self) -> LogHeader {
        LogHeader {
            data_layout: self.data_layout.clone(),
            data_type: self.data_type.clone(),
            data_write_pos: self.data.as_ref().map(|d| d.write_pos).unwrap_or(0),
            fixed_size: self.fixed_size,
            gap_data: self.gap_data.clone(),
            record_size: self.record_size,
            time_write_pos: self.time.write_pos,
        }
    }

    // Переписать 4096-байтный регион заголовка. No-op для RO и до первого
    // отображения (оно ещё не существует на ранних ошибочных путях открытия).
    pub(crate) fn write_header(&mut self) -> Result<()> {
        if self.time.is_read_only() || !self.time.has_mapping() {
            return Ok(());
        }
        let buf = header::encode_header(&self.header())?;
        self.time.write(0, &buf)
    }

    /// Записать заголовок и сбросить грязные страницы обоих слэбов.
    /// Идемпотентно.
    pub fn flush(&mut self) -> Result<()> {
        self.write_header()?;
        self.time.flush()?;
        if let Some(data) = &self.data {
            data.flush()?;
        }
        record_flush();
        Ok(())
    }

    /// Записать заголовок, закрыть оба слэба (truncate до write-позиций),
    /// отпустить writer-lock. Повторный вызов — no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut result = self.write_header();

        if let Err(e) = self.time.close() {
            if result.is_ok() {
                result = Err(e);
            }
        }
        if let Some(data) = &mut self.data {
            if let Err(e) = data.close() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        self._lock = None;
        result
    }
}

impl Drop for RawLog {
    fn drop(&mut self) {
        // Заголовок и усечение — best-effort; ошибки здесь глотаем.
        let _ = self.close();
    }
}
