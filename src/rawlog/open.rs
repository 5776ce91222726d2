//! rawlog/open — протокол открытия лога.
//!
//! Шаги:
//! 1) RW: эксклюзивный writer-lock на <имя>.lock (try, без ожидания).
//! 2) Открыть time-файл по disposition.
//! 3) Повторное использование (OpenExisting, или OpenAlways по непустому
//!    файлу): разобрать JSON-заголовок и провалидировать по check*-флагам.
//!    Иначе проштамповать заголовок из запроса.
//! 4) Применить политику роста (time — в записях, data — в байтах).
//! 5) Прайминг отображения; восстановить lastTimestamp из последней записи,
//!    если есть хотя бы одна.
//! 6) Для вариативных записей открыть data-файл (<имя>.data) с тем же
//!    disposition и праймить его отображение.
//!
//! Ошибочные пути: уже открытые слэбы закрываются своим Drop; заголовок на
//! таких путях не пишется (write_header пропускается без отображения).

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use std::path::{Path, PathBuf};

use crate::config::LogConfig;
use crate::consts::{
    DATA_FILE_SUFFIX, HEADER_SIZE, LARGE_POINTER_RECORD_SIZE, SMALL_POINTER_RECORD_SIZE,
    TIMESTAMP_SIZE,
};
use crate::lock::try_acquire_writer_lock;
use crate::slab::{Disposition, FileSlab};

use super::{header, RawLog};

/// <имя>.data рядом с time-файлом.
pub fn data_file_path(log_path: &Path) -> PathBuf {
    let mut s = log_path.as_os_str().to_os_string();
    s.push(DATA_FILE_SUFFIX);
    PathBuf::from(s)
}

impl RawLog {
    /// Открыть/создать лог.
    ///
    /// `record_size == 0` означает вариативные записи (реальный recordSize
    /// выбирается из `config.large_data`: 16 или 24). При повторном открытии
    /// заголовок сверяется с запросом по check*-флагам конфигурации.
    pub fn open(
        filename: &Path,
        data_type: &str,
        data_layout: &str,
        record_size: u32,
        disp: Disposition,
        config: &LogConfig,
    ) -> Result<Self> {
        if record_size != 0 && record_size < TIMESTAMP_SIZE as u32 {
            return Err(anyhow!(
                "wrong format: requested recordSize {} < {}",
                record_size,
                TIMESTAMP_SIZE
            ));
        }

        // Один логический writer на лог (читатели замок не берут).
        let lock = if config.read_only {
            None
        } else {
            Some(try_acquire_writer_lock(filename)?)
        };

        let mut time = FileSlab::open(filename, disp, config.read_only)?;

        let reuse = disp == Disposition::OpenExisting
            || (disp == Disposition::OpenAlways && time.file_size() > 0);

        let (hdr, stamped) = if reuse {
            let f = time
                .file_mut()
                .ok_or_else(|| anyhow!("open {}: no file handle", filename.display()))?;
            let hdr = header::read_header(f)?;
            check(&hdr, data_type, data_layout, record_size, config)?;
            (hdr, false)
        } else {
            let fixed = record_size != 0;
            let rs = if fixed {
                record_size
            } else if config.large_data {
                LARGE_POINTER_RECORD_SIZE
            } else {
                SMALL_POINTER_RECORD_SIZE
            };
            let hdr = header::LogHeader {
                data_layout: data_layout.to_string(),
                data_type: data_type.to_string(),
                data_write_pos: 0,
                fixed_size: fixed,
                gap_data: config.gap_data.clone(),
                record_size: rs,
                time_write_pos: HEADER_SIZE as u64,
            };
            (hdr, true)
        };

        time.write_pos = hdr.time_write_pos;
        time.set_growth(
            config.initial_size.saturating_mul(hdr.record_size as u64),
            config.max_grow_size.saturating_mul(hdr.record_size as u64),
            config.max_map_size,
        );

        let mut log = RawLog {
            time,
            data: None,
            data_type: hdr.data_type,
            data_layout: hdr.data_layout,
            record_size: hdr.record_size,
            fixed_size: hdr.fixed_size,
            gap_data: hdr.gap_data,
            last_timestamp: 0,
            check_monotonic: config.check_monotonic,
            periodic_flush: config.periodic_flush,
            periodic_flush_count: 0,
            closed: false,
            _lock: lock,
        };

        // Прайминг + восстановление lastTimestamp из последней записи.
        let rs = log.record_size as u64;
        if log.time.write_pos >= HEADER_SIZE as u64 + rs {
            let last = log.time.write_pos - rs;
            if !log.time.is_read_only() {
                // Заодно резервируем место под следующую запись.
                log.time.mapped_offset(last, (rs * 2) as usize)?;
            }
            let rec = log.time.read(last, rs as usize);
            if rec.len() < TIMESTAMP_SIZE {
                return Err(anyhow!(
                    "wrong format: {} shorter than timeWritePos {}",
                    filename.display(),
                    log.time.write_pos
                ));
            }
            log.last_timestamp = LittleEndian::read_u64(&rec[..TIMESTAMP_SIZE]);
        } else if !log.time.is_read_only() {
            log.time.mapped_offset(log.time.write_pos, rs as usize)?;
        }

        // Data-файл — только для вариативных записей.
        if !log.fixed_size {
            let dpath = data_file_path(filename);
            let mut data = FileSlab::open(&dpath, disp, config.read_only)?;
            data.write_pos = hdr.data_write_pos;
            data.set_growth(
                config.initial_data_size,
                config.max_data_grow_size,
                config.max_map_size,
            );
            if !data.is_read_only() {
                data.mapped_offset(data.write_pos, 1024)?;
            } else if data.file_size() > 0 {
                data.mapped_offset(0, data.file_size() as usize)?;
            }
            log.data = Some(data);
        }

        debug!(
            "opened log {} ({}, recordSize {}, {} records, stamped {})",
            filename.display(),
            if log.fixed_size { "fixed" } else { "variable" },
            log.record_size,
            log.size(),
            stamped
        );
        Ok(log)
    }

    /// Открыть существующий лог, не зная его типа (все check* сняты).
    pub fn open_existing(filename: &Path, config: &LogConfig) -> Result<Self> {
        let cfg = config
            .clone()
            .with_check_type(false)
            .with_check_layout(false)
            .with_check_size(false);
        Self::open(filename, "", "", 0, Disposition::OpenExisting, &cfg)
    }
}

// Сверка заголовка с запросом по check*-флагам.
fn check(
    hdr: &header::LogHeader,
    data_type: &str,
    data_layout: &str,
    record_size: u32,
    config: &LogConfig,
) -> Result<()> {
    if config.check_type && hdr.data_type != data_type {
        return Err(anyhow!(
            "wrong format: dataType {:?} does not match requested {:?}",
            hdr.data_type,
            data_type
        ));
    }
    if config.check_layout && hdr.data_layout != data_layout {
        return Err(anyhow!(
            "wrong format: dataLayout {:?} does not match requested {:?}",
            hdr.data_layout,
            data_layout
        ));
    }
    if config.check_size {
        if record_size != 0 {
            if !hdr.fixed_size || hdr.record_size != record_size {
                return Err(anyhow!(
                    "wrong format: fixed recordSize {} requested, file has {} (fixedSize {})",
                    record_size,
                    hdr.record_size,
                    hdr.fixed_size
                ));
            }
        } else if hdr.fixed_size
            || (hdr.record_size != SMALL_POINTER_RECORD_SIZE
                && hdr.record_size != LARGE_POINTER_RECORD_SIZE)
        {
            return Err(anyhow!(
                "wrong format: variable records requested, file has recordSize {} (fixedSize {})",
                hdr.record_size,
                hdr.fixed_size
            ));
        }
    }
    Ok(())
}
