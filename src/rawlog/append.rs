//! rawlog/append — путь записи.
//!
//! Две формы:
//! - append_raw(ts, bytes) — атомарная;
//! - append_start(ts, len) / append_finish(len) — разнесённая: start
//!   возвращает изменяемый срез назначения, кодеки форматируют на месте.
//!
//! Критическая секция между start и finish обеспечивается заимствованием:
//! возвращённый &mut [u8] держит лог занятым, любая другая операция до
//! его отпускания не скомпилируется. До finish запись невидима (write-позиции
//! не сдвинуты), поэтому неудача между вызовами не оставляет следа.

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{LARGE_POINTER_RECORD_SIZE, TIMESTAMP_SIZE};
use crate::metrics::{record_append, record_monotonic_rejection};

use super::RawLog;

impl RawLog {
    /// Дописать запись целиком. Ошибка не меняет состояние лога:
    /// lastTimestamp, выставленный в append_start, на неудачном финише
    /// откатывается.
    pub fn append_raw(&mut self, timestamp: u64, data: &[u8]) -> Result<()> {
        let prev_last = self.last_timestamp;
        let len = data.len();
        let out = self.append_start(timestamp, len)?;
        out.copy_from_slice(data);
        if let Err(e) = self.append_finish(len) {
            self.last_timestamp = prev_last;
            return Err(e);
        }
        Ok(())
    }

    /// Зарезервировать запись и вернуть срез назначения payload'а.
    ///
    /// Проверки (монотонность, read-only, вместимость) выполняются до любых
    /// побочных эффектов. Для вариативных записей срез указывает в data-файл,
    /// уже дорощенный под len байт; указатель (offset, length) к этому моменту
    /// записан в time-файл, но запись остаётся невидимой до append_finish.
    pub fn append_start(&mut self, timestamp: u64, len: usize) -> Result<&mut [u8]> {
        if self.check_monotonic && timestamp <= self.last_timestamp {
            record_monotonic_rejection();
            return Err(anyhow!(
                "monotonic: timestamp {} <= last {}",
                timestamp,
                self.last_timestamp
            ));
        }
        if self.time.is_read_only() {
            return Err(anyhow!("read-only: append rejected"));
        }

        let rs = self.record_size as usize;
        let pos = self.time.write_pos;

        if self.fixed_size {
            if len > rs - TIMESTAMP_SIZE {
                return Err(anyhow!(
                    "append: payload {} bytes exceeds fixed record capacity {}",
                    len,
                    rs - TIMESTAMP_SIZE
                ));
            }
            let mut ts = [0u8; TIMESTAMP_SIZE];
            LittleEndian::write_u64(&mut ts, timestamp);
            self.time.write(pos, &ts)?;
            self.last_timestamp = timestamp;
            return self.time.slice_mut(pos + TIMESTAMP_SIZE as u64, len);
        }

        // Вариативная запись: (offset, length) в data-файл.
        let data_pos = match &self.data {
            Some(d) => d.write_pos,
            None => return Err(anyhow!("append: variable-size log has no data slab")),
        };

        let mut rec = [0u8; LARGE_POINTER_RECORD_SIZE as usize];
        LittleEndian::write_u64(&mut rec[..8], timestamp);
        if self.record_size == LARGE_POINTER_RECORD_SIZE {
            LittleEndian::write_u64(&mut rec[8..16], data_pos);
            LittleEndian::write_u64(&mut rec[16..24], len as u64);
        } else {
            if data_pos > u32::MAX as u64 || len > u32::MAX as usize {
                return Err(anyhow!(
                    "append: data offset {} / length {} exceeds 32-bit pointer record",
                    data_pos,
                    len
                ));
            }
            LittleEndian::write_u32(&mut rec[8..12], data_pos as u32);
            LittleEndian::write_u32(&mut rec[12..16], len as u32);
        }
        self.time.write(pos, &rec[..rs])?;

        let data = self
            .data
            .as_mut()
            .ok_or_else(|| anyhow!("append: variable-size log has no data slab"))?;
        let out = data.slice_mut(data_pos, len)?;
        self.last_timestamp = timestamp;
        Ok(out)
    }

    /// Завершить начатую запись: дописать gapData, сдвинуть write-позиции,
    /// при необходимости выполнить периодический flush.
    ///
    /// gapData пишется до сдвига позиций: неудача (например, рост data-слэба
    /// упёрся в max_map_size) возвращает Err, не сдвинув ни data.write_pos,
    /// ни time.write_pos — запись остаётся невидимой.
    pub fn append_finish(&mut self, len: usize) -> Result<()> {
        if !self.fixed_size {
            let gap = self.gap_data.as_bytes();
            if let Some(data) = self.data.as_mut() {
                if !gap.is_empty() {
                    let pos = data.write_pos + len as u64;
                    data.write(pos, gap)?;
                }
                data.write_pos += (len + gap.len()) as u64;
            }
        }
        self.time.write_pos += self.record_size as u64;
        record_append(len);

        if self.periodic_flush != 0 {
            self.periodic_flush_count += 1;
            if self.periodic_flush_count >= self.periodic_flush {
                self.flush()?;
                self.periodic_flush_count = 0;
            }
        }
        Ok(())
    }
}
