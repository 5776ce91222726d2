//! rawlog/header — 4096-байтный JSON-заголовок time-файла.
//!
//! Формат региона [0, 4096):
//!   { "dataLayout":.., "dataType":.., "dataWritePos":.., "fixedSize":..,
//!     "gapData":.., "recordSize":.., "timeWritePos":.. }
//!   + ровно один '\n' сразу после JSON, далее нули до 4096.
//!
//! Регион никогда не читается как запись. Любая ошибка разбора (короткий
//! файл, не-JSON, не-объект в корне, отсутствующее/нетипизированное поле)
//! отображается в "wrong format:". JSON длиннее 4096 отклоняется при
//! сериализации (т.е. на Flush), до какой-либо записи на диск.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::consts::HEADER_SIZE;

/// Поля заголовка. Сериализация — pretty JSON, имена camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogHeader {
    pub data_layout: String,
    pub data_type: String,
    pub data_write_pos: u64,
    pub fixed_size: bool,
    pub gap_data: String,
    pub record_size: u32,
    pub time_write_pos: u64,
}

/// Разобрать заголовок из байтов региона (паддинг допускается).
pub fn decode_header(buf: &[u8]) -> Result<LogHeader> {
    if buf.len() < HEADER_SIZE {
        return Err(anyhow!(
            "wrong format: header region is {} bytes (need {})",
            buf.len(),
            HEADER_SIZE
        ));
    }
    // Срезать нулевой паддинг; serde_json терпит завершающие пробелы/'\n'.
    let mut end = HEADER_SIZE;
    while end > 0 && buf[end - 1] == 0 {
        end -= 1;
    }
    let h: LogHeader = serde_json::from_slice(&buf[..end])
        .map_err(|e| anyhow!("wrong format: header json: {}", e))?;
    if h.record_size < 8 {
        return Err(anyhow!(
            "wrong format: recordSize {} < 8",
            h.record_size
        ));
    }
    if h.time_write_pos < HEADER_SIZE as u64
        || (h.time_write_pos - HEADER_SIZE as u64) % h.record_size as u64 != 0
    {
        return Err(anyhow!(
            "wrong format: timeWritePos {} is not 4096 + k*recordSize",
            h.time_write_pos
        ));
    }
    Ok(h)
}

/// Прочитать заголовок напрямую через fd (отображение может ещё не
/// существовать на этапе открытия).
pub fn read_header(f: &mut File) -> Result<LogHeader> {
    let mut buf = vec![0u8; HEADER_SIZE];
    f.seek(SeekFrom::Start(0)).context("seek header")?;
    f.read_exact(&mut buf)
        .map_err(|e| anyhow!("wrong format: short header read: {}", e))?;
    decode_header(&buf)
}

/// Сериализовать заголовок: pretty JSON + '\n' + нули до ровно 4096 байт.
/// Ошибка, если JSON с newline не умещается в регион.
pub fn encode_header(h: &LogHeader) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec_pretty(h).context("serialize header")?;
    buf.push(b'\n');
    if buf.len() > HEADER_SIZE {
        return Err(anyhow!(
            "wrong format: header json is {} bytes, exceeds {} byte region",
            buf.len(),
            HEADER_SIZE
        ));
    }
    buf.resize(HEADER_SIZE, 0);
    Ok(buf)
}
