//! Общие константы формата (header, записи time-файла, суффиксы файлов).

// -------- Header --------
// Первые 4096 байт time-файла: JSON + '\n' + нулевой паддинг.
pub const HEADER_SIZE: usize = 4096;

// -------- Записи time-файла --------
// Layout (LE):
// [timestamp u64]
// затем либо payload (fixedSize), либо (offset, length) указатель в data-файл.
pub const TIMESTAMP_SIZE: usize = 8;

// recordSize для указательных записей: 8 + 2*4 (u32) или 8 + 2*8 (u64).
pub const SMALL_POINTER_RECORD_SIZE: u32 = (TIMESTAMP_SIZE + 4 * 2) as u32;
pub const LARGE_POINTER_RECORD_SIZE: u32 = (TIMESTAMP_SIZE + 8 * 2) as u32;

// -------- Файлы --------
// Data-файл: <filename>.data (только для fixedSize=false). Без заголовка.
pub const DATA_FILE_SUFFIX: &str = ".data";
// Writer-lock: <filename>.lock
pub const LOCK_FILE_SUFFIX: &str = ".lock";
