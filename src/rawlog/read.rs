//! rawlog/read — индексированное чтение и поиск по времени.

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{HEADER_SIZE, LARGE_POINTER_RECORD_SIZE, TIMESTAMP_SIZE};

use super::RawLog;

impl RawLog {
    /// Прочитать запись n: (timestamp, payload).
    ///
    /// За пределами лога или при невозможности удовлетворить чтение из
    /// отображения — (0, пусто); это значение, а не ошибка. Срез живёт до
    /// следующей операции, способной переотобразить файл.
    pub fn read_raw(&mut self, n: usize) -> (u64, &[u8]) {
        let rs = self.record_size as usize;
        if n >= self.size() {
            return (0, &[]);
        }
        let pos = HEADER_SIZE as u64 + n as u64 * rs as u64;
        let rec = self.time.read(pos, rs);
        if rec.len() < rs {
            return (0, &[]);
        }
        let ts = LittleEndian::read_u64(&rec[..TIMESTAMP_SIZE]);
        if self.fixed_size {
            return (ts, &rec[TIMESTAMP_SIZE..]);
        }

        // Указательная запись: payload лежит в data-файле.
        let (off, len) = if self.record_size == LARGE_POINTER_RECORD_SIZE {
            (
                LittleEndian::read_u64(&rec[8..16]),
                LittleEndian::read_u64(&rec[16..24]) as usize,
            )
        } else {
            (
                LittleEndian::read_u32(&rec[8..12]) as u64,
                LittleEndian::read_u32(&rec[12..16]) as usize,
            )
        };
        match self.data.as_mut() {
            Some(data) => (ts, data.read(off, len)),
            None => (0, &[]),
        }
    }

    /// Индекс первой записи с timestamp >= искомого (lower bound); size(),
    /// если таких нет. Требует монотонных меток: с выключенным
    /// check_monotonic результат на несортированном логе не определён.
    pub fn find(&mut self, timestamp: u64) -> usize {
        let n = self.size();
        self.find_range(timestamp, 0, n)
    }

    /// Lower bound в диапазоне [first, last). O(log N) чтений записей.
    pub fn find_range(&mut self, timestamp: u64, first: usize, last: usize) -> usize {
        let mut first = first;
        let mut count = self.size().min(last).saturating_sub(first);
        while count > 0 {
            let step = count / 2;
            let it = first + step;
            if self.read_raw(it).0 < timestamp {
                first = it + 1;
                count -= step + 1;
            } else {
                count = step;
            }
        }
        first
    }
}
