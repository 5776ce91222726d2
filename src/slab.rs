//! slab — FileSlab: растущий файл + его активное отображение.
//!
//! Политика:
//! - Окно отображения всегда покрывает весь файл (map_offset = 0).
//!   max_map_size ограничивает рост; выход за него — ошибка.
//! - Рост (только RW): округлить pos+len вверх до кратного map_grow_size
//!   (никогда не уменьшать), удвоить map_grow_size с потолком max_grow_size,
//!   усечь файл до нового размера и переотобразить целиком.
//! - RO-слэб не растёт: запрос внутри файла, но вне текущего отображения,
//!   приводит к переотображению всего файла; запрос за концом — ошибка.
//! - Close: unmap; для RW с write_pos != 0 — truncate до write_pos (хвост
//!   предвыделения отбрасывается); дескриптор закрывается в любом случае.

use anyhow::{anyhow, Context, Result};
use log::warn;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::metrics::{record_close_truncation, record_remap};
use crate::mmap::MappedRegion;

/// Режим открытия файла (семантика CreateNew/CreateAlways/OpenAlways/OpenExisting).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Создать; ошибка, если файл существует.
    CreateNew,
    /// Создать или усечь существующий.
    CreateAlways,
    /// Открыть или создать.
    OpenAlways,
    /// Открыть; ошибка, если файла нет.
    OpenExisting,
}

#[derive(Debug)]
pub struct FileSlab {
    path: PathBuf,
    file: Option<File>,
    read_only: bool,
    /// Текущая позиция записи (байты от начала файла). Владелец — RawLog.
    pub write_pos: u64,
    file_size: u64,
    map_grow_size: u64,
    max_grow_size: u64,
    max_map_size: u64,
    // Всегда 0; поле оставлено под скользящее окно.
    map_offset: u64,
    region: Option<MappedRegion>,
}

impl FileSlab {
    /// Открыть/создать файл по disposition. Для read_only disposition влияет
    /// только на существование (создание/truncate требуют записи).
    pub fn open(path: &Path, disp: Disposition, read_only: bool) -> Result<Self> {
        let mut opts = OpenOptions::new();
        opts.read(true);
        if !read_only {
            opts.write(true);
            match disp {
                Disposition::CreateNew => {
                    opts.create_new(true);
                }
                Disposition::CreateAlways => {
                    opts.create(true).truncate(true);
                }
                Disposition::OpenAlways => {
                    opts.create(true);
                }
                Disposition::OpenExisting => {}
            }
        }
        let file = opts
            .open(path)
            .with_context(|| format!("open slab {}", path.display()))?;
        let file_size = file
            .metadata()
            .with_context(|| format!("stat slab {}", path.display()))?
            .len();

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            read_only,
            write_pos: 0,
            file_size,
            map_grow_size: 4096,
            max_grow_size: 4096,
            max_map_size: u64::MAX,
            map_offset: 0,
            region: None,
        })
    }

    /// Политика роста (байты). Вызывается один раз при открытии лога.
    pub fn set_growth(&mut self, initial: u64, max_grow: u64, max_map: u64) {
        self.map_grow_size = initial.max(1);
        self.max_grow_size = max_grow.max(self.map_grow_size);
        self.max_map_size = max_map;
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub(crate) fn file_mut(&mut self) -> Option<&mut File> {
        self.file.as_mut()
    }

    #[inline]
    pub fn has_mapping(&self) -> bool {
        self.region.is_some()
    }

    /// Локальное смещение [pos, pos+len) внутри текущего отображения.
    /// Для RW при необходимости растит файл и переотображает.
    pub fn mapped_offset(&mut self, pos: u64, len: usize) -> Result<usize> {
        let end = pos
            .checked_add(len as u64)
            .ok_or_else(|| anyhow!("slab {}: offset overflow", self.path.display()))?;

        // Быстрый путь: уже в отображённом окне.
        if let Some(region) = &self.region {
            if pos >= self.map_offset && end - self.map_offset <= region.len() as u64 {
                return Ok((pos - self.map_offset) as usize);
            }
        }

        if self.file.is_none() {
            return Err(anyhow!("slab {}: closed", self.path.display()));
        }

        if !self.read_only {
            // Округлить вверх до кратного map_grow_size; файл не уменьшаем.
            let grow = self.map_grow_size.max(1);
            let mut size = end
                .checked_add(grow - 1)
                .ok_or_else(|| anyhow!("slab {}: size overflow", self.path.display()))?
                / grow
                * grow;
            if size < self.file_size {
                size = self.file_size;
            }
            // Потолок проверяется до каких-либо изменений состояния:
            // отклонённый запрос не должен травить file_size для последующих.
            if size > self.max_map_size {
                return Err(anyhow!(
                    "slab {}: mapping {} bytes exceeds max_map_size {}",
                    self.path.display(),
                    size,
                    self.max_map_size
                ));
            }
            self.file_size = size;

            // Экспоненциальный рост кванта с потолком max_grow_size.
            if self.map_grow_size < self.max_grow_size {
                self.map_grow_size = self.map_grow_size.saturating_mul(2).min(self.max_grow_size);
            }
        } else {
            if end > self.file_size {
                return Err(anyhow!(
                    "slab {}: read past end of read-only file (pos {} len {} size {})",
                    self.path.display(),
                    pos,
                    len,
                    self.file_size
                ));
            }
            if self.file_size > self.max_map_size {
                return Err(anyhow!(
                    "slab {}: mapping {} bytes exceeds max_map_size {}",
                    self.path.display(),
                    self.file_size,
                    self.max_map_size
                ));
            }
        }

        self.remap()?;
        Ok((pos - self.map_offset) as usize)
    }

    // Пересоздать отображение поверх всего файла размером file_size.
    // Unmap до set_len: усечение файла под живым отображением непереносимо.
    fn remap(&mut self) -> Result<()> {
        if let Some(region) = &mut self.region {
            region.unmap();
        }
        self.region = None;

        let file = self
            .file
            .as_ref()
            .ok_or_else(|| anyhow!("slab {}: closed", self.path.display()))?;
        if !self.read_only {
            file.set_len(self.file_size)
                .with_context(|| format!("grow slab {} to {}", self.path.display(), self.file_size))?;
        }
        let region = MappedRegion::new(file, self.file_size as usize, self.read_only)?;
        record_remap();
        self.region = Some(region);
        Ok(())
    }

    /// Ограниченное чтение из отображения; пустой срез при любой ошибке.
    pub fn read(&mut self, pos: u64, len: usize) -> &[u8] {
        match self.mapped_offset(pos, len) {
            Ok(off) => match &self.region {
                Some(region) => &region.bytes()[off..off + len],
                None => &[],
            },
            Err(_) => &[],
        }
    }

    /// Записать байты через отображение, при необходимости растя файл.
    pub fn write(&mut self, pos: u64, data: &[u8]) -> Result<()> {
        let off = self.mapped_offset(pos, data.len())?;
        let region = self
            .region
            .as_mut()
            .ok_or_else(|| anyhow!("slab {}: no mapping", self.path.display()))?;
        let buf = region.bytes_mut()?;
        buf[off..off + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Изменяемый срез [pos, pos+len) отображения (растит при необходимости).
    pub fn slice_mut(&mut self, pos: u64, len: usize) -> Result<&mut [u8]> {
        let off = self.mapped_offset(pos, len)?;
        let region = self
            .region
            .as_mut()
            .ok_or_else(|| anyhow!("slab {}: no mapping", self.path.display()))?;
        let buf = region.bytes_mut()?;
        Ok(&mut buf[off..off + len])
    }

    /// Асинхронный сброс грязных страниц отображения (no-op для RO).
    pub fn flush(&self) -> Result<()> {
        if let Some(region) = &self.region {
            region.flush()?;
        }
        Ok(())
    }

    /// Unmap; для RW с write_pos != 0 — truncate до write_pos; закрыть fd.
    /// Ошибка усечения логируется и возвращается, но fd освобождается всегда.
    pub fn close(&mut self) -> Result<()> {
        if let Some(region) = &mut self.region {
            region.unmap();
        }
        self.region = None;

        let mut result = Ok(());
        if let Some(file) = self.file.take() {
            if !self.read_only && self.write_pos != 0 {
                match file.set_len(self.write_pos) {
                    Ok(()) => {
                        self.file_size = self.write_pos;
                        record_close_truncation();
                    }
                    Err(e) => {
                        warn!(
                            "slab {}: truncate to {} on close failed: {}",
                            self.path.display(),
                            self.write_pos,
                            e
                        );
                        result = Err(anyhow!(
                            "truncate {} to {} on close: {}",
                            self.path.display(),
                            self.write_pos,
                            e
                        ));
                    }
                }
            }
            // file закрывается здесь при выходе из области видимости
        }
        result
    }
}

impl Drop for FileSlab {
    fn drop(&mut self) {
        // Ошибки в Drop игнорируем (close() для явной обработки).
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(prefix: &str) -> PathBuf {
        let pid = std::process::id();
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("qlog-slab-{}-{}-{}", prefix, pid, t))
    }

    #[test]
    fn write_read_roundtrip_with_growth() -> Result<()> {
        let path = unique_path("grow");
        let mut slab = FileSlab::open(&path, Disposition::CreateNew, false)?;
        slab.set_growth(64, 256, u64::MAX);

        slab.write(0, b"abcd")?;
        // Запись далеко за первым квантом вызывает рост и переотображение.
        slab.write(1000, b"wxyz")?;
        assert!(slab.file_size() >= 1004);
        assert_eq!(slab.read(0, 4), b"abcd");
        assert_eq!(slab.read(1000, 4), b"wxyz");

        // Размер файла кратен кванту роста и не уменьшается.
        slab.write(10, b"!")?;
        assert!(slab.file_size() >= 1004);
        Ok(())
    }

    #[test]
    fn close_truncates_to_write_pos() -> Result<()> {
        let path = unique_path("trunc");
        let mut slab = FileSlab::open(&path, Disposition::CreateNew, false)?;
        slab.set_growth(4096, 4096, u64::MAX);
        slab.write(0, b"0123456789")?;
        slab.write_pos = 10;
        assert!(slab.file_size() >= 4096);
        slab.close()?;
        assert_eq!(std::fs::metadata(&path)?.len(), 10);
        Ok(())
    }

    #[test]
    fn read_only_does_not_grow() -> Result<()> {
        let path = unique_path("ro");
        {
            let mut slab = FileSlab::open(&path, Disposition::CreateNew, false)?;
            slab.set_growth(16, 16, u64::MAX);
            slab.write(0, b"0123456789abcdef")?;
            slab.write_pos = 16;
            slab.close()?;
        }
        let mut slab = FileSlab::open(&path, Disposition::OpenExisting, true)?;
        assert_eq!(slab.read(0, 4), b"0123");
        assert_eq!(slab.read(12, 4), b"cdef");
        // За концом файла: пустой срез, не паника и не рост.
        assert!(slab.read(12, 8).is_empty());
        assert!(slab.write(0, b"x").is_err());
        assert_eq!(std::fs::metadata(&path)?.len(), 16);
        Ok(())
    }

    #[test]
    fn max_map_size_is_enforced() -> Result<()> {
        let path = unique_path("cap");
        let mut slab = FileSlab::open(&path, Disposition::CreateNew, false)?;
        slab.set_growth(64, 64, 128);
        slab.write(0, b"ok")?;
        let err = slab.write(1024, b"too far");
        assert!(err.is_err());

        // Отказ не травит состояние: размер не изменился, и запрос в
        // пределах потолка после отказа по-прежнему проходит.
        assert_eq!(slab.file_size(), 64);
        slab.write(64, b"ok2")?;
        assert_eq!(slab.file_size(), 128);
        assert_eq!(slab.read(64, 3), b"ok2");
        assert_eq!(slab.read(0, 2), b"ok");
        Ok(())
    }

    #[test]
    fn create_new_fails_on_existing() -> Result<()> {
        let path = unique_path("exists");
        std::fs::write(&path, b"x")?;
        assert!(FileSlab::open(&path, Disposition::CreateNew, false).is_err());
        assert!(FileSlab::open(&path, Disposition::OpenExisting, false).is_ok());
        Ok(())
    }
}
