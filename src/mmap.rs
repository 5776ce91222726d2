//! mmap — MappedRegion: одно отображение файла (RO или RW shared).
//!
//! Детали:
//! - Конструктор дублирует файловый хэндл (try_clone) и держит его рядом с
//!   mapping'ом: на некоторых платформах закрытие всех хэндлов файла при живом
//!   mapping'е делает его содержимое недействительным. Требование корректности.
//! - flush() — асинхронный msync (flush_async); для RO — no-op.
//! - unmap() идемпотентен.

use anyhow::{anyhow, Result};
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::File;

#[derive(Debug)]
enum Map {
    Ro(Mmap),
    Rw(MmapMut),
}

#[derive(Debug)]
pub struct MappedRegion {
    map: Option<Map>,
    // Держим собственную ссылку на файл независимо от дескриптора вызывающего.
    _file: File,
}

impl MappedRegion {
    /// Отобразить [0, len) файла. len == 0 — ошибка (не бывает по построению).
    pub fn new(file: &File, len: usize, read_only: bool) -> Result<Self> {
        if len == 0 {
            return Err(anyhow!("mmap: cannot map empty range"));
        }
        let dup = file
            .try_clone()
            .map_err(|e| anyhow!("mmap: dup file handle: {}", e))?;
        let map = if read_only {
            let m = unsafe {
                MmapOptions::new()
                    .len(len)
                    .map(&dup)
                    .map_err(|e| anyhow!("mmap (ro, len={}): {}", len, e))?
            };
            Map::Ro(m)
        } else {
            let m = unsafe {
                MmapOptions::new()
                    .len(len)
                    .map_mut(&dup)
                    .map_err(|e| anyhow!("mmap (rw, len={}): {}", len, e))?
            };
            Map::Rw(m)
        };
        Ok(Self {
            map: Some(map),
            _file: dup,
        })
    }

    /// Длина отображения (0 после unmap()).
    #[inline]
    pub fn len(&self) -> usize {
        match &self.map {
            Some(Map::Ro(m)) => m.len(),
            Some(Map::Rw(m)) => m.len(),
            None => 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        match &self.map {
            Some(Map::Ro(m)) => &m[..],
            Some(Map::Rw(m)) => &m[..],
            None => &[],
        }
    }

    /// Mutable view; ошибка для read-only отображения.
    #[inline]
    pub fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        match &mut self.map {
            Some(Map::Rw(m)) => Ok(&mut m[..]),
            Some(Map::Ro(_)) => Err(anyhow!("mmap: region is read-only")),
            None => Err(anyhow!("mmap: region is unmapped")),
        }
    }

    /// Асинхронный сброс грязных страниц. No-op для RO/unmapped.
    pub fn flush(&self) -> Result<()> {
        if let Some(Map::Rw(m)) = &self.map {
            m.flush_async()
                .map_err(|e| anyhow!("mmap: flush_async: {}", e))?;
        }
        Ok(())
    }

    /// Снять отображение. Идемпотентно.
    pub fn unmap(&mut self) {
        self.map = None;
    }
}
