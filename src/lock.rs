//! File-based locking for single-writer safety.
//!
//! Cross-platform (fs2) advisory locks:
//! - Exclusive: один логический writer на лог; второй RW-open падает сразу.
//! - Read-only открытия замок НЕ берут: живые читатели при активном writer'е —
//!   поддерживаемый сценарий (видят состояние последнего flush заголовка).
//!
//! Lock file path: <filename>.lock
//! Lock is released on Drop.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::consts::LOCK_FILE_SUFFIX;

#[derive(Debug)]
pub struct LockGuard {
    file: std::fs::File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

/// <filename>.lock рядом с time-файлом.
pub fn lock_file_path(log_path: &Path) -> PathBuf {
    let mut s = log_path.as_os_str().to_os_string();
    s.push(LOCK_FILE_SUFFIX);
    PathBuf::from(s)
}

/// Неблокирующий эксклюзивный замок writer'а. Err, если writer уже есть.
pub fn try_acquire_writer_lock(log_path: &Path) -> Result<LockGuard> {
    let path = lock_file_path(log_path);
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("open lock file {}", path.display()))?;
    file.try_lock_exclusive()
        .with_context(|| format!("try_lock_exclusive {} (another writer?)", path.display()))?;
    Ok(LockGuard { file, path })
}
