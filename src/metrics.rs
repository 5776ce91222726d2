//! Lightweight global metrics for QuiverLog.
//!
//! Потокобезопасные атомарные счётчики:
//! - Append path: записи и байты payload'а
//! - Flush: явные/периодические сбросы заголовка
//! - Slab: переотображения (рост) и усечения при close
//! - Monotonic: отклонённые append'ы

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Append -----
static APPENDS_TOTAL: AtomicU64 = AtomicU64::new(0);
static APPEND_BYTES: AtomicU64 = AtomicU64::new(0);
static MONOTONIC_REJECTIONS: AtomicU64 = AtomicU64::new(0);

// ----- Flush -----
static FLUSHES_TOTAL: AtomicU64 = AtomicU64::new(0);

// ----- Slab -----
static SLAB_REMAPS: AtomicU64 = AtomicU64::new(0);
static SLAB_CLOSE_TRUNCATIONS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub appends_total: u64,
    pub append_bytes: u64,
    pub monotonic_rejections: u64,
    pub flushes_total: u64,
    pub slab_remaps: u64,
    pub slab_close_truncations: u64,
}

/// Снимок всех счётчиков.
pub fn metrics_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        appends_total: APPENDS_TOTAL.load(Ordering::Relaxed),
        append_bytes: APPEND_BYTES.load(Ordering::Relaxed),
        monotonic_rejections: MONOTONIC_REJECTIONS.load(Ordering::Relaxed),
        flushes_total: FLUSHES_TOTAL.load(Ordering::Relaxed),
        slab_remaps: SLAB_REMAPS.load(Ordering::Relaxed),
        slab_close_truncations: SLAB_CLOSE_TRUNCATIONS.load(Ordering::Relaxed),
    }
}

#[inline]
pub(crate) fn record_append(payload_bytes: usize) {
    APPENDS_TOTAL.fetch_add(1, Ordering::Relaxed);
    APPEND_BYTES.fetch_add(payload_bytes as u64, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_monotonic_rejection() {
    MONOTONIC_REJECTIONS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_flush() {
    FLUSHES_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_remap() {
    SLAB_REMAPS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_close_truncation() {
    SLAB_CLOSE_TRUNCATIONS.fetch_add(1, Ordering::Relaxed);
}
