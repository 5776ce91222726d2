use anyhow::Result;
use std::path::PathBuf;

use QuiverLog::metrics::metrics_snapshot;
use QuiverLog::slab::Disposition;
use QuiverLog::{LogConfig, RawLog};

#[test]
fn counters_track_append_flush_and_remap() -> Result<()> {
    let path = unique_path("metrics");
    let cfg = LogConfig::default().with_initial_size(2).with_max_grow_size(8);

    let m0 = metrics_snapshot();
    {
        let mut log = RawLog::open(&path, "u64", "", 16, Disposition::CreateNew, &cfg)?;
        for i in 0..100u64 {
            log.append_raw(i + 1, &(i.to_le_bytes()))?;
        }
        assert!(log.append_raw(1, b"12345678").is_err());
        log.flush()?;
        log.close()?;
    }
    let m1 = metrics_snapshot();

    assert!(m1.appends_total >= m0.appends_total + 100);
    assert!(m1.append_bytes >= m0.append_bytes + 800);
    assert!(m1.monotonic_rejections >= m0.monotonic_rejections + 1);
    assert!(m1.flushes_total >= m0.flushes_total + 1);
    // стартовый квант в 2 записи гарантирует несколько переотображений
    assert!(m1.slab_remaps >= m0.slab_remaps + 2);
    assert!(m1.slab_close_truncations >= m0.slab_close_truncations + 1);
    Ok(())
}

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("qlog-{}-{}-{}", prefix, pid, t))
}
