use anyhow::Result;
use byteorder::{ByteOrder, LittleEndian};
use std::path::PathBuf;

use QuiverLog::slab::Disposition;
use QuiverLog::{LogConfig, RawLog};

#[test]
fn smoke_fixed_double_log() -> Result<()> {
    let path = unique_path("smoke");
    let cfg = LogConfig::default();

    // 1) создать и дописать три записи double
    {
        let mut log = RawLog::open(
            &path,
            "double",
            "float64",
            16,
            Disposition::CreateNew,
            &cfg,
        )?;
        assert_eq!(log.size(), 0);
        assert!(log.is_fixed_size());
        assert_eq!(log.record_size(), 16);

        log.append_raw(100, &le_f64(1.0))?;
        log.append_raw(200, &le_f64(2.0))?;
        log.append_raw(300, &le_f64(4.0))?;
        assert_eq!(log.size(), 3);
        assert_eq!(log.last_timestamp(), 300);
        log.close()?;
    }

    // 2) переоткрыть и проверить содержимое
    {
        let mut log = RawLog::open(
            &path,
            "double",
            "float64",
            16,
            Disposition::OpenExisting,
            &cfg,
        )?;
        assert_eq!(log.size(), 3);
        assert_eq!(log.last_timestamp(), 300);
        assert_eq!(log.data_type(), "double");
        assert_eq!(log.data_layout(), "float64");

        let (ts, payload) = log.read_raw(1);
        assert_eq!(ts, 200);
        assert_eq!(payload, &le_f64(2.0));

        // 3) lower-bound поиск
        assert_eq!(log.find(250), 2);
        assert_eq!(log.find(50), 0);
        assert_eq!(log.find(400), 3);
        assert_eq!(log.find(200), 1);

        // 4) чтение за пределами — (0, пусто)
        let (ts, payload) = log.read_raw(3);
        assert_eq!(ts, 0);
        assert!(payload.is_empty());
    }

    Ok(())
}

fn le_f64(v: f64) -> [u8; 8] {
    let mut buf = [0u8; 8];
    LittleEndian::write_f64(&mut buf, v);
    buf
}

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("qlog-{}-{}-{}", prefix, pid, t))
}
