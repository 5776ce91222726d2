use anyhow::Result;
use std::path::PathBuf;

use QuiverLog::rawlog::data_file_path;
use QuiverLog::slab::Disposition;
use QuiverLog::{LogConfig, RawLog};

#[test]
fn variable_small_pointer_records() -> Result<()> {
    let path = unique_path("var-small");
    let cfg = LogConfig::default();

    {
        let mut log = RawLog::open(&path, "bytes", "", 0, Disposition::CreateNew, &cfg)?;
        assert!(!log.is_fixed_size());
        assert_eq!(log.record_size(), 16); // 32-битные указатели по умолчанию

        log.append_raw(10, b"a")?;
        log.append_raw(20, b"bcd")?;
        log.append_raw(30, b"")?;
        assert_eq!(log.size(), 3);

        let (ts, p) = log.read_raw(0);
        assert_eq!((ts, p), (10, &b"a"[..]));
        let (ts, p) = log.read_raw(1);
        assert_eq!((ts, p), (20, &b"bcd"[..]));
        let (ts, p) = log.read_raw(2);
        assert_eq!(ts, 30);
        assert!(p.is_empty());
        log.close()?;
    }

    // После close: time-файл = 4096 + 3*16; data-файл — ровно склейка
    // payload'ов без gap.
    assert_eq!(std::fs::metadata(&path)?.len(), 4096 + 3 * 16);
    let data = std::fs::read(data_file_path(&path))?;
    assert_eq!(data, b"abcd");
    Ok(())
}

#[test]
fn variable_with_gap_data() -> Result<()> {
    let path = unique_path("var-gap");
    let cfg = LogConfig::default().with_gap_data("\n");

    {
        let mut log = RawLog::open(&path, "text", "", 0, Disposition::CreateNew, &cfg)?;
        log.append_raw(10, b"a")?;
        log.append_raw(20, b"bcd")?;
        log.append_raw(30, b"")?;

        // Позиция записи data-файла учитывает gap после каждого payload'а.
        assert_eq!(log.header().data_write_pos, 7);

        // gap не попадает в payload при чтении
        let (_, p) = log.read_raw(1);
        assert_eq!(p, b"bcd");
        log.close()?;
    }

    let data = std::fs::read(data_file_path(&path))?;
    assert_eq!(data, b"a\nbcd\n\n");
    Ok(())
}

#[test]
fn large_pointer_records() -> Result<()> {
    let path = unique_path("var-large");
    let cfg = LogConfig::default().with_large_data(true);

    {
        let mut log = RawLog::open(&path, "bytes", "", 0, Disposition::CreateNew, &cfg)?;
        assert_eq!(log.record_size(), 24);
        log.append_raw(1, b"hello")?;
        log.append_raw(2, b"world!")?;
        let (ts, p) = log.read_raw(1);
        assert_eq!((ts, p), (2, &b"world!"[..]));
        log.close()?;
    }

    assert_eq!(std::fs::metadata(&path)?.len(), 4096 + 2 * 24);
    let data = std::fs::read(data_file_path(&path))?;
    assert_eq!(data, b"helloworld!");
    Ok(())
}

#[test]
fn failed_gap_write_leaves_log_consistent() -> Result<()> {
    let path = unique_path("var-gap-fail");
    // Тесный потолок отображения: payload ещё помещается, а огромный gap
    // после него упирается в max_map_size на третьей записи.
    let cfg = LogConfig::default()
        .with_initial_size(4)
        .with_max_grow_size(4)
        .with_initial_data_size(64)
        .with_max_data_grow_size(64)
        .with_max_map_size(8192)
        .with_gap_data("G".repeat(4000));

    let mut log = RawLog::open(&path, "bytes", "", 0, Disposition::CreateNew, &cfg)?;
    log.append_raw(1, b"a")?;
    log.append_raw(2, b"b")?;
    let pos_before = log.header().data_write_pos;
    assert_eq!(pos_before, 2 * 4001);

    // gap третьей записи не влезает в потолок — отказ без следа
    assert!(log.append_raw(3, b"c").is_err());
    assert_eq!(log.size(), 2);
    assert_eq!(log.last_timestamp(), 2);
    assert_eq!(log.header().data_write_pos, pos_before);
    let (ts, p) = log.read_raw(1);
    assert_eq!((ts, p), (2, &b"b"[..]));

    // повторная попытка отказывает так же детерминированно, без дрейфа позиций
    assert!(log.append_raw(3, b"c").is_err());
    assert_eq!(log.size(), 2);
    assert_eq!(log.header().data_write_pos, pos_before);
    log.close()?;

    // close усекает файлы по несдвинутым позициям
    assert_eq!(std::fs::metadata(&path)?.len(), 4096 + 2 * 16);
    assert_eq!(std::fs::metadata(data_file_path(&path))?.len(), 2 * 4001);
    Ok(())
}

#[test]
fn split_append_formats_in_place() -> Result<()> {
    let path = unique_path("var-split");
    let cfg = LogConfig::default();

    let mut log = RawLog::open(&path, "bytes", "", 0, Disposition::CreateNew, &cfg)?;
    let out = log.append_start(5, 4)?;
    out.copy_from_slice(b"quiv");
    log.append_finish(4)?;

    assert_eq!(log.size(), 1);
    let (ts, p) = log.read_raw(0);
    assert_eq!((ts, p), (5, &b"quiv"[..]));
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
