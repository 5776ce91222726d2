use anyhow::Result;
use byteorder::{ByteOrder, LittleEndian};
use std::path::PathBuf;

use QuiverLog::slab::Disposition;
use QuiverLog::{LogConfig, StringArrayLog};

#[test]
fn string_array_wire_layout() -> Result<()> {
    let path = unique_path("sa-wire");
    let cfg = LogConfig::default();

    let mut log = StringArrayLog::open(&path, Disposition::CreateNew, &cfg)?;
    log.append(42, &["hi", "", "x"])?;

    let (ts, rec) = log.raw_mut().read_raw(0);
    assert_eq!(ts, 42);

    // [count u32][три пары (offset, length)][hi\0][\0][x\0]
    assert_eq!(&rec[..4], &[0x03, 0x00, 0x00, 0x00]);
    let pairs: Vec<(u32, u32)> = (0..3)
        .map(|i| {
            let p = 4 + i * 8;
            (
                LittleEndian::read_u32(&rec[p..p + 4]),
                LittleEndian::read_u32(&rec[p + 4..p + 8]),
            )
        })
        .collect();
    assert_eq!(pairs, vec![(28, 2), (31, 0), (32, 1)]);
    assert_eq!(&rec[28..], b"hi\0\0x\0");
    assert_eq!(rec.len(), 4 + 24 + 6);
    Ok(())
}

#[test]
fn string_array_roundtrip_and_self_consistency() -> Result<()> {
    let path = unique_path("sa-rt");
    let cfg = LogConfig::default();

    let rows: Vec<Vec<&str>> = vec![
        vec!["hi", "", "x"],
        vec![],
        vec!["alpha", "beta", "gamma", "delta"],
        vec![""],
        vec!["многобайтовая строка", "ok"],
    ];

    let mut log = StringArrayLog::open(&path, Disposition::CreateNew, &cfg)?;
    for (i, row) in rows.iter().enumerate() {
        log.append((i + 1) as u64, row)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let (ts, got) = log.get(i);
        assert_eq!(ts, (i + 1) as u64);
        assert_eq!(got, row.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    // Самосогласованность: каждый (offset, length) внутри записи, и байт
    // сразу после каждого среза — 0x00.
    for i in 0..rows.len() {
        let (_, rec) = log.raw_mut().read_raw(i);
        let count = LittleEndian::read_u32(&rec[..4]) as usize;
        for j in 0..count {
            let p = 4 + j * 8;
            let off = LittleEndian::read_u32(&rec[p..p + 4]) as usize;
            let len = LittleEndian::read_u32(&rec[p + 4..p + 8]) as usize;
            assert!(off + len < rec.len(), "slice must fit incl. terminator");
            assert_eq!(rec[off + len], 0, "nul after element {} of record {}", j, i);
        }
    }
    Ok(())
}

#[test]
fn lazy_view_indexes_in_place() -> Result<()> {
    let path = unique_path("sa-view");
    let cfg = LogConfig::default();

    let mut log = StringArrayLog::open(&path, Disposition::CreateNew, &cfg)?;
    log.append(7, &["one", "two", "three"])?;

    let (ts, view) = log.view(0);
    assert_eq!(ts, 7);
    assert_eq!(view.len(), 3);
    assert_eq!(view.get(0), Some("one"));
    assert_eq!(view.get(1), Some("two"));
    assert_eq!(view.get(2), Some("three"));
    assert_eq!(view.get(3), None);

    // За пределами лога — пустой view
    let (ts, view) = log.view(1);
    assert_eq!(ts, 0);
    assert_eq!(view.len(), 0);
    assert!(view.is_empty());
    Ok(())
}

#[test]
fn survives_reopen() -> Result<()> {
    let path = unique_path("sa-reopen");
    let cfg = LogConfig::default();

    {
        let mut log = StringArrayLog::open(&path, Disposition::CreateNew, &cfg)?;
        log.append(1, &["a", "bb"])?;
        log.append(2, &["ccc"])?;
    }
    let mut log = StringArrayLog::open(&path, Disposition::OpenExisting, &cfg)?;
    assert_eq!(log.size(), 2);
    let (ts, got) = log.get(1);
    assert_eq!(ts, 2);
    assert_eq!(got, vec!["ccc".to_string()]);
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
