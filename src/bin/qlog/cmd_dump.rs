use anyhow::Result;
use std::path::PathBuf;

use QuiverLog::{LogConfig, RawLog};

pub fn exec(path: PathBuf, start: usize, count: usize, json: bool) -> Result<()> {
    let cfg = LogConfig::from_env().with_read_only(true);
    let mut log = RawLog::open_existing(&path, &cfg)?;

    let size = log.size();
    let end = start.saturating_add(count).min(size);
    for n in start..end {
        let (ts, payload) = log.read_raw(n);
        if json {
            let obj = serde_json::json!({
                "n": n,
                "ts": ts,
                "len": payload.len(),
                "hex": to_hex(payload),
                "utf8": String::from_utf8_lossy(payload),
            });
            println!("{}", serde_json::to_string(&obj)?);
        } else {
            println!(
                "{:8} ts={:<12} len={:<6} {}  {:?}",
                n,
                ts,
                payload.len(),
                to_hex(payload),
                String::from_utf8_lossy(payload)
            );
        }
    }
    if !json {
        println!("{} records total", size);
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}
