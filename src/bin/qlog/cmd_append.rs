use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::path::PathBuf;

use QuiverLog::{LogConfig, RawLog};

pub fn exec(
    path: PathBuf,
    timestamp: u64,
    hex: Option<String>,
    string: Option<String>,
    double: Option<f64>,
) -> Result<()> {
    let payload: Vec<u8> = if let Some(h) = hex {
        parse_hex(&h)?
    } else if let Some(s) = string {
        s.into_bytes()
    } else if let Some(d) = double {
        let mut buf = [0u8; 8];
        LittleEndian::write_f64(&mut buf, d);
        buf.to_vec()
    } else {
        return Err(anyhow!("append: one of --hex / --string / --double is required"));
    };

    let cfg = LogConfig::from_env();
    let mut log = RawLog::open_existing(&path, &cfg)?;
    log.append_raw(timestamp, &payload)?;
    log.close()?;
    println!("appended {} bytes at ts {}", payload.len(), timestamp);
    Ok(())
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err(anyhow!("hex payload must have even length"));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for i in (0..bytes.len()).step_by(2) {
        let hi = hex_val(bytes[i])?;
        let lo = hex_val(bytes[i + 1])?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn hex_val(b: u8) -> Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(anyhow!("bad hex digit {:?}", b as char)),
    }
}
