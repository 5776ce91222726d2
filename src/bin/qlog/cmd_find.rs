use anyhow::Result;
use std::path::PathBuf;

use QuiverLog::{LogConfig, RawLog};

pub fn exec(path: PathBuf, timestamp: u64) -> Result<()> {
    let cfg = LogConfig::from_env().with_read_only(true);
    let mut log = RawLog::open_existing(&path, &cfg)?;
    let idx = log.find(timestamp);
    if idx < log.size() {
        let (ts, payload) = log.read_raw(idx);
        println!("{} (ts={}, len={})", idx, ts, payload.len());
    } else {
        println!("{} (past end, size={})", idx, log.size());
    }
    Ok(())
}
