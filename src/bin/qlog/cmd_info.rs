use anyhow::Result;
use std::path::PathBuf;

use QuiverLog::{LogConfig, RawLog};

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let cfg = LogConfig::from_env().with_read_only(true);
    let log = RawLog::open_existing(&path, &cfg)?;
    let hdr = log.header();

    if json {
        let obj = serde_json::json!({
            "path": path.display().to_string(),
            "dataType": hdr.data_type,
            "dataLayout": hdr.data_layout,
            "recordSize": hdr.record_size,
            "fixedSize": hdr.fixed_size,
            "gapData": hdr.gap_data,
            "timeWritePos": hdr.time_write_pos,
            "dataWritePos": hdr.data_write_pos,
            "size": log.size(),
            "lastTimestamp": log.last_timestamp(),
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
    } else {
        println!("path:          {}", path.display());
        println!("dataType:      {:?}", hdr.data_type);
        println!("dataLayout:    {:?}", hdr.data_layout);
        println!("recordSize:    {}", hdr.record_size);
        println!("fixedSize:     {}", hdr.fixed_size);
        println!("gapData:       {:?}", hdr.gap_data);
        println!("timeWritePos:  {}", hdr.time_write_pos);
        println!("dataWritePos:  {}", hdr.data_write_pos);
        println!("size:          {} records", log.size());
        println!("lastTimestamp: {}", log.last_timestamp());
    }
    Ok(())
}
