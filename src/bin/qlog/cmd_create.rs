use anyhow::Result;
use std::path::PathBuf;

use QuiverLog::slab::Disposition;
use QuiverLog::{LogConfig, RawLog};

pub fn exec(
    path: PathBuf,
    data_type: String,
    data_layout: String,
    record_size: u32,
    large_data: bool,
    gap_data: String,
) -> Result<()> {
    let cfg = LogConfig::from_env()
        .with_large_data(large_data)
        .with_gap_data(gap_data);
    let mut log = RawLog::open(
        &path,
        &data_type,
        &data_layout,
        record_size,
        Disposition::CreateNew,
        &cfg,
    )?;
    log.flush()?;
    log.close()?;
    println!(
        "created {} (dataType {:?}, recordSize {}, {})",
        path.display(),
        data_type,
        if record_size != 0 {
            record_size
        } else if large_data {
            24
        } else {
            16
        },
        if record_size != 0 { "fixed" } else { "variable" },
    );
    Ok(())
}
