use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_append;
mod cmd_create;
mod cmd_dump;
mod cmd_find;
mod cmd_info;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug qlog info --path ./telemetry.qlog
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Create {
            path,
            data_type,
            data_layout,
            record_size,
            large_data,
            gap_data,
        } => cmd_create::exec(path, data_type, data_layout, record_size, large_data, gap_data),

        cli::Cmd::Append {
            path,
            timestamp,
            hex,
            string,
            double,
        } => cmd_append::exec(path, timestamp, hex, string, double),

        cli::Cmd::Info { path, json } => cmd_info::exec(path, json),

        cli::Cmd::Dump {
            path,
            start,
            count,
            json,
        } => cmd_dump::exec(path, start, count, json),

        cli::Cmd::Find { path, timestamp } => cmd_find::exec(path, timestamp),
    }
}
