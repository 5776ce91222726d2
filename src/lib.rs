#![allow(non_snake_case)]

// Базовые модули
pub mod config;
pub mod consts;
pub mod lock;
pub mod metrics;

// Низкоуровневый слой: mapping + растущий файл
pub mod mmap;
pub mod slab;

// Ядро лога (папка с mod.rs)
pub mod rawlog; // src/rawlog/{mod,header,open,append,read}.rs

// Типизированные кодеки поверх RawLog
pub mod typed; // src/typed/{mod,scalar,array,string_array}.rs

// Удобные реэкспорты
pub use config::LogConfig;
pub use rawlog::{LogHeader, RawLog};
pub use slab::{Disposition, FileSlab};
pub use typed::{
    BooleanArrayLog, BooleanLog, DoubleArrayLog, DoubleLog, FloatLog, Int64Log, StringArrayLog,
    StringLog,
};
