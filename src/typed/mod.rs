//! typed — типизированные кодеки поверх RawLog.
//!
//! Тонкие обёртки: владеют своим RawLog (модель одного владельца) и
//! форматируют payload на месте через append_start/append_finish — без
//! аллокаций на горячем пути записи. Все кодеки — LE.
//!
//! Разнесение:
//! - scalar.rs       — Double/Float/Int64/Boolean (фиксированные записи);
//! - array.rs        — BooleanArray/DoubleArray (+ ленивый проксирующий view);
//! - string_array.rs — String и StringArray (вариативные записи).

mod array;
mod scalar;
mod string_array;

pub use array::{BooleanArrayLog, DoubleArrayLog, DoubleArrayView};
pub use scalar::{BooleanLog, DoubleLog, FloatLog, Int64Log};
pub use string_array::{StringArrayLog, StringArrayView, StringLog};
