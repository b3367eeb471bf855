//! Value model of the scripting language
//!
//! Three value types exist: `int`, `float` and `string`. Symbols, native
//! function parameters and native return values all share [`Value`].

mod value;

pub use value::{Value, ValueType, parse_number};
