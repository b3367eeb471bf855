//! Typed values

use std::fmt;

/// The three value types of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Float,
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::String => write!(f, "string"),
        }
    }
}

/// A value of one of the language's types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// The value a freshly declared variable of type `ty` holds
    pub fn zero(ty: ValueType) -> Self {
        match ty {
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::String => Value::String(String::new()),
        }
    }

    pub fn ty(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            // Debug keeps the decimal point on whole numbers
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

/// Parse a numeric constant as written in a script
///
/// All-digit text is an `int`, digits with a single `.` are a `float`.
/// Anything else (including an `int` that overflows) is not a number.
pub fn parse_number(text: &str) -> Option<Value> {
    let mut digits = 0;
    let mut dots = 0;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return None,
        }
    }

    match (digits, dots) {
        (0, _) => None,
        (_, 0) => text.parse().ok().map(Value::Int),
        (_, 1) => text.parse().ok().map(Value::Float),
        _ => None,
    }
}
