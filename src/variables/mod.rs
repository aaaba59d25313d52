//! Variable storage system
//!
//! Runtime values, the coercion rules between numbers and strings, and the scalar and
//! array variables of a single run.

use crate::error::{BasicError, Result};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Largest array DIM will allocate
pub const MAX_ARRAY_SLOTS: usize = 1 << 20;

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// IEEE 754 double precision number
    Number(f64),
    /// Character string
    Str(String),
}

impl Value {
    /// Numeric view of the value; strings that do not read as a number give NaN
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Str(s) => parse_numeric_text(s),
        }
    }

    /// Zero, NaN and the empty string read back as numeric zero
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Number(n) => *n == 0.0 || n.is_nan(),
            Value::Str(s) => s.is_empty(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

/// `+` adds two numbers and concatenates as soon as either side is a string
impl Add for Value {
    type Output = Value;

    fn add(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (lhs, rhs) => Value::Str(format!("{}{}", lhs, rhs)),
        }
    }
}

impl Sub for Value {
    type Output = Value;

    fn sub(self, rhs: Value) -> Value {
        Value::Number(self.to_number() - rhs.to_number())
    }
}

impl Mul for Value {
    type Output = Value;

    fn mul(self, rhs: Value) -> Value {
        Value::Number(self.to_number() * rhs.to_number())
    }
}

impl Div for Value {
    type Output = Value;

    fn div(self, rhs: Value) -> Value {
        Value::Number(self.to_number() / rhs.to_number())
    }
}

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value::Number(-self.to_number())
    }
}

/// Render a number the way the output screen shows it
///
/// Integral values have no fraction, other values use the shortest text that reads back
/// as the same double. Magnitudes of `1e21` and above, or below `1e-6`, switch to
/// exponent form (`1e+21`, `1.5e-7`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let text = format!("{:e}", value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        };
    }
    value.to_string()
}

/// Numeric reading of string text: blank is 0, unreadable is NaN
fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) =>
        {
            trimmed.parse().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// Variable storage for one run
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    scalars: HashMap<String, Value>,
    // Keyed by name + "()" so arrays never collide with scalars
    arrays: HashMap<String, Vec<Value>>,
}

impl VariableStore {
    /// Create a new variable store
    pub fn new() -> Self {
        Self {
            scalars: HashMap::new(),
            arrays: HashMap::new(),
        }
    }

    /// Read a scalar; unset or falsy values read as 0
    pub fn read(&self, name: &str) -> Value {
        self.scalars
            .get(name)
            .filter(|value| !value.is_falsy())
            .cloned()
            .unwrap_or_default()
    }

    /// Set a scalar
    pub fn write(&mut self, name: &str, value: Value) {
        self.scalars.insert(name.to_string(), value);
    }

    /// Dimension an array with `size + 1` zeroed slots, replacing any earlier one
    pub fn declare_array(&mut self, name: &str, size: f64) -> Result<()> {
        if !size.is_finite() || size < 0.0 || size.fract() != 0.0 || size >= MAX_ARRAY_SLOTS as f64
        {
            return Err(BasicError::InvalidArraySize(format_number(size)));
        }

        let slots = size as usize + 1;
        self.arrays.insert(array_key(name), vec![Value::default(); slots]);
        Ok(())
    }

    /// Read an array slot; slots outside the array or holding falsy values read as 0
    pub fn read_array(&self, name: &str, index: f64) -> Result<Value> {
        let values = self
            .arrays
            .get(&array_key(name))
            .ok_or_else(|| BasicError::ArrayNotDimensioned(name.to_string()))?;

        Ok(slot_index(index)
            .and_then(|i| values.get(i))
            .filter(|value| !value.is_falsy())
            .cloned()
            .unwrap_or_default())
    }

    /// Set an array slot
    pub fn write_array(&mut self, name: &str, index: f64, value: Value) -> Result<()> {
        let values = self
            .arrays
            .get_mut(&array_key(name))
            .ok_or_else(|| BasicError::ArrayNotDimensioned(name.to_string()))?;

        let slot = slot_index(index)
            .and_then(|i| values.get_mut(i))
            .ok_or_else(|| BasicError::SubscriptOutOfRange {
                name: name.to_string(),
                index,
            })?;
        *slot = value;
        Ok(())
    }

    /// Declared length of an array, including slot 0
    pub fn array_len(&self, name: &str) -> Option<usize> {
        self.arrays.get(&array_key(name)).map(Vec::len)
    }
}

fn array_key(name: &str) -> String {
    format!("{}()", name)
}

fn slot_index(index: f64) -> Option<usize> {
    if index.is_finite() && index >= 0.0 && index.fract() == 0.0 {
        Some(index as usize)
    } else {
        None
    }
}
