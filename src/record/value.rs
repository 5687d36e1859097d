//! Typed column values

use std::cmp::Ordering;
use std::fmt;

use crate::catalog::{Column, ColumnType};
use crate::error::{HeapError, Result};

/// A decoded column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
    ForeignKey(i64),
}

impl Value {
    /// Parse `text` as a value of `column`'s type
    ///
    /// Numeric text is trimmed first. Overflowing integers, unparsable floats
    /// and floats that are out of range, infinite or NaN are rejected rather
    /// than silently coerced.
    pub fn parse(text: &str, column: &Column) -> Result<Self> {
        let malformed = |reason: String| HeapError::MalformedValue {
            column: column.name.clone(),
            value: text.to_string(),
            reason,
        };

        let value = match column.column_type {
            ColumnType::Int32 => Value::Int32(
                text.trim()
                    .parse::<i32>()
                    .map_err(|e| malformed(e.to_string()))?,
            ),
            ColumnType::Int64 => Value::Int64(
                text.trim()
                    .parse::<i64>()
                    .map_err(|e| malformed(e.to_string()))?,
            ),
            ColumnType::ForeignKey => Value::ForeignKey(
                text.trim()
                    .parse::<i64>()
                    .map_err(|e| malformed(e.to_string()))?,
            ),
            ColumnType::Float32 => {
                let v = text
                    .trim()
                    .parse::<f32>()
                    .map_err(|e| malformed(e.to_string()))?;
                if !v.is_finite() {
                    return Err(malformed("not a finite 32-bit float".to_string()));
                }
                Value::Float32(v)
            }
            ColumnType::Float64 => {
                let v = text
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| malformed(e.to_string()))?;
                if !v.is_finite() {
                    return Err(malformed("not a finite 64-bit float".to_string()));
                }
                Value::Float64(v)
            }
            ColumnType::Char => Value::Text(text.to_string()),
        };
        Ok(value)
    }

    /// Compare two values of compatible types
    ///
    /// Integers compare with integers, floats with floats (integers widen),
    /// text with text. Returns `None` for mixed or NaN comparisons.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => match (self.as_i64(), other.as_i64()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
            },
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) | Value::ForeignKey(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Text(_) => None,
            _ => self.as_i64().map(|v| v as f64),
        }
    }
}

/// Text form used for decoded rows
///
/// Floats print in Rust's shortest round-trip form, so `"1.50"` stored
/// comes back as `"1.5"` and `"30.0"` as `"30"`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) | Value::ForeignKey(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}
