//! Record Codec
//!
//! Converts a textual row to its fixed-width binary body and back, column by
//! column, driven by the catalog.
//!
//! | type        | encoding                                          |
//! |-------------|---------------------------------------------------|
//! | Int32       | i32 LE                                            |
//! | Int64 / FK  | i64 LE                                            |
//! | Float32     | f32 LE (IEEE-754)                                 |
//! | Float64     | f64 LE (IEEE-754)                                 |
//! | Char(n)     | up to n bytes, zero padded, truncated if longer   |

use bytes::{Buf, BufMut, BytesMut};

use crate::catalog::{Catalog, Column, ColumnType};
use crate::error::{HeapError, Result};

use super::Value;

/// Encode `row` into `buf` as the catalog's fixed-width body
///
/// Fails with `SchemaMismatch` before writing anything when the field count
/// is wrong, and with `MalformedValue` on the first unconvertible field. On
/// error `buf` may hold a partial body; callers discard it.
pub fn encode_row<S: AsRef<str>>(row: &[S], catalog: &Catalog, buf: &mut BytesMut) -> Result<()> {
    if row.len() != catalog.len() {
        return Err(HeapError::SchemaMismatch {
            expected: catalog.len(),
            actual: row.len(),
        });
    }

    buf.reserve(catalog.total_width() as usize);
    for (field, column) in row.iter().zip(catalog.columns()) {
        encode_field(field.as_ref(), column, buf)?;
    }
    Ok(())
}

fn encode_field(text: &str, column: &Column, buf: &mut BytesMut) -> Result<()> {
    match Value::parse(text, column)? {
        Value::Int32(v) => buf.put_i32_le(v),
        Value::Int64(v) | Value::ForeignKey(v) => buf.put_i64_le(v),
        Value::Float32(v) => buf.put_f32_le(v),
        Value::Float64(v) => buf.put_f64_le(v),
        Value::Text(s) => {
            let width = column.size as usize;
            let bytes = truncate_to_char_boundary(&s, width).as_bytes();
            buf.put_slice(bytes);
            buf.put_bytes(0, width - bytes.len());
        }
    }
    Ok(())
}

/// Longest prefix of `s` that fits in `width` bytes without splitting a char
pub(crate) fn truncate_to_char_boundary(s: &str, width: usize) -> &str {
    if s.len() <= width {
        return s;
    }
    let mut end = width;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Decode a record body into typed values
pub fn decode_values(mut buf: &[u8], catalog: &Catalog) -> Result<Vec<Value>> {
    let expected = catalog.total_width() as usize;
    if buf.len() < expected {
        return Err(HeapError::ShortBuffer {
            expected,
            actual: buf.len(),
        });
    }

    let mut values = Vec::with_capacity(catalog.len());
    for column in catalog.columns() {
        let value = match column.column_type {
            ColumnType::Int32 => Value::Int32(buf.get_i32_le()),
            ColumnType::Int64 => Value::Int64(buf.get_i64_le()),
            ColumnType::ForeignKey => Value::ForeignKey(buf.get_i64_le()),
            ColumnType::Float32 => Value::Float32(buf.get_f32_le()),
            ColumnType::Float64 => Value::Float64(buf.get_f64_le()),
            ColumnType::Char => {
                let width = column.size as usize;
                let raw = &buf[..width];
                let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
                let text = String::from_utf8_lossy(&raw[..end]).into_owned();
                buf.advance(width);
                Value::Text(text)
            }
        };
        values.push(value);
    }
    Ok(values)
}

/// Decode a record body into its textual fields
pub fn decode_row(buf: &[u8], catalog: &Catalog) -> Result<Vec<String>> {
    Ok(decode_values(buf, catalog)?
        .iter()
        .map(Value::to_string)
        .collect())
}
