//! Row Header
//!
//! Fixed-size prefix written before every record body.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut};

use crate::error::{HeapError, Result};

/// Width of the null-padded table name field
pub const TABLE_NAME_WIDTH: usize = 255;

/// Header written before each record body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHeader {
    /// Owning table name (truncated to `TABLE_NAME_WIDTH` bytes on disk)
    pub table_name: String,
    /// Total record size, header included
    pub registry_size: u32,
    /// Creation time, seconds since the unix epoch
    pub timestamp: i64,
}

impl RowHeader {
    /// Encoded size: TableName (255) + RegistrySize (4) + Timestamp (8)
    pub const fn encoded_len() -> u32 {
        (TABLE_NAME_WIDTH + std::mem::size_of::<u32>() + std::mem::size_of::<i64>()) as u32
    }

    /// Header for a record created now
    pub fn new(table_name: &str, registry_size: u32) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self {
            table_name: table_name.to_string(),
            registry_size,
            timestamp,
        }
    }

    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        let name = self.table_name.as_bytes();
        let copied = name.len().min(TABLE_NAME_WIDTH);
        buf.put_slice(&name[..copied]);
        buf.put_bytes(0, TABLE_NAME_WIDTH - copied);
        buf.put_u32_le(self.registry_size);
        buf.put_i64_le(self.timestamp);
    }

    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        let expected = Self::encoded_len() as usize;
        if buf.len() < expected {
            return Err(HeapError::ShortBuffer {
                expected,
                actual: buf.len(),
            });
        }

        let name = &buf[..TABLE_NAME_WIDTH];
        let end = name.iter().position(|&b| b == 0).unwrap_or(TABLE_NAME_WIDTH);
        let table_name = String::from_utf8_lossy(&name[..end]).into_owned();
        buf.advance(TABLE_NAME_WIDTH);

        Ok(Self {
            table_name,
            registry_size: buf.get_u32_le(),
            timestamp: buf.get_i64_le(),
        })
    }
}
