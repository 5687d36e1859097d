//! Error types for HeapDB
//!
//! Provides a unified error type for all operations.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using HeapError
pub type Result<T> = std::result::Result<T, HeapError>;

/// File operation that was in progress when an I/O error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Open,
    Read,
    Write,
    Seek,
    Sync,
    Truncate,
    Remove,
    Metadata,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IoOp::Open => "open",
            IoOp::Read => "read",
            IoOp::Write => "write",
            IoOp::Seek => "seek",
            IoOp::Sync => "sync",
            IoOp::Truncate => "truncate",
            IoOp::Remove => "remove",
            IoOp::Metadata => "metadata",
        };
        f.write_str(name)
    }
}

/// Unified error type for HeapDB operations
#[derive(Debug, Error)]
pub enum HeapError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error during {op} of {}: {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Row Errors
    // -------------------------------------------------------------------------
    #[error("Malformed value {value:?} for column '{column}': {reason}")]
    MalformedValue {
        column: String,
        value: String,
        reason: String,
    },

    #[error("Schema mismatch: catalog declares {expected} columns, row has {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("Corrupt record at offset {offset}: {reason}")]
    CorruptRecord { offset: u64, reason: String },

    #[error("Buffer too short: expected {expected} bytes, got {actual}")]
    ShortBuffer { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row position {position} out of range (index holds {len} entries)")]
    PositionOutOfRange { position: usize, len: usize },

    // -------------------------------------------------------------------------
    // Catalog / Query Errors
    // -------------------------------------------------------------------------
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Bulk Load Errors
    // -------------------------------------------------------------------------
    #[error("Bulk load failed at line {line}: {source}")]
    BulkLoad {
        line: usize,
        #[source]
        source: Box<HeapError>,
    },
}

impl HeapError {
    /// Build an `Io` error for the given operation and file
    pub fn io(op: IoOp, path: &Path, source: io::Error) -> Self {
        HeapError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Attach the operation and path to a raw `io::Result`
pub(crate) trait IoResultExt<T> {
    fn at(self, op: IoOp, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, op: IoOp, path: &Path) -> Result<T> {
        self.map_err(|e| HeapError::io(op, path, e))
    }
}
