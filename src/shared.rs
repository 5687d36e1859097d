//! Shared table handle
//!
//! Wraps a [`Table`] for use from several threads in one process.
//!
//! ## Concurrency:
//! - Inserts take the write lock (single writer)
//! - Point reads take the read lock (many concurrent readers)
//! - Scans copy the index entries under the read lock first, then read each
//!   row separately, so appends during a long scan neither block it nor show
//!   up half-written in it

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::index::IndexEntry;
use crate::table::Table;

/// Cloneable, thread-safe handle to a table
#[derive(Clone)]
pub struct SharedTable {
    inner: Arc<RwLock<Table>>,
}

impl SharedTable {
    pub fn new(table: Table) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Append a row under the write lock
    pub fn insert<S: AsRef<str>>(&self, row: &[S]) -> Result<u64> {
        self.inner.write().insert(row)
    }

    pub fn read_row_by_id(&self, id: u64) -> Result<Option<Vec<String>>> {
        self.inner.read().read_row_by_id(id)
    }

    pub fn read_row_at(&self, offset: u64) -> Result<Vec<String>> {
        self.inner.read().read_row_at(offset)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of the index as of now
    pub fn snapshot(&self) -> Vec<IndexEntry> {
        self.inner.read().entries().to_vec()
    }

    /// Decode every row present when the scan started
    pub fn scan(&self) -> Result<Vec<(u64, Vec<String>)>> {
        let snapshot = self.snapshot();
        let mut rows = Vec::with_capacity(snapshot.len());
        for entry in snapshot {
            let row = self.inner.read().read_row_at(entry.offset)?;
            rows.push((entry.id, row));
        }
        Ok(rows)
    }

    /// Run `f` with shared access to the table (joins, queries)
    pub fn with_read<R>(&self, f: impl FnOnce(&Table) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Run `f` with exclusive access to the table (bulk load, drop)
    pub fn with_write<R>(&self, f: impl FnOnce(&mut Table) -> R) -> R {
        f(&mut *self.inner.write())
    }
}
