//! Offset Index
//!
//! Append-only mapping from row identifier to the byte offset of the row's
//! header in the data file. Mirrored in memory for binary-search lookups.
//!
//! ## File Format
//! ```text
//! ┌─────────────────┬─────────────────┐
//! │ Id: u64 LE (8)  │ Offset: u64 (8) │   entry 0
//! ├─────────────────┼─────────────────┤
//! │ Id: u64 LE (8)  │ Offset: u64 (8) │   entry 1
//! └─────────────────┴─────────────────┘
//! ```
//! No file header and no count field: end-of-file determines the number of
//! entries. A trailing partial entry is discarded on load.
//!
//! Identifiers are assigned as the entry count at insertion time, so the
//! sequence is strictly increasing in identifier. `lookup` relies on that.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{HeapError, IoOp, IoResultExt, Result};

/// Size of one encoded entry: Id (8) + Offset (8)
pub const ENTRY_SIZE: usize = 16;

/// One (identifier, offset) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: u64,
    pub offset: u64,
}

impl IndexEntry {
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut bytes = [0u8; ENTRY_SIZE];
        bytes[..8].copy_from_slice(&self.id.to_le_bytes());
        bytes[8..].copy_from_slice(&self.offset.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let mut id = [0u8; 8];
        let mut offset = [0u8; 8];
        id.copy_from_slice(&bytes[..8]);
        offset.copy_from_slice(&bytes[8..]);
        Self {
            id: u64::from_le_bytes(id),
            offset: u64::from_le_bytes(offset),
        }
    }
}

/// In-memory copy of a table's offset index plus its append handle
pub struct OffsetIndex {
    path: PathBuf,
    entries: Vec<IndexEntry>,
    /// Opened lazily on first append, so a dropped index is recreated on demand
    file: Option<File>,
    sync_writes: bool,
}

impl OffsetIndex {
    /// Load the index file at `path` into memory
    ///
    /// A missing file is an empty index. A trailing partial entry is dropped
    /// and the file truncated to whole entries so later appends stay aligned.
    pub fn load(path: &Path, sync_writes: bool) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(HeapError::io(IoOp::Read, path, e)),
        };

        let mut chunks = bytes.chunks_exact(ENTRY_SIZE);
        let entries: Vec<IndexEntry> = chunks
            .by_ref()
            .filter_map(|chunk| chunk.try_into().ok().map(IndexEntry::from_bytes))
            .collect();

        let partial = chunks.remainder().len();
        if partial > 0 {
            tracing::warn!(
                "Discarding {} trailing bytes of partial index entry in {}",
                partial,
                path.display()
            );
            let file = OpenOptions::new().write(true).open(path).at(IoOp::Open, path)?;
            file.set_len((entries.len() * ENTRY_SIZE) as u64)
                .at(IoOp::Truncate, path)?;
        }

        tracing::debug!("Loaded {} index entries from {}", entries.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            file: None,
            sync_writes,
        })
    }

    /// Persist a new entry, then add it to the in-memory copy
    pub fn append(&mut self, id: u64, offset: u64) -> Result<()> {
        let entry = IndexEntry { id, offset };

        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .at(IoOp::Open, &self.path)?;
            self.file = Some(file);
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(&entry.to_bytes())
                .at(IoOp::Write, &self.path)?;
            if self.sync_writes {
                file.sync_data().at(IoOp::Sync, &self.path)?;
            }
        }

        self.entries.push(entry);
        Ok(())
    }

    /// Binary search for the offset of `id`
    pub fn lookup(&self, id: u64) -> Option<u64> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|pos| self.entries[pos].offset)
    }

    /// Entry at a position in insertion order
    pub fn get(&self, position: usize) -> Option<IndexEntry> {
        self.entries.get(position).copied()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep only the first `len` entries, in memory and on disk
    pub(crate) fn truncate(&mut self, len: usize) -> Result<()> {
        if len >= self.entries.len() {
            return Ok(());
        }
        self.file = None;
        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .at(IoOp::Open, &self.path)?;
        file.set_len((len * ENTRY_SIZE) as u64)
            .at(IoOp::Truncate, &self.path)?;
        self.entries.truncate(len);
        Ok(())
    }

    /// Remove the index file and forget every entry
    pub fn clear(&mut self) -> Result<()> {
        self.file = None;
        self.entries.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HeapError::io(IoOp::Remove, &self.path, e)),
        }
    }
}
