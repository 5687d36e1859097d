//! Table Store
//!
//! Owns a table's data file and offset index.
//!
//! ## Responsibilities
//! - Append encoded records to `<table>.dat`
//! - Keep `<table>_h.dat` in step with the data file
//! - Decode rows by offset or by identifier
//! - Bulk load delimited text
//! - Drop the table's files
//!
//! ## Write Ordering
//! Each insert precomputes the record offset (current data length), writes the
//! whole record in one call, then appends the index entry. A failed index
//! append truncates the data file back to the precomputed offset. On open, any
//! data bytes past the last indexed record are treated as an interrupted insert
//! and truncated, and index entries pointing past the end of the data file are
//! dropped. Readers therefore only ever see fully written records.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{HeapError, IoOp, IoResultExt, Result};
use crate::index::{IndexEntry, OffsetIndex};
use crate::query::{self, Cursor, Filter};
use crate::record::{decode_values, encode_row, RowHeader, Value};

/// A single table: catalog, data file, offset index
///
/// ## Concurrency:
/// - Single writer. `insert`/`load_delimited`/`drop` take `&mut self`.
/// - Reads take `&self` and open their own file handle, so joins can borrow
///   the same table twice. See [`crate::SharedTable`] for cross-thread use.
pub struct Table {
    name: String,
    catalog: Catalog,

    data_path: PathBuf,
    /// Append handle, opened lazily on first insert
    data_file: Option<File>,
    /// Length of the data file; the offset of the next record
    data_len: u64,

    index: OffsetIndex,

    /// Row Header width, fixed for the life of the table
    header_size: u32,
    sync_writes: bool,
    delimiter: char,
}

impl Table {
    /// Open (or create) the table `name` under `config.data_dir`
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Load the offset index into memory
    /// 3. Reconcile the index with the data file (see module docs)
    pub fn open(config: &Config, name: impl Into<String>, catalog: Catalog) -> Result<Self> {
        let name = name.into();
        fs::create_dir_all(&config.data_dir).at(IoOp::Open, &config.data_dir)?;

        let data_path = config.data_path(&name);
        let index = OffsetIndex::load(&config.index_path(&name), config.sync_writes)?;

        let data_len = match fs::metadata(&data_path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(HeapError::io(IoOp::Metadata, &data_path, e)),
        };

        let mut table = Self {
            name,
            catalog,
            data_path,
            data_file: None,
            data_len,
            index,
            header_size: RowHeader::encoded_len(),
            sync_writes: config.sync_writes,
            delimiter: config.delimiter,
        };
        table.recover()?;

        tracing::info!(
            "Opened table '{}' with {} rows ({} bytes)",
            table.name,
            table.index.len(),
            table.data_len
        );
        Ok(table)
    }

    /// Open with a directory (convenience method)
    ///
    /// Uses the default config with the specified data directory
    pub fn open_in(dir: &Path, name: impl Into<String>, catalog: Catalog) -> Result<Self> {
        let config = Config::builder().data_dir(dir).build();
        Self::open(&config, name, catalog)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Append a row and return its identifier
    ///
    /// `row` holds the catalog's columns in order, identifier excluded. No
    /// uniqueness or foreign-key validation is performed.
    pub fn insert<S: AsRef<str>>(&mut self, row: &[S]) -> Result<u64> {
        let registry_size = self.record_size();

        let mut record = BytesMut::with_capacity(registry_size as usize);
        RowHeader::new(&self.name, registry_size).encode(&mut record);
        encode_row(row, &self.catalog, &mut record)?;

        let id = self.index.len() as u64;
        let offset = self.data_len;

        if let Err(e) = self.append_record(&record) {
            self.rollback_data(offset);
            return Err(e);
        }
        if let Err(e) = self.index.append(id, offset) {
            self.rollback_data(offset);
            return Err(e);
        }
        self.data_len = offset + record.len() as u64;

        tracing::debug!("Inserted row {} into '{}' at offset {}", id, self.name, offset);
        Ok(id)
    }

    fn append_record(&mut self, record: &[u8]) -> Result<()> {
        if self.data_file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.data_path)
                .at(IoOp::Open, &self.data_path)?;
            self.data_file = Some(file);
        }
        if let Some(file) = self.data_file.as_mut() {
            file.write_all(record).at(IoOp::Write, &self.data_path)?;
            if self.sync_writes {
                file.sync_data().at(IoOp::Sync, &self.data_path)?;
            }
        }
        Ok(())
    }

    /// Best-effort removal of a partially appended record
    fn rollback_data(&mut self, offset: u64) {
        self.data_file = None;
        let result = OpenOptions::new()
            .write(true)
            .open(&self.data_path)
            .and_then(|f| f.set_len(offset));
        if let Err(e) = result {
            // The next open truncates the unindexed tail anyway.
            tracing::warn!(
                "Failed to roll back {} to {} bytes: {}",
                self.data_path.display(),
                offset,
                e
            );
        }
    }

    /// Bulk load a delimited text file
    ///
    /// The first line is a header and is skipped. Every following non-blank
    /// line becomes one row, inserted in file order. Returns the number of
    /// rows inserted. Rows before a failing line stay inserted.
    pub fn load_delimited(&mut self, path: &Path) -> Result<u64> {
        let file = File::open(path).at(IoOp::Open, path)?;
        let mut lines = BufReader::new(file).lines();

        if lines.next().transpose().at(IoOp::Read, path)?.is_none() {
            tracing::info!("Bulk load of {} into '{}': empty file", path.display(), self.name);
            return Ok(0);
        }

        let mut inserted = 0u64;
        for (idx, line) in lines.enumerate() {
            let line = line.at(IoOp::Read, path)?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(self.delimiter).collect();
            self.insert(&fields).map_err(|e| HeapError::BulkLoad {
                // header is line 1
                line: idx + 2,
                source: Box::new(e),
            })?;
            inserted += 1;
        }

        tracing::info!(
            "Bulk loaded {} rows from {} into '{}'",
            inserted,
            path.display(),
            self.name
        );
        Ok(inserted)
    }

    /// Delete the data and index files and reset the in-memory index
    ///
    /// The handle stays usable: the next insert recreates both files and
    /// assigns identifier 0.
    pub fn drop(&mut self) -> Result<()> {
        self.data_file = None;
        match fs::remove_file(&self.data_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(HeapError::io(IoOp::Remove, &self.data_path, e)),
        }
        self.data_len = 0;
        self.index.clear()?;

        tracing::info!("Dropped table '{}'", self.name);
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Open a reader that keeps one file handle across many reads
    pub fn reader(&self) -> RowReader<'_> {
        RowReader {
            table: self,
            file: None,
            buf: Vec::new(),
        }
    }

    /// Decode the row whose header starts at `offset`
    pub fn read_row_at(&self, offset: u64) -> Result<Vec<String>> {
        self.reader().read_row_at(offset)
    }

    /// Decode the row at `offset` into typed values
    pub fn read_values_at(&self, offset: u64) -> Result<Vec<Value>> {
        self.reader().read_values_at(offset)
    }

    /// Read only the Row Header at `offset`
    pub fn read_header_at(&self, offset: u64) -> Result<RowHeader> {
        self.reader().read_header_at(offset)
    }

    /// Look up `id` in the index and decode its row
    ///
    /// Returns `Ok(None)` when the identifier was never assigned.
    pub fn read_row_by_id(&self, id: u64) -> Result<Option<Vec<String>>> {
        match self.index.lookup(id) {
            Some(offset) => self.read_row_at(offset).map(Some),
            None => Ok(None),
        }
    }

    /// Offset of the row with identifier `id`
    pub fn lookup(&self, id: u64) -> Option<u64> {
        self.index.lookup(id)
    }

    /// Every row in index order, paired with its index entry
    pub fn rows(&self) -> Result<Vec<(IndexEntry, Vec<String>)>> {
        let mut reader = self.reader();
        self.index
            .entries()
            .iter()
            .map(|entry| Ok((*entry, reader.read_row_at(entry.offset)?)))
            .collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Parse and run a `SELECT ... [WHERE ...]` filter
    pub fn query(&self, text: &str) -> Result<Cursor> {
        let filter = query::parse_filter(text)?;
        self.execute(&filter)
    }

    /// Run an already parsed filter
    pub fn execute(&self, filter: &Filter) -> Result<Cursor> {
        query::execute(self, filter)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Number of rows (index entries)
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All index entries in insertion order
    pub fn entries(&self) -> &[IndexEntry] {
        self.index.entries()
    }

    /// Index entry at a position in insertion order
    pub fn entry_at(&self, position: usize) -> Result<IndexEntry> {
        self.index.get(position).ok_or(HeapError::PositionOutOfRange {
            position,
            len: self.index.len(),
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    /// Width of the Row Header in bytes
    pub fn header_size(&self) -> u32 {
        self.header_size
    }

    /// Size of one record (header + encoded columns) under the current catalog
    pub fn record_size(&self) -> u32 {
        self.header_size + self.catalog.total_width()
    }

    /// Current length of the data file in bytes
    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Reconcile the index with the data file after an interrupted insert
    fn recover(&mut self) -> Result<()> {
        let mut keep = self.index.len();
        let mut expected_end = 0u64;

        while keep > 0 {
            let entry = self.index.entries()[keep - 1];
            match self.indexed_record_end(entry.offset)? {
                Some(end) => {
                    expected_end = end;
                    break;
                }
                None => keep -= 1,
            }
        }

        if keep < self.index.len() {
            tracing::warn!(
                "Table '{}': dropping {} index entries past end of data file",
                self.name,
                self.index.len() - keep
            );
            self.index.truncate(keep)?;
        }

        if self.data_len > expected_end {
            tracing::warn!(
                "Table '{}': truncating {} unindexed bytes from {}",
                self.name,
                self.data_len - expected_end,
                self.data_path.display()
            );
            let file = OpenOptions::new()
                .write(true)
                .open(&self.data_path)
                .at(IoOp::Open, &self.data_path)?;
            file.set_len(expected_end).at(IoOp::Truncate, &self.data_path)?;
            self.data_len = expected_end;
        }
        Ok(())
    }

    /// End offset of the record at `offset`, if it is fully present on disk
    ///
    /// Uses the size stored in the record's own header so rows written under a
    /// different catalog are never cut short.
    fn indexed_record_end(&self, offset: u64) -> Result<Option<u64>> {
        if !fits_within(offset, self.header_size as u64, self.data_len) {
            return Ok(None);
        }
        let header = self.read_header_at(offset)?;
        if header.registry_size < self.header_size
            || !fits_within(offset, header.registry_size as u64, self.data_len)
        {
            return Ok(None);
        }
        Ok(Some(offset + header.registry_size as u64))
    }
}

/// Whether `len` bytes starting at `offset` end at or before `limit`
fn fits_within(offset: u64, len: u64, limit: u64) -> bool {
    offset.checked_add(len).is_some_and(|end| end <= limit)
}

/// Read handle over a table's data file
///
/// Borrowing the table pins its index and data length for the reader's
/// lifetime, so a scan never observes a half-written record.
pub struct RowReader<'a> {
    table: &'a Table,
    file: Option<File>,
    buf: Vec<u8>,
}

impl<'a> RowReader<'a> {
    pub fn read_header_at(&mut self, offset: u64) -> Result<RowHeader> {
        let len = self.table.header_size as usize;
        self.read_exact_at(offset, len)?;
        RowHeader::decode(&self.buf)
    }

    pub fn read_values_at(&mut self, offset: u64) -> Result<Vec<Value>> {
        let record_size = self.table.record_size();
        self.read_exact_at(offset, record_size as usize)?;

        let header = RowHeader::decode(&self.buf)?;
        if header.registry_size != record_size {
            return Err(HeapError::CorruptRecord {
                offset,
                reason: format!(
                    "registry size {} does not match catalog record size {}",
                    header.registry_size, record_size
                ),
            });
        }

        tracing::trace!("Read row at offset {} of '{}'", offset, self.table.name);
        decode_values(&self.buf[self.table.header_size as usize..], &self.table.catalog)
    }

    pub fn read_row_at(&mut self, offset: u64) -> Result<Vec<String>> {
        Ok(self
            .read_values_at(offset)?
            .iter()
            .map(Value::to_string)
            .collect())
    }

    /// Fill `self.buf` with `len` bytes starting at `offset`
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<()> {
        let path = &self.table.data_path;
        if !fits_within(offset, len as u64, self.table.data_len) {
            return Err(HeapError::CorruptRecord {
                offset,
                reason: format!(
                    "record of {} bytes extends past end of data file ({} bytes)",
                    len, self.table.data_len
                ),
            });
        }

        if self.file.is_none() {
            self.file = Some(File::open(path).at(IoOp::Open, path)?);
        }
        self.buf.resize(len, 0);
        if let Some(file) = self.file.as_mut() {
            file.seek(SeekFrom::Start(offset)).at(IoOp::Seek, path)?;
            file.read_exact(&mut self.buf).at(IoOp::Read, path)?;
        }
        Ok(())
    }
}
