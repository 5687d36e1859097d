//! Configuration for HeapDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration shared by every table opened from it
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all table files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {table}.dat      (row headers + encoded columns)
    ///     ├── {table}_h.dat    (offset index: id → record offset)
    ///     └── {table}_s.dat    (catalog snapshot, written by the CLI)
    pub data_dir: PathBuf,

    /// fsync the data and index files after every append
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Bulk Load Configuration
    // -------------------------------------------------------------------------
    /// Field delimiter for delimited-text bulk loads
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./heapdb_data"),
            sync_writes: false,
            delimiter: ',',
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the data file for `table`
    pub fn data_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{}.dat", table))
    }

    /// Path of the offset index file for `table`
    pub fn index_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{}_h.dat", table))
    }

    /// Path of the catalog snapshot for `table`
    pub fn schema_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{}_s.dat", table))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all table files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Sync data and index files after every append
    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the bulk-load field delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
