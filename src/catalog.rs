//! Column Catalog
//!
//! Ordered, typed, fixed-width column definitions for a table.
//!
//! ## Schema Descriptor Format
//! ```text
//! # one column per line: <name> <type> [<width>]
//! name   char   10
//! age    int32
//! owner  fk
//! ```
//!
//! Every column has a fixed byte width for the life of the table. Widths are
//! never inferred from data.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HeapError, IoOp, IoResultExt, Result};
use crate::record::RowHeader;

/// Name of the implicit identifier pseudo-column
pub const ID_COLUMN: &str = "_id";

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int32,
    Int64,
    Float32,
    Float64,
    /// Fixed-width byte/char array, zero padded
    Char,
    /// Reference to another table's identifier, stored as an Int64
    ForeignKey,
}

impl ColumnType {
    /// Intrinsic width in bytes, `None` for `Char` (width is declared)
    pub fn intrinsic_width(self) -> Option<u32> {
        match self {
            ColumnType::Int32 | ColumnType::Float32 => Some(4),
            ColumnType::Int64 | ColumnType::Float64 | ColumnType::ForeignKey => Some(8),
            ColumnType::Char => None,
        }
    }

    fn parse(name: &str) -> Option<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "int" | "int32" | "integer" => ColumnType::Int32,
            "long" | "int64" | "bigint" => ColumnType::Int64,
            "float" | "float32" => ColumnType::Float32,
            "double" | "float64" => ColumnType::Float64,
            "char" | "text" => ColumnType::Char,
            "fk" | "foreign_key" => ColumnType::ForeignKey,
            _ => return None,
        };
        Some(ty)
    }
}

/// A single column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    /// Fixed byte width of the encoded value
    pub size: u32,
    /// Ordinal position in the catalog
    pub position: usize,
}

/// Ordered list of columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    columns: Vec<Column>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style add of a fixed-width numeric column
    ///
    /// # Panics
    /// If `column_type` is `Char` (use [`Catalog::with_char`]) or the name is
    /// already taken. Use [`Catalog::add_column`] for fallible construction.
    pub fn with_column(mut self, name: &str, column_type: ColumnType) -> Self {
        let size = column_type
            .intrinsic_width()
            .unwrap_or_else(|| panic!("column '{}' needs an explicit width", name));
        if let Err(e) = self.add_column(name, column_type, size) {
            panic!("{}", e);
        }
        self
    }

    /// Builder-style add of a fixed-width text column
    ///
    /// # Panics
    /// If `width` is zero or the name is already taken.
    pub fn with_char(mut self, name: &str, width: u32) -> Self {
        if let Err(e) = self.add_column(name, ColumnType::Char, width) {
            panic!("{}", e);
        }
        self
    }

    /// Append a column at the next ordinal position
    ///
    /// For non-`Char` types the width must match the type's intrinsic width.
    /// The full record (Row Header included) must stay addressable as a `u32`.
    pub fn add_column(&mut self, name: &str, column_type: ColumnType, size: u32) -> Result<()> {
        if name.is_empty() {
            return Err(HeapError::Catalog("column name cannot be empty".to_string()));
        }
        if name.eq_ignore_ascii_case(ID_COLUMN) {
            return Err(HeapError::Catalog(format!(
                "'{}' is reserved for the row identifier",
                ID_COLUMN
            )));
        }
        if self.column_position(name).is_some() {
            return Err(HeapError::Catalog(format!("duplicate column '{}'", name)));
        }
        match column_type.intrinsic_width() {
            Some(width) if width != size => {
                return Err(HeapError::Catalog(format!(
                    "column '{}' of type {:?} must be {} bytes wide, got {}",
                    name, column_type, width, size
                )));
            }
            None if size == 0 => {
                return Err(HeapError::Catalog(format!(
                    "char column '{}' needs a non-zero width",
                    name
                )));
            }
            _ => {}
        }
        let fits = self
            .total_width()
            .checked_add(size)
            .and_then(|width| width.checked_add(RowHeader::encoded_len()))
            .is_some();
        if !fits {
            return Err(HeapError::Catalog(format!(
                "column '{}' of {} bytes makes the record wider than {} bytes",
                name,
                size,
                u32::MAX
            )));
        }

        self.columns.push(Column {
            name: name.to_string(),
            column_type,
            size,
            position: self.columns.len(),
        });
        Ok(())
    }

    /// All columns in declared order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Ordinal of the named column (ASCII case-insensitive)
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Sum of every column's width, i.e. the encoded row body size
    pub fn total_width(&self) -> u32 {
        self.columns.iter().map(|c| c.size).sum()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Catalog describing a projection of this one
    ///
    /// `_id` projects as an `Int64` column.
    pub fn project(&self, names: &[String]) -> Result<Catalog> {
        let mut projected = Catalog::new();
        for name in names {
            let column = if name.eq_ignore_ascii_case(ID_COLUMN) {
                Column {
                    name: ID_COLUMN.to_string(),
                    column_type: ColumnType::Int64,
                    size: 8,
                    position: projected.len(),
                }
            } else {
                let pos = self
                    .column_position(name)
                    .ok_or_else(|| HeapError::UnknownColumn(name.clone()))?;
                Column {
                    position: projected.len(),
                    ..self.columns[pos].clone()
                }
            };
            projected.columns.push(column);
        }
        Ok(projected)
    }

    // =========================================================================
    // Descriptor Import
    // =========================================================================

    /// Parse a schema descriptor (see module docs)
    pub fn parse_descriptor(text: &str) -> Result<Self> {
        let mut catalog = Catalog::new();

        for (lineno, raw) in text.lines().enumerate() {
            let line = match raw.find('#') {
                Some(idx) => &raw[..idx],
                None => raw,
            };
            let parts: Vec<&str> = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|p| !p.is_empty())
                .collect();
            if parts.is_empty() {
                continue;
            }

            let err = |msg: String| HeapError::Catalog(format!("line {}: {}", lineno + 1, msg));

            let (name, ty_name) = match parts.as_slice() {
                [name, ty, ..] => (*name, *ty),
                _ => return Err(err(format!("expected '<name> <type>', got '{}'", raw.trim()))),
            };
            let column_type = ColumnType::parse(ty_name)
                .ok_or_else(|| err(format!("unknown column type '{}'", ty_name)))?;

            let size = match (column_type.intrinsic_width(), parts.get(2)) {
                (Some(width), None) => width,
                (_, Some(text)) => text
                    .parse::<u32>()
                    .map_err(|_| err(format!("invalid width '{}'", text)))?,
                (None, None) => return Err(err(format!("char column '{}' needs a width", name))),
            };
            if parts.len() > 3 {
                return Err(err(format!("unexpected trailing input in '{}'", raw.trim())));
            }

            catalog.add_column(name, column_type, size).map_err(|e| match e {
                HeapError::Catalog(msg) => err(msg),
                other => other,
            })?;
        }

        Ok(catalog)
    }

    /// Read and parse a schema descriptor file
    pub fn import(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).at(IoOp::Read, path)?;
        Self::parse_descriptor(&text)
    }

    // =========================================================================
    // Snapshot Persistence
    // =========================================================================

    /// Write a bincode snapshot of this catalog
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes =
            bincode::serialize(self).map_err(|e| HeapError::Serialization(e.to_string()))?;
        fs::write(path, bytes).at(IoOp::Write, path)
    }

    /// Load a catalog snapshot written by [`Catalog::save`]
    ///
    /// Columns are re-added one by one so a tampered snapshot is held to the
    /// same rules as [`Catalog::add_column`].
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).at(IoOp::Read, path)?;
        let snapshot: Catalog =
            bincode::deserialize(&bytes).map_err(|e| HeapError::Serialization(e.to_string()))?;

        let mut catalog = Catalog::new();
        for column in &snapshot.columns {
            catalog.add_column(&column.name, column.column_type, column.size)?;
        }
        Ok(catalog)
    }
}
