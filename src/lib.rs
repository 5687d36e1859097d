//! # HeapDB
//!
//! A minimal single-file relational storage engine with:
//! - Fixed-width binary records in an append-only heap file
//! - An append-only positional index (identifier → byte offset)
//! - CSV bulk load
//! - Nested-loop and index-pinned nested-loop equi-joins
//! - A `SELECT ... WHERE ...` filter over one table
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Query Front-End          Join Engine             │
//! │      (parse → Filter → Cursor)   (offset pairs)             │
//! └─────────────────────┬───────────────────┬───────────────────┘
//!                       │                   │
//! ┌─────────────────────▼───────────────────▼───────────────────┐
//! │                        Table Store                          │
//! │          insert / read_row_at / read_row_by_id / drop       │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │  Record Codec   │                │  Offset Index   │
//!   │ (Catalog-driven)│                │ (binary search) │
//!   └────────┬────────┘                └────────┬────────┘
//!            ▼                                  ▼
//!      <table>.dat                        <table>_h.dat
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod catalog;
pub mod record;
pub mod index;
pub mod table;
pub mod join;
pub mod query;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HeapError, IoOp, Result};
pub use config::Config;
pub use catalog::{Catalog, Column, ColumnType};
pub use index::IndexEntry;
pub use join::JoinPair;
pub use query::{Cursor, Filter};
pub use shared::SharedTable;
pub use table::Table;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of HeapDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
