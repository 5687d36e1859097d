//! Record Module
//!
//! On-disk layout of a single stored row (a "registry") and the codec that
//! converts textual fields to and from their fixed-width binary form.
//!
//! ## Record Format
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Row Header (267 bytes)                                        │
//! │   TableName: [u8; 255] | RegistrySize: u32 | Timestamp: i64   │
//! ├───────────────────────────────────────────────────────────────┤
//! │ Body (catalog.total_width() bytes)                            │
//! │   [Col 0][Col 1] ... [Col N-1]   (declared order, fixed width)│
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. The row identifier is not part of the
//! record; it lives only in the offset index.

mod codec;
mod header;
mod value;

pub use codec::{decode_row, decode_values, encode_row};
pub(crate) use codec::truncate_to_char_boundary;
pub use header::{RowHeader, TABLE_NAME_WIDTH};
pub use value::Value;
