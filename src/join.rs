//! Join Engine
//!
//! Equi-joins over two tables. Results are pairs of record offsets rather
//! than decoded rows; callers materialize the rows they need with
//! [`Table::read_row_at`] or [`materialize`].
//!
//! Both sides are borrowed read-only, so a table may be joined with itself.

use crate::error::{HeapError, Result};
use crate::table::Table;

/// Offsets of one matching (inner, outer) record pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JoinPair {
    pub inner: u64,
    pub outer: u64,
}

fn column_position(table: &Table, column: &str) -> Result<usize> {
    table
        .catalog()
        .column_position(column)
        .ok_or_else(|| HeapError::UnknownColumn(format!("{}.{}", table.name(), column)))
}

/// Nested-loop equi-join
///
/// For every inner row (index order) and every outer row (index order),
/// emits the pair when the two columns decode to the same text. Costs
/// |inner| × |outer| outer-row decodes.
pub fn nested_loop_join(
    inner: &Table,
    outer: &Table,
    inner_column: &str,
    outer_column: &str,
) -> Result<Vec<JoinPair>> {
    let inner_pos = column_position(inner, inner_column)?;
    let outer_pos = column_position(outer, outer_column)?;

    let mut inner_reader = inner.reader();
    let mut outer_reader = outer.reader();
    let mut pairs = Vec::new();

    for inner_entry in inner.entries() {
        let inner_row = inner_reader.read_row_at(inner_entry.offset)?;

        for outer_entry in outer.entries() {
            let outer_row = outer_reader.read_row_at(outer_entry.offset)?;
            if inner_row[inner_pos] == outer_row[outer_pos] {
                pairs.push(JoinPair {
                    inner: inner_entry.offset,
                    outer: outer_entry.offset,
                });
            }
        }
    }

    tracing::debug!(
        "Nested-loop join {}.{} = {}.{}: {} pairs",
        inner.name(),
        inner_column,
        outer.name(),
        outer_column,
        pairs.len()
    );
    Ok(pairs)
}

/// Join a single pinned inner row against the whole outer table
///
/// `inner_row_index` is a position in the inner table's index, not an
/// identifier. Matches are emitted in outer index order, without
/// de-duplication.
pub fn index_nested_loop_join(
    inner: &Table,
    outer: &Table,
    outer_column: &str,
    inner_column: &str,
    inner_row_index: usize,
) -> Result<Vec<JoinPair>> {
    let inner_pos = column_position(inner, inner_column)?;
    let outer_pos = column_position(outer, outer_column)?;

    let inner_entry = inner.entry_at(inner_row_index)?;
    let inner_row = inner.read_row_at(inner_entry.offset)?;
    let key = &inner_row[inner_pos];

    let mut outer_reader = outer.reader();
    let mut pairs = Vec::new();
    for outer_entry in outer.entries() {
        let outer_row = outer_reader.read_row_at(outer_entry.offset)?;
        if &outer_row[outer_pos] == key {
            pairs.push(JoinPair {
                inner: inner_entry.offset,
                outer: outer_entry.offset,
            });
        }
    }
    Ok(pairs)
}

/// Full join driven by pinning each inner row in turn
///
/// Produces the same pairs, in the same order, as [`nested_loop_join`].
pub fn index_nested_loop_join_all(
    inner: &Table,
    outer: &Table,
    outer_column: &str,
    inner_column: &str,
) -> Result<Vec<JoinPair>> {
    let mut pairs = Vec::new();
    for position in 0..inner.len() {
        pairs.extend(index_nested_loop_join(
            inner,
            outer,
            outer_column,
            inner_column,
            position,
        )?);
    }
    Ok(pairs)
}

/// Decode both rows of every pair
pub fn materialize(
    inner: &Table,
    outer: &Table,
    pairs: &[JoinPair],
) -> Result<Vec<(Vec<String>, Vec<String>)>> {
    let mut inner_reader = inner.reader();
    let mut outer_reader = outer.reader();
    pairs
        .iter()
        .map(|pair| {
            Ok((
                inner_reader.read_row_at(pair.inner)?,
                outer_reader.read_row_at(pair.outer)?,
            ))
        })
        .collect()
}
