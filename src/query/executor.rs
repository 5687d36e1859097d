//! Filter execution
//!
//! Scans the table in index order, decodes each row, keeps the rows that
//! satisfy every predicate and projects the selection. A `_id = k` clause
//! narrows the scan to a single index lookup.

use std::cmp::Ordering;

use crate::catalog::{Column, ColumnType, ID_COLUMN};
use crate::error::{HeapError, Result};
use crate::index::IndexEntry;
use crate::record::{truncate_to_char_boundary, Value};
use crate::table::Table;

use super::{Comparator, Cursor, Filter, Predicate};

/// Where a selected or filtered value comes from
#[derive(Debug, Clone, Copy)]
enum Target {
    Id,
    Column(usize),
}

struct CompiledPredicate {
    target: Target,
    comparator: Comparator,
    literal: Value,
}

impl CompiledPredicate {
    fn matches(&self, id: u64, values: &[Value]) -> bool {
        let id_value;
        let actual = match self.target {
            Target::Id => {
                id_value = Value::Int64(id as i64);
                &id_value
            }
            Target::Column(pos) => &values[pos],
        };

        let Some(ordering) = actual.compare(&self.literal) else {
            return false;
        };
        match self.comparator {
            Comparator::Eq => ordering == Ordering::Equal,
            Comparator::Ne => ordering != Ordering::Equal,
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Le => ordering != Ordering::Greater,
            Comparator::Gt => ordering == Ordering::Greater,
            Comparator::Ge => ordering != Ordering::Less,
        }
    }
}

fn resolve(table: &Table, name: &str) -> Result<Target> {
    if name.eq_ignore_ascii_case(ID_COLUMN) {
        return Ok(Target::Id);
    }
    table
        .catalog()
        .column_position(name)
        .map(Target::Column)
        .ok_or_else(|| HeapError::UnknownColumn(name.to_string()))
}

fn compile(table: &Table, predicate: &Predicate) -> Result<CompiledPredicate> {
    let target = resolve(table, &predicate.column)?;
    let literal = match target {
        Target::Id => {
            let id_column = Column {
                name: ID_COLUMN.to_string(),
                column_type: ColumnType::Int64,
                size: 8,
                position: 0,
            };
            Value::parse(&predicate.literal, &id_column)?
        }
        Target::Column(pos) => {
            let column = &table.catalog().columns()[pos];
            match Value::parse(&predicate.literal, column)? {
                // Stored text was cut to the column width on insert
                Value::Text(text) => Value::Text(
                    truncate_to_char_boundary(&text, column.size as usize).to_string(),
                ),
                value => value,
            }
        }
    };
    Ok(CompiledPredicate {
        target,
        comparator: predicate.comparator,
        literal,
    })
}

/// Run `filter` against `table`
pub fn execute(table: &Table, filter: &Filter) -> Result<Cursor> {
    let names: Vec<String> = if filter.selection.is_empty() {
        table
            .catalog()
            .columns()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    } else {
        filter.selection.clone()
    };
    let result_catalog = table.catalog().project(&names)?;
    let targets = names
        .iter()
        .map(|name| resolve(table, name))
        .collect::<Result<Vec<_>>>()?;

    let predicates = filter
        .predicates
        .iter()
        .map(|p| compile(table, p))
        .collect::<Result<Vec<_>>>()?;

    let pinned_id = predicates.iter().find_map(|p| match (p.target, p.comparator, &p.literal) {
        (Target::Id, Comparator::Eq, Value::Int64(id)) => u64::try_from(*id).ok(),
        _ => None,
    });

    let pinned: Vec<IndexEntry>;
    let candidates: &[IndexEntry] = match pinned_id {
        Some(id) => {
            pinned = table
                .lookup(id)
                .map(|offset| IndexEntry { id, offset })
                .into_iter()
                .collect();
            &pinned
        }
        None => table.entries(),
    };

    let mut reader = table.reader();
    let mut rows = Vec::new();
    for entry in candidates {
        let values = reader.read_values_at(entry.offset)?;
        if !predicates.iter().all(|p| p.matches(entry.id, &values)) {
            continue;
        }
        let row = targets
            .iter()
            .map(|target| match target {
                Target::Id => entry.id.to_string(),
                Target::Column(pos) => values[*pos].to_string(),
            })
            .collect();
        rows.push(row);
    }

    tracing::debug!(
        "Query on '{}' scanned {} rows, matched {}",
        table.name(),
        candidates.len(),
        rows.len()
    );
    Ok(Cursor::new(result_catalog, rows))
}
