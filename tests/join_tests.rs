//! Tests for the Join Engine
//!
//! These tests verify:
//! - Nested-loop equi-join emits every matching offset pair in index order
//! - Swapping inner and outer yields the same pairs
//! - Self-joins
//! - Index-pinned joins on a single inner row
//! - Error cases (unknown columns, out-of-range positions)

use std::collections::HashSet;
use std::path::Path;

use heapdb::join::{
    index_nested_loop_join, index_nested_loop_join_all, materialize, nested_loop_join, JoinPair,
};
use heapdb::{Catalog, ColumnType, HeapError, Table};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Person(dre, name) and Worked(id_company, id_person)
///
/// ```text
/// Person dre | name        Worked id_company | id_person
///          9 | Jhoe                       77 | 9
///         10 | Marta                      35 | 10
///                                         44 | 10
/// ```
fn person_and_worked(dir: &Path) -> (Table, Table) {
    let person_catalog = Catalog::new()
        .with_column("dre", ColumnType::Int32)
        .with_char("name", 10);
    let mut person = Table::open_in(dir, "person", person_catalog).unwrap();
    person.insert(&["9", "Jhoe"]).unwrap();
    person.insert(&["10", "Marta"]).unwrap();

    let worked_catalog = Catalog::new()
        .with_column("id_company", ColumnType::Int32)
        .with_column("id_person", ColumnType::ForeignKey);
    let mut worked = Table::open_in(dir, "worked", worked_catalog).unwrap();
    worked.insert(&["77", "9"]).unwrap();
    worked.insert(&["35", "10"]).unwrap();
    worked.insert(&["44", "10"]).unwrap();

    (person, worked)
}

fn offset(table: &Table, id: u64) -> u64 {
    table.lookup(id).unwrap()
}

// =============================================================================
// Nested-Loop Join Tests
// =============================================================================

#[test]
fn test_nested_loop_join() {
    let temp = TempDir::new().unwrap();
    let (person, worked) = person_and_worked(temp.path());

    let pairs = nested_loop_join(&person, &worked, "dre", "id_person").unwrap();

    assert_eq!(
        pairs,
        vec![
            JoinPair { inner: offset(&person, 0), outer: offset(&worked, 0) },
            JoinPair { inner: offset(&person, 1), outer: offset(&worked, 1) },
            JoinPair { inner: offset(&person, 1), outer: offset(&worked, 2) },
        ]
    );
}

#[test]
fn test_nested_loop_join_is_symmetric() {
    let temp = TempDir::new().unwrap();
    let (person, worked) = person_and_worked(temp.path());

    let forward: HashSet<(u64, u64)> = nested_loop_join(&person, &worked, "dre", "id_person")
        .unwrap()
        .into_iter()
        .map(|p| (p.inner, p.outer))
        .collect();
    let backward: HashSet<(u64, u64)> = nested_loop_join(&worked, &person, "id_person", "dre")
        .unwrap()
        .into_iter()
        .map(|p| (p.outer, p.inner))
        .collect();

    assert_eq!(forward.len(), 3);
    assert_eq!(forward, backward);
}

#[test]
fn test_self_join_on_distinct_values() {
    let temp = TempDir::new().unwrap();
    let catalog = Catalog::new()
        .with_char("name", 10)
        .with_column("age", ColumnType::Int32);
    let mut table = Table::open_in(temp.path(), "people", catalog).unwrap();
    table.insert(&["alice", "30"]).unwrap();
    table.insert(&["bob", "25"]).unwrap();

    let pairs = nested_loop_join(&table, &table, "age", "age").unwrap();

    let off0 = offset(&table, 0);
    let off1 = offset(&table, 1);
    assert_eq!(
        pairs,
        vec![
            JoinPair { inner: off0, outer: off0 },
            JoinPair { inner: off1, outer: off1 },
        ]
    );
}

#[test]
fn test_join_with_empty_table() {
    let temp = TempDir::new().unwrap();
    let (person, _worked) = person_and_worked(temp.path());
    let empty = Table::open_in(
        temp.path(),
        "empty",
        Catalog::new().with_column("dre", ColumnType::Int32),
    )
    .unwrap();

    assert!(nested_loop_join(&person, &empty, "dre", "dre").unwrap().is_empty());
    assert!(nested_loop_join(&empty, &person, "dre", "dre").unwrap().is_empty());
}

#[test]
fn test_join_unknown_column() {
    let temp = TempDir::new().unwrap();
    let (person, worked) = person_and_worked(temp.path());

    let err = nested_loop_join(&person, &worked, "salary", "id_person").unwrap_err();
    assert!(matches!(err, HeapError::UnknownColumn(_)));

    let err = nested_loop_join(&person, &worked, "dre", "salary").unwrap_err();
    assert!(matches!(err, HeapError::UnknownColumn(_)));
}

// =============================================================================
// Index Nested-Loop Join Tests
// =============================================================================

#[test]
fn test_index_nested_loop_join_pins_inner_row() {
    let temp = TempDir::new().unwrap();
    let (person, worked) = person_and_worked(temp.path());

    let pairs = index_nested_loop_join(&person, &worked, "id_person", "dre", 1).unwrap();

    assert_eq!(
        pairs,
        vec![
            JoinPair { inner: offset(&person, 1), outer: offset(&worked, 1) },
            JoinPair { inner: offset(&person, 1), outer: offset(&worked, 2) },
        ]
    );
}

#[test]
fn test_index_nested_loop_join_no_match() {
    let temp = TempDir::new().unwrap();
    let (person, mut worked) = person_and_worked(temp.path());
    worked.drop().unwrap();
    worked.insert(&["1", "99"]).unwrap();

    let pairs = index_nested_loop_join(&person, &worked, "id_person", "dre", 0).unwrap();
    assert!(pairs.is_empty());
}

#[test]
fn test_index_nested_loop_join_position_out_of_range() {
    let temp = TempDir::new().unwrap();
    let (person, worked) = person_and_worked(temp.path());

    let err = index_nested_loop_join(&person, &worked, "id_person", "dre", 2).unwrap_err();
    assert!(matches!(
        err,
        HeapError::PositionOutOfRange { position: 2, len: 2 }
    ));
}

#[test]
fn test_index_nested_loop_join_all_matches_nested_loop() {
    let temp = TempDir::new().unwrap();
    let (person, worked) = person_and_worked(temp.path());

    let driven = index_nested_loop_join_all(&person, &worked, "id_person", "dre").unwrap();
    let nested = nested_loop_join(&person, &worked, "dre", "id_person").unwrap();

    assert_eq!(driven, nested);
}

// =============================================================================
// Materialization Tests
// =============================================================================

#[test]
fn test_materialize_pairs() {
    let temp = TempDir::new().unwrap();
    let (person, worked) = person_and_worked(temp.path());
    let pairs = nested_loop_join(&person, &worked, "dre", "id_person").unwrap();

    let rows = materialize(&person, &worked, &pairs).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].0, vec!["9", "Jhoe"]);
    assert_eq!(rows[0].1, vec!["77", "9"]);
    assert_eq!(rows[2].0, vec!["10", "Marta"]);
    assert_eq!(rows[2].1, vec!["44", "10"]);
}
