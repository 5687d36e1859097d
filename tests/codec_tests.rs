//! Tests for the Record Codec and Row Header
//!
//! These tests verify:
//! - Round-trip of every column type, including boundary values
//! - Fixed-width char padding and truncation
//! - Rejection of malformed and overflowing numbers
//! - Field count validation
//! - Row Header layout

use bytes::BytesMut;
use heapdb::record::{decode_row, decode_values, encode_row, RowHeader, Value, TABLE_NAME_WIDTH};
use heapdb::{Catalog, ColumnType, HeapError};

// =============================================================================
// Helper Functions
// =============================================================================

fn all_types_catalog() -> Catalog {
    Catalog::new()
        .with_column("i32", ColumnType::Int32)
        .with_column("i64", ColumnType::Int64)
        .with_column("f32", ColumnType::Float32)
        .with_column("f64", ColumnType::Float64)
        .with_char("text", 8)
        .with_column("fk", ColumnType::ForeignKey)
}

fn encode(row: &[&str], catalog: &Catalog) -> Result<BytesMut, HeapError> {
    let mut buf = BytesMut::new();
    encode_row(row, catalog, &mut buf)?;
    Ok(buf)
}

fn round_trip(row: &[&str], catalog: &Catalog) -> Vec<String> {
    let buf = encode(row, catalog).unwrap();
    assert_eq!(buf.len(), catalog.total_width() as usize);
    decode_row(&buf, catalog).unwrap()
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_round_trip_all_types() {
    let catalog = all_types_catalog();
    let row = ["42", "-9000000000", "1.5", "-0.125", "hello", "7"];

    assert_eq!(round_trip(&row, &catalog), row);
}

#[test]
fn test_round_trip_integer_bounds() {
    let catalog = all_types_catalog();

    let max = i32::MAX.to_string();
    let big = i64::MAX.to_string();
    let fk = i64::MAX.to_string();
    let row = [max.as_str(), big.as_str(), "0", "0", "", fk.as_str()];
    assert_eq!(round_trip(&row, &catalog), row);

    let min = i32::MIN.to_string();
    let small = i64::MIN.to_string();
    let row = [min.as_str(), small.as_str(), "0", "0", "", "0"];
    assert_eq!(round_trip(&row, &catalog), row);
}

#[test]
fn test_round_trip_text_boundaries() {
    let catalog = Catalog::new().with_char("text", 8);

    assert_eq!(round_trip(&[""], &catalog), vec![""]);
    assert_eq!(round_trip(&["12345678"], &catalog), vec!["12345678"]);
    assert_eq!(round_trip(&["with spc"], &catalog), vec!["with spc"]);
}

#[test]
fn test_text_is_truncated_to_width() {
    let catalog = Catalog::new().with_char("text", 4);

    assert_eq!(round_trip(&["abcdefgh"], &catalog), vec!["abcd"]);
}

#[test]
fn test_text_truncation_keeps_whole_characters() {
    let catalog = Catalog::new().with_char("text", 2);

    // 'é' is two bytes and would straddle the width
    assert_eq!(round_trip(&["héllo"], &catalog), vec!["h"]);
}

#[test]
fn test_text_is_zero_padded() {
    let catalog = Catalog::new().with_char("text", 6);
    let buf = encode(&["ab"], &catalog).unwrap();

    assert_eq!(&buf[..], b"ab\0\0\0\0");
}

#[test]
fn test_numbers_are_trimmed_and_canonicalized() {
    let catalog = Catalog::new()
        .with_column("n", ColumnType::Int32)
        .with_column("x", ColumnType::Float64);

    assert_eq!(round_trip(&[" 007 ", "30.0"], &catalog), vec!["7", "30"]);
}

#[test]
fn test_integers_are_little_endian() {
    let catalog = Catalog::new().with_column("n", ColumnType::Int32);
    let buf = encode(&["1"], &catalog).unwrap();

    assert_eq!(&buf[..], &[1, 0, 0, 0]);
}

#[test]
fn test_decode_values_are_typed() {
    let catalog = all_types_catalog();
    let buf = encode(&["1", "2", "0.5", "0.25", "x", "3"], &catalog).unwrap();

    let values = decode_values(&buf, &catalog).unwrap();
    assert_eq!(
        values,
        vec![
            Value::Int32(1),
            Value::Int64(2),
            Value::Float32(0.5),
            Value::Float64(0.25),
            Value::Text("x".to_string()),
            Value::ForeignKey(3),
        ]
    );
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_unparsable_integer_is_rejected() {
    let catalog = Catalog::new().with_column("age", ColumnType::Int32);

    let err = encode(&["thirty"], &catalog).unwrap_err();
    match err {
        HeapError::MalformedValue { column, value, .. } => {
            assert_eq!(column, "age");
            assert_eq!(value, "thirty");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_integer_overflow_is_rejected() {
    let catalog = Catalog::new()
        .with_column("small", ColumnType::Int32)
        .with_column("big", ColumnType::Int64);

    assert!(matches!(
        encode(&["2147483648", "0"], &catalog),
        Err(HeapError::MalformedValue { .. })
    ));
    assert!(matches!(
        encode(&["0", "9223372036854775808"], &catalog),
        Err(HeapError::MalformedValue { .. })
    ));
}

#[test]
fn test_unparsable_float_is_rejected() {
    let catalog = Catalog::new().with_column("score", ColumnType::Float32);

    assert!(matches!(
        encode(&["1.2.3"], &catalog),
        Err(HeapError::MalformedValue { .. })
    ));
    assert!(matches!(
        encode(&[""], &catalog),
        Err(HeapError::MalformedValue { .. })
    ));
}

#[test]
fn test_non_finite_float_is_rejected() {
    let catalog = Catalog::new()
        .with_column("narrow", ColumnType::Float32)
        .with_column("wide", ColumnType::Float64);

    let cases = [
        ["1e40", "0"],
        ["0", "1e400"],
        ["inf", "0"],
        ["0", "-infinity"],
        ["NaN", "0"],
        ["0", "nan"],
    ];
    for row in cases {
        assert!(
            matches!(encode(&row, &catalog), Err(HeapError::MalformedValue { .. })),
            "expected rejection of {:?}",
            row
        );
    }

    // Large but finite values are kept
    let buf = encode(&["3.4e38", "1e300"], &catalog).unwrap();
    assert_eq!(
        decode_values(&buf, &catalog).unwrap(),
        vec![Value::Float32(3.4e38), Value::Float64(1e300)]
    );
}

#[test]
fn test_field_count_mismatch() {
    let catalog = Catalog::new()
        .with_char("name", 10)
        .with_column("age", ColumnType::Int32);

    let mut buf = BytesMut::new();
    let err = encode_row(&["alice"], &catalog, &mut buf).unwrap_err();

    assert!(matches!(
        err,
        HeapError::SchemaMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert!(buf.is_empty());
}

#[test]
fn test_decode_short_buffer() {
    let catalog = all_types_catalog();

    let err = decode_row(&[0u8; 5], &catalog).unwrap_err();
    assert!(matches!(err, HeapError::ShortBuffer { actual: 5, .. }));
}

// =============================================================================
// Row Header Tests
// =============================================================================

#[test]
fn test_header_layout() {
    assert_eq!(RowHeader::encoded_len(), 255 + 4 + 8);

    let header = RowHeader {
        table_name: "people".to_string(),
        registry_size: 281,
        timestamp: 1_700_000_000,
    };
    let mut buf = BytesMut::new();
    header.encode(&mut buf);

    assert_eq!(buf.len(), RowHeader::encoded_len() as usize);
    assert_eq!(&buf[..6], b"people");
    assert_eq!(buf[6], 0);
    assert_eq!(&buf[TABLE_NAME_WIDTH..TABLE_NAME_WIDTH + 4], &281u32.to_le_bytes());
    assert_eq!(RowHeader::decode(&buf).unwrap(), header);
}

#[test]
fn test_header_truncates_long_name() {
    let long_name = "t".repeat(300);
    let header = RowHeader::new(&long_name, 300);

    let mut buf = BytesMut::new();
    header.encode(&mut buf);
    assert_eq!(buf.len(), RowHeader::encoded_len() as usize);

    let decoded = RowHeader::decode(&buf).unwrap();
    assert_eq!(decoded.table_name.len(), TABLE_NAME_WIDTH);
    assert_eq!(decoded.registry_size, 300);
}
