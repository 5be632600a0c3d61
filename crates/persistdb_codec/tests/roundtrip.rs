//! Property-based round-trip tests for the codec.

use persistdb_codec::{
    decode_table, decode_value, encode_table, encode_value, CodecError, RootTable, Value,
};
use proptest::prelude::*;

/// Strategy for arbitrary (bounded-depth) values.
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::Text),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4).prop_map(|m| {
                Value::map(
                    m.into_iter()
                        .map(|(k, v)| (Value::Text(k), v))
                        .collect(),
                )
            }),
        ]
    })
}

fn table_strategy() -> impl Strategy<Value = RootTable> {
    prop::collection::btree_map("[a-z_]{1,12}", value_strategy(), 0..8)
        .prop_map(|m| m.into_iter().collect())
}

#[test]
fn duplicate_keyed_map_literal_fails_to_encode() {
    let literal = Value::Map(vec![
        (Value::Text("a".to_string()), Value::Integer(1)),
        (Value::Text("a".to_string()), Value::Integer(2)),
    ]);

    assert!(matches!(
        encode_value(&literal),
        Err(CodecError::InvalidStructure { .. })
    ));
}

#[test]
fn unsorted_map_literal_round_trips_canonicalized() {
    // A hand-built Map in the wrong order encodes sorted, so the decoded
    // value is the canonical form of the same pairs.
    let literal = Value::Map(vec![
        (Value::Text("bb".to_string()), Value::Integer(2)),
        (Value::Text("a".to_string()), Value::Integer(1)),
    ]);
    let canonical = Value::map(vec![
        (Value::Text("bb".to_string()), Value::Integer(2)),
        (Value::Text("a".to_string()), Value::Integer(1)),
    ]);

    let bytes = encode_value(&literal).unwrap();
    assert_eq!(decode_value(&bytes).unwrap(), canonical);
}

proptest! {
    #[test]
    fn table_round_trip(table in table_strategy()) {
        let bytes = encode_table(&table).unwrap();
        prop_assert_eq!(decode_table(&bytes).unwrap(), table);
    }

    #[test]
    fn encoding_is_canonical(table in table_strategy()) {
        // Same table, same bytes - and re-encoding the decoded table is
        // byte-identical too.
        let bytes = encode_table(&table).unwrap();
        let decoded = decode_table(&bytes).unwrap();
        prop_assert_eq!(encode_table(&decoded).unwrap(), bytes);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        // Garbage input must fail cleanly, not crash or misread.
        let _ = decode_table(&bytes);
    }
}
