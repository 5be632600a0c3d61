//! # persistdb Codec
//!
//! Canonical CBOR encoding/decoding for persistdb.
//!
//! This crate defines the closed value model the store persists and the
//! deterministic byte format it is written in:
//! - Identical tables produce identical bytes
//! - Insertion order never leaks into the encoding
//! - Malformed or truncated input fails loudly instead of being misread
//!
//! ## Canonical CBOR Rules
//!
//! - Maps are sorted by key (bytewise comparison of encoded keys)
//! - Integers use shortest encoding
//! - No floats, no indefinite-length items, no tags
//! - Strings must be UTF-8
//! - Nesting depth is bounded by [`MAX_DEPTH`]
//!
//! ## Usage
//!
//! ```
//! use persistdb_codec::{decode_table, encode_table, RootTable, Value};
//!
//! let mut table = RootTable::new();
//! table.insert("sky", Value::from("blue"));
//!
//! let bytes = encode_table(&table).unwrap();
//! assert_eq!(decode_table(&bytes).unwrap(), table);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod table;
mod value;

pub use decoder::{decode_table, decode_value, CanonicalDecoder};
pub use encoder::{encode_table, encode_value, CanonicalEncoder, MAX_DEPTH};
pub use error::{CodecError, CodecResult};
pub use table::RootTable;
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_scalars() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Integer(42),
            Value::Integer(-100),
            Value::Text("hello world".to_string()),
            Value::Bytes(vec![1, 2, 3, 4, 5]),
        ] {
            let bytes = encode_value(&value).unwrap();
            assert_eq!(decode_value(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn roundtrip_nested() {
        let value = Value::map(vec![
            (
                Value::Text("users".to_string()),
                Value::Array(vec![
                    Value::map(vec![
                        (Value::Text("name".to_string()), Value::from("Alice")),
                        (Value::Text("age".to_string()), Value::Integer(30)),
                    ]),
                    Value::map(vec![
                        (Value::Text("name".to_string()), Value::from("Bob")),
                        (Value::Text("age".to_string()), Value::Integer(25)),
                    ]),
                ]),
            ),
            (Value::Text("count".to_string()), Value::Integer(2)),
        ]);

        let bytes = encode_value(&value).unwrap();
        assert_eq!(decode_value(&bytes).unwrap(), value);
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut table = RootTable::new();
        table.insert("weather", Value::from("sunny"));
        table.insert("hour", Value::from("midday"));

        assert_eq!(encode_table(&table).unwrap(), encode_table(&table).unwrap());
    }
}
