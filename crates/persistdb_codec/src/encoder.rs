//! Canonical CBOR encoder.

use crate::error::{CodecError, CodecResult};
use crate::table::RootTable;
use crate::value::Value;

/// Maximum nesting depth the codec accepts.
///
/// Values are cycle-free by construction, but a pathologically deep structure
/// would still blow the decoder's recursion, so both directions enforce the
/// same bound.
pub const MAX_DEPTH: usize = 64;

/// Encode a root table to canonical CBOR bytes.
///
/// The table encodes as a definite-length CBOR map with text keys, following
/// the canonical rules of RFC 8949 Section 4.2.1: map keys sorted by their
/// encoded form (length-first, then bytewise), shortest-form integers, no
/// indefinite-length items. Identical tables always produce identical bytes.
///
/// # Errors
///
/// Returns an error if a value is nested deeper than [`MAX_DEPTH`] or a
/// nested map contains duplicate keys.
pub fn encode_table(table: &RootTable) -> CodecResult<Vec<u8>> {
    let mut encoder = CanonicalEncoder::new();
    encoder.encode_unsigned(5, table.len() as u64);
    // RootTable entries are already in canonical key order
    for (key, value) in table.iter() {
        encoder.encode_text(key);
        encoder.encode_at_depth(value, 1)?;
    }
    Ok(encoder.into_bytes())
}

/// Encode a single value to canonical CBOR bytes.
///
/// # Errors
///
/// Returns an error if the value is nested deeper than [`MAX_DEPTH`] or a
/// map contains duplicate keys.
pub fn encode_value(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = CanonicalEncoder::new();
    encoder.encode_at_depth(value, 0)?;
    Ok(encoder.into_bytes())
}

/// A canonical CBOR encoder.
///
/// Produces deterministic output suitable for byte-identical comparison of
/// persisted snapshots.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buffer: Vec<u8>,
}

impl CanonicalEncoder {
    /// Create a new encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is nested deeper than [`MAX_DEPTH`].
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        self.encode_at_depth(value, 0)
    }

    /// Consume this encoder and return the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn encode_at_depth(&mut self, value: &Value, depth: usize) -> CodecResult<()> {
        if depth > MAX_DEPTH {
            return Err(CodecError::DepthLimitExceeded {
                max_allowed: MAX_DEPTH,
            });
        }

        match value {
            Value::Null => {
                self.buffer.push(0xf6);
                Ok(())
            }
            Value::Bool(b) => {
                self.buffer.push(if *b { 0xf5 } else { 0xf4 });
                Ok(())
            }
            Value::Integer(n) => {
                self.encode_integer(*n);
                Ok(())
            }
            Value::Bytes(b) => {
                self.encode_unsigned(2, b.len() as u64);
                self.buffer.extend_from_slice(b);
                Ok(())
            }
            Value::Text(s) => {
                self.encode_text(s);
                Ok(())
            }
            Value::Array(items) => {
                self.encode_unsigned(4, items.len() as u64);
                for item in items {
                    self.encode_at_depth(item, depth + 1)?;
                }
                Ok(())
            }
            Value::Map(pairs) => self.encode_map(pairs, depth),
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn encode_integer(&mut self, n: i64) {
        if n >= 0 {
            self.encode_unsigned(0, n as u64);
        } else {
            // CBOR negative integers carry -1 - n as the argument,
            // so the full i64 range fits without overflow.
            self.encode_unsigned(1, (-(n + 1)) as u64);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn encode_unsigned(&mut self, major_type: u8, value: u64) {
        let mt = major_type << 5;

        if value < 24 {
            self.buffer.push(mt | (value as u8));
        } else if u8::try_from(value).is_ok() {
            self.buffer.push(mt | 24);
            self.buffer.push(value as u8);
        } else if u16::try_from(value).is_ok() {
            self.buffer.push(mt | 25);
            self.buffer.extend_from_slice(&(value as u16).to_be_bytes());
        } else if u32::try_from(value).is_ok() {
            self.buffer.push(mt | 26);
            self.buffer.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buffer.push(mt | 27);
            self.buffer.extend_from_slice(&value.to_be_bytes());
        }
    }

    fn encode_text(&mut self, text: &str) {
        self.encode_unsigned(3, text.len() as u64);
        self.buffer.extend_from_slice(text.as_bytes());
    }

    fn encode_map(&mut self, pairs: &[(Value, Value)], depth: usize) -> CodecResult<()> {
        // Sort by the encoded key form even if the caller built the Vec by
        // hand; Value::map already sorts, but Value::Map(..) may not be.
        let mut encoded: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let mut key_encoder = CanonicalEncoder::new();
            key_encoder.encode_at_depth(key, depth + 1)?;
            encoded.push((key_encoder.into_bytes(), value));
        }
        encoded.sort_by(|a, b| match a.0.len().cmp(&b.0.len()) {
            std::cmp::Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });

        // Duplicate keys would encode as non-canonical bytes that the strict
        // decoder refuses, so they must never reach the wire.
        for window in encoded.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(CodecError::invalid_structure("duplicate map keys"));
            }
        }

        self.encode_unsigned(5, pairs.len() as u64);
        for (key_bytes, value) in encoded {
            self.buffer.extend_from_slice(&key_bytes);
            self.encode_at_depth(value, depth + 1)?;
        }
        Ok(())
    }
}
