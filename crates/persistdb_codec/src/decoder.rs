//! Canonical CBOR decoder.

use crate::encoder::MAX_DEPTH;
use crate::error::{CodecError, CodecResult};
use crate::table::{canonical_key_cmp, RootTable};
use crate::value::Value;

/// Maximum allowed element count for arrays and maps.
/// Guards against allocation bombs in a corrupted or hostile file.
const MAX_CONTAINER_ELEMENTS: u64 = 16 * 1024 * 1024;

/// Maximum allowed byte/string length (256 MB).
const MAX_BYTES_LENGTH: u64 = 256 * 1024 * 1024;

/// Decode a root table from canonical CBOR bytes.
///
/// The input must be exactly one definite-length map with text keys in
/// canonical order, with nothing following it. An empty byte stream is a
/// decoding failure, not an empty table: the store always persists at least
/// the empty-map encoding.
///
/// # Errors
///
/// Returns an error for empty, truncated, non-canonical, or otherwise
/// malformed input.
pub fn decode_table(bytes: &[u8]) -> CodecResult<RootTable> {
    if bytes.is_empty() {
        return Err(CodecError::decoding_failed("empty byte stream"));
    }

    let mut decoder = CanonicalDecoder::new(bytes);
    let table = decoder.decode_root_table()?;
    if !decoder.is_empty() {
        return Err(CodecError::invalid_structure(
            "trailing bytes after root table",
        ));
    }
    Ok(table)
}

/// Decode a single value from canonical CBOR bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not one complete canonical value.
pub fn decode_value(bytes: &[u8]) -> CodecResult<Value> {
    if bytes.is_empty() {
        return Err(CodecError::decoding_failed("empty byte stream"));
    }

    let mut decoder = CanonicalDecoder::new(bytes);
    let value = decoder.decode_at_depth(0)?;
    if !decoder.is_empty() {
        return Err(CodecError::invalid_structure("trailing bytes after value"));
    }
    Ok(value)
}

/// A canonical CBOR decoder.
///
/// Validates that input follows the canonical rules (shortest-form integers,
/// sorted map keys, definite lengths) and rejects forbidden constructs
/// rather than guessing at their meaning.
#[derive(Debug)]
pub struct CanonicalDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> CanonicalDecoder<'a> {
    /// Create a new decoder over the given bytes.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Check if all bytes have been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Decode the top-level root table map.
    fn decode_root_table(&mut self) -> CodecResult<RootTable> {
        let initial = self.read_byte()?;
        if initial >> 5 != 5 {
            return Err(CodecError::invalid_structure(
                "root value is not a map",
            ));
        }

        let len = self.container_len(initial & 0x1f, MAX_CONTAINER_ELEMENTS)?;
        let mut table = RootTable::new();
        let mut prev_key: Option<String> = None;

        for _ in 0..len {
            let key = match self.decode_at_depth(1)? {
                Value::Text(s) => s,
                _ => {
                    return Err(CodecError::invalid_structure(
                        "root table key is not a text string",
                    ))
                }
            };

            // Keys must be strictly increasing in canonical order; this also
            // rules out duplicates.
            if let Some(ref prev) = prev_key {
                if canonical_key_cmp(prev, &key) != std::cmp::Ordering::Less {
                    return Err(CodecError::invalid_structure(
                        "root table keys not in canonical order",
                    ));
                }
            }

            let value = self.decode_at_depth(1)?;
            table.push_sorted(key.clone(), value);
            prev_key = Some(key);
        }

        Ok(table)
    }

    /// Decode the next value.
    fn decode_at_depth(&mut self, depth: usize) -> CodecResult<Value> {
        if depth > MAX_DEPTH {
            return Err(CodecError::DepthLimitExceeded {
                max_allowed: MAX_DEPTH,
            });
        }

        let initial = self.read_byte()?;
        let major_type = initial >> 5;
        let additional = initial & 0x1f;

        match major_type {
            0 => {
                let n = self.decode_unsigned(additional)?;
                let n = i64::try_from(n).map_err(|_| CodecError::IntegerOverflow)?;
                Ok(Value::Integer(n))
            }
            1 => {
                let n = self.decode_unsigned(additional)?;
                // Value is -1 - n; anything past i64::MAX as the argument
                // would underflow i64.
                let n = i64::try_from(n).map_err(|_| CodecError::IntegerOverflow)?;
                Ok(Value::Integer(-1 - n))
            }
            2 => {
                let len = self.container_len(additional, MAX_BYTES_LENGTH)?;
                let bytes = self.read_bytes(len)?;
                Ok(Value::Bytes(bytes.to_vec()))
            }
            3 => {
                let len = self.container_len(additional, MAX_BYTES_LENGTH)?;
                let bytes = self.read_bytes(len)?;
                let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
                Ok(Value::Text(text.to_string()))
            }
            4 => {
                let len = self.container_len(additional, MAX_CONTAINER_ELEMENTS)?;
                let mut items = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    items.push(self.decode_at_depth(depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            5 => self.decode_map(additional, depth),
            6 => Err(CodecError::invalid_structure(
                "tagged values are not part of this format",
            )),
            7 => self.decode_simple(additional),
            _ => unreachable!("major type is three bits"),
        }
    }

    fn decode_map(&mut self, additional: u8, depth: usize) -> CodecResult<Value> {
        let data = self.data;
        let len = self.container_len(additional, MAX_CONTAINER_ELEMENTS)?;
        let mut pairs = Vec::with_capacity(len.min(4096));
        let mut prev_key_bytes: Option<&'a [u8]> = None;

        for _ in 0..len {
            let key_start = self.pos;
            let key = self.decode_at_depth(depth + 1)?;
            let key_bytes = &data[key_start..self.pos];

            // Keys must be strictly increasing by encoded form
            if let Some(prev) = prev_key_bytes {
                let ordering = match prev.len().cmp(&key_bytes.len()) {
                    std::cmp::Ordering::Equal => prev.cmp(key_bytes),
                    other => other,
                };
                if ordering != std::cmp::Ordering::Less {
                    return Err(CodecError::invalid_structure(
                        "map keys not in canonical order",
                    ));
                }
            }
            prev_key_bytes = Some(key_bytes);

            let value = self.decode_at_depth(depth + 1)?;
            pairs.push((key, value));
        }

        Ok(Value::Map(pairs))
    }

    fn decode_simple(&mut self, additional: u8) -> CodecResult<Value> {
        match additional {
            20 => Ok(Value::Bool(false)),
            21 => Ok(Value::Bool(true)),
            22 => Ok(Value::Null),
            25..=27 => Err(CodecError::FloatForbidden),
            31 => Err(CodecError::IndefiniteLengthForbidden),
            _ => Err(CodecError::invalid_structure("unsupported simple value")),
        }
    }

    /// Decode a length argument and check it against `max`.
    fn container_len(&mut self, additional: u8, max: u64) -> CodecResult<usize> {
        if additional == 31 {
            return Err(CodecError::IndefiniteLengthForbidden);
        }
        let len = self.decode_unsigned(additional)?;
        if len > max {
            return Err(CodecError::SizeLimitExceeded {
                claimed: len,
                max_allowed: max,
            });
        }
        usize::try_from(len).map_err(|_| CodecError::IntegerOverflow)
    }

    #[inline]
    fn decode_unsigned(&mut self, additional: u8) -> CodecResult<u64> {
        match additional {
            0..=23 => Ok(u64::from(additional)),
            24 => {
                let byte = self.read_byte()?;
                if byte < 24 {
                    return Err(Self::non_canonical());
                }
                Ok(u64::from(byte))
            }
            25 => {
                let bytes = self.read_bytes(2)?;
                let value = u16::from_be_bytes([bytes[0], bytes[1]]);
                if u8::try_from(value).is_ok() {
                    return Err(Self::non_canonical());
                }
                Ok(u64::from(value))
            }
            26 => {
                let bytes = self.read_bytes(4)?;
                let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                if u16::try_from(value).is_ok() {
                    return Err(Self::non_canonical());
                }
                Ok(u64::from(value))
            }
            27 => {
                let bytes = self.read_bytes(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                let value = u64::from_be_bytes(raw);
                if u32::try_from(value).is_ok() {
                    return Err(Self::non_canonical());
                }
                Ok(value)
            }
            28..=30 => Err(CodecError::invalid_structure("reserved additional info")),
            31 => Err(CodecError::IndefiniteLengthForbidden),
            _ => unreachable!("additional info is five bits"),
        }
    }

    fn non_canonical() -> CodecError {
        CodecError::invalid_structure("non-canonical: value could be encoded in fewer bytes")
    }

    #[inline]
    fn read_byte(&mut self) -> CodecResult<u8> {
        if self.pos >= self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.pos + len > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}
