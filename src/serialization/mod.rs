//! Bit-packed persistence for double-array tries.
//!
//! Every layout shares the same little-endian framing:
//!
//! ```text
//! offset  bytes  field
//! 0       4      size_sum     payload bytes after this field (charmap + records)
//! 4       256    charmap      byte -> remapped id, 0 = absent
//! 260     4*N    records      one u32 per state
//! ```
//!
//! Three record layouts exist:
//!
//! | Serializer | Record bits | Trailing data |
//! |------------|-------------|---------------|
//! | [`NoValueSerializer`] | terminal:1, check:8, base:23 | none |
//! | [`CompactSerializer`] | terminal:1, check:8, base:23 | none |
//! | [`DefaultSerializer`] | check:8, base:24 | `N` values, little-endian |
//!
//! The terminal-bit layouts drop the stored values and keep only "a key
//! ends here"; [`CompactSerializer`] is the spelling used when values are
//! implicit (a 0/1 membership flag), [`NoValueSerializer`] when they are
//! deliberately discarded. [`DefaultSerializer`] keeps the full value
//! array after the records; those trailing bytes are not counted by
//! `size_sum`.
//!
//! Free slots serialize as all-zero records. Their in-memory form holds
//! negated free-list indices, and bit-casting those would let a low byte
//! collide with a real check id; a zero check can never match since ids
//! start at 1.
//!
//! Base fields must fit their record width (23 or 24 bits) and check
//! fields one byte. A violation fails the write with
//! [`SerializeError::Overflow`]; the charmap layout keeps bases far below
//! these limits for lexicon-sized inputs.

mod compact_impl;
mod default_impl;
mod no_value_impl;

pub use compact_impl::CompactSerializer;
pub use default_impl::DefaultSerializer;
pub use no_value_impl::NoValueSerializer;

use crate::dictionary::value::TrieValue;
use std::io::Write;

/// Record writer for one on-disk layout.
///
/// [`DoubleArrayTrie::save`](crate::dictionary::DoubleArrayTrie::save)
/// writes the size field and charmap, then hands the arrays to
/// `write_states`.
pub trait TrieSerializer<V: TrieValue> {
    /// Bytes of record data declared in the size field for `states`
    /// states. Trailing value arrays are written past the declared
    /// payload and not counted here.
    fn record_bytes(&self, states: usize) -> usize {
        states * 4
    }

    /// Write all state records (and any trailing data), returning the
    /// bytes written.
    fn write_states<W: Write>(
        &self,
        writer: &mut W,
        base: &[i32],
        check: &[i32],
        values: &[V],
    ) -> Result<usize, SerializeError>;
}

/// Errors surfaced while writing a trie to a sink.
///
/// The sink is left in an unspecified partial state; callers should
/// discard the incomplete output.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// A base or check value does not fit its bit-packed field.
    #[error("{field} {value} at state {state} exceeds {bits} bits")]
    Overflow {
        /// Index of the offending state.
        state: usize,
        /// Which field overflowed.
        field: &'static str,
        /// The value that did not fit.
        value: i64,
        /// Width of the record field.
        bits: u32,
    },
    /// The sink failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced while loading a trie from a source.
///
/// A partially filled reader is dropped; only a fully loaded structure
/// is returned.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The declared size is not a charmap plus a whole number of records.
    #[error("declared payload of {size_sum} bytes is not a charmap plus whole records")]
    BadHeader {
        /// The size field as read.
        size_sum: u32,
    },
    /// The input ended before the declared payload.
    #[error("input ended before the declared payload")]
    ShortRead,
    /// The source failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Validate that `value` is a non-negative integer of at most `bits`
/// bits.
fn packed_field(
    state: usize,
    field: &'static str,
    value: i32,
    bits: u32,
) -> Result<u32, SerializeError> {
    if value < 0 || (value as i64) >= (1i64 << bits) {
        return Err(SerializeError::Overflow {
            state,
            field,
            value: value as i64,
            bits,
        });
    }
    Ok(value as u32)
}

/// Shared body of the two terminal-bit layouts: bit 0 terminal, bits 1-8
/// check, bits 9-31 base.
pub(crate) fn write_terminal_records<V, W>(
    writer: &mut W,
    base: &[i32],
    check: &[i32],
    values: &[V],
) -> Result<usize, SerializeError>
where
    V: TrieValue,
    W: Write,
{
    for (i, ((&b, &c), &v)) in base.iter().zip(check).zip(values).enumerate() {
        let record = if i > 0 && c <= 0 {
            0u32
        } else {
            let terminal = u32::from(!v.is_default());
            let check = packed_field(i, "check", c, 8)?;
            let base = packed_field(i, "base", b, 23)?;
            terminal | (check << 1) | (base << 9)
        };
        writer.write_all(&record.to_le_bytes())?;
    }
    Ok(base.len() * 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_record_bit_layout() {
        let mut out = Vec::new();
        // Root with base 2, one terminal child with check 1.
        write_terminal_records::<i32, _>(&mut out, &[2, 0], &[0, 1], &[-1, 7]).unwrap();
        let root = u32::from_le_bytes(out[0..4].try_into().unwrap());
        let child = u32::from_le_bytes(out[4..8].try_into().unwrap());
        assert_eq!(root, 2 << 9);
        assert_eq!(child, 1 | (1 << 1));
    }

    #[test]
    fn test_free_slots_serialize_as_zero() {
        let mut out = Vec::new();
        write_terminal_records::<i32, _>(&mut out, &[1, -3, 0], &[0, -2, 1], &[-1, -1, 0])
            .unwrap();
        assert_eq!(&out[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_base_overflow_is_fatal() {
        let mut out = Vec::new();
        let err = write_terminal_records::<i32, _>(&mut out, &[0, 1 << 23], &[0, 1], &[-1, -1])
            .unwrap_err();
        match err {
            SerializeError::Overflow { state, field, bits, .. } => {
                assert_eq!(state, 1);
                assert_eq!(field, "base");
                assert_eq!(bits, 23);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
