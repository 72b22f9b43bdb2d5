//! Terminal-bit layout that discards the stored values.

use super::{write_terminal_records, SerializeError, TrieSerializer};
use crate::dictionary::value::TrieValue;
use std::io::Write;

/// Serializer keeping presence only: one terminal bit per state, no
/// value array.
///
/// A reloaded trie can answer "is this key present" but not "what is its
/// value"; see [`CompactDoubleArrayTrie`](crate::dictionary::CompactDoubleArrayTrie).
pub struct NoValueSerializer;

impl<V: TrieValue> TrieSerializer<V> for NoValueSerializer {
    fn write_states<W: Write>(
        &self,
        writer: &mut W,
        base: &[i32],
        check: &[i32],
        values: &[V],
    ) -> Result<usize, SerializeError> {
        write_terminal_records(writer, base, check, values)
    }
}
