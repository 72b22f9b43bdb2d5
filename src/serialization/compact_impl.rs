//! Terminal-bit layout for tries whose values are implicit.

use super::{write_terminal_records, SerializeError, TrieSerializer};
use crate::dictionary::value::TrieValue;
use std::io::Write;

/// Serializer for dictionaries whose values carry no information beyond
/// membership (a 0/1 flag, or the key's own position).
///
/// The record layout is identical to
/// [`NoValueSerializer`](super::NoValueSerializer); the distinct type
/// documents that nothing was lost by dropping the value array.
pub struct CompactSerializer;

impl<V: TrieValue> TrieSerializer<V> for CompactSerializer {
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
