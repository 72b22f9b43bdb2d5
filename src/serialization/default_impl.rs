//! Value-carrying layout: wider base field plus a trailing value array.

use super::{packed_field, SerializeError, TrieSerializer};
use crate::dictionary::value::TrieValue;
use std::io::Write;

/// Serializer keeping the full value array.
///
/// Records pack check into bits 0-7 and base into bits 8-31; the
/// terminal bit is unnecessary because terminality is recoverable from
/// the value sentinel. After the records, one little-endian value of
/// [`TrieValue::WIDTH`] bytes follows per state. The value array sits
/// past the declared payload size, mirroring the record count.
pub struct DefaultSerializer;

impl<V: TrieValue> TrieSerializer<V> for DefaultSerializer {
    fn write_states<W: Write>(
        &self,
        writer: &mut W,
        base: &[i32],
        check: &[i32],
        values: &[V],
    ) -> Result<usize, SerializeError> {
        for (i, (&b, &c)) in base.iter().zip(check).enumerate() {
            let record = if i > 0 && c <= 0 {
                0u32
            } else {
                let check = packed_field(i, "check", c, 8)?;
                let base = packed_field(i, "base", b, 24)?;
                check | (base << 8)
            };
            writer.write_all(&record.to_le_bytes())?;
        }

        for &value in values {
            writer.write_all(&value.to_le()[..V::WIDTH])?;
        }
        Ok(base.len() * (4 + V::WIDTH))
    }
}
