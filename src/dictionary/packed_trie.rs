//! Read-side double-array tries over the bit-packed file form.
//!
//! Loading consumes the whole header and record stream up front into
//! flat vectors; afterwards the structures are plain read-only data,
//! cheap to share and with no further I/O. Traversal mirrors
//! [`DoubleArrayTrie`](crate::dictionary::DoubleArrayTrie): bytes go
//! through the charmap first, and a byte absent from the lexicon
//! alphabet fails immediately.

use crate::dictionary::value::TrieValue;
use crate::dictionary::{Dictionary, StateId, TraverseResult, ValuedDictionary};
use crate::serialization::LoadError;
use std::io::Read;

const CHARMAP_BYTES: u32 = 256;

fn read_exact_or_short<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), LoadError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            LoadError::ShortRead
        } else {
            LoadError::Io(e)
        }
    })
}

/// Read the common header, returning the charmap and the record count.
fn read_header<R: Read>(reader: &mut R) -> Result<([u8; 256], usize), LoadError> {
    let mut quad = [0u8; 4];
    read_exact_or_short(reader, &mut quad)?;
    let size_sum = u32::from_le_bytes(quad);

    if size_sum <= CHARMAP_BYTES || (size_sum - CHARMAP_BYTES) % 4 != 0 {
        return Err(LoadError::BadHeader { size_sum });
    }

    let mut charmap = [0u8; 256];
    read_exact_or_short(reader, &mut charmap)?;
    Ok((charmap, ((size_sum - CHARMAP_BYTES) / 4) as usize))
}

fn read_records<R: Read>(reader: &mut R, count: usize) -> Result<Vec<u32>, LoadError> {
    let mut raw = vec![0u8; count * 4];
    read_exact_or_short(reader, &mut raw)?;
    Ok(raw
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
        .collect())
}

/// One record of the terminal-bit layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
struct PackedState(u32);

impl PackedState {
    fn terminal(self) -> bool {
        self.0 & 1 != 0
    }

    fn check(self) -> u32 {
        (self.0 >> 1) & 0xFF
    }

    fn base(self) -> u32 {
        self.0 >> 9
    }
}

/// One record of the value-carrying layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
struct ValuedState(u32);

impl ValuedState {
    fn check(self) -> u32 {
        self.0 & 0xFF
    }

    fn base(self) -> u32 {
        self.0 >> 8
    }
}

/// Membership-only reader for the terminal-bit layouts
/// ([`CompactSerializer`](crate::serialization::CompactSerializer) and
/// [`NoValueSerializer`](crate::serialization::NoValueSerializer)).
///
/// Values are not present in the file; terminality is one bit per state.
#[derive(Clone, Debug)]
pub struct CompactDoubleArrayTrie {
    charmap: [u8; 256],
    states: Vec<PackedState>,
}

impl CompactDoubleArrayTrie {
    /// Load a trie, consuming the header and every record.
    pub fn load<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        let (charmap, count) = read_header(&mut reader)?;
        let states = read_records(&mut reader, count)?
            .into_iter()
            .map(PackedState)
            .collect();
        Ok(CompactDoubleArrayTrie { charmap, states })
    }

    /// Number of state records loaded.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

impl Dictionary for CompactDoubleArrayTrie {
    type State = StateId;

    fn root(&self) -> StateId {
        0
    }

    fn traverse_from(&self, prefix: &[u8], start: StateId) -> TraverseResult<StateId> {
        let mut p = start as usize;
        if p >= self.states.len() {
            return TraverseResult {
                state: start,
                matched: false,
                matched_length: 0,
            };
        }

        for (i, &byte) in prefix.iter().enumerate() {
            let label = self.charmap[byte as usize] as u32;
            let next = (self.states[p].base() + label) as usize;
            let valid =
                label != 0 && next < self.states.len() && self.states[next].check() == label;
            if !valid {
                return TraverseResult {
                    state: p as StateId,
                    matched: false,
                    matched_length: i,
                };
            }
            p = next;
        }
        TraverseResult {
            state: p as StateId,
            matched: true,
            matched_length: prefix.len(),
        }
    }

    fn has_value_at(&self, state: StateId) -> bool {
        self.states[state as usize].terminal()
    }
}

/// Full reader for the value-carrying layout
/// ([`DefaultSerializer`](crate::serialization::DefaultSerializer)).
///
/// After the records, the trailing value array is read as one
/// little-endian value of [`TrieValue::WIDTH`] bytes per state.
#[derive(Clone, Debug)]
pub struct DefaultDoubleArrayTrie<V: TrieValue = i32> {
    charmap: [u8; 256],
    states: Vec<ValuedState>,
    values: Vec<V>,
}

impl<V: TrieValue> DefaultDoubleArrayTrie<V> {
    /// Load a trie, consuming the header, every record, and the value
    /// array.
    pub fn load<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        let (charmap, count) = read_header(&mut reader)?;
        let states: Vec<ValuedState> = read_records(&mut reader, count)?
            .into_iter()
            .map(ValuedState)
            .collect();

        let mut raw = vec![0u8; count * V::WIDTH];
        read_exact_or_short(&mut reader, &mut raw)?;
        let values = raw
            .chunks_exact(V::WIDTH)
            .map(|chunk| {
                let mut quad = [0u8; 4];
                quad[..V::WIDTH].copy_from_slice(chunk);
                V::from_le(quad)
            })
            .collect();

        Ok(DefaultDoubleArrayTrie {
            charmap,
            states,
            values,
        })
    }

    /// Number of state records loaded.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

impl<V: TrieValue> Dictionary for DefaultDoubleArrayTrie<V> {
    type State = StateId;

    fn root(&self) -> StateId {
        0
    }

    fn traverse_from(&self, prefix: &[u8], start: StateId) -> TraverseResult<StateId> {
        let mut p = start as usize;
        if p >= self.states.len() {
            return TraverseResult {
                state: start,
                matched: false,
                matched_length: 0,
            };
        }

        for (i, &byte) in prefix.iter().enumerate() {
            let label = self.charmap[byte as usize] as u32;
            let next = (self.states[p].base() + label) as usize;
            let valid =
                label != 0 && next < self.states.len() && self.states[next].check() == label;
            if !valid {
                return TraverseResult {
                    state: p as StateId,
                    matched: false,
                    matched_length: i,
                };
            }
            p = next;
        }
        TraverseResult {
            state: p as StateId,
            matched: true,
            matched_length: prefix.len(),
        }
    }

    fn has_value_at(&self, state: StateId) -> bool {
        !self.values[state as usize].is_default()
    }
}

impl<V: TrieValue> ValuedDictionary for DefaultDoubleArrayTrie<V> {
    type Value = V;

    fn value_at(&self, state: StateId) -> V {
        self.values[state as usize]
    }
}
