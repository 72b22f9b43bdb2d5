//! Dictionary backends and their shared traversal contract.
//!
//! All backends store a set of byte-string keys with small integer values
//! and expose the same prefix-walking interface. They differ in how the
//! automaton is represented:
//!
//! | Backend | Representation | Best for |
//! |---------|----------------|----------|
//! | [`Dawg`] | Minimized automaton, suffix sharing | Static lexicons, smallest node count |
//! | [`CompactDawg`] | DAWG with single-child chains folded into edge strings | Long sparse tails |
//! | [`DoubleArrayTrie`] | Parallel `base`/`check` arrays | Fastest lookups, serialization source |
//! | [`CompactDoubleArrayTrie`] | Bit-packed records loaded from disk | Read-only membership queries |
//! | [`DefaultDoubleArrayTrie`] | Bit-packed records plus a value array | Read-only value lookups |
//!
//! Keys are plain byte slices compared lexicographically. Multi-byte UTF-8
//! works transparently since traversal is bytewise. Keys must not contain
//! an embedded NUL byte: the double-array charmap reserves id 0 for
//! "absent".
//!
//! # Building
//!
//! Builders accept keys in non-decreasing order and are consumed by
//! `build()`, which returns the sealed, immutable structure. A key equal
//! to the previous one overwrites its value.
//!
//! ```
//! use lexitrie::prelude::*;
//!
//! let mut builder = DawgBuilder::new();
//! builder.insert(b"hello", 0)?;
//! builder.insert(b"hi", 1)?;
//! let dawg = builder.build();
//!
//! assert!(dawg.contains(b"hi"));
//! assert_eq!(dawg.value_at(dawg.traverse(b"hello").state), 0);
//! # Ok::<(), lexitrie::dictionary::BuildError>(())
//! ```

pub mod compact_dawg;
pub mod dawg;
pub mod double_array_trie;
pub mod packed_trie;
pub mod trans_set;
pub mod value;

pub use compact_dawg::{CompactDawg, CompactDawgBuilder, CompactDawgState};
pub use dawg::{Dawg, DawgBuilder};
pub use double_array_trie::{DoubleArrayTrie, DoubleArrayTrieBuilder};
pub use packed_trie::{CompactDoubleArrayTrie, DefaultDoubleArrayTrie};
pub use trans_set::TransSet;
pub use value::TrieValue;

/// State handle used by the slab and array backed dictionaries.
pub type StateId = u32;

/// Outcome of walking a prefix through a dictionary.
///
/// `matched` is true exactly when the whole prefix was consumed along
/// valid transitions, in which case `matched_length` equals the prefix
/// length. On failure `state` is the deepest state reached and
/// `matched_length` counts the bytes consumed before the walk stopped.
///
/// A result state can seed a later [`Dictionary::traverse_from`] call, so
/// longest-common-prefix scans and streaming tokenization never re-walk
/// from the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraverseResult<S> {
    /// Deepest state reached.
    pub state: S,
    /// True when the entire prefix was consumed.
    pub matched: bool,
    /// Number of input bytes successfully consumed, even on failure.
    pub matched_length: usize,
}

/// Errors surfaced while feeding keys to a builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A key arrived out of lexicographic order.
    #[error("key {key:?} inserted out of order after {prev:?}")]
    UnsortedInput {
        /// The previously inserted key (lossily decoded for display).
        prev: String,
        /// The offending key (lossily decoded for display).
        key: String,
    },
}

impl BuildError {
    pub(crate) fn unsorted(prev: &[u8], key: &[u8]) -> Self {
        BuildError::UnsortedInput {
            prev: String::from_utf8_lossy(prev).into_owned(),
            key: String::from_utf8_lossy(key).into_owned(),
        }
    }
}

/// Prefix traversal over a finalized dictionary.
///
/// Implementations share one contract: traversal consumes input bytes one
/// transition at a time, reports the deepest state reached, and marks a
/// state terminal when a key ends there.
pub trait Dictionary {
    /// Handle identifying a traversal position.
    type State: Copy + PartialEq + std::fmt::Debug;

    /// The state every traversal starts from.
    fn root(&self) -> Self::State;

    /// Walk `prefix` starting at `start`.
    fn traverse_from(&self, prefix: &[u8], start: Self::State) -> TraverseResult<Self::State>;

    /// Walk `prefix` from the root.
    fn traverse(&self, prefix: &[u8]) -> TraverseResult<Self::State> {
        self.traverse_from(prefix, self.root())
    }

    /// True when a key ends at `state`.
    fn has_value_at(&self, state: Self::State) -> bool;

    /// True when `key` is present as a complete entry.
    fn contains(&self, key: &[u8]) -> bool {
        let res = self.traverse(key);
        res.matched && self.has_value_at(res.state)
    }
}

/// A dictionary that stores a retrievable value per key.
pub trait ValuedDictionary: Dictionary {
    /// The stored value type.
    type Value: TrieValue;

    /// Value stored at `state`, or [`TrieValue::DEFAULT`] when none.
    fn value_at(&self, state: Self::State) -> Self::Value;
}
