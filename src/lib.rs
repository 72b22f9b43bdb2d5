//! # lexitrie
//!
//! Compact string-keyed dictionaries for large lexicons.
//!
//! The crate builds minimized word automata from sorted key streams and
//! lays them out into double-array tries with a bit-packed on-disk form.
//! Lexicons of hundreds of thousands of entries, ASCII or multi-byte
//! UTF-8, fit in a few megabytes while keeping lookups to one array
//! probe per byte.
//!
//! The pipeline:
//!
//! ```text
//! sorted keys -> DawgBuilder -> Dawg -+-> CompactDawgBuilder (chain folding)
//!                                     |
//!                                     +-> DoubleArrayTrieBuilder -> save()
//!                                                                     |
//!                      CompactDoubleArrayTrie / DefaultDoubleArrayTrie <- load()
//! ```
//!
//! Every stage answers the same traversal contract, so a prefix walked
//! through one structure can resume where it stopped; see
//! [`dictionary::Dictionary`].
//!
//! ## Example
//!
//! ```
//! use lexitrie::prelude::*;
//!
//! let mut builder = DoubleArrayTrieBuilder::new();
//! builder.insert(b"hello", 0)?;
//! builder.insert(b"hi", 1)?;
//! let trie = builder.build();
//!
//! let hit = trie.traverse(b"hello");
//! assert!(hit.matched);
//! assert_eq!(trie.value_at(hit.state), 0);
//!
//! // Round-trip through the bit-packed form.
//! let mut bytes = Vec::new();
//! trie.save(&mut bytes, &CompactSerializer)?;
//! let loaded = CompactDoubleArrayTrie::load(&bytes[..])?;
//! assert!(loaded.has_value_at(loaded.traverse(b"hi").state));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dictionary;
pub mod serialization;

/// Common imports for convenient usage.
pub mod prelude {
    pub use crate::dictionary::{
        BuildError, CompactDawg, CompactDawgBuilder, CompactDawgState, CompactDoubleArrayTrie,
        Dawg, DawgBuilder, DefaultDoubleArrayTrie, Dictionary, DoubleArrayTrie,
        DoubleArrayTrieBuilder, TransSet, TraverseResult, TrieValue, ValuedDictionary,
    };
    pub use crate::serialization::{
        CompactSerializer, DefaultSerializer, LoadError, NoValueSerializer, SerializeError,
        TrieSerializer,
    };
}
