//! Double-array trie layout over a minimized DAWG.
//!
//! A double-array trie stores transitions in two parallel arrays so a
//! step is one add and one compare:
//!
//! ```text
//! next = base[state] + charmap[byte]
//! valid when check[next] == charmap[byte]
//! ```
//!
//! The builder first constructs a [`Dawg`] from the sorted key stream,
//! then lays its states out into `base`/`check`/`value` arrays:
//!
//! - **Character remapping.** Input bytes are tallied during insertion
//!   and renumbered by descending frequency, so the most common labels
//!   sit at the smallest offsets from a base and candidate bases pack
//!   densely. Id 0 is reserved for "byte absent from the lexicon"; a
//!   query containing such a byte fails at that position.
//! - **Free list.** Empty slots are threaded through the sign-negated
//!   fields: for a free slot `i`, `-check[i]` is the next free slot and
//!   `-base[i]` the previous one, with 0 standing for the adjacent slot.
//!   A slot is free exactly when `check[i] <= 0`.
//! - **Placement.** For each state the outgoing label set (a
//!   [`TransSet`]) is slid along the free list until every label lands on
//!   a free or fresh slot; the arrays grow on demand and trailing free
//!   slots are trimmed afterwards.
//!
//! The result is an unfolding of the DAWG: shared suffix states are laid
//! out once per incoming path, trading the sharing back for single-probe
//! transitions and a serializable flat form.

use crate::dictionary::dawg::DawgBuilder;
use crate::dictionary::trans_set::TransSet;
use crate::dictionary::value::TrieValue;
use crate::dictionary::{
    BuildError, Dawg, Dictionary, StateId, TraverseResult, ValuedDictionary,
};
use crate::serialization::{SerializeError, TrieSerializer};
use std::collections::VecDeque;
use std::io::Write;

/// Builder collecting keys for a [`DoubleArrayTrie`].
///
/// Insertion feeds an internal [`DawgBuilder`] and tallies byte
/// frequencies for the charmap; `build()` runs the whole layout.
pub struct DoubleArrayTrieBuilder<V: TrieValue = i32> {
    dawg: DawgBuilder<V>,
    char_freq: [u64; 256],
}

impl<V: TrieValue> DoubleArrayTrieBuilder<V> {
    /// Create an empty builder.
    pub fn new() -> Self {
        DoubleArrayTrieBuilder {
            dawg: DawgBuilder::new(),
            char_freq: [0; 256],
        }
    }

    /// Insert a key with its value; same ordering contract as
    /// [`DawgBuilder::insert`].
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<(), BuildError> {
        self.dawg.insert(key, value)?;
        for &byte in key {
            self.char_freq[byte as usize] += 1;
        }
        Ok(())
    }

    /// Finalize the DAWG and lay it out into the double array.
    pub fn build(self) -> DoubleArrayTrie<V> {
        let dawg = self.dawg.build();
        let (charmap, rev_charmap) = build_charmap(&self.char_freq);
        let mut layout = Layout::new();
        layout.place(&dawg, &charmap, &rev_charmap);
        layout.trim();

        let max_base = layout.base.iter().copied().max().unwrap_or(0);
        DoubleArrayTrie {
            charmap,
            base: layout.base,
            check: layout.check,
            value: layout.value,
            max_base,
            key_count: dawg.key_count(),
        }
    }
}

impl<V: TrieValue> Default for DoubleArrayTrieBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Frequency-descending byte renumbering. Id 0 stays "absent"; ties
/// break on the byte value so rebuilds are deterministic.
fn build_charmap(char_freq: &[u64; 256]) -> ([u8; 256], [u8; 256]) {
    let mut by_freq: Vec<(u64, u8)> = char_freq
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n > 0)
        .map(|(byte, &n)| (n, byte as u8))
        .collect();
    by_freq.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    // NUL never occurs in keys, so at most 255 distinct bytes compete
    // for the ids 1..=255.
    debug_assert!(by_freq.len() <= 255);

    let mut charmap = [0u8; 256];
    let mut rev_charmap = [0u8; 256];
    for (i, &(_, byte)) in by_freq.iter().enumerate() {
        charmap[byte as usize] = i as u8 + 1;
        rev_charmap[i + 1] = byte;
    }
    (charmap, rev_charmap)
}

/// The arrays under construction plus the free-list bookkeeping.
struct Layout<V: TrieValue> {
    base: Vec<i32>,
    check: Vec<i32>,
    value: Vec<V>,
}

impl<V: TrieValue> Layout<V> {
    fn new() -> Self {
        // Slot 0 is the root; one spare slot seeds the free list.
        Layout {
            base: vec![0; 2],
            check: vec![0; 2],
            value: vec![V::DEFAULT; 2],
        }
    }

    fn len(&self) -> usize {
        self.check.len()
    }

    fn overflows(&self, i: usize) -> bool {
        i >= self.check.len()
    }

    fn is_free(&self, i: usize) -> bool {
        self.check[i] <= 0
    }

    /// Grow so index `i` is valid; fresh slots are free with adjacent
    /// neighbor links.
    fn grow(&mut self, i: usize) {
        self.base.resize(i + 1, 0);
        self.check.resize(i + 1, 0);
        self.value.resize(i + 1, V::DEFAULT);
    }

    fn next_free(&self, i: usize) -> usize {
        if self.overflows(i) || self.check[i] == 0 {
            i + 1
        } else {
            (-self.check[i]) as usize
        }
    }

    fn prev_free(&self, i: usize) -> usize {
        debug_assert!(self.is_free(i) && self.base[i] <= 0);
        if self.base[i] == 0 {
            i - 1
        } else {
            (-self.base[i]) as usize
        }
    }

    /// Can every label land on a free or fresh slot with the set's front
    /// label pinned to `candidate`?
    fn fits(&self, candidate: usize, set: &TransSet) -> bool {
        if self.overflows(candidate) {
            return true;
        }
        debug_assert!(self.is_free(candidate));

        let front = set.front().unwrap();
        for label in set.iter().skip(1) {
            let slot = candidate + (label - front) as usize;
            if self.overflows(slot) {
                return true;
            }
            if !self.is_free(slot) {
                return false;
            }
        }
        true
    }

    /// First-fit search along the free list, growing the arrays so the
    /// whole label span is addressable.
    fn find_free_base(&mut self, set: &TransSet) -> usize {
        let front = set.front().unwrap();
        let mut candidate = self.next_free(0);
        // Slots at or below `front` would place a child at or before the
        // candidate itself; skip them so every stored base stays positive.
        while candidate <= front as usize {
            candidate = self.next_free(candidate);
        }
        while !self.fits(candidate, set) {
            candidate = self.next_free(candidate);
        }

        let span_end = candidate + (set.back().unwrap() - front) as usize;
        if self.overflows(span_end) {
            self.grow(span_end);
        }
        candidate
    }

    /// Unlink `slot` from the free list and mark it with its incoming
    /// label.
    fn claim(&mut self, slot: usize, label: u8) {
        let prev = self.prev_free(slot);
        let next = self.next_free(slot);
        if self.overflows(next) {
            self.grow(next);
        }
        self.base[next] = -(prev as i32);
        self.check[prev] = -(next as i32);
        self.check[slot] = label as i32;
    }

    /// BFS the DAWG into the arrays. The root occupies slot 0 from the
    /// start; every other state is claimed when its parent is placed.
    fn place(&mut self, dawg: &Dawg<V>, charmap: &[u8; 256], rev_charmap: &[u8; 256]) {
        self.value[0] = dawg.value_at(dawg.root());

        let mut queue: VecDeque<(StateId, usize)> = VecDeque::from([(dawg.root(), 0)]);
        while let Some((node, slot)) = queue.pop_front() {
            let set: TransSet = dawg.nodes[node as usize]
                .edges
                .iter()
                .map(|&(byte, _)| charmap[byte as usize])
                .collect();

            if set.is_empty() {
                self.base[slot] = 0;
                continue;
            }

            let start = self.find_free_base(&set);
            let front = set.front().unwrap();
            for label in set.iter() {
                let child_slot = start + (label - front) as usize;
                self.claim(child_slot, label);

                let byte = rev_charmap[label as usize];
                let child = dawg.nodes[node as usize].target(byte).unwrap();
                self.value[child_slot] = dawg.value_at(child);
                queue.push_back((child, child_slot));
            }
            self.base[slot] = (start - front as usize) as i32;
        }
    }

    /// Drop trailing free slots.
    fn trim(&mut self) {
        let mut last = self.len() - 1;
        while last > 0 && self.is_free(last) {
            last -= 1;
        }
        self.base.truncate(last + 1);
        self.check.truncate(last + 1);
        self.value.truncate(last + 1);
    }
}

/// A finalized double-array trie.
///
/// States are array indices with the root at 0. The structure is plain
/// immutable data; [`DoubleArrayTrie::save`] writes the bit-packed file
/// form read back by the loaders in
/// [`packed_trie`](crate::dictionary::packed_trie).
#[derive(Clone, Debug)]
pub struct DoubleArrayTrie<V: TrieValue = i32> {
    charmap: [u8; 256],
    base: Vec<i32>,
    check: Vec<i32>,
    value: Vec<V>,
    max_base: i32,
    key_count: usize,
}

impl<V: TrieValue> DoubleArrayTrie<V> {
    /// Build from unsorted entries; later duplicates win.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: AsRef<[u8]>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries: Vec<(Vec<u8>, V)> = entries
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_vec(), v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut builder = DoubleArrayTrieBuilder::new();
        for (key, value) in entries {
            builder.insert(&key, value).unwrap();
        }
        builder.build()
    }

    /// Number of distinct keys stored.
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of array slots, occupied and free.
    pub fn state_count(&self) -> usize {
        self.check.len()
    }

    /// Largest stored base offset; decides how wide a packed record has
    /// to be.
    pub fn max_base(&self) -> i32 {
        self.max_base
    }

    /// The byte-to-id remapping used by this trie.
    pub fn charmap(&self) -> &[u8; 256] {
        &self.charmap
    }

    /// Write the trie through `serializer`, returning the total bytes
    /// written including the leading size field.
    ///
    /// The output starts with the payload size and the charmap, followed
    /// by one 32-bit record per state (plus, for the value-carrying
    /// layout, the trailing value array).
    pub fn save<W, S>(&self, mut writer: W, serializer: &S) -> Result<usize, SerializeError>
    where
        W: Write,
        S: TrieSerializer<V>,
    {
        let size_sum = 256u32 + serializer.record_bytes(self.base.len()) as u32;
        writer.write_all(&size_sum.to_le_bytes())?;
        writer.write_all(&self.charmap)?;
        let body = serializer.write_states(&mut writer, &self.base, &self.check, &self.value)?;
        Ok(4 + 256 + body)
    }
}

impl<V: TrieValue> Dictionary for DoubleArrayTrie<V> {
    type State = StateId;

    fn root(&self) -> StateId {
        0
    }

    fn traverse_from(&self, prefix: &[u8], start: StateId) -> TraverseResult<StateId> {
        let mut p = start as usize;
        if p >= self.check.len() {
            return TraverseResult {
                state: start,
                matched: false,
                matched_length: 0,
            };
        }

        for (i, &byte) in prefix.iter().enumerate() {
            let label = self.charmap[byte as usize];
            let next = self.base[p] as i64 + label as i64;
            let valid = label != 0
                && (next as usize) < self.check.len()
                && self.check[next as usize] == label as i32;
            if !valid {
                return TraverseResult {
                    state: p as StateId,
                    matched: false,
                    matched_length: i,
                };
            }
            p = next as usize;
        }
        TraverseResult {
            state: p as StateId,
            matched: true,
            matched_length: prefix.len(),
        }
    }

    fn has_value_at(&self, state: StateId) -> bool {
        !self.value[state as usize].is_default()
    }
}

impl<V: TrieValue> ValuedDictionary for DoubleArrayTrie<V> {
    type Value = V;

    fn value_at(&self, state: StateId) -> V {
        self.value[state as usize]
    }
}
