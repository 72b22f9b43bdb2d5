//! Minimized DAWG (Directed Acyclic Word Graph) dictionary.
//!
//! A DAWG is a trie that shares suffixes as well as prefixes. The builder
//! performs incremental minimization over a sorted key stream: after each
//! insertion, the part of the previous key's path that can no longer grow
//! is canonicalized against a registry of already-seen states, so the
//! automaton never materializes the full trie.
//!
//! Nodes live in a flat slab and are addressed by index. Minimization
//! turns the slab into a DAG, so a node can be the target of several
//! parents; the finalized [`Dawg`] renumbers reachable nodes in BFS order
//! and drops the duplicates that minimization retired.

use crate::dictionary::value::TrieValue;
use crate::dictionary::{BuildError, Dictionary, StateId, TraverseResult, ValuedDictionary};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Outgoing transitions of a node, sorted by label.
///
/// Lexicon nodes rarely have more than a handful of children, so the
/// inline capacity keeps most edge lists off the heap.
pub(crate) type EdgeList = SmallVec<[(u8, StateId); 4]>;

/// A node of the automaton: a value slot plus sorted outgoing edges.
///
/// Equality and hashing cover the full content. Once a node's children
/// are canonical, the node itself is a canonical signature of the whole
/// sub-automaton below it, which is what the minimization registry keys
/// on. Sibling terminals and a two-child branch hash differently by
/// construction, so they can never be conflated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct DawgNode<V> {
    pub(crate) value: V,
    pub(crate) edges: EdgeList,
}

impl<V: TrieValue> DawgNode<V> {
    fn new() -> Self {
        DawgNode {
            value: V::DEFAULT,
            edges: EdgeList::new(),
        }
    }

    /// Target of the edge labeled `label`, if present.
    pub(crate) fn target(&self, label: u8) -> Option<StateId> {
        // Linear scan; nodes are small and the list is contiguous.
        self.edges
            .iter()
            .find(|&&(l, _)| l == label)
            .map(|&(_, t)| t)
    }

    /// Append an edge with a label greater than all existing ones.
    fn push_edge(&mut self, label: u8, target: StateId) {
        debug_assert!(self.edges.last().map_or(true, |&(l, _)| l < label));
        self.edges.push((label, target));
    }

    /// Redirect the edge labeled `label` to a new target.
    fn retarget(&mut self, label: u8, target: StateId) {
        for edge in self.edges.iter_mut() {
            if edge.0 == label {
                edge.1 = target;
                return;
            }
        }
        unreachable!("retarget of a missing edge");
    }
}

/// Renumber the nodes reachable from index 0 in BFS order, remapping edge
/// targets. Drops the duplicate nodes retired by minimization.
pub(crate) fn compact_reachable<V: TrieValue>(nodes: &[DawgNode<V>]) -> Vec<DawgNode<V>> {
    const UNSEEN: StateId = StateId::MAX;
    let mut remap = vec![UNSEEN; nodes.len()];
    let mut order: Vec<StateId> = vec![0];
    remap[0] = 0;

    let mut i = 0;
    while i < order.len() {
        for &(_, target) in &nodes[order[i] as usize].edges {
            if remap[target as usize] == UNSEEN {
                remap[target as usize] = order.len() as StateId;
                order.push(target);
            }
        }
        i += 1;
    }

    order
        .iter()
        .map(|&old| {
            let mut node = nodes[old as usize].clone();
            for edge in node.edges.iter_mut() {
                edge.1 = remap[edge.1 as usize];
            }
            node
        })
        .collect()
}

/// Incremental builder for a [`Dawg`].
///
/// Keys must be inserted in non-decreasing lexicographic order; inserting
/// the same key again overwrites its value. `build()` seals the automaton.
pub struct DawgBuilder<V: TrieValue = i32> {
    nodes: Vec<DawgNode<V>>,
    /// Canonical content -> slab index of the node registered for it.
    registry: FxHashMap<DawgNode<V>, StateId>,
    /// Unminimized spine of the last insertion, root side first. The
    /// recorded child is `parent.target(label)` at pop time.
    unchecked: Vec<(StateId, u8)>,
    prev_key: Vec<u8>,
    key_count: usize,
}

impl<V: TrieValue> DawgBuilder<V> {
    /// Create a builder holding only the root state.
    pub fn new() -> Self {
        DawgBuilder {
            nodes: vec![DawgNode::new()],
            registry: FxHashMap::default(),
            unchecked: Vec::new(),
            prev_key: Vec::new(),
            key_count: 0,
        }
    }

    /// Insert a key with its value.
    ///
    /// Returns [`BuildError::UnsortedInput`] when `key` sorts before the
    /// previously inserted key.
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<(), BuildError> {
        if key < self.prev_key.as_slice() {
            return Err(BuildError::unsorted(&self.prev_key, key));
        }

        let common = self
            .prev_key
            .iter()
            .zip(key)
            .take_while(|(a, b)| a == b)
            .count();

        self.minimize(common);

        // Deepest retained node of the previous path sits at depth
        // `common`; fresh suffix nodes hang off it.
        let mut p = match self.unchecked.last() {
            Some(&(parent, label)) => self.nodes[parent as usize].target(label).unwrap(),
            None => 0,
        };

        for &byte in &key[common..] {
            let child = self.nodes.len() as StateId;
            self.nodes.push(DawgNode::new());
            self.nodes[p as usize].push_edge(byte, child);
            self.unchecked.push((p, byte));
            p = child;
        }

        if self.nodes[p as usize].value.is_default() {
            self.key_count += 1;
        }
        self.nodes[p as usize].value = value;

        self.prev_key.clear();
        self.prev_key.extend_from_slice(key);
        Ok(())
    }

    /// Seal the automaton.
    pub fn build(mut self) -> Dawg<V> {
        self.minimize(0);
        Dawg {
            nodes: compact_reachable(&self.nodes),
            key_count: self.key_count,
        }
    }

    /// Canonicalize the unchecked spine down to `down_to` entries.
    ///
    /// Children are popped deepest first, so by the time a node is looked
    /// up in the registry all its edge targets are canonical.
    fn minimize(&mut self, down_to: usize) {
        while self.unchecked.len() > down_to {
            let (parent, label) = self.unchecked.pop().unwrap();
            let child = self.nodes[parent as usize].target(label).unwrap();

            if let Some(&canonical) = self.registry.get(&self.nodes[child as usize]) {
                if canonical != child {
                    self.nodes[parent as usize].retarget(label, canonical);
                }
            } else {
                let node = self.nodes[child as usize].clone();
                self.registry.insert(node, child);
            }
        }
    }
}

impl<V: TrieValue> Default for DawgBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A finalized, immutable DAWG.
///
/// States are indices into the node slab; the root is state 0. The
/// structure is plain data and safe to share across threads.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dawg<V: TrieValue = i32> {
    pub(crate) nodes: Vec<DawgNode<V>>,
    pub(crate) key_count: usize,
}

impl<V: TrieValue> Dawg<V> {
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

        let mut builder = DawgBuilder::new();
        for (key, value) in entries {
            builder.insert(&key, value).unwrap();
        }
        builder.build()
    }

    /// Number of distinct keys stored.
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of states in the minimized automaton.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl<V: TrieValue> Dictionary for Dawg<V> {
    type State = StateId;

    fn root(&self) -> StateId {
        0
    }

    fn traverse_from(&self, prefix: &[u8], start: StateId) -> TraverseResult<StateId> {
        let mut p = start;
        if (p as usize) >= self.nodes.len() {
            return TraverseResult {
                state: p,
                matched: false,
                matched_length: 0,
            };
        }

        for (i, &byte) in prefix.iter().enumerate() {
            match self.nodes[p as usize].target(byte) {
                Some(q) => p = q,
                None => {
                    return TraverseResult {
                        state: p,
                        matched: false,
                        matched_length: i,
                    }
                }
            }
        }
        TraverseResult {
            state: p,
            matched: true,
            matched_length: prefix.len(),
        }
    }

    fn has_value_at(&self, state: StateId) -> bool {
        !self.nodes[state as usize].value.is_default()
    }
}

impl<V: TrieValue> ValuedDictionary for Dawg<V> {
    type Value = V;

    fn value_at(&self, state: StateId) -> V {
        self.nodes[state as usize].value
    }
}
