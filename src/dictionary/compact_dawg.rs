//! DAWG variant that folds single-child chains into string-labeled edges.
//!
//! Minimization leaves long runs of nodes with exactly one child wherever
//! keys have sparse tails. Folding such a run into a single edge string
//! trades one byte-compare loop for several node hops and removes the
//! intermediate nodes entirely.
//!
//! A node reached through a folded edge carries the chain bytes as its
//! *edge prefix*: traversal consumes the prefix bytewise on arrival
//! before looking up the next transition. Runs shorter than four bytes
//! are left alone, the string compare would cost more than it saves.

use crate::dictionary::dawg::{DawgBuilder, DawgNode, EdgeList};
use crate::dictionary::value::TrieValue;
use crate::dictionary::{BuildError, Dictionary, StateId, TraverseResult, ValuedDictionary};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Chains shorter than this stay as plain node runs.
const MIN_CHAIN_LEN: usize = 4;

/// A node of the folded automaton.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct CompactDawgNode<V> {
    value: V,
    /// Bytes that must be consumed on arrival at this node.
    prefix: Vec<u8>,
    /// Outgoing transitions, sorted by label.
    edges: EdgeList,
}

impl<V: TrieValue> CompactDawgNode<V> {
    fn target(&self, label: u8) -> Option<StateId> {
        self.edges
            .iter()
            .find(|&&(l, _)| l == label)
            .map(|&(_, t)| t)
    }

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

/// Builder for a [`CompactDawg`]: a [`DawgBuilder`] whose `build` runs the
/// chain-folding pass after minimization.
pub struct CompactDawgBuilder<V: TrieValue = i32> {
    inner: DawgBuilder<V>,
}

impl<V: TrieValue> CompactDawgBuilder<V> {
    /// Create an empty builder.
    pub fn new() -> Self {
        CompactDawgBuilder {
            inner: DawgBuilder::new(),
        }
    }

    /// Insert a key with its value; same ordering contract as
    /// [`DawgBuilder::insert`].
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<(), BuildError> {
        self.inner.insert(key, value)
    }

    /// Minimize, fold chains, and seal the automaton.
    pub fn build(self) -> CompactDawg<V> {
        let dawg = self.inner.build();
        fold_chains(dawg.nodes, dawg.key_count)
    }
}

impl<V: TrieValue> Default for CompactDawgBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn fold_chains<V: TrieValue>(plain: Vec<DawgNode<V>>, key_count: usize) -> CompactDawg<V> {
    let mut nodes: Vec<CompactDawgNode<V>> = plain
        .into_iter()
        .map(|n| CompactDawgNode {
            value: n.value,
            prefix: Vec::new(),
            edges: n.edges,
        })
        .collect();

    // Incoming-edge counts; a node referenced by more than one parent is
    // never dissolved into a chain.
    let mut refs = vec![0u32; nodes.len()];
    {
        let mut seen = vec![false; nodes.len()];
        seen[0] = true;
        let mut queue: VecDeque<StateId> = VecDeque::from([0]);
        while let Some(n) = queue.pop_front() {
            for &(_, target) in &nodes[n as usize].edges {
                refs[target as usize] += 1;
                if !seen[target as usize] {
                    seen[target as usize] = true;
                    queue.push_back(target);
                }
            }
        }
    }

    // BFS over (node, parent, label) edge records. A head that already got
    // folded is only re-pointed when reached again through another parent.
    let mut folded: FxHashMap<StateId, StateId> = FxHashMap::default();
    let mut queue: VecDeque<(StateId, StateId, u8)> = VecDeque::new();
    let enqueue = |queue: &mut VecDeque<(StateId, StateId, u8)>,
                   nodes: &[CompactDawgNode<V>],
                   from: StateId| {
        for &(label, target) in &nodes[from as usize].edges {
            queue.push_back((target, from, label));
        }
    };
    enqueue(&mut queue, &nodes, 0);

    while let Some((head, parent, label)) = queue.pop_front() {
        if let Some(&tail) = folded.get(&head) {
            nodes[parent as usize].retarget(label, tail);
            continue;
        }

        let eligible = {
            let n = &nodes[head as usize];
            n.edges.len() == 1 && n.value.is_default() && n.prefix.is_empty()
                && refs[head as usize] <= 1
        };
        if !eligible {
            enqueue(&mut queue, &nodes, head);
            continue;
        }

        let mut chain = Vec::new();
        let mut end = head;
        loop {
            let (byte, next) = nodes[end as usize].edges[0];
            if refs[next as usize] > 1 {
                break;
            }
            chain.push(byte);
            end = next;
            let n = &nodes[end as usize];
            if n.edges.len() != 1 || !n.value.is_default() || !n.prefix.is_empty() {
                break;
            }
        }

        if chain.len() < MIN_CHAIN_LEN {
            enqueue(&mut queue, &nodes, head);
            continue;
        }

        nodes[end as usize].prefix = chain;
        nodes[parent as usize].retarget(label, end);
        folded.insert(head, end);
        enqueue(&mut queue, &nodes, end);
    }

    CompactDawg {
        nodes: compact_reachable_folded(&nodes),
        key_count,
    }
}

/// BFS renumbering that drops the dissolved chain nodes.
fn compact_reachable_folded<V: TrieValue>(
    nodes: &[CompactDawgNode<V>],
) -> Vec<CompactDawgNode<V>> {
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

/// A finalized DAWG with chain-folded edges.
///
/// A traversal position is a node plus the number of its edge-prefix
/// bytes already consumed ([`CompactDawgState`]), so every result state,
/// matched or stopped partway through a folded edge, can seed
/// [`Dictionary::traverse_from`] and the walk picks the prefix back up
/// at the recorded offset. A node's value belongs to the position after
/// its full prefix; states that still owe prefix bytes report no value.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompactDawg<V: TrieValue = i32> {
    nodes: Vec<CompactDawgNode<V>>,
    key_count: usize,
}

impl<V: TrieValue> CompactDawg<V> {
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

        let mut builder = CompactDawgBuilder::new();
        for (key, value) in entries {
            builder.insert(&key, value).unwrap();
        }
        builder.build()
    }

    /// Number of distinct keys stored.
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of states after folding.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of states carrying a folded edge prefix.
    pub fn prefix_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.prefix.is_empty()).count()
    }

    #[cfg(test)]
    fn prefix_of(&self, state: CompactDawgState) -> &[u8] {
        &self.nodes[state.node as usize].prefix
    }
}

/// Traversal position in a [`CompactDawg`].
///
/// Folded edges put positions inside an edge string, so a node index
/// alone cannot say where a walk stopped. The state also records how
/// many bytes of the node's edge prefix have been consumed; two states
/// compare equal exactly when they denote the same position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompactDawgState {
    node: StateId,
    consumed: u32,
}

impl<V: TrieValue> Dictionary for CompactDawg<V> {
    type State = CompactDawgState;

    fn root(&self) -> CompactDawgState {
        CompactDawgState {
            node: 0,
            consumed: 0,
        }
    }

    fn traverse_from(
        &self,
        prefix: &[u8],
        start: CompactDawgState,
    ) -> TraverseResult<CompactDawgState> {
        let mut p = start.node;
        let mut paid = start.consumed as usize;
        if (p as usize) >= self.nodes.len() {
            return TraverseResult {
                state: start,
                matched: false,
                matched_length: 0,
            };
        }

        let mut i = 0;
        while i < prefix.len() {
            let node = &self.nodes[p as usize];

            // Pay off the rest of this node's edge prefix before the
            // next transition. A mismatched byte fails without being
            // counted; running out of input leaves a mid-edge state the
            // next traversal continues from.
            while paid < node.prefix.len() {
                if i >= prefix.len() || prefix[i] != node.prefix[paid] {
                    return TraverseResult {
                        state: CompactDawgState {
                            node: p,
                            consumed: paid as u32,
                        },
                        matched: false,
                        matched_length: i,
                    };
                }
                i += 1;
                paid += 1;
            }
            if i >= prefix.len() {
                break;
            }

            match node.target(prefix[i]) {
                Some(q) => {
                    p = q;
                    paid = 0;
                    i += 1;
                }
                None => {
                    return TraverseResult {
                        state: CompactDawgState {
                            node: p,
                            consumed: paid as u32,
                        },
                        matched: false,
                        matched_length: i,
                    }
                }
            }
        }
        TraverseResult {
            state: CompactDawgState {
                node: p,
                consumed: paid as u32,
            },
            matched: true,
            matched_length: i,
        }
    }

    fn has_value_at(&self, state: CompactDawgState) -> bool {
        let node = &self.nodes[state.node as usize];
        state.consumed as usize >= node.prefix.len() && !node.value.is_default()
    }
}

impl<V: TrieValue> ValuedDictionary for CompactDawg<V> {
    type Value = V;

    fn value_at(&self, state: CompactDawgState) -> V {
        let node = &self.nodes[state.node as usize];
        if (state.consumed as usize) < node.prefix.len() {
            V::DEFAULT
        } else {
            node.value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(words: &[&str]) -> CompactDawg<i32> {
        CompactDawg::from_entries(words.iter().map(|w| (w.as_bytes(), 0)))
    }

    #[test]
    fn test_long_chain_is_folded() {
        let dawg = build(&["abcdefgh", "abcdefgi"]);

        // The run b..g dissolves into one edge string on the branch node.
        let branch = dawg.traverse(b"a");
        assert!(branch.matched);
        assert_eq!(dawg.prefix_of(branch.state), b"bcdefg");
        assert_eq!(dawg.prefix_count(), 1);

        assert!(dawg.contains(b"abcdefgh"));
        assert!(dawg.contains(b"abcdefgi"));
    }

    #[test]
    fn test_mismatch_inside_folded_edge() {
        let dawg = build(&["abcdefgh", "abcdefgi"]);

        let res = dawg.traverse(b"abcdefX");
        assert!(!res.matched);
        assert_eq!(res.matched_length, 6);

        // Running out of input inside the edge also fails.
        let res = dawg.traverse(b"abcd");
        assert!(!res.matched);
        assert_eq!(res.matched_length, 4);
    }

    #[test]
    fn test_owed_prefix_is_consumed_on_resume() {
        let dawg = build(&["abcdefgh", "abcdefgi"]);

        let head = dawg.traverse(b"a");
        assert!(head.matched);
        let tail = dawg.traverse_from(b"bcdefgh", head.state);
        assert!(tail.matched);
        assert_eq!(tail.state, dawg.traverse(b"abcdefgh").state);
    }

    #[test]
    fn test_resume_after_prefix_fully_consumed() {
        let dawg = build(&["abcdefgh", "abcdefgi"]);

        // "abcdefg" ends exactly at the end of the folded edge; the
        // state must remember the prefix is already paid.
        let head = dawg.traverse(b"abcdefg");
        assert!(head.matched);
        let tail = dawg.traverse_from(b"h", head.state);
        assert!(tail.matched);
        assert_eq!(tail.state, dawg.traverse(b"abcdefgh").state);
    }

    #[test]
    fn test_resume_from_inside_a_folded_edge() {
        let dawg = build(&["abcdefgh", "abcdefgi"]);

        // Input exhausted three bytes into the folded edge.
        let head = dawg.traverse(b"abcd");
        assert!(!head.matched);
        assert_eq!(head.matched_length, 4);
        let tail = dawg.traverse_from(b"efgi", head.state);
        assert!(tail.matched);
        assert_eq!(tail.state, dawg.traverse(b"abcdefgi").state);
    }

    #[test]
    fn test_unpaid_prefix_hides_the_tail_value() {
        // The single chain folds straight onto the terminal, so the
        // state after 'a' is the terminal node with its prefix still
        // owed; it must not expose the terminal's value.
        let dawg = CompactDawg::from_entries([(&b"abcdefgh"[..], 3)]);

        assert!(!dawg.contains(b"a"));
        assert!(!dawg.contains(b"abcdefg"));
        let head = dawg.traverse(b"a");
        assert!(head.matched);
        assert!(!dawg.has_value_at(head.state));
        assert_eq!(dawg.value_at(head.state), -1);
        assert_eq!(dawg.value_at(dawg.traverse(b"abcdefgh").state), 3);
    }

    #[test]
    fn test_short_chains_stay_plain() {
        let dawg = build(&["cat", "cut"]);
        assert_eq!(dawg.prefix_count(), 0);
        assert!(dawg.contains(b"cat"));
        assert!(dawg.contains(b"cut"));
    }

    #[test]
    fn test_suffix_state_is_shared() {
        let dawg = build(&["hi", "hello", "mello"]);
        let he = dawg.traverse(b"he");
        let me = dawg.traverse(b"me");
        assert!(he.matched && me.matched);
        assert_eq!(he.state, me.state);
    }

    #[test]
    fn test_shared_nodes_survive_folding() {
        // Both words collapse onto the same "bcdefgh" suffix path, so the
        // chain head is doubly referenced and must keep both routes alive.
        let dawg = build(&["abcdefgh", "xbcdefgh"]);
        assert!(dawg.contains(b"abcdefgh"));
        assert!(dawg.contains(b"xbcdefgh"));
        assert!(!dawg.contains(b"abcdefg"));
    }

    #[test]
    fn test_values_survive_folding() {
        let dawg = CompactDawg::from_entries([
            (&b"terminology"[..], 7),
            (&b"termination"[..], 8),
        ]);
        assert_eq!(dawg.value_at(dawg.traverse(b"terminology").state), 7);
        assert_eq!(dawg.value_at(dawg.traverse(b"termination").state), 8);
        let mid = dawg.traverse(b"termin");
        assert!(mid.matched);
        assert!(!dawg.has_value_at(mid.state));
    }

    #[test]
    fn test_single_long_key() {
        let dawg = CompactDawg::from_entries([(&b"abcdefgh"[..], 3)]);
        let res = dawg.traverse(b"abcdefgh");
        assert!(res.matched);
        assert_eq!(dawg.value_at(res.state), 3);
        assert_eq!(dawg.node_count(), 2);
    }
}
