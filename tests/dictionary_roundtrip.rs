//! End-to-end lexicon tests: build, serialize, reload, verify.

use lexitrie::prelude::*;
use std::collections::BTreeMap;

/// A few thousand pronounceable ASCII words, sorted and distinct.
fn ascii_lexicon() -> Vec<String> {
    let onsets = [
        "b", "br", "ch", "d", "dr", "f", "g", "gl", "h", "j", "k", "l", "m", "n", "p", "pl", "r",
        "s", "st", "t", "tr", "v", "w", "x", "y", "z",
    ];
    let nuclei = ["a", "ai", "e", "ea", "i", "o", "oo", "u"];
    let codas = [
        "", "b", "ck", "d", "g", "l", "m", "n", "nd", "ng", "p", "r", "rt", "s", "st", "t",
    ];

    let mut words: Vec<String> = Vec::new();
    for onset in onsets {
        for nucleus in nuclei {
            for coda in codas {
                words.push(format!("{onset}{nucleus}{coda}"));
            }
        }
    }
    words.sort();
    words.dedup();
    words
}

/// A couple thousand multi-byte UTF-8 words (one and two CJK characters).
fn utf8_lexicon() -> Vec<String> {
    let chars: Vec<char> = (0..50)
        .map(|i| char::from_u32(0x4E00 + i).unwrap())
        .collect();

    let mut words: Vec<String> = Vec::new();
    for &a in &chars {
        words.push(a.to_string());
        for &b in &chars {
            words.push(format!("{a}{b}"));
        }
    }
    words.sort();
    words.dedup();
    words
}

/// Assign each word a distinct value starting at 1.
fn with_values(words: &[String]) -> BTreeMap<&str, i32> {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| (w.as_str(), i as i32 + 1))
        .collect()
}

#[test]
fn ascii_lexicon_round_trips_with_distinct_values() {
    let words = ascii_lexicon();
    assert!(words.len() > 3000);
    let expected = with_values(&words);

    let mut builder = DoubleArrayTrieBuilder::new();
    for (word, value) in &expected {
        builder.insert(word.as_bytes(), *value).unwrap();
    }
    let trie = builder.build();
    assert_eq!(trie.key_count(), words.len());

    // The in-memory trie answers every word before serialization.
    for (word, value) in &expected {
        let res = trie.traverse(word.as_bytes());
        assert!(res.matched, "missing {word}");
        assert_eq!(trie.value_at(res.state), *value, "wrong value for {word}");
    }

    let mut bytes = Vec::new();
    let written = trie.save(&mut bytes, &DefaultSerializer).unwrap();
    assert_eq!(written, bytes.len());

    let loaded = DefaultDoubleArrayTrie::<i32>::load(&bytes[..]).unwrap();
    assert_eq!(loaded.state_count(), trie.state_count());
    for (word, value) in &expected {
        let res = loaded.traverse(word.as_bytes());
        assert!(res.matched, "missing {word} after reload");
        assert!(loaded.has_value_at(res.state));
        assert_eq!(loaded.value_at(res.state), *value, "wrong value for {word}");
    }
}

#[test]
fn utf8_lexicon_survives_the_compact_layout() {
    let words = utf8_lexicon();
    assert!(words.len() > 2000);

    let mut builder = DoubleArrayTrieBuilder::new();
    for word in &words {
        builder.insert(word.as_bytes(), 1).unwrap();
    }
    let trie = builder.build();

    let mut bytes = Vec::new();
    trie.save(&mut bytes, &CompactSerializer).unwrap();
    let loaded = CompactDoubleArrayTrie::load(&bytes[..]).unwrap();

    for word in &words {
        let res = loaded.traverse(word.as_bytes());
        assert!(res.matched, "missing {word} after reload");
        assert!(loaded.has_value_at(res.state));

        // Chopping the last byte leaves either a non-terminal prefix
        // state or no match at all; it must never look like an entry.
        let truncated = &word.as_bytes()[..word.len() - 1];
        let res = loaded.traverse(truncated);
        assert!(
            !res.matched || !loaded.has_value_at(res.state),
            "byte-truncated {word} reads as an entry"
        );
    }
}

#[test]
fn dawg_variants_agree_with_the_double_array() {
    let words = ascii_lexicon();
    let expected = with_values(&words);

    let mut dawg_builder = DawgBuilder::new();
    let mut compact_builder = CompactDawgBuilder::new();
    let mut trie_builder = DoubleArrayTrieBuilder::new();
    for (word, value) in &expected {
        dawg_builder.insert(word.as_bytes(), *value).unwrap();
        compact_builder.insert(word.as_bytes(), *value).unwrap();
        trie_builder.insert(word.as_bytes(), *value).unwrap();
    }
    let dawg = dawg_builder.build();
    let compact = compact_builder.build();
    let trie = trie_builder.build();

    // Suffix sharing keeps the automaton far below one node per byte,
    // and folding removes more still.
    let total_bytes: usize = words.iter().map(|w| w.len()).sum();
    assert!(dawg.node_count() < total_bytes / 2);
    assert!(compact.node_count() <= dawg.node_count());

    for (word, value) in &expected {
        assert_eq!(dawg.value_at(dawg.traverse(word.as_bytes()).state), *value);
        assert_eq!(
            compact.value_at(compact.traverse(word.as_bytes()).state),
            *value
        );
        assert_eq!(trie.value_at(trie.traverse(word.as_bytes()).state), *value);
    }

    for probe in ["", "q", "bla", "zoost", "hellohello", "dright"] {
        let in_lexicon = expected.contains_key(probe);
        assert_eq!(dawg.contains(probe.as_bytes()), in_lexicon, "{probe}");
        assert_eq!(compact.contains(probe.as_bytes()), in_lexicon, "{probe}");
        assert_eq!(trie.contains(probe.as_bytes()), in_lexicon, "{probe}");
    }
}

#[test]
fn reloaded_tries_resume_traversal_mid_key() {
    let words = ascii_lexicon();
    let mut builder = DoubleArrayTrieBuilder::new();
    for (i, word) in words.iter().enumerate() {
        builder.insert(word.as_bytes(), i as i32 + 1).unwrap();
    }
    let mut bytes = Vec::new();
    builder.build().save(&mut bytes, &DefaultSerializer).unwrap();
    let loaded = DefaultDoubleArrayTrie::<i32>::load(&bytes[..]).unwrap();

    for word in words.iter().step_by(97) {
        let key = word.as_bytes();
        let full = loaded.traverse(key);
        assert!(full.matched);
        for split in 0..=key.len() {
            let head = loaded.traverse(&key[..split]);
            assert!(head.matched);
            let tail = loaded.traverse_from(&key[split..], head.state);
            assert!(tail.matched);
            assert_eq!(tail.state, full.state, "resume at {split} in {word}");
        }
    }
}
