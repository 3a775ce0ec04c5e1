use std::collections::HashSet;
use std::io::{BufRead, Write};

use glosa_core::TreeStore;

/// Whitespace-separated words from `reader`, first occurrence order, duplicates dropped.
pub fn read_words(reader: impl BufRead) -> anyhow::Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for line in reader.lines() {
        for word in line?.split_whitespace() {
            if seen.insert(word.to_string()) {
                words.push(word.to_string());
            }
        }
    }
    Ok(words)
}

/// Writes every main word's subtree as an indented outline.
pub fn write_outlines(store: &TreeStore, mut out: impl Write) -> anyhow::Result<()> {
    for addr in store.main_words() {
        if let Some(outline) = store.outline(&addr) {
            out.write_all(outline.as_bytes())?;
        }
    }
    out.flush()?;
    Ok(())
}
