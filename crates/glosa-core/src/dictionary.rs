use glosa_types::{DictionaryQuery, NodeAddress};

use crate::store::TreeStore;

/// An online dictionary: knows how to ask for a word and how to read the answer
/// back into the translation tree.
pub trait WebDictionary: Send + Sync {
    /// Get dictionary metadata
    fn metadata(&self) -> DictionaryMetadata;

    /// Request for `word` in the `source` -> `target` direction
    fn query(&self, word: &str, source: &str, target: &str) -> DictionaryQuery;

    /// Appends the records found in `payload` under `main_word`.
    ///
    /// Never fails: markup that cannot be read yields fewer nodes. Nodes added
    /// before a bad record stay in the tree.
    fn parse(&self, store: &TreeStore, payload: &str, main_word: &NodeAddress) -> ParseOutcome;
}

#[derive(Debug, Clone)]
pub struct DictionaryMetadata {
    pub name: String,
    pub website: String,
    /// Upper-case language codes the site can translate between
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// At least one section carried translations
    Built { sections: usize },
    NoMatch,
}
