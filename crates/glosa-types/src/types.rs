use serde::{Deserialize, Serialize};

use crate::address::NodeAddress;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// New main words, e.g. from the underline extractor
    AddWords(Vec<String>),
    /// (Re)translate the main word owning this node
    Translate(NodeAddress),
    /// Drop every translation and fetch all main words again
    TranslateAll,
    SetLanguages {
        source: String,
        target: String,
    },
    /// Forwarded store notification
    TreeChanged(TreeEvent),
    /// Worker drained every queue and stopped
    TranslationCompleted,
    Shutdown,
}

/// Change notification emitted by the tree store after a mutation is applied.
///
/// Ranges are inclusive, like the rows of a table model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    Inserted {
        parent: NodeAddress,
        first: usize,
        last: usize,
    },
    Removed {
        parent: NodeAddress,
        first: usize,
        last: usize,
    },
    DataChanged(NodeAddress),
    /// Children of the node were reordered in place
    LayoutChanged(NodeAddress),
    /// A main word was edited and its subtree cleared
    TranslationRequested(NodeAddress),
}

/// HTTP request a web dictionary wants issued for one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryQuery {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl DictionaryQuery {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
