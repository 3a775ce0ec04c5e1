//! Shared translation tree.
//!
//! [`TreeStore`] owns the whole hierarchy under an implicit root. Every
//! mutation runs under one store-wide mutex; the [`TreeEvent`]s it produces are
//! sent to subscribers once the mutation is complete and the store lock has
//! been released. Events of different mutations reach subscribers in the order
//! the mutations were applied.
//!
//! Nodes are addressed by [`NodeAddress`]. Structural changes shift sibling
//! ordinals, so callers re-resolve addresses after mutations made elsewhere
//! instead of holding on to them.

use std::sync::{Mutex, MutexGuard, PoisonError};

use glosa_types::{NodeAddress, TreeEvent};

use crate::error::TreeError;
use crate::node::{Attribute, Attributes, Gender, NodeKind, TreeNode, WordClass, WordDetails};

pub struct TreeStore {
    inner: Mutex<StoreInner>,
    subscribers: Mutex<Vec<kanal::Sender<TreeEvent>>>,
}

pub(crate) struct StoreInner {
    pub(crate) root: TreeNode,
    source_lang: String,
    target_lang: String,
    /// Events of the mutation in progress
    pending: Vec<TreeEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn last_row(first: usize, count: usize) -> usize {
    first + count.saturating_sub(1)
}

impl StoreInner {
    pub(crate) fn node(&self, addr: &NodeAddress) -> Option<&TreeNode> {
        addr.path()
            .iter()
            .try_fold(&self.root, |node, row| node.child(*row))
    }

    fn node_mut(&mut self, addr: &NodeAddress) -> Option<&mut TreeNode> {
        let mut node = &mut self.root;
        for row in addr.path() {
            node = node.child_mut(*row)?;
        }
        Some(node)
    }

    fn resolve(&self, addr: &NodeAddress) -> Result<&TreeNode, TreeError> {
        self.node(addr)
            .ok_or_else(|| TreeError::InvalidAddress(addr.clone()))
    }

    fn resolve_mut(&mut self, addr: &NodeAddress) -> Result<&mut TreeNode, TreeError> {
        self.node_mut(addr)
            .ok_or_else(|| TreeError::InvalidAddress(addr.clone()))
    }

    pub(crate) fn child_count(&self, addr: &NodeAddress) -> usize {
        self.node(addr).map_or(0, TreeNode::child_count)
    }

    pub(crate) fn display(&self, addr: &NodeAddress) -> String {
        self.node(addr).map(TreeNode::display).unwrap_or_default()
    }

    pub(crate) fn kind(&self, addr: &NodeAddress) -> Option<NodeKind> {
        self.node(addr).map(TreeNode::kind)
    }

    /// Top-level nodes are always main words in the source language.
    fn adopt_as_main_words(&mut self, first: usize) {
        let language = self.source_lang.clone();
        for row in first..self.root.child_count() {
            if let Some(node) = self.root.child_mut(row) {
                if node.kind() != NodeKind::MainWord {
                    node.set(Attribute::Kind(NodeKind::MainWord));
                    node.set(Attribute::Language(language.clone()));
                }
            }
        }
    }

    pub(crate) fn add_nodes(&mut self, parent: &NodeAddress, count: usize) -> Result<NodeAddress, TreeError> {
        let node = self.resolve_mut(parent)?;
        if count == 0 {
            let len = node.child_count();
            return Err(TreeError::OutOfRange { position: len, count, len });
        }
        let first = node.add_children(count);
        if parent.is_root() {
            self.adopt_as_main_words(first);
        }
        self.pending.push(TreeEvent::Inserted {
            parent: parent.clone(),
            first,
            last: last_row(first, count),
        });
        Ok(parent.child(first))
    }

    pub(crate) fn insert_nodes(
        &mut self,
        parent: &NodeAddress,
        position: usize,
        nodes: Vec<TreeNode>,
    ) -> Result<NodeAddress, TreeError> {
        let count = nodes.len();
        let node = self.resolve_mut(parent)?;
        let len = node.child_count();
        if !node.insert_children(position, nodes) {
            return Err(TreeError::OutOfRange { position, count, len });
        }
        if parent.is_root() {
            self.adopt_as_main_words(position);
        }
        if count > 0 {
            self.pending.push(TreeEvent::Inserted {
                parent: parent.clone(),
                first: position,
                last: last_row(position, count),
            });
        }
        Ok(parent.child(position))
    }

    pub(crate) fn attach_nodes(&mut self, parent: &NodeAddress, nodes: Vec<TreeNode>) -> Result<NodeAddress, TreeError> {
        let len = self.resolve(parent)?.child_count();
        self.insert_nodes(parent, len, nodes)
    }

    pub(crate) fn detach_nodes(
        &mut self,
        parent: &NodeAddress,
        position: usize,
        count: usize,
    ) -> Result<Vec<TreeNode>, TreeError> {
        let node = self.resolve_mut(parent)?;
        let len = node.child_count();
        let detached = node
            .detach_children(position, count)
            .ok_or(TreeError::OutOfRange { position, count, len })?;
        if count > 0 {
            self.pending.push(TreeEvent::Removed {
                parent: parent.clone(),
                first: position,
                last: last_row(position, count),
            });
        }
        Ok(detached)
    }

    pub(crate) fn remove_nodes(&mut self, parent: &NodeAddress, position: usize, count: usize) -> Result<(), TreeError> {
        // dropping the detached nodes destroys their subtrees
        self.detach_nodes(parent, position, count).map(drop)
    }

    /// Removes the node itself from its parent.
    pub(crate) fn remove_node(&mut self, addr: &NodeAddress) -> Result<(), TreeError> {
        let (Some(parent), Some(row)) = (addr.parent(), addr.row()) else {
            return Err(TreeError::InvalidAddress(addr.clone()));
        };
        self.remove_nodes(&parent, row, 1)
    }

    /// Top-level nodes keep the main-word kind.
    fn check_kind(addr: &NodeAddress, kind: NodeKind) -> Result<(), TreeError> {
        if addr.is_main_word() && kind != NodeKind::MainWord {
            return Err(TreeError::MainWordKind(addr.clone()));
        }
        Ok(())
    }

    pub(crate) fn set_attribute(&mut self, addr: &NodeAddress, attribute: Attribute) -> Result<(), TreeError> {
        if let Attribute::Kind(kind) = &attribute {
            Self::check_kind(addr, *kind)?;
        }
        let is_word = matches!(attribute, Attribute::Word(_));
        let node = self.resolve_mut(addr)?;
        node.set(attribute);
        let children = node.child_count();
        self.pending.push(TreeEvent::DataChanged(addr.clone()));

        // the subtree holds translations of the previous word
        if is_word && addr.is_main_word() {
            if children > 0 {
                self.remove_nodes(addr, 0, children)?;
            }
            self.pending.push(TreeEvent::TranslationRequested(addr.clone()));
        }
        Ok(())
    }

    fn write(&mut self, addr: &NodeAddress, attributes: Vec<Attribute>) -> Result<(), TreeError> {
        let node = self.resolve_mut(addr)?;
        for attribute in attributes {
            if let Attribute::Kind(kind) = &attribute {
                if Self::check_kind(addr, *kind).is_err() {
                    continue;
                }
            }
            node.set(attribute);
        }
        self.pending.push(TreeEvent::DataChanged(addr.clone()));
        Ok(())
    }

    pub(crate) fn skip(&mut self, addr: &NodeAddress, inheritor: &NodeAddress) -> Result<(), TreeError> {
        self.hand_over(addr, inheritor, false)
    }

    /// Skip that puts the children in front of the inheritor's own.
    pub(crate) fn merge_into(&mut self, addr: &NodeAddress, inheritor: &NodeAddress) -> Result<(), TreeError> {
        self.hand_over(addr, inheritor, true)
    }

    fn hand_over(&mut self, addr: &NodeAddress, inheritor: &NodeAddress, in_front: bool) -> Result<(), TreeError> {
        if addr.is_root() || addr == inheritor || addr.is_ancestor_of(inheritor) {
            return Err(TreeError::CyclicMove {
                node: addr.clone(),
                target: inheritor.clone(),
            });
        }
        self.resolve(inheritor)?;
        let children = self.resolve_mut(addr)?.take_children();
        if !children.is_empty() {
            self.pending.push(TreeEvent::Removed {
                parent: addr.clone(),
                first: 0,
                last: children.len() - 1,
            });
        }
        self.remove_node(addr)?;

        let inheritor = inheritor
            .after_removal(addr)
            .ok_or_else(|| TreeError::InvalidAddress(inheritor.clone()))?;
        let position = if in_front { 0 } else { self.child_count(&inheritor) };
        self.insert_nodes(&inheritor, position, children).map(drop)
    }

    pub(crate) fn move_node(&mut self, addr: &NodeAddress, new_parent: &NodeAddress) -> Result<NodeAddress, TreeError> {
        if addr.is_root() || addr == new_parent || addr.is_ancestor_of(new_parent) {
            return Err(TreeError::CyclicMove {
                node: addr.clone(),
                target: new_parent.clone(),
            });
        }
        self.resolve(new_parent)?;
        let (Some(parent), Some(row)) = (addr.parent(), addr.row()) else {
            return Err(TreeError::InvalidAddress(addr.clone()));
        };
        let detached = self.detach_nodes(&parent, row, 1)?;
        let target = new_parent
            .after_removal(addr)
            .ok_or_else(|| TreeError::InvalidAddress(new_parent.clone()))?;
        self.attach_nodes(&target, detached)
    }

    fn copy_subtree(&mut self, from: &NodeAddress, to_parent: &NodeAddress) -> Result<NodeAddress, TreeError> {
        let copy = self.resolve(from)?.clone();
        self.attach_nodes(to_parent, vec![copy])
    }

    fn add_word(
        &mut self,
        word: &str,
        kind: NodeKind,
        parent: &NodeAddress,
        details: &WordDetails,
    ) -> Result<NodeAddress, TreeError> {
        let addr = self.add_nodes(parent, 1)?;
        let mut attributes = Vec::new();
        if !parent.is_root() {
            attributes.push(Attribute::Kind(kind));
        }
        // unset details stay inherited
        if !word.is_empty() {
            attributes.push(Attribute::Word(word.to_string()));
        }
        if !details.plural.is_empty() {
            attributes.push(Attribute::Plural(details.plural.clone()));
        }
        if details.word_class != WordClass::None {
            attributes.push(Attribute::WordClass(details.word_class));
        }
        if details.gender != Gender::None {
            attributes.push(Attribute::Gender(details.gender));
        }
        self.write(&addr, attributes)?;
        Ok(addr)
    }

    pub(crate) fn main_words(&self) -> Vec<NodeAddress> {
        (0..self.root.child_count()).map(NodeAddress::main_word).collect()
    }
}

impl TreeStore {
    pub fn new(source_lang: &str, target_lang: &str) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                root: TreeNode::root(source_lang),
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
                pending: Vec::new(),
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Receives every notification emitted from now on.
    pub fn subscribe(&self) -> kanal::Receiver<TreeEvent> {
        let (tx, rx) = kanal::unbounded();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Runs one mutation under the store lock, then publishes its events.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut StoreInner) -> R) -> R {
        let mut inner = lock(&self.inner);
        let result = f(&mut inner);
        let events = std::mem::take(&mut inner.pending);
        // taken before the store lock is released so events keep mutation order
        let mut subscribers = lock(&self.subscribers);
        drop(inner);

        if !events.is_empty() {
            subscribers.retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
        }
        result
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreInner) -> R) -> R {
        f(&lock(&self.inner))
    }

    // -- Language pair --

    pub fn set_languages(&self, source: &str, target: &str) {
        self.mutate(|inner| {
            inner.source_lang = source.to_lowercase();
            inner.target_lang = target.to_lowercase();
            inner.root.set(Attribute::Language(inner.source_lang.clone()));
        });
    }

    /// `(source, target)`
    pub fn languages(&self) -> (String, String) {
        self.read(|inner| (inner.source_lang.clone(), inner.target_lang.clone()))
    }

    // -- Structure --

    pub fn add_node(&self, parent: &NodeAddress) -> Result<NodeAddress, TreeError> {
        self.add_nodes(parent, 1)
    }

    /// Appends `count` children in one notification, returns the first one's address.
    pub fn add_nodes(&self, parent: &NodeAddress, count: usize) -> Result<NodeAddress, TreeError> {
        self.mutate(|inner| inner.add_nodes(parent, count))
    }

    /// Destroys `count` children of `parent` starting at `position`.
    pub fn remove_nodes(&self, parent: &NodeAddress, position: usize, count: usize) -> Result<(), TreeError> {
        self.mutate(|inner| inner.remove_nodes(parent, position, count))
    }

    /// Unlinks children without destroying them; the caller owns them until
    /// they are handed back through [`attach_nodes`](Self::attach_nodes).
    pub fn detach_nodes(&self, parent: &NodeAddress, position: usize, count: usize) -> Result<Vec<TreeNode>, TreeError> {
        self.mutate(|inner| inner.detach_nodes(parent, position, count))
    }

    pub fn attach_nodes(&self, parent: &NodeAddress, nodes: Vec<TreeNode>) -> Result<NodeAddress, TreeError> {
        self.mutate(|inner| inner.attach_nodes(parent, nodes))
    }

    /// Hands built nodes to `parent` in front of the child at `position`.
    pub fn insert_nodes(&self, parent: &NodeAddress, position: usize, nodes: Vec<TreeNode>) -> Result<NodeAddress, TreeError> {
        self.mutate(|inner| inner.insert_nodes(parent, position, nodes))
    }

    /// Detach and reattach under one lock; returns the node's new address.
    pub fn move_node(&self, addr: &NodeAddress, new_parent: &NodeAddress) -> Result<NodeAddress, TreeError> {
        self.mutate(|inner| inner.move_node(addr, new_parent))
    }

    /// Deep copy of `from` appended under `to_parent`.
    pub fn copy_subtree(&self, from: &NodeAddress, to_parent: &NodeAddress) -> Result<NodeAddress, TreeError> {
        self.mutate(|inner| inner.copy_subtree(from, to_parent))
    }

    /// Hands the children of `addr` to `inheritor`, then deletes `addr`.
    pub fn skip(&self, addr: &NodeAddress, inheritor: &NodeAddress) -> Result<(), TreeError> {
        self.mutate(|inner| inner.skip(addr, inheritor))
    }

    pub fn sort_children(&self, addr: &NodeAddress) -> Result<(), TreeError> {
        self.mutate(|inner| {
            inner.resolve_mut(addr)?.sort_children();
            inner.pending.push(TreeEvent::LayoutChanged(addr.clone()));
            Ok(())
        })
    }

    // -- Attributes --

    /// Writes one attribute. A new word on a main word drops its translations
    /// and emits [`TreeEvent::TranslationRequested`].
    pub fn set_attribute(&self, addr: &NodeAddress, attribute: Attribute) -> Result<(), TreeError> {
        self.mutate(|inner| inner.set_attribute(addr, attribute))
    }

    /// Replaces the whole attribute set.
    pub fn set_attributes(&self, addr: &NodeAddress, attributes: Attributes) -> Result<(), TreeError> {
        self.mutate(|inner| {
            StoreInner::check_kind(addr, attributes.kind)?;
            inner.resolve_mut(addr)?.set_attributes(attributes);
            inner.pending.push(TreeEvent::DataChanged(addr.clone()));
            Ok(())
        })
    }

    /// Cosmetic word change: keeps the subtree and requests nothing.
    pub fn retouch_word(&self, addr: &NodeAddress, word: &str) -> Result<(), TreeError> {
        self.mutate(|inner| inner.write(addr, vec![Attribute::Word(word.to_string())]))
    }

    // -- Typed inserts --

    pub fn add_main_word(&self, word: &str) -> NodeAddress {
        self.mutate(|inner| {
            let addr = inner.root.add_children(1);
            let language = inner.source_lang.clone();
            if let Some(node) = inner.root.child_mut(addr) {
                node.set(Attribute::Kind(NodeKind::MainWord));
                node.set(Attribute::Language(language));
                node.set(Attribute::Word(word.to_string()));
            }
            inner.pending.push(TreeEvent::Inserted {
                parent: NodeAddress::root(),
                first: addr,
                last: addr,
            });
            NodeAddress::main_word(addr)
        })
    }

    pub fn add_main_words<S: AsRef<str>>(&self, words: &[S]) -> Vec<NodeAddress> {
        words.iter().map(|word| self.add_main_word(word.as_ref())).collect()
    }

    pub fn add_context(&self, context: &str, parent: &NodeAddress) -> Result<NodeAddress, TreeError> {
        self.mutate(|inner| {
            let addr = inner.add_nodes(parent, 1)?;
            inner.write(
                &addr,
                vec![
                    Attribute::Kind(NodeKind::Context),
                    Attribute::Context(context.to_string()),
                ],
            )?;
            Ok(addr)
        })
    }

    pub fn add_word(
        &self,
        word: &str,
        kind: NodeKind,
        parent: &NodeAddress,
        details: &WordDetails,
    ) -> Result<NodeAddress, TreeError> {
        self.mutate(|inner| inner.add_word(word, kind, parent, details))
    }

    /// Translation leaf tagged with the target language.
    pub fn add_target_word(&self, word: &str, parent: &NodeAddress, details: &WordDetails) -> Result<NodeAddress, TreeError> {
        self.mutate(|inner| {
            let addr = inner.add_word(word, NodeKind::TargetWord, parent, details)?;
            let language = inner.target_lang.clone();
            inner.write(&addr, vec![Attribute::Language(language)])?;
            Ok(addr)
        })
    }

    // -- Bulk --

    /// Removes every main word.
    pub fn clear(&self) {
        self.mutate(|inner| {
            let count = inner.root.child_count();
            if let Err(e) = inner.remove_nodes(&NodeAddress::root(), 0, count) {
                tracing::error!("clear failed: {}", e);
            }
        });
    }

    /// Removes every main word's subtree, keeping the words.
    pub fn clear_translations(&self) {
        self.mutate(|inner| {
            for addr in inner.main_words() {
                let count = inner.child_count(&addr);
                if count > 0 {
                    if let Err(e) = inner.remove_nodes(&addr, 0, count) {
                        tracing::error!("clearing {} failed: {}", addr, e);
                    }
                }
            }
        });
    }

    // -- Reading --

    pub fn attributes(&self, addr: &NodeAddress) -> Option<Attributes> {
        self.read(|inner| inner.node(addr).map(|node| node.attributes().clone()))
    }

    pub fn display(&self, addr: &NodeAddress) -> Option<String> {
        self.read(|inner| inner.node(addr).map(TreeNode::display))
    }

    pub fn child_count(&self, addr: &NodeAddress) -> Option<usize> {
        self.read(|inner| inner.node(addr).map(TreeNode::child_count))
    }

    pub fn children_display(&self, addr: &NodeAddress) -> Option<Vec<String>> {
        self.read(|inner| inner.node(addr).map(TreeNode::children_display))
    }

    /// Copy of the subtree rooted at `addr`.
    pub fn subtree(&self, addr: &NodeAddress) -> Option<TreeNode> {
        self.read(|inner| inner.node(addr).cloned())
    }

    /// Nodes in the tree, not counting the implicit root.
    pub fn node_count(&self) -> usize {
        self.read(|inner| inner.root.node_count() - 1)
    }

    pub fn main_words(&self) -> Vec<NodeAddress> {
        self.read(StoreInner::main_words)
    }

    /// Source-side text a translation belongs to: the display of the nearest
    /// plain or main-word ancestor.
    pub fn source_for(&self, addr: &NodeAddress) -> Option<String> {
        self.read(|inner| {
            let mut current = addr.parent()?;
            while !current.is_root() {
                let node = inner.node(&current)?;
                if matches!(node.kind(), NodeKind::Plain | NodeKind::MainWord) {
                    return Some(node.display());
                }
                current = current.parent()?;
            }
            None
        })
    }

    /// Indented display lines of the subtree at `addr`.
    pub fn outline(&self, addr: &NodeAddress) -> Option<String> {
        fn walk(node: &TreeNode, depth: usize, out: &mut String) {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&node.display());
            out.push('\n');
            for child in node.children() {
                walk(child, depth + 1, out);
            }
        }

        self.read(|inner| {
            let node = inner.node(addr)?;
            let mut out = String::new();
            walk(node, 0, &mut out);
            Some(out)
        })
    }
}
