//! Rewrites a main word's raw subtree into the smallest tree carrying the same
//! source -> sense -> category -> translation relations.
//!
//! Children are visited depth-first, post-order. After a rule rewrites the node
//! at some index, the same index is visited again since siblings have shifted.
//! Rules are tried in this order and the first one that applies wins:
//!
//! 1. a speech part without children is removed;
//! 2. a node displaying the same text as its next sibling is merged into it, its
//!    children going first;
//! 3. an entry whose word is the main word, or any node displaying its parent's
//!    text, is skipped into the parent;
//! 4. a node with children under a speech part moves up next to the speech part;
//! 5. an only child with children is skipped into its parent.
//!
//! Every rewrite removes a node or moves one closer to the root. Passes repeat
//! until one makes no rewrite, so the result is a fixed point and simplifying
//! again changes nothing. A rewrite cap guards against non-termination.

use glosa_types::NodeAddress;

use crate::error::TreeError;
use crate::lookup::fold_case;
use crate::node::NodeKind;
use crate::store::{StoreInner, TreeStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    PruneEmptySpeechPart,
    MergeTwin,
    DropRedundant,
    BypassSpeechPart,
    FlattenOnlyChild,
}

struct Simplifier {
    /// Folded word of the main word, without article or plural
    main_word: String,
    rewrites: usize,
    cap: usize,
}

impl Simplifier {
    fn budget_left(&self) -> Result<(), TreeError> {
        if self.rewrites >= self.cap {
            return Err(TreeError::SimplificationCap {
                rewrites: self.rewrites,
            });
        }
        Ok(())
    }

    /// Visits every child of `parent`, retrying an index after each rewrite.
    fn children(&mut self, tree: &mut StoreInner, parent: &NodeAddress) -> Result<(), TreeError> {
        let mut row = 0;
        while row < tree.child_count(parent) {
            if self.node(tree, &parent.child(row))? {
                continue;
            }
            row += 1;
        }
        Ok(())
    }

    /// Returns true if the node at `addr` was rewritten.
    fn node(&mut self, tree: &mut StoreInner, addr: &NodeAddress) -> Result<bool, TreeError> {
        self.children(tree, addr)?;

        let Some(rule) = self.matching_rule(tree, addr) else {
            return Ok(false);
        };
        self.budget_left()?;
        self.rewrites += 1;
        tracing::trace!("simplify {}: {:?}", addr, rule);

        let parent = addr
            .parent()
            .ok_or_else(|| TreeError::InvalidAddress(addr.clone()))?;
        match rule {
            Rule::PruneEmptySpeechPart => tree.remove_node(addr)?,
            Rule::MergeTwin => {
                let next = addr
                    .next_sibling()
                    .ok_or_else(|| TreeError::InvalidAddress(addr.clone()))?;
                tree.merge_into(addr, &next)?;
            }
            Rule::DropRedundant | Rule::FlattenOnlyChild => tree.skip(addr, &parent)?,
            Rule::BypassSpeechPart => {
                let grandparent = parent
                    .parent()
                    .ok_or_else(|| TreeError::InvalidAddress(parent.clone()))?;
                tree.move_node(addr, &grandparent)?;
            }
        }
        Ok(true)
    }

    fn matching_rule(&self, tree: &StoreInner, addr: &NodeAddress) -> Option<Rule> {
        let node = tree.node(addr)?;
        let parent = addr.parent()?;
        let row = addr.row()?;
        let siblings = tree.child_count(&parent);
        let display = node.display();

        if node.kind() == NodeKind::SpeechPart && !node.has_children() {
            return Some(Rule::PruneEmptySpeechPart);
        }

        if row + 1 < siblings {
            let next = addr.next_sibling()?;
            if tree.display(&next) == display {
                return Some(Rule::MergeTwin);
            }
        }

        // speech parts and contexts inherit the main word's word
        let restates_main_word =
            node.kind() == NodeKind::Plain && fold_case(&node.attributes().word) == self.main_word;
        if restates_main_word || fold_case(&display) == fold_case(&tree.display(&parent)) {
            return Some(Rule::DropRedundant);
        }

        if tree.kind(&parent) == Some(NodeKind::SpeechPart) && node.has_children() && !parent.is_root() {
            return Some(Rule::BypassSpeechPart);
        }

        if siblings == 1 && node.has_children() {
            return Some(Rule::FlattenOnlyChild);
        }

        None
    }
}

impl TreeStore {
    /// Simplifies the subtree of one main word in place, returning how many
    /// rewrites were applied.
    ///
    /// `rewrite_factor` bounds the work to `rewrite_factor` rewrites per node
    /// present at the start; hitting the bound leaves the tree valid but only
    /// partly simplified and is reported as [`TreeError::SimplificationCap`].
    pub fn simplify(&self, main_word: &NodeAddress, rewrite_factor: usize) -> Result<usize, TreeError> {
        self.mutate(|tree| {
            let node = tree
                .node(main_word)
                .ok_or_else(|| TreeError::InvalidAddress(main_word.clone()))?;
            if node.kind() != NodeKind::MainWord {
                return Err(TreeError::NotMainWord(main_word.clone()));
            }

            let mut simplifier = Simplifier {
                main_word: fold_case(&node.attributes().word),
                rewrites: 0,
                cap: rewrite_factor.max(1) * node.node_count(),
            };
            loop {
                let before = simplifier.rewrites;
                if let Err(e) = simplifier.children(tree, main_word) {
                    tracing::error!("simplification of {} aborted: {}", main_word, e);
                    return Err(e);
                }
                if simplifier.rewrites == before {
                    break;
                }
            }
            tracing::debug!("simplified {} with {} rewrites", main_word, simplifier.rewrites);
            Ok(simplifier.rewrites)
        })
    }
}
