//! Nested sorted-cursor protocol and the trie-backed index.

use crate::leapfrog::{LeapfrogIterator, VecCursor};
use crate::relation::{TrieNode, TrieRelation};
use alloc::vec;
use alloc::vec::Vec;
use trellis_core::{Error, Result, Value};

/// A sorted cursor over nested collections, with an explicit level stack.
///
/// `level` and `max_level` count the index's own nesting depth; the query
/// levels an index binds are exposed through `participates`.
pub trait LeapfrogIndex: LeapfrogIterator {
    /// Pushes a cursor over the children keyed by the current value.
    fn open_level(&mut self) -> Result<()>;

    /// Pops back to the parent cursor, which keeps its position.
    fn close_level(&mut self) -> Result<()>;

    /// Current depth in the level stack (0 at the root).
    fn level(&self) -> usize;

    /// Deepest reachable level.
    fn max_level(&self) -> usize;

    /// Resets to the root level without rebuilding the index.
    fn reinit(&mut self) -> Result<()>;

    /// Whether this index contributes at the given query level.
    fn participates(&self, level: usize) -> bool;
}

/// Leapfrog view over a `TrieRelation`.
pub struct TrieIndex<'a> {
    relation: &'a TrieRelation,
    nodes: Vec<&'a TrieNode>,
    cursors: Vec<VecCursor>,
}

impl<'a> TrieIndex<'a> {
    pub fn new(relation: &'a TrieRelation) -> Self {
        let root = relation.root();
        Self {
            relation,
            nodes: vec![root],
            cursors: vec![Self::cursor_over(root)],
        }
    }

    fn cursor_over(node: &TrieNode) -> VecCursor {
        VecCursor::new(node.children.keys().cloned().collect())
    }

    fn top(&self) -> &VecCursor {
        // The stack never drops below one cursor.
        &self.cursors[self.cursors.len() - 1]
    }

    fn top_mut(&mut self) -> &mut VecCursor {
        let last = self.cursors.len() - 1;
        &mut self.cursors[last]
    }
}

impl LeapfrogIterator for TrieIndex<'_> {
    fn key(&self) -> Result<&Value> {
        self.top().key()
    }

    fn next(&mut self) -> Result<()> {
        self.top_mut().next()
    }

    fn seek(&mut self, key: &Value) -> Result<()> {
        self.top_mut().seek(key)
    }

    fn at_end(&self) -> bool {
        self.top().at_end()
    }
}

impl LeapfrogIndex for TrieIndex<'_> {
    fn open_level(&mut self) -> Result<()> {
        if self.level() >= self.max_level() {
            return Err(Error::level_overflow(self.level() + 1, self.max_level()));
        }
        let key = self.top().key()?.clone();
        let node = match self.nodes[self.nodes.len() - 1].children.get(&key) {
            Some(node) => node,
            // The cursor only ever holds keys taken from the node itself.
            None => {
                return Err(Error::invalid_operation(
                    "cursor key has no matching trie child",
                ))
            }
        };
        self.cursors.push(Self::cursor_over(node));
        self.nodes.push(node);
        Ok(())
    }

    fn close_level(&mut self) -> Result<()> {
        if self.cursors.len() <= 1 {
            return Err(Error::LevelUnderflow);
        }
        self.cursors.pop();
        self.nodes.pop();
        Ok(())
    }

    fn level(&self) -> usize {
        self.cursors.len() - 1
    }

    fn max_level(&self) -> usize {
        self.relation.levels().len() - 1
    }

    fn reinit(&mut self) -> Result<()> {
        let root = self.relation.root();
        self.nodes.clear();
        self.nodes.push(root);
        self.cursors.clear();
        self.cursors.push(Self::cursor_over(root));
        Ok(())
    }

    fn participates(&self, level: usize) -> bool {
        self.relation.levels().contains(&level)
    }
}
