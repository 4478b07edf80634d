//! In-memory sorted-trie relation.
//!
//! `TrieRelation` stores a relation as a trie of ordered maps, one trie
//! depth per column, and declares the query levels its columns bind. It
//! implements the prefix-extender protocol directly and backs the leapfrog
//! `TrieIndex` adapter. External collections (B-trees, hash maps) plug into
//! the engines the same way by implementing the same traits.

use crate::extender::PrefixExtender;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use trellis_core::{Error, Result, Tuple, Value};

/// One trie node; leaves have no children.
#[derive(Debug, Default, Clone)]
pub(crate) struct TrieNode {
    pub(crate) children: BTreeMap<Value, TrieNode>,
}

/// A relation stored as a sorted trie, bound to a strictly increasing list
/// of query levels (one per column).
pub struct TrieRelation {
    levels: Vec<usize>,
    root: TrieNode,
}

impl TrieRelation {
    /// Builds the trie from complete tuples. Fails on an empty or
    /// non-increasing level list, or on a tuple whose arity differs from the
    /// number of levels.
    pub fn new(levels: Vec<usize>, tuples: &[Tuple]) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::empty_combinator("TrieRelation"));
        }
        if levels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::invalid_operation(
                "relation levels must be strictly increasing",
            ));
        }
        let mut root = TrieNode::default();
        for tuple in tuples {
            if tuple.len() != levels.len() {
                return Err(Error::invalid_operation(
                    "tuple arity differs from the relation's level count",
                ));
            }
            let mut node = &mut root;
            for value in tuple {
                node = node.children.entry(value.clone()).or_default();
            }
        }
        Ok(Self { levels, root })
    }

    /// The query levels this relation binds.
    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    pub(crate) fn root(&self) -> &TrieNode {
        &self.root
    }

    /// This relation's own column index for a query level, if it binds it.
    fn column_of(&self, level: usize) -> Option<usize> {
        self.levels.iter().position(|&l| l == level)
    }

    /// Walks the trie down `column` steps, following the prefix values bound
    /// at this relation's levels. `None` when the path is absent.
    fn node_for(&self, prefix: &[Value], column: usize) -> Option<&TrieNode> {
        let mut node = &self.root;
        for bound in &self.levels[..column] {
            node = node.children.get(&prefix[*bound])?;
        }
        Some(node)
    }
}

impl PrefixExtender for TrieRelation {
    fn count(&self, prefix: &[Value]) -> usize {
        match self.column_of(prefix.len()) {
            Some(column) => self
                .node_for(prefix, column)
                .map_or(0, |n| n.children.len()),
            None => 0,
        }
    }

    fn propose(&self, prefix: &[Value]) -> Result<Vec<Value>> {
        let column = match self.column_of(prefix.len()) {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };
        Ok(self
            .node_for(prefix, column)
            .map(|n| n.children.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn extend(&self, prefix: &[Value], candidates: &[Value]) -> Result<Vec<Value>> {
        let column = match self.column_of(prefix.len()) {
            // A level this relation does not bind adds no constraint.
            None => return Ok(candidates.to_vec()),
            Some(c) => c,
        };
        match self.node_for(prefix, column) {
            Some(node) => Ok(candidates
                .iter()
                .filter(|c| node.children.contains_key(*c))
                .cloned()
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    fn participates(&self, level: usize) -> bool {
        self.levels.contains(&level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn pairs(rows: &[(i64, i64)]) -> Vec<Tuple> {
        rows.iter()
            .map(|&(a, b)| vec![Value::Int(a), Value::Int(b)])
            .collect()
    }

    #[test]
    fn test_construction_validation() {
        assert!(TrieRelation::new(vec![], &[]).is_err());
        assert!(TrieRelation::new(vec![1, 0], &[]).is_err());
        assert!(TrieRelation::new(vec![0], &pairs(&[(1, 2)])).is_err());
        assert!(TrieRelation::new(vec![0, 1], &pairs(&[(1, 2)])).is_ok());
    }

    #[test]
    fn test_propose_and_extend() {
        let r = TrieRelation::new(vec![0, 1], &pairs(&[(1, 10), (1, 11), (2, 20)])).unwrap();
        assert!(r.participates(0));
        assert!(r.participates(1));
        assert!(!r.participates(2));

        assert_eq!(r.count(&[]), 2);
        assert_eq!(
            r.propose(&[]).unwrap(),
            vec![Value::Int(1), Value::Int(2)]
        );

        let prefix = [Value::Int(1)];
        assert_eq!(r.count(&prefix), 2);
        assert_eq!(
            r.propose(&prefix).unwrap(),
            vec![Value::Int(10), Value::Int(11)]
        );
        let filtered = r
            .extend(&prefix, &[Value::Int(10), Value::Int(12)])
            .unwrap();
        assert_eq!(filtered, vec![Value::Int(10)]);

        // Absent path means no candidates survive.
        assert!(r.propose(&[Value::Int(9)]).unwrap().is_empty());
        assert_eq!(r.count(&[Value::Int(9)]), 0);
    }

    #[test]
    fn test_sparse_levels_skip_unbound_positions() {
        // Binds query levels 0 and 2; level 1 belongs to another relation.
        let r = TrieRelation::new(vec![0, 2], &pairs(&[(1, 10), (2, 20)])).unwrap();
        assert!(!r.participates(1));

        // At level 2 the prefix holds three-level bindings 0 and 1; only
        // position 0 is consulted.
        let prefix = [Value::Int(1), Value::Int(99)];
        assert_eq!(r.propose(&prefix).unwrap(), vec![Value::Int(10)]);

        // Level 1 passes candidates through untouched.
        let c = [Value::Int(7)];
        assert_eq!(r.extend(&[Value::Int(1)], &c).unwrap(), c.to_vec());
    }

    #[test]
    fn test_duplicate_tuples_collapse() {
        let r = TrieRelation::new(vec![0, 1], &pairs(&[(1, 10), (1, 10)])).unwrap();
        assert_eq!(r.count(&[Value::Int(1)]), 1);
    }
}
