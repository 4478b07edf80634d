//! Per-relation incremental state: the delta/accumulated pair.

use alloc::vec::Vec;
use trellis_algebra::{IndexedZSet, Weight, ZSet};
use trellis_core::{Error, Result, Value};

/// One relation in an incremental join, long-lived across pipeline steps.
///
/// Holds exactly two Z-set-algebra values: `delta`, replaced each step by
/// `receive_delta`, and `accumulated`, the committed history. A relation
/// with k columns stores them at nesting depth k-1 and binds k strictly
/// increasing query levels.
pub struct IncrementalRelation<W> {
    levels: Vec<usize>,
    delta: IndexedZSet<Value, W>,
    accumulated: IndexedZSet<Value, W>,
}

impl<W: Weight> IncrementalRelation<W> {
    pub fn new(levels: Vec<usize>) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::empty_combinator("IncrementalRelation"));
        }
        if levels.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::invalid_operation(
                "relation levels must be strictly increasing",
            ));
        }
        Ok(Self {
            levels,
            delta: IndexedZSet::empty(),
            accumulated: IndexedZSet::empty(),
        })
    }

    /// The query levels this relation binds.
    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    /// Stores this step's input delta, replacing any previous one.
    pub fn receive_delta(&mut self, delta: IndexedZSet<Value, W>) -> Result<()> {
        if let Some(depth) = delta.depth() {
            if depth != self.levels.len() - 1 {
                return Err(Error::depth_mismatch(self.levels.len() - 1, depth));
            }
        }
        self.delta = delta;
        Ok(())
    }

    /// Folds the stored delta into the accumulated history and clears it.
    pub fn commit(&mut self) -> Result<()> {
        self.accumulated = self.accumulated.add(&self.delta)?;
        self.delta = IndexedZSet::empty();
        Ok(())
    }

    /// The committed history.
    pub fn accumulated(&self) -> &IndexedZSet<Value, W> {
        &self.accumulated
    }

    /// Extender view over this step's delta.
    pub fn delta_view(&self) -> ZSetExtenderView<'_, W> {
        ZSetExtenderView {
            structure: &self.delta,
            levels: &self.levels,
        }
    }

    /// Extender view over the committed history.
    pub fn accumulated_view(&self) -> ZSetExtenderView<'_, W> {
        ZSetExtenderView {
            structure: &self.accumulated,
            levels: &self.levels,
        }
    }

    /// The (change, baseline) extension pair at one query level under
    /// `prefix`.
    ///
    /// The baseline is the committed proposal. The change is what this
    /// step's delta does to it: true delta weights at the relation's last
    /// column, presence flips at inner columns. A group key that exists both
    /// before and after the delta therefore contributes no inner-column
    /// change, and a group the delta cancels away contributes a retraction.
    pub fn extensions_at(
        &self,
        prefix: &[Value],
        level: usize,
    ) -> Result<(ZSet<Value, W>, ZSet<Value, W>)> {
        let baseline = self.accumulated_view().propose(prefix)?;
        let column = match self.levels.iter().position(|&l| l == level) {
            Some(column) => column,
            None => return Ok((ZSet::empty(), baseline)),
        };
        if column + 1 == self.levels.len() {
            return Ok((self.delta_view().propose(prefix)?, baseline));
        }
        let path: Vec<Value> = self.levels[..column]
            .iter()
            .map(|&bound| prefix[bound].clone())
            .collect();
        let committed = self.accumulated.node_at(&path);
        let mut flips = Vec::new();
        if let Some(IndexedZSet::Node(changed)) = self.delta.node_at(&path) {
            for (key, child) in changed {
                let existing = match committed {
                    Some(IndexedZSet::Node(map)) => map.get(key),
                    _ => None,
                };
                let (was, now) = match existing {
                    Some(existing) => (true, !existing.add(child)?.is_empty()),
                    None => (false, !child.is_empty()),
                };
                match (was, now) {
                    (false, true) => flips.push((key.clone(), W::one())),
                    (true, false) => flips.push((key.clone(), W::one().negate()?)),
                    _ => {}
                }
            }
        }
        Ok((ZSet::from_entries(flips)?, baseline))
    }

    /// Whether this step's delta holds anything under the prefix positions
    /// this relation binds.
    pub fn delta_reaches(&self, prefix: &[Value]) -> bool {
        let mut node = &self.delta;
        for &level in self.levels.iter() {
            if level >= prefix.len() {
                break;
            }
            match node {
                IndexedZSet::Node(children) => match children.get(&prefix[level]) {
                    Some(child) => node = child,
                    None => return false,
                },
                IndexedZSet::Leaf(_) => return false,
            }
        }
        !node.is_empty()
    }
}

/// Prefix-extender-shaped view over one indexed Z-set, answering in weighted
/// extension Z-sets rather than candidate lists.
///
/// Proposals carry the stored weights at the relation's last column (the
/// leaf) and presence weight one at inner columns, so a relation contributes
/// its tuple weight exactly once per result tuple.
pub struct ZSetExtenderView<'a, W> {
    structure: &'a IndexedZSet<Value, W>,
    levels: &'a [usize],
}

impl<W: Weight> ZSetExtenderView<'_, W> {
    fn column_of(&self, level: usize) -> Option<usize> {
        self.levels.iter().position(|&l| l == level)
    }

    /// The substructure under the prefix values this view's levels bind.
    fn node_under(&self, prefix: &[Value], column: usize) -> Option<&IndexedZSet<Value, W>> {
        let path: Vec<Value> = self.levels[..column]
            .iter()
            .map(|&bound| prefix[bound].clone())
            .collect();
        self.structure.node_at(&path)
    }

    /// Whether this view contributes at the given query level.
    pub fn participates(&self, level: usize) -> bool {
        self.levels.contains(&level)
    }

    /// Cheap candidate-count estimate at the next level.
    pub fn count(&self, prefix: &[Value]) -> usize {
        let column = match self.column_of(prefix.len()) {
            Some(column) => column,
            None => return 0,
        };
        match self.node_under(prefix, column) {
            Some(IndexedZSet::Leaf(zset)) => zset.len(),
            Some(IndexedZSet::Node(map)) => map.len(),
            None => 0,
        }
    }

    /// The weighted extension Z-set for `prefix`.
    pub fn propose(&self, prefix: &[Value]) -> Result<ZSet<Value, W>> {
        let column = match self.column_of(prefix.len()) {
            Some(column) => column,
            None => return Ok(ZSet::empty()),
        };
        match self.node_under(prefix, column) {
            Some(IndexedZSet::Leaf(zset)) => Ok(zset.clone()),
            Some(IndexedZSet::Node(map)) => {
                ZSet::from_entries(map.keys().map(|k| (k.clone(), W::one())))
            }
            None => Ok(ZSet::empty()),
        }
    }

    /// Natural join of `candidates` against this view's proposal.
    pub fn intersect(
        &self,
        prefix: &[Value],
        candidates: &ZSet<Value, W>,
    ) -> Result<ZSet<Value, W>> {
        self.propose(prefix)?.natural_join(candidates)
    }
}
