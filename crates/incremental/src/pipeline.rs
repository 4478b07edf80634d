//! Pipeline: a join source chained with transform operators.

use crate::join::IncrementalJoin;
use crate::operator::Operator;
use alloc::boxed::Box;
use alloc::vec::Vec;
use trellis_algebra::{IndexedZSet, Weight, ZSet};
use trellis_core::{Result, Tuple, Value};

/// One incremental join feeding a declared chain of transforms.
///
/// A step runs every `eval` in declared order, each transform consuming the
/// previous output, then every `commit` in the same order. No state moves
/// until every operator has evaluated, so the whole chain observes the
/// previous step's snapshot.
pub struct Pipeline<W> {
    join: IncrementalJoin<W>,
    transforms: Vec<Box<dyn Operator<W>>>,
}

impl<W: Weight> Pipeline<W> {
    pub fn new(join: IncrementalJoin<W>, transforms: Vec<Box<dyn Operator<W>>>) -> Self {
        Self { join, transforms }
    }

    /// The join source's relations.
    pub fn join(&self) -> &IncrementalJoin<W> {
        &self.join
    }

    /// Runs one step over one delta per relation, returning the final
    /// output delta.
    pub fn step(&mut self, deltas: Vec<IndexedZSet<Value, W>>) -> Result<ZSet<Tuple, W>> {
        let mut current = self.join.eval(deltas)?;
        for transform in self.transforms.iter_mut() {
            current = transform.eval(&current)?;
        }
        self.join.commit()?;
        for transform in self.transforms.iter_mut() {
            transform.commit()?;
        }
        Ok(current)
    }
}
