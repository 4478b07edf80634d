//! Incremental distinct: threshold crossings over accumulated weights.

use crate::operator::Operator;
use alloc::vec::Vec;
use hashbrown::HashMap;
use trellis_algebra::{Weight, ZSet};
use trellis_core::{Result, Tuple};

/// Turns a stream of weighted tuple deltas into a presence/absence stream.
///
/// Per input tuple, with `old` the committed accumulated weight and `new =
/// old + delta`: emits `+1` on a `<= 0` to `> 0` crossing, `-1` on the
/// reverse crossing, and nothing otherwise. The accumulated map is mutated
/// only by `commit`, which drops entries reaching exactly zero. Lookup-only
/// state, so iteration order cannot leak into the output.
pub struct IncrementalDistinct<W> {
    accumulated: HashMap<Tuple, W>,
    pending: ZSet<Tuple, W>,
}

impl<W: Weight> IncrementalDistinct<W> {
    pub fn new() -> Self {
        Self {
            accumulated: HashMap::new(),
            pending: ZSet::empty(),
        }
    }
}

impl<W: Weight> Default for IncrementalDistinct<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Weight> Operator<W> for IncrementalDistinct<W> {
    fn eval(&mut self, input: &ZSet<Tuple, W>) -> Result<ZSet<Tuple, W>> {
        let mut crossings = Vec::new();
        for (tuple, delta) in input.iter() {
            let old = self
                .accumulated
                .get(tuple)
                .cloned()
                .unwrap_or_else(W::zero);
            let new = old.add(delta)?;
            if !old.is_positive() && new.is_positive() {
                crossings.push((tuple.clone(), W::one()));
            } else if old.is_positive() && !new.is_positive() {
                crossings.push((tuple.clone(), W::one().negate()?));
            }
        }
        self.pending = input.clone();
        ZSet::from_entries(crossings)
    }

    fn commit(&mut self) -> Result<()> {
        for (tuple, delta) in self.pending.iter() {
            let old = self
                .accumulated
                .get(tuple)
                .cloned()
                .unwrap_or_else(W::zero);
            let new = old.add(delta)?;
            if new.is_zero() {
                self.accumulated.remove(tuple);
            } else {
                self.accumulated.insert(tuple.clone(), new);
            }
        }
        self.pending = ZSet::empty();
        Ok(())
    }
}
