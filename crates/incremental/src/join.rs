//! The incremental join engine.
//!
//! Evaluates the step's output delta without touching committed state. Per
//! join level and open prefix every participating relation contributes a
//! (change, baseline) extension pair: the committed proposal and what this
//! step's delta does to it. With `new = baseline + change`, the pairs fold
//! bilinearly within a level,
//!
//! ```text
//! change'   = change ⋈ new_i  +  baseline ⋈ change_i
//! baseline' = baseline ⋈ baseline_i
//! ```
//!
//! and the accumulator carries the same pair across levels, so the emitted
//! weight of every tuple is exactly its joined weight after the deltas minus
//! its committed joined weight. Committed extensions under a freshly changed
//! prefix and retractions under prefixes whose own change is zero both fall
//! out of the baseline term. Relations fold smallest-delta first (declared
//! order on ties).

use crate::relation::IncrementalRelation;
use alloc::vec::Vec;
use trellis_algebra::{IndexedZSet, Weight, ZSet};
use trellis_core::{Error, Result, Tuple, Value};

/// Per-key (change, baseline) weights carried through the level accumulator.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ChangePair<W> {
    change: W,
    baseline: W,
}

impl<W: Weight> Weight for ChangePair<W> {
    fn zero() -> Self {
        Self {
            change: W::zero(),
            baseline: W::zero(),
        }
    }

    fn one() -> Self {
        Self {
            change: W::one(),
            baseline: W::one(),
        }
    }

    fn add(&self, other: &Self) -> Result<Self> {
        Ok(Self {
            change: self.change.add(&other.change)?,
            baseline: self.baseline.add(&other.baseline)?,
        })
    }

    fn negate(&self) -> Result<Self> {
        Ok(Self {
            change: self.change.negate()?,
            baseline: self.baseline.negate()?,
        })
    }

    fn multiply(&self, other: &Self) -> Result<Self> {
        Ok(Self {
            change: self.change.multiply(&other.change)?,
            baseline: self.baseline.multiply(&other.baseline)?,
        })
    }

    fn multiply_scalar(&self, scalar: i64) -> Result<Self> {
        Ok(Self {
            change: self.change.multiply_scalar(scalar)?,
            baseline: self.baseline.multiply_scalar(scalar)?,
        })
    }
}

/// Extends one accumulator entry by a level's (change, baseline) extension
/// Z-sets, over the union of both supports. A key deleted by the level
/// (`new = 0`) still yields the retraction of its baseline weight.
fn extend_pair<W: Weight>(
    pair: &ChangePair<W>,
    change: &ZSet<Value, W>,
    baseline: &ZSet<Value, W>,
) -> Result<ZSet<Value, ChangePair<W>>> {
    let mut entries = Vec::new();
    for (key, step_change) in change.iter() {
        let step_baseline = baseline.weight(key);
        let step_new = step_change.add(&step_baseline)?;
        entries.push((
            key.clone(),
            ChangePair {
                change: pair
                    .change
                    .multiply(&step_new)?
                    .add(&pair.baseline.multiply(step_change)?)?,
                baseline: pair.baseline.multiply(&step_baseline)?,
            },
        ));
    }
    for (key, step_baseline) in baseline.iter() {
        if change.contains(key) {
            continue;
        }
        entries.push((
            key.clone(),
            ChangePair {
                change: pair.change.multiply(step_baseline)?,
                baseline: pair.baseline.multiply(step_baseline)?,
            },
        ));
    }
    ZSet::from_entries(entries)
}

pub struct IncrementalJoin<W> {
    levels: usize,
    relations: Vec<IncrementalRelation<W>>,
}

impl<W: Weight> IncrementalJoin<W> {
    /// Builds the engine, checking every level has a participating relation.
    pub fn new(levels: usize, relations: Vec<IncrementalRelation<W>>) -> Result<Self> {
        if relations.is_empty() {
            return Err(Error::empty_combinator("IncrementalJoin"));
        }
        for level in 0..levels {
            if !relations.iter().any(|r| r.levels().contains(&level)) {
                return Err(Error::invalid_operation(
                    "no relation participates at the requested level",
                ));
            }
        }
        Ok(Self { levels, relations })
    }

    /// The relations, in declared order.
    pub fn relations(&self) -> &[IncrementalRelation<W>] {
        &self.relations
    }

    /// Computes this step's result-tuple delta for one delta per relation,
    /// in declared order. State is untouched until `commit`.
    pub fn eval(&mut self, deltas: Vec<IndexedZSet<Value, W>>) -> Result<ZSet<Tuple, W>> {
        if deltas.len() != self.relations.len() {
            return Err(Error::invalid_operation(
                "one delta per relation is required",
            ));
        }
        for (relation, delta) in self.relations.iter_mut().zip(deltas) {
            relation.receive_delta(delta)?;
        }

        // The empty prefix has change zero and baseline one.
        let unit = ChangePair {
            change: W::zero(),
            baseline: W::one(),
        };
        let seed = {
            let (change, baseline) = self.level_change(&[], 0)?;
            let pairs = extend_pair(&unit, &change, &baseline)?;
            self.prune_settled(&[], 0, pairs)?
        };
        let mut accumulator = IndexedZSet::from_zset(seed);
        for level in 1..self.levels {
            accumulator = accumulator.extend_leaves(|prefix, pair| {
                let (change, baseline) = self.level_change(prefix, level)?;
                let pairs = extend_pair(pair, &change, &baseline)?;
                self.prune_settled(prefix, level, pairs)
            })?;
        }

        let flat = accumulator.to_flat_zset()?;
        ZSet::from_entries(flat.iter().map(|(path, pair)| (path.clone(), pair.change.clone())))
    }

    /// Folds every relation's delta into its accumulated state.
    pub fn commit(&mut self) -> Result<()> {
        for relation in self.relations.iter_mut() {
            relation.commit()?;
        }
        Ok(())
    }

    /// The (change, baseline) extension Z-sets for one level at one open
    /// prefix, folded over the participating relations.
    fn level_change(
        &self,
        prefix: &[Value],
        level: usize,
    ) -> Result<(ZSet<Value, W>, ZSet<Value, W>)> {
        let mut participants: Vec<&IncrementalRelation<W>> = self
            .relations
            .iter()
            .filter(|r| r.levels().contains(&level))
            .collect();
        // Stable sort keeps declared order on equal counts.
        participants.sort_by_key(|r| r.delta_view().count(prefix));

        let Some((first, rest)) = participants.split_first() else {
            return Err(Error::invalid_operation(
                "no relation participates at the requested level",
            ));
        };
        let (mut change, mut baseline) = first.extensions_at(prefix, level)?;
        for relation in rest {
            let (step_change, step_baseline) = relation.extensions_at(prefix, level)?;
            let step_new = step_change.add(&step_baseline)?;
            let carried = change.natural_join(&step_new)?;
            let opened = baseline.natural_join(&step_change)?;
            change = carried.add(&opened)?;
            baseline = baseline.natural_join(&step_baseline)?;
        }
        Ok((change, baseline))
    }

    /// Drops baseline-only entries once no relation's delta can still affect
    /// anything underneath them. Their change stays zero at every deeper
    /// level, so they cannot contribute to the output.
    fn prune_settled(
        &self,
        prefix: &[Value],
        level: usize,
        pairs: ZSet<Value, ChangePair<W>>,
    ) -> Result<ZSet<Value, ChangePair<W>>> {
        let mut kept = Vec::new();
        let mut path = prefix.to_vec();
        for (key, pair) in pairs.iter() {
            if pair.change.is_zero() {
                path.push(key.clone());
                let reachable = self.relations.iter().any(|r| {
                    r.levels().last().map_or(false, |&last| last > level) && r.delta_reaches(&path)
                });
                path.pop();
                if !reachable {
                    continue;
                }
            }
            kept.push((key.clone(), pair.clone()));
        }
        ZSet::from_entries(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use trellis_algebra::IntWeight;

    fn leaf(pairs: &[(i64, i64)]) -> IndexedZSet<Value, IntWeight> {
        IndexedZSet::from_zset(
            ZSet::from_entries(pairs.iter().map(|&(k, w)| (Value::Int(k), IntWeight(w))))
                .unwrap(),
        )
    }

    fn grouped(groups: &[(i64, &[(i64, i64)])]) -> IndexedZSet<Value, IntWeight> {
        let mut map = alloc::collections::BTreeMap::new();
        for &(k, inner) in groups {
            let z = ZSet::from_entries(
                inner.iter().map(|&(v, w)| (Value::Int(v), IntWeight(w))),
            )
            .unwrap();
            map.insert(Value::Int(k), IndexedZSet::Leaf(z));
        }
        IndexedZSet::Node(map)
    }

    fn weights(zset: &ZSet<Tuple, IntWeight>) -> Vec<(i64, i64)> {
        zset.iter()
            .map(|(t, w)| (t[0].as_int().unwrap(), w.0))
            .collect()
    }

    fn entries(zset: &ZSet<Tuple, IntWeight>) -> Vec<(Vec<i64>, i64)> {
        zset.iter()
            .map(|(t, w)| (t.iter().map(|v| v.as_int().unwrap()).collect(), w.0))
            .collect()
    }

    fn engine() -> IncrementalJoin<IntWeight> {
        IncrementalJoin::new(
            1,
            vec![
                IncrementalRelation::new(vec![0]).unwrap(),
                IncrementalRelation::new(vec![0]).unwrap(),
            ],
        )
        .unwrap()
    }

    fn mixed_engine() -> IncrementalJoin<IntWeight> {
        IncrementalJoin::new(
            2,
            vec![
                IncrementalRelation::new(vec![0]).unwrap(),
                IncrementalRelation::new(vec![0, 1]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_first_step_joins_deltas() {
        let mut join = engine();
        let out = join
            .eval(vec![leaf(&[(2, 1), (6, 1), (12, 1)]), leaf(&[(3, 1), (6, 1), (12, 1)])])
            .unwrap();
        assert_eq!(weights(&out), vec![(6, 1), (12, 1)]);
        join.commit().unwrap();
    }

    #[test]
    fn test_delta_against_accumulated() {
        let mut join = engine();
        join.eval(vec![leaf(&[(6, 1), (12, 1)]), leaf(&[(6, 1)])])
            .unwrap();
        join.commit().unwrap();

        // New left fact joins the committed right state.
        let out = join.eval(vec![leaf(&[(6, 1)]), leaf(&[])]).unwrap();
        assert_eq!(weights(&out), vec![(6, 1)]);
        join.commit().unwrap();

        // Deleting on the right retracts against all accumulated left weight.
        let out = join.eval(vec![leaf(&[]), leaf(&[(6, -1)])]).unwrap();
        assert_eq!(weights(&out), vec![(6, -2)]);
    }

    #[test]
    fn test_eval_is_pure_until_commit() {
        let mut join = engine();
        let out1 = join
            .eval(vec![leaf(&[(1, 1)]), leaf(&[(1, 1)])])
            .unwrap();
        // Without a commit the same deltas produce the same output.
        let out2 = join
            .eval(vec![leaf(&[(1, 1)]), leaf(&[(1, 1)])])
            .unwrap();
        assert_eq!(out1, out2);
    }

    #[test]
    fn test_two_level_join() {
        let mut join = IncrementalJoin::new(
            2,
            vec![
                IncrementalRelation::new(vec![0]).unwrap(),
                IncrementalRelation::new(vec![1]).unwrap(),
            ],
        )
        .unwrap();
        // Cartesian of independent levels, with weight products.
        let out = join
            .eval(vec![leaf(&[(1, 2), (2, 1)]), leaf(&[(10, 3)])])
            .unwrap();
        assert_eq!(entries(&out), vec![(vec![1, 10], 6), (vec![2, 10], 3)]);
    }

    #[test]
    fn test_new_tuple_joins_committed_extensions() {
        let mut join = mixed_engine();
        join.eval(vec![IndexedZSet::empty(), grouped(&[(1, &[(10, 1)])])])
            .unwrap();
        join.commit().unwrap();

        // A fresh left fact must pick up right extensions that live only in
        // the committed state.
        let out = join
            .eval(vec![leaf(&[(1, 1)]), IndexedZSet::empty()])
            .unwrap();
        assert_eq!(entries(&out), vec![(vec![1, 10], 1)]);
    }

    #[test]
    fn test_deleting_last_right_fact_retracts_join() {
        let mut join = mixed_engine();
        join.eval(vec![leaf(&[(1, 1)]), grouped(&[(1, &[(10, 1)])])])
            .unwrap();
        join.commit().unwrap();

        // Emptying the group retracts the joined tuple even though the left
        // relation's delta is empty.
        let out = join
            .eval(vec![IndexedZSet::empty(), grouped(&[(1, &[(10, -1)])])])
            .unwrap();
        assert_eq!(entries(&out), vec![(vec![1, 10], -1)]);
    }

    #[test]
    fn test_group_growth_emits_only_the_new_extension() {
        let mut join = mixed_engine();
        join.eval(vec![leaf(&[(1, 1)]), grouped(&[(1, &[(10, 1)])])])
            .unwrap();
        join.commit().unwrap();

        // Group 1 stays present; only the added extension may be emitted.
        let out = join
            .eval(vec![IndexedZSet::empty(), grouped(&[(1, &[(11, 1)])])])
            .unwrap();
        assert_eq!(entries(&out), vec![(vec![1, 11], 1)]);
    }

    #[test]
    fn test_validation() {
        assert!(IncrementalJoin::<IntWeight>::new(1, vec![]).is_err());
        let relations = vec![IncrementalRelation::<IntWeight>::new(vec![0]).unwrap()];
        assert!(IncrementalJoin::new(2, relations).is_err());

        let mut join = engine();
        // One delta per relation.
        assert!(join.eval(vec![leaf(&[])]).is_err());
    }
}
