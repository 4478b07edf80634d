//! Logical combinators over prefix extenders.
//!
//! Each combinator is itself a `PrefixExtender`, so arbitrary AND/OR/NOT/
//! function/predicate trees compose with plain relations inside one generic
//! join.

use crate::extender::{PrefixExtender, TupleExtender};
use crate::generic::GenericJoin;
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use hashbrown::HashSet;
use trellis_core::{extended, Error, Result, Value};

/// Conjunction: a candidate survives only if every participating child
/// accepts it.
pub struct AndExtender {
    children: Vec<Box<dyn PrefixExtender>>,
}

impl AndExtender {
    pub fn new(children: Vec<Box<dyn PrefixExtender>>) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::empty_combinator("AndExtender"));
        }
        Ok(Self { children })
    }

    /// Participating children in ascending count order, ties by list order.
    fn by_count(&self, prefix: &[Value]) -> Vec<&dyn PrefixExtender> {
        let level = prefix.len();
        let mut ranked: Vec<(usize, &dyn PrefixExtender)> = self
            .children
            .iter()
            .filter(|c| c.participates(level))
            .map(|c| (c.count(prefix), c.as_ref()))
            .collect();
        ranked.sort_by_key(|(count, _)| *count);
        ranked.into_iter().map(|(_, c)| c).collect()
    }
}

impl PrefixExtender for AndExtender {
    fn count(&self, prefix: &[Value]) -> usize {
        let level = prefix.len();
        self.children
            .iter()
            .filter(|c| c.participates(level))
            .map(|c| c.count(prefix))
            .min()
            .unwrap_or(usize::MAX)
    }

    fn propose(&self, prefix: &[Value]) -> Result<Vec<Value>> {
        let ranked = self.by_count(prefix);
        let (driver, rest) = match ranked.split_first() {
            Some(split) => split,
            None => return Ok(Vec::new()),
        };
        let mut extensions = driver.propose(prefix)?;
        for child in rest {
            if extensions.is_empty() {
                break;
            }
            extensions = child.extend(prefix, &extensions)?;
        }
        Ok(extensions)
    }

    fn extend(&self, prefix: &[Value], candidates: &[Value]) -> Result<Vec<Value>> {
        let mut extensions = candidates.to_vec();
        for child in self.by_count(prefix) {
            if extensions.is_empty() {
                break;
            }
            extensions = child.extend(prefix, &extensions)?;
        }
        Ok(extensions)
    }

    fn participates(&self, level: usize) -> bool {
        self.children.iter().any(|c| c.participates(level))
    }
}

/// Disjunction: the distinct union of the children's candidates, in
/// first-occurrence order across children.
///
/// Children must agree on participation; the first child answers for all.
pub struct OrExtender {
    children: Vec<Box<dyn PrefixExtender>>,
}

impl OrExtender {
    pub fn new(children: Vec<Box<dyn PrefixExtender>>) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::empty_combinator("OrExtender"));
        }
        Ok(Self { children })
    }
}

fn distinct_union(lists: Vec<Vec<Value>>) -> Vec<Value> {
    let mut seen: HashSet<Value> = HashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for value in list {
            if seen.insert(value.clone()) {
                out.push(value);
            }
        }
    }
    out
}

impl PrefixExtender for OrExtender {
    fn count(&self, prefix: &[Value]) -> usize {
        self.children
            .iter()
            .map(|c| c.count(prefix))
            .fold(0usize, usize::saturating_add)
    }

    fn propose(&self, prefix: &[Value]) -> Result<Vec<Value>> {
        let mut lists = Vec::with_capacity(self.children.len());
        for child in &self.children {
            lists.push(child.propose(prefix)?);
        }
        Ok(distinct_union(lists))
    }

    fn extend(&self, prefix: &[Value], candidates: &[Value]) -> Result<Vec<Value>> {
        let mut lists = Vec::with_capacity(self.children.len());
        for child in &self.children {
            lists.push(child.extend(prefix, candidates)?);
        }
        Ok(distinct_union(lists))
    }

    fn participates(&self, level: usize) -> bool {
        let first = self.children[0].participates(level);
        debug_assert!(
            self.children.iter().all(|c| c.participates(level) == first),
            "OrExtender children disagree on participation at level {}",
            level
        );
        first
    }
}

/// Negation at a single declared level.
///
/// A candidate is dropped iff the children can jointly re-derive the fact
/// `prefix + candidate`: an anti-semi-join per candidate, so several
/// children act conjunctively (only values in all of them are excluded).
pub struct NotExtender {
    children: Vec<Box<dyn PrefixExtender>>,
    level: usize,
}

impl NotExtender {
    pub fn new(children: Vec<Box<dyn PrefixExtender>>, level: usize) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::empty_combinator("NotExtender"));
        }
        Ok(Self { children, level })
    }
}

impl PrefixExtender for NotExtender {
    fn count(&self, _prefix: &[Value]) -> usize {
        // Never a driver.
        usize::MAX
    }

    fn propose(&self, _prefix: &[Value]) -> Result<Vec<Value>> {
        Err(Error::invalid_operation("negation cannot propose candidates"))
    }

    fn extend(&self, prefix: &[Value], candidates: &[Value]) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        for candidate in candidates {
            let anchor = TupleExtender::new(extended(prefix, candidate));
            let mut extenders: Vec<&dyn PrefixExtender> =
                self.children.iter().map(|c| c.as_ref()).collect();
            extenders.push(&anchor);
            let join = GenericJoin::new(prefix.len() + 1);
            if join.execute(&extenders)?.is_empty() {
                out.push(candidate.clone());
            }
        }
        Ok(out)
    }

    fn participates(&self, level: usize) -> bool {
        level == self.level
    }
}

/// A deterministic function of one or two bound prefix positions; always the
/// cheapest extender, so it drives its level with a single proposal.
pub struct FunctionExtender {
    positions: Vec<usize>,
    level: usize,
    func: Box<dyn Fn(&[Value]) -> Value>,
}

impl FunctionExtender {
    pub fn new(
        positions: Vec<usize>,
        level: usize,
        func: Box<dyn Fn(&[Value]) -> Value>,
    ) -> Result<Self> {
        validate_positions(&positions, level)?;
        Ok(Self {
            positions,
            level,
            func,
        })
    }

    fn output(&self, prefix: &[Value]) -> Value {
        let args: Vec<Value> = self.positions.iter().map(|&p| prefix[p].clone()).collect();
        (self.func)(&args)
    }
}

impl PrefixExtender for FunctionExtender {
    fn count(&self, _prefix: &[Value]) -> usize {
        1
    }

    fn propose(&self, prefix: &[Value]) -> Result<Vec<Value>> {
        Ok(vec![self.output(prefix)])
    }

    fn extend(&self, prefix: &[Value], candidates: &[Value]) -> Result<Vec<Value>> {
        let value = self.output(prefix);
        Ok(candidates.iter().filter(|c| **c == value).cloned().collect())
    }

    fn participates(&self, level: usize) -> bool {
        level == self.level
    }
}

/// A boolean filter over one or two bound prefix positions plus the
/// candidate; never a driver, never proposes.
pub struct PredicateExtender {
    positions: Vec<usize>,
    level: usize,
    pred: Box<dyn Fn(&[Value], &Value) -> bool>,
}

impl PredicateExtender {
    pub fn new(
        positions: Vec<usize>,
        level: usize,
        pred: Box<dyn Fn(&[Value], &Value) -> bool>,
    ) -> Result<Self> {
        validate_positions(&positions, level)?;
        Ok(Self {
            positions,
            level,
            pred,
        })
    }
}

impl PrefixExtender for PredicateExtender {
    fn count(&self, _prefix: &[Value]) -> usize {
        usize::MAX
    }

    fn propose(&self, _prefix: &[Value]) -> Result<Vec<Value>> {
        Err(Error::invalid_operation("predicate cannot propose candidates"))
    }

    fn extend(&self, prefix: &[Value], candidates: &[Value]) -> Result<Vec<Value>> {
        let args: Vec<Value> = self.positions.iter().map(|&p| prefix[p].clone()).collect();
        Ok(candidates
            .iter()
            .filter(|c| (self.pred)(&args, c))
            .cloned()
            .collect())
    }

    fn participates(&self, level: usize) -> bool {
        level == self.level
    }
}

fn validate_positions(positions: &[usize], level: usize) -> Result<()> {
    if positions.is_empty() || positions.len() > 2 {
        return Err(Error::invalid_arity(positions.len()));
    }
    if positions.iter().any(|&p| p >= level) {
        return Err(Error::invalid_operation(
            "argument positions must be bound before the extender's level",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::TrieRelation;
    use trellis_core::Tuple;

    fn unary(values: &[i64]) -> TrieRelation {
        let tuples: Vec<Tuple> = values.iter().map(|&v| vec![Value::Int(v)]).collect();
        TrieRelation::new(vec![0], &tuples).unwrap()
    }

    fn int_results(tuples: &[Tuple]) -> Vec<Vec<i64>> {
        tuples
            .iter()
            .map(|t| t.iter().map(|v| v.as_int().unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_and_intersects() {
        let and = AndExtender::new(vec![
            Box::new(unary(&[1, 2, 3, 4])),
            Box::new(unary(&[2, 4, 6])),
        ])
        .unwrap();
        let join = GenericJoin::new(1);
        let result = join.execute(&[&and]).unwrap();
        assert_eq!(int_results(&result), vec![vec![2], vec![4]]);
    }

    #[test]
    fn test_or_distinct_union() {
        let or = OrExtender::new(vec![
            Box::new(unary(&[1, 2])),
            Box::new(unary(&[2, 3])),
        ])
        .unwrap();
        // Shared key 2 appears once.
        assert_eq!(
            or.propose(&[]).unwrap(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
        let filtered = or
            .extend(&[], &[Value::Int(2), Value::Int(3), Value::Int(9)])
            .unwrap();
        assert_eq!(filtered, vec![Value::Int(2), Value::Int(3)]);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_or_children_must_agree_on_participation() {
        // A child bound at a different level would be silently skipped at
        // levels it does not share.
        let shifted = TrieRelation::new(vec![1], &[vec![Value::Int(2)]]).unwrap();
        let or = OrExtender::new(vec![Box::new(unary(&[1])), Box::new(shifted)]).unwrap();
        or.participates(0);
    }

    #[test]
    fn test_not_requires_all_children() {
        // Excluded values must appear in every negative child.
        let positive = unary(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let not = NotExtender::new(
            vec![
                Box::new(unary(&[2, 4, 6, 8, 10, 12])),
                Box::new(unary(&[3, 6, 9, 12])),
            ],
            0,
        )
        .unwrap();
        let join = GenericJoin::new(1);
        let result = join.execute(&[&positive, &not]).unwrap();
        let kept: Vec<i64> = result.iter().map(|t| t[0].as_int().unwrap()).collect();
        assert_eq!(kept, vec![1, 2, 3, 4, 5, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_function_drives_its_level() {
        let base = unary(&[2, 3, 5]);
        let squares = TrieRelation::new(
            vec![1],
            &[4, 9, 24]
                .iter()
                .map(|&v| vec![Value::Int(v)])
                .collect::<Vec<_>>(),
        )
        .unwrap();
        let square = FunctionExtender::new(
            vec![0],
            1,
            Box::new(|args: &[Value]| {
                let v = args[0].as_int().unwrap_or(0);
                Value::Int(v * v)
            }),
        )
        .unwrap();
        let join = GenericJoin::new(2);
        let result = join.execute(&[&base, &squares, &square]).unwrap();
        assert_eq!(int_results(&result), vec![vec![2, 4], vec![3, 9]]);
    }

    #[test]
    fn test_predicate_filters() {
        let base = unary(&[2, 3]);
        let pool = TrieRelation::new(
            vec![1],
            &[4, 5, 6, 9]
                .iter()
                .map(|&v| vec![Value::Int(v)])
                .collect::<Vec<_>>(),
        )
        .unwrap();
        let divisible = PredicateExtender::new(
            vec![0],
            1,
            Box::new(|args: &[Value], c: &Value| {
                match (args[0].as_int(), c.as_int()) {
                    (Some(a), Some(b)) if a != 0 => b % a == 0,
                    _ => false,
                }
            }),
        )
        .unwrap();
        let join = GenericJoin::new(2);
        let result = join.execute(&[&base, &pool, &divisible]).unwrap();
        assert_eq!(
            int_results(&result),
            vec![vec![2, 4], vec![2, 6], vec![3, 6], vec![3, 9]]
        );
    }

    #[test]
    fn test_construction_validation() {
        assert!(AndExtender::new(vec![]).is_err());
        assert!(OrExtender::new(vec![]).is_err());
        assert!(NotExtender::new(vec![], 0).is_err());
        assert_eq!(
            FunctionExtender::new(vec![0, 1, 2], 3, Box::new(|_: &[Value]| Value::Int(0)))
                .err(),
            Some(Error::invalid_arity(3))
        );
        assert!(PredicateExtender::new(
            vec![1],
            1,
            Box::new(|_: &[Value], _: &Value| true)
        )
        .is_err());
    }
}
