//! Full leapfrog triejoin over a stack of per-level frames.

use crate::leapfrog::index::LeapfrogIndex;
use crate::leapfrog::{search_ring, LeapfrogIterator};
use alloc::boxed::Box;
use alloc::vec::Vec;
use trellis_core::{Error, Result, Tuple};

/// Batch leapfrog join over a fixed number of levels.
///
/// Maintains the trie-traversal invariant: the partial tuple length always
/// equals the current level, an index descends exactly on entry to a level
/// it binds (its cursor stays parked at the previous match across levels it
/// skips), and every index that descended on entry to a level is closed
/// again when that level backtracks.
pub struct LeapfrogJoin {
    levels: usize,
}

impl LeapfrogJoin {
    pub fn new(levels: usize) -> Self {
        Self { levels }
    }

    /// Runs the join, returning the complete result tuples.
    pub fn execute<'a>(
        &self,
        indexes: &mut [Box<dyn LeapfrogIndex + 'a>],
    ) -> Result<Vec<Tuple>> {
        if indexes.is_empty() {
            return Err(Error::empty_combinator("LeapfrogJoin"));
        }
        for level in 0..self.levels {
            if !indexes.iter().any(|ix| ix.participates(level)) {
                return Err(Error::invalid_operation(
                    "no index participates at the requested level",
                ));
            }
        }
        for ix in indexes.iter_mut() {
            ix.reinit()?;
        }

        let mut results = Vec::new();
        let mut tuple = Tuple::new();
        // Per open level: the index whose cursor the next advance targets,
        // and the indexes that descended on entry to the level above.
        let mut matched: Vec<usize> = Vec::new();
        let mut opened: Vec<Vec<usize>> = Vec::new();
        let mut level = 0;
        loop {
            let found = {
                let (positions, mut cursors): (Vec<usize>, Vec<&mut dyn LeapfrogIterator>) =
                    indexes
                        .iter_mut()
                        .enumerate()
                        .filter(|(_, ix)| ix.participates(level))
                        .map(|(i, ix)| (i, &mut **ix as &mut dyn LeapfrogIterator))
                        .unzip();
                search_ring(&mut cursors)?.map(|(key, slot)| (key, positions[slot]))
            };
            match found {
                Some((key, holder)) => {
                    tuple.push(key);
                    if level + 1 == self.levels {
                        results.push(tuple.clone());
                        tuple.pop();
                        indexes[holder].next()?;
                    } else {
                        let next = level + 1;
                        let mut descended = Vec::new();
                        for (i, ix) in indexes.iter_mut().enumerate() {
                            if !ix.participates(next) {
                                continue;
                            }
                            // Entering a bound column: descend below the
                            // previous match, or rewind the root cursor when
                            // this is the index's first bound column.
                            if (0..next).any(|l| ix.participates(l)) {
                                ix.open_level()?;
                                descended.push(i);
                            } else {
                                ix.reinit()?;
                            }
                        }
                        matched.push(holder);
                        opened.push(descended);
                        level = next;
                    }
                }
                None => {
                    if level == 0 {
                        break;
                    }
                    level -= 1;
                    tuple.pop();
                    for i in opened.pop().unwrap_or_default() {
                        indexes[i].close_level()?;
                    }
                    match matched.pop() {
                        Some(holder) => indexes[holder].next()?,
                        None => break,
                    }
                }
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leapfrog::index::TrieIndex;
    use crate::relation::TrieRelation;
    use alloc::vec;
    use trellis_core::Value;

    fn unary(values: &[i64]) -> TrieRelation {
        let tuples: Vec<Tuple> = values.iter().map(|&v| vec![Value::Int(v)]).collect();
        TrieRelation::new(vec![0], &tuples).unwrap()
    }

    fn binary(levels: Vec<usize>, rows: &[(i64, i64)]) -> TrieRelation {
        let tuples: Vec<Tuple> = rows
            .iter()
            .map(|&(a, b)| vec![Value::Int(a), Value::Int(b)])
            .collect();
        TrieRelation::new(levels, &tuples).unwrap()
    }

    fn ints(tuples: &[Tuple]) -> Vec<Vec<i64>> {
        tuples
            .iter()
            .map(|t| t.iter().map(|v| v.as_int().unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_single_level() {
        let a = unary(&[2, 4, 6, 8, 10, 12]);
        let b = unary(&[3, 6, 9, 12]);
        let mut indexes: Vec<Box<dyn LeapfrogIndex + '_>> =
            vec![Box::new(TrieIndex::new(&a)), Box::new(TrieIndex::new(&b))];
        let result = LeapfrogJoin::new(1).execute(&mut indexes).unwrap();
        assert_eq!(ints(&result), vec![vec![6], vec![12]]);
    }

    #[test]
    fn test_two_levels_with_backtracking() {
        // Level 0 intersects {1,2,3}x{2,3,4}; level 1 requires agreement on
        // the second column, absent for the binding 3.
        let r = binary(vec![0, 1], &[(2, 10), (2, 11), (3, 30)]);
        let s = binary(vec![0, 1], &[(2, 11), (2, 12), (3, 31), (4, 40)]);
        let mut indexes: Vec<Box<dyn LeapfrogIndex + '_>> =
            vec![Box::new(TrieIndex::new(&r)), Box::new(TrieIndex::new(&s))];
        let result = LeapfrogJoin::new(2).execute(&mut indexes).unwrap();
        assert_eq!(ints(&result), vec![vec![2, 11]]);
    }

    #[test]
    fn test_triangle_query() {
        // R(a,b), S(b,c), T(a,c) over a small graph.
        let edges = [(1, 2), (2, 3), (1, 3), (3, 4)];
        let r = binary(vec![0, 1], &edges);
        let s = binary(vec![1, 2], &edges);
        let t = binary(vec![0, 2], &edges);
        let mut indexes: Vec<Box<dyn LeapfrogIndex + '_>> = vec![
            Box::new(TrieIndex::new(&r)),
            Box::new(TrieIndex::new(&s)),
            Box::new(TrieIndex::new(&t)),
        ];
        let result = LeapfrogJoin::new(3).execute(&mut indexes).unwrap();
        assert_eq!(ints(&result), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_sparse_index_rewinds_between_sibling_bindings() {
        // T(a,c) skips the middle level, so its deeper cursor must be
        // reopened for every binding iterated there; parking it after the
        // first one would drop the second triangle.
        let edges = [(1, 2), (1, 3), (2, 5), (3, 4), (1, 5), (1, 4)];
        let r = binary(vec![0, 1], &edges);
        let s = binary(vec![1, 2], &edges);
        let t = binary(vec![0, 2], &edges);
        let mut indexes: Vec<Box<dyn LeapfrogIndex + '_>> = vec![
            Box::new(TrieIndex::new(&r)),
            Box::new(TrieIndex::new(&s)),
            Box::new(TrieIndex::new(&t)),
        ];
        let result = LeapfrogJoin::new(3).execute(&mut indexes).unwrap();
        assert_eq!(ints(&result), vec![vec![1, 2, 5], vec![1, 3, 4]]);
    }

    #[test]
    fn test_late_first_column_restarts_per_binding() {
        // D binds only the second level, so its root cursor must restart
        // for every binding of the first; carrying it over from the
        // previous binding would drop [2, 10].
        let r = binary(vec![0, 1], &[(1, 20), (2, 10), (2, 20)]);
        let d = TrieRelation::new(vec![1], &[vec![Value::Int(10)], vec![Value::Int(20)]])
            .unwrap();
        let mut indexes: Vec<Box<dyn LeapfrogIndex + '_>> =
            vec![Box::new(TrieIndex::new(&r)), Box::new(TrieIndex::new(&d))];
        let result = LeapfrogJoin::new(2).execute(&mut indexes).unwrap();
        assert_eq!(ints(&result), vec![vec![1, 20], vec![2, 10], vec![2, 20]]);
    }

    #[test]
    fn test_validation() {
        let mut none: Vec<Box<dyn LeapfrogIndex + '_>> = vec![];
        assert!(LeapfrogJoin::new(1).execute(&mut none).is_err());

        let a = unary(&[1]);
        let mut indexes: Vec<Box<dyn LeapfrogIndex + '_>> = vec![Box::new(TrieIndex::new(&a))];
        // Level 1 has no participant.
        assert!(LeapfrogJoin::new(2).execute(&mut indexes).is_err());
    }
}
