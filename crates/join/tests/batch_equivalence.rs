//! Cross-strategy equivalence: the generic, leapfrog and combi joins must
//! produce the same result-tuple set over the same relations.

use proptest::prelude::*;
use trellis_core::{Tuple, Value};
use trellis_join::{
    CombiJoin, GenericJoin, LeapfrogIndex, LeapfrogJoin, PredicateExtender, PrefixExtender,
    TrieIndex, TrieRelation,
};

fn unary(values: &[i64]) -> TrieRelation {
    let tuples: Vec<Tuple> = values.iter().map(|&v| vec![Value::Int(v)]).collect();
    TrieRelation::new(vec![0], &tuples).unwrap()
}

fn relation(levels: Vec<usize>, rows: &[(i64, i64)]) -> TrieRelation {
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

fn run_all_strategies(levels: usize, relations: &[&TrieRelation]) -> Vec<Vec<Vec<i64>>> {
    let extenders: Vec<&dyn PrefixExtender> =
        relations.iter().map(|r| *r as &dyn PrefixExtender).collect();
    let generic = GenericJoin::new(levels).execute(&extenders).unwrap();

    let mut indexes: Vec<Box<dyn LeapfrogIndex + '_>> = relations
        .iter()
        .map(|r| Box::new(TrieIndex::new(r)) as Box<dyn LeapfrogIndex + '_>)
        .collect();
    let leapfrog = LeapfrogJoin::new(levels).execute(&mut indexes).unwrap();
    let combi = CombiJoin::new(levels).execute(&mut indexes).unwrap();

    vec![ints(&generic), ints(&leapfrog), ints(&combi)]
}

#[test]
fn multiples_intersection_is_identical_across_strategies() {
    let evens = unary(&[2, 4, 6, 8, 10, 12]);
    let threes = unary(&[3, 6, 9, 12]);
    let results = run_all_strategies(1, &[&evens, &threes]);
    for result in &results {
        assert_eq!(*result, vec![vec![6], vec![12]]);
    }
}

#[test]
fn two_level_divisor_query() {
    let evens = unary(&[2, 4, 6, 8, 10, 12]);
    let threes = unary(&[3, 6, 9, 12]);
    let divisors = TrieRelation::new(
        vec![1],
        &[1, 2, 3, 4, 6, 12]
            .iter()
            .map(|&v| vec![Value::Int(v)])
            .collect::<Vec<Tuple>>(),
    )
    .unwrap();
    let multiple_of_bound = PredicateExtender::new(
        vec![0],
        1,
        Box::new(|args: &[Value], c: &Value| match (args[0].as_int(), c.as_int()) {
            (Some(a), Some(b)) if a != 0 => b % a == 0,
            _ => false,
        }),
    )
    .unwrap();

    let result = GenericJoin::new(2)
        .execute(&[&evens, &threes, &divisors, &multiple_of_bound])
        .unwrap();
    assert_eq!(ints(&result), vec![vec![6, 6], vec![6, 12], vec![12, 12]]);
}

#[test]
fn triangle_query_is_identical_across_strategies() {
    let edges = [(1, 2), (2, 3), (1, 3), (3, 4), (2, 4), (1, 4)];
    let r = relation(vec![0, 1], &edges);
    let s = relation(vec![1, 2], &edges);
    let t = relation(vec![0, 2], &edges);
    let results = run_all_strategies(3, &[&r, &s, &t]);
    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
    assert_eq!(
        results[0],
        vec![vec![1, 2, 3], vec![1, 2, 4], vec![1, 3, 4], vec![2, 3, 4]]
    );
}

proptest! {
    #[test]
    fn prop_two_relation_equivalence(
        r_rows in prop::collection::vec((0i64..5, 0i64..5), 0..16),
        s_rows in prop::collection::vec((0i64..5, 0i64..5), 1..16),
    ) {
        let r = relation(vec![0, 1], &r_rows);
        let s = relation(vec![0, 1], &s_rows);
        let results = run_all_strategies(2, &[&r, &s]);
        prop_assert_eq!(&results[0], &results[1]);
        prop_assert_eq!(&results[1], &results[2]);
    }

    #[test]
    fn prop_triangle_equivalence(
        edges in prop::collection::vec((0i64..5, 0i64..5), 1..20),
    ) {
        let r = relation(vec![0, 1], &edges);
        let s = relation(vec![1, 2], &edges);
        let t = relation(vec![0, 2], &edges);
        let results = run_all_strategies(3, &[&r, &s, &t]);
        prop_assert_eq!(&results[0], &results[1]);
        prop_assert_eq!(&results[1], &results[2]);
    }

    #[test]
    fn prop_output_is_lexicographically_sorted(
        edges in prop::collection::vec((0i64..5, 0i64..5), 1..20),
    ) {
        let r = relation(vec![0, 1], &edges);
        let s = relation(vec![0, 1], &edges);
        let results = run_all_strategies(2, &[&r, &s]);
        for result in &results {
            let mut sorted = result.clone();
            sorted.sort();
            prop_assert_eq!(result, &sorted);
        }
    }
}
