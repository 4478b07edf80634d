//! Generic worst-case-optimal join.
//!
//! The generic join extends every partial result tuple by one level at a
//! time. At each level the participating extender with the lowest `count`
//! estimate becomes the driver and proposes candidates; every other
//! participant then filters the candidate list. Ties on the estimate break
//! by list order, which keeps the output sequence deterministic.

use crate::extender::{PrefixExtender, TupleExtender};
use alloc::vec;
use alloc::vec::Vec;
use trellis_core::{extended, Error, Result, Tuple, Value};

/// Extends every prefix in `prefixes` by one level through `extenders`.
///
/// Returns one new prefix per surviving extension, in driver-proposal order
/// within each input prefix.
pub fn single_join(
    prefixes: &[Tuple],
    level: usize,
    extenders: &[&dyn PrefixExtender],
) -> Result<Vec<Tuple>> {
    let participants: Vec<&dyn PrefixExtender> = extenders
        .iter()
        .copied()
        .filter(|e| e.participates(level))
        .collect();
    if participants.is_empty() {
        return Err(Error::invalid_operation(
            "no extender participates at the requested level",
        ));
    }

    let mut out = Vec::new();
    for prefix in prefixes {
        let mut driver = 0;
        let mut best = participants[0].count(prefix);
        for (i, e) in participants.iter().enumerate().skip(1) {
            let count = e.count(prefix);
            if count < best {
                best = count;
                driver = i;
            }
        }

        let mut extensions = participants[driver].propose(prefix)?;
        for (i, e) in participants.iter().enumerate() {
            if i == driver || extensions.is_empty() {
                continue;
            }
            extensions = e.extend(prefix, &extensions)?;
        }

        for ext in &extensions {
            out.push(extended(prefix, ext));
        }
    }
    Ok(out)
}

/// Batch generic join over a fixed number of levels.
pub struct GenericJoin {
    levels: usize,
}

impl GenericJoin {
    pub fn new(levels: usize) -> Self {
        Self { levels }
    }

    /// Runs the join, returning the complete result tuples.
    pub fn execute(&self, extenders: &[&dyn PrefixExtender]) -> Result<Vec<Tuple>> {
        if extenders.is_empty() {
            return Err(Error::empty_combinator("GenericJoin"));
        }
        let mut prefixes: Vec<Tuple> = vec![Tuple::new()];
        for level in 0..self.levels {
            prefixes = single_join(&prefixes, level, extenders)?;
        }
        Ok(prefixes)
    }
}

/// Retains a complete tuple iff anti-joining it against `extenders` comes up
/// empty: whole-tuple negation, as opposed to the per-level negation of
/// `NotExtender`.
pub struct ResultTupleRemover<'a> {
    extenders: Vec<&'a dyn PrefixExtender>,
}

impl<'a> ResultTupleRemover<'a> {
    pub fn new(extenders: Vec<&'a dyn PrefixExtender>) -> Result<Self> {
        if extenders.is_empty() {
            return Err(Error::empty_combinator("ResultTupleRemover"));
        }
        Ok(Self { extenders })
    }

    /// Filters `tuples`, dropping every tuple the negated extenders can
    /// fully re-derive.
    pub fn retain(&self, tuples: Vec<Tuple>) -> Result<Vec<Tuple>> {
        let mut out = Vec::new();
        for tuple in tuples {
            if !self.matches(&tuple)? {
                out.push(tuple);
            }
        }
        Ok(out)
    }

    fn matches(&self, tuple: &Tuple) -> Result<bool> {
        let anchor = TupleExtender::new(tuple.clone());
        let mut extenders = self.extenders.clone();
        extenders.push(&anchor);
        let join = GenericJoin::new(tuple.len());
        Ok(!join.execute(&extenders)?.is_empty())
    }
}
