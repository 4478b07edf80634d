//! The prefix-extender protocol.
//!
//! A prefix extender is a capability over one fixed relation: given a prefix
//! of already-bound values it can estimate, propose and filter the candidate
//! values for the next join level. Extenders are stateless with respect to a
//! given prefix, so the engine may call them in any per-prefix order.

use alloc::vec::Vec;
use trellis_core::{Result, Tuple, Value};

/// Capability of a relation to extend a prefix by one level.
pub trait PrefixExtender {
    /// Cheap upper bound on the number of candidate extensions at the next
    /// level. Used only for relative ordering when picking a driver.
    fn count(&self, prefix: &[Value]) -> usize;

    /// Full list of this relation's candidate extensions for `prefix`,
    /// independent of any other relation.
    fn propose(&self, prefix: &[Value]) -> Result<Vec<Value>>;

    /// Filters `candidates` down to those present in this relation under
    /// `prefix`, preserving their order.
    fn extend(&self, prefix: &[Value], candidates: &[Value]) -> Result<Vec<Value>>;

    /// Whether this extender contributes at the given join level.
    fn participates(&self, level: usize) -> bool;
}

/// An extender anchored to a single fact.
///
/// Participates at every level the tuple covers and only ever proposes the
/// tuple's own value there, provided the prefix follows the tuple. This is
/// the anchor the anti-join machinery plants next to negated extenders.
pub struct TupleExtender {
    tuple: Tuple,
}

impl TupleExtender {
    pub fn new(tuple: Tuple) -> Self {
        Self { tuple }
    }

    fn matches(&self, prefix: &[Value]) -> bool {
        prefix.len() < self.tuple.len() && self.tuple.starts_with(prefix)
    }
}

impl PrefixExtender for TupleExtender {
    fn count(&self, prefix: &[Value]) -> usize {
        usize::from(self.matches(prefix))
    }

    fn propose(&self, prefix: &[Value]) -> Result<Vec<Value>> {
        if self.matches(prefix) {
            Ok(alloc::vec![self.tuple[prefix.len()].clone()])
        } else {
            Ok(Vec::new())
        }
    }

    fn extend(&self, prefix: &[Value], candidates: &[Value]) -> Result<Vec<Value>> {
        if !self.matches(prefix) {
            return Ok(Vec::new());
        }
        let next = &self.tuple[prefix.len()];
        Ok(candidates.iter().filter(|c| *c == next).cloned().collect())
    }

    fn participates(&self, level: usize) -> bool {
        level < self.tuple.len()
    }
}
