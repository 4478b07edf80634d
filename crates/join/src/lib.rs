//! Trellis Join - batch worst-case-optimal join algorithms.
//!
//! Two join strategies over the same prefix/extension vocabulary:
//!
//! - **Generic join** (`generic`): extends partial result tuples one level at
//!   a time through the `PrefixExtender` protocol, picking the cheapest
//!   relation as driver and intersecting against the rest. Logical
//!   combinators (`combinators`) compose extenders into AND/OR/NOT/function/
//!   predicate logic.
//! - **Leapfrog triejoin** (`leapfrog`): merges sorted cursors via
//!   round-robin seek-to-maximum over an explicit per-level frame stack, with
//!   index-level AND/OR/NOT combinators. `CombiJoin` (`combi`) is the hybrid
//!   that applies the merge independently per level.
//!
//! `TrieRelation` (`relation`) is the in-memory sorted-trie adapter backing
//! both protocols; external collections plug in by implementing the same
//! traits.
//!
//! Every strategy is deterministic: driver selection breaks ties by list
//! order and all stores iterate in key order, so repeated runs over identical
//! input produce identical output tuple sequences.

#![no_std]

extern crate alloc;

pub mod combi;
pub mod combinators;
pub mod extender;
pub mod generic;
pub mod leapfrog;
pub mod relation;

pub use combi::CombiJoin;
pub use combinators::{
    AndExtender, FunctionExtender, NotExtender, OrExtender, PredicateExtender,
};
pub use extender::{PrefixExtender, TupleExtender};
pub use generic::{GenericJoin, ResultTupleRemover};
pub use leapfrog::combinators::{AndIndex, NotIndex, OrIndex};
pub use leapfrog::index::{LeapfrogIndex, TrieIndex};
pub use leapfrog::{LeapfrogIterator, LeapfrogJoin, LeapfrogSingleJoin, VecCursor};
pub use relation::TrieRelation;
