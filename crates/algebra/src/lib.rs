//! Trellis Algebra - the weighted multiset (Z-set) algebra.
//!
//! This crate implements the value model both the batch and the incremental
//! join engines operate on:
//!
//! - `Weight`: a commutative group with a compatible multiplication, used as
//!   the edge weight of Z-sets. `IntWeight` is the concrete checked-overflow
//!   integer weight.
//! - `ZSet<K, W>`: an immutable mapping from key to nonzero weight; a
//!   weighted multiset forming an abelian group under addition.
//! - `IndexedZSet<K, W>`: an arbitrarily-deep nested mapping from key to
//!   inner Z-set or indexed Z-set; the grouped (trie) generalization of a
//!   Z-set.
//!
//! Both structures keep two invariants at all times: no stored entry has
//! weight zero, and no stored entry maps to an empty inner structure.
//! Deletion is always implicit through those filters. All operations return
//! new instances; values are freely shared.

#![no_std]

extern crate alloc;

pub mod indexed;
pub mod weight;
pub mod zset;

pub use indexed::{DepthPolicy, IndexedZSet};
pub use weight::{IntWeight, Weight};
pub use zset::ZSet;
