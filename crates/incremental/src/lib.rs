//! Trellis Incremental - DBSP-style incremental join maintenance.
//!
//! The batch join re-derived algebraically over Z-set deltas. Each relation
//! keeps exactly two values: `delta` (this step's input) and `accumulated`
//! (the committed history). Per pipeline step every operator first `eval`s
//! against the state committed after the previous step, then every operator
//! `commit`s, so the whole chain observes one consistent snapshot.
//!
//! - `operator`: the eval/commit two-phase contract.
//! - `relation`: the per-relation delta/accumulated pair and its weighted
//!   extender views.
//! - `join`: the incremental join engine applying the delta-join identity.
//! - `distinct`: the threshold-crossing presence/absence operator.
//! - `pipeline`: a join source chained with transform operators.

#![no_std]

extern crate alloc;

pub mod distinct;
pub mod join;
pub mod operator;
pub mod pipeline;
pub mod relation;

pub use distinct::IncrementalDistinct;
pub use join::IncrementalJoin;
pub use operator::Operator;
pub use pipeline::Pipeline;
pub use relation::{IncrementalRelation, ZSetExtenderView};
