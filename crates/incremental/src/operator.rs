//! The eval/commit two-phase operator contract.

use trellis_algebra::{Weight, ZSet};
use trellis_core::{Result, Tuple};

/// A transform stage in an incremental pipeline.
///
/// `eval` computes this step's output delta purely from state as committed
/// after the previous step; it must not fold the input into that state, only
/// stash it. `commit` then folds the most recent `eval`'s input in. The
/// pipeline calls every operator's `eval` before any `commit`, so each one
/// observes the same previous-step snapshot.
pub trait Operator<W: Weight> {
    /// Computes the output delta for this step's `input` delta.
    fn eval(&mut self, input: &ZSet<Tuple, W>) -> Result<ZSet<Tuple, W>>;

    /// Folds the pending input into persisted state.
    fn commit(&mut self) -> Result<()>;
}
