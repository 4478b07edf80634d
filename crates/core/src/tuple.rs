//! Tuple vocabulary shared by the batch and incremental join engines.
//!
//! A prefix is a tuple whose length equals the current join level (empty at
//! the root); an extension is a single candidate value that lengthens a
//! prefix by one level; a result tuple is a tuple of full length.

use crate::value::Value;
use alloc::vec::Vec;

/// An ordered sequence of bound values.
pub type Tuple = Vec<Value>;

/// Returns `prefix` extended by one level with `value`.
pub fn extended(prefix: &[Value], value: &Value) -> Tuple {
    let mut out = Vec::with_capacity(prefix.len() + 1);
    out.extend_from_slice(prefix);
    out.push(value.clone());
    out
}
