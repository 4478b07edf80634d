//! Trellis Core - value model and error types for the Trellis join engine.
//!
//! This crate defines the vocabulary shared by every other Trellis crate:
//!
//! - `Value`: the closed value enum with a single total order across all
//!   value categories (numeric, textual, symbolic, sequence/nested)
//! - `Tuple`: an ordered sequence of bound values; a prefix is a tuple whose
//!   length equals the current join level, a result tuple one whose length
//!   equals the total number of levels
//! - `Error` / `Result`: the error type shared by the algebra, the batch
//!   join engines and the incremental engine
//!
//! All failures in the engine are contract violations, not transient
//! conditions; nothing is retried.

#![no_std]

extern crate alloc;

pub mod error;
pub mod tuple;
pub mod value;

pub use error::{Error, Result};
pub use tuple::{extended, Tuple};
pub use value::{Value, ValueKind};
