//! Value type definitions for the Trellis join engine.
//!
//! This module defines the `Value` enum which represents any value a relation
//! can store, together with the single total order the join engines rely on.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// The category of a `Value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Numeric value
    Int,
    /// Textual value
    Text,
    /// Symbolic identifier
    Sym,
    /// Sequence or nested structure
    Seq,
}

/// A value stored in a relation.
///
/// Leapfrog correctness depends on one strict total order across every value
/// category, not per-category orderings. The `Ord` implementation below
/// provides it: values compare by category rank first (Int < Text < Sym <
/// Seq), then by the natural order within the category, recursively for
/// sequences. Because the enum is closed there is no "unknown category" case
/// to fail on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
    /// UTF-8 string
    Text(String),
    /// Interned symbol name
    Sym(String),
    /// Ordered sequence of values (covers nested structures)
    Seq(Vec<Value>),
}

impl Value {
    /// Returns the category of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Text(_) => ValueKind::Text,
            Value::Sym(_) => ValueKind::Sym,
            Value::Seq(_) => ValueKind::Seq,
        }
    }

    /// Creates a textual value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Creates a symbolic value.
    pub fn sym(s: impl Into<String>) -> Self {
        Value::Sym(s.into())
    }

    /// Returns the integer if this is an Int, None otherwise.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string if this is a Text, None otherwise.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the symbol name if this is a Sym, None otherwise.
    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Value::Sym(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the elements if this is a Seq, None otherwise.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Int(_) => 0,
            Value::Text(_) => 1,
            Value::Sym(_) => 2,
            Value::Seq(_) => 3,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Sym(a), Value::Sym(b)) => a.cmp(b),
            (Value::Seq(a), Value::Seq(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.into())
    }
}
