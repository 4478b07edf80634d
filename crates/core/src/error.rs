//! Error types for the Trellis join engine.

use alloc::string::String;
use core::fmt;

/// Result type alias for Trellis operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for join-engine operations.
///
/// Every variant is a contract violation; none are transient and none are
/// retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A combinator was constructed with no children.
    EmptyCombinator {
        combinator: String,
    },
    /// A function or predicate extender was given an unsupported arity.
    InvalidArity {
        arity: usize,
    },
    /// Combined indexes disagree on their maximum level.
    MaxLevelMismatch {
        expected: usize,
        got: usize,
    },
    /// Two non-empty indexed Z-sets of different depth were combined.
    DepthMismatch {
        left: usize,
        right: usize,
    },
    /// Weight arithmetic overflowed.
    WeightOverflow,
    /// `key()` or `next()` was called on an exhausted cursor.
    CursorExhausted,
    /// `open_level` was called beyond the index's maximum level.
    LevelOverflow {
        level: usize,
        max: usize,
    },
    /// `close_level` was called at the root level.
    LevelUnderflow,
    /// A key path descended past a flat (non-indexed) leaf.
    PrefixBeyondLeaf,
    /// Invalid operation.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyCombinator { combinator } => {
                write!(f, "Combinator {} requires at least one child", combinator)
            }
            Error::InvalidArity { arity } => {
                write!(f, "Unsupported arity {}: expected 1 or 2", arity)
            }
            Error::MaxLevelMismatch { expected, got } => {
                write!(f, "Max level mismatch: expected {}, got {}", expected, got)
            }
            Error::DepthMismatch { left, right } => {
                write!(f, "Indexed Z-set depth mismatch: {} vs {}", left, right)
            }
            Error::WeightOverflow => write!(f, "Weight arithmetic overflow"),
            Error::CursorExhausted => write!(f, "Cursor is exhausted"),
            Error::LevelOverflow { level, max } => {
                write!(f, "Cannot open level {}: max level is {}", level, max)
            }
            Error::LevelUnderflow => write!(f, "Cannot close below the root level"),
            Error::PrefixBeyondLeaf => {
                write!(f, "Key path descends past a flat leaf")
            }
            Error::InvalidOperation { message } => {
                write!(f, "Invalid operation: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates an empty-combinator error.
    pub fn empty_combinator(combinator: impl Into<String>) -> Self {
        Error::EmptyCombinator {
            combinator: combinator.into(),
        }
    }

    /// Creates an unsupported-arity error.
    pub fn invalid_arity(arity: usize) -> Self {
        Error::InvalidArity { arity }
    }

    /// Creates a max-level mismatch error.
    pub fn max_level_mismatch(expected: usize, got: usize) -> Self {
        Error::MaxLevelMismatch { expected, got }
    }

    /// Creates a depth mismatch error.
    pub fn depth_mismatch(left: usize, right: usize) -> Self {
        Error::DepthMismatch { left, right }
    }

    /// Creates a level overflow error.
    pub fn level_overflow(level: usize, max: usize) -> Self {
        Error::LevelOverflow { level, max }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }
}
