//! Weight algebra for Z-sets.
//!
//! A weight forms a commutative group under `add`/`negate` with identity
//! `zero`, plus a multiplication that is associative, commutative and
//! distributes over `add` (used for Cartesian and join weight composition).
//! Overflow is a contract violation: arithmetic fails fast and never wraps,
//! since silent wrap-around would corrupt zero-weight elimination.

use core::fmt::Debug;
use trellis_core::{Error, Result};

/// Scalar weight of a Z-set edge.
///
/// `Ord` is a supertrait so that `ZSet::positive` is defined for every
/// weight type without a caller-supplied ordering predicate.
pub trait Weight: Clone + Eq + Ord + Debug {
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Returns true if this is the additive identity.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Returns true if this weight is strictly greater than zero.
    fn is_positive(&self) -> bool {
        *self > Self::zero()
    }

    /// Adds two weights.
    fn add(&self, other: &Self) -> Result<Self>;

    /// Returns the additive inverse.
    fn negate(&self) -> Result<Self>;

    /// Multiplies two weights.
    fn multiply(&self, other: &Self) -> Result<Self>;

    /// Multiplies by an integer scalar (repeated addition).
    fn multiply_scalar(&self, scalar: i64) -> Result<Self>;
}

/// Checked 64-bit integer weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntWeight(pub i64);

impl Weight for IntWeight {
    fn zero() -> Self {
        IntWeight(0)
    }

    fn one() -> Self {
        IntWeight(1)
    }

    fn add(&self, other: &Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(IntWeight)
            .ok_or(Error::WeightOverflow)
    }

    fn negate(&self) -> Result<Self> {
        self.0
            .checked_neg()
            .map(IntWeight)
            .ok_or(Error::WeightOverflow)
    }

    fn multiply(&self, other: &Self) -> Result<Self> {
        self.0
            .checked_mul(other.0)
            .map(IntWeight)
            .ok_or(Error::WeightOverflow)
    }

    fn multiply_scalar(&self, scalar: i64) -> Result<Self> {
        self.0
            .checked_mul(scalar)
            .map(IntWeight)
            .ok_or(Error::WeightOverflow)
    }
}

impl From<i64> for IntWeight {
    fn from(v: i64) -> Self {
        IntWeight(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identities() {
        assert!(IntWeight::zero().is_zero());
        assert!(!IntWeight::one().is_zero());
        assert!(IntWeight::one().is_positive());
        assert!(!IntWeight(-1).is_positive());
        assert!(!IntWeight::zero().is_positive());
    }

    #[test]
    fn test_add_negate() {
        let a = IntWeight(3);
        let b = IntWeight(4);
        assert_eq!(a.add(&b).unwrap(), IntWeight(7));
        assert_eq!(a.add(&a.negate().unwrap()).unwrap(), IntWeight::zero());
    }

    #[test]
    fn test_multiply() {
        assert_eq!(IntWeight(3).multiply(&IntWeight(-4)).unwrap(), IntWeight(-12));
        assert_eq!(IntWeight(5).multiply_scalar(0).unwrap(), IntWeight::zero());
        assert_eq!(IntWeight(5).multiply_scalar(3).unwrap(), IntWeight(15));
    }

    #[test]
    fn test_overflow_fails_fast() {
        assert_eq!(
            IntWeight(i64::MAX).add(&IntWeight(1)),
            Err(Error::WeightOverflow)
        );
        assert_eq!(IntWeight(i64::MIN).negate(), Err(Error::WeightOverflow));
        assert_eq!(
            IntWeight(i64::MAX).multiply(&IntWeight(2)),
            Err(Error::WeightOverflow)
        );
        assert_eq!(
            IntWeight(i64::MAX).multiply_scalar(2),
            Err(Error::WeightOverflow)
        );
    }
}
