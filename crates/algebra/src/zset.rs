//! Z-set: an immutable mapping from key to nonzero weight.
//!
//! A Z-set is a weighted multiset. Entries whose weight becomes zero are
//! dropped on the spot, so deletion never needs an explicit operation. The
//! backing map is ordered; iteration order is the key order, which is what
//! makes repeated runs over identical input byte-identical.

use crate::weight::Weight;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use trellis_core::Result;

/// A weighted multiset forming an abelian group under addition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZSet<K, W> {
    entries: BTreeMap<K, W>,
}

impl<K: Ord + Clone, W: Weight> Default for ZSet<K, W> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Ord + Clone, W: Weight> ZSet<K, W> {
    /// Creates an empty Z-set.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Creates a Z-set holding a single entry; a zero weight yields the
    /// empty Z-set.
    pub fn singleton(key: K, weight: W) -> Self {
        let mut entries = BTreeMap::new();
        if !weight.is_zero() {
            entries.insert(key, weight);
        }
        Self { entries }
    }

    /// Builds a Z-set from (key, weight) pairs, summing weights of repeated
    /// keys and dropping entries that sum to zero.
    pub fn from_entries(pairs: impl IntoIterator<Item = (K, W)>) -> Result<Self> {
        let mut out = Self::empty();
        for (k, w) in pairs {
            out.accumulate(k, w)?;
        }
        Ok(out)
    }

    /// Returns the weight of `key`, `zero` if absent.
    pub fn weight(&self, key: &K) -> W {
        self.entries.get(key).cloned().unwrap_or_else(W::zero)
    }

    /// Returns true if `key` has a nonzero weight.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &W)> {
        self.entries.iter()
    }

    /// Iterates keys in key order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Adds `other`, summing weights of shared keys and dropping entries
    /// that sum to zero.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let mut out = self.clone();
        for (k, w) in other.iter() {
            out.accumulate(k.clone(), w.clone())?;
        }
        Ok(out)
    }

    /// Maps every weight through its additive inverse.
    pub fn negate(&self) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (k, w) in self.iter() {
            entries.insert(k.clone(), w.negate()?);
        }
        Ok(Self { entries })
    }

    /// Subtracts `other` (`add` of the negation).
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.add(&other.negate()?)
    }

    /// Keeps entries whose weight is strictly greater than zero.
    pub fn positive(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(_, w)| w.is_positive())
            .map(|(k, w)| (k.clone(), w.clone()))
            .collect();
        Self { entries }
    }

    /// Maps every present key to weight `one`, discarding magnitudes: the
    /// set representation of this multiset, within the same algebra.
    pub fn distinct(&self) -> Self {
        let entries = self
            .entries
            .keys()
            .map(|k| (k.clone(), W::one()))
            .collect();
        Self { entries }
    }

    /// Scales every weight by an integer scalar; scaling by zero yields the
    /// empty Z-set.
    pub fn multiply(&self, scalar: i64) -> Result<Self> {
        let mut out = Self::empty();
        for (k, w) in self.iter() {
            out.accumulate(k.clone(), w.multiply_scalar(scalar)?)?;
        }
        Ok(out)
    }

    /// Scales every weight by a single weight factor.
    pub fn scaled(&self, factor: &W) -> Result<Self> {
        let mut out = Self::empty();
        for (k, w) in self.iter() {
            out.accumulate(k.clone(), w.multiply(factor)?)?;
        }
        Ok(out)
    }

    /// Full Cartesian product of both key spaces: combined key =
    /// `combine(k1, k2)`, combined weight = `w1 * w2`, collisions on the
    /// same combined key summed (and dropped at zero).
    ///
    /// This is the building block for generating extension-scaled
    /// candidates, not an equi-join.
    pub fn product<F>(&self, other: &Self, mut combine: F) -> Result<Self>
    where
        F: FnMut(&K, &K) -> K,
    {
        let mut out = Self::empty();
        for (k1, w1) in self.iter() {
            for (k2, w2) in other.iter() {
                out.accumulate(combine(k1, k2), w1.multiply(w2)?)?;
            }
        }
        Ok(out)
    }

    /// Equi-join on identical keys: only keys present in both sides
    /// survive, with weight = product.
    pub fn natural_join(&self, other: &Self) -> Result<Self> {
        // Iterating the smaller side changes cost, never the result.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut entries = BTreeMap::new();
        for (k, w) in small.iter() {
            if let Some(v) = large.entries.get(k) {
                let product = w.multiply(v)?;
                if !product.is_zero() {
                    entries.insert(k.clone(), product);
                }
            }
        }
        Ok(Self { entries })
    }

    /// Returns the entries as a vector, in key order.
    pub fn to_vec(&self) -> Vec<(K, W)> {
        self.entries
            .iter()
            .map(|(k, w)| (k.clone(), w.clone()))
            .collect()
    }

    /// Folds `weight` into the entry for `key`, removing the entry if the
    /// sum is zero. Internal: the only mutation path.
    pub(crate) fn accumulate(&mut self, key: K, weight: W) -> Result<()> {
        if weight.is_zero() {
            return Ok(());
        }
        match self.entries.remove(&key) {
            Some(existing) => {
                let sum = existing.add(&weight)?;
                if !sum.is_zero() {
                    self.entries.insert(key, sum);
                }
            }
            None => {
                self.entries.insert(key, weight);
            }
        }
        Ok(())
    }
}
