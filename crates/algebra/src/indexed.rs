//! Indexed Z-set: recursively nested, grouped Z-sets.
//!
//! An indexed Z-set is either a flat Z-set leaf or a grouping node mapping
//! keys to further indexed Z-sets. It is a closed two-variant sum type;
//! every operation is structural recursion over the two cases, so there are
//! no casts anywhere.
//!
//! Invariants: no stored entry maps to an empty inner structure, and every
//! child of a node has the same depth. Depth is the number of nesting levels
//! down to a Z-set leaf (a leaf has depth 0). Binary operations between two
//! non-empty operands require equal depth unless the caller explicitly opts
//! out with `DepthPolicy::Relaxed`; even then a leaf can never merge with a
//! node.

use crate::weight::Weight;
use crate::zset::ZSet;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use trellis_core::{Error, Result};

/// Depth-validation policy for binary indexed-Z-set operations.
///
/// Passed explicitly at the call site; there is no ambient toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthPolicy {
    /// Fail on any depth mismatch between non-empty operands.
    Strict,
    /// Skip the up-front depth comparison. Structural leaf/node collisions
    /// still fail.
    Relaxed,
}

/// An arbitrarily-deep nested mapping from key to Z-set or indexed Z-set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexedZSet<K, W> {
    /// A flat Z-set at the bottom of the nesting.
    Leaf(ZSet<K, W>),
    /// One grouping level.
    Node(BTreeMap<K, IndexedZSet<K, W>>),
}

impl<K: Ord + Clone, W: Weight> Default for IndexedZSet<K, W> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: Ord + Clone, W: Weight> IndexedZSet<K, W> {
    /// Creates the canonical empty indexed Z-set.
    pub fn empty() -> Self {
        IndexedZSet::Leaf(ZSet::empty())
    }

    /// Wraps a flat Z-set as a depth-0 structure.
    pub fn from_zset(zset: ZSet<K, W>) -> Self {
        IndexedZSet::Leaf(zset)
    }

    /// Returns true if no entry is stored at any depth.
    pub fn is_empty(&self) -> bool {
        match self {
            IndexedZSet::Leaf(z) => z.is_empty(),
            IndexedZSet::Node(m) => m.is_empty(),
        }
    }

    /// Returns the nesting depth, `None` when empty (an empty structure is
    /// depth-agnostic and combines with anything).
    pub fn depth(&self) -> Option<usize> {
        match self {
            IndexedZSet::Leaf(z) => {
                if z.is_empty() {
                    None
                } else {
                    Some(0)
                }
            }
            IndexedZSet::Node(m) => {
                // All children share one depth, so the first one answers.
                m.values().next().map(|c| 1 + c.depth().unwrap_or(0))
            }
        }
    }

    /// Returns the flat Z-set if this is a leaf.
    pub fn as_zset(&self) -> Option<&ZSet<K, W>> {
        match self {
            IndexedZSet::Leaf(z) => Some(z),
            IndexedZSet::Node(_) => None,
        }
    }

    /// Navigates `path` one grouping level per key, returning the
    /// substructure it lands on. `None` if a key is missing or the path
    /// descends into a leaf.
    pub fn node_at(&self, path: &[K]) -> Option<&Self> {
        let mut cur = self;
        for key in path {
            match cur {
                IndexedZSet::Node(m) => cur = m.get(key)?,
                IndexedZSet::Leaf(_) => return None,
            }
        }
        Some(cur)
    }

    /// Looks up the leaf Z-set under an exact full-depth key path.
    ///
    /// A missing key at any level yields the empty Z-set; descending past a
    /// flat leaf is an error, as is a path shorter than the depth.
    pub fn get_by_prefix(&self, path: &[K]) -> Result<ZSet<K, W>> {
        if self.is_empty() {
            return Ok(ZSet::empty());
        }
        let mut cur = self;
        for key in path {
            match cur {
                IndexedZSet::Node(m) => match m.get(key) {
                    Some(child) => cur = child,
                    None => return Ok(ZSet::empty()),
                },
                IndexedZSet::Leaf(_) => return Err(Error::PrefixBeyondLeaf),
            }
        }
        match cur {
            IndexedZSet::Leaf(z) => Ok(z.clone()),
            IndexedZSet::Node(_) => Err(Error::invalid_operation(
                "key path is shorter than the structure depth",
            )),
        }
    }

    /// Adds `other` under the strict depth policy.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.add_with(other, DepthPolicy::Strict)
    }

    /// Adds `other` under an explicit depth policy.
    pub fn add_with(&self, other: &Self, policy: DepthPolicy) -> Result<Self> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if policy == DepthPolicy::Strict {
            if let (Some(left), Some(right)) = (self.depth(), other.depth()) {
                if left != right {
                    return Err(Error::depth_mismatch(left, right));
                }
            }
        }
        self.merge(other, policy)
    }

    /// Subtracts `other` under the strict depth policy.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.subtract_with(other, DepthPolicy::Strict)
    }

    /// Subtracts `other` under an explicit depth policy.
    pub fn subtract_with(&self, other: &Self, policy: DepthPolicy) -> Result<Self> {
        self.add_with(&other.negate()?, policy)
    }

    /// Maps every weight at every depth through its additive inverse.
    pub fn negate(&self) -> Result<Self> {
        match self {
            IndexedZSet::Leaf(z) => Ok(IndexedZSet::Leaf(z.negate()?)),
            IndexedZSet::Node(m) => {
                let mut out = BTreeMap::new();
                for (k, child) in m {
                    out.insert(k.clone(), child.negate()?);
                }
                Ok(IndexedZSet::Node(out))
            }
        }
    }

    fn merge(&self, other: &Self, policy: DepthPolicy) -> Result<Self> {
        match (self, other) {
            (IndexedZSet::Leaf(a), IndexedZSet::Leaf(b)) => {
                let sum = a.add(b)?;
                Ok(IndexedZSet::Leaf(sum))
            }
            (IndexedZSet::Node(a), IndexedZSet::Node(b)) => {
                let mut out = a.clone();
                for (k, child) in b {
                    match out.remove(k) {
                        Some(existing) => {
                            let merged = existing.add_with(child, policy)?;
                            if !merged.is_empty() {
                                out.insert(k.clone(), merged);
                            }
                        }
                        None => {
                            out.insert(k.clone(), child.clone());
                        }
                    }
                }
                if out.is_empty() {
                    Ok(Self::empty())
                } else {
                    Ok(IndexedZSet::Node(out))
                }
            }
            _ => Err(Error::depth_mismatch(
                self.depth().unwrap_or(0),
                other.depth().unwrap_or(0),
            )),
        }
    }

    /// The central structural-recursion primitive: for every leaf entry,
    /// `map_fn(full_prefix, weight)` proposes a Z-set of extensions which
    /// becomes one more nesting level under that entry. A leaf whose
    /// extension set is empty is dropped, and any group emptied by the drop
    /// disappears with it.
    pub fn extend_leaves<F>(&self, mut map_fn: F) -> Result<Self>
    where
        F: FnMut(&[K], &W) -> Result<ZSet<K, W>>,
    {
        let mut path = Vec::new();
        self.extend_rec(&mut path, &mut map_fn)
    }

    fn extend_rec<F>(&self, path: &mut Vec<K>, map_fn: &mut F) -> Result<Self>
    where
        F: FnMut(&[K], &W) -> Result<ZSet<K, W>>,
    {
        match self {
            IndexedZSet::Leaf(z) => {
                let mut out = BTreeMap::new();
                for (k, w) in z.iter() {
                    path.push(k.clone());
                    let extensions = map_fn(path, w);
                    path.pop();
                    let extensions = extensions?;
                    if !extensions.is_empty() {
                        out.insert(k.clone(), IndexedZSet::Leaf(extensions));
                    }
                }
                if out.is_empty() {
                    Ok(Self::empty())
                } else {
                    Ok(IndexedZSet::Node(out))
                }
            }
            IndexedZSet::Node(m) => {
                let mut out = BTreeMap::new();
                for (k, child) in m {
                    path.push(k.clone());
                    let extended = child.extend_rec(path, map_fn);
                    path.pop();
                    let extended = extended?;
                    if !extended.is_empty() {
                        out.insert(k.clone(), extended);
                    }
                }
                if out.is_empty() {
                    Ok(Self::empty())
                } else {
                    Ok(IndexedZSet::Node(out))
                }
            }
        }
    }

    /// Depth-first traversal invoking `f(full_prefix, weight)` once per leaf
    /// entry, in key order at every level.
    pub fn for_each_leaf<F>(&self, mut f: F)
    where
        F: FnMut(&[K], &W),
    {
        let mut path = Vec::new();
        self.leaf_rec(&mut path, &mut f);
    }

    fn leaf_rec<F>(&self, path: &mut Vec<K>, f: &mut F)
    where
        F: FnMut(&[K], &W),
    {
        match self {
            IndexedZSet::Leaf(z) => {
                for (k, w) in z.iter() {
                    path.push(k.clone());
                    f(path, w);
                    path.pop();
                }
            }
            IndexedZSet::Node(m) => {
                for (k, child) in m {
                    path.push(k.clone());
                    child.leaf_rec(path, f);
                    path.pop();
                }
            }
        }
    }

    /// Per-level extension composition for grouped representations: for each
    /// top-level key present in both operands, Cartesian-multiplies the two
    /// inner Z-sets via `combine`, keeping the key only if the product is
    /// non-empty. Defined for depth-1 operands.
    pub fn join<F>(&self, other: &Self, mut combine: F) -> Result<Self>
    where
        F: FnMut(&K, &K) -> K,
    {
        if self.is_empty() || other.is_empty() {
            return Ok(Self::empty());
        }
        let (a, b) = match (self, other) {
            (IndexedZSet::Node(a), IndexedZSet::Node(b)) => (a, b),
            _ => {
                return Err(Error::invalid_operation(
                    "join requires grouped (depth-1) operands",
                ))
            }
        };
        let mut out = BTreeMap::new();
        for (k, left) in a {
            if let Some(right) = b.get(k) {
                match (left, right) {
                    (IndexedZSet::Leaf(lz), IndexedZSet::Leaf(rz)) => {
                        let product = lz.product(rz, &mut combine)?;
                        if !product.is_empty() {
                            out.insert(k.clone(), IndexedZSet::Leaf(product));
                        }
                    }
                    _ => {
                        return Err(Error::invalid_operation(
                            "join requires grouped (depth-1) operands",
                        ))
                    }
                }
            }
        }
        if out.is_empty() {
            Ok(Self::empty())
        } else {
            Ok(IndexedZSet::Node(out))
        }
    }

    /// Collapses the whole structure to a flat Z-set, left-folding `combine`
    /// over each key path and summing weights on collisions.
    pub fn flatten<F>(&self, mut combine: F) -> Result<ZSet<K, W>>
    where
        F: FnMut(&K, &K) -> K,
    {
        let mut pairs = Vec::new();
        self.for_each_leaf(|path, w| {
            let mut key = path[0].clone();
            for k in &path[1..] {
                key = combine(&key, k);
            }
            pairs.push((key, w.clone()));
        });
        ZSet::from_entries(pairs)
    }

    /// Drops the outer grouping level, summing the inner structures.
    pub fn deindex(&self) -> Result<Self> {
        match self {
            IndexedZSet::Node(m) => {
                let mut out = Self::empty();
                for child in m.values() {
                    out = out.add(child)?;
                }
                Ok(out)
            }
            IndexedZSet::Leaf(z) => {
                if z.is_empty() {
                    Ok(Self::empty())
                } else {
                    Err(Error::invalid_operation(
                        "deindex requires a grouped structure",
                    ))
                }
            }
        }
    }

    /// Flattens an arbitrarily-deep structure into a Z-set of full-depth
    /// result tuples.
    pub fn to_flat_zset(&self) -> Result<ZSet<Vec<K>, W>> {
        let mut pairs = Vec::new();
        self.for_each_leaf(|path, w| {
            pairs.push((path.to_vec(), w.clone()));
        });
        ZSet::from_entries(pairs)
    }
}

impl<K: Ord + Clone, W: Weight> ZSet<K, W> {
    /// Groups a flat Z-set into a depth-1 indexed Z-set: each entry lands in
    /// the group `key_fn(value)`, weights of identical (group, value) pairs
    /// accumulate, zero-weight entries and then empty groups are dropped.
    pub fn index<F>(&self, mut key_fn: F) -> Result<IndexedZSet<K, W>>
    where
        F: FnMut(&K) -> K,
    {
        if self.is_empty() {
            return Ok(IndexedZSet::empty());
        }
        let mut groups: BTreeMap<K, ZSet<K, W>> = BTreeMap::new();
        for (k, w) in self.iter() {
            let group = key_fn(k);
            groups
                .entry(group)
                .or_default()
                .accumulate(k.clone(), w.clone())?;
        }
        let out: BTreeMap<K, IndexedZSet<K, W>> = groups
            .into_iter()
            .filter(|(_, z)| !z.is_empty())
            .map(|(k, z)| (k, IndexedZSet::Leaf(z)))
            .collect();
        if out.is_empty() {
            Ok(IndexedZSet::empty())
        } else {
            Ok(IndexedZSet::Node(out))
        }
    }
}
