//! Leapfrog triejoin: sorted-cursor merge-intersection.
//!
//! The iterator protocol is the external adapter surface: any sorted
//! collection that can seek forward can participate. `search_ring` is the
//! round-robin seek-to-maximum loop every strategy in this module shares.

pub mod combinators;
pub mod index;
pub mod join;

pub use join::LeapfrogJoin;

use alloc::vec::Vec;
use trellis_core::{Error, Result, Value};

/// A sorted cursor with monotonic forward-only movement.
pub trait LeapfrogIterator {
    /// The value at the current position; fails once exhausted.
    fn key(&self) -> Result<&Value>;

    /// Advances exactly one position; fails once exhausted.
    fn next(&mut self) -> Result<()>;

    /// Moves forward to the first stored value `>= key`. Never moves
    /// backward; seeking past the last value exhausts the cursor.
    fn seek(&mut self, key: &Value) -> Result<()>;

    /// Whether the cursor has moved past its last value.
    fn at_end(&self) -> bool;
}

/// A cursor over a sorted, deduplicated vector of values.
pub struct VecCursor {
    keys: Vec<Value>,
    pos: usize,
}

impl VecCursor {
    pub fn new(mut keys: Vec<Value>) -> Self {
        keys.sort();
        keys.dedup();
        Self { keys, pos: 0 }
    }
}

impl LeapfrogIterator for VecCursor {
    fn key(&self) -> Result<&Value> {
        self.keys.get(self.pos).ok_or(Error::CursorExhausted)
    }

    fn next(&mut self) -> Result<()> {
        if self.at_end() {
            return Err(Error::CursorExhausted);
        }
        self.pos += 1;
        Ok(())
    }

    fn seek(&mut self, key: &Value) -> Result<()> {
        self.pos += self.keys[self.pos..].partition_point(|k| k < key);
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.keys.len()
    }
}

/// Round-robin intersection step over N cursors at one level.
///
/// Tracks the running maximum key and the ring position that last raised it;
/// every other cursor is sought up to the maximum in turn. When the ring
/// returns to that position unchanged all cursors agree: the key is a match,
/// returned together with the position holding it (the one `next` must
/// advance to resume the search). `None` means the level's intersection is
/// exhausted.
pub(crate) fn search_ring(
    cursors: &mut [&mut dyn LeapfrogIterator],
) -> Result<Option<(Value, usize)>> {
    let n = cursors.len();
    if n == 0 {
        return Ok(None);
    }
    for cursor in cursors.iter() {
        if cursor.at_end() {
            return Ok(None);
        }
    }
    let mut max_key = cursors[0].key()?.clone();
    let mut start = 0;
    let mut i = 1 % n;
    loop {
        if i == start {
            return Ok(Some((max_key, start)));
        }
        cursors[i].seek(&max_key)?;
        if cursors[i].at_end() {
            return Ok(None);
        }
        let key = cursors[i].key()?;
        if *key > max_key {
            max_key = key.clone();
            start = i;
        }
        i = (i + 1) % n;
    }
}

/// Intersection of N sorted cursors at a single level.
pub struct LeapfrogSingleJoin<I> {
    cursors: Vec<I>,
    last: Option<usize>,
}

impl<I: LeapfrogIterator> LeapfrogSingleJoin<I> {
    pub fn new(cursors: Vec<I>) -> Result<Self> {
        if cursors.is_empty() {
            return Err(Error::empty_combinator("LeapfrogSingleJoin"));
        }
        Ok(Self {
            cursors,
            last: None,
        })
    }

    /// Finds the next key all cursors agree on, `None` once exhausted.
    pub fn search(&mut self) -> Result<Option<Value>> {
        let mut refs: Vec<&mut dyn LeapfrogIterator> = self
            .cursors
            .iter_mut()
            .map(|c| c as &mut dyn LeapfrogIterator)
            .collect();
        match search_ring(&mut refs)? {
            Some((key, holder)) => {
                self.last = Some(holder);
                Ok(Some(key))
            }
            None => {
                self.last = None;
                Ok(None)
            }
        }
    }

    /// Advances past the last match and searches for the next one.
    pub fn next(&mut self) -> Result<Option<Value>> {
        match self.last.take() {
            Some(holder) => {
                self.cursors[holder].next()?;
                self.search()
            }
            None => Ok(None),
        }
    }
}
