//! Combi join: the leapfrog merge applied independently per level.
//!
//! Instead of maintaining a level stack across the whole traversal, every
//! prefix repositions its participating indexes from the root and collects
//! the full extension list for that level, generic-join style. Appropriate
//! when reconstructing child cursors per prefix is cheap.

use crate::leapfrog::index::LeapfrogIndex;
use crate::leapfrog::{search_ring, LeapfrogIterator};
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use trellis_core::{extended, Error, Result, Tuple};

pub struct CombiJoin {
    levels: usize,
}

impl CombiJoin {
    pub fn new(levels: usize) -> Self {
        Self { levels }
    }

    /// Runs the join, returning the complete result tuples.
    pub fn execute<'a>(
        &self,
        indexes: &mut [Box<dyn LeapfrogIndex + 'a>],
    ) -> Result<Vec<Tuple>> {
        if indexes.is_empty() {
            return Err(Error::empty_combinator("CombiJoin"));
        }
        for level in 0..self.levels {
            if !indexes.iter().any(|ix| ix.participates(level)) {
                return Err(Error::invalid_operation(
                    "no index participates at the requested level",
                ));
            }
        }

        let mut prefixes: Vec<Tuple> = vec![Tuple::new()];
        for level in 0..self.levels {
            let mut next = Vec::new();
            'prefix: for prefix in &prefixes {
                for ix in indexes.iter_mut() {
                    if !ix.participates(level) {
                        continue;
                    }
                    ix.reinit()?;
                    for (bound, value) in prefix.iter().enumerate() {
                        if !ix.participates(bound) {
                            continue;
                        }
                        ix.seek(value)?;
                        if ix.at_end() || ix.key()? != value {
                            // This index holds nothing under the prefix.
                            continue 'prefix;
                        }
                        ix.open_level()?;
                    }
                }

                let mut cursors: Vec<&mut dyn LeapfrogIterator> = indexes
                    .iter_mut()
                    .filter(|ix| ix.participates(level))
                    .map(|ix| &mut **ix as &mut dyn LeapfrogIterator)
                    .collect();
                while let Some((key, slot)) = search_ring(&mut cursors)? {
                    next.push(extended(prefix, &key));
                    cursors[slot].next()?;
                }
            }
            prefixes = next;
        }
        Ok(prefixes)
    }
}
