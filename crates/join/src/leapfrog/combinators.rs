//! Logical combinators over whole leapfrog indexes.
//!
//! Each combinator is itself a `LeapfrogIndex`, so AND/OR/NOT trees plug
//! into `LeapfrogJoin` and `CombiJoin` in place of plain indexes. Children
//! are combined over their full level structure and must agree on
//! `max_level`; participation delegates to the first child (the positive
//! child for NOT).

use crate::leapfrog::index::LeapfrogIndex;
use crate::leapfrog::{search_ring, LeapfrogIterator};
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use trellis_core::{Error, Result, Value};

fn validate_children(name: &str, children: &[Box<dyn LeapfrogIndex + '_>]) -> Result<()> {
    let first = match children.first() {
        Some(first) => first,
        None => return Err(Error::empty_combinator(name)),
    };
    let expected = first.max_level();
    for child in &children[1..] {
        if child.max_level() != expected {
            return Err(Error::max_level_mismatch(expected, child.max_level()));
        }
    }
    Ok(())
}

/// Intersection of N indexes: positioned only at keys all children share,
/// at every level.
pub struct AndIndex<'a> {
    children: Vec<Box<dyn LeapfrogIndex + 'a>>,
    exhausted: bool,
}

impl<'a> AndIndex<'a> {
    pub fn new(children: Vec<Box<dyn LeapfrogIndex + 'a>>) -> Result<Self> {
        validate_children("AndIndex", &children)?;
        let mut combined = Self {
            children,
            exhausted: false,
        };
        combined.align()?;
        Ok(combined)
    }

    /// Advances the children to their next common key, if any.
    fn align(&mut self) -> Result<()> {
        let mut cursors: Vec<&mut dyn LeapfrogIterator> = self
            .children
            .iter_mut()
            .map(|c| &mut **c as &mut dyn LeapfrogIterator)
            .collect();
        self.exhausted = search_ring(&mut cursors)?.is_none();
        Ok(())
    }
}

impl LeapfrogIterator for AndIndex<'_> {
    fn key(&self) -> Result<&Value> {
        if self.exhausted {
            return Err(Error::CursorExhausted);
        }
        self.children[0].key()
    }

    fn next(&mut self) -> Result<()> {
        if self.exhausted {
            return Err(Error::CursorExhausted);
        }
        self.children[0].next()?;
        self.align()
    }

    fn seek(&mut self, key: &Value) -> Result<()> {
        if self.exhausted {
            return Ok(());
        }
        for child in self.children.iter_mut() {
            child.seek(key)?;
        }
        self.align()
    }

    fn at_end(&self) -> bool {
        self.exhausted
    }
}

impl LeapfrogIndex for AndIndex<'_> {
    fn open_level(&mut self) -> Result<()> {
        for child in self.children.iter_mut() {
            child.open_level()?;
        }
        self.align()
    }

    fn close_level(&mut self) -> Result<()> {
        for child in self.children.iter_mut() {
            child.close_level()?;
        }
        // Parents were aligned at the key that was opened.
        self.exhausted = false;
        Ok(())
    }

    fn level(&self) -> usize {
        self.children[0].level()
    }

    fn max_level(&self) -> usize {
        self.children[0].max_level()
    }

    fn reinit(&mut self) -> Result<()> {
        for child in self.children.iter_mut() {
            child.reinit()?;
        }
        self.exhausted = false;
        self.align()
    }

    fn participates(&self, level: usize) -> bool {
        self.children[0].participates(level)
    }
}

/// Union of N indexes: positioned at the minimum key over the children that
/// followed the bound path this far.
///
/// Opening a level descends only into the children positioned at the bound
/// key; a per-level activity mask brings them back in when the level closes.
pub struct OrIndex<'a> {
    children: Vec<Box<dyn LeapfrogIndex + 'a>>,
    active: Vec<Vec<bool>>,
}

impl<'a> OrIndex<'a> {
    pub fn new(children: Vec<Box<dyn LeapfrogIndex + 'a>>) -> Result<Self> {
        validate_children("OrIndex", &children)?;
        Ok(Self {
            children,
            active: Vec::new(),
        })
    }

    fn is_active(&self, i: usize) -> bool {
        self.active.last().map_or(true, |mask| mask[i])
    }
}

impl LeapfrogIterator for OrIndex<'_> {
    fn key(&self) -> Result<&Value> {
        let mut best: Option<&Value> = None;
        for (i, child) in self.children.iter().enumerate() {
            if !self.is_active(i) || child.at_end() {
                continue;
            }
            let key = child.key()?;
            best = match best {
                Some(b) if b <= key => Some(b),
                _ => Some(key),
            };
        }
        best.ok_or(Error::CursorExhausted)
    }

    fn next(&mut self) -> Result<()> {
        let min = self.key()?.clone();
        for i in 0..self.children.len() {
            if !self.is_active(i) || self.children[i].at_end() {
                continue;
            }
            if *self.children[i].key()? == min {
                self.children[i].next()?;
            }
        }
        Ok(())
    }

    fn seek(&mut self, key: &Value) -> Result<()> {
        for i in 0..self.children.len() {
            if self.is_active(i) && !self.children[i].at_end() {
                self.children[i].seek(key)?;
            }
        }
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.children
            .iter()
            .enumerate()
            .all(|(i, c)| !self.is_active(i) || c.at_end())
    }
}

impl LeapfrogIndex for OrIndex<'_> {
    fn open_level(&mut self) -> Result<()> {
        let bound = self.key()?.clone();
        let mut mask = vec![false; self.children.len()];
        for i in 0..self.children.len() {
            if !self.is_active(i) || self.children[i].at_end() {
                continue;
            }
            if *self.children[i].key()? == bound {
                self.children[i].open_level()?;
                mask[i] = true;
            }
        }
        self.active.push(mask);
        Ok(())
    }

    fn close_level(&mut self) -> Result<()> {
        let mask = match self.active.pop() {
            Some(mask) => mask,
            None => return Err(Error::LevelUnderflow),
        };
        for (i, opened) in mask.iter().enumerate() {
            if *opened {
                self.children[i].close_level()?;
            }
        }
        Ok(())
    }

    fn level(&self) -> usize {
        self.active.len()
    }

    fn max_level(&self) -> usize {
        self.children[0].max_level()
    }

    fn reinit(&mut self) -> Result<()> {
        for child in self.children.iter_mut() {
            child.reinit()?;
        }
        self.active.clear();
        Ok(())
    }

    fn participates(&self, level: usize) -> bool {
        let first = self.children[0].participates(level);
        debug_assert!(
            self.children.iter().all(|c| c.participates(level) == first),
            "OrIndex children disagree on participation at level {}",
            level
        );
        first
    }
}

/// Anti-join: behaves as the positive child, except that at the final level
/// any key whose full path is present in **every** negative child is skipped.
pub struct NotIndex<'a> {
    positive: Box<dyn LeapfrogIndex + 'a>,
    negatives: Vec<Box<dyn LeapfrogIndex + 'a>>,
    masks: Vec<Vec<bool>>,
}

impl<'a> NotIndex<'a> {
    pub fn new(
        positive: Box<dyn LeapfrogIndex + 'a>,
        negatives: Vec<Box<dyn LeapfrogIndex + 'a>>,
    ) -> Result<Self> {
        if negatives.is_empty() {
            return Err(Error::empty_combinator("NotIndex"));
        }
        for negative in &negatives {
            if negative.max_level() != positive.max_level() {
                return Err(Error::max_level_mismatch(
                    positive.max_level(),
                    negative.max_level(),
                ));
            }
        }
        let mut combined = Self {
            positive,
            negatives,
            masks: Vec::new(),
        };
        combined.skip_excluded()?;
        Ok(combined)
    }

    fn neg_active(&self, i: usize) -> bool {
        self.masks.last().map_or(true, |mask| mask[i])
    }

    fn at_final(&self) -> bool {
        self.positive.level() == self.positive.max_level()
    }

    /// True iff every negative child, following the same bound path, holds
    /// `key` at the final level.
    fn excluded(&mut self, key: &Value) -> Result<bool> {
        if (0..self.negatives.len()).any(|i| !self.neg_active(i)) {
            return Ok(false);
        }
        for negative in self.negatives.iter_mut() {
            negative.seek(key)?;
            if negative.at_end() || negative.key()? != key {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Restores the invariant that the position at the final level is never
    /// an excluded key.
    fn skip_excluded(&mut self) -> Result<()> {
        if !self.at_final() {
            return Ok(());
        }
        while !self.positive.at_end() {
            let key = self.positive.key()?.clone();
            if !self.excluded(&key)? {
                break;
            }
            self.positive.next()?;
        }
        Ok(())
    }
}

impl LeapfrogIterator for NotIndex<'_> {
    fn key(&self) -> Result<&Value> {
        self.positive.key()
    }

    fn next(&mut self) -> Result<()> {
        self.positive.next()?;
        self.skip_excluded()
    }

    fn seek(&mut self, key: &Value) -> Result<()> {
        self.positive.seek(key)?;
        self.skip_excluded()
    }

    fn at_end(&self) -> bool {
        self.positive.at_end()
    }
}

impl LeapfrogIndex for NotIndex<'_> {
    fn open_level(&mut self) -> Result<()> {
        let bound = self.positive.key()?.clone();
        self.positive.open_level()?;
        let currently: Vec<bool> = (0..self.negatives.len())
            .map(|i| self.neg_active(i))
            .collect();
        let mut mask = vec![false; self.negatives.len()];
        for (i, negative) in self.negatives.iter_mut().enumerate() {
            if !currently[i] {
                continue;
            }
            negative.seek(&bound)?;
            if !negative.at_end() && *negative.key()? == bound {
                negative.open_level()?;
                mask[i] = true;
            }
        }
        self.masks.push(mask);
        self.skip_excluded()
    }

    fn close_level(&mut self) -> Result<()> {
        self.positive.close_level()?;
        let mask = match self.masks.pop() {
            Some(mask) => mask,
            None => return Err(Error::LevelUnderflow),
        };
        for (i, opened) in mask.iter().enumerate() {
            if *opened {
                self.negatives[i].close_level()?;
            }
        }
        Ok(())
    }

    fn level(&self) -> usize {
        self.positive.level()
    }

    fn max_level(&self) -> usize {
        self.positive.max_level()
    }

    fn reinit(&mut self) -> Result<()> {
        self.positive.reinit()?;
        for negative in self.negatives.iter_mut() {
            negative.reinit()?;
        }
        self.masks.clear();
        self.skip_excluded()
    }

    fn participates(&self, level: usize) -> bool {
        self.positive.participates(level)
    }
}
