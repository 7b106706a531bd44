//! Directed weighted edge storage, 1-indexed like `NodeTable`. Work links
//! (fixed commuting) and play links (randomized daily movement) have the same
//! shape except that only work links carry a distance.

use crate::error::MetapopError;
use crate::{LinkId, WardId};

/// Struct-of-arrays table of work links.
///
/// `weight` is the baseline loaded from file (truncated to an integer value
/// on load); `suscept` is the working copy the per-day passes mutate and the
/// daily reset restores from `weight`.
#[derive(Debug)]
pub struct LinkTable {
    pub ifrom: Vec<usize>,
    pub ito: Vec<usize>,
    pub weight: Vec<f64>,
    pub suscept: Vec<f64>,
    /// Euclidean distance between endpoints, filled in once positions are
    /// known. Zero until then.
    pub distance: Vec<f64>,
}

impl LinkTable {
    pub fn with_capacity(capacity: usize) -> Self {
        LinkTable {
            ifrom: vec![0; capacity],
            ito: vec![0; capacity],
            weight: vec![0.0; capacity],
            suscept: vec![0.0; capacity],
            distance: vec![0.0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.ifrom.len()
    }

    pub fn endpoints(&self, link: LinkId) -> (WardId, WardId) {
        (WardId(self.ifrom[link.0]), WardId(self.ito[link.0]))
    }

    /// Resizes to `new_capacity` slots, preserving existing links. `count`
    /// is the number of populated links; shrinking below `count + 1` is
    /// refused.
    pub fn resize(&mut self, new_capacity: usize, count: usize) -> Result<(), MetapopError> {
        if new_capacity < count + 1 {
            return Err(MetapopError::InvalidResize {
                requested: new_capacity,
                minimum: count + 1,
            });
        }

        self.ifrom.resize(new_capacity, 0);
        self.ito.resize(new_capacity, 0);
        self.weight.resize(new_capacity, 0.0);
        self.suscept.resize(new_capacity, 0.0);
        self.distance.resize(new_capacity, 0.0);
        Ok(())
    }
}

/// Struct-of-arrays table of play links. Play links never carry a distance.
#[derive(Debug)]
pub struct PlayLinkTable {
    pub ifrom: Vec<usize>,
    pub ito: Vec<usize>,
    pub weight: Vec<f64>,
    pub suscept: Vec<f64>,
}

impl PlayLinkTable {
    pub fn with_capacity(capacity: usize) -> Self {
        PlayLinkTable {
            ifrom: vec![0; capacity],
            ito: vec![0; capacity],
            weight: vec![0.0; capacity],
            suscept: vec![0.0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.ifrom.len()
    }

    pub fn endpoints(&self, link: LinkId) -> (WardId, WardId) {
        (WardId(self.ifrom[link.0]), WardId(self.ito[link.0]))
    }

    pub fn resize(&mut self, new_capacity: usize, count: usize) -> Result<(), MetapopError> {
        if new_capacity < count + 1 {
            return Err(MetapopError::InvalidResize {
                requested: new_capacity,
                minimum: count + 1,
            });
        }

        self.ifrom.resize(new_capacity, 0);
        self.ito.resize(new_capacity, 0);
        self.weight.resize(new_capacity, 0.0);
        self.suscept.resize(new_capacity, 0.0);
        Ok(())
    }
}
