//! Per-ward aggregate storage. One `NodeTable` holds every per-ward array of
//! the movement network in struct-of-arrays form, 1-indexed with slot 0
//! reserved so that "index 0" can stand for "no entry" everywhere.

use crate::WardId;
use crate::error::MetapopError;

/// Sentinel for an unoccupied slot in `label`.
pub const EMPTY_LABEL: i64 = -1;

/// Struct-of-arrays table of per-ward state.
///
/// A slot `i` is occupied when `label[i] == i`; `EMPTY_LABEL` marks a gap in
/// the (possibly non-contiguous) ward id space. All other arrays are only
/// meaningful for occupied slots.
#[derive(Debug)]
pub struct NodeTable {
    /// Self-identifying label, doubling as the occupancy flag.
    pub label: Vec<i64>,
    /// Half-open range `[begin_to, end_to)` of this ward's outgoing work
    /// links in the work `LinkTable`, in file order.
    pub begin_to: Vec<usize>,
    pub end_to: Vec<usize>,
    /// Index of the ward's work self-loop, 0 if it has none.
    pub self_w: Vec<usize>,
    /// Same as `begin_to`/`end_to`/`self_w`, for the play table.
    pub begin_p: Vec<usize>,
    pub end_p: Vec<usize>,
    pub self_p: Vec<usize>,
    /// Outgoing / incoming work-weight sums.
    pub denominator_n: Vec<f64>,
    pub denominator_d: Vec<f64>,
    /// Play pool size / incoming play-weight sum.
    pub denominator_p: Vec<f64>,
    pub denominator_pd: Vec<f64>,
    pub suscept: Vec<f64>,
    pub play_suscept: Vec<f64>,
    /// Baseline play pool, restored by the daily reset.
    pub save_play_suscept: Vec<f64>,
    /// Planar position, used only for link distances.
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl NodeTable {
    /// Allocates `capacity` slots (so wards `1..capacity`), all unoccupied.
    pub fn with_capacity(capacity: usize) -> Self {
        NodeTable {
            label: vec![EMPTY_LABEL; capacity],
            begin_to: vec![0; capacity],
            end_to: vec![0; capacity],
            self_w: vec![0; capacity],
            begin_p: vec![0; capacity],
            end_p: vec![0; capacity],
            self_p: vec![0; capacity],
            denominator_n: vec![0.0; capacity],
            denominator_d: vec![0.0; capacity],
            denominator_p: vec![0.0; capacity],
            denominator_pd: vec![0.0; capacity],
            suscept: vec![0.0; capacity],
            play_suscept: vec![0.0; capacity],
            save_play_suscept: vec![0.0; capacity],
            x: vec![0.0; capacity],
            y: vec![0.0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.label.len()
    }

    pub fn is_occupied(&self, ward: WardId) -> bool {
        self.label[ward.0] == ward.0 as i64
    }

    pub fn occupy(&mut self, ward: WardId) {
        self.label[ward.0] = ward.0 as i64;
    }

    /// Resets every label to the empty sentinel. The play-matrix load reuses
    /// the label array as a progress flag, so this runs between the work and
    /// play passes.
    pub fn clear_labels(&mut self) {
        self.label.fill(EMPTY_LABEL);
    }

    /// This ward's outgoing work links, as a half-open index range.
    pub fn work_range(&self, ward: WardId) -> std::ops::Range<usize> {
        self.begin_to[ward.0]..self.end_to[ward.0]
    }

    /// This ward's outgoing play links, as a half-open index range.
    pub fn play_range(&self, ward: WardId) -> std::ops::Range<usize> {
        self.begin_p[ward.0]..self.end_p[ward.0]
    }

    /// Resizes the table to `new_capacity` slots, preserving existing
    /// entries. `count` is the number of occupied wards; shrinking below
    /// `count + 1` would drop them and is refused.
    pub fn resize(&mut self, new_capacity: usize, count: usize) -> Result<(), MetapopError> {
        if new_capacity < count + 1 {
            return Err(MetapopError::InvalidResize {
                requested: new_capacity,
                minimum: count + 1,
            });
        }

        self.label.resize(new_capacity, EMPTY_LABEL);
        self.begin_to.resize(new_capacity, 0);
        self.end_to.resize(new_capacity, 0);
        self.self_w.resize(new_capacity, 0);
        self.begin_p.resize(new_capacity, 0);
        self.end_p.resize(new_capacity, 0);
        self.self_p.resize(new_capacity, 0);
        self.denominator_n.resize(new_capacity, 0.0);
        self.denominator_d.resize(new_capacity, 0.0);
        self.denominator_p.resize(new_capacity, 0.0);
        self.denominator_pd.resize(new_capacity, 0.0);
        self.suscept.resize(new_capacity, 0.0);
        self.play_suscept.resize(new_capacity, 0.0);
        self.save_play_suscept.resize(new_capacity, 0.0);
        self.x.resize(new_capacity, 0.0);
        self.y.resize(new_capacity, 0.0);
        Ok(())
    }
}
