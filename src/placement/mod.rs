//! Terrain placement algorithms.
//!
//! Each algorithm proposes candidate cell indices into
//! [`GenerationContext::candidates`]; none of them writes to the grid.
//! Committing candidates is the paint arbiter's job.

use crate::grid::BoardGrid;
use crate::rules::{Placement, TerrainRule};
use rand::Rng;
use tracing::debug;

pub mod blob;
pub mod focus;
pub mod lichtenberg;
pub mod static_fill;

pub use focus::{AreaFocus, FocusSettings};

/// Scratch buffers shared by all placement algorithms.
///
/// Sized to the board once and reused across rules, attempts and
/// generation calls; only a change of board size reallocates them.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    cell_count: usize,
    stamps: Vec<u32>,
    stamp: u32,
    path_stamps: Vec<u32>,
    path_stamp: u32,
    pub(crate) heat: Vec<u32>,
    pub(crate) members: Vec<bool>,
    pub(crate) members_next: Vec<bool>,
    pub(crate) frontier: Vec<usize>,
    pub(crate) walkers: Vec<lichtenberg::Walker>,
    pub candidates: Vec<usize>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure every buffer matches the board size
    pub fn prepare(&mut self, cell_count: usize) {
        if self.cell_count == cell_count && self.stamps.len() == cell_count {
            return;
        }
        self.cell_count = cell_count;
        self.stamps = vec![0; cell_count];
        self.stamp = 0;
        self.path_stamps = vec![0; cell_count];
        self.path_stamp = 0;
        self.heat = vec![0; cell_count];
        self.members = vec![false; cell_count];
        self.members_next = vec![false; cell_count];
        self.frontier = Vec::with_capacity(cell_count);
        self.candidates = Vec::with_capacity(cell_count);
    }

    /// Start a fresh "marked" set without clearing the stamp buffer
    pub(crate) fn begin_marking(&mut self) {
        if self.stamp == u32::MAX {
            self.stamps.fill(0);
            self.stamp = 1;
        } else {
            self.stamp += 1;
        }
    }

    /// Mark a cell; returns false if it was already marked in this set
    pub(crate) fn mark(&mut self, index: usize) -> bool {
        if self.stamps[index] == self.stamp {
            return false;
        }
        self.stamps[index] = self.stamp;
        true
    }

    pub(crate) fn is_marked(&self, index: usize) -> bool {
        self.stamp != 0 && self.stamps[index] == self.stamp
    }

    /// Start a fresh per-path set, nested inside the current marked set
    pub(crate) fn begin_path(&mut self) {
        if self.path_stamp == u32::MAX {
            self.path_stamps.fill(0);
            self.path_stamp = 1;
        } else {
            self.path_stamp += 1;
        }
    }

    pub(crate) fn mark_path(&mut self, index: usize) {
        self.path_stamps[index] = self.path_stamp;
    }

    /// Whether the cell belongs to the path being traced
    pub(crate) fn on_path(&self, index: usize) -> bool {
        self.path_stamp != 0 && self.path_stamps[index] == self.path_stamp
    }

    /// Mark a cell and record it as a candidate if it was new
    pub(crate) fn claim(&mut self, index: usize) -> bool {
        if self.mark(index) {
            self.candidates.push(index);
            true
        } else {
            false
        }
    }
}

/// Run the rule's placement algorithm and return the proposed cells
pub fn propose_candidates<'a, R: Rng + ?Sized>(
    grid: &BoardGrid,
    rule: &TerrainRule,
    layer: u8,
    ctx: &'a mut GenerationContext,
    rng: &mut R,
) -> &'a [usize] {
    ctx.prepare(grid.cell_count());
    ctx.candidates.clear();

    let cap = rule.coverage_cap(grid.cell_count());
    if cap == 0 {
        return &ctx.candidates;
    }

    match &rule.placement {
        Placement::Static(params) => static_fill::place(grid, rule, params, cap, ctx, rng),
        Placement::Blob(params) => blob::grow(grid, rule, params, cap, ctx, rng),
        Placement::Lichtenberg(params) => {
            lichtenberg::grow(grid, rule, layer, params, cap, ctx, rng)
        }
    }

    debug!(
        "Rule '{}' ({}) proposed {} cells (cap {})",
        rule.name,
        rule.placement.mode_name(),
        ctx.candidates.len(),
        cap
    );
    &ctx.candidates
}
