//! Commits a rule's candidate cells into the grid under its overwrite policy

use crate::grid::BoardGrid;
use crate::rules::TerrainRule;
use derive_more::{Add, AddAssign};
use serde::Serialize;

/// Running cap on cells obstacle rules may block during one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleBudget {
    cap: usize,
    used: usize,
}

impl ObstacleBudget {
    pub fn new(cap: usize) -> Self {
        Self { cap, used: 0 }
    }

    /// `floor((1 - min_unblocked) * cell_count)`
    pub fn from_min_unblocked(cell_count: usize, min_unblocked: f32) -> Self {
        // Round the fraction first so 1 - 0.6f32 counts as 0.4, not 0.39999998
        let free = (1.0 - f64::from(min_unblocked.clamp(0.0, 1.0))) * 1e6;
        let blockable = free.round() / 1e6 * cell_count as f64;
        Self::new((blockable.floor() as usize).min(cell_count))
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.cap
    }
}

/// Per-cell outcomes of paint commits, for tuning rule sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Add, AddAssign, Serialize)]
pub struct PaintStats {
    pub painted: usize,
    pub out_of_bounds: usize,
    pub obstacle_protected: usize,
    pub base_only_rejected: usize,
    pub terrain_protected: usize,
    pub already_blocked: usize,
    pub budget_exhausted: usize,
}

impl PaintStats {
    pub fn skipped(&self) -> usize {
        self.out_of_bounds
            + self.obstacle_protected
            + self.base_only_rejected
            + self.terrain_protected
            + self.already_blocked
            + self.budget_exhausted
    }
}

/// Paint `candidates` with `rule` under paint layer `layer`.
///
/// Skipped cells are counted in `stats`, never reported as errors.
/// Obstacle rules draw from `budget` and stop once it runs out.
pub fn paint_candidates(
    grid: &mut BoardGrid,
    rule: &TerrainRule,
    layer: u8,
    candidates: &[usize],
    budget: &mut ObstacleBudget,
    stats: &mut PaintStats,
) {
    let paint = rule.cell_paint(layer);
    let cell_count = grid.cell_count();

    if rule.obstacle {
        for (position, &index) in candidates.iter().enumerate() {
            if budget.is_exhausted() {
                stats.budget_exhausted += candidates.len() - position;
                break;
            }
            if index >= cell_count {
                stats.out_of_bounds += 1;
                continue;
            }
            if grid.blocked()[index] {
                stats.already_blocked += 1;
                continue;
            }
            if grid.set_cell(index, paint).is_ok() {
                budget.used += 1;
                stats.painted += 1;
            }
        }
        return;
    }

    let policy = rule.overwrite;
    for &index in candidates {
        if index >= cell_count {
            stats.out_of_bounds += 1;
            continue;
        }
        if grid.blocked()[index] && !policy.allow_overwrite_obstacle {
            stats.obstacle_protected += 1;
            continue;
        }
        let current = grid.paint_layers()[index];
        if policy.only_affect_base && current != 0 {
            stats.base_only_rejected += 1;
            continue;
        }
        if current != 0 && current != layer && !policy.allow_overwrite_terrain {
            stats.terrain_protected += 1;
            continue;
        }
        if grid.set_cell(index, paint).is_ok() {
            stats.painted += 1;
        }
    }
}
