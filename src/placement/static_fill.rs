//! Direct placement: draw cells from the focus area, optionally clustered

use super::GenerationContext;
use crate::grid::BoardGrid;
use crate::rules::TerrainRule;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Scatter vs. cluster knob for static placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StaticParams {
    /// Probability that the next cell is drawn next to an already chosen one
    #[validate(range(min = 0.0, max = 1.0))]
    pub cluster_bias: f32,
    /// Chebyshev radius around the anchor cell for clustered draws
    #[validate(range(min = 1, max = 64))]
    pub cluster_radius: u32,
}

impl Default for StaticParams {
    fn default() -> Self {
        Self {
            cluster_bias: 0.0,
            cluster_radius: 2,
        }
    }
}

pub(crate) fn place<R: Rng + ?Sized>(
    grid: &BoardGrid,
    rule: &TerrainRule,
    params: &StaticParams,
    cap: usize,
    ctx: &mut GenerationContext,
    rng: &mut R,
) {
    ctx.begin_marking();
    let max_draws = cap.saturating_mul(8).saturating_add(64);
    let radius = params.cluster_radius as i32;
    let bias = f64::from(params.cluster_bias.clamp(0.0, 1.0));

    for _ in 0..max_draws {
        if ctx.candidates.len() >= cap {
            break;
        }

        let focus = rule.focus.resolve(rng);
        let cell = if !ctx.candidates.is_empty() && rng.gen_bool(bias) {
            let anchor = ctx.candidates[rng.gen_range(0..ctx.candidates.len())];
            let (x, y) = grid.position_of(anchor);
            let dx = rng.gen_range(-radius..=radius);
            let dy = rng.gen_range(-radius..=radius);
            match grid.index_at(x + dx, y + dy) {
                Some(index) if rule.focus.contains(focus, grid, index) => index,
                _ => continue,
            }
        } else {
            rule.focus.sample_cell_in(focus, grid, rng)
        };

        if rule.can_enter(grid, cell) {
            ctx.claim(cell);
        }
    }
}
