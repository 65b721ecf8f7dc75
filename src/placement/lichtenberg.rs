//! Dendritic growth: heat-repelled walkers tracing branching paths from an
//! origin area toward an aim area or a board edge.

use super::GenerationContext;
use super::focus::{AreaFocus, FocusSettings};
use crate::grid::{BoardGrid, ORTHOGONAL_OFFSETS, manhattan};
use crate::rules::TerrainRule;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

const ORIGIN_ATTEMPTS: usize = 24;

/// Fixed origin/aim edge cycles used instead of sampled areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePairMode {
    /// Left→Right, Top→Bottom, Right→Left, Bottom→Top
    Opposite,
    /// Left→Top, Top→Right, Right→Bottom, Bottom→Left
    Adjacent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl EdgePairMode {
    fn pair(self, path: u32) -> (Side, Side) {
        use Side::*;
        let cycle = match self {
            EdgePairMode::Opposite => [(Left, Right), (Top, Bottom), (Right, Left), (Bottom, Top)],
            EdgePairMode::Adjacent => [(Left, Top), (Top, Right), (Right, Bottom), (Bottom, Left)],
        };
        cycle[path as usize % cycle.len()]
    }
}

impl Side {
    fn random_point<R: Rng + ?Sized>(self, grid: &BoardGrid, rng: &mut R) -> (i32, i32) {
        let (w, h) = (grid.width() as i32, grid.height() as i32);
        match self {
            Side::Left => (0, rng.gen_range(0..h)),
            Side::Right => (w - 1, rng.gen_range(0..h)),
            Side::Top => (rng.gen_range(0..w), 0),
            Side::Bottom => (rng.gen_range(0..w), h - 1),
        }
    }

    fn contains(self, grid: &BoardGrid, (x, y): (i32, i32)) -> bool {
        match self {
            Side::Left => x == 0,
            Side::Right => x == grid.width() as i32 - 1,
            Side::Top => y == 0,
            Side::Bottom => y == grid.height() as i32 - 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_path_counts"))]
pub struct LichtenbergParams {
    #[validate(range(min = 1, max = 256))]
    pub min_path_count: u32,
    #[validate(range(min = 1, max = 256))]
    pub max_path_count: u32,
    #[validate(range(min = 1))]
    pub cells_per_path: u32,
    #[validate(range(min = 0.1, max = 16.0))]
    pub step_budget_scale: f32,
    #[validate(range(min = 1, max = 64))]
    pub max_active_walkers: u32,
    /// 1 = always step toward the aim, 0 = pure exploration
    #[validate(range(min = 0.0, max = 1.0))]
    pub goal_growth_bias: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub branch_spawn_chance: f32,
    /// Heat deposited on the claimed cell itself
    #[validate(range(min = 1))]
    pub heat_add: u32,
    #[validate(range(max = 16))]
    pub heat_repel_radius: u32,
    #[validate(range(min = 0.0))]
    pub heat_repel_strength: f32,
    /// Exponent of the distance falloff; 0 spreads heat evenly over the radius
    #[validate(range(min = 0.0))]
    pub heat_falloff: f32,
    pub repel_penalty_from_existing: bool,
    #[validate(range(min = 0.0))]
    pub existing_cell_penalty: f32,
    pub prefer_unused_cells: bool,
    pub allow_reuse_if_stuck: bool,
    #[validate(range(max = 8))]
    pub widen_passes: u32,
    /// Manhattan distance to the aim cell that counts as arrived
    pub aim_radius: u32,
    /// Cells whose heat penalty exceeds this are not legal steps
    #[validate(range(min = 0.0))]
    pub max_heat_penalty: f32,
    #[validate(nested)]
    pub origin: FocusSettings,
    #[validate(nested)]
    pub aim: FocusSettings,
    pub edge_pairs: Option<EdgePairMode>,
}

impl Default for LichtenbergParams {
    fn default() -> Self {
        Self {
            min_path_count: 1,
            max_path_count: 3,
            cells_per_path: 40,
            step_budget_scale: 1.0,
            max_active_walkers: 4,
            goal_growth_bias: 0.6,
            branch_spawn_chance: 0.08,
            heat_add: 16,
            heat_repel_radius: 2,
            heat_repel_strength: 0.5,
            heat_falloff: 1.0,
            repel_penalty_from_existing: true,
            existing_cell_penalty: 0.75,
            prefer_unused_cells: true,
            allow_reuse_if_stuck: true,
            widen_passes: 0,
            aim_radius: 1,
            max_heat_penalty: 2.0,
            origin: FocusSettings::with_focus(AreaFocus::Edge),
            aim: FocusSettings::with_focus(AreaFocus::Anywhere),
            edge_pairs: None,
        }
    }
}

fn validate_path_counts(params: &LichtenbergParams) -> Result<(), ValidationError> {
    if params.min_path_count > params.max_path_count {
        return Err(ValidationError::new("min_path_count_exceeds_max_path_count"));
    }
    Ok(())
}

impl LichtenbergParams {
    /// Steps shared by every walker of one path, origin included
    pub fn step_budget(&self) -> u32 {
        let scaled = (self.cells_per_path as f32 * self.step_budget_scale).round();
        (scaled.max(1.0).min(u32::MAX as f32)) as u32
    }
}

/// One active growth tip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Walker {
    pub cell: usize,
}

/// Where a path is heading
#[derive(Debug, Clone, Copy)]
struct AimTarget {
    point: (i32, i32),
    edge: Option<Side>,
}

impl AimTarget {
    fn reached(&self, grid: &BoardGrid, position: (i32, i32), radius: u32) -> bool {
        if manhattan(position, self.point) <= radius {
            return true;
        }
        self.edge.is_some_and(|side| side.contains(grid, position))
    }
}

pub(crate) fn grow<R: Rng + ?Sized>(
    grid: &BoardGrid,
    rule: &TerrainRule,
    layer: u8,
    params: &LichtenbergParams,
    cap: usize,
    ctx: &mut GenerationContext,
    rng: &mut R,
) {
    ctx.begin_marking();
    ctx.heat.fill(0);
    ctx.walkers.clear();

    let path_count =
        rng.gen_range(params.min_path_count..=params.max_path_count.max(params.min_path_count));
    let max_walkers = params.max_active_walkers.max(1) as usize;
    let branch_chance = f64::from(params.branch_spawn_chance.clamp(0.0, 1.0));

    for path in 0..path_count {
        if ctx.candidates.len() >= cap {
            break;
        }

        let Some((origin, aim)) = pick_endpoints(grid, rule, params, path, rng) else {
            continue;
        };

        let mut budget = params.step_budget();
        ctx.begin_path();
        ctx.claim(origin);
        ctx.mark_path(origin);
        deposit_heat(grid, params, ctx, origin);
        budget -= 1;

        ctx.walkers.clear();
        ctx.walkers.push(Walker { cell: origin });
        if aim.reached(grid, grid.position_of(origin), params.aim_radius) {
            ctx.walkers.clear();
        }

        while budget > 0 && !ctx.walkers.is_empty() && ctx.candidates.len() < cap {
            let mut slot = 0;
            while slot < ctx.walkers.len() {
                if budget == 0 || ctx.candidates.len() >= cap {
                    break;
                }

                let from = ctx.walkers[slot].cell;
                let Some(next) = choose_step(grid, rule, layer, params, ctx, from, aim.point, rng)
                else {
                    ctx.walkers.swap_remove(slot);
                    continue;
                };

                budget -= 1;
                ctx.claim(next);
                ctx.mark_path(next);
                deposit_heat(grid, params, ctx, next);

                if aim.reached(grid, grid.position_of(next), params.aim_radius) {
                    ctx.walkers.swap_remove(slot);
                    continue;
                }

                ctx.walkers[slot].cell = next;
                if ctx.walkers.len() < max_walkers && rng.gen_bool(branch_chance) {
                    ctx.walkers.push(Walker { cell: next });
                }
                slot += 1;
            }
        }
    }

    ctx.walkers.clear();
    widen(grid, rule, params.widen_passes, cap, ctx);
}

fn pick_endpoints<R: Rng + ?Sized>(
    grid: &BoardGrid,
    rule: &TerrainRule,
    params: &LichtenbergParams,
    path: u32,
    rng: &mut R,
) -> Option<(usize, AimTarget)> {
    match params.edge_pairs {
        Some(mode) => {
            let (from, to) = mode.pair(path);
            let origin = (0..ORIGIN_ATTEMPTS)
                .filter_map(|_| {
                    let (x, y) = from.random_point(grid, rng);
                    grid.index_at(x, y)
                })
                .find(|&cell| rule.can_enter(grid, cell))?;
            let aim = AimTarget {
                point: to.random_point(grid, rng),
                edge: Some(to),
            };
            Some((origin, aim))
        }
        None => {
            let origin = (0..ORIGIN_ATTEMPTS)
                .map(|_| params.origin.sample_cell(grid, rng))
                .find(|&cell| rule.can_enter(grid, cell))?;
            let aim = AimTarget {
                point: grid.position_of(params.aim.sample_cell(grid, rng)),
                edge: None,
            };
            Some((origin, aim))
        }
    }
}

/// Best-scoring legal orthogonal step from `from`, or None when stuck
#[allow(clippy::too_many_arguments)]
fn choose_step<R: Rng + ?Sized>(
    grid: &BoardGrid,
    rule: &TerrainRule,
    layer: u8,
    params: &LichtenbergParams,
    ctx: &GenerationContext,
    from: usize,
    aim: (i32, i32),
    rng: &mut R,
) -> Option<usize> {
    let (x, y) = grid.position_of(from);
    let here = manhattan((x, y), aim) as f32;
    let bias = params.goal_growth_bias.clamp(0.0, 1.0);
    let heat_scale = params.heat_repel_strength / params.heat_add.max(1) as f32;

    let mut best_fresh: Option<(f32, usize)> = None;
    let mut best_reused: Option<(f32, usize)> = None;

    for (dx, dy) in ORTHOGONAL_OFFSETS {
        let Some(next) = grid.index_at(x + dx, y + dy) else {
            continue;
        };
        // A path never folds back onto itself; only earlier paths can be reused
        if ctx.on_path(next) || !rule.can_enter(grid, next) {
            continue;
        }
        let heat_penalty = heat_scale * ctx.heat[next] as f32;
        if heat_penalty > params.max_heat_penalty {
            continue;
        }

        let toward = here - manhattan((x + dx, y + dy), aim) as f32;
        let noise = rng.gen_range(-1.0f32..=1.0);
        let mut score = bias * toward + (1.0 - bias) * noise - heat_penalty;
        if params.repel_penalty_from_existing && touches_foreign_paint(grid, next, layer) {
            score -= params.existing_cell_penalty;
        }

        let best = if ctx.is_marked(next) {
            &mut best_reused
        } else {
            &mut best_fresh
        };
        if best.is_none_or(|(top, _)| score > top) {
            *best = Some((score, next));
        }
    }

    if !params.prefer_unused_cells {
        return match (best_fresh, best_reused) {
            (Some(fresh), Some(reused)) => Some(if reused.0 > fresh.0 { reused.1 } else { fresh.1 }),
            (fresh, reused) => fresh.or(reused).map(|(_, cell)| cell),
        };
    }
    match best_fresh {
        Some((_, cell)) => Some(cell),
        None if params.allow_reuse_if_stuck => best_reused.map(|(_, cell)| cell),
        None => None,
    }
}

/// Whether the cell or an orthogonal neighbor carries another rule's paint
pub(crate) fn touches_foreign_paint(grid: &BoardGrid, index: usize, layer: u8) -> bool {
    let layers = grid.paint_layers();
    let foreign = |cell: usize| layers[cell] != 0 && layers[cell] != layer;
    if foreign(index) {
        return true;
    }
    let (x, y) = grid.position_of(index);
    ORTHOGONAL_OFFSETS
        .iter()
        .filter_map(|(dx, dy)| grid.index_at(x + dx, y + dy))
        .any(foreign)
}

pub(crate) fn deposit_heat(
    grid: &BoardGrid,
    params: &LichtenbergParams,
    ctx: &mut GenerationContext,
    index: usize,
) {
    let radius = params.heat_repel_radius as i32;
    let (x, y) = grid.position_of(index);
    let heat_add = params.heat_add as f32;

    for dy in -radius..=radius {
        let span = radius - dy.abs();
        for dx in -span..=span {
            let Some(cell) = grid.index_at(x + dx, y + dy) else {
                continue;
            };
            let distance = (dx.abs() + dy.abs()) as f32;
            let weight = (1.0 - distance / (radius as f32 + 1.0)).powf(params.heat_falloff);
            let amount = (heat_add * weight).round() as u32;
            ctx.heat[cell] = ctx.heat[cell].saturating_add(amount);
        }
    }
}

/// Dilate the traced cells into admissible orthogonal neighbors
fn widen(grid: &BoardGrid, rule: &TerrainRule, passes: u32, cap: usize, ctx: &mut GenerationContext) {
    for _ in 0..passes {
        let traced = ctx.candidates.len();
        for i in 0..traced {
            if ctx.candidates.len() >= cap {
                break;
            }
            let (x, y) = grid.position_of(ctx.candidates[i]);
            for (dx, dy) in ORTHOGONAL_OFFSETS {
                if let Some(next) = grid.index_at(x + dx, y + dy) {
                    if rule.can_enter(grid, next) {
                        ctx.claim(next);
                    }
                }
            }
        }
    }
    ctx.candidates.truncate(cap);
}
