//! Organic blob growth from seed cells, with cellular smoothing

use super::GenerationContext;
use crate::grid::{BoardGrid, ORTHOGONAL_OFFSETS};
use crate::rules::TerrainRule;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

const SEED_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_blob_counts"))]
pub struct BlobParams {
    #[validate(range(min = 1, max = 1024))]
    pub min_blobs: u32,
    #[validate(range(min = 1, max = 1024))]
    pub max_blobs: u32,
    /// Mean blob size in cells
    #[validate(range(min = 1))]
    pub average_size: u32,
    /// Relative size spread per blob: size = average * (1 ± jitter)
    #[validate(range(min = 0.0, max = 1.0))]
    pub size_jitter: f32,
    /// Chance a frontier cell admits each candidate neighbor per visit
    #[validate(range(min = 0.0, max = 1.0))]
    pub grow_chance: f32,
    #[validate(range(max = 16))]
    pub smoothing_passes: u32,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            min_blobs: 2,
            max_blobs: 4,
            average_size: 24,
            size_jitter: 0.35,
            grow_chance: 0.6,
            smoothing_passes: 1,
        }
    }
}

fn validate_blob_counts(params: &BlobParams) -> Result<(), ValidationError> {
    if params.min_blobs > params.max_blobs {
        return Err(ValidationError::new("min_blobs_exceeds_max_blobs"));
    }
    Ok(())
}

pub(crate) fn grow<R: Rng + ?Sized>(
    grid: &BoardGrid,
    rule: &TerrainRule,
    params: &BlobParams,
    cap: usize,
    ctx: &mut GenerationContext,
    rng: &mut R,
) {
    ctx.begin_marking();
    let blob_count = rng.gen_range(params.min_blobs..=params.max_blobs.max(params.min_blobs));
    let grow_chance = f64::from(params.grow_chance.clamp(0.0, 1.0));
    let jitter = params.size_jitter.clamp(0.0, 1.0);

    for _ in 0..blob_count {
        if ctx.candidates.len() >= cap {
            break;
        }

        let mut seed = None;
        for _ in 0..SEED_ATTEMPTS {
            let cell = rule.focus.sample_cell(grid, rng);
            if rule.can_enter(grid, cell) && !ctx.is_marked(cell) {
                seed = Some(cell);
                break;
            }
        }
        let Some(seed) = seed else {
            continue;
        };

        let spread = rng.gen_range(-1.0f32..=1.0) * jitter;
        let target = (params.average_size as f32 * (1.0 + spread)).round().max(1.0) as usize;
        let blob_start = ctx.candidates.len();
        let max_steps = target.saturating_mul(16).saturating_add(64);

        ctx.claim(seed);
        ctx.frontier.clear();
        ctx.frontier.push(seed);

        let mut steps = 0;
        while !ctx.frontier.is_empty() && steps < max_steps {
            if ctx.candidates.len() - blob_start >= target || ctx.candidates.len() >= cap {
                break;
            }
            steps += 1;

            let slot = rng.gen_range(0..ctx.frontier.len());
            let (x, y) = grid.position_of(ctx.frontier[slot]);
            let mut pending = false;

            for (dx, dy) in ORTHOGONAL_OFFSETS {
                let Some(next) = grid.index_at(x + dx, y + dy) else {
                    continue;
                };
                if ctx.is_marked(next) || !rule.can_enter(grid, next) {
                    continue;
                }
                if ctx.candidates.len() - blob_start >= target || ctx.candidates.len() >= cap {
                    break;
                }
                if rng.gen_bool(grow_chance) {
                    ctx.claim(next);
                    ctx.frontier.push(next);
                } else {
                    pending = true;
                }
            }

            // Cells with nothing left to admit leave the frontier
            if !pending {
                ctx.frontier.swap_remove(slot);
            }
        }
    }

    smooth(grid, rule, params.smoothing_passes, cap, ctx);
}

/// Majority-style cleanup: drop members with at most one orthogonal member
/// neighbor, fill admissible gaps with three or more.
pub(crate) fn smooth(
    grid: &BoardGrid,
    rule: &TerrainRule,
    passes: u32,
    cap: usize,
    ctx: &mut GenerationContext,
) {
    if passes == 0 || ctx.candidates.is_empty() {
        return;
    }

    for &cell in &ctx.candidates {
        ctx.members[cell] = true;
    }

    for _ in 0..passes {
        ctx.members_next.copy_from_slice(&ctx.members);
        let mut changed = false;

        for index in 0..grid.cell_count() {
            let (x, y) = grid.position_of(index);
            let neighbors = ORTHOGONAL_OFFSETS
                .iter()
                .filter_map(|(dx, dy)| grid.index_at(x + dx, y + dy))
                .filter(|&n| ctx.members[n])
                .count();

            if ctx.members[index] {
                if neighbors <= 1 {
                    ctx.members_next[index] = false;
                    changed = true;
                }
            } else if neighbors >= 3 && rule.can_enter(grid, index) {
                ctx.members_next[index] = true;
                changed = true;
            }
        }

        std::mem::swap(&mut ctx.members, &mut ctx.members_next);
        if !changed {
            break;
        }
    }

    ctx.candidates.clear();
    for index in 0..grid.cell_count() {
        if ctx.members[index] {
            ctx.members[index] = false;
            if ctx.candidates.len() < cap {
                ctx.candidates.push(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellPaint, Rgba8, TerrainCategory};
    use crate::placement::{FocusSettings, propose_candidates};
    use crate::rules::{OverwritePolicy, Placement};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use std::collections::{HashSet, VecDeque};

    fn blob_rule(coverage: f32, params: BlobParams) -> TerrainRule {
        TerrainRule {
            name: "Lake".to_string(),
            category: TerrainCategory::WATER,
            obstacle: true,
            cost: 0,
            color: Rgba8::opaque(40, 80, 200),
            order: 0,
            rarity: 0.0,
            coverage,
            overwrite: OverwritePolicy::default(),
            focus: FocusSettings::default(),
            placement: Placement::Blob(params),
        }
    }

    fn is_connected(grid: &BoardGrid, cells: &[usize]) -> bool {
        let set: HashSet<usize> = cells.iter().copied().collect();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([cells[0]]);
        seen.insert(cells[0]);
        while let Some(cell) = queue.pop_front() {
            let (x, y) = grid.position_of(cell);
            for (dx, dy) in ORTHOGONAL_OFFSETS {
                if let Some(n) = grid.index_at(x + dx, y + dy) {
                    if set.contains(&n) && seen.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
        }
        seen.len() == set.len()
    }

    #[test]
    fn test_single_blob_is_connected_and_sized() {
        let grid = BoardGrid::new(32, 32).unwrap();
        let params = BlobParams {
            min_blobs: 1,
            max_blobs: 1,
            average_size: 30,
            size_jitter: 0.0,
            grow_chance: 1.0,
            smoothing_passes: 0,
        };
        let rule = blob_rule(1.0, params);
        let mut ctx = GenerationContext::new();
        let mut rng = Pcg64::seed_from_u64(8);

        let cells = propose_candidates(&grid, &rule, 1, &mut ctx, &mut rng).to_vec();
        assert_eq!(cells.len(), 30);
        assert!(is_connected(&grid, &cells));
    }

    #[test]
    fn test_low_grow_chance_still_terminates() {
        let grid = BoardGrid::new(16, 16).unwrap();
        let params = BlobParams {
            grow_chance: 0.0,
            smoothing_passes: 0,
            ..BlobParams::default()
        };
        let rule = blob_rule(0.5, params);
        let mut ctx = GenerationContext::new();
        let mut rng = Pcg64::seed_from_u64(8);

        let cells = propose_candidates(&grid, &rule, 1, &mut ctx, &mut rng).to_vec();
        assert!(!cells.is_empty());
        assert!(cells.len() <= 4);
    }

    #[test]
    fn test_coverage_cap_respected() {
        let grid = BoardGrid::new(20, 20).unwrap();
        let params = BlobParams {
            min_blobs: 6,
            max_blobs: 6,
            average_size: 80,
            grow_chance: 0.9,
            ..BlobParams::default()
        };
        let rule = blob_rule(0.1, params);
        let mut ctx = GenerationContext::new();
        let mut rng = Pcg64::seed_from_u64(21);

        let cells = propose_candidates(&grid, &rule, 1, &mut ctx, &mut rng).to_vec();
        assert!(cells.len() <= 40);
        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn test_smoothing_removes_spur_and_fills_hole() {
        let grid = BoardGrid::new(7, 7).unwrap();
        let rule = blob_rule(1.0, BlobParams::default());
        let mut ctx = GenerationContext::new();
        ctx.prepare(grid.cell_count());

        // 3x3 ring around (2,2) with its center missing, plus a spur at (5,2)
        for y in 1..=3 {
            for x in 1..=3 {
                if (x, y) != (2, 2) {
                    ctx.candidates.push(grid.coord_to_index(x, y).unwrap());
                }
            }
        }
        let spur = grid.coord_to_index(5, 2).unwrap();
        let bridge = grid.coord_to_index(4, 2).unwrap();
        ctx.candidates.push(bridge);
        ctx.candidates.push(spur);

        smooth(&grid, &rule, 1, usize::MAX, &mut ctx);

        let center = grid.coord_to_index(2, 2).unwrap();
        assert!(ctx.candidates.contains(&center));
        assert!(!ctx.candidates.contains(&spur));
        assert!(ctx.members.iter().all(|&m| !m));
    }

    #[test]
    fn test_obstacle_blobs_grow_around_existing_walls() {
        let mut grid = BoardGrid::new(20, 20).unwrap();
        let wall = CellPaint {
            blocked: true,
            category: TerrainCategory::WALL,
            cost: 0,
            color: Rgba8::opaque(0, 0, 0),
            layer: 1,
        };
        for index in (0..grid.cell_count()).step_by(3) {
            grid.set_cell(index, wall).unwrap();
        }
        let rule = blob_rule(
            0.5,
            BlobParams {
                min_blobs: 3,
                max_blobs: 5,
                average_size: 20,
                smoothing_passes: 2,
                ..BlobParams::default()
            },
        );
        let mut ctx = GenerationContext::new();

        for seed in 0..20 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let cells = propose_candidates(&grid, &rule, 2, &mut ctx, &mut rng).to_vec();
            assert!(!cells.is_empty(), "seed {seed}");
            assert!(
                cells.iter().all(|&cell| !grid.blocked()[cell]),
                "seed {seed}: proposed an existing wall"
            );
        }
    }

    #[test]
    fn test_min_greater_than_max_is_invalid() {
        let params = BlobParams {
            min_blobs: 3,
            max_blobs: 1,
            ..BlobParams::default()
        };
        assert!(params.validate().is_err());
        assert!(BlobParams::default().validate().is_ok());
    }
}
