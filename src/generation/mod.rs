//! Generation orchestrator: reset, order rules, place, paint, validate, retry.

use crate::config::range_types::{AttemptBudget, UnitFraction};
use crate::connectivity::{Reachability, Topology};
use crate::errors::{BoardError, BoardResult};
use crate::grid::{BaseTerrain, BoardGrid, manhattan};
use crate::paint::{ObstacleBudget, PaintStats, paint_candidates};
use crate::placement::{GenerationContext, propose_candidates};
use crate::rules::{TerrainRule, check_rules};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub mod host;
pub mod seeds;

pub use host::BoardHost;
pub use seeds::SeedStreams;

/// Cell that reachability is measured from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartCell {
    /// Middle of the board
    #[default]
    Center,
    At {
        x: u32,
        y: u32,
    },
    /// Uniformly drawn open cell, from the incidental stream
    RandomOpen,
}

/// Board size, seed and acceptance thresholds for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub width: u32,
    pub height: u32,
    /// 0 picks a fresh clock-derived seed
    pub seed: u64,
    pub min_unblocked: UnitFraction,
    pub min_reachable: UnitFraction,
    pub max_attempts: AttemptBudget,
    pub topology: Topology,
    pub start: StartCell,
    pub base: BaseTerrain,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            seed: 0,
            min_unblocked: UnitFraction::new(0.6),
            min_reachable: UnitFraction::new(0.9),
            max_attempts: AttemptBudget::default(),
            topology: Topology::Four,
            start: StartCell::Center,
            base: BaseTerrain::default(),
        }
    }
}

/// Summary of a finished generation call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    /// Base seed after zero remapping; replaying it reproduces the board
    pub seed: u64,
    /// Seed of the attempt whose board was kept
    pub attempt_seed: u64,
    /// Attempts run
    pub attempts: u32,
    /// Both thresholds met; false means the best attempt was kept
    pub accepted: bool,
    pub open_fraction: f32,
    pub reachable_fraction: f32,
    pub start: Option<usize>,
    pub min_terrain_cost: u32,
    pub stats: PaintStats,
}

#[derive(Debug, Clone, Copy)]
struct AttemptReport {
    seed: u64,
    open_fraction: f32,
    reachable_fraction: f32,
    start: Option<usize>,
    stats: PaintStats,
}

impl AttemptReport {
    fn score(&self) -> f32 {
        self.open_fraction * self.reachable_fraction
    }
}

/// Owns the board and every scratch buffer generation needs.
///
/// Buffers survive between calls and are only reallocated when the board
/// size changes. The grid is only observable between calls, so a rebuild
/// is never seen half done.
#[derive(Debug, Clone, Default)]
pub struct BoardGenerator {
    grid: BoardGrid,
    best: BoardGrid,
    context: GenerationContext,
    reachability: Reachability,
    order: Vec<usize>,
}

impl BoardGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self) -> &BoardGrid {
        &self.grid
    }

    /// Reachability state of the last fill (the accepted board's after `generate`)
    pub fn reachability(&self) -> &Reachability {
        &self.reachability
    }

    /// Build a board from `rules` under `settings`.
    ///
    /// Errors only on bad configuration. Unmet thresholds are not an error:
    /// the best attempt is kept and `accepted` is false.
    pub fn generate(
        &mut self,
        rules: &[TerrainRule],
        settings: &GenerationSettings,
    ) -> BoardResult<GenerationOutcome> {
        check_rules(rules)?;
        let cell_count = BoardGrid::checked_cell_count(settings.width, settings.height)?;
        if let StartCell::At { x, y } = settings.start {
            if x >= settings.width || y >= settings.height {
                return Err(BoardError::CoordOutOfRange {
                    x: i64::from(x),
                    y: i64::from(y),
                    width: settings.width,
                    height: settings.height,
                });
            }
        }
        if self.grid.width() != settings.width || self.grid.height() != settings.height {
            self.grid.resize(settings.width, settings.height)?;
        }
        self.context.prepare(cell_count);

        let base_seed = seeds::resolve_base_seed(settings.seed);
        let max_attempts = settings.max_attempts.get();
        let min_unblocked = settings.min_unblocked.get();
        let min_reachable = settings.min_reachable.get();
        info!(
            "Generating {}x{} board with {} rules (seed: {base_seed})",
            settings.width,
            settings.height,
            rules.len()
        );

        let mut best: Option<(u32, AttemptReport)> = None;
        for attempt in 0..max_attempts {
            let seed = seeds::attempt_seed(base_seed, attempt);
            let report = self.run_attempt(rules, settings, seed)?;

            if report.open_fraction >= min_unblocked && report.reachable_fraction >= min_reachable
            {
                info!(
                    "Accepted attempt {}/{max_attempts}: {:.1}% open, {:.1}% reachable",
                    attempt + 1,
                    report.open_fraction * 100.0,
                    report.reachable_fraction * 100.0
                );
                return Ok(self.finish(settings, base_seed, attempt + 1, true, report));
            }

            debug!(
                "Rejected attempt {}: {:.1}% open, {:.1}% reachable",
                attempt + 1,
                report.open_fraction * 100.0,
                report.reachable_fraction * 100.0
            );
            if best.is_none_or(|(_, kept)| report.score() > kept.score()) {
                self.best.clone_from(&self.grid);
                best = Some((attempt, report));
            }
        }

        // The loop ran at least once, so a best attempt exists
        let Some((best_attempt, report)) = best else {
            return Err(BoardError::InvalidArgument {
                reason: "attempt budget must be at least 1".to_string(),
            });
        };
        std::mem::swap(&mut self.grid, &mut self.best);
        if let Some(start) = report.start {
            self.reachability
                .flood_fill(&self.grid, start, settings.topology)?;
        }
        warn!(
            "No attempt met the thresholds after {max_attempts} attempts; keeping attempt {} ({:.1}% open, {:.1}% reachable)",
            best_attempt + 1,
            report.open_fraction * 100.0,
            report.reachable_fraction * 100.0
        );
        Ok(self.finish(settings, base_seed, max_attempts, false, report))
    }

    fn run_attempt(
        &mut self,
        rules: &[TerrainRule],
        settings: &GenerationSettings,
        seed: u64,
    ) -> BoardResult<AttemptReport> {
        let mut streams = SeedStreams::from_seed(seed);
        let cell_count = self.grid.cell_count();
        self.grid.reset_to_base(&settings.base);
        order_rules(rules, &mut streams.order, &mut self.order);

        let mut budget = ObstacleBudget::from_min_unblocked(cell_count, settings.min_unblocked.get());
        let mut stats = PaintStats::default();

        for &rule_index in &self.order {
            let rule = &rules[rule_index];
            // check_rules caps the list at 255, so the 1-based index fits a layer id
            let layer = (rule_index + 1) as u8;
            let candidates =
                propose_candidates(&self.grid, rule, layer, &mut self.context, &mut streams.generation);

            let mut rule_stats = PaintStats::default();
            paint_candidates(&mut self.grid, rule, layer, candidates, &mut budget, &mut rule_stats);
            debug!(
                "Rule '{}' painted {} cells, skipped {} (obstacle budget {}/{})",
                rule.name,
                rule_stats.painted,
                rule_stats.skipped(),
                budget.used(),
                budget.cap()
            );
            stats += rule_stats;
        }

        let open = self.grid.open_count();
        let start = resolve_start(&self.grid, settings.start, &mut streams.incidental);
        let reachable = match start {
            Some(start) => self.reachability.flood_fill(&self.grid, start, settings.topology)?,
            None => 0,
        };

        Ok(AttemptReport {
            seed,
            open_fraction: open as f32 / cell_count as f32,
            reachable_fraction: if open == 0 {
                0.0
            } else {
                reachable as f32 / open as f32
            },
            start,
            stats,
        })
    }

    fn finish(
        &mut self,
        settings: &GenerationSettings,
        base_seed: u64,
        attempts: u32,
        accepted: bool,
        report: AttemptReport,
    ) -> GenerationOutcome {
        let min_terrain_cost = self.grid.recompute_min_terrain_cost(settings.base.cost);
        GenerationOutcome {
            seed: base_seed,
            attempt_seed: report.seed,
            attempts,
            accepted,
            open_fraction: report.open_fraction,
            reachable_fraction: report.reachable_fraction,
            start: report.start,
            min_terrain_cost,
            stats: report.stats,
        }
    }

    /// Number of open cells reachable from `start` on the current board
    pub fn reachable_count(&mut self, start: usize, topology: Topology) -> BoardResult<usize> {
        self.reachability.flood_fill(&self.grid, start, topology)
    }

    /// Random reachable goal at least `min_manhattan` from `start`
    pub fn pick_goal<R: Rng + ?Sized>(
        &mut self,
        start: usize,
        min_manhattan: u32,
        topology: Topology,
        rng: &mut R,
    ) -> BoardResult<Option<usize>> {
        self.reachability
            .pick_random_reachable(&self.grid, start, min_manhattan, topology, rng)
    }
}

/// Ascending `order`; ties by a rarity-weighted random key so common rules
/// tend to go first and rare ones stay visible on top.
fn order_rules<R: Rng + ?Sized>(rules: &[TerrainRule], rng: &mut R, order: &mut Vec<usize>) {
    let mut keyed: Vec<(i32, f64, usize)> = rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let weight = (1.0 - f64::from(rule.rarity)).max(0.05);
            let roll: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
            (rule.order, roll.powf(1.0 / weight), index)
        })
        .collect();
    keyed.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(b.1.total_cmp(&a.1))
            .then(a.2.cmp(&b.2))
    });

    order.clear();
    order.extend(keyed.into_iter().map(|(_, _, index)| index));
}

/// Resolve the start cell; a blocked pick falls back to the nearest open
/// cell (lowest index on ties). None only when the board has no open cell.
fn resolve_start<R: Rng + ?Sized>(grid: &BoardGrid, start: StartCell, rng: &mut R) -> Option<usize> {
    let (x, y) = match start {
        StartCell::Center => (grid.width() / 2, grid.height() / 2),
        StartCell::At { x, y } => (x, y),
        StartCell::RandomOpen => {
            let mut seen = 0u32;
            let mut pick = None;
            for (index, &blocked) in grid.blocked().iter().enumerate() {
                if blocked {
                    continue;
                }
                seen += 1;
                if rng.gen_range(0..seen) == 0 {
                    pick = Some(index);
                }
            }
            return pick;
        }
    };

    let wanted = grid.index_at(x as i32, y as i32)?;
    if !grid.blocked()[wanted] {
        return Some(wanted);
    }
    let target = grid.position_of(wanted);
    grid.blocked()
        .iter()
        .enumerate()
        .filter(|(_, blocked)| !**blocked)
        .min_by_key(|(index, _)| (manhattan(grid.position_of(*index), target), *index))
        .map(|(index, _)| index)
}
