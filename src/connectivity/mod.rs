//! Flood-fill reachability over the board with reusable scratch buffers

use crate::errors::BoardResult;
use crate::grid::{BoardGrid, DIAGONAL_OFFSETS, ORTHOGONAL_OFFSETS};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Neighbor topology used for reachability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Axis-aligned neighbors only
    #[default]
    Four,
    /// Axis-aligned plus diagonals; a diagonal needs at least one open side cell
    Eight,
}

/// Reusable flood-fill state.
///
/// A cell counts as reached by the latest fill when its stamp equals the
/// current stamp, so successive fills never clear the buffer. Stamp 0 means
/// "never visited".
#[derive(Debug, Clone, Default)]
pub struct Reachability {
    stamps: Vec<u32>,
    stamp: u32,
    queue: Vec<u32>,
    reached: usize,
}

impl Reachability {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_size(&mut self, cell_count: usize) {
        if self.stamps.len() != cell_count {
            self.stamps = vec![0; cell_count];
            self.queue = vec![0; cell_count];
            self.stamp = 0;
            self.reached = 0;
        }
    }

    fn advance_stamp(&mut self) {
        if self.stamp == u32::MAX {
            self.stamps.fill(0);
            self.stamp = 1;
        } else {
            self.stamp += 1;
        }
        self.reached = 0;
    }

    /// Mark every open cell reachable from `start` and return how many there are
    pub fn flood_fill(
        &mut self,
        grid: &BoardGrid,
        start: usize,
        topology: Topology,
    ) -> BoardResult<usize> {
        let start_blocked = grid.is_blocked(start)?;
        self.ensure_size(grid.cell_count());
        self.advance_stamp();
        if start_blocked {
            return Ok(0);
        }

        let stamp = self.stamp;
        let mut head = 0;
        let mut tail = 0;
        self.stamps[start] = stamp;
        self.queue[tail] = start as u32;
        tail += 1;

        while head < tail {
            let current = self.queue[head] as usize;
            head += 1;
            let (x, y) = grid.position_of(current);

            for (dx, dy) in ORTHOGONAL_OFFSETS {
                let Some(next) = grid.index_at(x + dx, y + dy) else {
                    continue;
                };
                if self.stamps[next] != stamp && grid.is_open_unchecked(next) {
                    self.stamps[next] = stamp;
                    self.queue[tail] = next as u32;
                    tail += 1;
                }
            }

            if topology == Topology::Eight {
                for (dx, dy) in DIAGONAL_OFFSETS {
                    let Some(next) = grid.index_at(x + dx, y + dy) else {
                        continue;
                    };
                    if self.stamps[next] == stamp || !grid.is_open_unchecked(next) {
                        continue;
                    }
                    let side_a = grid.index_at(x + dx, y).is_some_and(|i| grid.is_open_unchecked(i));
                    let side_b = grid.index_at(x, y + dy).is_some_and(|i| grid.is_open_unchecked(i));
                    if !(side_a || side_b) {
                        continue;
                    }
                    self.stamps[next] = stamp;
                    self.queue[tail] = next as u32;
                    tail += 1;
                }
            }
        }

        self.reached = tail;
        Ok(tail)
    }

    /// Whether `index` was reached by the most recent fill
    pub fn is_reachable(&self, index: usize) -> bool {
        self.stamp != 0 && self.stamps.get(index).is_some_and(|&s| s == self.stamp)
    }

    /// Cells reached by the most recent fill, in breadth-first order
    pub fn reached_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue[..self.reached].iter().map(|&i| i as usize)
    }

    /// Uniformly pick a reachable cell at least `min_manhattan` away from `start`.
    ///
    /// Runs one fill and reservoir-samples over the qualifying cells, so no
    /// candidate list is built. The start cell itself is never returned.
    pub fn pick_random_reachable<R: Rng + ?Sized>(
        &mut self,
        grid: &BoardGrid,
        start: usize,
        min_manhattan: u32,
        topology: Topology,
        rng: &mut R,
    ) -> BoardResult<Option<usize>> {
        let reached = self.flood_fill(grid, start, topology)?;
        if reached == 0 {
            return Ok(None);
        }

        let origin = grid.coord_of(start);
        let mut seen = 0u32;
        let mut pick = None;
        for &cell in &self.queue[..reached] {
            let cell = cell as usize;
            if cell == start || grid.coord_of(cell).manhattan_distance(&origin) < min_manhattan {
                continue;
            }
            seen += 1;
            if rng.gen_range(0..seen) == 0 {
                pick = Some(cell);
            }
        }
        Ok(pick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellPaint, Rgba8, TerrainCategory};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn wall() -> CellPaint {
        CellPaint {
            blocked: true,
            category: TerrainCategory::WALL,
            cost: 0,
            color: Rgba8::opaque(40, 40, 40),
            layer: 1,
        }
    }

    /// Build a grid from rows of '#' (blocked) and '.' (open)
    fn grid_from(rows: &[&str]) -> BoardGrid {
        let mut grid = BoardGrid::new(rows[0].len() as u32, rows.len() as u32).unwrap();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    let index = grid.coord_to_index(x as u32, y as u32).unwrap();
                    grid.set_cell(index, wall()).unwrap();
                }
            }
        }
        grid
    }

    #[test]
    fn test_open_board_fully_reachable() {
        let grid = BoardGrid::new(6, 4).unwrap();
        let mut reach = Reachability::new();
        assert_eq!(reach.flood_fill(&grid, 0, Topology::Four).unwrap(), 24);
        assert!((0..24).all(|i| reach.is_reachable(i)));
    }

    #[test]
    fn test_wall_splits_regions() {
        let grid = grid_from(&["..#..", "..#..", "..#.."]);
        let mut reach = Reachability::new();
        assert_eq!(reach.flood_fill(&grid, 0, Topology::Four).unwrap(), 6);
        assert!(!reach.is_reachable(3));
        assert_eq!(reach.flood_fill(&grid, 4, Topology::Eight).unwrap(), 6);
        assert!(!reach.is_reachable(0));
        assert!(reach.is_reachable(3));
    }

    #[test]
    fn test_blocked_start_reaches_nothing() {
        let grid = grid_from(&["#..", "..."]);
        let mut reach = Reachability::new();
        assert_eq!(reach.flood_fill(&grid, 1, Topology::Four).unwrap(), 5);
        assert_eq!(reach.flood_fill(&grid, 0, Topology::Four).unwrap(), 0);
        assert!(!reach.is_reachable(1));
        assert_eq!(reach.reached_cells().count(), 0);
    }

    #[test]
    fn test_out_of_range_start_is_error() {
        let grid = BoardGrid::new(3, 3).unwrap();
        let mut reach = Reachability::new();
        assert!(reach.flood_fill(&grid, 9, Topology::Four).is_err());
    }

    #[test]
    fn test_corner_cut_guard() {
        let grid = grid_from(&[".#", "#."]);
        let mut reach = Reachability::new();
        assert_eq!(reach.flood_fill(&grid, 0, Topology::Eight).unwrap(), 1);
        assert!(!reach.is_reachable(3));
        assert_eq!(reach.flood_fill(&grid, 3, Topology::Eight).unwrap(), 1);
        assert!(!reach.is_reachable(0));
    }

    #[test]
    fn test_diagonal_with_one_open_side() {
        let grid = grid_from(&["..", "#."]);
        let mut reach = Reachability::new();
        let grid_diag = grid_from(&[".#.", "#..", "..."]);
        assert_eq!(reach.flood_fill(&grid, 0, Topology::Eight).unwrap(), 3);
        assert_eq!(reach.flood_fill(&grid_diag, 0, Topology::Four).unwrap(), 1);
        assert_eq!(reach.flood_fill(&grid_diag, 0, Topology::Eight).unwrap(), 1);
        assert_eq!(reach.flood_fill(&grid_diag, 4, Topology::Eight).unwrap(), 6);
    }

    #[test]
    fn test_eight_neighbor_superset_of_four() {
        let grid = grid_from(&[
            "..#.#...",
            ".#..#.#.",
            "#..#..#.",
            "..#.##..",
            ".#...#.#",
        ]);
        let mut four = Reachability::new();
        let mut eight = Reachability::new();
        for start in 0..grid.cell_count() {
            four.flood_fill(&grid, start, Topology::Four).unwrap();
            eight.flood_fill(&grid, start, Topology::Eight).unwrap();
            for cell in 0..grid.cell_count() {
                if four.is_reachable(cell) {
                    assert!(eight.is_reachable(cell), "start {start} cell {cell}");
                }
            }
        }
    }

    #[test]
    fn test_matches_bfs_oracle() {
        use pathfinding::prelude::bfs_reach;

        let grid = grid_from(&[
            "...#....",
            ".#.#.##.",
            ".#...#..",
            ".####.#.",
            "......#.",
        ]);
        let mut reach = Reachability::new();
        let count = reach.flood_fill(&grid, 0, Topology::Four).unwrap();

        let oracle: Vec<usize> = bfs_reach(0usize, |&i| {
            let (x, y) = grid.position_of(i);
            ORTHOGONAL_OFFSETS
                .iter()
                .filter_map(|(dx, dy)| grid.index_at(x + dx, y + dy))
                .filter(|&n| !grid.blocked()[n])
                .collect::<Vec<_>>()
        })
        .collect();

        assert_eq!(count, oracle.len());
        assert!(oracle.iter().all(|&i| reach.is_reachable(i)));
    }

    #[test]
    fn test_stamp_wraps_and_clears() {
        let grid = BoardGrid::new(3, 3).unwrap();
        let mut reach = Reachability::new();
        reach.flood_fill(&grid, 0, Topology::Four).unwrap();
        reach.stamp = u32::MAX;
        reach.stamps[8] = u32::MAX - 1;

        assert_eq!(reach.flood_fill(&grid, 0, Topology::Four).unwrap(), 9);
        assert_eq!(reach.stamp, 1);
        assert!((0..9).all(|i| reach.stamps[i] == 1));
    }

    #[test]
    fn test_buffers_reused_for_same_size() {
        let grid = BoardGrid::new(4, 4).unwrap();
        let mut reach = Reachability::new();
        reach.flood_fill(&grid, 0, Topology::Four).unwrap();
        let stamps_ptr = reach.stamps.as_ptr();
        let queue_ptr = reach.queue.as_ptr();
        reach.flood_fill(&grid, 5, Topology::Eight).unwrap();
        assert_eq!(stamps_ptr, reach.stamps.as_ptr());
        assert_eq!(queue_ptr, reach.queue.as_ptr());
        assert_eq!(reach.stamp, 2);
    }

    #[test]
    fn test_pick_respects_min_distance() {
        let grid = grid_from(&["......", "......", "......"]);
        let mut reach = Reachability::new();
        let mut rng = Pcg64::seed_from_u64(9);
        for _ in 0..200 {
            let pick = reach
                .pick_random_reachable(&grid, 0, 5, Topology::Four, &mut rng)
                .unwrap()
                .unwrap();
            let coord = grid.index_to_coord(pick).unwrap();
            assert!(coord.x + coord.y >= 5);
        }
        assert_eq!(
            reach
                .pick_random_reachable(&grid, 0, 50, Topology::Four, &mut rng)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_pick_is_uniform() {
        let grid = grid_from(&["....", ".#..", "..#.", "...."]);
        let mut reach = Reachability::new();
        let mut rng = Pcg64::seed_from_u64(42);
        let reachable = reach.flood_fill(&grid, 0, Topology::Four).unwrap();
        assert_eq!(reachable, 14);

        let draws = 10_000;
        let mut counts = vec![0u32; grid.cell_count()];
        for _ in 0..draws {
            let pick = reach
                .pick_random_reachable(&grid, 0, 0, Topology::Four, &mut rng)
                .unwrap()
                .unwrap();
            counts[pick] += 1;
        }

        let expected = draws as f64 / (reachable - 1) as f64;
        assert_eq!(counts[0], 0);
        for (cell, &count) in counts.iter().enumerate() {
            if grid.blocked()[cell] {
                assert_eq!(count, 0);
            } else if cell != 0 {
                let deviation = (count as f64 - expected).abs() / expected;
                assert!(deviation < 0.2, "cell {cell} drawn {count} times");
            }
        }
    }
}
