//! Per-cell board storage: traversability, cost, category, color and paint layer

use crate::errors::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod coordinates;

pub use coordinates::*;

/// Terrain classification id stored per cell.
///
/// Any byte is a valid id. The named constants cover the built-in set;
/// rule files may refer to those by name or use raw ids for their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CategoryRepr", into = "CategoryRepr")]
pub struct TerrainCategory(pub u8);

const CATEGORY_NAMES: [&str; 12] = [
    "land",
    "grass",
    "forest",
    "sand",
    "swamp",
    "water",
    "deep_water",
    "rock",
    "mountain",
    "road",
    "lava",
    "wall",
];

impl TerrainCategory {
    pub const LAND: Self = Self(0);
    pub const GRASS: Self = Self(1);
    pub const FOREST: Self = Self(2);
    pub const SAND: Self = Self(3);
    pub const SWAMP: Self = Self(4);
    pub const WATER: Self = Self(5);
    pub const DEEP_WATER: Self = Self(6);
    pub const ROCK: Self = Self(7);
    pub const MOUNTAIN: Self = Self(8);
    pub const ROAD: Self = Self(9);
    pub const LAVA: Self = Self(10);
    pub const WALL: Self = Self(11);

    /// Name of a built-in category, None for custom ids
    pub fn name(self) -> Option<&'static str> {
        CATEGORY_NAMES.get(self.0 as usize).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CATEGORY_NAMES
            .iter()
            .position(|&known| known == name)
            .map(|id| Self(id as u8))
    }
}

impl fmt::Display for TerrainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "category {}", self.0),
        }
    }
}

/// Serialized form: a built-in name or a raw id
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CategoryRepr {
    Id(u8),
    Name(String),
}

impl TryFrom<CategoryRepr> for TerrainCategory {
    type Error = String;

    fn try_from(repr: CategoryRepr) -> Result<Self, Self::Error> {
        match repr {
            CategoryRepr::Id(id) => Ok(Self(id)),
            CategoryRepr::Name(name) => {
                Self::from_name(&name).ok_or_else(|| format!("unknown terrain category '{name}'"))
            }
        }
    }
}

impl From<TerrainCategory> for CategoryRepr {
    fn from(category: TerrainCategory) -> Self {
        match category.name() {
            Some(name) => CategoryRepr::Name(name.to_string()),
            None => CategoryRepr::Id(category.0),
        }
    }
}

/// 8-bit RGBA color consumed by the rendering side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(color: Rgba8) -> Self {
        [color.r, color.g, color.b, color.a]
    }
}

/// Values written into one cell by a single paint operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPaint {
    pub blocked: bool,
    pub category: TerrainCategory,
    pub cost: u32,
    pub color: Rgba8,
    pub layer: u8,
}

/// Open terrain every generation attempt starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseTerrain {
    pub category: TerrainCategory,
    pub cost: u32,
    pub color: Rgba8,
}

impl Default for BaseTerrain {
    fn default() -> Self {
        Self {
            category: TerrainCategory::LAND,
            cost: 1,
            color: Rgba8::opaque(118, 160, 84),
        }
    }
}

/// Rectangular board with parallel per-cell arrays (row-major)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardGrid {
    width: u32,
    height: u32,
    cell_count: usize,
    blocked: Vec<bool>,
    terrain_cost: Vec<u32>,
    terrain_category: Vec<TerrainCategory>,
    base_color: Vec<Rgba8>,
    paint_layer: Vec<u8>,
    min_terrain_cost: u32,
}

impl BoardGrid {
    /// Create an all-open board of the given size
    pub fn new(width: u32, height: u32) -> BoardResult<Self> {
        let mut grid = Self::default();
        grid.resize(width, height)?;
        Ok(grid)
    }

    /// Compute the cell count for a board size, rejecting sizes beyond 32-bit addressing
    pub fn checked_cell_count(width: u32, height: u32) -> BoardResult<usize> {
        if width == 0 || height == 0 {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        let count = u64::from(width) * u64::from(height);
        if count > i32::MAX as u64 {
            return Err(BoardError::IndexOverflow { width, height });
        }
        Ok(count as usize)
    }

    /// Reallocate every per-cell array for a new size; leaves the grid untouched on error
    pub fn resize(&mut self, width: u32, height: u32) -> BoardResult<()> {
        let cell_count = Self::checked_cell_count(width, height)?;
        let base = BaseTerrain::default();

        self.blocked = vec![false; cell_count];
        self.terrain_cost = vec![base.cost; cell_count];
        self.terrain_category = vec![base.category; cell_count];
        self.base_color = vec![base.color; cell_count];
        self.paint_layer = vec![0; cell_count];
        self.width = width;
        self.height = height;
        self.cell_count = cell_count;
        self.min_terrain_cost = base.cost;
        Ok(())
    }

    /// Fill every cell with open base terrain
    pub fn reset_to_base(&mut self, base: &BaseTerrain) {
        let cost = base.cost.max(1);
        self.blocked.fill(false);
        self.terrain_cost.fill(cost);
        self.terrain_category.fill(base.category);
        self.base_color.fill(base.color);
        self.paint_layer.fill(0);
        self.min_terrain_cost = cost;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    fn check_index(&self, index: usize) -> BoardResult<()> {
        if index >= self.cell_count {
            return Err(BoardError::CellOutOfRange {
                index,
                cell_count: self.cell_count,
            });
        }
        Ok(())
    }

    /// Convert cell coordinates to a row-major index
    pub fn coord_to_index(&self, x: u32, y: u32) -> BoardResult<usize> {
        if x >= self.width || y >= self.height {
            return Err(BoardError::CoordOutOfRange {
                x: i64::from(x),
                y: i64::from(y),
                width: self.width,
                height: self.height,
            });
        }
        Ok(x as usize + y as usize * self.width as usize)
    }

    /// Convert a row-major index back to cell coordinates
    pub fn index_to_coord(&self, index: usize) -> BoardResult<CellCoord> {
        self.check_index(index)?;
        Ok(self.coord_of(index))
    }

    /// Unchecked inverse of `coord_to_index` for indices already known to be valid
    pub(crate) fn coord_of(&self, index: usize) -> CellCoord {
        let width = self.width as usize;
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }

    /// Signed position lookup used by the growth algorithms; `None` outside the board
    pub fn index_at(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(x as usize + y as usize * self.width as usize)
    }

    /// Signed position of a valid index
    pub(crate) fn position_of(&self, index: usize) -> (i32, i32) {
        let coord = self.coord_of(index);
        (coord.x as i32, coord.y as i32)
    }

    pub fn is_blocked(&self, index: usize) -> BoardResult<bool> {
        self.check_index(index)?;
        Ok(self.blocked[index])
    }

    pub fn terrain_cost(&self, index: usize) -> BoardResult<u32> {
        self.check_index(index)?;
        Ok(self.terrain_cost[index])
    }

    pub fn category(&self, index: usize) -> BoardResult<TerrainCategory> {
        self.check_index(index)?;
        Ok(self.terrain_category[index])
    }

    pub fn color(&self, index: usize) -> BoardResult<Rgba8> {
        self.check_index(index)?;
        Ok(self.base_color[index])
    }

    pub fn paint_layer(&self, index: usize) -> BoardResult<u8> {
        self.check_index(index)?;
        Ok(self.paint_layer[index])
    }

    /// Write one cell; a blocked cell always stores cost 0, an open one at least 1
    pub fn set_cell(&mut self, index: usize, paint: CellPaint) -> BoardResult<()> {
        self.check_index(index)?;
        self.blocked[index] = paint.blocked;
        self.terrain_cost[index] = if paint.blocked { 0 } else { paint.cost.max(1) };
        self.terrain_category[index] = paint.category;
        self.base_color[index] = paint.color;
        self.paint_layer[index] = paint.layer;
        Ok(())
    }

    /// Read-only per-cell views for pathfinding and rendering collaborators
    pub fn blocked(&self) -> &[bool] {
        &self.blocked
    }

    pub fn terrain_costs(&self) -> &[u32] {
        &self.terrain_cost
    }

    pub fn categories(&self) -> &[TerrainCategory] {
        &self.terrain_category
    }

    pub fn colors(&self) -> &[Rgba8] {
        &self.base_color
    }

    pub fn paint_layers(&self) -> &[u8] {
        &self.paint_layer
    }

    /// Open cell test for indices already known to be valid
    pub(crate) fn is_open_unchecked(&self, index: usize) -> bool {
        !self.blocked[index]
    }

    pub fn open_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| !b).count()
    }

    pub fn blocked_count(&self) -> usize {
        self.cell_count - self.open_count()
    }

    /// Lowest traversal cost among open cells, as recorded by the last accepted generation
    pub fn min_terrain_cost(&self) -> u32 {
        self.min_terrain_cost
    }

    /// Recompute the minimum open-cell cost, falling back to `fallback` on a fully blocked board
    pub fn recompute_min_terrain_cost(&mut self, fallback: u32) -> u32 {
        let min = self
            .blocked
            .iter()
            .zip(&self.terrain_cost)
            .filter(|(blocked, _)| !**blocked)
            .map(|(_, cost)| *cost)
            .min()
            .unwrap_or(fallback);
        self.min_terrain_cost = min.max(1);
        self.min_terrain_cost
    }
}
