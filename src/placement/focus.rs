//! Spatial bias for where placement algorithms pick cells

use crate::grid::BoardGrid;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Region of the board an algorithm draws cells from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaFocus {
    /// Band along the four borders
    Edge,
    /// Everything inside the interior margin
    Interior,
    #[default]
    Anywhere,
    /// Per-sample mix of the other three, by weight
    Weighted,
}

/// Focus selection plus the weights and margin that shape it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FocusSettings {
    pub focus: AreaFocus,
    pub edge_weight: f32,
    pub interior_weight: f32,
    pub anywhere_weight: f32,
    pub min_margin_cells: u32,
    #[validate(range(min = 0.0, max = 0.5))]
    pub margin_percent: f32,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            focus: AreaFocus::Anywhere,
            edge_weight: 1.0,
            interior_weight: 1.0,
            anywhere_weight: 1.0,
            min_margin_cells: 1,
            margin_percent: 0.1,
        }
    }
}

impl FocusSettings {
    pub fn with_focus(focus: AreaFocus) -> Self {
        Self {
            focus,
            ..Self::default()
        }
    }

    /// Interior margin in cells, never more than half the shorter side
    pub fn interior_margin(&self, width: u32, height: u32) -> u32 {
        let min_dimension = width.min(height);
        let scaled = (min_dimension as f32 * self.margin_percent).round().max(0.0) as u32;
        self.min_margin_cells
            .max(scaled)
            .min(min_dimension.saturating_sub(1) / 2)
    }

    /// Width of the border band that counts as Edge
    pub fn edge_band(&self, width: u32, height: u32) -> u32 {
        self.interior_margin(width, height).max(1)
    }

    /// Collapse Weighted into one concrete focus for a single draw
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> AreaFocus {
        if self.focus != AreaFocus::Weighted {
            return self.focus;
        }

        let edge = self.edge_weight.max(0.0);
        let interior = self.interior_weight.max(0.0);
        let anywhere = self.anywhere_weight.max(0.0);
        let total = edge + interior + anywhere;
        if !(total > 0.0) {
            return AreaFocus::Anywhere;
        }

        let roll = rng.gen_range(0.0..total);
        if roll < edge {
            AreaFocus::Edge
        } else if roll < edge + interior {
            AreaFocus::Interior
        } else {
            AreaFocus::Anywhere
        }
    }

    /// Draw one cell index from the focus area
    pub fn sample_cell<R: Rng + ?Sized>(&self, grid: &BoardGrid, rng: &mut R) -> usize {
        let focus = self.resolve(rng);
        self.sample_cell_in(focus, grid, rng)
    }

    /// Draw one cell index from an already resolved focus
    pub fn sample_cell_in<R: Rng + ?Sized>(
        &self,
        focus: AreaFocus,
        grid: &BoardGrid,
        rng: &mut R,
    ) -> usize {
        let (width, height) = (grid.width(), grid.height());
        let (x, y) = match focus {
            AreaFocus::Edge => {
                let band = self.edge_band(width, height);
                let offset = rng.gen_range(0..band.min(width).min(height).max(1));
                let perimeter = 2 * (width as u64 + height as u64);
                let roll = rng.gen_range(0..perimeter);
                let (w, h) = (width as u64, height as u64);
                if roll < w {
                    (roll as u32, offset)
                } else if roll < 2 * w {
                    ((roll - w) as u32, height - 1 - offset)
                } else if roll < 2 * w + h {
                    (offset, (roll - 2 * w) as u32)
                } else {
                    (width - 1 - offset, (roll - 2 * w - h) as u32)
                }
            }
            AreaFocus::Interior => {
                let margin = self.interior_margin(width, height);
                (
                    rng.gen_range(margin..width - margin),
                    rng.gen_range(margin..height - margin),
                )
            }
            AreaFocus::Anywhere | AreaFocus::Weighted => {
                (rng.gen_range(0..width), rng.gen_range(0..height))
            }
        };
        x as usize + y as usize * width as usize
    }

    /// Whether a cell lies inside a concrete focus area
    pub fn contains(&self, focus: AreaFocus, grid: &BoardGrid, index: usize) -> bool {
        let (width, height) = (grid.width(), grid.height());
        let distance = grid.coord_of(index).border_distance(width, height);
        match focus {
            AreaFocus::Edge => distance < self.edge_band(width, height),
            AreaFocus::Interior => distance >= self.interior_margin(width, height),
            AreaFocus::Anywhere | AreaFocus::Weighted => true,
        }
    }
}
