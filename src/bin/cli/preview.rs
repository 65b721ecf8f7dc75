use boardgen::grid::{BoardGrid, TerrainCategory};
use std::collections::BTreeMap;

fn glyph(category: TerrainCategory, blocked: bool) -> char {
    if blocked {
        return match category {
            TerrainCategory::WATER => '~',
            TerrainCategory::DEEP_WATER => 'W',
            TerrainCategory::ROCK => 'o',
            TerrainCategory::MOUNTAIN => '^',
            TerrainCategory::LAVA => '*',
            _ => '#',
        };
    }
    match category {
        TerrainCategory::LAND => '.',
        TerrainCategory::GRASS => ',',
        TerrainCategory::FOREST => 't',
        TerrainCategory::SAND => ':',
        TerrainCategory::SWAMP => '%',
        TerrainCategory::WATER | TerrainCategory::DEEP_WATER => '-',
        TerrainCategory::ROAD => '=',
        TerrainCategory::ROCK
        | TerrainCategory::MOUNTAIN
        | TerrainCategory::LAVA
        | TerrainCategory::WALL => '_',
        _ => '?',
    }
}

/// One character per cell, one line per row; the start cell is drawn as 'S'
pub fn render_ascii(grid: &BoardGrid, start: Option<usize>) -> String {
    let width = grid.width() as usize;
    let mut out = String::with_capacity(grid.cell_count() + grid.height() as usize);
    let cells = grid.categories().iter().zip(grid.blocked()).enumerate();
    for (index, (&category, &blocked)) in cells {
        if Some(index) == start {
            out.push('S');
        } else {
            out.push(glyph(category, blocked));
        }
        if (index + 1) % width == 0 {
            out.push('\n');
        }
    }
    out
}

/// (open, blocked) cell counts per category
pub fn category_counts(grid: &BoardGrid) -> BTreeMap<TerrainCategory, (usize, usize)> {
    let mut counts = BTreeMap::new();
    for (&category, &blocked) in grid.categories().iter().zip(grid.blocked()) {
        let entry: &mut (usize, usize) = counts.entry(category).or_default();
        if blocked {
            entry.1 += 1;
        } else {
            entry.0 += 1;
        }
    }
    counts
}
