use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Grid coordinates (unsigned integers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[display("({x}, {y})")]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell
    pub fn manhattan_distance(&self, other: &CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Distance to the nearest board border (0 on the border ring)
    pub fn border_distance(&self, width: u32, height: u32) -> u32 {
        let dx = self.x.min(width.saturating_sub(1).saturating_sub(self.x));
        let dy = self.y.min(height.saturating_sub(1).saturating_sub(self.y));
        dx.min(dy)
    }
}

/// Orthogonal neighbor offsets, in N/E/S/W order
pub const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Diagonal neighbor offsets
pub const DIAGONAL_OFFSETS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Manhattan distance between two signed positions
pub fn manhattan(a: (i32, i32), b: (i32, i32)) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = CellCoord::new(1, 1);
        let b = CellCoord::new(4, 5);
        assert_eq!(a.manhattan_distance(&b), 7);
        assert_eq!(b.manhattan_distance(&a), 7);
        assert_eq!(manhattan((1, 1), (4, 5)), 7);
    }

    #[test]
    fn test_border_distance() {
        assert_eq!(CellCoord::new(0, 3).border_distance(8, 8), 0);
        assert_eq!(CellCoord::new(7, 3).border_distance(8, 8), 0);
        assert_eq!(CellCoord::new(3, 3).border_distance(8, 8), 3);
        assert_eq!(CellCoord::new(2, 5).border_distance(8, 8), 2);
    }

    #[test]
    fn test_from_tuple_and_display() {
        let coord: CellCoord = (3, 9).into();
        assert_eq!(coord, CellCoord::new(3, 9));
        assert_eq!(coord.to_string(), "(3, 9)");
    }
}
