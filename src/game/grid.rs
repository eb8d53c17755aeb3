//! 3x3 battle grid positions.
//!
//! Layout, x = column and y = row:
//!   (0,0) (1,0) (2,0)
//!   (0,1) (1,1) (2,1)
//!   (0,2) (1,2) (2,2)

use serde::{Deserialize, Serialize};

pub const GRID_SIZE: u8 = 3;

/// A position on the battle grid. Constructed through [`GridPosition::new`],
/// which rejects out-of-bounds coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: u8,
    pub y: u8,
}

impl GridPosition {
    pub fn new(x: u8, y: u8) -> Option<GridPosition> {
        if x < GRID_SIZE && y < GRID_SIZE {
            Some(GridPosition { x, y })
        } else {
            None
        }
    }

    /// Manhattan distance, used for skill range checks.
    pub fn distance_to(&self, other: &GridPosition) -> u8 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Adjacent including diagonals; a position is never adjacent to itself.
    pub fn is_adjacent(&self, other: &GridPosition) -> bool {
        if self == other {
            return false;
        }
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }

    /// All valid neighboring positions (up to 8).
    pub fn neighbors(&self) -> Vec<GridPosition> {
        let mut out = Vec::new();
        for dx in -1i16..=1 {
            for dy in -1i16..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = self.x as i16 + dx;
                let ny = self.y as i16 + dy;
                if (0..GRID_SIZE as i16).contains(&nx) && (0..GRID_SIZE as i16).contains(&ny) {
                    out.push(GridPosition { x: nx as u8, y: ny as u8 });
                }
            }
        }
        out
    }

    /// All nine positions in row-major order.
    pub fn all() -> Vec<GridPosition> {
        (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| GridPosition { x, y }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn new_rejects_out_of_bounds() {
        assert!(GridPosition::new(0, 0).is_some());
        assert!(GridPosition::new(2, 2).is_some());
        assert!(GridPosition::new(3, 0).is_none());
        assert!(GridPosition::new(0, 3).is_none());
    }

    #[test]
    fn manhattan_distance() {
        let a = GridPosition::new(0, 0).unwrap();
        let b = GridPosition::new(2, 1).unwrap();
        assert_eq!(a.distance_to(&b), 3);
        assert_eq!(b.distance_to(&a), 3);
        assert_eq!(a.distance_to(&a), 0);
    }

    #[test]
    fn adjacency_includes_diagonals_but_not_self() {
        let center = GridPosition::new(1, 1).unwrap();
        assert!(!center.is_adjacent(&center));
        for other in GridPosition::all() {
            if other == center {
                continue;
            }
            assert!(center.is_adjacent(&other), "center touches every other cell");
        }
        let corner = GridPosition::new(0, 0).unwrap();
        let far = GridPosition::new(2, 0).unwrap();
        assert!(!corner.is_adjacent(&far));
    }

    #[test]
    fn corner_has_three_neighbors_center_has_eight() {
        assert_eq!(GridPosition::new(0, 0).unwrap().neighbors().len(), 3);
        assert_eq!(GridPosition::new(1, 1).unwrap().neighbors().len(), 8);
        assert_eq!(GridPosition::new(1, 0).unwrap().neighbors().len(), 5);
    }

    #[test]
    fn equal_positions_hash_identically() {
        let mut set = HashSet::new();
        set.insert(GridPosition::new(1, 2).unwrap());
        assert!(set.contains(&GridPosition::new(1, 2).unwrap()));
        assert_eq!(GridPosition::all().len(), 9);
    }
}
