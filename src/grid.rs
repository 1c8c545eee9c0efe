use serde::{Deserialize, Serialize};
use Direction::*;

/// Number of cells along each side of the board.
pub const GRID_SIZE: i32 = 16;

/// A cell on the board. Off-grid values are representable so a train that
/// drives past the edge can still be reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn in_bounds(&self) -> bool {
        in_bounds(*self)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

pub fn in_bounds(pos: Position) -> bool {
    (0..GRID_SIZE).contains(&pos.x) && (0..GRID_SIZE).contains(&pos.y)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(in_bounds(Position::new(0, 0)));
        assert!(in_bounds(Position::new(15, 15)));
        assert!(in_bounds(Position::new(4, 10)));
        assert!(!in_bounds(Position::new(-1, 0)));
        assert!(!in_bounds(Position::new(0, -1)));
        assert!(!in_bounds(Position::new(16, 3)));
        assert!(!in_bounds(Position::new(3, 16)));
    }

    #[test]
    fn test_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_in_direction(Up), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Down), Position::new(5, 6));
        assert_eq!(pos.moved_in_direction(Left), Position::new(4, 5));
        assert_eq!(pos.moved_in_direction(Right), Position::new(6, 5));
    }

    #[test]
    fn test_opposites() {
        assert!(Up.is_opposite(Down));
        assert!(Left.is_opposite(Right));
        assert!(!Up.is_opposite(Left));
        assert!(!Right.is_opposite(Right));
    }
}
