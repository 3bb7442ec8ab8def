use serde::{Deserialize, Serialize};

/// A square on the board. Row 0 is Black's back rank, row 7 is White's.
///
/// Off-board coordinates are representable so that offset arithmetic never
/// has to special-case the edges; every board access must be guarded by
/// [`valid_position`] first. Ordering is row-major, which is what the
/// occupied-square sets rely on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i8,
    pub column: i8,
}

/// True when `(row, column)` lies on the 8x8 board.
pub fn valid_coordinates(row: i32, column: i32) -> bool {
    (0..8).contains(&row) && (0..8).contains(&column)
}

/// True when `position` lies on the 8x8 board.
pub fn valid_position(position: Position) -> bool {
    valid_coordinates(position.row as i32, position.column as i32)
}

impl Position {
    pub const fn new(row: i8, column: i8) -> Self {
        Position { row, column }
    }

    pub fn offset(self, row_change: i8, column_change: i8) -> Self {
        Position::new(self.row + row_change, self.column + column_change)
    }

    pub fn up(self) -> Self {
        self.offset(-1, 0)
    }

    pub fn down(self) -> Self {
        self.offset(1, 0)
    }

    pub fn left(self) -> Self {
        self.offset(0, -1)
    }

    pub fn right(self) -> Self {
        self.offset(0, 1)
    }

    pub fn up_left(self) -> Self {
        self.offset(-1, -1)
    }

    pub fn up_right(self) -> Self {
        self.offset(-1, 1)
    }

    pub fn down_left(self) -> Self {
        self.offset(1, -1)
    }

    pub fn down_right(self) -> Self {
        self.offset(1, 1)
    }

    /// Index into 64-entry tables. Only meaningful for on-board positions.
    pub fn index(self) -> usize {
        self.row as usize * 8 + self.column as usize
    }

    /// The same square seen from the other side of the board.
    pub fn mirrored(self) -> Self {
        Position::new(7 - self.row, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_are_relative_to_row_zero_at_top() {
        let p = Position::new(4, 4);
        assert_eq!(p.up(), Position::new(3, 4));
        assert_eq!(p.down(), Position::new(5, 4));
        assert_eq!(p.left(), Position::new(4, 3));
        assert_eq!(p.right(), Position::new(4, 5));
        assert_eq!(p.up_left(), Position::new(3, 3));
        assert_eq!(p.up_right(), Position::new(3, 5));
        assert_eq!(p.down_left(), Position::new(5, 3));
        assert_eq!(p.down_right(), Position::new(5, 5));
    }

    #[test]
    fn edge_offsets_are_rejected_by_guard() {
        let corner = Position::new(0, 0);
        assert!(valid_position(corner));
        assert!(!valid_position(corner.up()));
        assert!(!valid_position(corner.left()));
        assert!(!valid_position(Position::new(7, 7).down_right()));
        assert!(!valid_coordinates(8, 3));
    }

    #[test]
    fn ordering_is_row_major() {
        assert!(Position::new(0, 7) < Position::new(1, 0));
        assert!(Position::new(3, 2) < Position::new(3, 5));
        assert_eq!(Position::default(), Position::new(0, 0));
    }
}
