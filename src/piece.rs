use serde::{Deserialize, Serialize};

use crate::position::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Uncolored,
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
            Color::Uncolored => Color::Uncolored,
        }
    }

    /// Row direction pawns of this color advance in.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            _ => 1,
        }
    }

    /// Row on which pawns of this color promote.
    pub fn last_rank(self) -> i8 {
        match self {
            Color::White => 0,
            _ => 7,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    None,
    Pawn,
    Bishop,
    Knight,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Piece types a pawn may promote to, strongest first.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    pub fn symbol(self) -> char {
        match self {
            PieceType::None => '.',
            PieceType::Pawn => 'p',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }
}

/// A piece standing on the board. Empty squares hold a piece of type
/// [`PieceType::None`] so that every grid cell knows its own coordinates.
///
/// Two pieces compare equal when they stand on the same square; type, color
/// and move history are ignored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
    pub position: Position,
    pub has_moved: bool,
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Piece {}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color, position: Position) -> Self {
        Piece {
            piece_type,
            color,
            position,
            has_moved: false,
        }
    }

    /// The placeholder stored on an empty square.
    pub fn empty(position: Position) -> Self {
        Piece::new(PieceType::None, Color::Uncolored, position)
    }

    pub fn is_empty(&self) -> bool {
        self.piece_type == PieceType::None
    }

    /// The same piece relocated to `position` and marked as moved.
    pub fn moved_to(self, position: Position) -> Self {
        Piece {
            position,
            has_moved: true,
            ..self
        }
    }

    /// Uppercase for White, lowercase for Black, `.` for an empty square.
    pub fn symbol(&self) -> char {
        let c = self.piece_type.symbol();
        if self.color == Color::White {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_everything_but_position() {
        let square = Position::new(3, 3);
        let knight = Piece::new(PieceType::Knight, Color::White, square);
        let moved_queen = Piece::new(PieceType::Queen, Color::Black, square).moved_to(square);
        assert_eq!(knight, moved_queen);
        assert_ne!(knight, Piece::new(PieceType::Knight, Color::White, Position::new(3, 4)));
    }

    #[test]
    fn symbols_follow_color() {
        let p = Position::new(0, 0);
        assert_eq!(Piece::new(PieceType::Rook, Color::White, p).symbol(), 'R');
        assert_eq!(Piece::new(PieceType::Rook, Color::Black, p).symbol(), 'r');
        assert_eq!(Piece::empty(p).symbol(), '.');
    }
}
