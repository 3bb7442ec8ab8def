use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChessError, ChessResult};
use crate::piece::PieceType;
use crate::position::{valid_coordinates, Position};

/// A move from one square to another, optionally promoting a pawn.
///
/// `Move::default()` is the null move: both squares at the origin. It means
/// "no move found" and must never be played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub promotion: PieceType,
}

impl Default for Move {
    fn default() -> Self {
        Move::NULL
    }
}

impl Move {
    pub const NULL: Move = Move {
        from: Position::new(0, 0),
        to: Position::new(0, 0),
        promotion: PieceType::None,
    };

    pub fn new(from: Position, to: Position) -> Self {
        Move {
            from,
            to,
            promotion: PieceType::None,
        }
    }

    pub fn promoting(from: Position, to: Position, promotion: PieceType) -> Self {
        Move {
            from,
            to,
            promotion,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == Move::NULL
    }

    /// Coordinate notation, e.g. "e2e4", "a7a8q". Row 0 is rank 8.
    pub fn to_notation(&self) -> String {
        let square = |p: Position| {
            let file = (b'a' + p.column as u8) as char;
            let rank = (b'8' - p.row as u8) as char;
            format!("{file}{rank}")
        };
        let promo = match self.promotion {
            PieceType::Queen => "q",
            PieceType::Rook => "r",
            PieceType::Bishop => "b",
            PieceType::Knight => "n",
            _ => "",
        };
        format!("{}{}{promo}", square(self.from), square(self.to))
    }

    /// Parse coordinate notation produced by [`Move::to_notation`].
    pub fn from_notation(s: &str) -> ChessResult<Move> {
        let invalid = || ChessError::InvalidNotation(s.to_string());
        let bytes = s.trim().as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(invalid());
        }
        let square = |file: u8, rank: u8| {
            let row = b'8' as i32 - rank as i32;
            let column = file as i32 - b'a' as i32;
            if valid_coordinates(row, column) {
                Some(Position::new(row as i8, column as i8))
            } else {
                None
            }
        };
        let from = square(bytes[0], bytes[1]).ok_or_else(invalid)?;
        let to = square(bytes[2], bytes[3]).ok_or_else(invalid)?;
        let promotion = match bytes.get(4) {
            None => PieceType::None,
            Some(b'q') => PieceType::Queen,
            Some(b'r') => PieceType::Rook,
            Some(b'b') => PieceType::Bishop,
            Some(b'n') => PieceType::Knight,
            Some(_) => return Err(invalid()),
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation())
    }
}
