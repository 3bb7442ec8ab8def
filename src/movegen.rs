// =============================================================================
// Move generation and attack detection
//
// Generators produce pseudo-legal moves: they obey piece movement rules but
// may leave the mover's king in check. Legality is decided by playing the
// move and asking `is_in_check`, either eagerly (`legal_moves`, `perft`) or
// lazily inside the search.
//
// No generator ever produces a move onto an enemy king. Capturing the king is
// never a legal chess move, and such a pseudo-move would corrupt the king
// bookkeeping that check detection relies on.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::position::{valid_position, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Unfinished,
    Checkmate,
    Stalemate,
}

const STRAIGHT: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

#[rustfmt::skip]
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

#[rustfmt::skip]
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

impl Board {
    /// All pseudo-legal moves for `color`, in row-major order of the moving
    /// pieces.
    pub fn get_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);

        for &position in self.occupied(color) {
            let piece = *self.square(position);
            match piece.piece_type {
                PieceType::Pawn => self.add_pawn_moves(&mut moves, &piece),
                PieceType::Bishop => self.add_sliding_moves(&mut moves, &piece, &DIAGONAL),
                PieceType::Knight => self.add_offset_moves(&mut moves, &piece, &KNIGHT_OFFSETS),
                PieceType::Rook => self.add_sliding_moves(&mut moves, &piece, &STRAIGHT),
                PieceType::Queen => {
                    self.add_sliding_moves(&mut moves, &piece, &STRAIGHT);
                    self.add_sliding_moves(&mut moves, &piece, &DIAGONAL);
                }
                PieceType::King => {
                    self.add_offset_moves(&mut moves, &piece, &KING_OFFSETS);
                    self.add_castling_moves(&mut moves, &piece);
                }
                PieceType::None => {}
            }
        }

        moves
    }

    /// On the board and either empty or holding an enemy piece other than
    /// the king.
    fn available_square(&self, color: Color, position: Position) -> bool {
        if !valid_position(position) {
            return false;
        }
        let square = self.square(position);
        square.is_empty() || (square.color != color && square.piece_type != PieceType::King)
    }

    fn add_offset_moves(&self, moves: &mut Vec<Move>, piece: &Piece, offsets: &[(i8, i8)]) {
        for &(dr, dc) in offsets {
            let target = piece.position.offset(dr, dc);
            if self.available_square(piece.color, target) {
                moves.push(Move::new(piece.position, target));
            }
        }
    }

    fn add_sliding_moves(&self, moves: &mut Vec<Move>, piece: &Piece, directions: &[(i8, i8)]) {
        for &(dr, dc) in directions {
            let mut target = piece.position.offset(dr, dc);
            while valid_position(target) {
                let square = self.square(target);
                if !square.is_empty() {
                    if square.color != piece.color && square.piece_type != PieceType::King {
                        moves.push(Move::new(piece.position, target));
                    }
                    break;
                }
                moves.push(Move::new(piece.position, target));
                target = target.offset(dr, dc);
            }
        }
    }

    /// A pawn move to `to`, expanded into the four promotions on the last rank.
    fn add_pawn_move(moves: &mut Vec<Move>, pawn: &Piece, to: Position) {
        if to.row == pawn.color.last_rank() {
            for promotion in PieceType::PROMOTIONS {
                moves.push(Move::promoting(pawn.position, to, promotion));
            }
        } else {
            moves.push(Move::new(pawn.position, to));
        }
    }

    fn add_pawn_moves(&self, moves: &mut Vec<Move>, pawn: &Piece) {
        let forward = pawn.color.forward();

        // Pushes
        let one = pawn.position.offset(forward, 0);
        if valid_position(one) && self.square(one).is_empty() {
            Self::add_pawn_move(moves, pawn, one);

            let two = one.offset(forward, 0);
            if !pawn.has_moved && valid_position(two) && self.square(two).is_empty() {
                moves.push(Move::new(pawn.position, two));
            }
        }

        // Captures
        for dc in [-1, 1] {
            let target = pawn.position.offset(forward, dc);
            if !valid_position(target) {
                continue;
            }
            let square = self.square(target);
            if !square.is_empty()
                && square.color != pawn.color
                && square.piece_type != PieceType::King
            {
                Self::add_pawn_move(moves, pawn, target);
            }
        }

        // En passant, only directly after the enemy pawn's double step
        if let Some(victim_at) = self.last_double_step() {
            let victim = self.square(victim_at);
            if victim.color != pawn.color
                && victim_at.row == pawn.position.row
                && (victim_at.column - pawn.position.column).abs() == 1
            {
                let target = victim_at.offset(forward, 0);
                if valid_position(target) && self.square(target).is_empty() {
                    moves.push(Move::new(pawn.position, target));
                }
            }
        }
    }

    fn add_castling_moves(&self, moves: &mut Vec<Move>, king: &Piece) {
        let home = Position::new(7 - king.color.last_rank(), 4);
        if king.has_moved || king.position != home {
            return;
        }
        let row = home.row;
        let enemy = king.color.opposite();

        // (rook column, direction the king travels)
        for (rook_column, step) in [(0i8, -1i8), (7, 1)] {
            let rook = self.square(Position::new(row, rook_column));
            if rook.piece_type != PieceType::Rook || rook.color != king.color || rook.has_moved {
                continue;
            }

            let (low, high) = if rook_column < home.column {
                (rook_column, home.column)
            } else {
                (home.column, rook_column)
            };
            if ((low + 1)..high).any(|column| !self.square(Position::new(row, column)).is_empty()) {
                continue;
            }

            // Start, transit and destination squares
            if (0..=2).any(|i| self.is_attacked_by(home.offset(0, i * step), enemy)) {
                continue;
            }

            moves.push(Move::new(home, home.offset(0, 2 * step)));
        }
    }

    // -------------------------------------------------------------------------
    // Attack detection
    // -------------------------------------------------------------------------

    fn holds(&self, position: Position, color: Color, piece_types: &[PieceType]) -> bool {
        if !valid_position(position) {
            return false;
        }
        let square = self.square(position);
        square.color == color && piece_types.contains(&square.piece_type)
    }

    /// First occupied square walking from `from` (exclusive) in a direction.
    fn first_piece_in_direction(&self, from: Position, dr: i8, dc: i8) -> Option<Position> {
        let mut position = from.offset(dr, dc);
        while valid_position(position) {
            if !self.square(position).is_empty() {
                return Some(position);
            }
            position = position.offset(dr, dc);
        }
        None
    }

    /// True if any piece of `attacker` attacks `position`.
    pub fn is_attacked_by(&self, position: Position, attacker: Color) -> bool {
        // A pawn attacks diagonally forward, so it sits one row behind.
        let behind = -attacker.forward();
        for dc in [-1, 1] {
            if self.holds(position.offset(behind, dc), attacker, &[PieceType::Pawn]) {
                return true;
            }
        }

        let rook_like = [PieceType::Rook, PieceType::Queen];
        for &(dr, dc) in &STRAIGHT {
            if let Some(blocker) = self.first_piece_in_direction(position, dr, dc) {
                if self.holds(blocker, attacker, &rook_like) {
                    return true;
                }
            }
        }

        let bishop_like = [PieceType::Bishop, PieceType::Queen];
        for &(dr, dc) in &DIAGONAL {
            if let Some(blocker) = self.first_piece_in_direction(position, dr, dc) {
                if self.holds(blocker, attacker, &bishop_like) {
                    return true;
                }
            }
        }

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(dr, dc)| self.holds(position.offset(dr, dc), attacker, &[PieceType::Knight]))
        {
            return true;
        }

        KING_OFFSETS
            .iter()
            .any(|&(dr, dc)| self.holds(position.offset(dr, dc), attacker, &[PieceType::King]))
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_attacked_by(self.king_position(color), color.opposite())
    }

    // -------------------------------------------------------------------------
    // Legality
    // -------------------------------------------------------------------------

    /// Classify the position for `color` given its pseudo-legal `moves`.
    /// Stops at the first move that leaves the king safe.
    pub fn game_state(&mut self, color: Color, moves: &[Move]) -> GameState {
        for &mv in moves {
            self.make_move(mv);
            let legal = !self.is_in_check(color);
            self.undo_move();
            if legal {
                return GameState::Unfinished;
            }
        }

        if self.is_in_check(color) {
            GameState::Checkmate
        } else {
            GameState::Stalemate
        }
    }

    /// Pseudo-legal moves that do not leave `color`'s king in check.
    pub fn legal_moves(&mut self, color: Color) -> Vec<Move> {
        let pseudo_legal = self.get_moves(color);
        pseudo_legal
            .into_iter()
            .filter(|&mv| {
                self.make_move(mv);
                let legal = !self.is_in_check(color);
                self.undo_move();
                legal
            })
            .collect()
    }

    /// Apply a move submitted from outside the engine, refusing anything that
    /// is not a legal move for `color`.
    pub fn make_legal_move(&mut self, mv: Move, color: Color) -> ChessResult<()> {
        if mv.is_null() || !self.legal_moves(color).contains(&mv) {
            return Err(ChessError::IllegalMove(mv));
        }
        self.make_move(mv);
        Ok(())
    }
}

/// Number of legal move sequences of length `depth` with `color` to move.
pub fn perft(board: &mut Board, color: Color, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for mv in board.get_moves(color) {
        board.make_move(mv);
        if !board.is_in_check(color) {
            nodes += perft(board, color.opposite(), depth - 1);
        }
        board.undo_move();
    }
    nodes
}
