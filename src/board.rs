use std::collections::BTreeSet;
use std::fmt;

use crate::evaluation::piece_score;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::position::{valid_position, Position};
use crate::zobrist::Zobrist;

/// One entry of the mutation log. A logical move is the run of `Add` and
/// `Remove` entries that precedes its `Separator`.
#[derive(Clone, Copy, Debug)]
pub enum Action {
    Add(Piece),
    Remove(Piece),
    Separator,
}

/// The 8x8 grid plus everything derived from it.
///
/// The occupied-square sets, king positions, evaluation and hash are kept in
/// sync with the grid by [`Board::add_piece`] and [`Board::remove_piece`];
/// nothing else writes to the grid.
#[derive(Clone, Debug)]
pub struct Board {
    squares: [[Piece; 8]; 8],
    white_squares: BTreeSet<Position>,
    black_squares: BTreeSet<Position>,
    white_king: Position,
    black_king: Position,
    evaluation: i32,
    hash: u64,
    log: Vec<Action>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: std::array::from_fn(|row| {
                std::array::from_fn(|column| Piece::empty(Position::new(row as i8, column as i8)))
            }),
            white_squares: BTreeSet::new(),
            black_squares: BTreeSet::new(),
            white_king: Position::default(),
            black_king: Position::default(),
            evaluation: 0,
            hash: 0,
            log: Vec::new(),
        }
    }

    /// The standard starting position. Black occupies rows 0-1, White rows 6-7.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for (column, &piece_type) in BACK_RANK.iter().enumerate() {
            let column = column as i8;
            board.add_piece(Piece::new(piece_type, Color::Black, Position::new(0, column)), true);
            board.add_piece(Piece::new(PieceType::Pawn, Color::Black, Position::new(1, column)), true);
            board.add_piece(Piece::new(PieceType::Pawn, Color::White, Position::new(6, column)), true);
            board.add_piece(Piece::new(piece_type, Color::White, Position::new(7, column)), true);
        }
        board
    }

    /// The piece on `position`, or the empty placeholder for empty and
    /// off-board squares.
    pub fn piece_at(&self, position: Position) -> Piece {
        if valid_position(position) {
            self.squares[position.row as usize][position.column as usize]
        } else {
            Piece::empty(position)
        }
    }

    /// Grid read for callers that have already checked `valid_position`.
    #[inline]
    pub(crate) fn square(&self, position: Position) -> &Piece {
        &self.squares[position.row as usize][position.column as usize]
    }

    pub fn occupied(&self, color: Color) -> &BTreeSet<Position> {
        match color {
            Color::White => &self.white_squares,
            _ => &self.black_squares,
        }
    }

    fn occupied_mut(&mut self, color: Color) -> &mut BTreeSet<Position> {
        match color {
            Color::White => &mut self.white_squares,
            _ => &mut self.black_squares,
        }
    }

    pub fn king_position(&self, color: Color) -> Position {
        match color {
            Color::White => self.white_king,
            _ => self.black_king,
        }
    }

    /// Running material + positional score. Positive favours White.
    pub fn evaluate(&self) -> i32 {
        self.evaluation
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Number of moves applied and not yet undone.
    pub fn move_count(&self) -> usize {
        self.log
            .iter()
            .filter(|action| matches!(action, Action::Separator))
            .count()
    }

    pub fn log(&self) -> &[Action] {
        &self.log
    }

    /// Evaluation recomputed from the grid. Always equal to [`Board::evaluate`].
    pub fn evaluate_from_scratch(&self) -> i32 {
        self.squares.iter().flatten().map(piece_score).sum()
    }

    /// Hash recomputed from the grid. Always equal to [`Board::hash`].
    pub fn hash_from_scratch(&self) -> u64 {
        self.squares
            .iter()
            .flatten()
            .fold(0, |hash, p| hash ^ Zobrist::piece(p.color, p.piece_type, p.position))
    }

    // -------------------------------------------------------------------------
    // Mutation primitives
    // -------------------------------------------------------------------------

    /// Place `piece` on its own square. Unless `silent`, the addition is
    /// logged so that [`Board::undo_move`] can revert it.
    pub fn add_piece(&mut self, piece: Piece, silent: bool) {
        debug_assert!(!piece.is_empty(), "adding an empty piece");
        debug_assert!(valid_position(piece.position), "adding off the board");
        if piece.is_empty() {
            return;
        }

        let position = piece.position;
        self.squares[position.row as usize][position.column as usize] = piece;
        self.occupied_mut(piece.color).insert(position);
        if piece.piece_type == PieceType::King {
            match piece.color {
                Color::White => self.white_king = position,
                _ => self.black_king = position,
            }
        }
        self.evaluation += piece_score(&piece);
        self.hash ^= Zobrist::piece(piece.color, piece.piece_type, position);

        if !silent {
            self.log.push(Action::Add(piece));
        }
    }

    /// Clear `piece`'s square. Unless `silent`, the removal is logged.
    pub fn remove_piece(&mut self, piece: Piece, silent: bool) {
        debug_assert!(!piece.is_empty(), "removing an empty piece");
        if piece.is_empty() {
            return;
        }

        let position = piece.position;
        self.squares[position.row as usize][position.column as usize] = Piece::empty(position);
        self.occupied_mut(piece.color).remove(&position);
        self.evaluation -= piece_score(&piece);
        self.hash ^= Zobrist::piece(piece.color, piece.piece_type, position);

        if !silent {
            self.log.push(Action::Remove(piece));
        }
    }

    // -------------------------------------------------------------------------
    // Moves
    // -------------------------------------------------------------------------

    /// Apply a pseudo-legal move. Legality is the caller's concern.
    ///
    /// The null move, or a move from an empty square, is recorded as an empty
    /// log segment so that a matching [`Board::undo_move`] stays paired.
    pub fn make_move(&mut self, mv: Move) {
        let piece = self.piece_at(mv.from);

        if !mv.is_null() && !piece.is_empty() && valid_position(mv.to) {
            if Self::is_castle(&piece, mv) {
                self.make_castle(piece, mv);
            } else if piece.piece_type == PieceType::Pawn
                && mv.from.column != mv.to.column
                && self.square(mv.to).is_empty()
            {
                self.make_en_passant(piece, mv);
            } else {
                self.make_standard_move(piece, mv);
            }
        }

        self.log.push(Action::Separator);
    }

    fn is_castle(piece: &Piece, mv: Move) -> bool {
        piece.piece_type == PieceType::King
            && !piece.has_moved
            && mv.from.column == 4
            && mv.from.row == mv.to.row
            && (mv.to.column - mv.from.column).abs() == 2
    }

    fn make_castle(&mut self, king: Piece, mv: Move) {
        let row = mv.from.row;
        let (rook_from, rook_to) = if mv.to.column > mv.from.column {
            (7, 5)
        } else {
            (0, 3)
        };
        let rook = *self.square(Position::new(row, rook_from));

        self.remove_piece(king, false);
        if rook.piece_type == PieceType::Rook {
            self.remove_piece(rook, false);
        }
        self.add_piece(king.moved_to(mv.to), false);
        if rook.piece_type == PieceType::Rook {
            self.add_piece(rook.moved_to(Position::new(row, rook_to)), false);
        }
    }

    fn make_en_passant(&mut self, pawn: Piece, mv: Move) {
        let captured = *self.square(Position::new(mv.from.row, mv.to.column));
        if !captured.is_empty() {
            self.remove_piece(captured, false);
        }
        self.remove_piece(pawn, false);
        self.add_piece(pawn.moved_to(mv.to), false);
    }

    fn make_standard_move(&mut self, piece: Piece, mv: Move) {
        let target = *self.square(mv.to);
        if !target.is_empty() {
            self.remove_piece(target, false);
        }
        self.remove_piece(piece, false);

        let mut moved = piece.moved_to(mv.to);
        if mv.promotion != PieceType::None
            && piece.piece_type == PieceType::Pawn
            && mv.to.row == piece.color.last_rank()
        {
            moved.piece_type = mv.promotion;
        }
        self.add_piece(moved, false);
    }

    /// Revert the most recent move. Returns false when there is nothing to undo.
    pub fn undo_move(&mut self) -> bool {
        match self.log.last() {
            Some(Action::Separator) => {
                self.log.pop();
            }
            _ => return false,
        }

        while let Some(&action) = self.log.last() {
            match action {
                Action::Separator => break,
                Action::Add(piece) => self.remove_piece(piece, true),
                Action::Remove(piece) => self.add_piece(piece, true),
            }
            self.log.pop();
        }
        true
    }

    /// Square of an enemy pawn that has just made its double step, if the
    /// last move was exactly that.
    pub(crate) fn last_double_step(&self) -> Option<Position> {
        let n = self.log.len();
        if n < 3 {
            return None;
        }
        match (&self.log[n - 3], &self.log[n - 2], &self.log[n - 1]) {
            (Action::Remove(before), Action::Add(after), Action::Separator)
                if before.piece_type == PieceType::Pawn
                    && after.piece_type == PieceType::Pawn
                    && !before.has_moved
                    && before.position.column == after.position.column
                    && (before.position.row - after.position.row).abs() == 2 =>
            {
                Some(after.position)
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// One line per row, `X` for squares `color` attacks and `.` elsewhere.
    pub fn attacked_squares_string(&self, color: Color) -> String {
        let mut out = String::with_capacity(72);
        for row in 0..8 {
            for column in 0..8 {
                let attacked = self.is_attacked_by(Position::new(row, column), color);
                out.push(if attacked { 'X' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.squares {
            let line: String = row.iter().map(Piece::symbol).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
