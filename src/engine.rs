// =============================================================================
// Chess AI Engine
//
// Minimax with alpha-beta pruning, driven by iterative deepening under a
// wall-clock budget. White maximizes and Black minimizes the board's running
// evaluation, so scores are always from White's perspective.
//
// The search runs on a scoped worker thread that owns the board for the
// duration of the call. The caller polls the clock and, when the budget is
// spent, raises a shared stop flag. The worker checks the flag at every node
// and before every move, unwinds through undo_move, and the depth in
// progress is thrown away: only fully searched depths produce a result.
//
// Legality is checked lazily: a move that leaves the mover in check is
// skipped when it is reached, so moves cut off by pruning are never tested.
// =============================================================================

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Board;
use crate::config::SearchConfig;
use crate::evaluation::{material_value, positional_gain, PAWN_VALUE};
use crate::movegen::GameState;
use crate::moves::Move;
use crate::piece::{Color, PieceType};

/// Base score for a checkmate. The remaining depth is added on top so that
/// a quicker mate scores more extreme than a slower one.
pub const MATE_SCORE: i32 = 1_000_000;

/// Search window bound, well clear of `i32` overflow.
pub const INFINITY: i32 = i32::MAX / 2;

/// The result of a move search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub mv: Move,
    pub score: i32,
    /// Deepest fully completed depth the move comes from.
    pub depth: u32,
    pub nodes: u64,
}

/// Score of a position in which `color` has been checkmated.
fn mated_score(color: Color, depth: u32) -> i32 {
    let score = MATE_SCORE + depth as i32;
    if color == Color::White {
        -score
    } else {
        score
    }
}

pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_SCORE
}

// =============================================================================
// Move ordering
// =============================================================================

/// Sort key, compared descending: the previous depth's best move, then the
/// most valuable victim, then the least valuable attacker, then the biggest
/// improvement in square bonus.
fn ordering_key(board: &Board, mv: &Move, previous_best: Move) -> (bool, i32, i32, i32) {
    let mover = board.piece_at(mv.from);
    let victim = board.piece_at(mv.to);
    // En passant lands on an empty square but still takes a pawn.
    let en_passant =
        victim.is_empty() && mover.piece_type == PieceType::Pawn && mv.from.column != mv.to.column;
    let victim_value = if en_passant {
        PAWN_VALUE
    } else {
        material_value(victim.piece_type)
    };
    (
        !previous_best.is_null() && *mv == previous_best,
        victim_value,
        -material_value(mover.piece_type),
        positional_gain(&mover, mv.to),
    )
}

/// Sort moves so the most promising are searched first.
pub fn order_moves(board: &Board, moves: &mut [Move], previous_best: Move) {
    moves.sort_by_key(|mv| Reverse(ordering_key(board, mv, previous_best)));
}

// =============================================================================
// Search
// =============================================================================

struct Searcher<'a> {
    stop: &'a AtomicBool,
    nodes: u64,
    /// Best move of the last completed depth. Used once, to order the root.
    previous_best: Move,
}

impl<'a> Searcher<'a> {
    fn new(stop: &'a AtomicBool) -> Self {
        Searcher {
            stop,
            nodes: 0,
            previous_best: Move::NULL,
        }
    }

    fn cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Minimax value of the position with `color` to move, or `None` if the
    /// search was cancelled.
    fn minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        color: Color,
    ) -> Option<i32> {
        if self.cancelled() {
            return None;
        }
        self.nodes += 1;

        let mut moves = board.get_moves(color);
        match board.game_state(color, &moves) {
            GameState::Checkmate => return Some(mated_score(color, depth)),
            GameState::Stalemate => return Some(0),
            GameState::Unfinished => {}
        }
        if depth == 0 {
            return Some(board.evaluate());
        }

        order_moves(board, &mut moves, Move::NULL);

        let maximizing = color == Color::White;
        let mut best = if maximizing { -INFINITY } else { INFINITY };
        for mv in moves {
            if self.cancelled() {
                return None;
            }

            board.make_move(mv);
            if board.is_in_check(color) {
                board.undo_move();
                continue;
            }
            let score = self.minimax(board, depth - 1, alpha, beta, color.opposite());
            board.undo_move();
            let score = score?;

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        Some(best)
    }

    /// Best move and its value at `depth`, or `None` if cancelled. The caller
    /// guarantees `color` has at least one legal move.
    fn search_root(&mut self, board: &mut Board, color: Color, depth: u32) -> Option<(Move, i32)> {
        let mut moves = board.get_moves(color);
        order_moves(board, &mut moves, self.previous_best);
        self.previous_best = Move::NULL;

        let maximizing = color == Color::White;
        let mut alpha = -INFINITY;
        let mut beta = INFINITY;
        let mut best_move = Move::NULL;
        let mut best_score = 0;

        for mv in moves {
            if self.cancelled() {
                return None;
            }

            board.make_move(mv);
            if board.is_in_check(color) {
                board.undo_move();
                continue;
            }
            let score = self.minimax(board, depth - 1, alpha, beta, color.opposite());
            board.undo_move();
            let score = score?;

            let improved = if maximizing {
                score > best_score
            } else {
                score < best_score
            };
            if best_move.is_null() || improved {
                best_move = mv;
                best_score = score;
            }
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }

        if best_move.is_null() {
            None
        } else {
            Some((best_move, best_score))
        }
    }

    fn iterative_deepening(
        &mut self,
        board: &mut Board,
        color: Color,
        max_depth: u32,
    ) -> Option<SearchResult> {
        let mut best: Option<SearchResult> = None;

        for depth in 1..=max_depth.max(1) {
            self.previous_best = best.map(|b| b.mv).unwrap_or(Move::NULL);

            let Some((mv, score)) = self.search_root(board, color, depth) else {
                debug!(depth, "search cancelled; discarding partial depth");
                break;
            };
            debug!(depth, score, best = %mv, nodes = self.nodes, "depth complete");
            best = Some(SearchResult {
                mv,
                score,
                depth,
                nodes: self.nodes,
            });

            if is_mate_score(score) {
                break;
            }
        }

        best
    }
}

// =============================================================================
// Move selection
// =============================================================================

/// Pick a move for `color`, searching until the configured time budget runs
/// out or `max_depth` is complete.
///
/// Returns `None` when `color` has no legal move. The board is left exactly
/// as it was found, whether or not the search was cut short.
pub fn get_best_move(board: &mut Board, color: Color, config: &SearchConfig) -> Option<SearchResult> {
    let legal_moves = board.legal_moves(color);
    let fallback = *legal_moves.first()?;

    let started = Instant::now();
    let stop = AtomicBool::new(false);

    let searched = thread::scope(|scope| {
        let stop = &stop;
        let board = &mut *board;
        let worker = scope.spawn(move || Searcher::new(stop).iterative_deepening(board, color, config.max_depth));

        if let Some(limit) = config.time_limit() {
            while !worker.is_finished() && started.elapsed() < limit {
                thread::sleep(config.poll_interval());
            }
            stop.store(true, Ordering::Relaxed);
        }

        worker.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    });

    // Not even depth 1 finished in time: any legal move beats the null move.
    let result = searched.unwrap_or(SearchResult {
        mv: fallback,
        score: board.evaluate(),
        depth: 0,
        nodes: 0,
    });

    info!(
        color = ?color,
        best = %result.mv,
        score = result.score,
        depth = result.depth,
        nodes = result.nodes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "move chosen"
    );
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;
    use crate::position::Position;

    fn pos(row: i8, column: i8) -> Position {
        Position::new(row, column)
    }

    fn mv(from: (i8, i8), to: (i8, i8)) -> Move {
        Move::new(pos(from.0, from.1), pos(to.0, to.1))
    }

    fn place(board: &mut Board, piece_type: PieceType, color: Color, at: (i8, i8)) {
        board.add_piece(Piece::new(piece_type, color, pos(at.0, at.1)), true);
    }

    /// Plain minimax without pruning or ordering, same leaf rules.
    fn unpruned(board: &mut Board, depth: u32, color: Color) -> i32 {
        let moves = board.get_moves(color);
        match board.game_state(color, &moves) {
            GameState::Checkmate => return mated_score(color, depth),
            GameState::Stalemate => return 0,
            GameState::Unfinished => {}
        }
        if depth == 0 {
            return board.evaluate();
        }
        let scores = legal_children(board, color, |board| unpruned(board, depth - 1, color.opposite()));
        best_of(color, scores)
    }

    fn legal_children(board: &mut Board, color: Color, mut f: impl FnMut(&mut Board) -> i32) -> Vec<i32> {
        let mut scores = Vec::new();
        for mv in board.get_moves(color) {
            board.make_move(mv);
            if !board.is_in_check(color) {
                scores.push(f(board));
            }
            board.undo_move();
        }
        scores
    }

    fn best_of(color: Color, scores: Vec<i32>) -> i32 {
        if color == Color::White {
            scores.into_iter().max().unwrap_or(-INFINITY)
        } else {
            scores.into_iter().min().unwrap_or(INFINITY)
        }
    }

    fn root_value(board: &mut Board, color: Color, depth: u32) -> i32 {
        let scores = legal_children(board, color, |board| unpruned(board, depth - 1, color.opposite()));
        best_of(color, scores)
    }

    #[test]
    fn previous_best_move_sorts_first() {
        let board = Board::new();
        let mut moves = board.get_moves(Color::White);
        let favourite = mv((7, 1), (5, 0)); // Na3, a poor square
        order_moves(&board, &mut moves, favourite);
        assert_eq!(moves[0], favourite);

        order_moves(&board, &mut moves, Move::NULL);
        assert_ne!(moves[0], favourite);
    }

    #[test]
    fn captures_sorted_by_victim_then_attacker() {
        let mut board = Board::empty();
        place(&mut board, PieceType::King, Color::White, (7, 7));
        place(&mut board, PieceType::King, Color::Black, (0, 7));
        place(&mut board, PieceType::Pawn, Color::White, (4, 4));
        place(&mut board, PieceType::Queen, Color::White, (5, 3));
        place(&mut board, PieceType::Queen, Color::Black, (3, 3));
        place(&mut board, PieceType::Pawn, Color::Black, (3, 5));

        let pawn_takes_queen = mv((4, 4), (3, 3));
        let queen_takes_queen = mv((5, 3), (3, 3));
        let pawn_takes_pawn = mv((4, 4), (3, 5));

        let mut moves = board.get_moves(Color::White);
        order_moves(&board, &mut moves, Move::NULL);
        let rank = |m: Move| moves.iter().position(|&x| x == m).expect("move generated");

        assert_eq!(moves[0], pawn_takes_queen);
        assert!(rank(pawn_takes_queen) < rank(queen_takes_queen));
        assert!(rank(queen_takes_queen) < rank(pawn_takes_pawn));
        assert!(rank(pawn_takes_pawn) < rank(mv((4, 4), (3, 4))), "captures before quiet moves");
    }

    #[test]
    fn en_passant_sorts_as_a_pawn_capture() {
        let mut board = Board::empty();
        place(&mut board, PieceType::King, Color::White, (7, 7));
        place(&mut board, PieceType::King, Color::Black, (0, 0));
        let mut pawn = Piece::new(PieceType::Pawn, Color::White, pos(3, 4));
        pawn.has_moved = true;
        board.add_piece(pawn, true);
        place(&mut board, PieceType::Pawn, Color::Black, (1, 3));
        board.make_move(mv((1, 3), (3, 3)));

        let en_passant = mv((3, 4), (2, 3));
        let mut moves = board.get_moves(Color::White);
        assert!(moves.contains(&en_passant));
        order_moves(&board, &mut moves, Move::NULL);
        assert_eq!(moves[0], en_passant);
    }

    #[test]
    fn quiet_moves_prefer_positional_gain() {
        let board = Board::new();
        let mut moves = board.get_moves(Color::White);
        order_moves(&board, &mut moves, Move::NULL);
        // Pawns are the cheapest movers; e4/d4 gain the most square bonus.
        let top: Vec<Move> = moves[..2].to_vec();
        assert!(top.contains(&mv((6, 4), (4, 4))));
        assert!(top.contains(&mv((6, 3), (4, 3))));
    }

    #[test]
    fn finds_back_rank_mate_in_one() {
        let mut board = Board::empty();
        place(&mut board, PieceType::King, Color::White, (7, 6));
        place(&mut board, PieceType::Rook, Color::White, (7, 0));
        place(&mut board, PieceType::King, Color::Black, (0, 7));
        place(&mut board, PieceType::Pawn, Color::Black, (1, 6));
        place(&mut board, PieceType::Pawn, Color::Black, (1, 7));

        let result = get_best_move(&mut board, Color::White, &SearchConfig::fixed_depth(3))
            .expect("white has moves");
        assert_eq!(result.mv, mv((7, 0), (0, 0)));
        assert!(is_mate_score(result.score) && result.score > 0);
        assert_eq!(result.depth, 1, "search stops once mate is found");
    }

    #[test]
    fn black_takes_a_hanging_queen() {
        let mut board = Board::empty();
        place(&mut board, PieceType::King, Color::White, (7, 4));
        place(&mut board, PieceType::King, Color::Black, (0, 4));
        place(&mut board, PieceType::Queen, Color::White, (5, 2));
        place(&mut board, PieceType::Knight, Color::Black, (3, 3));

        let result = get_best_move(&mut board, Color::Black, &SearchConfig::fixed_depth(2))
            .expect("black has moves");
        assert_eq!(result.mv, mv((3, 3), (5, 2)));
        assert!(result.score < 0, "black is better: {}", result.score);
    }

    #[test]
    fn no_legal_moves_yields_none() {
        let mut board = Board::empty();
        place(&mut board, PieceType::King, Color::White, (7, 0));
        place(&mut board, PieceType::Queen, Color::Black, (5, 1));
        place(&mut board, PieceType::King, Color::Black, (6, 2));
        assert!(get_best_move(&mut board, Color::White, &SearchConfig::fixed_depth(2)).is_none());
    }

    #[test]
    fn fixed_depth_search_matches_unpruned_minimax() {
        let mut board = Board::new();
        board.make_move(mv((6, 4), (4, 4))); // e4
        board.make_move(mv((1, 4), (3, 4))); // e5
        board.make_move(mv((7, 6), (5, 5))); // Nf3

        let config = SearchConfig::fixed_depth(3);
        let first = get_best_move(&mut board, Color::Black, &config).expect("black has moves");
        let second = get_best_move(&mut board, Color::Black, &config).expect("black has moves");
        assert_eq!(first, second, "fixed-depth search is deterministic");
        assert_eq!(first.depth, 3);

        let expected = root_value(&mut board, Color::Black, 3);
        assert_eq!(first.score, expected);

        board.make_move(first.mv);
        assert!(!board.is_in_check(Color::Black), "chosen move is legal");
    }

    #[test]
    fn timed_search_leaves_board_untouched() {
        let mut board = Board::new();
        board.make_move(mv((6, 3), (4, 3))); // d4
        let before = (board.to_string(), board.evaluate(), board.hash(), board.log().len());

        let config = SearchConfig {
            time_limit_ms: Some(100),
            ..SearchConfig::default()
        };
        let result = get_best_move(&mut board, Color::Black, &config).expect("black has moves");

        let after = (board.to_string(), board.evaluate(), board.hash(), board.log().len());
        assert_eq!(before, after);
        assert!(!result.mv.is_null());
        assert!(board.legal_moves(Color::Black).contains(&result.mv));
    }

    #[test]
    fn timed_result_comes_from_a_completed_depth() {
        let mut board = Board::new();
        board.make_move(mv((6, 4), (4, 4))); // e4

        for budget in [20, 60, 150] {
            let config = SearchConfig {
                time_limit_ms: Some(budget),
                ..SearchConfig::default()
            };
            let timed = get_best_move(&mut board, Color::Black, &config).expect("black has moves");
            if timed.depth == 0 {
                continue;
            }
            let fixed = get_best_move(&mut board, Color::Black, &SearchConfig::fixed_depth(timed.depth))
                .expect("black has moves");
            assert_eq!(
                (timed.mv, timed.score),
                (fixed.mv, fixed.score),
                "{budget}ms search reached depth {}",
                timed.depth
            );
        }
    }

    #[test]
    fn zero_budget_still_returns_a_legal_move() {
        let mut board = Board::new();
        let config = SearchConfig {
            time_limit_ms: Some(0),
            ..SearchConfig::default()
        };
        let result = get_best_move(&mut board, Color::White, &config).expect("white has moves");
        assert!(board.legal_moves(Color::White).contains(&result.mv));
    }
}
