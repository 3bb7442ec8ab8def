use std::io::{self, BufRead, Write};

use chessbot::board::Board;
use chessbot::config::SearchConfig;
use chessbot::engine::get_best_move;
use chessbot::error::ChessResult;
use chessbot::movegen::GameState;
use chessbot::moves::Move;
use chessbot::piece::Color;

/// Human plays White from the console, the engine answers as Black.
/// An optional first argument names a JSON search config.
fn main() -> ChessResult<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SearchConfig::from_file(path)?,
        None => SearchConfig::default(),
    };

    let mut board = Board::new();
    let mut color = Color::White;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let moves = board.get_moves(color);
        match board.game_state(color, &moves) {
            GameState::Checkmate => {
                println!("{board}\nCheckmate, {:?} wins", color.opposite());
                return Ok(());
            }
            GameState::Stalemate => {
                println!("{board}\nStalemate");
                return Ok(());
            }
            GameState::Unfinished => {}
        }

        println!("Evaluation: {}", board.evaluate());
        println!("{board}");

        if color == Color::White {
            let legal: Vec<String> = board.legal_moves(color).iter().map(Move::to_notation).collect();
            println!("Legal moves: {}", legal.join(" "));
            print!("Enter move for white (or 'undo', 'attacks'): ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line?;
            match line.trim() {
                "undo" => {
                    // Take back the engine's reply and the player's move.
                    board.undo_move();
                    board.undo_move();
                    continue;
                }
                "attacks" => {
                    println!("{}", board.attacked_squares_string(Color::Black));
                    continue;
                }
                input => {
                    let result = Move::from_notation(input)
                        .and_then(|mv| board.make_legal_move(mv, color));
                    if let Err(e) = result {
                        println!("{e}");
                        continue;
                    }
                }
            }
        } else {
            match get_best_move(&mut board, color, &config) {
                Some(result) => {
                    board.make_move(result.mv);
                    println!("Black moved: {} (depth {}, score {})", result.mv, result.depth, result.score);
                }
                None => return Ok(()),
            }
        }

        color = color.opposite();
        println!();
    }
}
