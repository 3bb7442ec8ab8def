use chessbot::board::Board;
use chessbot::config::SearchConfig;
use chessbot::engine::get_best_move;
use chessbot::piece::Color;

const MAX_MOVES: usize = 60;

fn main() {
    tracing_subscriber::fmt::init();

    let config = SearchConfig {
        time_limit_ms: Some(500),
        ..SearchConfig::default()
    };

    let mut board = Board::new();
    let mut color = Color::White;
    let mut move_count = 0;

    while move_count < MAX_MOVES {
        match get_best_move(&mut board, color, &config) {
            Some(result) => {
                board.make_move(result.mv);
                move_count += 1;
                color = color.opposite();
            }
            None => break,
        }
    }

    let moves = board.get_moves(color);
    let state = board.game_state(color, &moves);
    eprintln!("{board}");
    eprintln!("Game over after {move_count} moves: {state:?} ({color:?} to move)");
}
