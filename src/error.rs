//! Errors raised where untrusted input enters the engine: move notation typed
//! by a player, moves submitted for the side to move, and configuration files.

use thiserror::Error;

use crate::moves::Move;

#[derive(Error, Debug)]
pub enum ChessError {
    #[error("invalid move notation '{0}' (expected e.g. e2e4 or e7e8q)")]
    InvalidNotation(String),

    #[error("illegal move: {0}")]
    IllegalMove(Move),

    #[error("invalid search config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ChessResult<T> = Result<T, ChessError>;
