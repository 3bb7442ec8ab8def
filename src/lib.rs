pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod position;
pub mod zobrist;
