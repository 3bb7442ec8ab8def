use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::piece::{Color, PieceType};
use crate::position::Position;

/// Fixed seed so hashes are reproducible between runs.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Per-{color, piece type, square} keys, indexed `[color][type][square]`.
/// Slot 0 of each dimension (uncolored / no piece) stays zero.
pub struct Zobrist {
    pieces: [[[u64; 64]; 7]; 3],
}

static ZOBRIST: LazyLock<Zobrist> = LazyLock::new(Zobrist::new);

impl Zobrist {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut pieces = [[[0u64; 64]; 7]; 3];
        for color in pieces.iter_mut().skip(1) {
            for piece_type in color.iter_mut().skip(1) {
                for key in piece_type.iter_mut() {
                    *key = rng.next_u64();
                }
            }
        }
        Zobrist { pieces }
    }

    /// Key toggled into the board hash whenever such a piece is added to or
    /// removed from `position`.
    #[inline]
    pub fn piece(color: Color, piece_type: PieceType, position: Position) -> u64 {
        ZOBRIST.pieces[color as usize][piece_type as usize][position.index()]
    }
}
