//! Zobrist hashing keys.
//!
//! Keys come from a seeded `StdRng`, so hashes are deterministic across runs.
//! Each castle right has its own key, XORed in while the right is held.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::bitboard::squares;
use crate::game_state::chess_types::*;

const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug)]
pub struct ZobristKeys {
    piece_square: [[[u64; 64]; 6]; 2],
    castle: [u64; 4],
    en_passant_file: [u64; 8],
    side_to_move: u64,
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

/// Process-wide key set.
#[inline]
pub fn zobrist_keys() -> &'static ZobristKeys {
    KEYS.get_or_init(|| ZobristKeys::generate(ZOBRIST_SEED))
}

impl ZobristKeys {
    fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut piece_square = [[[0u64; 64]; 6]; 2];
        for color in &mut piece_square {
            for piece in color {
                for key in piece {
                    *key = rng.random();
                }
            }
        }

        let mut castle = [0u64; 4];
        for key in &mut castle {
            *key = rng.random();
        }

        let mut en_passant_file = [0u64; 8];
        for key in &mut en_passant_file {
            *key = rng.random();
        }

        Self {
            piece_square,
            castle,
            en_passant_file,
            side_to_move: rng.random(),
        }
    }

    #[inline]
    pub fn piece_square(&self, color: Color, piece: PieceKind, square: Square) -> u64 {
        self.piece_square[color.index()][piece.index()][square as usize]
    }

    /// Key for one castle right, indexed like [`CastleRights`].
    #[inline]
    pub fn castle(&self, right: usize) -> u64 {
        self.castle[right]
    }

    #[inline]
    pub fn en_passant_file(&self, square: Square) -> u64 {
        self.en_passant_file[(square % 8) as usize]
    }

    /// XORed in when dark is to move.
    #[inline]
    pub fn side_to_move(&self) -> u64 {
        self.side_to_move
    }

    /// Hash of a position from scratch.
    pub fn compute(&self, state: &State) -> u64 {
        let mut key = 0u64;

        for color in Color::BOTH {
            for piece in PieceKind::ALL {
                for sq in squares(state.piece_board(color, piece)) {
                    key ^= self.piece_square(color, piece, sq);
                }
            }
        }

        for (right, held) in state.castle_rights().iter().enumerate() {
            if *held {
                key ^= self.castle(right);
            }
        }

        if let Some(ep) = state.en_passant_square() {
            key ^= self.en_passant_file(ep);
        }

        if state.side_to_move() == Color::Dark {
            key ^= self.side_to_move;
        }

        key
    }
}

#[cfg(test)]
mod tests {
    use super::zobrist_keys;
    use crate::game_state::chess_types::State;

    #[test]
    fn starting_position_hash_is_deterministic() {
        let a = State::starting_position().expect("start should build");
        let b = State::starting_position().expect("start should build");
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash(), zobrist_keys().compute(&a));
    }

    #[test]
    fn side_to_move_changes_hash() {
        let w = State::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let b = State::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert_ne!(w.hash(), b.hash());
    }

    #[test]
    fn castling_rights_change_hash() {
        let with_rights = State::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let one_right = State::from_fen("4k3/8/8/8/8/8/8/R3K2R w K - 0 1").expect("FEN should parse");
        let without_rights = State::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").expect("FEN should parse");
        assert_ne!(with_rights.hash(), one_right.hash());
        assert_ne!(one_right.hash(), without_rights.hash());
    }

    #[test]
    fn en_passant_file_changes_hash() {
        let no_ep = State::from_fen("4k3/8/8/8/4Pp2/8/8/4K3 b - - 0 1").expect("FEN should parse");
        let ep = State::from_fen("4k3/8/8/8/4Pp2/8/8/4K3 b - e3 0 1").expect("FEN should parse");
        assert_ne!(no_ep.hash(), ep.hash());
    }
}
