//! Canonical chess-rule constants.
//!
//! Starting position, draw thresholds, and the home squares castling depends
//! on.

use crate::game_state::chess_types::{Color, Square};

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Halfmove clock value at which the fifty-move rule draws.
pub const FIFTY_MOVE_LIMIT: u16 = 100;

/// Occurrence count at which a position is a repetition draw.
pub const REPETITION_LIMIT: u8 = 3;

/// Largest fullmove number a FEN may carry. The game ply is a `u16`, and
/// this leaves half of its range for moves played after loading.
pub const MAX_FULLMOVE_NUMBER: u16 = 16_384;

/// `(rook_from, rook_to)` for a king-side castle.
#[inline]
pub const fn kingside_rook_squares(color: Color) -> (Square, Square) {
    let base = color.back_rank_offset();
    (base + 7, base + 5)
}

/// `(rook_from, rook_to)` for a queen-side castle.
#[inline]
pub const fn queenside_rook_squares(color: Color) -> (Square, Square) {
    let base = color.back_rank_offset();
    (base, base + 3)
}
