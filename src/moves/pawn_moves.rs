//! Pawn capture tables and push targets.

use crate::board::bitboard::square_bb;
use crate::game_state::chess_types::{Bitboard, Color, Square};
use crate::moves::king_moves::step_bit;

/// `[color][square]` diagonal capture targets.
pub const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [generate_pawn_attacks(1), generate_pawn_attacks(-1)];

#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][square as usize]
}

/// Signed square offset of a single push.
#[inline]
pub const fn pawn_push_offset(color: Color) -> i8 {
    match color {
        Color::Light => 8,
        Color::Dark => -8,
    }
}

#[inline]
pub const fn pawn_home_rank(color: Color) -> u8 {
    match color {
        Color::Light => 1,
        Color::Dark => 6,
    }
}

#[inline]
pub const fn pawn_promotion_rank(color: Color) -> u8 {
    match color {
        Color::Light => 7,
        Color::Dark => 0,
    }
}

/// Square one step forward for `color`. Caller guarantees the pawn is not on
/// its promotion rank.
#[inline]
pub const fn forward(color: Color, square: Square) -> Square {
    (square as i8 + pawn_push_offset(color)) as Square
}

/// Single and double push targets for a pawn given board occupancy.
pub fn pawn_pushes(color: Color, square: Square, occupancy: Bitboard) -> Bitboard {
    if square / 8 == pawn_promotion_rank(color) {
        return 0;
    }
    let one = forward(color, square);
    if occupancy & square_bb(one) != 0 {
        return 0;
    }
    let mut pushes = square_bb(one);
    if square / 8 == pawn_home_rank(color) {
        let two = forward(color, one);
        if occupancy & square_bb(two) == 0 {
            pushes |= square_bb(two);
        }
    }
    pushes
}

const fn generate_pawn_attacks(rank_step: i32) -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        table[sq] = step_bit(file - 1, rank + rank_step) | step_bit(file + 1, rank + rank_step);
        sq += 1;
    }

    table
}
