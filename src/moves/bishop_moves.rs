//! Bishop rays by direct ray walking, plus the relevant-occupancy mask used
//! to index the magic tables.

use crate::board::bitboard::{FILE_A, FILE_H, RANK_1, RANK_8};
use crate::board::geometry::trace_ray;
use crate::game_state::chess_types::{Bitboard, Square};

const BISHOP_DIRECTIONS: [u8; 4] = [1, 3, 5, 7];

pub fn bishop_ray_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    BISHOP_DIRECTIONS
        .iter()
        .fold(0u64, |acc, dir| acc | trace_ray(square, *dir, occupancy))
}

/// Diagonal blocker squares for `square`, board rim excluded.
pub fn bishop_relevant_mask(square: Square) -> Bitboard {
    bishop_ray_attacks(square, 0) & !(FILE_A | FILE_H | RANK_1 | RANK_8)
}
