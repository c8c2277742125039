//! Rook rays by direct ray walking.
//!
//! These are the reference attacks the magic tables are built from and
//! verified against. Search code uses `AttackTables::rook_attacks` instead.

use crate::board::bitboard::{file_of, rank_of, FILES, RANKS};
use crate::board::geometry::trace_ray;
use crate::game_state::chess_types::{Bitboard, Square};

const ROOK_DIRECTIONS: [u8; 4] = [0, 2, 4, 6];

/// Rook attacks from `square` given blockers in `occupancy`.
pub fn rook_ray_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    ROOK_DIRECTIONS
        .iter()
        .fold(0u64, |acc, dir| acc | trace_ray(square, *dir, occupancy))
}

/// Blocker squares that can change a rook's reach from `square`.
///
/// The far edge of each ray is dropped because a piece there never shortens
/// the ray.
pub fn rook_relevant_mask(square: Square) -> Bitboard {
    let rank = rank_of(square) as usize;
    let file = file_of(square) as usize;
    let rank_edges = (FILES[0] | FILES[7]) & RANKS[rank];
    let file_edges = (RANKS[0] | RANKS[7]) & FILES[file];
    rook_ray_attacks(square, 0) & !(rank_edges | file_edges)
}

#[cfg(test)]
mod tests {
    use super::{rook_ray_attacks, rook_relevant_mask};

    #[test]
    fn rook_rays_from_d4_have_fourteen_squares() {
        assert_eq!(rook_ray_attacks(27, 0).count_ones(), 14);
    }

    #[test]
    fn rook_blocker_stops_ray() {
        let blocker_on_a4 = 1u64 << 24;
        let attacks = rook_ray_attacks(0, blocker_on_a4);

        assert_ne!(attacks & (1u64 << 24), 0);
        assert_eq!(attacks & (1u64 << 32), 0);
    }

    #[test]
    fn relevant_mask_sizes_match_known_counts() {
        assert_eq!(rook_relevant_mask(0).count_ones(), 12);
        assert_eq!(rook_relevant_mask(27).count_ones(), 10);
        assert_eq!(rook_relevant_mask(1).count_ones(), 11);
    }
}
