//! King step attacks, precomputed at compile time.

use crate::board::geometry::DIRECTION_STEPS;
use crate::game_state::chess_types::{Bitboard, Square};

pub const KING_ATTACKS: [Bitboard; 64] = generate_king_attacks();

#[inline]
pub const fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square as usize]
}

const fn generate_king_attacks() -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut dir = 0usize;
        while dir < 8 {
            let (df, dr) = DIRECTION_STEPS[dir];
            table[sq] |= step_bit(file + df, rank + dr);
            dir += 1;
        }
        sq += 1;
    }

    table
}

pub(crate) const fn step_bit(file: i32, rank: i32) -> Bitboard {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }
    1u64 << (rank * 8 + file)
}

#[cfg(test)]
mod tests {
    use super::king_attacks;

    #[test]
    fn king_attacks_from_a1_has_three_targets() {
        assert_eq!(king_attacks(0).count_ones(), 3);
    }

    #[test]
    fn king_attacks_from_e4_has_eight_targets() {
        assert_eq!(king_attacks(28).count_ones(), 8);
    }
}
