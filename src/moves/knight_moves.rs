use crate::game_state::chess_types::{Bitboard, Square};
use crate::moves::king_moves::step_bit;

const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KNIGHT_ATTACKS: [Bitboard; 64] = generate_knight_attacks();

#[inline]
pub const fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square as usize]
}

const fn generate_knight_attacks() -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut jump = 0usize;
        while jump < 8 {
            let (df, dr) = KNIGHT_JUMPS[jump];
            table[sq] |= step_bit(file + df, rank + dr);
            jump += 1;
        }
        sq += 1;
    }

    table
}
