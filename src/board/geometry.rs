//! Square-to-square geometry: the eight ray directions, the direction from one
//! square to another, and the squares strictly between two aligned squares.
//!
//! Direction ids are ordered so that even ids are orthogonal (rook lines) and
//! odd ids are diagonal (bishop lines). Pin detection relies on this parity.

use crate::game_state::chess_types::{Bitboard, Square};

/// `(file_step, rank_step)` per direction id: N, NE, E, SE, S, SW, W, NW.
pub const DIRECTION_STEPS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Returned by [`direction`] when two squares share no line.
pub const NO_DIRECTION: u8 = 8;

static DIRECTIONS: [[u8; 64]; 64] = generate_directions();
static BETWEEN: [[Bitboard; 64]; 64] = generate_between();

/// Direction id from `from` toward `to`, or [`NO_DIRECTION`].
#[inline]
pub fn direction(from: Square, to: Square) -> u8 {
    DIRECTIONS[from as usize][to as usize]
}

/// Squares strictly between `a` and `b` when aligned, otherwise empty.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    BETWEEN[a as usize][b as usize]
}

#[inline]
pub const fn is_diagonal(direction: u8) -> bool {
    direction % 2 == 1
}

/// Walk one ray from `square`, stopping on (and including) the first
/// occupied square.
pub fn trace_ray(square: Square, direction: u8, occupancy: Bitboard) -> Bitboard {
    let (df, dr) = DIRECTION_STEPS[direction as usize];
    let mut file = i32::from(square % 8) + df;
    let mut rank = i32::from(square / 8) + dr;
    let mut attacks = 0u64;

    while on_board(file, rank) {
        let bit = 1u64 << (rank * 8 + file);
        attacks |= bit;
        if occupancy & bit != 0 {
            break;
        }
        file += df;
        rank += dr;
    }

    attacks
}

const fn on_board(file: i32, rank: i32) -> bool {
    file >= 0 && file < 8 && rank >= 0 && rank < 8
}

const fn generate_directions() -> [[u8; 64]; 64] {
    let mut table = [[NO_DIRECTION; 64]; 64];
    let mut from = 0usize;

    while from < 64 {
        let mut dir = 0usize;
        while dir < 8 {
            let (df, dr) = DIRECTION_STEPS[dir];
            let mut file = (from % 8) as i32 + df;
            let mut rank = (from / 8) as i32 + dr;
            while on_board(file, rank) {
                table[from][(rank * 8 + file) as usize] = dir as u8;
                file += df;
                rank += dr;
            }
            dir += 1;
        }
        from += 1;
    }

    table
}

const fn generate_between() -> [[Bitboard; 64]; 64] {
    let mut table = [[0u64; 64]; 64];
    let mut from = 0usize;

    while from < 64 {
        let mut dir = 0usize;
        while dir < 8 {
            let (df, dr) = DIRECTION_STEPS[dir];
            let mut file = (from % 8) as i32 + df;
            let mut rank = (from / 8) as i32 + dr;
            let mut walked = 0u64;
            while on_board(file, rank) {
                let target = (rank * 8 + file) as usize;
                table[from][target] = walked;
                walked |= 1u64 << target;
                file += df;
                rank += dr;
            }
            dir += 1;
        }
        from += 1;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::bitboard::square_bb;

    #[test]
    fn between_a1_h8_is_the_inner_diagonal() {
        let expected = [9u8, 18, 27, 36, 45, 54]
            .iter()
            .fold(0u64, |acc, sq| acc | square_bb(*sq));
        assert_eq!(between(0, 63), expected);
        assert_eq!(between(63, 0), expected);
    }

    #[test]
    fn unaligned_squares_have_no_direction() {
        // b1 to c3 is a knight hop.
        assert_eq!(direction(1, 18), NO_DIRECTION);
        assert_eq!(between(1, 18), 0);
    }

    #[test]
    fn direction_parity_separates_line_types() {
        // e1 -> e8 is north, e1 -> h4 is north-east.
        assert_eq!(direction(4, 60), 0);
        assert!(!is_diagonal(direction(4, 60)));
        assert!(is_diagonal(direction(4, 31)));
        assert_eq!(between(4, 5), 0);
    }
}
