//! Bitboard primitives: single-square masks, rank/file masks and bit
//! iteration helpers.

use crate::game_state::chess_types::{Bitboard, Square};

pub const EMPTY: Bitboard = 0;
pub const UNIVERSE: Bitboard = !0;

pub const FILE_A: Bitboard = 0x0101_0101_0101_0101;
pub const FILE_H: Bitboard = FILE_A << 7;
pub const RANK_1: Bitboard = 0xFF;
pub const RANK_8: Bitboard = RANK_1 << 56;

pub const RANKS: [Bitboard; 8] = generate_rank_masks();
pub const FILES: [Bitboard; 8] = generate_file_masks();

#[inline]
pub const fn square_bb(square: Square) -> Bitboard {
    1u64 << square
}

#[inline]
pub const fn rank_of(square: Square) -> u8 {
    square / 8
}

#[inline]
pub const fn file_of(square: Square) -> u8 {
    square % 8
}

/// Least significant set square. Caller guarantees `bb != 0`.
#[inline]
pub const fn lsb(bb: Bitboard) -> Square {
    bb.trailing_zeros() as Square
}

/// Remove and return the least significant set square.
#[inline]
pub fn pop_lsb(bb: &mut Bitboard) -> Square {
    let square = lsb(*bb);
    *bb &= *bb - 1;
    square
}

/// Iterate the set squares of a bitboard, low to high.
#[inline]
pub const fn squares(bb: Bitboard) -> SquareIter {
    SquareIter(bb)
}

#[derive(Debug, Clone, Copy)]
pub struct SquareIter(Bitboard);

impl Iterator for SquareIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(pop_lsb(&mut self.0))
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SquareIter {}

const fn generate_rank_masks() -> [Bitboard; 8] {
    let mut table = [0u64; 8];
    let mut rank = 0usize;
    while rank < 8 {
        table[rank] = RANK_1 << (rank * 8);
        rank += 1;
    }
    table
}

const fn generate_file_masks() -> [Bitboard; 8] {
    let mut table = [0u64; 8];
    let mut file = 0usize;
    while file < 8 {
        table[file] = FILE_A << file;
        file += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_and_file_masks_cover_board_once() {
        let ranks = RANKS.iter().fold(0u64, |acc, r| acc | r);
        let files = FILES.iter().fold(0u64, |acc, f| acc | f);
        assert_eq!(ranks, UNIVERSE);
        assert_eq!(files, UNIVERSE);
        assert_eq!(RANKS[7], RANK_8);
        assert_eq!(FILES[7], FILE_H);
    }

    #[test]
    fn pop_lsb_drains_in_ascending_order() {
        let mut bb = square_bb(3) | square_bb(40) | square_bb(63);
        assert_eq!(pop_lsb(&mut bb), 3);
        assert_eq!(pop_lsb(&mut bb), 40);
        assert_eq!(pop_lsb(&mut bb), 63);
        assert_eq!(bb, EMPTY);
    }

    #[test]
    fn square_iter_reports_exact_len() {
        let bb = RANK_1 | square_bb(63);
        let it = squares(bb);
        assert_eq!(it.len(), 9);
        assert_eq!(it.last(), Some(63));
    }
}
