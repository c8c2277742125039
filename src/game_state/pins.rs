//! Absolute pins against a side's king, cached lazily on the `State`.

use crate::board::bitboard::{square_bb, squares, UNIVERSE};
use crate::board::geometry::{between, direction};
use crate::game_state::chess_types::*;

/// Pinned pieces of one side plus the pinner in each of the eight
/// directions from the king (`NO_SQUARE` where there is none).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinInfo {
    pub pinned: Bitboard,
    pub pinners: [Square; 8],
}

impl PinInfo {
    pub const NONE: PinInfo = PinInfo {
        pinned: 0,
        pinners: [NO_SQUARE; 8],
    };

    #[inline]
    pub fn is_pinned(&self, square: Square) -> bool {
        self.pinned & square_bb(square) != 0
    }

    /// Squares a piece on `square` may move to without exposing `king`:
    /// the king-pinner line including the pinner, or everything if unpinned.
    #[inline]
    pub fn allowed_targets(&self, king: Square, square: Square) -> Bitboard {
        if !self.is_pinned(square) {
            return UNIVERSE;
        }
        let pinner = self.pinners[direction(king, square) as usize];
        between(king, pinner) | square_bb(pinner)
    }
}

pub fn compute_pins(state: &State, color: Color) -> PinInfo {
    let king = state.king_square(color);
    let enemy = color.opposite();
    let tables = state.tables();

    let queens = state.piece_board(enemy, PieceKind::Queen);
    let straight = state.piece_board(enemy, PieceKind::Rook) | queens;
    let diagonal = state.piece_board(enemy, PieceKind::Bishop) | queens;
    let candidates =
        (tables.rook_attacks(king, 0) & straight) | (tables.bishop_attacks(king, 0) & diagonal);

    let mut info = PinInfo::NONE;
    for pinner in squares(candidates) {
        let blockers = between(king, pinner) & state.occupancy_all();
        if blockers.count_ones() == 1 && blockers & state.occupancy(color) != 0 {
            info.pinned |= blockers;
            info.pinners[direction(king, pinner) as usize] = pinner;
        }
    }
    info
}

impl State {
    /// Pin info for `color`, computed on first use after each mutation.
    pub fn pin_info(&self, color: Color) -> PinInfo {
        let slot = &self.pins[color.index()];
        if let Some(info) = slot.get() {
            return info;
        }
        let info = compute_pins(self, color);
        slot.set(Some(info));
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_pins_knight_on_e_file() {
        let state = State::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").expect("FEN should parse");
        let info = state.pin_info(Color::Light);

        assert!(info.is_pinned(12));
        assert_eq!(info.pinners[0], 60);
        let allowed = info.allowed_targets(4, 12);
        assert_ne!(allowed & square_bb(60), 0);
        assert_eq!(allowed & square_bb(13), 0);
    }

    #[test]
    fn two_blockers_do_not_pin() {
        let state = State::from_fen("4r1k1/8/8/8/4P3/8/4N3/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(state.pin_info(Color::Light).pinned, 0);
    }

    #[test]
    fn rook_on_diagonal_does_not_pin() {
        let state = State::from_fen("6k1/8/8/r7/8/2B5/8/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(state.pin_info(Color::Light).pinned, 0);
    }

    #[test]
    fn cache_is_cleared_by_make_move() {
        let mut state = State::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 b - - 0 1").expect("FEN should parse");
        assert!(state.pin_info(Color::Light).is_pinned(12));

        let mv = crate::utils::long_algebraic::parse_long_algebraic("e8f8", &state).expect("move should parse");
        state.make_move(mv);
        assert_eq!(state.pin_info(Color::Light).pinned, 0);
    }
}
