//! Attack queries against a state: square safety and checkers.
//!
//! Every query takes the occupancy explicitly so king moves and the
//! en-passant safety test can ask with pieces lifted off the board.

use crate::game_state::chess_types::*;
use crate::moves::king_moves::king_attacks;
use crate::moves::knight_moves::knight_attacks;
use crate::moves::pawn_moves::pawn_attacks;

/// All `attacker_color` pieces attacking `square` under `occupancy`.
pub fn attackers_to(state: &State, square: Square, attacker_color: Color, occupancy: Bitboard) -> Bitboard {
    let tables = state.tables();
    let board = |piece| state.piece_board(attacker_color, piece);
    let queens = board(PieceKind::Queen);

    // A pawn of the other color standing on `square` would attack exactly the
    // squares an attacking pawn can stand on.
    let attackers = (pawn_attacks(attacker_color.opposite(), square) & board(PieceKind::Pawn))
        | (knight_attacks(square) & board(PieceKind::Knight))
        | (king_attacks(square) & board(PieceKind::King))
        | (tables.bishop_attacks(square, occupancy) & (board(PieceKind::Bishop) | queens))
        | (tables.rook_attacks(square, occupancy) & (board(PieceKind::Rook) | queens));

    // Pieces lifted out of `occupancy` no longer attack.
    attackers & occupancy
}

#[inline]
pub fn is_square_attacked(state: &State, square: Square, attacker_color: Color, occupancy: Bitboard) -> bool {
    attackers_to(state, square, attacker_color, occupancy) != 0
}

/// Enemy pieces giving check to `color`'s king.
#[inline]
pub fn checkers(state: &State, color: Color) -> Bitboard {
    attackers_to(state, state.king_square(color), color.opposite(), state.occupancy_all())
}
