//! Packed 16-bit move.
//!
//! Layout: bits 0-5 origin, 6-11 destination, 12-13 promotion piece,
//! 14-15 special tag. The moved and captured pieces are not stored; make/unmake
//! reads them off the board.

use std::fmt;

use crate::game_state::chess_types::{PieceKind, Square};
use crate::utils::algebraic::square_to_algebraic;

const TO_SHIFT: u16 = 6;
const PROMOTION_SHIFT: u16 = 12;
const SPECIAL_SHIFT: u16 = 14;
const SQUARE_MASK: u16 = 0x3F;

/// What kind of special handling a move needs during make/unmake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialMove {
    None,
    Castle,
    Promotion,
    EnPassant,
}

impl SpecialMove {
    #[inline]
    const fn code(self) -> u16 {
        match self {
            SpecialMove::None => 0,
            SpecialMove::Castle => 1,
            SpecialMove::Promotion => 2,
            SpecialMove::EnPassant => 3,
        }
    }
}

/// Promotion pieces in encoding order.
pub const PROMOTION_PIECES: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
];

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    /// "No move". Never produced by the generator.
    pub const NIL: Move = Move(0xffff);
    /// Null move used by null-move pruning.
    pub const PASSING: Move = Move(0xfffe);

    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move((from as u16 & SQUARE_MASK) | ((to as u16 & SQUARE_MASK) << TO_SHIFT))
    }

    #[inline]
    pub const fn castle(from: Square, to: Square) -> Self {
        Self::with_special(from, to, SpecialMove::Castle, 0)
    }

    #[inline]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Self::with_special(from, to, SpecialMove::EnPassant, 0)
    }

    /// Promotion to `piece`. Pawns and kings are encoded as a queen.
    #[inline]
    pub const fn promotion(from: Square, to: Square, piece: PieceKind) -> Self {
        let code = match piece {
            PieceKind::Rook => 1,
            PieceKind::Knight => 2,
            PieceKind::Bishop => 3,
            _ => 0,
        };
        Self::with_special(from, to, SpecialMove::Promotion, code)
    }

    #[inline]
    const fn with_special(from: Square, to: Square, special: SpecialMove, promotion: u16) -> Self {
        Move(
            Self::new(from, to).0
                | ((promotion & 0x3) << PROMOTION_SHIFT)
                | (special.code() << SPECIAL_SHIFT),
        )
    }

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Move(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn from(self) -> Square {
        (self.0 & SQUARE_MASK) as Square
    }

    #[inline]
    pub const fn to(self) -> Square {
        ((self.0 >> TO_SHIFT) & SQUARE_MASK) as Square
    }

    #[inline]
    pub const fn special(self) -> SpecialMove {
        match self.0 >> SPECIAL_SHIFT {
            1 => SpecialMove::Castle,
            2 => SpecialMove::Promotion,
            3 => SpecialMove::EnPassant,
            _ => SpecialMove::None,
        }
    }

    /// Promotion piece, if this is a promotion.
    #[inline]
    pub const fn promotion_piece(self) -> Option<PieceKind> {
        match self.special() {
            SpecialMove::Promotion => Some(PROMOTION_PIECES[((self.0 >> PROMOTION_SHIFT) & 0x3) as usize]),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_nil(self) -> bool {
        self.0 == Self::NIL.0
    }

    #[inline]
    pub const fn is_passing(self) -> bool {
        self.0 == Self::PASSING.0
    }

    /// Four-character origin/destination text, e.g. `e2e4`. Promotion pieces
    /// are not included; see `utils::long_algebraic` for that.
    pub fn coordinate_text(self) -> String {
        if self.is_nil() {
            return "0000".to_owned();
        }
        if self.is_passing() {
            return "pass".to_owned();
        }
        let mut out = square_to_algebraic(self.from());
        out.push_str(&square_to_algebraic(self.to()));
        out
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NIL
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.promotion_piece() {
            Some(piece) => write!(f, "Move({}{})", self.coordinate_text(), piece.letter()),
            None => write!(f, "Move({})", self.coordinate_text()),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate_text())?;
        if let Some(piece) = self.promotion_piece() {
            write!(f, "{}", piece.letter())?;
        }
        Ok(())
    }
}
