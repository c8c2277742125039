//! Primitive chess types shared by the board, move generator and search.

pub use crate::game_state::game_state::State;

/// Board square index (`0..=63`, `0 == a1`, `63 == h8`).
pub type Square = u8;

/// One bit per square, bit `i` for square `i`.
pub type Bitboard = u64;

/// Sentinel for "no square" in fixed-size square arrays.
pub const NO_SQUARE: Square = 64;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::Light, Color::Dark];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::Light => 0,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Rank offset of this side's back rank (0 for light, 56 for dark).
    #[inline]
    pub const fn back_rank_offset(self) -> Square {
        match self {
            Color::Light => 0,
            Color::Dark => 56,
        }
    }
}

/// Piece kind (color is represented separately for cache-friendly layouts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    /// Material value used for the exchange score of captures.
    #[inline]
    pub const fn exchange_value(self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 300,
            PieceKind::Bishop => 325,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 1000,
        }
    }

    /// Lowercase FEN letter.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Knights, bishops, rooks and queens.
    #[inline]
    pub const fn is_big_piece(self) -> bool {
        !matches!(self, PieceKind::Pawn | PieceKind::King)
    }
}

/// Castle rights in the fixed order
/// `[light king-side, dark king-side, light queen-side, dark queen-side]`.
pub type CastleRights = [bool; 4];

pub const CASTLE_LIGHT_KINGSIDE: usize = 0;
pub const CASTLE_DARK_KINGSIDE: usize = 1;
pub const CASTLE_LIGHT_QUEENSIDE: usize = 2;
pub const CASTLE_DARK_QUEENSIDE: usize = 3;

/// Index into [`CastleRights`] for a side's king-side right.
#[inline]
pub const fn kingside_right(color: Color) -> usize {
    color.index()
}

/// Index into [`CastleRights`] for a side's queen-side right.
#[inline]
pub const fn queenside_right(color: Color) -> usize {
    color.index() + 2
}
