//! Pluggable board evaluation.
//!
//! Search delegates static scoring to [`BoardScorer`] so heuristics can be
//! swapped without touching search code. Scores are centipawns from the
//! given perspective.

use crate::board::bitboard::{file_of, rank_of, squares, FILES};
use crate::game_state::chess_types::*;
use crate::moves::king_moves::king_attacks;
use crate::moves::knight_moves::knight_attacks;

/// Score of a side that is mated at the root. Mate in `n` plies scores
/// `MATE_SCORE - n`.
pub const MATE_SCORE: i32 = 30_000;
/// Outside every reachable score.
pub const INF: i32 = 32_000;
/// Scores beyond this magnitude are treated as forced mates.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1_000;

pub trait BoardScorer: Send + Sync {
    /// Positive favours `perspective`.
    fn score(&self, state: &State, perspective: Color) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    pub const fn piece_value(piece: PieceKind) -> i32 {
        match piece {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 0,
        }
    }

    fn material_light_minus_dark(state: &State) -> i32 {
        PieceKind::ALL
            .into_iter()
            .map(|piece| {
                let light = state.piece_board(Color::Light, piece).count_ones() as i32;
                let dark = state.piece_board(Color::Dark, piece).count_ones() as i32;
                (light - dark) * Self::piece_value(piece)
            })
            .sum()
    }
}

impl BoardScorer for MaterialScorer {
    fn score(&self, state: &State, perspective: Color) -> i32 {
        from_perspective(Self::material_light_minus_dark(state), perspective)
    }
}

/// Material plus middlegame/endgame terms blended by game phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaperedScorer;

impl TaperedScorer {
    const DOUBLED_PAWN: i32 = 12;
    const ISOLATED_PAWN: i32 = 10;
    const OPEN_FILE_ROOK: i32 = 16;
    const SEMI_OPEN_FILE_ROOK: i32 = 8;
    const MOBILITY_WEIGHT: i32 = 2;
    /// Phase of a full set of minor and major pieces.
    const MAX_PHASE: i32 = 24;

    fn phase(state: &State) -> i32 {
        let phase: i32 = Color::BOTH
            .into_iter()
            .map(|color| {
                state.piece_board(color, PieceKind::Knight).count_ones() as i32
                    + state.piece_board(color, PieceKind::Bishop).count_ones() as i32
                    + state.piece_board(color, PieceKind::Rook).count_ones() as i32 * 2
                    + state.piece_board(color, PieceKind::Queen).count_ones() as i32 * 4
            })
            .sum();
        phase.clamp(0, Self::MAX_PHASE)
    }

    /// `(middlegame, endgame)` piece-square totals for one side.
    fn piece_squares(state: &State, color: Color) -> (i32, i32) {
        let mut mg = 0;
        let mut eg = 0;
        for piece in PieceKind::ALL {
            for sq in squares(state.piece_board(color, piece)) {
                let relative = relative_square(color, sq);
                mg += middlegame_bonus(piece, relative);
                eg += endgame_bonus(piece, relative);
            }
        }
        (mg, eg)
    }

    fn pawn_structure(state: &State, color: Color) -> i32 {
        let own = state.piece_board(color, PieceKind::Pawn);
        let enemy = state.piece_board(color.opposite(), PieceKind::Pawn);
        let mut score = 0;

        for file in 0..8usize {
            let on_file = (own & FILES[file]).count_ones() as i32;
            if on_file > 1 {
                score -= (on_file - 1) * Self::DOUBLED_PAWN;
            }
            if on_file > 0 && own & adjacent_files(file) == 0 {
                score -= on_file * Self::ISOLATED_PAWN;
            }
        }

        for sq in squares(own) {
            if is_passed_pawn(color, sq, enemy) {
                let advance = i32::from(rank_of(relative_square(color, sq)));
                score += advance * advance * 4;
            }
        }

        score
    }

    fn rook_files(state: &State, color: Color) -> i32 {
        let own_pawns = state.piece_board(color, PieceKind::Pawn);
        let all_pawns = own_pawns | state.piece_board(color.opposite(), PieceKind::Pawn);
        squares(state.piece_board(color, PieceKind::Rook))
            .map(|sq| {
                let file = FILES[file_of(sq) as usize];
                if all_pawns & file == 0 {
                    Self::OPEN_FILE_ROOK
                } else if own_pawns & file == 0 {
                    Self::SEMI_OPEN_FILE_ROOK
                } else {
                    0
                }
            })
            .sum()
    }

    fn mobility(state: &State, color: Color) -> i32 {
        let tables = state.tables();
        let occupancy = state.occupancy_all();
        let not_own = !state.occupancy(color);
        let board = |piece| state.piece_board(color, piece);

        let knights: u32 = squares(board(PieceKind::Knight))
            .map(|sq| (knight_attacks(sq) & not_own).count_ones())
            .sum();
        let bishops: u32 = squares(board(PieceKind::Bishop))
            .map(|sq| (tables.bishop_attacks(sq, occupancy) & not_own).count_ones())
            .sum();
        let rooks: u32 = squares(board(PieceKind::Rook))
            .map(|sq| (tables.rook_attacks(sq, occupancy) & not_own).count_ones())
            .sum();
        let queens: u32 = squares(board(PieceKind::Queen))
            .map(|sq| (tables.queen_attacks(sq, occupancy) & not_own).count_ones())
            .sum();

        (knights + bishops + rooks + queens / 2) as i32 * Self::MOBILITY_WEIGHT
    }

    fn king_shelter(state: &State, color: Color) -> i32 {
        let king = state.king_square(color);
        (king_attacks(king) & state.piece_board(color, PieceKind::Pawn)).count_ones() as i32 * 6
    }
}

impl BoardScorer for TaperedScorer {
    fn score(&self, state: &State, perspective: Color) -> i32 {
        let phase = Self::phase(state);

        let side_total = |color: Color| {
            let (mg_pst, eg_pst) = Self::piece_squares(state, color);
            let mg = mg_pst + Self::king_shelter(state, color);
            let eg = eg_pst;
            let tapered = (mg * phase + eg * (Self::MAX_PHASE - phase)) / Self::MAX_PHASE;
            tapered
                + Self::pawn_structure(state, color)
                + Self::rook_files(state, color)
                + Self::mobility(state, color)
        };

        let light_minus_dark = MaterialScorer::material_light_minus_dark(state)
            + side_total(Color::Light)
            - side_total(Color::Dark);
        from_perspective(light_minus_dark, perspective)
    }
}

#[inline]
fn from_perspective(light_minus_dark: i32, perspective: Color) -> i32 {
    match perspective {
        Color::Light => light_minus_dark,
        Color::Dark => -light_minus_dark,
    }
}

/// Square as seen from `color`'s side of the board (rank mirrored for dark).
#[inline]
fn relative_square(color: Color, sq: Square) -> Square {
    match color {
        Color::Light => sq,
        Color::Dark => sq ^ 56,
    }
}

#[inline]
fn center_distance(sq: Square) -> i32 {
    let file = i32::from(file_of(sq));
    let rank = i32::from(rank_of(sq));
    let file_dist = (2 * file - 7).abs() / 2;
    let rank_dist = (2 * rank - 7).abs() / 2;
    file_dist + rank_dist
}

fn middlegame_bonus(piece: PieceKind, sq: Square) -> i32 {
    let rank = i32::from(rank_of(sq));
    let file = i32::from(file_of(sq));
    let center = 6 - center_distance(sq);

    match piece {
        PieceKind::Pawn => rank * 6 - (2 * file - 7).abs(),
        PieceKind::Knight => center * 6 - 10,
        PieceKind::Bishop => center * 4 + if rank == 0 { -10 } else { 0 },
        PieceKind::Rook => if rank == 6 { 20 } else { 0 },
        PieceKind::Queen => center * 2,
        PieceKind::King => {
            if rank == 0 && (file <= 2 || file >= 6) {
                20
            } else {
                -rank * 10
            }
        }
    }
}

fn endgame_bonus(piece: PieceKind, sq: Square) -> i32 {
    let rank = i32::from(rank_of(sq));
    let center = 6 - center_distance(sq);

    match piece {
        PieceKind::Pawn => rank * 12,
        PieceKind::Knight => center * 5 - 10,
        PieceKind::Bishop => center * 3,
        PieceKind::Rook => 0,
        PieceKind::Queen => center * 3,
        PieceKind::King => center * 8 - 16,
    }
}

fn adjacent_files(file: usize) -> Bitboard {
    let left = if file > 0 { FILES[file - 1] } else { 0 };
    let right = if file < 7 { FILES[file + 1] } else { 0 };
    left | right
}

fn is_passed_pawn(color: Color, sq: Square, enemy_pawns: Bitboard) -> bool {
    let file = file_of(sq) as usize;
    let lanes = FILES[file] | adjacent_files(file);
    let rank = rank_of(sq);
    let ahead = match color {
        Color::Light => {
            if rank == 7 {
                0
            } else {
                !0u64 << ((rank + 1) * 8)
            }
        }
        Color::Dark => (1u64 << (rank * 8)) - 1,
    };
    enemy_pawns & lanes & ahead == 0
}
