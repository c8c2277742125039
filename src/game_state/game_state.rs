//! Core incremental board state.
//!
//! `State` stores piece bitboards, occupancy caches, side/rights/clock fields,
//! the incremental Zobrist hash and the ply-tagged undo history used by
//! make/unmake. It also holds `&'static` handles to the process-wide attack
//! tables and hash keys.

use std::cell::Cell;
use std::fmt;

use crate::board::bitboard::{lsb, square_bb};
use crate::board::magic::{attack_tables, AttackTables};
use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{
    FIFTY_MOVE_LIMIT, MAX_FULLMOVE_NUMBER, REPETITION_LIMIT, STARTING_POSITION_FEN,
};
use crate::game_state::chess_types::*;
use crate::game_state::pins::PinInfo;
use crate::game_state::undo_history::{Ply, RepetitionMap, UndoHistory};
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::move_generation::legal_move_generator::{generate_legal_moves, HistoryTable, MoveLists};
use crate::search::zobrist::{zobrist_keys, ZobristKeys};
use crate::utils::algebraic::square_to_algebraic;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::{parse_fen, FenPosition};
use crate::utils::render_game_state::render_game_state;

#[derive(Debug, Clone)]
pub struct State {
    // [color][piece_kind]
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupancy_by_color: [Bitboard; 2],
    pub(crate) occupancy_all: Bitboard,

    pub(crate) side_to_move: Color,
    pub(crate) en_passant_square: Option<Square>,
    pub(crate) in_check: bool,
    pub(crate) castle_rights: CastleRights,

    pub(crate) ply: Ply,
    pub(crate) halfmove_clock: u16,

    pub(crate) zobrist_key: u64,
    pub(crate) hash_history: Vec<u64>,
    pub(crate) repetitions: RepetitionMap,
    pub(crate) undo: UndoHistory,

    pub(crate) pins: [Cell<Option<PinInfo>>; 2],

    pub(crate) tables: &'static AttackTables,
    pub(crate) keys: &'static ZobristKeys,
}

impl State {
    pub fn starting_position() -> ChessResult<Self> {
        Self::from_fen(STARTING_POSITION_FEN)
    }

    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        Self::from_position(parse_fen(fen)?)
    }

    /// Build a state from parsed FEN fields.
    pub fn from_position(position: FenPosition) -> ChessResult<Self> {
        for color in Color::BOTH {
            let count = position.pieces[color.index()][PieceKind::King.index()].count_ones();
            if count != 1 {
                return Err(ChessError::InvalidKingCount { color, count });
            }
        }

        validate_en_passant(&position)?;

        if position.fullmove_number > MAX_FULLMOVE_NUMBER {
            return Err(ChessError::InvalidCounter {
                field: "fullmove number",
                value: position.fullmove_number.to_string(),
            });
        }
        let dark_to_move = u16::from(position.side_to_move == Color::Dark);
        let ply = (position.fullmove_number.max(1) - 1) * 2 + dark_to_move;

        let mut state = Self {
            pieces: position.pieces,
            occupancy_by_color: [0; 2],
            occupancy_all: 0,
            side_to_move: position.side_to_move,
            en_passant_square: position.en_passant_square,
            in_check: false,
            castle_rights: position.castle_rights,
            ply,
            halfmove_clock: position.halfmove_clock,
            zobrist_key: 0,
            hash_history: Vec::with_capacity(256),
            repetitions: RepetitionMap::default(),
            undo: UndoHistory::new(),
            pins: [Cell::new(None), Cell::new(None)],
            tables: attack_tables()?,
            keys: zobrist_keys(),
        };

        state.refresh_occupancy();
        let waiting = state.side_to_move.opposite();
        if state.king_attacked(waiting) {
            return Err(ChessError::OpponentInCheck(waiting));
        }
        if let Some(ep) = state.en_passant_square {
            state.undo.en_passant.push(ply.wrapping_sub(1), ep);
        }
        state.zobrist_key = state.keys.compute(&state);
        state.hash_history.push(state.zobrist_key);
        state.repetitions.add(state.zobrist_key);
        state.in_check = state.king_attacked(state.side_to_move);

        Ok(state)
    }

    pub(crate) fn refresh_occupancy(&mut self) {
        for color in Color::BOTH {
            self.occupancy_by_color[color.index()] =
                self.pieces[color.index()].iter().fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all = self.occupancy_by_color[0] | self.occupancy_by_color[1];
    }

    #[inline]
    pub(crate) fn clear_pins(&self) {
        self.pins[0].set(None);
        self.pins[1].set(None);
    }

    #[inline]
    pub(crate) fn king_attacked(&self, color: Color) -> bool {
        is_square_attacked(self, self.king_square(color), color.opposite(), self.occupancy_all)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.in_check
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.zobrist_key
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[inline]
    pub fn castle_rights(&self) -> CastleRights {
        self.castle_rights
    }

    #[inline]
    pub fn ply(&self) -> Ply {
        self.ply
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.ply / 2 + 1
    }

    #[inline]
    pub fn piece_board(&self, color: Color, piece: PieceKind) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy_by_color[color.index()]
    }

    #[inline]
    pub fn occupancy_all(&self) -> Bitboard {
        self.occupancy_all
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        lsb(self.piece_board(color, PieceKind::King))
    }

    #[inline]
    pub fn tables(&self) -> &'static AttackTables {
        self.tables
    }

    pub fn piece_at(&self, square: Square) -> Option<(Color, PieceKind)> {
        let mask = square_bb(square);
        if self.occupancy_all & mask == 0 {
            return None;
        }
        let color = if self.occupancy(Color::Light) & mask != 0 {
            Color::Light
        } else {
            Color::Dark
        };
        self.piece_kind_at(color, square).map(|piece| (color, piece))
    }

    #[inline]
    pub(crate) fn piece_kind_at(&self, color: Color, square: Square) -> Option<PieceKind> {
        let mask = square_bb(square);
        PieceKind::ALL
            .into_iter()
            .find(|piece| self.pieces[color.index()][piece.index()] & mask != 0)
    }

    /// Times the current position has occurred on this line, itself included.
    #[inline]
    pub fn repetition_count(&self) -> u8 {
        self.repetitions.count(self.zobrist_key)
    }

    /// Fifty-move rule or threefold repetition.
    #[inline]
    pub fn is_rule_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_LIMIT || self.repetition_count() >= REPETITION_LIMIT
    }

    /// Whether `color` has a knight, bishop, rook or queen.
    pub fn has_big_piece(&self, color: Color) -> bool {
        PieceKind::ALL
            .into_iter()
            .filter(|piece| piece.is_big_piece())
            .any(|piece| self.piece_board(color, piece) != 0)
    }

    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    /// Legal moves for the side to move, quiet moves scored with an empty
    /// history.
    pub fn legal_moves(&self, include_quiets: bool) -> MoveLists {
        static EMPTY_HISTORY: HistoryTable = HistoryTable::new();
        let mut lists = MoveLists::default();
        generate_legal_moves(self, include_quiets, &EMPTY_HISTORY, &mut lists);
        lists
    }
}

/// An en-passant target must sit behind a pawn that just advanced two
/// squares: on the mover's sixth rank, empty, with an enemy pawn in front.
fn validate_en_passant(position: &FenPosition) -> ChessResult<()> {
    let Some(target) = position.en_passant_square else {
        return Ok(());
    };
    let us = position.side_to_move;
    let invalid = || ChessError::InvalidEnPassantSquare(square_to_algebraic(target));

    let victim = match us {
        Color::Light if target / 8 == 5 => target - 8,
        Color::Dark if target / 8 == 2 => target + 8,
        _ => return Err(invalid()),
    };

    let occupied = position
        .pieces
        .iter()
        .flatten()
        .fold(0u64, |acc, bb| acc | bb);
    let enemy_pawns = position.pieces[us.opposite().index()][PieceKind::Pawn.index()];

    if occupied & square_bb(target) != 0 || enemy_pawns & square_bb(victim) == 0 {
        return Err(invalid());
    }
    Ok(())
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_game_state(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_errors::ChessError;

    #[test]
    fn starting_position_has_expected_counters() {
        let state = State::starting_position().expect("start should build");
        assert_eq!(state.side_to_move(), Color::Light);
        assert_eq!(state.ply(), 0);
        assert_eq!(state.fullmove_number(), 1);
        assert_eq!(state.occupancy_all().count_ones(), 32);
        assert!(!state.is_in_check());
        assert_eq!(state.repetition_count(), 1);
        assert_eq!(state.castle_rights(), [true; 4]);
    }

    #[test]
    fn ply_is_derived_from_fullmove_and_side() {
        let state = State::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 7 12").expect("FEN should parse");
        assert_eq!(state.ply(), 23);
        assert_eq!(state.fullmove_number(), 12);
        assert_eq!(state.halfmove_clock(), 7);

        let zero = State::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 0").expect("FEN should parse");
        assert_eq!(zero.ply(), 0);
    }

    #[test]
    fn piece_at_reports_color_and_kind() {
        let state = State::starting_position().expect("start should build");
        assert_eq!(state.piece_at(4), Some((Color::Light, PieceKind::King)));
        assert_eq!(state.piece_at(59), Some((Color::Dark, PieceKind::Queen)));
        assert_eq!(state.piece_at(28), None);
    }

    #[test]
    fn check_flag_is_set_from_fen() {
        let state = State::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1").expect("FEN should parse");
        assert!(state.is_in_check());
    }

    #[test]
    fn missing_king_is_rejected() {
        let err = State::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").expect_err("no dark king");
        assert_eq!(
            err,
            ChessError::InvalidKingCount {
                color: Color::Dark,
                count: 0
            }
        );
    }

    #[test]
    fn waiting_side_in_check_is_rejected() {
        // Qf7 already attacks g8 with white to move.
        let err = State::from_fen("6k1/5Q2/6K1/8/8/8/8/8 w - - 0 1").expect_err("dark king is attacked");
        assert_eq!(err, ChessError::OpponentInCheck(Color::Dark));

        let err = State::from_fen("4k3/8/8/8/8/8/8/R3K2r b - - 0 1").expect_err("light king is attacked");
        assert_eq!(err, ChessError::OpponentInCheck(Color::Light));
    }

    #[test]
    fn en_passant_target_must_match_side_to_move() {
        let err = State::from_fen("4k3/8/8/8/4P3/8/8/4K3 w - e3 0 1").expect_err("e3 is dark's target rank");
        assert_eq!(err, ChessError::InvalidEnPassantSquare("e3".to_owned()));

        let err = State::from_fen("4k3/8/8/3pP3/8/8/8/4K3 b - d6 0 1").expect_err("d6 is light's target rank");
        assert_eq!(err, ChessError::InvalidEnPassantSquare("d6".to_owned()));
    }

    #[test]
    fn en_passant_target_needs_a_pawn_that_just_advanced() {
        let err = State::from_fen("4k3/8/8/4P3/8/8/8/4K3 w - d6 0 1").expect_err("no dark pawn on d5");
        assert_eq!(err, ChessError::InvalidEnPassantSquare("d6".to_owned()));

        let err = State::from_fen("4k3/8/8/3NP3/8/8/8/4K3 w - d6 0 1").expect_err("d5 holds a knight");
        assert_eq!(err, ChessError::InvalidEnPassantSquare("d6".to_owned()));
    }

    #[test]
    fn en_passant_target_square_must_be_empty() {
        let err = State::from_fen("4k3/8/3n4/3pP3/8/8/8/4K3 w - d6 0 1").expect_err("d6 is occupied");
        assert_eq!(err, ChessError::InvalidEnPassantSquare("d6".to_owned()));
    }

    #[test]
    fn consistent_en_passant_targets_are_accepted() {
        let light = State::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").expect("FEN should parse");
        assert_eq!(light.en_passant_square(), Some(43));

        let dark = State::from_fen("4k3/8/8/8/3Pp3/8/8/4K3 b - d3 0 1").expect("FEN should parse");
        assert_eq!(dark.en_passant_square(), Some(19));
    }

    #[test]
    fn fullmove_number_is_bounded_and_round_trips() {
        let fen = format!("4k3/8/8/8/8/8/8/4K3 b - - 0 {MAX_FULLMOVE_NUMBER}");
        let state = State::from_fen(&fen).expect("largest fullmove number should parse");
        assert_eq!(state.to_fen(), fen);

        let err = State::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 40000").expect_err("fullmove too large");
        assert_eq!(
            err,
            ChessError::InvalidCounter {
                field: "fullmove number",
                value: "40000".to_owned()
            }
        );
    }

    #[test]
    fn big_piece_detection_ignores_pawns_and_kings() {
        let state = State::from_fen("4k3/pppp4/8/8/8/8/8/3NK3 w - - 0 1").expect("FEN should parse");
        assert!(state.has_big_piece(Color::Light));
        assert!(!state.has_big_piece(Color::Dark));
    }
}
