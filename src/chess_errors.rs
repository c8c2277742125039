//! Errors used throughout the chess engine.
//!
//! `ChessError` is the single error type of the crate. Parsing failures
//! (FEN, squares, move text) are recoverable and carry the offending text so
//! callers can report it. `MagicSearchExhausted` means attack-table setup hit
//! its retry cap and the engine cannot start.

use thiserror::Error;

use crate::board::magic::Slider;
use crate::game_state::chess_types::{Color, Square};

/// Unified error type for the chess engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// A required FEN field was absent.
    #[error("FEN is missing the {0} field")]
    MissingFenField(&'static str),

    /// The FEN had more than six whitespace separated fields.
    #[error("FEN has extra trailing fields: {0}")]
    ExtraFenFields(String),

    /// Piece placement did not describe eight ranks of eight files.
    #[error("invalid FEN piece placement: {0}")]
    InvalidBoardLayout(String),

    #[error("invalid FEN side-to-move field: {0}")]
    InvalidSideToMove(String),

    #[error("invalid FEN castling field: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid FEN en-passant field: {0}")]
    InvalidEnPassantSquare(String),

    /// Halfmove clock or fullmove number was not a non-negative integer.
    #[error("invalid FEN {field}: {value}")]
    InvalidCounter { field: &'static str, value: String },

    /// Each side needs exactly one king for move generation to be defined.
    #[error("{color:?} must have exactly one king, found {count}")]
    InvalidKingCount { color: Color, count: u32 },

    /// The side that just moved left its own king attacked.
    #[error("{0:?} is in check but it is not their move")]
    OpponentInCheck(Color),

    #[error("invalid algebraic square: {0}")]
    InvalidAlgebraicSquare(String),

    #[error("invalid move text: {0}")]
    InvalidMoveText(String),

    /// Promotion moves need the piece letter (`e7e8q`).
    #[error("promotion move {0} needs a piece letter")]
    MissingPromotionPiece(String),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotionPiece(char),

    #[error("move {0} is not legal in this position")]
    IllegalMove(String),

    /// Magic multiplier search ran out of attempts for one square.
    #[error("no magic multiplier found for {slider:?} on square {square}")]
    MagicSearchExhausted { slider: Slider, square: Square },

    /// A scoped worker thread (magic search, parallel perft) panicked.
    #[error("{0} worker thread panicked")]
    WorkerThreadPanicked(&'static str),
}

/// Result alias for fallible engine operations.
pub type ChessResult<T> = Result<T, ChessError>;
