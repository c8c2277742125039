//! FEN text to position fields.
//!
//! Parsing is purely syntactic. `State::from_position` checks king counts
//! and builds the derived state (occupancy, hash, check flag).

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::utils::algebraic::algebraic_to_square;

/// The six FEN fields in typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenPosition {
    pub pieces: [[Bitboard; 6]; 2],
    pub side_to_move: Color,
    pub castle_rights: CastleRights,
    pub en_passant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

pub fn parse_fen(fen: &str) -> ChessResult<FenPosition> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or(ChessError::MissingFenField("piece placement"))?;
    let side_part = parts.next().ok_or(ChessError::MissingFenField("side to move"))?;
    let castling_part = parts.next().ok_or(ChessError::MissingFenField("castling"))?;
    let en_passant_part = parts.next().ok_or(ChessError::MissingFenField("en passant"))?;
    let halfmove_part = parts.next().ok_or(ChessError::MissingFenField("halfmove clock"))?;
    let fullmove_part = parts.next().ok_or(ChessError::MissingFenField("fullmove number"))?;

    let extra: Vec<&str> = parts.collect();
    if !extra.is_empty() {
        return Err(ChessError::ExtraFenFields(extra.join(" ")));
    }

    Ok(FenPosition {
        pieces: parse_board(board_part)?,
        side_to_move: parse_side_to_move(side_part)?,
        castle_rights: parse_castling_rights(castling_part)?,
        en_passant_square: parse_en_passant_square(en_passant_part)?,
        halfmove_clock: parse_counter("halfmove clock", halfmove_part)?,
        fullmove_number: parse_counter("fullmove number", fullmove_part)?,
    })
}

fn parse_board(board_part: &str) -> ChessResult<[[Bitboard; 6]; 2]> {
    let layout_error = || ChessError::InvalidBoardLayout(board_part.to_owned());
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(layout_error());
    }

    let mut pieces = [[0u64; 6]; 2];
    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(layout_error());
                }
                file += empty_count as usize;
                continue;
            }

            let (color, piece) = piece_from_fen_char(ch).ok_or_else(layout_error)?;
            if file >= 8 {
                return Err(layout_error());
            }
            pieces[color.index()][piece.index()] |= 1u64 << (board_rank * 8 + file);
            file += 1;
        }

        if file != 8 {
            return Err(layout_error());
        }
    }

    Ok(pieces)
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::Light),
        "b" => Ok(Color::Dark),
        _ => Err(ChessError::InvalidSideToMove(side_part.to_owned())),
    }
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastleRights> {
    let mut rights = [false; 4];
    if castling_part == "-" {
        return Ok(rights);
    }

    for ch in castling_part.chars() {
        let right = match ch {
            'K' => CASTLE_LIGHT_KINGSIDE,
            'Q' => CASTLE_LIGHT_QUEENSIDE,
            'k' => CASTLE_DARK_KINGSIDE,
            'q' => CASTLE_DARK_QUEENSIDE,
            _ => return Err(ChessError::InvalidCastlingRights(castling_part.to_owned())),
        };
        if rights[right] {
            return Err(ChessError::InvalidCastlingRights(castling_part.to_owned()));
        }
        rights[right] = true;
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)
        .map_err(|_| ChessError::InvalidEnPassantSquare(en_passant_part.to_owned()))?;
    // Only the third and sixth ranks can hold a target.
    if square / 8 != 2 && square / 8 != 5 {
        return Err(ChessError::InvalidEnPassantSquare(en_passant_part.to_owned()));
    }
    Ok(Some(square))
}

fn parse_counter(field: &'static str, text: &str) -> ChessResult<u16> {
    text.parse::<u16>().map_err(|_| ChessError::InvalidCounter {
        field,
        value: text.to_owned(),
    })
}

fn piece_from_fen_char(ch: char) -> Option<(Color, PieceKind)> {
    let color = if ch.is_ascii_uppercase() {
        Color::Light
    } else {
        Color::Dark
    };
    let lower = ch.to_ascii_lowercase();
    let piece = PieceKind::ALL.into_iter().find(|piece| piece.letter() == lower)?;
    Some((color, piece))
}
