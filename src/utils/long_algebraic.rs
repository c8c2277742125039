//! Long algebraic move text (`e2e4`, `e7e8q`), resolved against the legal
//! move list of a state.

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;
use crate::utils::algebraic::algebraic_to_square;

/// Move text with the promotion letter appended when there is one.
pub fn move_to_long_algebraic(mv: Move) -> String {
    mv.to_string()
}

/// Find the legal move `text` names in `state`.
pub fn parse_long_algebraic(text: &str, state: &State) -> ChessResult<Move> {
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ChessError::InvalidMoveText(text.to_owned()));
    }

    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        Some(ch) => Some(char_to_promotion(ch)?),
        None => None,
    };

    let lists = state.legal_moves(true);
    let mut candidates = lists.iter_moves().filter(|mv| mv.from() == from && mv.to() == to);

    let Some(first) = candidates.next() else {
        return Err(ChessError::IllegalMove(text.to_owned()));
    };

    match (first.promotion_piece(), promotion) {
        (None, None) => Ok(first),
        (None, Some(_)) => Err(ChessError::IllegalMove(text.to_owned())),
        (Some(_), None) => Err(ChessError::MissingPromotionPiece(text.to_owned())),
        (Some(_), Some(wanted)) => std::iter::once(first)
            .chain(candidates)
            .find(|mv| mv.promotion_piece() == Some(wanted))
            .ok_or_else(|| ChessError::IllegalMove(text.to_owned())),
    }
}

fn char_to_promotion(ch: char) -> ChessResult<PieceKind> {
    match ch.to_ascii_lowercase() {
        'n' => Ok(PieceKind::Knight),
        'b' => Ok(PieceKind::Bishop),
        'r' => Ok(PieceKind::Rook),
        'q' => Ok(PieceKind::Queen),
        _ => Err(ChessError::InvalidPromotionPiece(ch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::chess_move::SpecialMove;

    #[test]
    fn parses_quiet_and_castle_moves() {
        let state = State::from_fen("r3k2r/8/8/8/8/8/4P3/R3K2R w KQkq - 0 1").expect("FEN should parse");

        let push = parse_long_algebraic("e2e4", &state).expect("e2e4 should parse");
        assert_eq!(push, Move::new(12, 28));

        let castle = parse_long_algebraic("e1c1", &state).expect("e1c1 should parse");
        assert_eq!(castle.special(), SpecialMove::Castle);
        assert_eq!(move_to_long_algebraic(castle), "e1c1");
    }

    #[test]
    fn promotion_needs_a_piece_letter() {
        let state = State::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").expect("FEN should parse");

        assert_eq!(
            parse_long_algebraic("e7e8", &state),
            Err(ChessError::MissingPromotionPiece("e7e8".to_owned()))
        );
        let knight = parse_long_algebraic("e7e8n", &state).expect("e7e8n should parse");
        assert_eq!(knight.promotion_piece(), Some(PieceKind::Knight));
        assert_eq!(move_to_long_algebraic(knight), "e7e8n");
        assert_eq!(
            parse_long_algebraic("e7e8k", &state),
            Err(ChessError::InvalidPromotionPiece('k'))
        );
    }

    #[test]
    fn rejects_malformed_and_illegal_text() {
        let state = State::starting_position().expect("start should build");
        assert_eq!(
            parse_long_algebraic("e2", &state),
            Err(ChessError::InvalidMoveText("e2".to_owned()))
        );
        assert_eq!(
            parse_long_algebraic("e2e5", &state),
            Err(ChessError::IllegalMove("e2e5".to_owned()))
        );
        assert_eq!(
            parse_long_algebraic("e2e4q", &state),
            Err(ChessError::IllegalMove("e2e4q".to_owned()))
        );
        assert!(matches!(
            parse_long_algebraic("z2e4", &state),
            Err(ChessError::InvalidAlgebraicSquare(_))
        ));
    }
}
