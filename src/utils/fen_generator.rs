use crate::game_state::chess_types::*;
use crate::utils::algebraic::square_to_algebraic;

/// Six-field FEN for a state. The fullmove number is derived from the ply.
pub fn generate_fen(state: &State) -> String {
    let side_to_move = match state.side_to_move() {
        Color::Light => "w",
        Color::Dark => "b",
    };
    let en_passant = state
        .en_passant_square()
        .map(square_to_algebraic)
        .unwrap_or_else(|| "-".to_owned());

    format!(
        "{} {} {} {} {} {}",
        generate_board_field(state),
        side_to_move,
        generate_castling_field(state.castle_rights()),
        en_passant,
        state.halfmove_clock(),
        state.fullmove_number()
    )
}

fn generate_board_field(state: &State) -> String {
    let mut out = String::new();

    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;

        for file in 0..8u8 {
            match state.piece_at(rank * 8 + file) {
                Some((color, piece)) => {
                    if empty_count > 0 {
                        out.push(char::from(b'0' + empty_count));
                        empty_count = 0;
                    }
                    out.push(piece_to_fen_char(color, piece));
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }
        if rank > 0 {
            out.push('/');
        }
    }

    out
}

pub(crate) fn piece_to_fen_char(color: Color, piece: PieceKind) -> char {
    match color {
        Color::Light => piece.letter().to_ascii_uppercase(),
        Color::Dark => piece.letter(),
    }
}

fn generate_castling_field(rights: CastleRights) -> String {
    let out: String = [
        (CASTLE_LIGHT_KINGSIDE, 'K'),
        (CASTLE_LIGHT_QUEENSIDE, 'Q'),
        (CASTLE_DARK_KINGSIDE, 'k'),
        (CASTLE_DARK_QUEENSIDE, 'q'),
    ]
    .into_iter()
    .filter(|(right, _)| rights[*right])
    .map(|(_, ch)| ch)
    .collect();

    if out.is_empty() {
        "-".to_owned()
    } else {
        out
    }
}
