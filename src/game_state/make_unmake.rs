//! In-place make/unmake.
//!
//! `make_move` updates bitboards, occupancy and the Zobrist hash
//! incrementally and pushes ply-tagged undo entries. `unmake_move` must be
//! given the most recent move; it pops only the entries tagged with that
//! move's ply and restores the previous hash from the history stack.

use crate::board::bitboard::square_bb;
use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{kingside_rook_squares, queenside_rook_squares};
use crate::game_state::chess_types::*;
use crate::game_state::undo_history::Ply;
use crate::moves::chess_move::{Move, SpecialMove};

impl State {
    /// Play `mv`, which must be legal here (or [`Move::PASSING`]).
    ///
    /// # Panics
    ///
    /// Panics if the side to move has no piece on the origin square. Use
    /// [`State::try_make_move`] for unchecked input.
    pub fn make_move(&mut self, mv: Move) {
        if mv.is_passing() {
            self.make_passing();
            return;
        }

        let us = self.side_to_move;
        let them = us.opposite();
        let made_ply = self.ply;
        let from = mv.from();
        let to = mv.to();
        let special = mv.special();

        let Some(moved) = self.piece_kind_at(us, from) else {
            panic!("make_move {mv}: no piece on the origin square");
        };
        let captured = match special {
            SpecialMove::EnPassant => None,
            _ => self.piece_kind_at(them, to),
        };

        let previous_clock = self.halfmove_clock;
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        let mut clock_reset = false;

        if let Some(ep) = self.en_passant_square.take() {
            self.zobrist_key ^= self.keys.en_passant_file(ep);
        }

        if let Some(victim) = captured {
            self.toggle_piece(them, victim, to);
            self.undo.captures.push(made_ply, victim);
            self.reset_clock(made_ply, previous_clock, &mut clock_reset);
            if victim == PieceKind::Rook {
                if let Some(right) = corner_right(them, to) {
                    self.revoke_castle_right(made_ply, right);
                }
            }
        }

        self.toggle_piece(us, moved, from);
        match mv.promotion_piece() {
            Some(promoted) => self.toggle_piece(us, promoted, to),
            None => self.toggle_piece(us, moved, to),
        }

        match special {
            SpecialMove::Castle => {
                let (rook_from, rook_to) = castle_rook_squares(us, from, to);
                self.toggle_piece(us, PieceKind::Rook, rook_from);
                self.toggle_piece(us, PieceKind::Rook, rook_to);
            }
            SpecialMove::EnPassant => {
                let victim_square = behind(us, to);
                self.toggle_piece(them, PieceKind::Pawn, victim_square);
                self.undo.captures.push(made_ply, PieceKind::Pawn);
                self.reset_clock(made_ply, previous_clock, &mut clock_reset);
            }
            SpecialMove::None | SpecialMove::Promotion => {}
        }

        match moved {
            PieceKind::Pawn => {
                if from.abs_diff(to) == 16 {
                    let ep = (from + to) / 2;
                    self.en_passant_square = Some(ep);
                    self.zobrist_key ^= self.keys.en_passant_file(ep);
                    self.undo.en_passant.push(made_ply, ep);
                }
                self.reset_clock(made_ply, previous_clock, &mut clock_reset);
            }
            PieceKind::King => {
                self.revoke_castle_right(made_ply, kingside_right(us));
                self.revoke_castle_right(made_ply, queenside_right(us));
            }
            PieceKind::Rook => {
                if let Some(right) = corner_right(us, from) {
                    self.revoke_castle_right(made_ply, right);
                }
            }
            _ => {}
        }

        self.finish_make(them);
    }

    /// Undo `mv`, which must be the last move made.
    pub fn unmake_move(&mut self, mv: Move) {
        if mv.is_passing() {
            self.unmake_passing();
            return;
        }

        self.repetitions.remove(self.zobrist_key);
        let made_ply = self.ply.wrapping_sub(1);
        self.ply = made_ply;
        let them = self.side_to_move;
        let us = them.opposite();
        self.side_to_move = us;

        let from = mv.from();
        let to = mv.to();

        match mv.promotion_piece() {
            Some(promoted) => {
                self.toggle_bits(us, promoted, to);
                self.toggle_bits(us, PieceKind::Pawn, from);
            }
            None => {
                if let Some(moved) = self.piece_kind_at(us, to) {
                    self.toggle_bits(us, moved, to);
                    self.toggle_bits(us, moved, from);
                }
            }
        }

        if let Some(victim) = self.undo.captures.pop_at(made_ply) {
            let square = match mv.special() {
                SpecialMove::EnPassant => behind(us, to),
                _ => to,
            };
            self.toggle_bits(them, victim, square);
        }

        if mv.special() == SpecialMove::Castle {
            let (rook_from, rook_to) = castle_rook_squares(us, from, to);
            self.toggle_bits(us, PieceKind::Rook, rook_to);
            self.toggle_bits(us, PieceKind::Rook, rook_from);
        }

        self.restore_shared(made_ply);
        while let Some(right) = self.undo.castle_rights.pop_at(made_ply) {
            self.castle_rights[right] = true;
        }
        match self.undo.fifty.pop_at(made_ply) {
            Some(clock) => self.halfmove_clock = clock,
            None => self.halfmove_clock = self.halfmove_clock.saturating_sub(1),
        }

        self.in_check = self.king_attacked(us);
        self.clear_pins();
    }

    /// Play `mv` only if it is legal in this position.
    pub fn try_make_move(&mut self, mv: Move) -> ChessResult<()> {
        let lists = self.legal_moves(true);
        if !lists.contains(mv) {
            return Err(ChessError::IllegalMove(mv.to_string()));
        }
        self.make_move(mv);
        Ok(())
    }

    fn make_passing(&mut self) {
        if let Some(ep) = self.en_passant_square.take() {
            self.zobrist_key ^= self.keys.en_passant_file(ep);
        }
        self.halfmove_clock = self.halfmove_clock.saturating_add(1);

        let them = self.side_to_move.opposite();
        self.side_to_move = them;
        self.zobrist_key ^= self.keys.side_to_move();
        self.ply = self.ply.wrapping_add(1);
        self.hash_history.push(self.zobrist_key);
        self.in_check = self.king_attacked(them);
        self.clear_pins();
    }

    fn unmake_passing(&mut self) {
        let made_ply = self.ply.wrapping_sub(1);
        self.ply = made_ply;
        let us = self.side_to_move.opposite();
        self.side_to_move = us;
        self.restore_shared(made_ply);
        self.halfmove_clock = self.halfmove_clock.saturating_sub(1);
        self.in_check = self.king_attacked(us);
        self.clear_pins();
    }

    /// Undo steps common to real and passing moves: en-passant target and
    /// hash history.
    fn restore_shared(&mut self, made_ply: Ply) {
        self.undo.en_passant.pop_at(made_ply);
        self.en_passant_square = self.undo.en_passant.peek_at(made_ply.wrapping_sub(1));

        self.hash_history.pop();
        if let Some(&previous) = self.hash_history.last() {
            self.zobrist_key = previous;
        }
    }

    fn finish_make(&mut self, them: Color) {
        self.side_to_move = them;
        self.zobrist_key ^= self.keys.side_to_move();
        self.ply = self.ply.wrapping_add(1);
        self.hash_history.push(self.zobrist_key);
        self.repetitions.add(self.zobrist_key);
        self.in_check = self.king_attacked(them);
        self.clear_pins();
    }

    #[inline]
    fn toggle_bits(&mut self, color: Color, piece: PieceKind, square: Square) {
        let mask = square_bb(square);
        self.pieces[color.index()][piece.index()] ^= mask;
        self.occupancy_by_color[color.index()] ^= mask;
        self.occupancy_all ^= mask;
    }

    #[inline]
    fn toggle_piece(&mut self, color: Color, piece: PieceKind, square: Square) {
        self.toggle_bits(color, piece, square);
        self.zobrist_key ^= self.keys.piece_square(color, piece, square);
    }

    fn revoke_castle_right(&mut self, made_ply: Ply, right: usize) {
        if self.castle_rights[right] {
            self.castle_rights[right] = false;
            self.zobrist_key ^= self.keys.castle(right);
            self.undo.castle_rights.push(made_ply, right);
        }
    }

    fn reset_clock(&mut self, made_ply: Ply, previous_clock: u16, already_reset: &mut bool) {
        if !*already_reset {
            self.undo.fifty.push(made_ply, previous_clock);
            self.halfmove_clock = 0;
            *already_reset = true;
        }
    }
}

/// Castle right tied to a rook corner of `color`.
fn corner_right(color: Color, square: Square) -> Option<usize> {
    if square == kingside_rook_squares(color).0 {
        Some(kingside_right(color))
    } else if square == queenside_rook_squares(color).0 {
        Some(queenside_right(color))
    } else {
        None
    }
}

fn castle_rook_squares(color: Color, king_from: Square, king_to: Square) -> (Square, Square) {
    if king_to > king_from {
        kingside_rook_squares(color)
    } else {
        queenside_rook_squares(color)
    }
}

/// Square of the pawn captured en passant by `color` landing on `to`.
#[inline]
fn behind(color: Color, to: Square) -> Square {
    match color {
        Color::Light => to - 8,
        Color::Dark => to + 8,
    }
}
