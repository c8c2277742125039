//! Legal move generation with check and pin masks.
//!
//! Moves come out split into captures (scored by exchange value) and quiet
//! moves (scored from the history table), already legal: no move leaves the
//! mover's king attacked. En-passant captures and capture-promotions are
//! captures; quiet promotions and castling are quiet moves.

use crate::board::bitboard::{lsb, square_bb, squares, UNIVERSE};
use crate::board::geometry::between;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::{checkers, is_square_attacked};
use crate::moves::chess_move::{Move, PROMOTION_PIECES};
use crate::moves::king_moves::king_attacks;
use crate::moves::knight_moves::knight_attacks;
use crate::moves::pawn_moves::{pawn_attacks, pawn_promotion_rank, pawn_pushes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureMove {
    pub mv: Move,
    /// Captured value minus attacker value.
    pub exchange_score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietMove {
    pub mv: Move,
    pub history_score: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MoveLists {
    pub captures: Vec<CaptureMove>,
    pub quiets: Vec<QuietMove>,
}

impl MoveLists {
    pub fn with_capacity(captures: usize, quiets: usize) -> Self {
        Self {
            captures: Vec::with_capacity(captures),
            quiets: Vec::with_capacity(quiets),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.captures.clear();
        self.quiets.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.captures.len() + self.quiets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty() && self.quiets.is_empty()
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.iter_moves().any(|candidate| candidate == mv)
    }

    /// Captures first, then quiet moves, in generation order.
    pub fn iter_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.captures
            .iter()
            .map(|c| c.mv)
            .chain(self.quiets.iter().map(|q| q.mv))
    }
}

/// Quiet-move history scores indexed `[color][piece][to]`.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    scores: [[[u32; 64]; 6]; 2],
}

impl HistoryTable {
    pub const fn new() -> Self {
        Self {
            scores: [[[0; 64]; 6]; 2],
        }
    }

    #[inline]
    pub fn score(&self, color: Color, piece: PieceKind, to: Square) -> u32 {
        self.scores[color.index()][piece.index()][to as usize]
    }

    /// Credit a quiet move that caused a beta cutoff at `depth`.
    #[inline]
    pub fn reward(&mut self, color: Color, piece: PieceKind, to: Square, depth: u8) {
        let slot = &mut self.scores[color.index()][piece.index()][to as usize];
        *slot = slot.saturating_add(u32::from(depth) * u32::from(depth));
    }

    pub fn clear(&mut self) {
        self.scores = [[[0; 64]; 6]; 2];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill `lists` with the legal moves of the side to move. Quiet moves are
/// skipped unless `include_quiets`.
pub fn generate_legal_moves(
    state: &State,
    include_quiets: bool,
    history: &HistoryTable,
    lists: &mut MoveLists,
) {
    lists.clear();
    let mut gen = Generator::new(state, include_quiets, history, lists);

    gen.king_steps();
    if gen.check_mask == 0 {
        // Double check: only the king may move.
        return;
    }

    gen.knights();
    gen.sliders(PieceKind::Bishop);
    gen.sliders(PieceKind::Rook);
    gen.sliders(PieceKind::Queen);
    gen.pawns();
    if include_quiets && !state.is_in_check() {
        gen.castles();
    }
}

struct Generator<'a> {
    state: &'a State,
    history: &'a HistoryTable,
    lists: &'a mut MoveLists,
    include_quiets: bool,
    us: Color,
    them: Color,
    king: Square,
    friends: Bitboard,
    enemies: Bitboard,
    occupancy: Bitboard,
    /// Destinations that resolve a check (everything when not in check).
    check_mask: Bitboard,
    /// En-passant target when it captures the checking pawn.
    en_passant_evasion: Bitboard,
}

impl<'a> Generator<'a> {
    fn new(state: &'a State, include_quiets: bool, history: &'a HistoryTable, lists: &'a mut MoveLists) -> Self {
        let us = state.side_to_move();
        let them = us.opposite();
        let king = state.king_square(us);

        let mut check_mask = UNIVERSE;
        let mut en_passant_evasion = 0;
        if state.is_in_check() {
            let attackers = checkers(state, us);
            if attackers.count_ones() > 1 {
                check_mask = 0;
            } else if attackers != 0 {
                let checker = lsb(attackers);
                check_mask = between(king, checker) | square_bb(checker);
                if let Some(ep) = state.en_passant_square() {
                    if state.piece_board(them, PieceKind::Pawn) & attackers != 0
                        && en_passant_victim(us, ep) == checker
                    {
                        en_passant_evasion = square_bb(ep);
                    }
                }
            }
        }

        Self {
            state,
            history,
            lists,
            include_quiets,
            us,
            them,
            king,
            friends: state.occupancy(us),
            enemies: state.occupancy(them),
            occupancy: state.occupancy_all(),
            check_mask,
            en_passant_evasion,
        }
    }

    fn push_capture(&mut self, mv: Move, attacker: PieceKind, to: Square) {
        let victim = self
            .state
            .piece_kind_at(self.them, to)
            .map_or(0, PieceKind::exchange_value);
        self.lists.captures.push(CaptureMove {
            mv,
            exchange_score: victim - attacker.exchange_value(),
        });
    }

    fn push_quiet(&mut self, mv: Move, piece: PieceKind) {
        self.lists.quiets.push(QuietMove {
            mv,
            history_score: self.history.score(self.us, piece, mv.to()),
        });
    }

    /// Emit captures and (optionally) quiet moves to `targets`.
    fn emit(&mut self, piece: PieceKind, from: Square, targets: Bitboard) {
        for to in squares(targets & self.enemies) {
            self.push_capture(Move::new(from, to), piece, to);
        }
        if self.include_quiets {
            for to in squares(targets & !self.occupancy) {
                self.push_quiet(Move::new(from, to), piece);
            }
        }
    }

    fn king_steps(&mut self) {
        // The king must not shadow an attacker's ray onto its own target.
        let without_king = self.occupancy & !square_bb(self.king);
        let mut targets = king_attacks(self.king) & !self.friends;
        if !self.include_quiets {
            targets &= self.enemies;
        }
        let safe = squares(targets)
            .filter(|&to| !is_square_attacked(self.state, to, self.them, without_king))
            .fold(0u64, |acc, to| acc | square_bb(to));
        self.emit(PieceKind::King, self.king, safe);
    }

    fn knights(&mut self) {
        let pins = self.state.pin_info(self.us);
        let knights = self.state.piece_board(self.us, PieceKind::Knight) & !pins.pinned;
        for from in squares(knights) {
            let targets = knight_attacks(from) & !self.friends & self.check_mask;
            self.emit(PieceKind::Knight, from, targets);
        }
    }

    fn sliders(&mut self, piece: PieceKind) {
        let tables = self.state.tables();
        let pins = self.state.pin_info(self.us);
        for from in squares(self.state.piece_board(self.us, piece)) {
            let attacks = match piece {
                PieceKind::Bishop => tables.bishop_attacks(from, self.occupancy),
                PieceKind::Rook => tables.rook_attacks(from, self.occupancy),
                _ => tables.queen_attacks(from, self.occupancy),
            };
            let targets = attacks & !self.friends & self.check_mask & pins.allowed_targets(self.king, from);
            self.emit(piece, from, targets);
        }
    }

    fn pawns(&mut self) {
        let pins = self.state.pin_info(self.us);
        let promotion_rank = pawn_promotion_rank(self.us);
        let en_passant = self.state.en_passant_square();

        for from in squares(self.state.piece_board(self.us, PieceKind::Pawn)) {
            let pinned_line = pins.allowed_targets(self.king, from);
            let allowed = pinned_line & self.check_mask;

            for to in squares(pawn_attacks(self.us, from) & self.enemies & allowed) {
                if to / 8 == promotion_rank {
                    for piece in PROMOTION_PIECES {
                        self.push_capture(Move::promotion(from, to, piece), PieceKind::Pawn, to);
                    }
                } else {
                    self.push_capture(Move::new(from, to), PieceKind::Pawn, to);
                }
            }

            if let Some(ep) = en_passant {
                let ep_mask = square_bb(ep);
                if pawn_attacks(self.us, from) & ep_mask & pinned_line & (self.check_mask | self.en_passant_evasion) != 0
                    && self.en_passant_is_safe(from, ep)
                {
                    self.lists.captures.push(CaptureMove {
                        mv: Move::en_passant(from, ep),
                        exchange_score: 0,
                    });
                }
            }

            if self.include_quiets {
                for to in squares(pawn_pushes(self.us, from, self.occupancy) & allowed) {
                    if to / 8 == promotion_rank {
                        for piece in PROMOTION_PIECES {
                            self.push_quiet(Move::promotion(from, to, piece), PieceKind::Pawn);
                        }
                    } else {
                        self.push_quiet(Move::new(from, to), PieceKind::Pawn);
                    }
                }
            }
        }
    }

    /// Lift both pawns, drop the capturer on the target and re-test the
    /// king's slider rays. Catches the rank pin through two pawns.
    fn en_passant_is_safe(&self, from: Square, ep: Square) -> bool {
        let victim = en_passant_victim(self.us, ep);
        let occupancy = (self.occupancy & !square_bb(from) & !square_bb(victim)) | square_bb(ep);
        let tables = self.state.tables();
        let queens = self.state.piece_board(self.them, PieceKind::Queen);
        let straight = self.state.piece_board(self.them, PieceKind::Rook) | queens;
        let diagonal = self.state.piece_board(self.them, PieceKind::Bishop) | queens;

        tables.rook_attacks(self.king, occupancy) & straight == 0
            && tables.bishop_attacks(self.king, occupancy) & diagonal == 0
    }

    fn castles(&mut self) {
        let base = self.us.back_rank_offset();
        if self.king != base + 4 {
            return;
        }
        let rooks = self.state.piece_board(self.us, PieceKind::Rook);
        let rights = self.state.castle_rights();

        // (right, rook corner, squares that must be empty, king transit, king destination)
        let sides = [
            (kingside_right(self.us), base + 7, 0x60u64 << base, base + 5, base + 6),
            (queenside_right(self.us), base, 0x0Eu64 << base, base + 3, base + 2),
        ];

        for (right, rook_corner, path, transit, destination) in sides {
            if rights[right]
                && self.occupancy & path == 0
                && rooks & square_bb(rook_corner) != 0
                && !is_square_attacked(self.state, transit, self.them, self.occupancy)
                && !is_square_attacked(self.state, destination, self.them, self.occupancy)
            {
                self.push_quiet(Move::castle(self.king, destination), PieceKind::King);
            }
        }
    }
}

/// Square of the pawn an en-passant capture onto `ep` removes.
#[inline]
fn en_passant_victim(capturer: Color, ep: Square) -> Square {
    match capturer {
        Color::Light => ep - 8,
        Color::Dark => ep + 8,
    }
}
