//! Move ordering for the search: hash move, winning captures, killers,
//! history-ordered quiets, then losing captures.

use crate::move_generation::legal_move_generator::MoveLists;
use crate::moves::chess_move::Move;

/// Deepest ply the killer table tracks.
pub const MAX_PLY: usize = 128;

/// Two quiet cutoff moves per ply, most recent first.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: Vec<[Move; 2]>,
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: vec![[Move::NIL; 2]; MAX_PLY],
        }
    }

    #[inline]
    pub fn at(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([Move::NIL; 2])
    }

    pub fn record(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0] == mv {
            return;
        }
        slot[1] = slot[0];
        slot[0] = mv;
    }

    pub fn clear(&mut self) {
        self.slots.fill([Move::NIL; 2]);
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the search order of `lists` into `ordered`. Sorts the lists in
/// place. `tt_move` is only used when it was generated here.
pub fn order_moves(
    lists: &mut MoveLists,
    tt_move: Move,
    killers: [Move; 2],
    ordered: &mut Vec<Move>,
) {
    ordered.clear();

    let tt_move = if !tt_move.is_nil() && lists.contains(tt_move) {
        ordered.push(tt_move);
        tt_move
    } else {
        Move::NIL
    };

    lists
        .captures
        .sort_by(|a, b| b.exchange_score.cmp(&a.exchange_score));
    lists
        .quiets
        .sort_by(|a, b| b.history_score.cmp(&a.history_score));

    ordered.extend(
        lists
            .captures
            .iter()
            .filter(|c| c.exchange_score >= 0 && c.mv != tt_move)
            .map(|c| c.mv),
    );

    let mut killers_used = [Move::NIL; 2];
    for (slot, killer) in killers.into_iter().enumerate() {
        if killer.is_nil() || killer == tt_move {
            continue;
        }
        if lists.quiets.iter().any(|q| q.mv == killer) {
            ordered.push(killer);
            killers_used[slot] = killer;
        }
    }

    ordered.extend(
        lists
            .quiets
            .iter()
            .map(|q| q.mv)
            .filter(|mv| *mv != tt_move && !killers_used.contains(mv)),
    );

    ordered.extend(
        lists
            .captures
            .iter()
            .filter(|c| c.exchange_score < 0 && c.mv != tt_move)
            .map(|c| c.mv),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_move_generator::{CaptureMove, QuietMove};

    fn sample_lists() -> MoveLists {
        MoveLists {
            captures: vec![
                CaptureMove { mv: Move::new(3, 59), exchange_score: -400 },
                CaptureMove { mv: Move::new(12, 21), exchange_score: 200 },
                CaptureMove { mv: Move::new(1, 18), exchange_score: 0 },
            ],
            quiets: vec![
                QuietMove { mv: Move::new(6, 21), history_score: 1 },
                QuietMove { mv: Move::new(11, 27), history_score: 9 },
                QuietMove { mv: Move::new(4, 5), history_score: 0 },
            ],
        }
    }

    #[test]
    fn orders_captures_killers_quiets_then_losing_captures() {
        let mut lists = sample_lists();
        let mut ordered = Vec::new();
        order_moves(&mut lists, Move::NIL, [Move::new(4, 5), Move::NIL], &mut ordered);

        assert_eq!(
            ordered,
            vec![
                Move::new(12, 21),
                Move::new(1, 18),
                Move::new(4, 5),
                Move::new(11, 27),
                Move::new(6, 21),
                Move::new(3, 59),
            ]
        );
    }

    #[test]
    fn hash_move_leads_only_when_generated() {
        let mut lists = sample_lists();
        let mut ordered = Vec::new();

        order_moves(&mut lists, Move::new(6, 21), [Move::NIL; 2], &mut ordered);
        assert_eq!(ordered[0], Move::new(6, 21));
        assert_eq!(ordered.len(), 6);

        order_moves(&mut lists, Move::new(50, 58), [Move::new(62, 63); 2], &mut ordered);
        assert_eq!(ordered[0], Move::new(12, 21));
        assert_eq!(ordered.len(), 6);
    }

    #[test]
    fn killer_table_keeps_two_most_recent() {
        let mut killers = KillerTable::new();
        killers.record(3, Move::new(1, 2));
        killers.record(3, Move::new(1, 2));
        killers.record(3, Move::new(5, 6));
        assert_eq!(killers.at(3), [Move::new(5, 6), Move::new(1, 2)]);

        killers.record(MAX_PLY + 5, Move::new(1, 2));
        assert_eq!(killers.at(MAX_PLY + 5), [Move::NIL; 2]);

        killers.clear();
        assert_eq!(killers.at(3), [Move::NIL; 2]);
    }
}
