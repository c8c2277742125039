//! Perft node counting for move generator validation and benchmarking.

use std::thread;

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_types::State;
use crate::move_generation::legal_move_generator::MoveLists;
use crate::moves::chess_move::{Move, SpecialMove};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Leaf node count at `depth`, bulk-counting the last ply.
pub fn perft(state: &mut State, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let lists = state.legal_moves(true);
    if depth == 1 {
        return lists.len() as u64;
    }

    let mut nodes = 0;
    for mv in lists.iter_moves() {
        state.make_move(mv);
        nodes += perft(state, depth - 1);
        state.unmake_move(mv);
    }
    nodes
}

/// Node count per root move.
pub fn perft_divide(state: &mut State, depth: u8) -> Vec<(Move, u64)> {
    let lists = state.legal_moves(true);
    lists
        .iter_moves()
        .map(|mv| {
            state.make_move(mv);
            let nodes = perft(state, depth.saturating_sub(1));
            state.unmake_move(mv);
            (mv, nodes)
        })
        .collect()
}

/// Leaf counts broken down by move category.
pub fn perft_counts(state: &mut State, depth: u8) -> PerftCounts {
    let mut counts = PerftCounts::default();
    if depth == 0 {
        counts.nodes = 1;
        return counts;
    }
    let lists = state.legal_moves(true);
    count_children(state, &lists, depth, &mut counts);
    counts
}

/// [`perft_counts`] with each root move searched on its own scoped thread.
pub fn perft_multi_threaded(state: &State, depth: u8) -> ChessResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let root_moves: Vec<(Move, bool)> = {
        let lists = state.legal_moves(true);
        lists
            .captures
            .iter()
            .map(|c| (c.mv, true))
            .chain(lists.quiets.iter().map(|q| (q.mv, false)))
            .collect()
    };

    let results: Vec<ChessResult<PerftCounts>> = thread::scope(|scope| {
        let handles: Vec<_> = root_moves
            .iter()
            .map(|&(mv, is_capture)| {
                let mut local_state = state.clone();
                scope.spawn(move || {
                    let mut local = PerftCounts::default();
                    visit(&mut local_state, mv, is_capture, depth, &mut local);
                    local
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| ChessError::WorkerThreadPanicked("perft"))
            })
            .collect()
    });

    let mut total = PerftCounts::default();
    for result in results {
        total.merge(result?);
    }
    Ok(total)
}

fn count_children(state: &mut State, lists: &MoveLists, depth: u8, counts: &mut PerftCounts) {
    for capture in &lists.captures {
        visit(state, capture.mv, true, depth, counts);
    }
    for quiet in &lists.quiets {
        visit(state, quiet.mv, false, depth, counts);
    }
}

fn visit(state: &mut State, mv: Move, is_capture: bool, depth: u8, counts: &mut PerftCounts) {
    state.make_move(mv);
    if depth == 1 {
        counts.nodes += 1;
        if is_capture {
            counts.captures += 1;
        }
        match mv.special() {
            SpecialMove::EnPassant => counts.en_passant += 1,
            SpecialMove::Castle => counts.castles += 1,
            SpecialMove::Promotion => counts.promotions += 1,
            SpecialMove::None => {}
        }
        if state.is_in_check() {
            counts.checks += 1;
            if state.legal_moves(true).is_empty() {
                counts.checkmates += 1;
            }
        }
    } else {
        let lists = state.legal_moves(true);
        count_children(state, &lists, depth - 1, counts);
    }
    state.unmake_move(mv);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
    const POSITION_6: &str = "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";
    const PROMOTIONS: &str = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";

    fn nodes(fen: &str, depth: u8) -> u64 {
        let mut state = State::from_fen(fen).expect("FEN should parse");
        perft(&mut state, depth)
    }

    #[test]
    fn startpos_shallow_node_counts() {
        let expected = [1, 20, 400, 8902, 197_281];
        for (depth, nodes_expected) in expected.iter().enumerate() {
            assert_eq!(nodes(STARTING_POSITION_FEN, depth as u8), *nodes_expected);
        }
    }

    #[test]
    fn startpos_depth_four_category_counts() {
        let mut state = State::starting_position().expect("start should build");
        let counts = perft_counts(&mut state, 4);
        assert_eq!(
            counts,
            PerftCounts {
                nodes: 197_281,
                captures: 1576,
                en_passant: 0,
                castles: 0,
                promotions: 0,
                checks: 469,
                checkmates: 8,
            }
        );
    }

    #[test]
    fn kiwipete_category_counts() {
        let mut state = State::from_fen(KIWIPETE).expect("FEN should parse");
        assert_eq!(
            perft_counts(&mut state, 1),
            PerftCounts {
                nodes: 48,
                captures: 8,
                castles: 2,
                ..PerftCounts::default()
            }
        );
        assert_eq!(
            perft_counts(&mut state, 2),
            PerftCounts {
                nodes: 2039,
                captures: 351,
                en_passant: 1,
                castles: 91,
                checks: 3,
                ..PerftCounts::default()
            }
        );
        assert_eq!(
            perft_counts(&mut state, 3),
            PerftCounts {
                nodes: 97_862,
                captures: 17_102,
                en_passant: 45,
                castles: 3162,
                promotions: 0,
                checks: 993,
                checkmates: 1,
            }
        );
    }

    #[test]
    fn standard_positions_match_reference_counts() {
        assert_eq!(nodes(POSITION_3, 1), 14);
        assert_eq!(nodes(POSITION_3, 2), 191);
        assert_eq!(nodes(POSITION_3, 3), 2812);
        assert_eq!(nodes(POSITION_3, 4), 43_238);
        assert_eq!(nodes(POSITION_4, 1), 6);
        assert_eq!(nodes(POSITION_4, 2), 264);
        assert_eq!(nodes(POSITION_4, 3), 9467);
        assert_eq!(nodes(POSITION_5, 1), 44);
        assert_eq!(nodes(POSITION_5, 2), 1486);
        assert_eq!(nodes(POSITION_5, 3), 62_379);
        assert_eq!(nodes(POSITION_6, 1), 46);
        assert_eq!(nodes(POSITION_6, 2), 2079);
        assert_eq!(nodes(POSITION_6, 3), 89_890);
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut state = State::from_fen(KIWIPETE).expect("FEN should parse");
        let divide = perft_divide(&mut state, 3);
        assert_eq!(divide.len(), 48);
        assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 97_862);
        assert_eq!(state.to_fen(), KIWIPETE);
    }

    #[test]
    fn multi_threaded_matches_single_threaded() {
        let state = State::from_fen(POSITION_4).expect("FEN should parse");
        let threaded = perft_multi_threaded(&state, 3).expect("perft should run");
        let mut single_state = state.clone();
        assert_eq!(threaded, perft_counts(&mut single_state, 3));
        assert_eq!(threaded.nodes, 9467);
    }

    #[test]
    #[ignore = "slow: run with --ignored"]
    fn deep_reference_counts() {
        assert_eq!(nodes(STARTING_POSITION_FEN, 5), 4_865_609);
        assert_eq!(nodes(POSITION_3, 5), 674_624);
        assert_eq!(nodes(POSITION_4, 4), 422_333);
        assert_eq!(nodes(POSITION_5, 4), 2_103_487);
        assert_eq!(nodes(POSITION_6, 4), 3_894_594);
        assert_eq!(nodes(PROMOTIONS, 5), 3_605_103);
    }

    #[test]
    #[ignore = "very slow: run with --ignored in release mode"]
    fn kiwipete_depth_five() {
        assert_eq!(nodes(KIWIPETE, 5), 193_690_690);
    }
}
