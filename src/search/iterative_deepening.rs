//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Fail-hard negamax over the in-place [`State`], with a transposition
//! table, quiescence, futility pruning at frontier nodes, null-move pruning,
//! internal iterative deepening, late move reductions inside a PVS loop,
//! killer and history ordering, and aspiration windows at the root.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::{generate_legal_moves, HistoryTable, MoveLists};
use crate::moves::chess_move::{Move, SpecialMove};
use crate::search::board_scoring::{BoardScorer, TaperedScorer, INF, MATE_SCORE};
use crate::search::move_ordering::{order_moves, KillerTable};
use crate::search::transposition_table::{NodeType, TTStats, TranspositionTable};
use crate::utils::long_algebraic::move_to_long_algebraic;

/// Scores past this bound are treated as decided when widening windows.
const MATE_CUTOFF: i32 = 2_000;
const FUTILITY_MARGIN: i32 = 300;
const ASPIRATION_WINDOW: i32 = 10;
const NARROW_ASPIRATION_DEPTH: u8 = 5;
const IID_MIN_DEPTH: u8 = 5;
const NULL_MOVE_REDUCTION: u8 = 2;
const LMR_MIN_DEPTH: u8 = 2;
const LMR_MIN_INDEX: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub tt_size_mb: usize,
    /// Log per-depth progress at `info` instead of `debug`.
    pub debug_verbose: bool,
    pub max_depth: Option<u8>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tt_size_mb: 64,
            debug_verbose: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub best_move: Move,
    /// From the side to move's point of view.
    pub score: i32,
    /// Deepest completed iteration.
    pub depth: u8,
    pub nodes: u64,
    pub nps: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
    pub tt_stats: TTStats,
}

/// Owns everything a search mutates except the position itself.
pub struct Searcher {
    config: SearchConfig,
    scorer: Box<dyn BoardScorer>,
    tt: TranspositionTable,
    history: HistoryTable,
    killers: KillerTable,
    move_lists: Vec<MoveLists>,
    ordered: Vec<Vec<Move>>,
    nodes: u64,
    previous_score: i32,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_scorer(config, Box::new(TaperedScorer))
    }

    pub fn with_scorer(config: SearchConfig, scorer: Box<dyn BoardScorer>) -> Self {
        Self {
            config,
            scorer,
            tt: TranspositionTable::new_with_mb(config.tt_size_mb),
            history: HistoryTable::new(),
            killers: KillerTable::new(),
            move_lists: Vec::new(),
            ordered: Vec::new(),
            nodes: 0,
            previous_score: 0,
        }
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Forget everything learned from earlier searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.history.clear();
        self.killers.clear();
        self.previous_score = 0;
    }

    /// Search `state` until `budget` runs out. The budget is checked between
    /// iterations, so the last iteration may overrun it.
    pub fn search(&mut self, state: &mut State, budget: Duration) -> SearchResult {
        let started_at = Instant::now();
        self.nodes = 0;
        self.killers.clear();

        let mut root_lists = MoveLists::default();
        generate_legal_moves(state, true, &self.history, &mut root_lists);
        if root_lists.is_empty() {
            let score = if state.is_in_check() { -MATE_SCORE } else { 0 };
            return SearchResult {
                best_move: Move::NIL,
                score,
                elapsed: started_at.elapsed(),
                tt_stats: self.tt.stats(),
                ..SearchResult::default()
            };
        }

        let root_entry = self.tt.peek(state.hash());
        let mut fallback = Vec::with_capacity(root_lists.len());
        order_moves(
            &mut root_lists,
            root_entry.map_or(Move::NIL, |entry| entry.best_move),
            [Move::NIL; 2],
            &mut fallback,
        );

        let guess = root_entry.map_or(self.previous_score, |entry| entry.score_at_ply(0));
        let mut delta = ASPIRATION_WINDOW;
        let mut alpha = guess - delta;
        let mut beta = guess + delta;

        let mut best = None;
        let mut depth = 1u8;
        let mut last_iteration_nodes = 1u64;

        while started_at.elapsed() < budget {
            if self.config.max_depth.is_some_and(|max| depth > max) {
                break;
            }

            let nodes_before = self.nodes;
            let (score, mv) = self.negamax(state, depth, alpha, beta, 0, false, false);
            let iteration_nodes = self.nodes - nodes_before;

            if score <= alpha {
                self.log_progress(format_args!(
                    "depth {depth} failed low in [{alpha}, {beta}] ({iteration_nodes} nodes)"
                ));
                beta -= delta / 3;
                if alpha <= -MATE_CUTOFF {
                    alpha = -INF;
                } else {
                    alpha -= delta;
                    delta *= 2;
                }
            } else if score >= beta {
                self.log_progress(format_args!(
                    "depth {depth} failed high in [{alpha}, {beta}] ({iteration_nodes} nodes)"
                ));
                alpha += delta / 3;
                if beta >= MATE_CUTOFF {
                    beta = INF;
                } else {
                    beta += delta;
                    delta *= 2;
                }
            } else {
                let ebf = iteration_nodes as f64 / last_iteration_nodes.max(1) as f64;
                self.log_progress(format_args!(
                    "depth {depth} best {} score {score} nodes {iteration_nodes} ebf {ebf:.2}",
                    move_to_long_algebraic(mv)
                ));

                best = Some((mv, score, depth));
                self.previous_score = score;
                delta = if depth >= NARROW_ASPIRATION_DEPTH {
                    ASPIRATION_WINDOW / 2
                } else {
                    ASPIRATION_WINDOW
                };
                alpha = score - delta;
                beta = score + delta;
                last_iteration_nodes = iteration_nodes;

                match depth.checked_add(1) {
                    Some(next) => depth = next,
                    None => break,
                }
            }
        }

        let (best_move, score, depth) = match best {
            Some((mv, score, depth)) if !mv.is_nil() => (mv, score, depth),
            _ => (
                fallback[0],
                self.scorer.score(state, state.side_to_move()),
                0,
            ),
        };

        let elapsed = started_at.elapsed();
        let nps = if elapsed.is_zero() {
            0
        } else {
            (self.nodes as f64 / elapsed.as_secs_f64()) as u64
        };
        let pv = self.principal_variation(state, best_move, usize::from(depth).max(1));

        info!(
            best = %move_to_long_algebraic(best_move),
            score,
            depth,
            nodes = self.nodes,
            nps,
            elapsed_ms = elapsed.as_millis() as u64,
            pv = %pv.iter().map(|mv| move_to_long_algebraic(*mv)).collect::<Vec<_>>().join(" "),
            "search complete"
        );

        SearchResult {
            best_move,
            score,
            depth,
            nodes: self.nodes,
            nps,
            elapsed,
            pv,
            tt_stats: self.tt.stats(),
        }
    }

    fn log_progress(&self, message: std::fmt::Arguments<'_>) {
        if self.config.debug_verbose {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        state: &mut State,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        ply: u16,
        skip_iid: bool,
        skip_null: bool,
    ) -> (i32, Move) {
        self.nodes += 1;
        let root = ply == 0;

        if !root && state.is_rule_draw() {
            return (0, Move::NIL);
        }

        let key = state.hash();
        let mut guess = Move::NIL;
        if let Some(entry) = self.tt.probe(key) {
            guess = entry.best_move;
            if !root {
                let score = entry.score_at_ply(ply);
                match entry.node_type {
                    NodeType::Terminal => return (score.clamp(alpha, beta), Move::NIL),
                    _ if entry.depth < depth => {}
                    NodeType::Exact => return (score.clamp(alpha, beta), entry.best_move),
                    NodeType::Lower if score >= beta => return (beta, entry.best_move),
                    NodeType::Upper if score <= alpha => return (alpha, entry.best_move),
                    _ => {}
                }
            }
        } else if depth > IID_MIN_DEPTH && !skip_iid {
            guess = self
                .negamax(state, depth / 2, alpha, beta, ply, true, skip_null)
                .1;
        }

        if depth == 0 {
            return (self.quiescence(state, alpha, beta, ply), Move::NIL);
        }

        let in_check = state.is_in_check();
        let us = state.side_to_move();
        let futile = !root
            && depth == 1
            && !in_check
            && alpha > -MATE_CUTOFF
            && beta < MATE_CUTOFF
            && self.scorer.score(state, us) < alpha - FUTILITY_MARGIN;

        let (mut lists, mut ordered) = self.take_buffers(ply);
        generate_legal_moves(state, !futile, &self.history, &mut lists);

        if lists.is_empty() {
            self.put_buffers(ply, lists, ordered);
            if futile {
                return (alpha, Move::NIL);
            }
            let score = if in_check {
                -MATE_SCORE + i32::from(ply)
            } else {
                0
            };
            self.tt
                .store(key, score, Move::NIL, depth, NodeType::Terminal, ply);
            return (score.clamp(alpha, beta), Move::NIL);
        }

        if !root
            && !skip_null
            && !in_check
            && depth > NULL_MOVE_REDUCTION
            && state.has_big_piece(us)
        {
            state.make_move(Move::PASSING);
            let reduced = depth.saturating_sub(NULL_MOVE_REDUCTION + 1).max(1);
            let score = -self
                .negamax(state, reduced, -beta, -beta + 1, ply + 1, false, true)
                .0;
            state.unmake_move(Move::PASSING);
            if score >= beta {
                self.put_buffers(ply, lists, ordered);
                return (beta, Move::NIL);
            }
        }

        order_moves(&mut lists, guess, self.killers.at(usize::from(ply)), &mut ordered);
        let outcome = self.search_moves(state, &ordered, depth, alpha, beta, ply, in_check);
        self.put_buffers(ply, lists, ordered);

        match outcome {
            MovesOutcome::Cutoff(mv) => {
                self.tt.store(key, beta, mv, depth, NodeType::Lower, ply);
                (beta, mv)
            }
            MovesOutcome::Improved(score, mv) => {
                alpha = score;
                self.tt.store(key, alpha, mv, depth, NodeType::Exact, ply);
                (alpha, mv)
            }
            MovesOutcome::AllFailedLow => {
                self.tt
                    .store(key, alpha, Move::NIL, depth, NodeType::Upper, ply);
                (alpha, Move::NIL)
            }
        }
    }

    /// PVS loop with late move reductions over pre-ordered moves.
    #[allow(clippy::too_many_arguments)]
    fn search_moves(
        &mut self,
        state: &mut State,
        ordered: &[Move],
        depth: u8,
        mut alpha: i32,
        beta: i32,
        ply: u16,
        in_check: bool,
    ) -> MovesOutcome {
        let us = state.side_to_move();
        let mut best = None;

        for (index, &mv) in ordered.iter().enumerate() {
            let moved = state.piece_kind_at(us, mv.from());
            let quiet = mv.special() != SpecialMove::EnPassant && state.piece_at(mv.to()).is_none();

            state.make_move(mv);
            let score = if index == 0 {
                -self
                    .negamax(state, depth - 1, -beta, -alpha, ply + 1, false, false)
                    .0
            } else {
                let reduce = quiet && index > LMR_MIN_INDEX && depth > LMR_MIN_DEPTH && !in_check;
                let probe_depth = if reduce { depth - 2 } else { depth - 1 };
                let mut score = -self
                    .negamax(state, probe_depth, -alpha - 1, -alpha, ply + 1, false, false)
                    .0;
                if reduce && score > alpha {
                    score = -self
                        .negamax(state, depth - 1, -alpha - 1, -alpha, ply + 1, false, false)
                        .0;
                }
                if score > alpha && score < beta {
                    score = -self
                        .negamax(state, depth - 1, -beta, -alpha, ply + 1, false, false)
                        .0;
                }
                score
            };
            state.unmake_move(mv);

            if score >= beta {
                if quiet {
                    if let Some(piece) = moved {
                        self.history.reward(us, piece, mv.to(), depth);
                    }
                    self.killers.record(usize::from(ply), mv);
                }
                return MovesOutcome::Cutoff(mv);
            }
            if score > alpha {
                alpha = score;
                best = Some(mv);
            }
        }

        match best {
            Some(mv) => MovesOutcome::Improved(alpha, mv),
            None => MovesOutcome::AllFailedLow,
        }
    }

    /// Captures-only fail-soft search from a stand-pat score. The result may
    /// fall outside `alpha..beta`.
    fn quiescence(&mut self, state: &mut State, mut alpha: i32, beta: i32, ply: u16) -> i32 {
        self.nodes += 1;

        let stand_pat = self.scorer.score(state, state.side_to_move());
        if stand_pat >= beta {
            return stand_pat;
        }
        let mut best = stand_pat;
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let (mut lists, mut ordered) = self.take_buffers(ply);
        generate_legal_moves(state, false, &self.history, &mut lists);
        lists
            .captures
            .sort_by(|a, b| b.exchange_score.cmp(&a.exchange_score));
        ordered.clear();
        ordered.extend(lists.captures.iter().map(|capture| capture.mv));

        for &mv in &ordered {
            state.make_move(mv);
            let score = -self.quiescence(state, -beta, -alpha, ply + 1);
            state.unmake_move(mv);

            if score > best {
                best = score;
            }
            if score >= beta {
                break;
            }
            if score > alpha {
                alpha = score;
            }
        }

        self.put_buffers(ply, lists, ordered);
        best
    }

    fn take_buffers(&mut self, ply: u16) -> (MoveLists, Vec<Move>) {
        let ply = usize::from(ply);
        if self.move_lists.len() <= ply {
            self.move_lists
                .resize_with(ply + 1, || MoveLists::with_capacity(16, 48));
            self.ordered.resize_with(ply + 1, || Vec::with_capacity(64));
        }
        (
            std::mem::take(&mut self.move_lists[ply]),
            std::mem::take(&mut self.ordered[ply]),
        )
    }

    fn put_buffers(&mut self, ply: u16, lists: MoveLists, ordered: Vec<Move>) {
        let ply = usize::from(ply);
        self.move_lists[ply] = lists;
        self.ordered[ply] = ordered;
    }

    /// Follow hash moves from the root. Stops on a missing or illegal move
    /// or a position already on the line.
    fn principal_variation(&self, state: &mut State, best_move: Move, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut seen = vec![state.hash()];

        let mut next = best_move;
        while pv.len() < max_len && !next.is_nil() {
            if !state.legal_moves(true).contains(next) {
                break;
            }
            state.make_move(next);
            pv.push(next);
            if seen.contains(&state.hash()) {
                break;
            }
            seen.push(state.hash());
            next = self
                .tt
                .peek(state.hash())
                .map_or(Move::NIL, |entry| entry.best_move);
        }

        for mv in pv.iter().rev() {
            state.unmake_move(*mv);
        }
        pv
    }
}

enum MovesOutcome {
    Cutoff(Move),
    Improved(i32, Move),
    AllFailedLow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::board_scoring::{MaterialScorer, MATE_THRESHOLD};
    use crate::utils::long_algebraic::parse_long_algebraic;

    const BUDGET: Duration = Duration::from_secs(60);

    fn searcher(max_depth: u8) -> Searcher {
        Searcher::new(SearchConfig {
            tt_size_mb: 1,
            debug_verbose: false,
            max_depth: Some(max_depth),
        })
    }

    fn play(state: &mut State, moves: &[&str]) {
        for text in moves {
            let mv = parse_long_algebraic(text, state).expect("move should be legal");
            state.make_move(mv);
        }
    }

    #[test]
    fn search_returns_a_legal_move_from_the_start() {
        let mut state = State::starting_position().expect("start should build");
        let fen = state.to_fen();
        let result = searcher(3).search(&mut state, BUDGET);

        assert!(state.legal_moves(true).contains(result.best_move));
        assert_eq!(result.depth, 3);
        assert!(result.nodes > 0);
        assert_eq!(state.to_fen(), fen, "search must leave the position untouched");
    }

    #[test]
    fn search_finds_mate_in_one() {
        let mut state = State::from_fen("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1").expect("FEN should parse");
        let result = searcher(3).search(&mut state, BUDGET);

        state.make_move(result.best_move);
        assert!(state.is_in_check());
        assert!(state.legal_moves(true).is_empty(), "best move should deliver mate");
        assert!(result.score > MATE_THRESHOLD, "got {}", result.score);
    }

    #[test]
    fn search_takes_the_hanging_queen() {
        let mut state = State::from_fen("4k3/8/8/8/8/8/4q3/4KQ2 w - - 0 1").expect("FEN should parse");
        let result = searcher(2).search(&mut state, BUDGET);
        assert_eq!(result.best_move.to(), 12, "expected a capture on e2, got {}", result.best_move);
    }

    #[test]
    fn search_with_no_moves_returns_nil() {
        let mut mated = State::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        let result = searcher(4).search(&mut mated, BUDGET);
        assert!(result.best_move.is_nil());
        assert_eq!(result.score, -MATE_SCORE);

        let mut stalemate = State::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        let result = searcher(4).search(&mut stalemate, BUDGET);
        assert!(result.best_move.is_nil());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn third_repetition_inside_search_scores_zero() {
        let mut state = State::starting_position().expect("start should build");
        play(&mut state, &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(state.repetition_count(), 3);

        let mut searcher = searcher(4);
        let (score, mv) = searcher.negamax(&mut state, 3, -INF, INF, 1, false, false);
        assert_eq!(score, 0);
        assert!(mv.is_nil());
    }

    #[test]
    fn principal_variation_starts_with_best_move() {
        let mut state = State::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .expect("FEN should parse");
        let result = searcher(4).search(&mut state, BUDGET);

        assert!(!result.pv.is_empty());
        assert_eq!(result.pv[0], result.best_move);
        assert!(result.pv.len() <= 4);
    }

    #[test]
    fn quiescence_resolves_hanging_captures() {
        let mut state = State::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").expect("FEN should parse");
        let mut searcher = Searcher::with_scorer(
            SearchConfig { tt_size_mb: 1, ..SearchConfig::default() },
            Box::new(MaterialScorer),
        );
        let score = searcher.quiescence(&mut state, -INF, INF, 0);
        assert_eq!(score, 500);
    }

    #[test]
    fn quiescence_returns_scores_beyond_the_window() {
        let mut searcher = Searcher::with_scorer(
            SearchConfig { tt_size_mb: 1, ..SearchConfig::default() },
            Box::new(MaterialScorer),
        );

        let mut queen_up = State::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").expect("FEN should parse");
        assert_eq!(searcher.quiescence(&mut queen_up, -100, 100, 0), 900);

        let mut hanging = State::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").expect("FEN should parse");
        assert_eq!(searcher.quiescence(&mut hanging, -600, 0, 0), 500);

        let mut queen_down = State::from_fen("3qk3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(searcher.quiescence(&mut queen_down, 0, 100, 0), -900);
    }

    #[test]
    fn fifty_move_rule_inside_search_scores_zero() {
        let mut state = State::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 100 80").expect("FEN should parse");
        let (score, mv) = searcher(3).negamax(&mut state, 3, -INF, INF, 1, false, false);
        assert_eq!(score, 0);
        assert!(mv.is_nil());
    }

    #[test]
    fn exhausted_budget_falls_back_to_an_ordered_legal_move() {
        let mut state = State::starting_position().expect("start should build");
        let result = searcher(10).search(&mut state, Duration::ZERO);
        assert_eq!(result.depth, 0);
        assert!(state.legal_moves(true).contains(result.best_move));
    }
}
