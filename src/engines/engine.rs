//! Engine facade: one game position plus the searcher that thinks about it.

use std::time::Duration;

use crate::chess_errors::ChessResult;
use crate::game_state::chess_types::State;
use crate::moves::chess_move::Move;
use crate::search::iterative_deepening::{SearchConfig, SearchResult, Searcher};
use crate::utils::long_algebraic::parse_long_algebraic;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub search: SearchConfig,
}

pub struct Engine {
    state: State,
    searcher: Searcher,
}

impl Engine {
    /// Engine at the standard starting position.
    pub fn new(config: EngineConfig) -> ChessResult<Self> {
        Ok(Self {
            state: State::starting_position()?,
            searcher: Searcher::new(config.search),
        })
    }

    pub fn from_fen(fen: &str, config: EngineConfig) -> ChessResult<Self> {
        Ok(Self {
            state: State::from_fen(fen)?,
            searcher: Searcher::new(config.search),
        })
    }

    #[inline]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Replace the position and forget earlier search results.
    pub fn set_position(&mut self, fen: &str) -> ChessResult<()> {
        self.state = State::from_fen(fen)?;
        self.searcher.clear();
        Ok(())
    }

    /// Best move for the side to move, or [`Move::NIL`] when it has none.
    pub fn best_move(&mut self, time_budget: Duration) -> Move {
        self.search(time_budget).best_move
    }

    pub fn search(&mut self, time_budget: Duration) -> SearchResult {
        self.searcher.search(&mut self.state, time_budget)
    }

    /// Play a move given as long algebraic text such as `e2e4` or `e7e8q`.
    pub fn apply_move_text(&mut self, text: &str) -> ChessResult<Move> {
        let mv = parse_long_algebraic(text, &self.state)?;
        self.state.make_move(mv);
        Ok(mv)
    }

    /// Play an already generated legal move.
    pub fn apply_move(&mut self, mv: Move) -> ChessResult<()> {
        self.state.try_make_move(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_errors::ChessError;
    use crate::game_state::chess_types::Color;

    fn shallow() -> EngineConfig {
        EngineConfig {
            search: SearchConfig {
                tt_size_mb: 1,
                debug_verbose: false,
                max_depth: Some(3),
            },
        }
    }

    #[test]
    fn engine_plays_a_legal_move_and_can_apply_it() {
        let mut engine = Engine::new(shallow()).expect("engine should build");
        let mv = engine.best_move(Duration::from_secs(30));
        assert!(engine.state().legal_moves(true).contains(mv));

        engine.apply_move(mv).expect("engine move should apply");
        assert_eq!(engine.state().side_to_move(), Color::Dark);
    }

    #[test]
    fn apply_move_text_updates_position() {
        let mut engine = Engine::new(shallow()).expect("engine should build");
        engine.apply_move_text("e2e4").expect("e2e4 should be legal");
        engine.apply_move_text("c7c5").expect("c7c5 should be legal");
        assert_eq!(
            engine.state().to_fen(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2"
        );
    }

    #[test]
    fn apply_move_text_rejects_illegal_moves() {
        let mut engine = Engine::new(shallow()).expect("engine should build");
        let before = engine.state().to_fen();
        assert_eq!(
            engine.apply_move_text("e2e5"),
            Err(ChessError::IllegalMove("e2e5".to_owned()))
        );
        assert_eq!(engine.state().to_fen(), before);
    }

    #[test]
    fn engine_without_moves_answers_nil() {
        let mut engine =
            Engine::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1", shallow()).expect("FEN should parse");
        assert!(engine.best_move(Duration::from_secs(1)).is_nil());
    }

    #[test]
    fn set_position_rejects_bad_fen_and_keeps_state() {
        let mut engine = Engine::new(shallow()).expect("engine should build");
        assert!(engine.set_position("not a fen").is_err());
        assert_eq!(engine.state().fullmove_number(), 1);
    }
}
