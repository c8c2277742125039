//! Crate root module declarations for the Magpie chess engine.
//!
//! Exposes the board primitives, game state, legal move generation, search
//! and the engine facade so binaries, benches and external tooling can import
//! stable module paths.

pub mod chess_errors;

pub mod board {
    pub mod bitboard;
    pub mod geometry;
    pub mod magic;
}

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod make_unmake;
    pub mod pins;
    pub mod undo_history;
}

pub mod moves {
    pub mod bishop_moves;
    pub mod chess_move;
    pub mod king_moves;
    pub mod knight_moves;
    pub mod pawn_moves;
    pub mod rook_moves;
}

pub mod move_generation {
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod move_ordering;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod engines {
    pub mod engine;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
}
