//! Baseline search runner over a fixed position suite.
//!
//! Usage:
//! `cargo run --release --bin search_baseline`
//! `cargo run --release --bin search_baseline -- --depth 7 --millis 5000`
//!
//! Set `RUST_LOG=magpie_chess=debug` for per-depth progress.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use magpie_chess::chess_errors::ChessResult;
use magpie_chess::engines::engine::{Engine, EngineConfig};
use magpie_chess::search::iterative_deepening::SearchConfig;
use magpie_chess::utils::long_algebraic::move_to_long_algebraic;

const SUITE: &[(&str, &str)] = &[
    (
        "startpos",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ),
    (
        "classical_mid",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    ),
    (
        "tactical",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
    ("end_kpk", "8/8/8/8/8/4k3/4P3/4K3 w - - 0 1"),
];

fn parse_arg<T: std::str::FromStr>(flag: &str) -> Option<T> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|value| value.parse().ok())
}

fn main() -> ChessResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let depth = parse_arg::<u8>("--depth").unwrap_or(6).max(1);
    let budget = Duration::from_millis(parse_arg::<u64>("--millis").unwrap_or(10_000));
    let config = EngineConfig {
        search: SearchConfig {
            max_depth: Some(depth),
            ..SearchConfig::default()
        },
    };

    println!("search baseline: depth={depth} budget_ms={}", budget.as_millis());
    for (name, fen) in SUITE {
        let mut engine = Engine::from_fen(fen, config)?;
        let result = engine.search(budget);
        let pv: Vec<String> = result.pv.iter().map(|mv| move_to_long_algebraic(*mv)).collect();
        println!(
            "{name}: depth={} nodes={} elapsed_ms={} nps={} score={} best_move={} tt_hit_rate={:.3} pv={}",
            result.depth,
            result.nodes,
            result.elapsed.as_millis(),
            result.nps,
            result.score,
            move_to_long_algebraic(result.best_move),
            result.tt_stats.hit_rate(),
            pv.join(" ")
        );
    }
    Ok(())
}
