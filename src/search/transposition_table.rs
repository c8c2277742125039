//! Fixed-size transposition table keyed by Zobrist hash.
//!
//! Direct mapped with always-overwrite replacement. Scores are stored as
//! `i16` with mate distances made relative to the storing node, so an entry
//! can be reused at any ply.

use crate::moves::chess_move::Move;
use crate::search::board_scoring::{MATE_SCORE, MATE_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    /// Cut node: the true score is at least the stored one.
    Lower,
    /// All node: the true score is at most the stored one.
    Upper,
    /// Checkmate or stalemate. Valid at any depth.
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub score: i16,
    pub best_move: Move,
    pub depth: u8,
    pub node_type: NodeType,
}

impl TTEntry {
    /// Stored score re-based to a node `ply` plies from the root.
    #[inline]
    pub fn score_at_ply(&self, ply: u16) -> i32 {
        score_from_storage(i32::from(self.score), ply)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

impl TTStats {
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    stats: TTStats,
}

impl TranspositionTable {
    pub fn new_with_mb(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let entry_size = std::mem::size_of::<Option<TTEntry>>().max(1);
        let count = (bytes / entry_size).max(1);
        Self {
            entries: vec![None; count],
            stats: TTStats::default(),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.stats = TTStats::default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    #[inline]
    fn idx(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    pub fn probe(&mut self, key: u64) -> Option<TTEntry> {
        self.stats.probes += 1;
        let entry = self.entries[self.idx(key)].filter(|entry| entry.key == key);
        if entry.is_some() {
            self.stats.hits += 1;
        }
        entry
    }

    /// Read an entry without touching the counters.
    #[inline]
    pub fn peek(&self, key: u64) -> Option<TTEntry> {
        self.entries[self.idx(key)].filter(|entry| entry.key == key)
    }

    /// `score` is relative to the root, `ply` is the storing node's distance
    /// from it.
    pub fn store(
        &mut self,
        key: u64,
        score: i32,
        best_move: Move,
        depth: u8,
        node_type: NodeType,
        ply: u16,
    ) {
        self.stats.stores += 1;
        let idx = self.idx(key);
        self.entries[idx] = Some(TTEntry {
            key,
            score: quantize(score_to_storage(score, ply)),
            best_move,
            depth,
            node_type,
        });
    }
}

#[inline]
fn quantize(score: i32) -> i16 {
    score.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Mate scores become "mate in n from this node".
#[inline]
fn score_to_storage(score: i32, ply: u16) -> i32 {
    let ply = i32::from(ply);
    if score > MATE_THRESHOLD {
        (score + ply).min(MATE_SCORE)
    } else if score < -MATE_THRESHOLD {
        (score - ply).max(-MATE_SCORE)
    } else {
        score
    }
}

#[inline]
fn score_from_storage(score: i32, ply: u16) -> i32 {
    let ply = i32::from(ply);
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}
