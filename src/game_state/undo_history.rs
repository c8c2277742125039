//! Undo bookkeeping for make/unmake.
//!
//! Each stack entry carries the ply of the move that pushed it. Unmake pops an
//! entry only when its tag matches the ply being undone, so moves that touch
//! nothing push nothing. Tags use wrapping arithmetic: a FEN en-passant target
//! is seeded one ply before the root, which wraps below zero for ply 0.

use std::collections::HashMap;

use crate::game_state::chess_types::{PieceKind, Square};

pub type Ply = u16;

#[derive(Debug, Clone)]
pub struct PlyStack<T> {
    entries: Vec<(Ply, T)>,
}

impl<T: Copy> PlyStack<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, ply: Ply, value: T) {
        self.entries.push((ply, value));
    }

    /// Value on top if it was pushed at `ply`.
    #[inline]
    pub fn peek_at(&self, ply: Ply) -> Option<T> {
        match self.entries.last() {
            Some(&(tag, value)) if tag == ply => Some(value),
            _ => None,
        }
    }

    /// Pop the top entry if it was pushed at `ply`.
    #[inline]
    pub fn pop_at(&mut self, ply: Ply) -> Option<T> {
        let value = self.peek_at(ply)?;
        self.entries.pop();
        Some(value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The four undo stacks a `State` keeps.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    pub captures: PlyStack<PieceKind>,
    pub en_passant: PlyStack<Square>,
    pub castle_rights: PlyStack<usize>,
    /// Halfmove clock before a reset.
    pub fifty: PlyStack<u16>,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self {
            captures: PlyStack::with_capacity(64),
            en_passant: PlyStack::with_capacity(64),
            castle_rights: PlyStack::with_capacity(16),
            fifty: PlyStack::with_capacity(64),
        }
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Occurrence counts of position hashes along the current line.
#[derive(Debug, Clone, Default)]
pub struct RepetitionMap {
    counts: HashMap<u64, u8>,
}

impl RepetitionMap {
    #[inline]
    pub fn add(&mut self, hash: u64) {
        *self.counts.entry(hash).or_insert(0) += 1;
    }

    #[inline]
    pub fn remove(&mut self, hash: u64) {
        if let Some(count) = self.counts.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&hash);
            }
        }
    }

    #[inline]
    pub fn count(&self, hash: u64) -> u8 {
        self.counts.get(&hash).copied().unwrap_or(0)
    }
}
