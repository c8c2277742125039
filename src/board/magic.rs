//! Magic-multiplier sliding attack tables.
//!
//! Each square gets a relevant-occupancy mask, a multiplier and an index
//! width per slider. `(occupancy & mask) * magic >> (64 - bits)` indexes that
//! square's slice of one flat attack array shared by bishops and rooks.
//!
//! Tables are searched once per process. Squares are independent, so the
//! search is split over scoped worker threads and the per-square tables are
//! copied into place by offset after the join.

use std::sync::OnceLock;
use std::thread;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::chess_errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{Bitboard, Square};
use crate::moves::bishop_moves::{bishop_ray_attacks, bishop_relevant_mask};
use crate::moves::rook_moves::{rook_ray_attacks, rook_relevant_mask};

/// Candidates tried per square before giving up.
pub const MAX_MAGIC_ATTEMPTS: u32 = 10_000_000;

/// Total bishop slice size across all squares.
pub const BISHOP_TABLE_LEN: usize = 0x1480;
/// Total rook slice size across all squares.
pub const ROOK_TABLE_LEN: usize = 0x19000;

const MAGIC_SEED: u64 = 0x6D61_6769_6373_2121;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    /// Reference attacks by walking rays.
    pub fn ray_attacks(self, square: Square, occupancy: Bitboard) -> Bitboard {
        match self {
            Slider::Bishop => bishop_ray_attacks(square, occupancy),
            Slider::Rook => rook_ray_attacks(square, occupancy),
        }
    }

    pub fn relevant_mask(self, square: Square) -> Bitboard {
        match self {
            Slider::Bishop => bishop_relevant_mask(square),
            Slider::Rook => rook_relevant_mask(square),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MagicEntry {
    pub mask: Bitboard,
    pub magic: u64,
    pub bits: u32,
    pub offset: usize,
}

impl MagicEntry {
    #[inline]
    fn slot(&self, occupancy: Bitboard) -> usize {
        ((occupancy & self.mask).wrapping_mul(self.magic) >> (64 - self.bits)) as usize
    }

    #[inline]
    fn index(&self, occupancy: Bitboard) -> usize {
        self.offset + self.slot(occupancy)
    }
}

#[derive(Debug)]
pub struct AttackTables {
    bishop: [MagicEntry; 64],
    rook: [MagicEntry; 64],
    attacks: Vec<Bitboard>,
}

impl AttackTables {
    #[inline]
    pub fn bishop_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        self.attacks[self.bishop[square as usize].index(occupancy)]
    }

    #[inline]
    pub fn rook_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        self.attacks[self.rook[square as usize].index(occupancy)]
    }

    #[inline]
    pub fn queen_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        self.bishop_attacks(square, occupancy) | self.rook_attacks(square, occupancy)
    }

    #[inline]
    pub fn slider_attacks(&self, slider: Slider, square: Square, occupancy: Bitboard) -> Bitboard {
        match slider {
            Slider::Bishop => self.bishop_attacks(square, occupancy),
            Slider::Rook => self.rook_attacks(square, occupancy),
        }
    }

    pub fn entry(&self, slider: Slider, square: Square) -> &MagicEntry {
        match slider {
            Slider::Bishop => &self.bishop[square as usize],
            Slider::Rook => &self.rook[square as usize],
        }
    }

    pub fn attack_table_len(&self) -> usize {
        self.attacks.len()
    }
}

static TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Process-wide attack tables, searched on first use.
pub fn attack_tables() -> ChessResult<&'static AttackTables> {
    if let Some(tables) = TABLES.get() {
        return Ok(tables);
    }
    let built = build_attack_tables()?;
    Ok(TABLES.get_or_init(|| built))
}

struct SquareMagic {
    job: usize,
    magic: u64,
    table: Vec<Bitboard>,
}

/// Search every square's multiplier and assemble the flat table.
pub fn build_attack_tables() -> ChessResult<AttackTables> {
    let started = Instant::now();

    let jobs: Vec<(Slider, Square)> = [Slider::Bishop, Slider::Rook]
        .into_iter()
        .flat_map(|slider| (0..64u8).map(move |sq| (slider, sq)))
        .collect();

    let mut bishop = [MagicEntry::default(); 64];
    let mut rook = [MagicEntry::default(); 64];
    let mut offset = 0usize;
    for &(slider, square) in &jobs {
        let mask = slider.relevant_mask(square);
        let entry = MagicEntry {
            mask,
            magic: 0,
            bits: mask.count_ones(),
            offset,
        };
        offset += 1usize << entry.bits;
        match slider {
            Slider::Bishop => bishop[square as usize] = entry,
            Slider::Rook => rook[square as usize] = entry,
        }
    }
    debug_assert_eq!(offset, BISHOP_TABLE_LEN + ROOK_TABLE_LEN);

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(jobs.len());

    let worker_results: Vec<ChessResult<Vec<SquareMagic>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let jobs = &jobs;
                scope.spawn(move || {
                    jobs.iter()
                        .enumerate()
                        .skip(worker)
                        .step_by(workers)
                        .map(|(job, &(slider, square))| {
                            find_magic(slider, square).map(|(magic, table)| SquareMagic {
                                job,
                                magic,
                                table,
                            })
                        })
                        .collect::<ChessResult<Vec<SquareMagic>>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| ChessError::WorkerThreadPanicked("magic search"))
                    .and_then(|result| result)
            })
            .collect()
    });

    let mut attacks = vec![0u64; offset];
    for result in worker_results {
        for found in result? {
            let (slider, square) = jobs[found.job];
            let entry = match slider {
                Slider::Bishop => &mut bishop[square as usize],
                Slider::Rook => &mut rook[square as usize],
            };
            entry.magic = found.magic;
            attacks[entry.offset..entry.offset + found.table.len()].copy_from_slice(&found.table);
        }
    }

    debug!(
        workers,
        entries = attacks.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "built magic attack tables"
    );

    Ok(AttackTables {
        bishop,
        rook,
        attacks,
    })
}

/// Every subset of `mask` paired with its true attack set.
fn occupancy_subsets(slider: Slider, square: Square, mask: Bitboard) -> Vec<(Bitboard, Bitboard)> {
    let mut subsets = Vec::with_capacity(1usize << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push((subset, slider.ray_attacks(square, subset)));
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

fn find_magic(slider: Slider, square: Square) -> ChessResult<(u64, Vec<Bitboard>)> {
    let mask = slider.relevant_mask(square);
    let bits = mask.count_ones();
    let subsets = occupancy_subsets(slider, square, mask);

    let slider_salt = match slider {
        Slider::Bishop => 0,
        Slider::Rook => 1u64 << 32,
    };
    let mut rng = StdRng::seed_from_u64(MAGIC_SEED ^ slider_salt ^ u64::from(square));

    let size = 1usize << bits;
    let mut table = vec![0u64; size];
    let mut filled = vec![false; size];

    for _ in 0..MAX_MAGIC_ATTEMPTS {
        let magic = rng.random::<u64>() & rng.random::<u64>() & rng.random::<u64>();
        if (mask.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }

        let candidate = MagicEntry {
            mask,
            magic,
            bits,
            offset: 0,
        };
        filled.fill(false);

        let collision_free = subsets.iter().all(|&(occupancy, attacks)| {
            let slot = candidate.slot(occupancy);
            if filled[slot] {
                table[slot] == attacks
            } else {
                filled[slot] = true;
                table[slot] = attacks;
                true
            }
        });

        if collision_free {
            return Ok((magic, table));
        }
    }

    Err(ChessError::MagicSearchExhausted { slider, square })
}
