//! Shared transposition table.
//!
//! Workers probe and save concurrently without locks. Every entry field is its
//! own small atomic written with `Relaxed` ordering, so a field is never torn,
//! but a reader racing a writer can observe fields from two different writes.
//! The 16-bit key check is the only cross-field guard: a mixed read is either a
//! miss, a correct hit, or a rare false hit that callers must tolerate the same
//! way they tolerate a hash collision (validate the move, trust bound/depth only
//! as hints).

use crate::error::Result;
use crate::search::eval::{correct_score, SCORE_NONE};
use cozy_chess::{Move, Piece, Square};
use rayon::prelude::*;
use std::sync::atomic::{AtomicI16, AtomicI8, AtomicU16, AtomicU8, Ordering};

pub const CLUSTER_SIZE: usize = 3;
/// Generations wrap at this length; stored in 5 bits of the meta byte.
pub const AGE_CYCLE: u8 = 32;
const HASH_FULL_SAMPLE: usize = 1000;
const CACHE_LINE: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    Empty = 0,
    Exact = 1,
    Lower = 2,
    Upper = 3,
}

impl Bound {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            1 => Bound::Exact,
            2 => Bound::Lower,
            3 => Bound::Upper,
            _ => Bound::Empty,
        }
    }
}

/// Unpacked entry: the candidate passed to [`Tt::save`] and the result of
/// [`Slot::read`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub depth: i32,
    pub score: i32,
    pub static_eval: i32,
    pub best: Option<Move>,
    pub bound: Bound,
    pub was_pv: bool,
}

impl Default for Entry {
    fn default() -> Self {
        Self { depth: 0, score: SCORE_NONE, static_eval: SCORE_NONE, best: None, bound: Bound::Empty, was_pv: false }
    }
}

fn encode_move(mv: Option<Move>) -> u16 {
    let Some(mv) = mv else { return 0 };
    let promo = match mv.promotion {
        Some(Piece::Knight) => 1,
        Some(Piece::Bishop) => 2,
        Some(Piece::Rook) => 3,
        Some(Piece::Queen) => 4,
        _ => 0,
    };
    (mv.from as u16) | ((mv.to as u16) << 6) | (promo << 12)
}

fn decode_move(bits: u16) -> Option<Move> {
    if bits == 0 {
        return None;
    }
    let promotion = match bits >> 12 {
        1 => Some(Piece::Knight),
        2 => Some(Piece::Bishop),
        3 => Some(Piece::Rook),
        4 => Some(Piece::Queen),
        _ => None,
    };
    Some(Move {
        from: Square::index((bits & 0x3F) as usize),
        to: Square::index(((bits >> 6) & 0x3F) as usize),
        promotion,
    })
}

/// One table slot, 10 bytes.
///
/// meta byte: bits 0-1 bound, bit 2 PV flag, bits 3-7 generation.
#[repr(C)]
#[derive(Default, Debug)]
pub struct Slot {
    key: AtomicU16,
    mv: AtomicU16,
    score: AtomicI16,
    static_eval: AtomicI16,
    depth: AtomicI8,
    meta: AtomicU8,
}

impl Slot {
    #[inline]
    pub fn key16(&self) -> u16 { self.key.load(Ordering::Relaxed) }

    #[inline]
    pub fn matches(&self, key: u64) -> bool { self.key16() == key as u16 }

    #[inline]
    pub fn depth(&self) -> i32 { self.depth.load(Ordering::Relaxed) as i32 }

    #[inline]
    pub fn generation(&self) -> u8 { self.meta.load(Ordering::Relaxed) >> 3 }

    #[inline]
    pub fn bound(&self) -> Bound { Bound::from_bits(self.meta.load(Ordering::Relaxed)) }

    pub fn best_move(&self) -> Option<Move> { decode_move(self.mv.load(Ordering::Relaxed)) }

    /// Unpacks the slot with the score shifted back to `ply`. `None` for a slot
    /// that never held a bound.
    pub fn read(&self, ply: i32) -> Option<Entry> {
        let meta = self.meta.load(Ordering::Relaxed);
        let bound = Bound::from_bits(meta);
        if bound == Bound::Empty {
            return None;
        }
        Some(Entry {
            depth: self.depth(),
            score: correct_score(self.score.load(Ordering::Relaxed) as i32, ply),
            static_eval: self.static_eval.load(Ordering::Relaxed) as i32,
            best: self.best_move(),
            bound,
            was_pv: meta & 0b100 != 0,
        })
    }

    /// True when every field is zero, i.e. the slot is as `clear` leaves it.
    pub fn is_zeroed(&self) -> bool {
        self.key16() == 0
            && self.mv.load(Ordering::Relaxed) == 0
            && self.score.load(Ordering::Relaxed) == 0
            && self.static_eval.load(Ordering::Relaxed) == 0
            && self.depth.load(Ordering::Relaxed) == 0
            && self.meta.load(Ordering::Relaxed) == 0
    }

    fn raw_score(&self) -> i32 { self.score.load(Ordering::Relaxed) as i32 }

    fn zero(&self) {
        self.key.store(0, Ordering::Relaxed);
        self.mv.store(0, Ordering::Relaxed);
        self.score.store(0, Ordering::Relaxed);
        self.static_eval.store(0, Ordering::Relaxed);
        self.depth.store(0, Ordering::Relaxed);
        self.meta.store(0, Ordering::Relaxed);
    }
}

#[repr(C, align(32))]
#[derive(Default)]
struct Cluster {
    slots: [Slot; CLUSTER_SIZE],
}

const _: () = assert!(std::mem::size_of::<Cluster>() == 32);

/// Two clusters sharing one cache line; the table is allocated in these so
/// every line boundary is a pair boundary.
#[repr(C, align(64))]
#[derive(Default)]
struct Line {
    clusters: [Cluster; 2],
}

const _: () = assert!(std::mem::size_of::<Line>() == CACHE_LINE);

impl Line {
    fn clear(&self) {
        for s in self.clusters.iter().flat_map(|c| c.slots.iter()) { s.zero(); }
    }
}

fn floor_pow2(n: usize) -> usize {
    if n <= 1 { 1 } else { 1usize << (usize::BITS - 1 - n.leading_zeros()) }
}

pub struct Tt {
    lines: Box<[Line]>,
    gen: AtomicU8,
}

impl Default for Tt {
    fn default() -> Self { Self::with_capacity_mb(16) }
}

impl Tt {
    /// Table with `clusters` rounded down to a power of two (at least 2).
    pub fn new(clusters: usize) -> Self {
        let count = floor_pow2(clusters).max(2);
        let mut v = Vec::with_capacity(count / 2);
        v.resize_with(count / 2, Line::default);
        log::debug!("tt: allocated {} clusters ({} KiB)", count, count * std::mem::size_of::<Cluster>() / 1024);
        Self { lines: v.into_boxed_slice(), gen: AtomicU8::new(0) }
    }

    pub fn with_capacity_mb(mb: usize) -> Self {
        let bytes = mb.saturating_mul(1024 * 1024);
        Self::new(bytes / std::mem::size_of::<Cluster>())
    }

    /// Reallocates for a new budget; everything stored is lost.
    pub fn resize_mb(&mut self, mb: usize) {
        log::info!("tt: resizing to {} MiB", mb);
        *self = Self::with_capacity_mb(mb);
    }

    pub fn cluster_count(&self) -> usize { self.lines.len() * 2 }

    pub fn capacity(&self) -> usize { self.cluster_count() * CLUSTER_SIZE }

    #[inline]
    fn cluster(&self, index: usize) -> &Cluster {
        &self.lines[index >> 1].clusters[index & 1]
    }

    fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.lines.iter().flat_map(|l| l.clusters.iter())
    }

    #[inline]
    fn cluster_index(&self, key: u64) -> usize {
        ((key as u128 * self.cluster_count() as u128) >> 64) as usize
    }

    #[inline]
    pub fn generation(&self) -> u8 { self.gen.load(Ordering::Relaxed) }

    /// Cyclic distance from the slot's generation to the current one.
    #[inline]
    pub fn age_delta(&self, slot: &Slot) -> u32 {
        let cycle = AGE_CYCLE as u32;
        (cycle + self.generation() as u32 - slot.generation() as u32) % cycle
    }

    /// Slot for `key`: an exact 16-bit match or an empty slot if the cluster
    /// has one, otherwise the lowest-quality slot as the eviction candidate.
    /// The caller checks [`Slot::matches`] before trusting the contents.
    pub fn probe(&self, key: u64) -> &Slot {
        let cluster = self.cluster(self.cluster_index(key));
        let key16 = key as u16;
        let mut victim = &cluster.slots[0];
        let mut min_quality = i32::MAX;
        for slot in &cluster.slots {
            let k = slot.key16();
            if k == 0 || k == key16 {
                return slot;
            }
            let quality = slot.depth() - 8 * self.age_delta(slot) as i32;
            if quality < min_quality {
                min_quality = quality;
                victim = slot;
            }
        }
        victim
    }

    /// Convenience lookup: probe and read, only on a key match.
    pub fn get(&self, key: u64, ply: i32) -> Option<Entry> {
        let slot = self.probe(key);
        if slot.matches(key) { slot.read(ply) } else { None }
    }

    pub fn save(&self, slot: &Slot, candidate: Entry, key: u64, ply: i32, in_pv: bool) {
        let same_key = slot.matches(key);
        if candidate.best.is_some() || !same_key {
            slot.mv.store(encode_move(candidate.best), Ordering::Relaxed);
        }

        let gen = self.generation();
        let replace = !same_key
            || candidate.bound == Bound::Exact
            || candidate.depth + 3 + 2 * in_pv as i32 >= slot.depth()
            || slot.generation() != gen;
        if !replace {
            return;
        }

        let score = correct_score(candidate.score, -ply).clamp(i16::MIN as i32, i16::MAX as i32);
        let static_eval = candidate.static_eval.clamp(i16::MIN as i32, i16::MAX as i32);
        let depth = candidate.depth.clamp(i8::MIN as i32, i8::MAX as i32);
        let meta = (candidate.bound as u8) | ((candidate.was_pv as u8) << 2) | (gen << 3);
        slot.score.store(score as i16, Ordering::Relaxed);
        slot.static_eval.store(static_eval as i16, Ordering::Relaxed);
        slot.depth.store(depth as i8, Ordering::Relaxed);
        slot.meta.store(meta, Ordering::Relaxed);
        slot.key.store(key as u16, Ordering::Relaxed);
    }

    /// Advances the generation; call once per search.
    pub fn age(&self) {
        let _ = self.gen.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |g| Some((g + 1) % AGE_CYCLE));
    }

    /// Approximate fill in permille, sampled from the first clusters.
    pub fn hash_full(&self) -> usize {
        let sample = self.cluster_count().min(HASH_FULL_SAMPLE);
        let gen = self.generation();
        let used = self
            .clusters()
            .take(sample)
            .flat_map(|c| c.slots.iter())
            .filter(|s| s.generation() == gen && s.key16() != 0 && s.raw_score() != SCORE_NONE)
            .count();
        used * 1000 / (sample * CLUSTER_SIZE)
    }

    /// Zeroes the table on `workers` threads and blocks until all are done.
    ///
    /// Chunks are runs of whole 64-byte lines. The pool is built before any
    /// memory is touched, so an error here leaves the table as it was.
    pub fn clear(&self, workers: usize) -> Result<()> {
        let workers = workers.clamp(1, self.lines.len());
        let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
        let chunk = self.lines.len().div_ceil(workers);
        pool.install(|| {
            self.lines.par_chunks(chunk).for_each(|part| {
                for line in part { line.clear(); }
            })
        });
        self.gen.store(0, Ordering::Relaxed);
        log::debug!("tt: cleared {} lines on {} workers (chunk {})", self.lines.len(), workers, chunk);
        Ok(())
    }

    /// Every slot in table order; for diagnostics and tests.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.clusters().flat_map(|c| c.slots.iter())
    }

    /// Number of slots holding a bound (full scan).
    pub fn occupied(&self) -> usize {
        self.slots().filter(|s| s.bound() != Bound::Empty).count()
    }
}
