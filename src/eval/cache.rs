/// Direct-mapped memo of network evaluations, owned by one worker.
///
/// One entry per bucket; a store always overwrites whatever the bucket held.
pub struct EvalCache {
    entries: Box<[CacheEntry]>,
}

#[derive(Clone, Copy, Default)]
struct CacheEntry {
    key: u64,
    score: i32,
}

impl EvalCache {
    pub const SIZE: usize = 1 << 16;
    const MASK: u64 = Self::SIZE as u64 - 1;

    pub fn new() -> Self {
        Self { entries: vec![CacheEntry::default(); Self::SIZE].into_boxed_slice() }
    }

    #[inline]
    fn index(key: u64) -> usize { (key & Self::MASK) as usize }

    /// Score stored for exactly `key`, if any.
    #[inline]
    pub fn probe(&self, key: u64) -> Option<i32> {
        let e = &self.entries[Self::index(key)];
        (e.key == key).then_some(e.score)
    }

    #[inline]
    pub fn store(&mut self, key: u64, score: i32) {
        self.entries[Self::index(key)] = CacheEntry { key, score };
    }

    pub fn clear(&mut self) {
        self.entries.fill(CacheEntry::default());
    }
}

impl Default for EvalCache {
    fn default() -> Self { Self::new() }
}
