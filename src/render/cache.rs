use std::num::NonZeroUsize;

use lru::LruCache;

use super::frame::{PageKey, RgbaFrame};

const DEFAULT_MEMORY_BUDGET_BYTES: usize = 256 * 1024 * 1024;
const DEFAULT_MAX_ENTRIES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Decoded page frames, bounded by entry count and memory budget.
#[derive(Debug, Clone)]
pub struct PageCache {
    max_entries: usize,
    memory_budget_bytes: usize,
    memory_bytes: usize,
    entries: LruCache<PageKey, RgbaFrame>,
    counters: CacheCounters,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_MEMORY_BUDGET_BYTES)
    }
}

impl PageCache {
    pub fn new(max_entries: usize, memory_budget_bytes: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            max_entries,
            memory_budget_bytes: memory_budget_bytes.max(1),
            memory_bytes: 0,
            entries: LruCache::new(NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN)),
            counters: CacheCounters::default(),
        }
    }

    pub fn get(&mut self, key: &PageKey) -> Option<&RgbaFrame> {
        if self.entries.peek(key).is_some() {
            self.counters.hits += 1;
            return self.entries.get(key);
        }

        self.counters.misses += 1;
        None
    }

    pub fn insert(&mut self, key: PageKey, frame: RgbaFrame) {
        if let Some(prev) = self.entries.pop(&key) {
            self.memory_bytes = self.memory_bytes.saturating_sub(prev.byte_len());
        }

        if let Some((_evicted_key, evicted)) = self.entries.push(key, frame.clone()) {
            self.memory_bytes = self.memory_bytes.saturating_sub(evicted.byte_len());
            self.counters.evictions += 1;
        }
        self.memory_bytes += frame.byte_len();
        self.evict_while_needed();
    }

    /// Drops every frame that does not belong to `generation`.
    pub fn retain_generation(&mut self, generation: u64) {
        let doomed: Vec<_> = self
            .entries
            .iter()
            .filter_map(|(key, _)| (key.generation != generation).then_some(*key))
            .collect();

        for key in doomed {
            if let Some(frame) = self.entries.pop(&key) {
                self.memory_bytes = self.memory_bytes.saturating_sub(frame.byte_len());
                self.counters.evictions += 1;
            }
        }
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.entries.peek(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn memory_budget_bytes(&self) -> usize {
        self.memory_budget_bytes
    }

    pub fn memory_bytes(&self) -> usize {
        self.memory_bytes
    }

    pub fn counters(&self) -> CacheCounters {
        self.counters
    }

    pub fn hit_rate(&self) -> f64 {
        let lookups = self.counters.hits + self.counters.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.counters.hits as f64 / lookups as f64
    }

    fn evict_while_needed(&mut self) {
        // A lone oversized frame stays resident so the current page can draw.
        while self.entries.len() > 1 && self.memory_bytes > self.memory_budget_bytes {
            let Some((_key, frame)) = self.entries.pop_lru() else {
                break;
            };
            self.memory_bytes = self.memory_bytes.saturating_sub(frame.byte_len());
            self.counters.evictions += 1;
        }
    }
}
