//! Composition result cache
//!
//! Results are memoised by a fingerprint of the whole request. The cache is
//! size-bounded with first-in first-out eviction; a hit does not refresh an
//! entry's position. Registration of any template clears the cache, since a
//! changed registry can change what any request composes into.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};

use crate::compose::request::CompositionRequest;
use crate::compose::result::CompositionResult;

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Stable-for-the-process digest of a request
pub fn fingerprint(request: &CompositionRequest) -> u64 {
    let mut hasher = DefaultHasher::new();
    request.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
pub struct CompositionCache {
    capacity: usize,
    order: VecDeque<u64>,
    entries: HashMap<u64, CompositionResult>,
}

impl CompositionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fingerprint: u64) -> Option<&CompositionResult> {
        self.entries.get(&fingerprint)
    }

    pub fn insert(&mut self, fingerprint: u64, result: CompositionResult) {
        if self.entries.contains_key(&fingerprint) {
            self.entries.insert(fingerprint, result);
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(fingerprint);
        self.entries.insert(fingerprint, result);
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}

impl Default for CompositionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
