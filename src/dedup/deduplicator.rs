//! Bounded occurrence counter keyed by the fingerprint of a compacted body.

use crate::utils::config::DEFAULT_CACHE_CAPACITY;
use log::debug;
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hash of a rendered body, stable for the lifetime of the process
pub fn fingerprint(body: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    hasher.finish()
}

/// Occurrence counts shared by every caller of one compacter
///
/// Once more than `capacity` distinct fingerprints are tracked the whole map
/// is cleared and only the newest entry is kept. Colliding fingerprints share
/// one counter.
#[derive(Debug)]
pub struct Deduplicator {
    capacity: usize,
    counts: RwLock<HashMap<u64, AtomicUsize>>,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl Deduplicator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            counts: RwLock::new(HashMap::new()),
        }
    }

    /// Count one more occurrence of `body`, returning the new total
    pub fn record(&self, body: &str) -> usize {
        self.record_fingerprint(fingerprint(body))
    }

    /// Count one more occurrence of an already computed fingerprint
    pub fn record_fingerprint(&self, fingerprint: u64) -> usize {
        // Known fingerprints only need the shared lock
        if let Some(count) = self.counts.read().get(&fingerprint) {
            return count.fetch_add(1, Ordering::Relaxed) + 1;
        }

        let mut counts = self.counts.write();
        if let Some(count) = counts.get(&fingerprint) {
            return count.fetch_add(1, Ordering::Relaxed) + 1;
        }
        counts.insert(fingerprint, AtomicUsize::new(1));
        if counts.len() > self.capacity {
            debug!("Dedup cache exceeded {} entries, clearing", self.capacity);
            counts.clear();
            counts.insert(fingerprint, AtomicUsize::new(1));
        }
        1
    }

    /// Current count for a fingerprint, if tracked
    pub fn count(&self, fingerprint: u64) -> Option<usize> {
        self.counts
            .read()
            .get(&fingerprint)
            .map(|count| count.load(Ordering::Relaxed))
    }

    pub fn len(&self) -> usize {
        self.counts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.counts.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint("java.lang.Exception"), fingerprint("java.lang.Exception"));
        assert_ne!(fingerprint("java.lang.Exception"), fingerprint("java.lang.Error"));
    }

    #[test]
    fn test_record_counts_occurrences() {
        let dedup = Deduplicator::default();
        assert_eq!(dedup.record("body a"), 1);
        assert_eq!(dedup.record("body a"), 2);
        assert_eq!(dedup.record("body b"), 1);
        assert_eq!(dedup.record("body a"), 3);
        assert_eq!(dedup.count(fingerprint("body a")), Some(3));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_overflow_clears_everything_but_newest() {
        let dedup = Deduplicator::new(3);
        dedup.record_fingerprint(1);
        dedup.record_fingerprint(1);
        dedup.record_fingerprint(2);
        dedup.record_fingerprint(3);
        assert_eq!(dedup.len(), 3);

        assert_eq!(dedup.record_fingerprint(4), 1);
        assert_eq!(dedup.len(), 1);
        assert_eq!(dedup.count(4), Some(1));
        assert_eq!(dedup.count(1), None);

        // History of 1 is gone
        assert_eq!(dedup.record_fingerprint(1), 1);
    }

    #[test]
    fn test_repeat_at_capacity_does_not_evict() {
        let dedup = Deduplicator::new(2);
        dedup.record_fingerprint(1);
        dedup.record_fingerprint(2);
        assert_eq!(dedup.record_fingerprint(2), 2);
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_clear() {
        let dedup = Deduplicator::default();
        dedup.record("x");
        dedup.clear();
        assert!(dedup.is_empty());
        assert_eq!(dedup.record("x"), 1);
    }

    #[test]
    fn test_concurrent_increments() {
        let dedup = Deduplicator::default();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        dedup.record("shared body");
                    }
                });
            }
        });
        assert_eq!(dedup.count(fingerprint("shared body")), Some(2000));
        assert_eq!(dedup.len(), 1);
    }
}
