//! Sharded accumulator for parallel relevance scoring.
//!
//! Keys are partitioned by hash across a fixed number of shards, each behind
//! its own `parking_lot::Mutex`. A writer only ever holds one shard lock, so
//! writers touching different shards never block each other and no lock
//! ordering is needed.
//!
//! Draining takes `&mut self`: the borrow checker guarantees every worker has
//! finished (e.g. a rayon `for_each` has returned) before the merge runs.

use parking_lot::Mutex;
use rustc_hash::FxHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::mem;

pub struct ShardedAccumulator<K> {
    shards: Vec<Mutex<BTreeMap<K, f64>>>,
}

impl<K: Ord + Hash> ShardedAccumulator<K> {
    /// # Panics
    ///
    /// Panics if `shard_count` is zero.
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard count must be at least 1");
        let shards = (0..shard_count).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, key: &K) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Add `delta` to the running total for `key`, starting from zero.
    pub fn accumulate(&self, key: K, delta: f64) {
        let idx = self.shard_index(&key);
        let mut shard = self.shards[idx].lock();
        *shard.entry(key).or_insert(0.0) += delta;
    }

    /// Merge every shard into one ordered map, leaving the accumulator empty.
    pub fn drain_to_ordered_map(&mut self) -> BTreeMap<K, f64> {
        let mut merged = BTreeMap::new();
        for shard in &mut self.shards {
            // keys are disjoint across shards
            merged.append(&mut mem::take(shard.get_mut()));
        }
        merged
    }

    pub fn into_ordered_map(mut self) -> BTreeMap<K, f64> {
        self.drain_to_ordered_map()
    }
}
