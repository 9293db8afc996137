//! Per-key offset buckets with downward-range queries.
//!
//! A weight map records, for a stream of (offset, key) insertions and
//! removals, which offsets currently carry a given numeral key, and can
//! enumerate every offset whose key is at most a bound. The subsumption
//! index instantiates one map per coordinate plus one for the evaluation
//! scalar and intersects their answers round by round through a shared
//! scratch table ([`OffsetRefs`]).
//!
//! Keys are mapped lazily to dense indices (the only hash map in the
//! engine); the dense indices are ordered by a [`KeyedMinHeap`] so that
//! "all keys `<= k`" is a pruned heap traversal. Only non-negative keys
//! enter the heap: negative keys are reachable solely through their
//! equality bucket, which is what the dominance relation demands of
//! negative evaluations.

use hashbrown::HashMap;
use num_traits::{Signed, Zero};

use crate::heap::KeyedMinHeap;
use crate::numeral::Numeral;
use crate::store::Offset;

const UNSEEN: u32 = u32::MAX;

/// Scratch table mapping offsets to the last candidate round they survived.
///
/// Flat array keyed by offset index with a touched-list for cheap clearing;
/// buffers are retained across queries.
#[derive(Debug, Default)]
pub struct OffsetRefs {
    rounds: Vec<u32>,
    touched: Vec<u32>,
}

impl OffsetRefs {
    /// Create an empty table.
    pub fn new() -> Self {
        OffsetRefs::default()
    }

    /// Record `offset` as a round-zero candidate.
    pub fn seed(&mut self, offset: Offset) {
        self.put(offset, 0);
    }

    /// The round recorded for `offset`, if any.
    pub fn round(&self, offset: Offset) -> Option<u32> {
        self.rounds
            .get(offset.index())
            .copied()
            .filter(|&r| r != UNSEEN)
    }

    /// Record `offset` as having survived up to `round`.
    pub fn put(&mut self, offset: Offset, round: u32) {
        let i = offset.index();
        if i >= self.rounds.len() {
            self.rounds.resize(i + 1, UNSEEN);
        }
        if self.rounds[i] == UNSEEN {
            self.touched.push(i as u32);
        }
        self.rounds[i] = round;
    }

    /// Forget all recorded offsets; capacity is retained.
    pub fn clear(&mut self) {
        for &t in &self.touched {
            self.rounds[t as usize] = UNSEEN;
        }
        self.touched.clear();
    }
}

/// Offset buckets keyed by numeral value, with `<=`-range enumeration.
#[derive(Debug, Default)]
pub struct WeightMap<N> {
    heap: KeyedMinHeap<N>,
    /// Key → dense index bijection, established lazily.
    dense: HashMap<N, u32>,
    /// Dense index → offsets currently carrying that key.
    buckets: Vec<Vec<Offset>>,
    /// Recycled list of dense indices with keys below the query bound.
    le: Vec<u32>,
}

impl<N: Numeral> WeightMap<N> {
    /// Create an empty map.
    pub fn new() -> Self {
        WeightMap {
            heap: KeyedMinHeap::new(),
            dense: HashMap::new(),
            buckets: Vec::new(),
            le: Vec::new(),
        }
    }

    /// Dense index of `key`, declaring it on first sight.
    ///
    /// Non-negative keys are attached to the heap so range queries see
    /// them; negative keys stay detached and are only reachable through
    /// their equality bucket.
    fn value_index(&mut self, key: &N) -> u32 {
        if let Some(&v) = self.dense.get(key) {
            return v;
        }
        let v = self.heap.declare_key(key.clone());
        debug_assert_eq!(v as usize, self.buckets.len());
        if key.is_nonneg() {
            self.heap.insert(v);
        }
        self.dense.insert(key.clone(), v);
        self.buckets.push(Vec::new());
        v
    }

    /// Record that `offset` carries `key`.
    pub fn insert(&mut self, offset: Offset, key: &N) {
        let v = self.value_index(key);
        self.buckets[v as usize].push(offset);
    }

    /// Remove the record that `offset` carries `key`.
    pub fn remove(&mut self, offset: Offset, key: &N) {
        let v = self.value_index(key);
        let bucket = &mut self.buckets[v as usize];
        let pos = bucket
            .iter()
            .position(|&o| o == offset)
            .expect("offset missing from its weight bucket");
        bucket.swap_remove(pos);
    }

    /// Seed `refs` with every offset that could dominate a row whose entry
    /// in this map is `key`.
    ///
    /// For positive keys the candidates are all offsets with a key `<= key`,
    /// except those in the zero bucket; for non-positive keys only the exact
    /// bucket of `key` qualifies. `self_offset` is skipped. Returns `true`
    /// iff at least one candidate was recorded; `found` then holds one of
    /// them, and `cost` is bumped once per offset visited.
    pub fn init_find(
        &mut self,
        refs: &mut OffsetRefs,
        key: &N,
        self_offset: Offset,
        found: &mut Offset,
        cost: &mut u64,
    ) -> bool {
        self.le.clear();
        let v = self.value_index(key);
        if key.is_positive() {
            let mut le = std::mem::take(&mut self.le);
            self.heap.find_le(v, &mut le);
            self.le = le;
        } else {
            self.le.push(v);
        }
        let mut any = false;
        for &val in &self.le {
            if self.heap.key(val).is_zero() && key.is_positive() {
                continue;
            }
            for &o in &self.buckets[val as usize] {
                *cost += 1;
                if o != self_offset {
                    refs.seed(o);
                    *found = o;
                    any = true;
                }
            }
        }
        any
    }

    /// Intersect `refs` with this map's `<= key` range.
    ///
    /// Offsets recorded in `refs` at exactly `round` are bumped to
    /// `round + 1`; everything else is left alone. Returns `true` iff some
    /// offset was bumped, with `found` holding one of them.
    pub fn update_find(
        &mut self,
        refs: &mut OffsetRefs,
        round: u32,
        key: &N,
        self_offset: Offset,
        found: &mut Offset,
        cost: &mut u64,
    ) -> bool {
        self.le.clear();
        let v = self.value_index(key);
        let mut le = std::mem::take(&mut self.le);
        self.heap.find_le(v, &mut le);
        self.le = le;
        let mut any = false;
        for &val in &self.le {
            for &o in &self.buckets[val as usize] {
                *cost += 1;
                if o != self_offset && refs.round(o) == Some(round) {
                    refs.put(o, round + 1);
                    *found = o;
                    any = true;
                }
            }
        }
        any
    }

    /// Drop all keys and buckets; capacity is retained.
    pub fn reset(&mut self) {
        self.heap.reset();
        self.dense.clear();
        self.buckets.clear();
        self.le.clear();
    }
}
