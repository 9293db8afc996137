//! Dominance index over the live rows of a saturation pass.
//!
//! A row `w` with evaluation `m` dominates a query row `v` with evaluation
//! `n` when
//!
//! - `w[i] <= v[i]` for every coordinate `i` (so `v - w >= 0`), and
//! - `n >= m`, and if `m < 0` then `n == m`.
//!
//! Then `v - w` is a non-negative solution of the current inequality that
//! together with `w` reproduces `v`, so `v` is reducible and can be
//! dropped. The negative-evaluation carve-out keeps rows strictly below
//! the hyperplane from pruning each other unless their evaluations agree:
//! only exact matches can stand in for one another in a later zero-sum
//! resolution.
//!
//! The index is one [`WeightMap`] per coordinate plus one for the
//! evaluation. A query seeds candidates from the evaluation map and then
//! intersects them against each coordinate map in rounds; a candidate that
//! survives every round is a dominator.

use crate::numeral::Numeral;
use crate::stats::Statistics;
use crate::store::Offset;
use crate::weights::{OffsetRefs, WeightMap};

/// Counters for index activity.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Dominance queries answered.
    pub num_find: u64,
    /// Rows inserted.
    pub num_insert: u64,
    /// Bucket entries visited across all queries.
    pub num_comparisons: u64,
}

/// Subsumption index: `n + 1` weight maps sharing one offset universe.
#[derive(Debug, Default)]
pub struct SubsumptionIndex<N> {
    coords: Vec<WeightMap<N>>,
    evals: WeightMap<N>,
    refs: OffsetRefs,
    stats: IndexStats,
}

impl<N: Numeral> SubsumptionIndex<N> {
    /// Create an index of width zero; [`SubsumptionIndex::init`] sets the width.
    pub fn new() -> Self {
        SubsumptionIndex {
            coords: Vec::new(),
            evals: WeightMap::new(),
            refs: OffsetRefs::new(),
            stats: IndexStats::default(),
        }
    }

    /// Set the coordinate width. Idempotent for a fixed width.
    pub fn init(&mut self, num_vars: usize) {
        if self.coords.is_empty() {
            self.coords.extend((0..num_vars).map(|_| WeightMap::new()));
        }
        assert_eq!(self.coords.len(), num_vars, "index width mismatch");
    }

    /// Index `row` (with evaluation `eval`) under `offset`.
    pub fn insert(&mut self, offset: Offset, row: &[N], eval: &N) {
        self.stats.num_insert += 1;
        debug_assert_eq!(row.len(), self.coords.len());
        for (map, value) in self.coords.iter_mut().zip(row) {
            map.insert(offset, value);
        }
        self.evals.insert(offset, eval);
    }

    /// Remove `offset` from all maps. `row` and `eval` must be the values
    /// it was inserted with.
    pub fn remove(&mut self, offset: Offset, row: &[N], eval: &N) {
        debug_assert_eq!(row.len(), self.coords.len());
        for (map, value) in self.coords.iter_mut().zip(row) {
            map.remove(offset, value);
        }
        self.evals.remove(offset, eval);
    }

    /// Find some indexed offset other than `offset` that dominates `row`.
    pub fn find(&mut self, row: &[N], eval: &N, offset: Offset) -> Option<Offset> {
        self.stats.num_find += 1;
        let mut found_idx = Offset::INVALID;
        let mut found = self.evals.init_find(
            &mut self.refs,
            eval,
            offset,
            &mut found_idx,
            &mut self.stats.num_comparisons,
        );
        for (round, map) in self.coords.iter_mut().enumerate() {
            if !found {
                break;
            }
            found = map.update_find(
                &mut self.refs,
                round as u32,
                &row[round],
                offset,
                &mut found_idx,
                &mut self.stats.num_comparisons,
            );
        }
        self.refs.clear();
        found.then_some(found_idx)
    }

    /// Empty all maps for the next pass; width and counters are kept.
    pub fn reset(&mut self) {
        for map in &mut self.coords {
            map.reset();
        }
        self.evals.reset();
        self.refs.clear();
    }

    /// Drop the maps entirely (engine reset); a later [`SubsumptionIndex::init`]
    /// may pick a new width.
    pub fn clear(&mut self) {
        self.coords.clear();
        self.evals.reset();
        self.refs.clear();
    }

    /// Current counters.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Zero the counters.
    pub fn reset_statistics(&mut self) {
        self.stats = IndexStats::default();
    }

    /// Publish counters into `st`.
    pub fn collect_statistics(&self, st: &mut Statistics) {
        st.update("hb.index.num_comparisons", self.stats.num_comparisons);
        st.update("hb.index.num_find", self.stats.num_find);
        st.update("hb.index.num_insert", self.stats.num_insert);
    }
}
