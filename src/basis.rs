//! Hilbert basis computation by Pottier-style saturation.
//!
//! The engine folds one inequality at a time into a running basis. Folding
//! `c·x >= 0` evaluates `c` on every basis row, splits the rows into
//! positive, negative and zero evaluations, and repeatedly resolves
//! opposite-sign pairs (adding the rows, which moves the evaluation toward
//! zero) until the weight-ordered passive queue drains. Candidates
//! dominated by an already-indexed row are discarded on the way; rows with
//! positive or zero final evaluation survive into the next basis.
//!
//! ## Reference
//!
//! - L. Pottier, "Minimal solutions of linear diophantine systems: bounds
//!   and algorithms", RTA 1991.
//! - Z3: `src/muz_qe/hilbert_basis.cpp`.

use std::fmt;
use std::ops::Index;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use num_traits::{One, Signed, Zero};
use tracing::{debug, trace};

use crate::index::SubsumptionIndex;
use crate::numeral::{dot, weight, Numeral};
use crate::passive::PassiveQueue;
use crate::stats::Statistics;
use crate::store::{Offset, Sign, VecStore};

/// Outcome of a saturation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturateResult {
    /// The system admits non-trivial non-negative solutions; the basis is
    /// available through indexing.
    Satisfiable,
    /// Some pass evaluated every basis row negatively: the system has no
    /// non-trivial non-negative solution.
    Infeasible,
    /// Cooperative cancellation was observed; partial state was abandoned.
    Cancelled,
}

/// Resolution and subsumption counters for the driver.
#[derive(Debug, Clone, Default)]
pub struct BasisStats {
    /// Rows discarded because an indexed row dominated them.
    pub num_subsumptions: u64,
    /// Resolvents allocated from opposite-sign pairs.
    pub num_resolves: u64,
}

/// Saturation engine over inequalities `v·x >= 0` with `x >= 0`.
///
/// Push inequalities with [`add_ge`] / [`add_le`] / [`add_eq`], then call
/// [`saturate`]; on [`SaturateResult::Satisfiable`] the computed Hilbert
/// basis is exposed row by row.
///
/// [`add_ge`]: HilbertBasis::add_ge
/// [`add_le`]: HilbertBasis::add_le
/// [`add_eq`]: HilbertBasis::add_eq
/// [`saturate`]: HilbertBasis::saturate
#[derive(Debug)]
pub struct HilbertBasis<N: Numeral> {
    num_vars: usize,
    ineqs: Vec<Vec<N>>,
    basis: Vec<Offset>,
    store: VecStore<N>,
    active: Vec<Offset>,
    passive: PassiveQueue<N>,
    zero: Vec<Offset>,
    index: SubsumptionIndex<N>,
    cancel: Arc<AtomicBool>,
    stats: BasisStats,
}

impl<N: Numeral> Default for HilbertBasis<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Numeral> HilbertBasis<N> {
    /// Create an engine with no inequalities.
    pub fn new() -> Self {
        HilbertBasis {
            num_vars: 0,
            ineqs: Vec::new(),
            basis: Vec::new(),
            store: VecStore::new(),
            active: Vec::new(),
            passive: PassiveQueue::new(),
            zero: Vec::new(),
            index: SubsumptionIndex::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            stats: BasisStats::default(),
        }
    }

    /// Number of variables; zero until the first inequality is pushed.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Push the inequality `v·x >= 0`.
    ///
    /// The first push fixes the variable count; every later push must have
    /// the same width.
    pub fn add_ge(&mut self, v: Vec<N>) {
        if self.ineqs.is_empty() {
            self.num_vars = v.len();
            self.index.init(v.len());
        } else {
            assert_eq!(
                v.len(),
                self.num_vars,
                "inequality width differs from the first inequality"
            );
        }
        self.ineqs.push(v);
    }

    /// Push the inequality `v·x <= 0`, i.e. `(-v)·x >= 0`.
    pub fn add_le(&mut self, v: Vec<N>) {
        self.add_ge(v.into_iter().map(|c| -c).collect());
    }

    /// Push the equality `v·x = 0` as two opposing inequalities.
    pub fn add_eq(&mut self, v: Vec<N>) {
        self.add_le(v.clone());
        self.add_ge(v);
    }

    /// Clear all engine state, including pushed inequalities and the
    /// cancellation flag. Statistics are kept; see
    /// [`reset_statistics`](HilbertBasis::reset_statistics).
    pub fn reset(&mut self) {
        self.num_vars = 0;
        self.ineqs.clear();
        self.basis.clear();
        self.store.reset(0);
        self.active.clear();
        self.passive.reset();
        self.zero.clear();
        self.index.clear();
        self.cancel.store(false, Ordering::Release);
    }

    /// Set or clear the cancellation flag. Safe to call from any thread
    /// holding a [`cancel_flag`](HilbertBasis::cancel_flag) clone or a
    /// shared reference.
    pub fn set_cancel(&self, value: bool) {
        self.cancel.store(value, Ordering::Release);
    }

    /// Shared handle to the cancellation flag, for foreign threads.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Compute the Hilbert basis of the pushed system.
    ///
    /// Starts from the unit vectors and folds each inequality in push
    /// order. Any earlier basis is discarded.
    pub fn saturate(&mut self) -> SaturateResult {
        self.init_basis();
        let ineqs = std::mem::take(&mut self.ineqs);
        let mut result = SaturateResult::Satisfiable;
        for (pass, ineq) in ineqs.iter().enumerate() {
            if self.cancelled() {
                break;
            }
            debug!(pass, basis = self.basis.len(), "saturation pass");
            result = self.saturate_ineq(ineq);
            if result != SaturateResult::Satisfiable {
                break;
            }
        }
        self.ineqs = ineqs;
        if result == SaturateResult::Satisfiable && self.cancelled() {
            result = SaturateResult::Cancelled;
        }
        result
    }

    /// Basis cardinality after a satisfiable saturation.
    pub fn len(&self) -> usize {
        self.basis.len()
    }

    /// `true` iff the basis is empty.
    pub fn is_empty(&self) -> bool {
        self.basis.is_empty()
    }

    /// Borrow the `i`-th basis row.
    pub fn row(&self, i: usize) -> &[N] {
        self.store.row(self.basis[i])
    }

    /// Iterate over the basis rows.
    pub fn iter(&self) -> impl Iterator<Item = &[N]> + '_ {
        self.basis.iter().map(move |&o| self.store.row(o))
    }

    /// Publish driver and index counters into `st`.
    pub fn collect_statistics(&self, st: &mut Statistics) {
        st.update("hb.num_subsumptions", self.stats.num_subsumptions);
        st.update("hb.num_resolves", self.stats.num_resolves);
        self.index.collect_statistics(st);
    }

    /// Zero all counters without touching engine state.
    pub fn reset_statistics(&mut self) {
        self.stats = BasisStats::default();
        self.index.reset_statistics();
    }

    /// Reset the store and seed the basis with the unit vectors.
    fn init_basis(&mut self) {
        self.basis.clear();
        self.store.reset(self.num_vars);
        let mut unit = vec![N::zero(); self.num_vars];
        for i in 0..self.num_vars {
            unit[i] = N::one();
            let idx = self.store.alloc();
            self.store.set_row(idx, &unit);
            self.basis.push(idx);
            unit[i] = N::zero();
        }
    }

    /// Fold one inequality into the basis.
    fn saturate_ineq(&mut self, ineq: &[N]) -> SaturateResult {
        self.active.clear();
        self.passive.reset();
        self.zero.clear();
        self.index.reset();

        let mut has_nonneg = false;
        for pos in 0..self.basis.len() {
            let idx = self.basis[pos];
            let n = dot(self.store.row(idx), ineq);
            has_nonneg |= n.is_nonneg();
            self.store.set_eval(idx, n);
            self.add_goal(idx);
        }
        if !has_nonneg {
            return SaturateResult::Infeasible;
        }

        while !self.passive.is_empty() {
            if self.cancelled() {
                return SaturateResult::Cancelled;
            }
            let idx = self.passive.pop().expect("passive queue is non-empty");
            if self.is_subsumed(idx) {
                self.recycle(idx);
                continue;
            }
            let sign = self.store.sign(idx);
            debug_assert_ne!(sign, Sign::Zero, "zero rows never enter the passive queue");
            for pos in 0..self.active.len() {
                if self.cancelled() {
                    return SaturateResult::Cancelled;
                }
                let other = self.active[pos];
                if self.store.sign(other) != sign {
                    let resolvent = self.store.alloc();
                    self.resolve(idx, other, resolvent);
                    self.add_goal(resolvent);
                }
            }
            self.active.push(idx);
        }

        // Zeros and positive actives form the next basis; negatives are
        // dead weight and their slots are reclaimed.
        self.basis.clear();
        self.basis.extend_from_slice(&self.zero);
        for pos in 0..self.active.len() {
            let idx = self.active[pos];
            if self.store.eval(idx).is_positive() {
                self.basis.push(idx);
            } else {
                self.store.free(idx);
            }
        }
        self.active.clear();
        self.passive.reset();
        self.zero.clear();
        trace!(basis = self.basis.len(), "pass complete");
        SaturateResult::Satisfiable
    }

    /// Route a freshly evaluated row into the zero set or the passive queue.
    fn add_goal(&mut self, idx: Offset) {
        self.index
            .insert(idx, self.store.row(idx), self.store.eval(idx));
        if self.store.eval(idx).is_zero() {
            if self.is_subsumed(idx) {
                self.recycle(idx);
            } else {
                self.zero.push(idx);
            }
        } else {
            let w = weight(self.store.row(idx));
            self.passive.insert(idx, w);
        }
    }

    fn is_subsumed(&mut self, idx: Offset) -> bool {
        let found = self
            .index
            .find(self.store.row(idx), self.store.eval(idx), idx);
        match found {
            Some(dominator) => {
                self.stats.num_subsumptions += 1;
                trace!(row = idx.index(), by = dominator.index(), "subsumed");
                true
            }
            None => false,
        }
    }

    fn resolve(&mut self, i: Offset, j: Offset, resolvent: Offset) {
        self.stats.num_resolves += 1;
        self.store.resolve_into(i, j, resolvent);
        trace!(
            i = i.index(),
            j = j.index(),
            resolvent = resolvent.index(),
            "resolved"
        );
    }

    /// Withdraw a row from the index and release its storage.
    fn recycle(&mut self, idx: Offset) {
        self.index
            .remove(idx, self.store.row(idx), self.store.eval(idx));
        self.store.free(idx);
    }
}

impl<N: Numeral> Index<usize> for HilbertBasis<N> {
    type Output = [N];

    fn index(&self, i: usize) -> &[N] {
        self.row(i)
    }
}

impl<N: Numeral> fmt::Display for HilbertBasis<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "inequalities:")?;
        for ineq in &self.ineqs {
            write_ineq(f, ineq)?;
        }
        if !self.basis.is_empty() {
            writeln!(f, "basis:")?;
            for &idx in &self.basis {
                for v in self.store.row(idx) {
                    write!(f, "{} ", v)?;
                }
                writeln!(f, "-> {}", self.store.eval(idx))?;
            }
        }
        Ok(())
    }
}

fn write_ineq<N: Numeral>(f: &mut fmt::Formatter<'_>, v: &[N]) -> fmt::Result {
    let mut first = true;
    for (j, c) in v.iter().enumerate() {
        if c.is_zero() {
            continue;
        }
        if first {
            if c.is_negative() {
                write!(f, "-")?;
            }
            first = false;
        } else if c.is_negative() {
            write!(f, " - ")?;
        } else {
            write!(f, " + ")?;
        }
        if !c.is_one() && !c.is_minus_one() {
            write!(f, "{}*", c.abs())?;
        }
        write!(f, "x{}", j)?;
    }
    writeln!(f, " >= 0")
}

/// Signed-linear surface: variables range over all of `ℤ`.
///
/// `a·x <= b` is rewritten as `(-b, a)·(1, x) >= 0` with a distinguished
/// constant-one first coordinate, then handed to the core engine.
#[derive(Debug, Default)]
pub struct SignedHilbertBasis<N: Numeral> {
    core: HilbertBasis<N>,
}

impl<N: Numeral> SignedHilbertBasis<N> {
    /// Create an engine with no constraints.
    pub fn new() -> Self {
        SignedHilbertBasis {
            core: HilbertBasis::new(),
        }
    }

    /// Push the constraint `v·x <= bound`.
    pub fn add_le(&mut self, v: &[N], bound: N) {
        let mut w = Vec::with_capacity(v.len() + 1);
        w.push(-bound);
        w.extend(v.iter().cloned());
        self.core.add_le(w);
    }

    /// Run saturation on the encoded system.
    pub fn saturate(&mut self) -> SaturateResult {
        self.core.saturate()
    }

    /// The underlying core engine (constant coordinate first).
    pub fn core(&self) -> &HilbertBasis<N> {
        &self.core
    }

    /// Clear all state.
    pub fn reset(&mut self) {
        self.core.reset();
    }
}

/// Integer signed-linear surface: each `xᵢ` is split into `xᵢ⁺ - xᵢ⁻`.
///
/// Every variable contributes two complementary coordinates, and the bound
/// contributes a final `±b` pair, so a constraint over `k` variables is
/// encoded in width `2k + 2`.
#[derive(Debug, Default)]
pub struct IntSignedHilbertBasis<N: Numeral> {
    core: HilbertBasis<N>,
}

impl<N: Numeral> IntSignedHilbertBasis<N> {
    /// Create an engine with no constraints.
    pub fn new() -> Self {
        IntSignedHilbertBasis {
            core: HilbertBasis::new(),
        }
    }

    /// Push the constraint `v·x <= bound`.
    pub fn add_le(&mut self, v: &[N], bound: N) {
        let mut w = Vec::with_capacity(2 * v.len() + 2);
        for c in v {
            w.push(c.clone());
            w.push(-c.clone());
        }
        w.push(-bound.clone());
        w.push(bound);
        self.core.add_le(w);
    }

    /// Run saturation on the encoded system.
    pub fn saturate(&mut self) -> SaturateResult {
        self.core.saturate()
    }

    /// The underlying core engine (split coordinates, constant pair last).
    pub fn core(&self) -> &HilbertBasis<N> {
        &self.core
    }

    /// Clear all state.
    pub fn reset(&mut self) {
        self.core.reset();
    }
}
