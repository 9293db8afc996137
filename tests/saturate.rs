//! End-to-end saturation tests on small, fully worked systems.

use hilbert_basis::{
    HilbertBasis, IntSignedHilbertBasis, SaturateResult, SignedHilbertBasis, Statistics,
};
use num_bigint::BigInt;
use num_rational::BigRational;

fn row(vals: &[i64]) -> Vec<BigInt> {
    vals.iter().map(|&v| BigInt::from(v)).collect()
}

fn sorted_basis(hb: &HilbertBasis<BigInt>) -> Vec<Vec<BigInt>> {
    let mut rows: Vec<Vec<BigInt>> = hb.iter().map(|r| r.to_vec()).collect();
    rows.sort();
    rows
}

#[test]
fn test_single_variable_identity() {
    // x >= 0 over one variable: the unit vector is already the basis.
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    assert_eq!(sorted_basis(&hb), vec![row(&[1])]);
}

#[test]
fn test_ordered_pair_cone() {
    // x >= y >= 0: generated by (1,0) and the diagonal (1,1).
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, -1]));
    hb.add_ge(row(&[0, 1]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    assert_eq!(sorted_basis(&hb), vec![row(&[1, 0]), row(&[1, 1])]);
}

#[test]
fn test_equality_with_no_nonneg_solution() {
    // x + y = 0 has no non-trivial solution with x, y >= 0.
    let mut hb = HilbertBasis::new();
    hb.add_eq(row(&[1, 1]));
    assert_eq!(hb.saturate(), SaturateResult::Infeasible);
}

#[test]
fn test_equality_line() {
    // x = 2y: the cone degenerates to multiples of (2,1).
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, -2]));
    hb.add_ge(row(&[-1, 2]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    assert_eq!(sorted_basis(&hb), vec![row(&[2, 1])]);
}

#[test]
fn test_inhomogeneous_upper_bound() {
    // x <= 1 through the constant-coordinate trick: c - x >= 0 with the
    // constant first. Survivors are the constant unit and the point x = 1.
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, -1]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    assert_eq!(sorted_basis(&hb), vec![row(&[1, 0]), row(&[1, 1])]);
}

#[test]
fn test_redundant_multiple_keeps_basis() {
    // 2x >= 0 after x >= 0 rescales every evaluation but changes nothing.
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1]));
    hb.add_ge(row(&[2]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    assert_eq!(sorted_basis(&hb), vec![row(&[1])]);
}

#[test]
fn test_identically_zero_inequality() {
    // A zero inequality sends every row to the zero set; with pairwise
    // incomparable rows the basis survives unchanged.
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, 1]));
    hb.add_ge(row(&[0, 0]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    assert_eq!(sorted_basis(&hb), vec![row(&[0, 1]), row(&[1, 0])]);
}

#[test]
fn test_three_variable_halfspace() {
    // x + y >= z: units plus the two mixed diagonals.
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, 1, -1]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    assert_eq!(
        sorted_basis(&hb),
        vec![
            row(&[0, 1, 0]),
            row(&[0, 1, 1]),
            row(&[1, 0, 0]),
            row(&[1, 0, 1]),
        ]
    );
}

#[test]
fn test_inequality_order_scenarios() {
    // Permuting the constraints of the worked scenarios leaves the basis
    // unchanged as a set.
    let systems: [&[&[i64]]; 2] = [&[&[1, -1], &[0, 1]], &[&[1, -2], &[-1, 2]]];
    for ineqs in systems {
        let mut fwd = HilbertBasis::new();
        for v in ineqs {
            fwd.add_ge(row(v));
        }
        let mut rev = HilbertBasis::new();
        for v in ineqs.iter().rev() {
            rev.add_ge(row(v));
        }
        assert_eq!(fwd.saturate(), SaturateResult::Satisfiable);
        assert_eq!(rev.saturate(), SaturateResult::Satisfiable);
        assert_eq!(sorted_basis(&fwd), sorted_basis(&rev), "system {ineqs:?}");
    }
}

#[test]
fn test_statistics_counters() {
    // x >= y >= 0 resolves exactly once; every pop, zero insertion and
    // basis seed goes through the index.
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, -1]));
    hb.add_ge(row(&[0, 1]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    let mut st = Statistics::new();
    hb.collect_statistics(&mut st);
    assert_eq!(st.get("hb.num_resolves"), Some(1));
    assert_eq!(st.get("hb.num_subsumptions"), Some(0));
    assert_eq!(st.get("hb.index.num_find"), Some(5));
    assert_eq!(st.get("hb.index.num_insert"), Some(5));

    hb.reset_statistics();
    let mut st = Statistics::new();
    hb.collect_statistics(&mut st);
    assert_eq!(st.get("hb.num_resolves"), Some(0));
    assert_eq!(st.get("hb.index.num_find"), Some(0));
}

#[test]
fn test_cancellation_before_run() {
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, -1]));
    hb.set_cancel(true);
    assert_eq!(hb.saturate(), SaturateResult::Cancelled);
}

#[test]
fn test_cancellation_from_foreign_thread() {
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, -1]));
    let flag = hb.cancel_flag();
    let handle = std::thread::spawn(move || {
        flag.store(true, std::sync::atomic::Ordering::Release);
    });
    handle.join().unwrap();
    assert_eq!(hb.saturate(), SaturateResult::Cancelled);
}

#[test]
fn test_reset_and_reuse() {
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, 1]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    hb.reset();
    assert_eq!(hb.num_vars(), 0);
    // A different width is accepted after reset.
    hb.add_ge(row(&[1, -2, 0]));
    hb.add_ge(row(&[0, 0, 1]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    assert_eq!(hb.num_vars(), 3);
    for r in hb.iter() {
        assert_eq!(r.len(), 3);
    }
}

#[test]
fn test_cancel_flag_cleared_by_reset() {
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1]));
    hb.set_cancel(true);
    hb.reset();
    hb.add_ge(row(&[1]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
}

#[test]
fn test_rational_scalars() {
    // The engine is generic over the scalar; rationals run the same way.
    fn rat(v: i64) -> BigRational {
        BigRational::from(BigInt::from(v))
    }
    let mut hb: HilbertBasis<BigRational> = HilbertBasis::new();
    hb.add_ge(vec![rat(1), rat(-1)]);
    hb.add_ge(vec![rat(0), rat(1)]);
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    let mut rows: Vec<Vec<BigRational>> = hb.iter().map(|r| r.to_vec()).collect();
    rows.sort();
    assert_eq!(
        rows,
        vec![vec![rat(1), rat(0)], vec![rat(1), rat(1)]]
    );
}

#[test]
fn test_signed_linear_surface() {
    // x <= 1 over a signed variable: constant-first encoding gives the
    // constant unit and the point x = 1.
    let mut sl: SignedHilbertBasis<BigInt> = SignedHilbertBasis::new();
    sl.add_le(&row(&[1]), BigInt::from(1));
    assert_eq!(sl.saturate(), SaturateResult::Satisfiable);
    let mut rows: Vec<Vec<BigInt>> = sl.core().iter().map(|r| r.to_vec()).collect();
    rows.sort();
    assert_eq!(rows, vec![row(&[1, 0]), row(&[1, 1])]);
}

#[test]
fn test_int_signed_surface() {
    // x <= 1 with x split into x⁺ - x⁻ and the bound into a ±1 pair.
    let mut isl: IntSignedHilbertBasis<BigInt> = IntSignedHilbertBasis::new();
    isl.add_le(&row(&[1]), BigInt::from(1));
    assert_eq!(isl.core().num_vars(), 4);
    assert_eq!(isl.saturate(), SaturateResult::Satisfiable);
    // Core inequality: -x⁺ + x⁻ + b⁺ - b⁻ >= 0. Every basis row satisfies it.
    for r in isl.core().iter() {
        let value = -r[0].clone() + &r[1] + &r[2] - &r[3];
        assert!(value >= BigInt::from(0), "violating row {r:?}");
    }
}

#[test]
fn test_display_smoke() {
    let mut hb = HilbertBasis::new();
    hb.add_ge(row(&[1, -2]));
    hb.add_ge(row(&[-1, 2]));
    assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
    let text = hb.to_string();
    assert!(text.contains("inequalities:"));
    assert!(text.contains("x0 - 2*x1 >= 0"));
    assert!(text.contains("basis:"));
    // Rows print with their evaluation under the last folded inequality.
    assert!(text.contains("2 1 -> 0"));
}
