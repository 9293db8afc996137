//! Scalar arithmetic abstraction for the saturation engine.
//!
//! The engine is generic over exactly one parameter: the numeral type used
//! for row entries, inequality coefficients and evaluations. All arithmetic
//! is exact. `num_bigint::BigInt` is the intended instantiation, and
//! `num_rational::BigRational` also qualifies (the weight maps key on
//! numerals and must accept rational keys).

use std::fmt;
use std::hash::Hash;

use num_traits::{NumRef, One, Signed, Zero};

/// Capability set required of the engine's scalar type.
///
/// Beyond ring arithmetic this needs a total order, a fast hash (weight
/// maps key on numeral values), and the sign predicates the saturation
/// loop uses to classify row evaluations. Everything is supplied by the
/// `num-traits` hierarchy, so the trait is a blanket over it: any
/// `NumRef + Signed + Ord + Hash` type is a numeral.
pub trait Numeral:
    NumRef + Signed + Ord + Hash + Clone + fmt::Debug + fmt::Display + 'static
{
    /// `true` iff `self == -1`.
    fn is_minus_one(&self) -> bool {
        self.is_negative() && (-self.clone()).is_one()
    }

    /// `true` iff `self >= 0`.
    fn is_nonneg(&self) -> bool {
        !self.is_negative()
    }
}

impl<T> Numeral for T where
    T: NumRef + Signed + Ord + Hash + Clone + fmt::Debug + fmt::Display + 'static
{
}

/// Inner product `Σᵢ rowᵢ · ineqᵢ` of a row with an inequality.
pub fn dot<N: Numeral>(row: &[N], ineq: &[N]) -> N {
    debug_assert_eq!(row.len(), ineq.len(), "dot product width mismatch");
    let mut acc = N::zero();
    for (r, c) in row.iter().zip(ineq) {
        acc = acc + r.clone() * c;
    }
    acc
}

/// Row weight `Σᵢ rowᵢ`; orders the passive queue.
pub fn weight<N: Numeral>(row: &[N]) -> N {
    let mut acc = N::zero();
    for r in row {
        acc = acc + r;
    }
    acc
}
