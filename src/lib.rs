//! Hilbert basis computation for homogeneous linear inequality systems.
//!
//! Given inequalities `A·x >= 0` over non-negative integer variables, the
//! engine enumerates the Hilbert basis of the solution cone: the unique
//! finite set of minimal non-zero integer vectors generating every
//! non-negative integer solution under non-negative integer combinations.
//! Equalities are encoded as opposing inequality pairs, and bounded
//! constraints reduce to the homogeneous form through a distinguished
//! constant coordinate (see the signed surface types).
//!
//! ## Algorithm
//!
//! Pottier-style saturation, one inequality at a time:
//! - the basis starts as the unit vectors, and each pass classifies every
//!   row by the sign of its evaluation under the current inequality;
//! - rows with non-zero evaluation queue up in weight order and are
//!   resolved pairwise against opposite-sign rows, producing candidates
//!   whose evaluations move toward the hyperplane;
//! - a subsumption index (one weight map per coordinate plus one for the
//!   evaluation) discards candidates dominated by an existing row;
//! - rows with positive or zero final evaluation survive into the next
//!   basis; negative rows are recycled through a free list.
//!
//! All arithmetic is exact; the scalar type is the engine's only generic
//! parameter (see [`Numeral`]).
//!
//! ## Example
//!
//! ```
//! use hilbert_basis::{HilbertBasis, SaturateResult};
//! use num_bigint::BigInt;
//!
//! // x >= 2y together with 2y >= x forces x = 2y.
//! let mut hb = HilbertBasis::new();
//! hb.add_ge(vec![BigInt::from(1), BigInt::from(-2)]);
//! hb.add_ge(vec![BigInt::from(-1), BigInt::from(2)]);
//! assert_eq!(hb.saturate(), SaturateResult::Satisfiable);
//! assert_eq!(hb.len(), 1);
//! assert_eq!(&hb[0], &[BigInt::from(2), BigInt::from(1)][..]);
//! ```
//!
//! ## Reference
//!
//! - L. Pottier, "Minimal solutions of linear diophantine systems: bounds
//!   and algorithms", RTA 1991.
//! - Z3: `src/muz_qe/hilbert_basis.cpp`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod basis;
pub mod heap;
pub mod index;
pub mod numeral;
pub mod passive;
pub mod stats;
pub mod store;
pub mod weights;

pub use basis::{
    BasisStats, HilbertBasis, IntSignedHilbertBasis, SaturateResult, SignedHilbertBasis,
};
pub use index::{IndexStats, SubsumptionIndex};
pub use numeral::Numeral;
pub use stats::Statistics;
pub use store::Offset;
