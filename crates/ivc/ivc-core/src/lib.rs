//! # IVC Core: data model for client-side folding
//!
//! This crate holds everything the folding engine reasons about but does not
//! itself prove:
//!
//! - **Relations**: relaxed R1CS shapes `Az ∘ Bz = u·Cz + E` over `z = (W, u, x)`
//!   and a small builder for them
//! - **Operations**: elliptic-curve operation records and their fixed
//!   two-row table encoding
//! - **Instances**: per-step instances, their committed views, running
//!   accumulators and verification keys
//! - **Wire format**: canonical little-endian encodings shared by prover and
//!   verifier machines
//! - **Parameters**: process-wide commitment keys and standard shapes,
//!   initialised once behind accessors
//!
//! All types are generic over a prime-order group; BLS12-381 G1 is the default.

#![deny(missing_docs)]

pub mod errors;
pub mod fields;
pub mod instances;
pub mod ops;
pub mod params;
pub mod r1cs;
pub mod shapes;
pub mod wire;

pub use errors::*;
pub use fields::*;
pub use instances::*;
pub use ops::{EcOp, OpTable, NUM_COLUMNS, ROWS_PER_OP};
pub use r1cs::{ConstraintSystem, LinearCombination, R1csShape, SparseMatrix, Variable};
pub use wire::{Decode, Encode};

/// Default group for commitments (BLS12-381 G1)
pub type DefaultGroup = bls12_381::G1Projective;

/// Scalar field of [`DefaultGroup`]
pub type DefaultScalar = bls12_381::Scalar;
