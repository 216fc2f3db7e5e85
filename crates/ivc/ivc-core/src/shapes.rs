//! Standard circuit shapes and their verification keys.
//!
//! Shapes are built once per process and handed out behind `Arc`s. Chains
//! built from the same standard shape share one verification key.

use crate::errors::FoldingResult;
use crate::instances::VerificationKey;
use crate::params::default_commitment_key;
use crate::r1cs::{ConstraintSystem, LinearCombination, R1csShape, Variable};
use crate::{DefaultGroup, DefaultScalar};
use ff::PrimeField;
use std::sync::{Arc, OnceLock};

/// The enumerated set of built-in shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardShape {
    /// `x · y = z`, with `x, y` witness and `z` public
    SingleGate,
    /// `x³ + x + 5 = y`, with `x` witness and `y` public
    Cubic,
}

impl StandardShape {
    /// The shape's constraint system
    pub fn shape(self) -> FoldingResult<Arc<R1csShape<DefaultScalar>>> {
        static SINGLE_GATE: OnceLock<FoldingResult<Arc<R1csShape<DefaultScalar>>>> =
            OnceLock::new();
        static CUBIC: OnceLock<FoldingResult<Arc<R1csShape<DefaultScalar>>>> = OnceLock::new();

        match self {
            StandardShape::SingleGate => SINGLE_GATE
                .get_or_init(|| single_gate_shape().map(Arc::new))
                .clone(),
            StandardShape::Cubic => CUBIC.get_or_init(|| cubic_shape().map(Arc::new)).clone(),
        }
    }

    /// The shape's verification key under the default commitment key
    pub fn verification_key(self) -> FoldingResult<VerificationKey<DefaultGroup>> {
        static SINGLE_GATE_VK: OnceLock<FoldingResult<VerificationKey<DefaultGroup>>> =
            OnceLock::new();
        static CUBIC_VK: OnceLock<FoldingResult<VerificationKey<DefaultGroup>>> = OnceLock::new();

        let cell = match self {
            StandardShape::SingleGate => &SINGLE_GATE_VK,
            StandardShape::Cubic => &CUBIC_VK,
        };
        cell.get_or_init(|| VerificationKey::new(self.shape()?, default_commitment_key()))
            .clone()
    }
}

/// `x · y = z`
pub fn single_gate_shape<F: PrimeField>() -> FoldingResult<R1csShape<F>> {
    let mut cs = ConstraintSystem::new();
    let x = cs.alloc_witness();
    let y = cs.alloc_witness();
    let z = cs.alloc_public();
    cs.enforce(x, y, z);
    cs.into_shape()
}

/// Witness `(x, y)` and public input `x · y` for [`single_gate_shape`]
pub fn single_gate_assignment<F: PrimeField>(x: F, y: F) -> (Vec<F>, Vec<F>) {
    (vec![x, y], vec![x * y])
}

/// `x³ + x + 5 = y` as three constraints over `x, x², x³`
pub fn cubic_shape<F: PrimeField>() -> FoldingResult<R1csShape<F>> {
    let mut cs = ConstraintSystem::new();
    let x = cs.alloc_witness();
    let x_sq = cs.alloc_witness();
    let x_cu = cs.alloc_witness();
    let y = cs.alloc_public();

    cs.enforce(x, x, x_sq);
    cs.enforce(x_sq, x, x_cu);
    cs.enforce(
        LinearCombination::from_variable(x_cu)
            .with_term(x, F::ONE)
            .with_term(Variable::One, F::from(5u64)),
        Variable::One,
        y,
    );
    cs.into_shape()
}

/// Witness `(x, x², x³)` and public input `x³ + x + 5` for [`cubic_shape`]
pub fn cubic_assignment<F: PrimeField>(x: F) -> (Vec<F>, Vec<F>) {
    let x_sq = x.square();
    let x_cu = x_sq * x;
    (vec![x, x_sq, x_cu], vec![x_cu + x + F::from(5u64)])
}
