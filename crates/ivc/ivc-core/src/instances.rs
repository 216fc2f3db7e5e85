//! Instances, accumulators and verification keys.
//!
//! Each type exists in a prover form carrying vectors and a verifier form
//! carrying only commitments and scalars:
//!
//! | prover          | verifier               |
//! |-----------------|------------------------|
//! | [`Instance`]    | [`CommittedInstance`]  |
//! | [`Accumulator`] | [`RelaxedCommitment`]  |

use crate::errors::{FoldingError, FoldingResult};
use crate::fields::{PrimeGroup, ScalarOf};
use crate::ops::{EcOp, OpTable, NUM_COLUMNS, ROWS_PER_OP};
use crate::r1cs::R1csShape;
use commitments::{CommitmentKey, TranscriptRead, TranscriptWrite};
use ff::Field;
use std::sync::Arc;

/// Commitments published alongside an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WitnessCommitments<G: PrimeGroup> {
    /// Commitment to the witness vector `W`
    pub witness: G,
    /// Commitments to the columns of the instance's operation subtable
    pub ops: [G; NUM_COLUMNS],
}

impl<G: PrimeGroup> WitnessCommitments<G> {
    /// Appends the commitments to a transcript
    pub fn absorb_into<T: TranscriptWrite>(&self, transcript: &mut T) {
        transcript.append_point(b"witness-commitment", &self.witness);
        transcript.append_points(b"op-commitments", &self.ops);
    }
}

/// One step's constraint system together with its assignment and the
/// elliptic-curve operations its circuit issued, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance<G: PrimeGroup> {
    /// Constraint-system description
    pub shape: Arc<R1csShape<ScalarOf<G>>>,
    /// Public inputs `x`
    pub public_inputs: Vec<ScalarOf<G>>,
    /// Witness `W`
    pub witness: Vec<ScalarOf<G>>,
    /// Commitments to `W` and to the operation subtable
    pub witness_commitments: WitnessCommitments<G>,
    /// Operations issued by the circuit
    pub ec_operations: Vec<EcOp<G>>,
}

impl<G: PrimeGroup> Instance<G> {
    /// Builds an instance, committing to its witness and operation subtable
    pub fn new(
        shape: Arc<R1csShape<ScalarOf<G>>>,
        public_inputs: Vec<ScalarOf<G>>,
        witness: Vec<ScalarOf<G>>,
        ec_operations: Vec<EcOp<G>>,
        ck: &CommitmentKey<G>,
    ) -> FoldingResult<Self> {
        shape.check_lengths(&witness, &public_inputs)?;
        let table = OpTable::from_ops(&ec_operations)?;
        let witness_commitments = WitnessCommitments {
            witness: ck.commit(&witness)?,
            ops: table.commit(ck)?,
        };
        Ok(Self {
            shape,
            public_inputs,
            witness,
            witness_commitments,
            ec_operations,
        })
    }

    /// Checks the strict relation on the instance's own assignment
    pub fn is_satisfied(&self) -> FoldingResult<()> {
        self.shape.is_satisfied(&self.witness, &self.public_inputs)
    }

    /// The instance's operation subtable
    pub fn op_table(&self) -> FoldingResult<OpTable<ScalarOf<G>>> {
        OpTable::from_ops(&self.ec_operations)
    }

    /// The verifier's view of this instance
    pub fn committed(&self) -> CommittedInstance<G> {
        CommittedInstance {
            public_inputs: self.public_inputs.clone(),
            witness_commitments: self.witness_commitments,
            num_ops: self.ec_operations.len() as u64,
        }
    }
}

/// What a verifier sees of an incoming instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedInstance<G: PrimeGroup> {
    /// Public inputs `x`
    pub public_inputs: Vec<ScalarOf<G>>,
    /// Commitments to `W` and the operation subtable
    pub witness_commitments: WitnessCommitments<G>,
    /// Number of operations in the subtable
    pub num_ops: u64,
}

impl<G: PrimeGroup> CommittedInstance<G> {
    /// Rows the instance adds to the operation log
    pub fn num_rows(&self) -> u64 {
        self.num_ops * ROWS_PER_OP as u64
    }

    /// Appends the instance to a transcript
    pub fn absorb_into<T: TranscriptWrite>(&self, transcript: &mut T) {
        transcript.append_scalars(b"instance-public-inputs", &self.public_inputs);
        self.witness_commitments.absorb_into(transcript);
        transcript.append_u64(b"instance-num-ops", self.num_ops);
    }
}

/// Commitment to the operation log: one commitment per column and the row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogCommitment<G: PrimeGroup> {
    /// Column commitments
    pub columns: [G; NUM_COLUMNS],
    /// Number of rows committed
    pub rows: u64,
}

impl<G: PrimeGroup> LogCommitment<G> {
    /// Commitment to the empty log
    pub fn empty() -> Self {
        Self {
            columns: [G::identity(); NUM_COLUMNS],
            rows: 0,
        }
    }

    /// Appends the commitment to a transcript
    pub fn absorb_into<T: TranscriptWrite>(&self, transcript: &mut T) {
        transcript.append_points(b"log-columns", &self.columns);
        transcript.append_u64(b"log-rows", self.rows);
    }
}

impl<G: PrimeGroup> Default for LogCommitment<G> {
    fn default() -> Self {
        Self::empty()
    }
}

/// The verifier's view of an accumulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaxedCommitment<G: PrimeGroup> {
    /// Commitment to the folded witness
    pub witness: G,
    /// Commitment to the error vector `E`
    pub error: G,
    /// Slack scalar
    pub u: ScalarOf<G>,
    /// Folded public inputs
    pub public_inputs: Vec<ScalarOf<G>>,
    /// Operation log commitment bound into the latest step
    pub log: LogCommitment<G>,
    /// Number of steps folded in
    pub step: u64,
    /// Running digest chaining every step's transcript
    pub digest: ScalarOf<G>,
}

impl<G: PrimeGroup> RelaxedCommitment<G> {
    /// Appends the accumulator view to a transcript
    pub fn absorb_into<T: TranscriptWrite>(&self, transcript: &mut T) {
        transcript.append_point(b"acc-witness", &self.witness);
        transcript.append_point(b"acc-error", &self.error);
        transcript.append_scalar(b"acc-u", &self.u);
        transcript.append_scalars(b"acc-public-inputs", &self.public_inputs);
        self.log.absorb_into(transcript);
        transcript.append_u64(b"acc-step", self.step);
        transcript.append_scalar(b"acc-digest", &self.digest);
    }
}

/// The running folded state: the verifier view plus `W` and `E`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator<G: PrimeGroup> {
    /// Verifier view
    pub instance: RelaxedCommitment<G>,
    /// Folded witness
    pub witness: Vec<ScalarOf<G>>,
    /// Error vector
    pub error: Vec<ScalarOf<G>>,
}

impl<G: PrimeGroup> Accumulator<G> {
    /// The all-zero accumulator for `shape`, including `u = 0`
    pub fn zero(shape: &R1csShape<ScalarOf<G>>) -> Self {
        Self {
            instance: RelaxedCommitment {
                witness: G::identity(),
                error: G::identity(),
                u: G::Scalar::ZERO,
                public_inputs: vec![G::Scalar::ZERO; shape.num_public],
                log: LogCommitment::empty(),
                step: 0,
                digest: G::Scalar::ZERO,
            },
            witness: vec![G::Scalar::ZERO; shape.num_witness],
            error: vec![G::Scalar::ZERO; shape.num_constraints()],
        }
    }

    /// Checks `Az ∘ Bz = u·Cz + E` on the folded assignment
    pub fn is_satisfied(&self, shape: &R1csShape<ScalarOf<G>>) -> FoldingResult<()> {
        shape.is_satisfied_relaxed(
            &self.witness,
            self.instance.u,
            &self.instance.public_inputs,
            &self.error,
        )
    }

    /// Checks that the commitments in the view open to `W` and `E`
    pub fn check_commitments(&self, ck: &CommitmentKey<G>) -> FoldingResult<()> {
        if ck.commit(&self.witness)? != self.instance.witness {
            return Err(FoldingError::accumulator_mismatch(
                "witness commitment does not open to the folded witness",
            ));
        }
        if ck.commit(&self.error)? != self.instance.error {
            return Err(FoldingError::accumulator_mismatch(
                "error commitment does not open to the error vector",
            ));
        }
        Ok(())
    }
}

/// Fixed parameters describing the relation shape of a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey<G: PrimeGroup> {
    /// The shape every instance of the chain must have
    pub shape: Arc<R1csShape<ScalarOf<G>>>,
    /// Digest of `shape`
    pub shape_digest: ScalarOf<G>,
    /// Commitment key
    pub ck: Arc<CommitmentKey<G>>,
    /// Digest binding the shape and the commitment key
    pub digest: ScalarOf<G>,
}

impl<G: PrimeGroup> VerificationKey<G> {
    /// Builds a key, checking that `ck` can commit to every vector the
    /// decider opens for this shape.
    pub fn new(shape: Arc<R1csShape<ScalarOf<G>>>, ck: Arc<CommitmentKey<G>>) -> FoldingResult<Self> {
        let needed = shape
            .num_witness
            .max(shape.num_constraints())
            .next_power_of_two();
        ck.ensure_len(needed)?;

        let shape_digest = shape.digest();
        let digest = Self::compute_digest(&shape_digest, &ck);
        Ok(Self {
            shape,
            shape_digest,
            ck,
            digest,
        })
    }

    fn compute_digest(shape_digest: &ScalarOf<G>, ck: &CommitmentKey<G>) -> ScalarOf<G> {
        let mut transcript = commitments::Transcript::new(b"client-ivc-verification-key");
        transcript.append_scalar(b"shape-digest", shape_digest);
        ck.absorb_into(&mut transcript);
        transcript.challenge_scalar(b"vk-digest")
    }

    /// Recomputes both digests and compares them with the stored ones
    pub fn check(&self) -> FoldingResult<()> {
        let shape_digest = self.shape.digest();
        if shape_digest != self.shape_digest {
            return Err(FoldingError::shape_mismatch("stored shape digest is stale"));
        }
        if Self::compute_digest(&shape_digest, &self.ck) != self.digest {
            return Err(FoldingError::shape_mismatch("stored key digest is stale"));
        }
        Ok(())
    }

    /// Fails with [`FoldingError::ShapeMismatch`] unless `instance` has this key's shape
    pub fn check_instance(&self, instance: &Instance<G>) -> FoldingResult<()> {
        if !Arc::ptr_eq(&self.shape, &instance.shape) && instance.shape.digest() != self.shape_digest {
            return Err(FoldingError::shape_mismatch(
                "instance shape differs from the verification key",
            ));
        }
        self.shape
            .check_lengths(&instance.witness, &instance.public_inputs)
    }
}
