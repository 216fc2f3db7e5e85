//! The base case of the folding recursion.
//!
//! The first instance of a chain has nothing to fold against. Folding it into
//! the all-zero accumulator with challenge `1` would produce a zero cross term
//! and leave the instance unchanged, so the prover skips that work and lifts
//! the instance directly: `u = 1`, `E = 0`, `[E] = 0`.

use crate::folding::FoldingProof;
use commitments::TranscriptRead;
use ff::Field;
use ivc_core::{
    Accumulator, CommittedInstance, FoldingError, FoldingResult, Instance, LogCommitment,
    PrimeGroup, RelaxedCommitment, ScalarOf, VerificationKey,
};
use tracing::{debug, instrument};

/// Lifts the first instance of a chain into an accumulator.
///
/// The returned proof has the same shape as a folding proof, with an
/// identity cross term and challenge `1`.
#[instrument(skip_all, level = "debug")]
pub fn prove_initial<G: PrimeGroup, T: TranscriptRead>(
    vk: &VerificationKey<G>,
    transcript: &mut T,
    instance: &Instance<G>,
    log: &LogCommitment<G>,
) -> FoldingResult<(Accumulator<G>, FoldingProof<G>)> {
    vk.check_instance(instance)?;

    let committed = instance.committed();
    let digest = initial_digest(transcript, &committed, log);
    let accumulator = Accumulator {
        instance: lift(&committed, digest, log),
        witness: instance.witness.clone(),
        error: vec![G::Scalar::ZERO; vk.shape.num_constraints()],
    };
    debug!(public_inputs = committed.public_inputs.len(), "initial instance lifted");

    Ok((
        accumulator,
        FoldingProof {
            cross_term_commitment: G::identity(),
            challenge: G::Scalar::ONE,
            log_commitment: *log,
        },
    ))
}

/// Checks that `accumulator` is the lift of `incoming` under `proof`
#[instrument(skip_all, level = "debug")]
pub fn verify_initial<G: PrimeGroup, T: TranscriptRead>(
    vk: &VerificationKey<G>,
    transcript: &mut T,
    incoming: &CommittedInstance<G>,
    accumulator: &RelaxedCommitment<G>,
    proof: &FoldingProof<G>,
) -> FoldingResult<()> {
    if incoming.public_inputs.len() != vk.shape.num_public {
        return Err(FoldingError::shape_mismatch(
            "public input count differs from the verification key",
        ));
    }
    if proof.challenge != G::Scalar::ONE || proof.cross_term_commitment != G::identity() {
        return Err(FoldingError::challenge_mismatch(
            "initial proof must carry challenge one and an empty cross term",
        ));
    }

    let digest = initial_digest(transcript, incoming, &proof.log_commitment);
    if accumulator.digest != digest {
        return Err(FoldingError::challenge_mismatch(
            "recomputed step digest differs from the accumulator",
        ));
    }
    if lift(incoming, digest, &proof.log_commitment) != *accumulator {
        return Err(FoldingError::accumulator_mismatch(
            "claimed accumulator is not the lift of the initial instance",
        ));
    }
    Ok(())
}

fn initial_digest<G: PrimeGroup, T: TranscriptRead>(
    transcript: &mut T,
    incoming: &CommittedInstance<G>,
    log: &LogCommitment<G>,
) -> ScalarOf<G> {
    transcript.append_message(b"protocol", b"oink");
    incoming.absorb_into(transcript);
    log.absorb_into(transcript);
    transcript.challenge_scalar(b"step-digest")
}

fn lift<G: PrimeGroup>(
    incoming: &CommittedInstance<G>,
    digest: ScalarOf<G>,
    log: &LogCommitment<G>,
) -> RelaxedCommitment<G> {
    RelaxedCommitment {
        witness: incoming.witness_commitments.witness,
        error: G::identity(),
        u: G::Scalar::ONE,
        public_inputs: incoming.public_inputs.clone(),
        log: *log,
        step: 1,
        digest,
    }
}
