//! Non-interactive folding of relaxed R1CS instances.
//!
//! The running accumulator is always the left operand and the incoming
//! instance the right one. Given the committed cross term `[T]` and the
//! challenge `r` the verifier derives the folded view as
//!
//! ```text
//! [W] = [W₁] + r[W₂]    [E] = [E₁] + r[T]    u = u₁ + r    x = x₁ + r·x₂
//! ```

use commitments::TranscriptRead;
use ff::Field;
use ivc_core::{
    fold_vectors, Accumulator, CommittedInstance, FoldingError, FoldingResult, Instance,
    LogCommitment, PrimeGroup, RelaxedCommitment, ScalarOf, VerificationKey,
};
use tracing::{debug, instrument};

/// Proof of one folding step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldingProof<G: PrimeGroup> {
    /// Commitment to the cross term `T`
    pub cross_term_commitment: G,
    /// The folding challenge `r`
    pub challenge: ScalarOf<G>,
    /// Operation log commitment produced by this step's merge
    pub log_commitment: LogCommitment<G>,
}

/// Folding parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldingParameters {
    /// Run vector arithmetic on the rayon pool
    pub enable_parallel: bool,
}

impl Default for FoldingParameters {
    fn default() -> Self {
        Self {
            enable_parallel: true,
        }
    }
}

/// Folding prover and verifier bound to one verification key
#[derive(Debug, Clone)]
pub struct FoldingScheme<G: PrimeGroup> {
    /// Key every folded instance must match
    pub vk: VerificationKey<G>,
    /// Folding parameters
    pub parameters: FoldingParameters,
}

impl<G: PrimeGroup> FoldingScheme<G> {
    /// Creates a new folding scheme
    pub fn new(vk: VerificationKey<G>, parameters: FoldingParameters) -> Self {
        Self { vk, parameters }
    }

    /// Computes `T = Az₁∘Bz₂ + Az₂∘Bz₁ - u₁·Cz₂ - Cz₁` for an accumulator and a fresh instance
    pub fn cross_term(
        &self,
        accumulator: &Accumulator<G>,
        instance: &Instance<G>,
    ) -> FoldingResult<Vec<ScalarOf<G>>> {
        let shape = &self.vk.shape;
        let z1 = shape.z_vector(
            &accumulator.witness,
            accumulator.instance.u,
            &accumulator.instance.public_inputs,
        )?;
        let z2 = shape.z_vector(&instance.witness, G::Scalar::ONE, &instance.public_inputs)?;
        shape.cross_term(&z1, accumulator.instance.u, &z2, G::Scalar::ONE)
    }

    /// Folds `instance` into `accumulator`.
    ///
    /// `log` is the operation log commitment produced by this step's merge and
    /// is bound into both the transcript and the new accumulator.
    #[instrument(skip_all, level = "debug", fields(step = accumulator.instance.step))]
    pub fn fold<T: TranscriptRead>(
        &self,
        transcript: &mut T,
        accumulator: &Accumulator<G>,
        instance: &Instance<G>,
        log: &LogCommitment<G>,
    ) -> FoldingResult<(Accumulator<G>, FoldingProof<G>)> {
        self.vk.check_instance(instance)?;
        if accumulator.witness.len() != self.vk.shape.num_witness
            || accumulator.error.len() != self.vk.shape.num_constraints()
        {
            return Err(FoldingError::shape_mismatch(
                "accumulator dimensions differ from the verification key",
            ));
        }

        let cross_term = self.cross_term(accumulator, instance)?;
        let cross_term_commitment = self.vk.ck.commit(&cross_term)?;

        let incoming = instance.committed();
        let (challenge, digest) = fold_challenges(
            transcript,
            &accumulator.instance,
            &incoming,
            log,
            &cross_term_commitment,
        );

        let folded = self.fold_with_challenge(
            accumulator,
            instance,
            &cross_term,
            &cross_term_commitment,
            challenge,
            digest,
            log,
        );
        debug!(step = folded.instance.step, "instance folded");

        Ok((
            folded,
            FoldingProof {
                cross_term_commitment,
                challenge,
                log_commitment: *log,
            },
        ))
    }

    /// The fold for a given challenge, with no transcript involved
    #[allow(clippy::too_many_arguments)]
    pub fn fold_with_challenge(
        &self,
        accumulator: &Accumulator<G>,
        instance: &Instance<G>,
        cross_term: &[ScalarOf<G>],
        cross_term_commitment: &G,
        challenge: ScalarOf<G>,
        digest: ScalarOf<G>,
        log: &LogCommitment<G>,
    ) -> Accumulator<G> {
        let parallel = self.parameters.enable_parallel;
        let witness = fold_vectors(&accumulator.witness, &instance.witness, challenge, parallel);
        let error = fold_vectors(&accumulator.error, cross_term, challenge, parallel);

        Accumulator {
            instance: fold_commitments(
                &accumulator.instance,
                &instance.committed(),
                cross_term_commitment,
                challenge,
                digest,
                log,
            ),
            witness,
            error,
        }
    }
}

/// Checks that `folded` is the fold of `accumulator` and `incoming` under `proof`.
///
/// Recomputes the challenge rather than trusting the embedded one.
#[instrument(skip_all, level = "debug")]
pub fn verify_fold<G: PrimeGroup, T: TranscriptRead>(
    vk: &VerificationKey<G>,
    transcript: &mut T,
    accumulator: &RelaxedCommitment<G>,
    incoming: &CommittedInstance<G>,
    folded: &RelaxedCommitment<G>,
    proof: &FoldingProof<G>,
) -> FoldingResult<()> {
    if incoming.public_inputs.len() != vk.shape.num_public
        || accumulator.public_inputs.len() != vk.shape.num_public
    {
        return Err(FoldingError::shape_mismatch(
            "public input count differs from the verification key",
        ));
    }

    let (challenge, digest) = fold_challenges(
        transcript,
        accumulator,
        incoming,
        &proof.log_commitment,
        &proof.cross_term_commitment,
    );
    if challenge != proof.challenge {
        return Err(FoldingError::challenge_mismatch(
            "recomputed folding challenge differs from the proof",
        ));
    }

    let expected = fold_commitments(
        accumulator,
        incoming,
        &proof.cross_term_commitment,
        challenge,
        digest,
        &proof.log_commitment,
    );
    if expected != *folded {
        return Err(FoldingError::accumulator_mismatch(
            "claimed accumulator is not the fold of its inputs",
        ));
    }
    Ok(())
}

/// Absorbs one folding step and squeezes `(r, digest)`
fn fold_challenges<G: PrimeGroup, T: TranscriptRead>(
    transcript: &mut T,
    accumulator: &RelaxedCommitment<G>,
    incoming: &CommittedInstance<G>,
    log: &LogCommitment<G>,
    cross_term_commitment: &G,
) -> (ScalarOf<G>, ScalarOf<G>) {
    transcript.append_message(b"protocol", b"fold");
    accumulator.absorb_into(transcript);
    incoming.absorb_into(transcript);
    log.absorb_into(transcript);
    transcript.append_point(b"cross-term", cross_term_commitment);
    let challenge = transcript.challenge_scalar(b"fold-challenge");
    let digest = transcript.challenge_scalar(b"step-digest");
    (challenge, digest)
}

/// The verifier's half of the fold
fn fold_commitments<G: PrimeGroup>(
    accumulator: &RelaxedCommitment<G>,
    incoming: &CommittedInstance<G>,
    cross_term_commitment: &G,
    challenge: ScalarOf<G>,
    digest: ScalarOf<G>,
    log: &LogCommitment<G>,
) -> RelaxedCommitment<G> {
    RelaxedCommitment {
        witness: accumulator.witness + incoming.witness_commitments.witness * challenge,
        error: accumulator.error + *cross_term_commitment * challenge,
        u: accumulator.u + challenge,
        public_inputs: fold_vectors(
            &accumulator.public_inputs,
            &incoming.public_inputs,
            challenge,
            false,
        ),
        log: *log,
        step: accumulator.step + 1,
        digest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oink::prove_initial;
    use commitments::Transcript;
    use ivc_core::shapes::{cubic_assignment, single_gate_assignment, StandardShape};
    use ivc_core::{DefaultGroup, DefaultScalar as Fr};

    fn vk() -> VerificationKey<DefaultGroup> {
        StandardShape::SingleGate.verification_key().unwrap()
    }

    fn instance(vk: &VerificationKey<DefaultGroup>, x: u64, y: u64) -> Instance<DefaultGroup> {
        let (witness, public) = single_gate_assignment(Fr::from(x), Fr::from(y));
        Instance::new(vk.shape.clone(), public, witness, vec![], &vk.ck).unwrap()
    }

    fn scheme(parallel: bool) -> FoldingScheme<DefaultGroup> {
        FoldingScheme::new(
            vk(),
            FoldingParameters {
                enable_parallel: parallel,
            },
        )
    }

    fn base(vk: &VerificationKey<DefaultGroup>) -> Accumulator<DefaultGroup> {
        let mut transcript = Transcript::new(b"fold-test");
        prove_initial(vk, &mut transcript, &instance(vk, 2, 3), &LogCommitment::empty())
            .unwrap()
            .0
    }

    #[test]
    fn test_fold_preserves_satisfiability() {
        let scheme = scheme(true);
        let mut accumulator = base(&scheme.vk);
        for (x, y) in [(4, 5), (6, 7), (8, 9)] {
            let mut transcript = Transcript::new(b"fold-test");
            let (folded, _) = scheme
                .fold(
                    &mut transcript,
                    &accumulator,
                    &instance(&scheme.vk, x, y),
                    &LogCommitment::empty(),
                )
                .unwrap();
            assert!(folded.is_satisfied(&scheme.vk.shape).is_ok());
            assert!(folded.check_commitments(&scheme.vk.ck).is_ok());
            accumulator = folded;
        }
        assert_eq!(accumulator.instance.step, 4);
    }

    #[test]
    fn test_fold_of_unsatisfied_instance_is_unsatisfied() {
        let scheme = scheme(true);
        let accumulator = base(&scheme.vk);
        let mut bad = instance(&scheme.vk, 4, 5);
        bad.public_inputs[0] += Fr::ONE;

        let mut transcript = Transcript::new(b"fold-test");
        let (folded, _) = scheme
            .fold(&mut transcript, &accumulator, &bad, &LogCommitment::empty())
            .unwrap();
        assert!(folded.is_satisfied(&scheme.vk.shape).is_err());
    }

    #[test]
    fn test_verify_fold() {
        let scheme = scheme(true);
        let accumulator = base(&scheme.vk);
        let incoming = instance(&scheme.vk, 4, 5);

        let mut prover = Transcript::new(b"fold-test");
        let (folded, proof) = scheme
            .fold(&mut prover, &accumulator, &incoming, &LogCommitment::empty())
            .unwrap();

        let mut verifier = Transcript::new(b"fold-test");
        assert!(verify_fold(
            &scheme.vk,
            &mut verifier,
            &accumulator.instance,
            &incoming.committed(),
            &folded.instance,
            &proof
        )
        .is_ok());
    }

    #[test]
    fn test_verify_fold_rejects_tampered_challenge() {
        let scheme = scheme(true);
        let accumulator = base(&scheme.vk);
        let incoming = instance(&scheme.vk, 4, 5);

        let mut prover = Transcript::new(b"fold-test");
        let (folded, mut proof) = scheme
            .fold(&mut prover, &accumulator, &incoming, &LogCommitment::empty())
            .unwrap();
        proof.challenge += Fr::ONE;

        let mut verifier = Transcript::new(b"fold-test");
        assert!(matches!(
            verify_fold(
                &scheme.vk,
                &mut verifier,
                &accumulator.instance,
                &incoming.committed(),
                &folded.instance,
                &proof
            ),
            Err(FoldingError::ChallengeMismatch(_))
        ));
    }

    #[test]
    fn test_verify_fold_rejects_tampered_accumulator() {
        let scheme = scheme(true);
        let accumulator = base(&scheme.vk);
        let incoming = instance(&scheme.vk, 4, 5);

        let mut prover = Transcript::new(b"fold-test");
        let (mut folded, proof) = scheme
            .fold(&mut prover, &accumulator, &incoming, &LogCommitment::empty())
            .unwrap();
        folded.instance.error += DefaultGroup::generator();

        let mut verifier = Transcript::new(b"fold-test");
        assert!(matches!(
            verify_fold(
                &scheme.vk,
                &mut verifier,
                &accumulator.instance,
                &incoming.committed(),
                &folded.instance,
                &proof
            ),
            Err(FoldingError::AccumulatorMismatch(_))
        ));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let accumulator = base(&vk());
        let incoming = instance(&vk(), 10, 11);
        let mut results = Vec::new();
        for parallel in [true, false] {
            let mut transcript = Transcript::new(b"fold-test");
            let (folded, proof) = scheme(parallel)
                .fold(&mut transcript, &accumulator, &incoming, &LogCommitment::empty())
                .unwrap();
            results.push((folded, proof));
        }
        assert_eq!(results[0], results[1]);
    }

    #[test]
    fn test_fold_rejects_foreign_shape() {
        let scheme = scheme(true);
        let accumulator = base(&scheme.vk);
        let cubic = StandardShape::Cubic.verification_key().unwrap();
        let (witness, public) = cubic_assignment(Fr::from(2u64));
        let foreign = Instance::new(cubic.shape.clone(), public, witness, vec![], &cubic.ck).unwrap();

        let mut transcript = Transcript::new(b"fold-test");
        assert!(matches!(
            scheme.fold(&mut transcript, &accumulator, &foreign, &LogCommitment::empty()),
            Err(FoldingError::ShapeMismatch(_))
        ));
    }
}
