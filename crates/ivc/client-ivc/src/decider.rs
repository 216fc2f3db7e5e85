//! The decider: a succinct proof that a relaxed instance is satisfied.
//!
//! With `m` constraints padded to `2^s`, the prover runs a cubic sumcheck on
//!
//! ```text
//! 0 = Σ_i eq(τ, i) · (Az_i · Bz_i - u · Cz_i - E_i)
//! ```
//!
//! and ends with claims `A(r), B(r), C(r), E(r)` about the multilinear
//! extensions of `Az, Bz, Cz, E`. The verifier folds the matrix rows at
//! `eq(r, ·)` into one column vector `v` (with a random `ρ` combining the three
//! matrices) and checks `<v_W, W> = A(r) + ρB(r) + ρ²C(r) - v_u·u - <v_x, x>`
//! with one inner product argument against `[W]`, and `E(r)` with one against
//! `[E]`. The proof has `O(log m + log n)` elements regardless of how many
//! steps were folded into the instance.

use crate::sumcheck::{SumcheckProof, NUM_TABLES};
use commitments::{IpaProof, TranscriptRead};
use ff::Field;
use ivc_core::{
    eq_eval, eq_table, inner_product, Accumulator, FoldingError, FoldingResult, PrimeGroup,
    RelaxedCommitment, ScalarOf, VerificationKey,
};
use tracing::{debug, instrument};

/// Succinct proof of relaxed satisfaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeciderProof<G: PrimeGroup> {
    /// Sumcheck over the padded constraint rows
    pub sumcheck: SumcheckProof<ScalarOf<G>>,
    /// `A(r)`
    pub eval_a: ScalarOf<G>,
    /// `B(r)`
    pub eval_b: ScalarOf<G>,
    /// `C(r)`
    pub eval_c: ScalarOf<G>,
    /// `E(r)`
    pub eval_e: ScalarOf<G>,
    /// Opening of `[W]` against the folded matrix columns
    pub witness_opening: IpaProof<G>,
    /// Opening of `[E]` against `eq(r, ·)`
    pub error_opening: IpaProof<G>,
}

/// Number of sumcheck rounds for a shape with `num_constraints` rows
pub fn num_rounds(num_constraints: usize) -> usize {
    num_constraints.max(1).next_power_of_two().trailing_zeros() as usize
}

impl<G: PrimeGroup> DeciderProof<G> {
    /// Proves that `accumulator` satisfies the relaxed relation of `vk`.
    ///
    /// An unsatisfied accumulator still yields a proof; it just does not verify.
    #[instrument(skip_all, level = "debug", fields(step = accumulator.instance.step))]
    pub fn prove<T: TranscriptRead>(
        vk: &VerificationKey<G>,
        transcript: &mut T,
        accumulator: &Accumulator<G>,
    ) -> FoldingResult<Self> {
        let shape = &vk.shape;
        let instance = &accumulator.instance;
        let m = shape.num_constraints();
        let padded = m.max(1).next_power_of_two();
        if accumulator.error.len() != m {
            return Err(FoldingError::shape_mismatch(
                "error vector length differs from the constraint count",
            ));
        }

        let tau = bind_instance(vk, transcript, instance, num_rounds(m));

        let z = shape.z_vector(&accumulator.witness, instance.u, &instance.public_inputs)?;
        let (mut az, mut bz, mut cz) = shape.multiply_vec(&z)?;
        let mut error = accumulator.error.clone();
        for table in [&mut az, &mut bz, &mut cz, &mut error] {
            table.resize(padded, G::Scalar::ZERO);
        }

        let u = instance.u;
        let (sumcheck, point, finals) = SumcheckProof::prove_cubic(
            transcript,
            G::Scalar::ZERO,
            [eq_table(&tau), az, bz, cz, error],
            move |v: &[ScalarOf<G>; NUM_TABLES]| v[0] * (v[1] * v[2] - u * v[3] - v[4]),
        )?;
        let [_, eval_a, eval_b, eval_c, eval_e] = finals;

        let rho = bind_claims(transcript, &eval_a, &eval_b, &eval_c, &eval_e);
        let weights = eq_table(&point);
        let columns = shape.combined_columns(&weights[..m], rho);
        let witness_columns = &columns[..shape.num_witness];

        let witness_opening = IpaProof::prove(
            &vk.ck,
            transcript,
            &instance.witness,
            &accumulator.witness,
            witness_columns,
        )?;
        let error_opening = IpaProof::prove(
            &vk.ck,
            transcript,
            &instance.error,
            &accumulator.error,
            &weights[..m],
        )?;

        debug!(rounds = sumcheck.rounds.len(), "decider proof generated");

        Ok(Self {
            sumcheck,
            eval_a,
            eval_b,
            eval_c,
            eval_e,
            witness_opening,
            error_opening,
        })
    }

    /// Checks the proof against the committed instance.
    ///
    /// Every failure is a [`FoldingError::RelationViolation`].
    #[instrument(skip_all, level = "debug")]
    pub fn verify<T: TranscriptRead>(
        &self,
        vk: &VerificationKey<G>,
        transcript: &mut T,
        instance: &RelaxedCommitment<G>,
    ) -> FoldingResult<()> {
        let shape = &vk.shape;
        let m = shape.num_constraints();
        if instance.public_inputs.len() != shape.num_public {
            return Err(FoldingError::relation_violation(
                "public input count differs from the verification key",
            ));
        }

        let rounds = num_rounds(m);
        let tau = bind_instance(vk, transcript, instance, rounds);

        let (reduced, point) = self
            .sumcheck
            .verify(transcript, G::Scalar::ZERO, rounds)?;
        let expected = eq_eval(&tau, &point)
            * (self.eval_a * self.eval_b - instance.u * self.eval_c - self.eval_e);
        if reduced != expected {
            return Err(FoldingError::relation_violation(
                "sumcheck claim does not match the final evaluations",
            ));
        }

        let rho = bind_claims(
            transcript,
            &self.eval_a,
            &self.eval_b,
            &self.eval_c,
            &self.eval_e,
        );
        let weights = eq_table(&point);
        let columns = shape.combined_columns(&weights[..m], rho);
        let (witness_columns, rest) = columns.split_at(shape.num_witness);
        let (u_column, public_columns) = rest.split_at(1);

        // <v, z> = A(r) + ρB(r) + ρ²C(r), minus the part carried by u and x
        let witness_value = self.eval_a + rho * self.eval_b + rho.square() * self.eval_c
            - u_column[0] * instance.u
            - inner_product(public_columns, &instance.public_inputs);

        self.witness_opening
            .verify(
                &vk.ck,
                transcript,
                &instance.witness,
                witness_columns,
                &witness_value,
            )
            .map_err(|err| {
                FoldingError::relation_violation(format!("witness opening rejected: {}", err))
            })?;
        self.error_opening
            .verify(
                &vk.ck,
                transcript,
                &instance.error,
                &weights[..m],
                &self.eval_e,
            )
            .map_err(|err| {
                FoldingError::relation_violation(format!("error opening rejected: {}", err))
            })?;
        Ok(())
    }
}

/// Absorbs the key and the instance and squeezes `τ`
fn bind_instance<G: PrimeGroup, T: TranscriptRead>(
    vk: &VerificationKey<G>,
    transcript: &mut T,
    instance: &RelaxedCommitment<G>,
    rounds: usize,
) -> Vec<ScalarOf<G>> {
    transcript.append_scalar(b"vk-digest", &vk.digest);
    instance.absorb_into(transcript);
    transcript.challenge_scalars(b"decider-tau", rounds)
}

fn bind_claims<F: ff::PrimeField, T: TranscriptRead>(
    transcript: &mut T,
    eval_a: &F,
    eval_b: &F,
    eval_c: &F,
    eval_e: &F,
) -> F {
    transcript.append_scalars(b"decider-claims", &[*eval_a, *eval_b, *eval_c, *eval_e]);
    transcript.challenge_scalar(b"decider-rho")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folding::{FoldingParameters, FoldingScheme};
    use crate::oink::prove_initial;
    use commitments::Transcript;
    use ivc_core::shapes::{cubic_assignment, single_gate_assignment, StandardShape};
    use ivc_core::{DefaultGroup, DefaultScalar as Fr, Instance, LogCommitment};

    fn folded_accumulator(
        shape: StandardShape,
        assignments: &[(Vec<Fr>, Vec<Fr>)],
    ) -> (VerificationKey<DefaultGroup>, Accumulator<DefaultGroup>) {
        let vk = shape.verification_key().unwrap();
        let instances: Vec<_> = assignments
            .iter()
            .map(|(w, x)| Instance::new(vk.shape.clone(), x.clone(), w.clone(), vec![], &vk.ck).unwrap())
            .collect();

        let mut transcript = Transcript::new(b"decider-test");
        let log = LogCommitment::empty();
        let (mut accumulator, _) =
            prove_initial(&vk, &mut transcript, &instances[0], &log).unwrap();
        let scheme = FoldingScheme::new(vk.clone(), FoldingParameters::default());
        for instance in &instances[1..] {
            accumulator = scheme.fold(&mut transcript, &accumulator, instance, &log).unwrap().0;
        }
        (vk, accumulator)
    }

    fn prove_and_verify(
        vk: &VerificationKey<DefaultGroup>,
        accumulator: &Accumulator<DefaultGroup>,
    ) -> FoldingResult<()> {
        let mut prover = Transcript::new(b"decide");
        let proof = DeciderProof::prove(vk, &mut prover, accumulator).unwrap();
        let mut verifier = Transcript::new(b"decide");
        proof.verify(vk, &mut verifier, &accumulator.instance)
    }

    #[test]
    fn test_num_rounds() {
        assert_eq!(num_rounds(1), 0);
        assert_eq!(num_rounds(2), 1);
        assert_eq!(num_rounds(3), 2);
        assert_eq!(num_rounds(8), 3);
    }

    #[test]
    fn test_decider_single_gate() {
        let assignments = vec![
            single_gate_assignment(Fr::from(2u64), Fr::from(3u64)),
            single_gate_assignment(Fr::from(4u64), Fr::from(5u64)),
            single_gate_assignment(Fr::from(6u64), Fr::from(7u64)),
        ];
        let (vk, accumulator) = folded_accumulator(StandardShape::SingleGate, &assignments);
        assert!(prove_and_verify(&vk, &accumulator).is_ok());
    }

    #[test]
    fn test_decider_cubic() {
        let assignments = vec![
            cubic_assignment(Fr::from(3u64)),
            cubic_assignment(Fr::from(9u64)),
        ];
        let (vk, accumulator) = folded_accumulator(StandardShape::Cubic, &assignments);
        assert_eq!(num_rounds(vk.shape.num_constraints()), 2);
        assert!(prove_and_verify(&vk, &accumulator).is_ok());
    }

    #[test]
    fn test_decider_rejects_unsatisfied_accumulator() {
        let mut bad = cubic_assignment(Fr::from(4u64));
        bad.1[0] += Fr::ONE;
        let assignments = vec![cubic_assignment(Fr::from(3u64)), bad];
        let (vk, accumulator) = folded_accumulator(StandardShape::Cubic, &assignments);
        assert!(matches!(
            prove_and_verify(&vk, &accumulator),
            Err(FoldingError::RelationViolation(_))
        ));
    }

    #[test]
    fn test_decider_rejects_wrong_witness_commitment() {
        let assignments = vec![single_gate_assignment(Fr::from(2u64), Fr::from(3u64))];
        let (vk, mut accumulator) = folded_accumulator(StandardShape::SingleGate, &assignments);
        accumulator.instance.witness += DefaultGroup::generator();
        assert!(matches!(
            prove_and_verify(&vk, &accumulator),
            Err(FoldingError::RelationViolation(_))
        ));
    }

    #[test]
    fn test_decider_rejects_tampered_claims() {
        let assignments = vec![
            cubic_assignment(Fr::from(3u64)),
            cubic_assignment(Fr::from(5u64)),
        ];
        let (vk, accumulator) = folded_accumulator(StandardShape::Cubic, &assignments);
        let mut prover = Transcript::new(b"decide");
        let mut proof = DeciderProof::prove(&vk, &mut prover, &accumulator).unwrap();
        proof.eval_e += Fr::ONE;

        let mut verifier = Transcript::new(b"decide");
        assert!(proof
            .verify(&vk, &mut verifier, &accumulator.instance)
            .is_err());
    }
}
