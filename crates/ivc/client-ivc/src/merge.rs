//! Merge proofs for appending a subtable to the operation log.
//!
//! With `L` the previous log, `R` the appended subtable and `M` the new log,
//! every column satisfies `M_j(X) = L_j(X) + X^k R_j(X)` where `k` is the
//! previous row count and `n` the merged one. The prover shows this at a
//! random point `κ`. Degrees are pinned with two reversals opened at `κ⁻¹`:
//! `G(X) = X^{k-1} Σ α_j L_j(1/X)` shows `deg L_j < k` and
//! `H(X) = X^{n-1} Σ γ_j M_j(1/X)` shows `deg M_j < n`, which leaves
//! `deg R_j < n - k`. Every opening runs over the full power-of-two length,
//! so coefficients in the padding region are bound too. Column openings at
//! `κ` are batched into one inner product argument; commitments are combined
//! homomorphically on the verifier side.

use commitments::{evaluate, powers, CommitmentKey, IpaProof, TranscriptRead};
use ff::Field;
use ivc_core::{
    FoldingError, FoldingResult, LogCommitment, OpTable, PrimeGroup, ScalarOf, NUM_COLUMNS,
};
use tracing::{debug, instrument};

/// Polynomials opened by the batched argument: left, right and merged columns
const NUM_BATCHED: usize = 3 * NUM_COLUMNS;

type Columns<F> = [Vec<F>; NUM_COLUMNS];

/// Proof that a log commitment is the append of a subtable to a previous one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeProof<G: PrimeGroup> {
    /// Row count of the previous log
    pub shift_size: u64,
    /// Column commitments of the merged log
    pub merged_commitments: [G; NUM_COLUMNS],
    /// Commitment to the reversed combination of the previous log
    pub degree_check_commitment: G,
    /// Commitment to the reversed combination of the merged log
    pub merged_degree_check_commitment: G,
    /// `L_j(κ)`
    pub left_evals: [ScalarOf<G>; NUM_COLUMNS],
    /// `R_j(κ)`
    pub right_evals: [ScalarOf<G>; NUM_COLUMNS],
    /// `M_j(κ)`
    pub merged_evals: [ScalarOf<G>; NUM_COLUMNS],
    /// `G(κ⁻¹)`
    pub degree_check_eval: ScalarOf<G>,
    /// `H(κ⁻¹)`
    pub merged_degree_check_eval: ScalarOf<G>,
    /// Opening of the batched columns at `κ`
    pub batched_opening: IpaProof<G>,
    /// Opening of `G` at `κ⁻¹`
    pub degree_check_opening: IpaProof<G>,
    /// Opening of `H` at `κ⁻¹`
    pub merged_degree_check_opening: IpaProof<G>,
}

impl<G: PrimeGroup> MergeProof<G> {
    /// Proves that `previous ++ subtable` is committed by the returned commitments.
    ///
    /// Returns the merged table alongside the proof.
    #[instrument(skip_all, level = "debug")]
    pub fn prove<T: TranscriptRead>(
        ck: &CommitmentKey<G>,
        transcript: &mut T,
        previous: &OpTable<ScalarOf<G>>,
        previous_commitment: &LogCommitment<G>,
        subtable: &OpTable<ScalarOf<G>>,
        subtable_commitments: &[G; NUM_COLUMNS],
    ) -> FoldingResult<(OpTable<ScalarOf<G>>, Self)> {
        let k = previous.num_rows();
        if k as u64 != previous_commitment.rows {
            return Err(FoldingError::log_inconsistency(format!(
                "previous log has {} rows but its commitment claims {}",
                k, previous_commitment.rows
            )));
        }

        let merged = previous.concat(subtable);
        let merged_commitments = merged.commit(ck)?;
        let proof = Self::prove_columns(
            ck,
            transcript,
            previous.columns(),
            previous_commitment,
            subtable.columns(),
            subtable_commitments,
            merged.columns(),
            merged_commitments,
            merged.num_rows(),
        )?;

        debug!(
            previous_rows = k,
            appended_rows = subtable.num_rows(),
            "merge proof generated"
        );
        Ok((merged, proof))
    }

    /// Row counts come from `previous_commitment` and `merged_rows`; the
    /// columns themselves are taken as given.
    #[allow(clippy::too_many_arguments)]
    fn prove_columns<T: TranscriptRead>(
        ck: &CommitmentKey<G>,
        transcript: &mut T,
        previous: &Columns<ScalarOf<G>>,
        previous_commitment: &LogCommitment<G>,
        subtable: &Columns<ScalarOf<G>>,
        subtable_commitments: &[G; NUM_COLUMNS],
        merged: &Columns<ScalarOf<G>>,
        merged_commitments: [G; NUM_COLUMNS],
        n: usize,
    ) -> FoldingResult<Self> {
        let k = usize::try_from(previous_commitment.rows)
            .map_err(|_| FoldingError::log_inconsistency("previous log too long"))?;

        absorb_statement(
            transcript,
            previous_commitment.rows,
            previous_commitment,
            subtable_commitments,
            &merged_commitments,
        );
        let (alphas, gammas) = degree_challenges::<ScalarOf<G>, T>(transcript);

        let reversed = reversed_combination(previous, k, &alphas);
        let degree_check_commitment = ck.commit(&reversed)?;
        let merged_reversed = reversed_combination(merged, n, &gammas);
        let merged_degree_check_commitment = ck.commit(&merged_reversed)?;
        absorb_degree_checks(
            transcript,
            &degree_check_commitment,
            &merged_degree_check_commitment,
        );

        let kappa: ScalarOf<G> = transcript.challenge_scalar(b"merge-kappa");
        let kappa_inv = invert(kappa)?;

        let mut left_evals = [G::Scalar::ZERO; NUM_COLUMNS];
        let mut right_evals = [G::Scalar::ZERO; NUM_COLUMNS];
        let mut merged_evals = [G::Scalar::ZERO; NUM_COLUMNS];
        for j in 0..NUM_COLUMNS {
            left_evals[j] = evaluate(&previous[j], kappa);
            right_evals[j] = evaluate(&subtable[j], kappa);
            merged_evals[j] = evaluate(&merged[j], kappa);
        }
        let degree_check_eval = evaluate(&reversed, kappa_inv);
        let merged_degree_check_eval = evaluate(&merged_reversed, kappa_inv);

        let batching = absorb_evaluations(
            transcript,
            &left_evals,
            &right_evals,
            &merged_evals,
            [&degree_check_eval, &merged_degree_check_eval],
        );

        // Σ β_i P_i over the padded merged length
        let len = padded_len(n);
        let mut batched = vec![G::Scalar::ZERO; len];
        for (group, columns) in [previous, subtable, merged].iter().enumerate() {
            for (j, column) in columns.iter().enumerate() {
                let beta = batching[group * NUM_COLUMNS + j];
                for (acc, coeff) in batched.iter_mut().zip(column) {
                    *acc += beta * coeff;
                }
            }
        }
        let batched_commitment = batch_commitments(
            &previous_commitment.columns,
            subtable_commitments,
            &merged_commitments,
            &batching,
        );
        let batched_opening = IpaProof::prove(
            ck,
            transcript,
            &batched_commitment,
            &batched,
            &powers(kappa, len),
        )?;

        let degree_check_opening = IpaProof::prove(
            ck,
            transcript,
            &degree_check_commitment,
            &reversed,
            &powers(kappa_inv, reversed.len()),
        )?;
        let merged_degree_check_opening = IpaProof::prove(
            ck,
            transcript,
            &merged_degree_check_commitment,
            &merged_reversed,
            &powers(kappa_inv, merged_reversed.len()),
        )?;

        Ok(Self {
            shift_size: previous_commitment.rows,
            merged_commitments,
            degree_check_commitment,
            merged_degree_check_commitment,
            left_evals,
            right_evals,
            merged_evals,
            degree_check_eval,
            merged_degree_check_eval,
            batched_opening,
            degree_check_opening,
            merged_degree_check_opening,
        })
    }

    /// The log commitment this proof claims for `previous ++ subtable`
    pub fn merged_log(&self, previous: &LogCommitment<G>, subtable: &LogCommitment<G>) -> LogCommitment<G> {
        LogCommitment {
            columns: self.merged_commitments,
            rows: previous.rows.saturating_add(subtable.rows),
        }
    }
}

/// Checks that `merged` commits to `previous ++ subtable`.
///
/// Every failure is a [`FoldingError::LogInconsistency`].
#[instrument(skip_all, level = "debug")]
pub fn verify_merge<G: PrimeGroup, T: TranscriptRead>(
    ck: &CommitmentKey<G>,
    transcript: &mut T,
    previous: &LogCommitment<G>,
    subtable: &LogCommitment<G>,
    merged: &LogCommitment<G>,
    proof: &MergeProof<G>,
) -> FoldingResult<()> {
    if proof.shift_size != previous.rows {
        return Err(FoldingError::log_inconsistency(format!(
            "shift size {} does not match the previous log's {} rows",
            proof.shift_size, previous.rows
        )));
    }
    let expected_rows = previous
        .rows
        .checked_add(subtable.rows)
        .ok_or_else(|| FoldingError::log_inconsistency("log row count overflows"))?;
    if merged.rows != expected_rows {
        return Err(FoldingError::log_inconsistency(format!(
            "merged log claims {} rows, expected {}",
            merged.rows, expected_rows
        )));
    }
    if merged.columns != proof.merged_commitments {
        return Err(FoldingError::log_inconsistency(
            "merged log commitment differs from the proof",
        ));
    }
    let k = usize::try_from(previous.rows)
        .map_err(|_| FoldingError::log_inconsistency("previous log too long"))?;
    let n = usize::try_from(merged.rows)
        .map_err(|_| FoldingError::log_inconsistency("merged log too long"))?;
    if padded_len(n) > ck.len() {
        return Err(FoldingError::log_inconsistency(format!(
            "merged log of {} rows exceeds the commitment key",
            n
        )));
    }

    absorb_statement(
        transcript,
        previous.rows,
        previous,
        &subtable.columns,
        &merged.columns,
    );
    let (alphas, gammas) = degree_challenges::<ScalarOf<G>, T>(transcript);
    absorb_degree_checks(
        transcript,
        &proof.degree_check_commitment,
        &proof.merged_degree_check_commitment,
    );
    let kappa: ScalarOf<G> = transcript.challenge_scalar(b"merge-kappa");
    let kappa_inv = invert(kappa)?;

    // M_j(κ) = L_j(κ) + κ^k R_j(κ)
    let shift = kappa.pow_vartime([previous.rows]);
    for j in 0..NUM_COLUMNS {
        if proof.left_evals[j] + shift * proof.right_evals[j] != proof.merged_evals[j] {
            return Err(FoldingError::log_inconsistency(format!(
                "column {} is not the concatenation of the previous log and the subtable",
                j
            )));
        }
    }

    // Σ α_j L_j(κ) = κ^{k-1} G(κ⁻¹), and Σ α_j L_j = 0 on an empty log
    if !reversal_holds(kappa, k, &alphas, &proof.left_evals, proof.degree_check_eval) {
        return Err(FoldingError::log_inconsistency(
            "previous log exceeds its claimed degree",
        ));
    }
    if !reversal_holds(
        kappa,
        n,
        &gammas,
        &proof.merged_evals,
        proof.merged_degree_check_eval,
    ) {
        return Err(FoldingError::log_inconsistency(
            "merged log exceeds its claimed degree",
        ));
    }

    let batching = absorb_evaluations(
        transcript,
        &proof.left_evals,
        &proof.right_evals,
        &proof.merged_evals,
        [&proof.degree_check_eval, &proof.merged_degree_check_eval],
    );

    let batched_commitment = batch_commitments(
        &previous.columns,
        &subtable.columns,
        &merged.columns,
        &batching,
    );
    let evals = proof
        .left_evals
        .iter()
        .chain(proof.right_evals.iter())
        .chain(proof.merged_evals.iter());
    let batched_value: ScalarOf<G> = batching
        .iter()
        .zip(evals)
        .map(|(beta, eval)| *beta * eval)
        .sum();

    proof
        .batched_opening
        .verify(
            ck,
            transcript,
            &batched_commitment,
            &powers(kappa, padded_len(n)),
            &batched_value,
        )
        .map_err(|err| {
            FoldingError::log_inconsistency(format!("batched column opening rejected: {}", err))
        })?;

    proof
        .degree_check_opening
        .verify(
            ck,
            transcript,
            &proof.degree_check_commitment,
            &powers(kappa_inv, padded_len(k)),
            &proof.degree_check_eval,
        )
        .map_err(|err| {
            FoldingError::log_inconsistency(format!("degree-check opening rejected: {}", err))
        })?;

    proof
        .merged_degree_check_opening
        .verify(
            ck,
            transcript,
            &proof.merged_degree_check_commitment,
            &powers(kappa_inv, padded_len(n)),
            &proof.merged_degree_check_eval,
        )
        .map_err(|err| {
            FoldingError::log_inconsistency(format!(
                "merged degree-check opening rejected: {}",
                err
            ))
        })?;

    Ok(())
}

fn absorb_statement<G: PrimeGroup, T: TranscriptRead>(
    transcript: &mut T,
    shift_size: u64,
    previous: &LogCommitment<G>,
    subtable: &[G; NUM_COLUMNS],
    merged: &[G; NUM_COLUMNS],
) {
    transcript.append_u64(b"merge-shift-size", shift_size);
    transcript.append_points(b"merge-previous", &previous.columns);
    transcript.append_points(b"merge-subtable", subtable);
    transcript.append_points(b"merge-merged", merged);
}

/// `α` for the previous log and `γ` for the merged one
fn degree_challenges<F: ff::PrimeField, T: TranscriptRead>(transcript: &mut T) -> (Vec<F>, Vec<F>) {
    let mut alphas: Vec<F> = transcript.challenge_scalars(b"merge-degree-check", 2 * NUM_COLUMNS);
    let gammas = alphas.split_off(NUM_COLUMNS);
    (alphas, gammas)
}

fn absorb_degree_checks<G: PrimeGroup, T: TranscriptRead>(transcript: &mut T, previous: &G, merged: &G) {
    transcript.append_point(b"merge-degree-check-commitment", previous);
    transcript.append_point(b"merge-merged-degree-check-commitment", merged);
}

fn absorb_evaluations<F: ff::PrimeField, T: TranscriptRead>(
    transcript: &mut T,
    left: &[F; NUM_COLUMNS],
    right: &[F; NUM_COLUMNS],
    merged: &[F; NUM_COLUMNS],
    degree_checks: [&F; 2],
) -> Vec<F> {
    transcript.append_scalars(b"merge-left-evals", left);
    transcript.append_scalars(b"merge-right-evals", right);
    transcript.append_scalars(b"merge-merged-evals", merged);
    transcript.append_scalar(b"merge-degree-check-eval", degree_checks[0]);
    transcript.append_scalar(b"merge-merged-degree-check-eval", degree_checks[1]);
    transcript.challenge_scalars(b"merge-batching", NUM_BATCHED)
}

/// `Σ c_j P_j(κ) = κ^{rows-1} reversal(κ⁻¹)`, with the sum forced to zero when `rows == 0`
fn reversal_holds<F: ff::PrimeField>(
    kappa: F,
    rows: usize,
    coefficients: &[F],
    evals: &[F; NUM_COLUMNS],
    reversal: F,
) -> bool {
    let combined: F = coefficients
        .iter()
        .zip(evals.iter())
        .map(|(c, eval)| *c * eval)
        .sum();
    let expected = if rows == 0 {
        F::ZERO
    } else {
        kappa.pow_vartime([rows as u64 - 1]) * reversal
    };
    combined == expected
}

/// `reverse(Σ c_j P_j)` over the first `rows` coefficients, zero-padded to a
/// power of two; `[0]` when `rows == 0`
fn reversed_combination<F: ff::PrimeField>(columns: &Columns<F>, rows: usize, coefficients: &[F]) -> Vec<F> {
    if rows == 0 {
        return vec![F::ZERO];
    }
    let mut combined = vec![F::ZERO; rows];
    for (column, c) in columns.iter().zip(coefficients.iter()) {
        for (acc, coeff) in combined.iter_mut().zip(column) {
            *acc += *c * coeff;
        }
    }
    combined.reverse();
    combined.resize(padded_len(rows), F::ZERO);
    combined
}

fn padded_len(len: usize) -> usize {
    len.max(1).next_power_of_two()
}

fn batch_commitments<G: PrimeGroup>(
    previous: &[G; NUM_COLUMNS],
    subtable: &[G; NUM_COLUMNS],
    merged: &[G; NUM_COLUMNS],
    batching: &[ScalarOf<G>],
) -> G {
    previous
        .iter()
        .chain(subtable.iter())
        .chain(merged.iter())
        .zip(batching.iter())
        .fold(G::identity(), |acc, (commitment, beta)| acc + *commitment * beta)
}

fn invert<F: Field>(x: F) -> FoldingResult<F> {
    Option::from(x.invert()).ok_or_else(|| FoldingError::log_inconsistency("zero merge challenge"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use commitments::Transcript;
    use ivc_core::{DefaultGroup, DefaultScalar as Fr, EcOp};

    fn ck() -> CommitmentKey<DefaultGroup> {
        CommitmentKey::setup(b"merge-test", 32)
    }

    fn table(ops: &[EcOp<DefaultGroup>]) -> OpTable<Fr> {
        OpTable::from_ops(ops).unwrap()
    }

    fn sample_ops(seed: u64) -> Vec<EcOp<DefaultGroup>> {
        let p = DefaultGroup::generator() * Fr::from(seed);
        let s = Fr::from(seed + 7);
        vec![EcOp::Mul(p, s), EcOp::Add(p), EcOp::EqAndReset(p * s + p)]
    }

    fn log_commitment(ck: &CommitmentKey<DefaultGroup>, table: &OpTable<Fr>) -> LogCommitment<DefaultGroup> {
        LogCommitment {
            columns: table.commit(ck).unwrap(),
            rows: table.num_rows() as u64,
        }
    }

    struct Fixture {
        previous: LogCommitment<DefaultGroup>,
        subtable: LogCommitment<DefaultGroup>,
        merged: LogCommitment<DefaultGroup>,
        proof: MergeProof<DefaultGroup>,
    }

    fn prove(previous_ops: &[EcOp<DefaultGroup>], new_ops: &[EcOp<DefaultGroup>]) -> Fixture {
        let ck = ck();
        let previous_table = table(previous_ops);
        let subtable = table(new_ops);
        let previous = log_commitment(&ck, &previous_table);
        let sub = log_commitment(&ck, &subtable);

        let mut transcript = Transcript::new(b"merge");
        let (merged_table, proof) = MergeProof::prove(
            &ck,
            &mut transcript,
            &previous_table,
            &previous,
            &subtable,
            &sub.columns,
        )
        .unwrap();
        let merged = log_commitment(&ck, &merged_table);
        assert_eq!(proof.merged_log(&previous, &sub), merged);

        Fixture {
            previous,
            subtable: sub,
            merged,
            proof,
        }
    }

    fn verify(fixture: &Fixture) -> FoldingResult<()> {
        let mut transcript = Transcript::new(b"merge");
        verify_merge(
            &ck(),
            &mut transcript,
            &fixture.previous,
            &fixture.subtable,
            &fixture.merged,
            &fixture.proof,
        )
    }

    #[test]
    fn test_merge_onto_empty_log() {
        let fixture = prove(&[], &sample_ops(1));
        assert_eq!(fixture.proof.shift_size, 0);
        assert!(verify(&fixture).is_ok());
    }

    #[test]
    fn test_merge_onto_existing_log() {
        let fixture = prove(&sample_ops(1), &sample_ops(2));
        assert_eq!(fixture.proof.shift_size, 6);
        assert_eq!(fixture.merged.rows, 12);
        assert!(verify(&fixture).is_ok());
    }

    #[test]
    fn test_merge_empty_subtable() {
        let fixture = prove(&sample_ops(3), &[]);
        assert_eq!(fixture.merged.columns, fixture.previous.columns);
        assert!(verify(&fixture).is_ok());
    }

    #[test]
    fn test_merge_rejects_tampered_evaluation() {
        let mut fixture = prove(&sample_ops(1), &sample_ops(2));
        fixture.proof.right_evals[1] += Fr::ONE;
        assert!(matches!(
            verify(&fixture),
            Err(FoldingError::LogInconsistency(_))
        ));
    }

    #[test]
    fn test_merge_rejects_consistent_but_false_evaluations() {
        // keep the concatenation identity intact so only the opening can catch it
        let mut fixture = prove(&sample_ops(1), &sample_ops(2));
        fixture.proof.left_evals[2] += Fr::ONE;
        fixture.proof.merged_evals[2] += Fr::ONE;
        assert!(matches!(
            verify(&fixture),
            Err(FoldingError::LogInconsistency(_))
        ));
    }

    #[test]
    fn test_merge_rejects_tampered_commitment() {
        let mut fixture = prove(&sample_ops(1), &sample_ops(2));
        fixture.merged.columns[0] += DefaultGroup::generator();
        fixture.proof.merged_commitments[0] += DefaultGroup::generator();
        assert!(matches!(
            verify(&fixture),
            Err(FoldingError::LogInconsistency(_))
        ));
    }

    #[test]
    fn test_merge_rejects_wrong_shift_size() {
        let mut fixture = prove(&sample_ops(1), &sample_ops(2));
        fixture.proof.shift_size += 2;
        assert!(matches!(
            verify(&fixture),
            Err(FoldingError::LogInconsistency(_))
        ));
    }

    #[test]
    fn test_merge_rejects_wrong_row_count() {
        let mut fixture = prove(&sample_ops(1), &sample_ops(2));
        fixture.merged.rows -= 2;
        assert!(matches!(
            verify(&fixture),
            Err(FoldingError::LogInconsistency(_))
        ));
    }

    #[test]
    fn test_merge_rejects_swapped_subtable() {
        let mut fixture = prove(&sample_ops(1), &sample_ops(2));
        let other = log_commitment(&ck(), &table(&sample_ops(5)));
        fixture.subtable = other;
        assert!(verify(&fixture).is_err());
    }

    fn commit_columns(ck: &CommitmentKey<DefaultGroup>, columns: &Columns<Fr>) -> [DefaultGroup; NUM_COLUMNS] {
        [0, 1, 2, 3].map(|j| ck.commit(&columns[j]).unwrap())
    }

    #[test]
    fn test_merge_rejects_coefficient_in_padding_region() {
        // six claimed rows pad to eight; smuggle a seventh coefficient into column 0
        let ck = ck();
        let honest = table(&sample_ops(1));
        let mut forged = honest.columns().clone();
        forged[0].push(Fr::from(424242u64));
        let forged_commitments = commit_columns(&ck, &forged);
        assert_ne!(forged_commitments[0], honest.commit(&ck).unwrap()[0]);

        let previous = LogCommitment::empty();
        let empty = OpTable::<Fr>::default();
        let mut transcript = Transcript::new(b"merge");
        let proof = MergeProof::prove_columns(
            &ck,
            &mut transcript,
            empty.columns(),
            &previous,
            &forged,
            &forged_commitments,
            &forged,
            forged_commitments,
            6,
        )
        .unwrap();

        let fixture = Fixture {
            previous,
            subtable: LogCommitment {
                columns: forged_commitments,
                rows: 6,
            },
            merged: LogCommitment {
                columns: forged_commitments,
                rows: 6,
            },
            proof,
        };
        assert!(matches!(
            verify(&fixture),
            Err(FoldingError::LogInconsistency(_))
        ));
    }

    #[test]
    fn test_merge_rejects_previous_log_beyond_its_rows() {
        let ck = ck();
        let extra = Fr::from(99u64);
        let mut previous_columns = table(&sample_ops(1)).columns().clone();
        previous_columns[2].push(extra);
        let subtable = table(&sample_ops(2));

        // M = L + X^6 R still holds as polynomials
        let mut merged_columns = previous_columns.clone();
        for (j, column) in merged_columns.iter_mut().enumerate() {
            column.truncate(6);
            column.extend_from_slice(subtable.column(j));
        }
        merged_columns[2][6] += extra;

        let previous = LogCommitment {
            columns: commit_columns(&ck, &previous_columns),
            rows: 6,
        };
        let sub = log_commitment(&ck, &subtable);
        let merged_commitments = commit_columns(&ck, &merged_columns);

        let mut transcript = Transcript::new(b"merge");
        let proof = MergeProof::prove_columns(
            &ck,
            &mut transcript,
            &previous_columns,
            &previous,
            subtable.columns(),
            &sub.columns,
            &merged_columns,
            merged_commitments,
            12,
        )
        .unwrap();

        let fixture = Fixture {
            previous,
            subtable: sub,
            merged: LogCommitment {
                columns: merged_commitments,
                rows: 12,
            },
            proof,
        };
        assert!(matches!(
            verify(&fixture),
            Err(FoldingError::LogInconsistency(_))
        ));
    }

    #[test]
    fn test_reversed_combination() {
        let t = table(&sample_ops(4));
        let alphas = vec![Fr::ONE, Fr::ZERO, Fr::ZERO, Fr::ZERO];
        let reversed = reversed_combination(t.columns(), t.num_rows(), &alphas);
        let mut column = t.column(0).to_vec();
        column.reverse();
        column.resize(8, Fr::ZERO);
        assert_eq!(reversed, column);

        assert_eq!(
            reversed_combination(OpTable::<Fr>::default().columns(), 0, &alphas),
            vec![Fr::ZERO]
        );
    }
}
