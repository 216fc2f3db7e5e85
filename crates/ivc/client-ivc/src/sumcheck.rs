//! Cubic sumcheck over multilinear tables.
//!
//! Proves `sum_{i in {0,1}^n} f(t_0(i), ..., t_4(i)) = claim` where every `t_k`
//! is multilinear and `f` has total degree three. Each round polynomial is sent
//! as its evaluations at `0, 1, 2, 3`. Rounds bind bit 0 of the table index
//! first, matching [`eq_table`](ivc_core::eq_table).

use commitments::TranscriptRead;
use ff::PrimeField;
use ivc_core::{FoldingError, FoldingResult, MultilinearPolynomial};
use rayon::prelude::*;

/// Tables combined by the sumcheck
pub const NUM_TABLES: usize = 5;

/// Evaluations per round polynomial
const ROUND_EVALS: usize = 4;

/// Round polynomials of a cubic sumcheck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumcheckProof<F: PrimeField> {
    /// `[s(0), s(1), s(2), s(3)]` per round
    pub rounds: Vec<[F; ROUND_EVALS]>,
}

impl<F: PrimeField> SumcheckProof<F> {
    /// Runs the prover over tables of equal power-of-two length.
    ///
    /// Returns the proof, the challenge point and the evaluations of every
    /// table at that point.
    pub fn prove_cubic<T, C>(
        transcript: &mut T,
        claim: F,
        tables: [Vec<F>; NUM_TABLES],
        combine: C,
    ) -> FoldingResult<(Self, Vec<F>, [F; NUM_TABLES])>
    where
        T: TranscriptRead,
        C: Fn(&[F; NUM_TABLES]) -> F + Sync,
    {
        let len = tables[0].len();
        if tables.iter().any(|table| table.len() != len) {
            return Err(FoldingError::invalid_instance(
                "sumcheck tables have different lengths",
            ));
        }
        let mut polys = Vec::with_capacity(NUM_TABLES);
        for table in tables {
            polys.push(MultilinearPolynomial::new(table)?);
        }
        let num_rounds = polys[0].num_vars();

        transcript.append_scalar(b"sumcheck-claim", &claim);
        transcript.append_u64(b"sumcheck-rounds", num_rounds as u64);

        let mut rounds = Vec::with_capacity(num_rounds);
        let mut point = Vec::with_capacity(num_rounds);
        for _ in 0..num_rounds {
            let evals = round_evaluations(&polys, &combine);
            transcript.append_scalars(b"sumcheck-round", &evals);
            let r: F = transcript.challenge_scalar(b"sumcheck-challenge");

            for poly in polys.iter_mut() {
                poly.bind_first(r);
            }
            rounds.push(evals);
            point.push(r);
        }

        let mut finals = [F::ZERO; NUM_TABLES];
        for (value, poly) in finals.iter_mut().zip(polys.iter()) {
            *value = poly.evaluations[0];
        }
        Ok((Self { rounds }, point, finals))
    }

    /// Replays the rounds, returning the reduced claim and the challenge point.
    ///
    /// The caller checks the reduced claim against the tables' evaluations.
    pub fn verify<T: TranscriptRead>(
        &self,
        transcript: &mut T,
        claim: F,
        num_rounds: usize,
    ) -> FoldingResult<(F, Vec<F>)> {
        if self.rounds.len() != num_rounds {
            return Err(FoldingError::relation_violation(format!(
                "sumcheck has {} rounds, expected {}",
                self.rounds.len(),
                num_rounds
            )));
        }

        transcript.append_scalar(b"sumcheck-claim", &claim);
        transcript.append_u64(b"sumcheck-rounds", num_rounds as u64);

        let mut claim = claim;
        let mut point = Vec::with_capacity(num_rounds);
        for (round, evals) in self.rounds.iter().enumerate() {
            if evals[0] + evals[1] != claim {
                return Err(FoldingError::relation_violation(format!(
                    "sumcheck round {} does not match the running claim",
                    round
                )));
            }
            transcript.append_scalars(b"sumcheck-round", evals);
            let r: F = transcript.challenge_scalar(b"sumcheck-challenge");
            claim = interpolate_cubic(evals, r)?;
            point.push(r);
        }
        Ok((claim, point))
    }
}

/// `s(t)` for `t = 0..3`, summing over the lower half of the hypercube
fn round_evaluations<F, C>(polys: &[MultilinearPolynomial<F>], combine: &C) -> [F; ROUND_EVALS]
where
    F: PrimeField,
    C: Fn(&[F; NUM_TABLES]) -> F + Sync,
{
    let half = polys[0].evaluations.len() / 2;
    (0..half)
        .into_par_iter()
        .map(|i| {
            let mut current = [F::ZERO; NUM_TABLES];
            let mut step = [F::ZERO; NUM_TABLES];
            for (k, poly) in polys.iter().enumerate() {
                let lo = poly.evaluations[2 * i];
                let hi = poly.evaluations[2 * i + 1];
                current[k] = lo;
                step[k] = hi - lo;
            }

            let mut evals = [F::ZERO; ROUND_EVALS];
            for eval in evals.iter_mut() {
                *eval = combine(&current);
                for (value, delta) in current.iter_mut().zip(step.iter()) {
                    *value += delta;
                }
            }
            evals
        })
        .reduce(
            || [F::ZERO; ROUND_EVALS],
            |mut acc, evals| {
                for (a, e) in acc.iter_mut().zip(evals.iter()) {
                    *a += e;
                }
                acc
            },
        )
}

/// Evaluates the cubic through `(0, e0), .., (3, e3)` at `r`
fn interpolate_cubic<F: PrimeField>(evals: &[F; ROUND_EVALS], r: F) -> FoldingResult<F> {
    let nodes = [F::ZERO, F::ONE, F::from(2u64), F::from(3u64)];
    // prod_{j != i} (i - j) for i = 0..3
    let denominators = [
        -F::from(6u64),
        F::from(2u64),
        -F::from(2u64),
        F::from(6u64),
    ];

    let mut result = F::ZERO;
    for i in 0..ROUND_EVALS {
        let mut numerator = F::ONE;
        for (j, node) in nodes.iter().enumerate() {
            if j != i {
                numerator *= r - node;
            }
        }
        let inverse = Option::<F>::from(denominators[i].invert()).ok_or_else(|| {
            FoldingError::invalid_instance("field characteristic too small for a cubic sumcheck")
        })?;
        result += evals[i] * numerator * inverse;
    }
    Ok(result)
}
