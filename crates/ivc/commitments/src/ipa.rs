//! Inner Product Argument
//!
//! Proves knowledge of a vector `a` committed as `C = <a, G>` such that
//! `<a, b> = v` for a public vector `b`. Opening a committed polynomial at a
//! point `x` is the special case `b = (1, x, x^2, ...)`.
//!
//! The proof consists of `log2(n)` pairs of group elements and one scalar.
//! Each round halves the vectors:
//!
//! ```text
//! L = <a_lo, G_hi> + <a_lo, b_hi> U'      R = <a_hi, G_lo> + <a_hi, b_lo> U'
//! a' = a_lo x + a_hi x^-1
//! b' = b_lo x^-1 + b_hi x
//! G' = G_lo x^-1 + G_hi x
//! ```
//!
//! so that `C + vU' + x^2 L + x^-2 R = <a', G'> + <a', b'> U'`.

use crate::key::CommitmentKey;
use crate::msm::msm;
use crate::transcript::TranscriptRead;
use crate::{CommitmentError, Result};
use ff::Field;
use group::{Group, GroupEncoding};
use rayon::prelude::*;

/// Inner product `sum_i(a[i] * b[i])`
pub fn inner_product<F: Field>(a: &[F], b: &[F]) -> F {
    a.iter().zip(b.iter()).map(|(x, y)| *x * y).sum()
}

/// `[1, x, x^2, ..., x^(n-1)]`
pub fn powers<F: Field>(x: F, n: usize) -> Vec<F> {
    let mut result = Vec::with_capacity(n);
    let mut current = F::ONE;
    for _ in 0..n {
        result.push(current);
        current *= x;
    }
    result
}

/// Evaluate a polynomial given by its coefficients (lowest degree first)
pub fn evaluate<F: Field>(coefficients: &[F], x: F) -> F {
    coefficients
        .iter()
        .rev()
        .fold(F::ZERO, |acc, coeff| acc * x + coeff)
}

/// An inner product argument proof
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpaProof<G: Group> {
    /// Left cross commitments, one per round
    pub l_vec: Vec<G>,
    /// Right cross commitments, one per round
    pub r_vec: Vec<G>,
    /// The fully folded witness scalar
    pub a: G::Scalar,
}

impl<G: Group + GroupEncoding> IpaProof<G> {
    /// Number of folding rounds
    pub fn rounds(&self) -> usize {
        self.l_vec.len()
    }

    /// Prove that `commitment = <a, G>` opens to `<a, b>`.
    ///
    /// Both vectors are zero-padded to the next power of two; the caller is
    /// responsible for `commitment` matching `a` under `ck`.
    pub fn prove<T: TranscriptRead>(
        ck: &CommitmentKey<G>,
        transcript: &mut T,
        commitment: &G,
        a: &[G::Scalar],
        b: &[G::Scalar],
    ) -> Result<Self> {
        if a.len() != b.len() {
            return Err(CommitmentError::InvalidParameters(format!(
                "vector lengths differ: {} and {}",
                a.len(),
                b.len()
            )));
        }

        let n = padded_len(a.len());
        ck.ensure_len(n)?;

        let mut a = pad(a, n);
        let mut b = pad(b, n);
        let mut g: Vec<G> = ck.generators()[..n].to_vec();

        let value = inner_product(&a, &b);
        let u = bind_statement(ck, transcript, commitment, &value, n);

        let rounds = n.trailing_zeros() as usize;
        let mut l_vec = Vec::with_capacity(rounds);
        let mut r_vec = Vec::with_capacity(rounds);

        while a.len() > 1 {
            let half = a.len() / 2;
            let (a_lo, a_hi) = a.split_at(half);
            let (b_lo, b_hi) = b.split_at(half);
            let (g_lo, g_hi) = g.split_at(half);

            let l = msm(a_lo, g_hi)? + u * inner_product(a_lo, b_hi);
            let r = msm(a_hi, g_lo)? + u * inner_product(a_hi, b_lo);

            transcript.append_point(b"ipa-l", &l);
            transcript.append_point(b"ipa-r", &r);
            let x: G::Scalar = transcript.challenge_scalar(b"ipa-round");
            let x_inv = invert(x)?;

            let a_next = fold_scalars(a_lo, a_hi, x, x_inv);
            let b_next = fold_scalars(b_lo, b_hi, x_inv, x);
            let g_next = fold_points(g_lo, g_hi, x_inv, x);

            l_vec.push(l);
            r_vec.push(r);
            a = a_next;
            b = b_next;
            g = g_next;
        }

        Ok(Self { l_vec, r_vec, a: a[0] })
    }

    /// Verify the proof against `commitment`, the public vector `b` and the
    /// claimed inner product `value`.
    pub fn verify<T: TranscriptRead>(
        &self,
        ck: &CommitmentKey<G>,
        transcript: &mut T,
        commitment: &G,
        b: &[G::Scalar],
        value: &G::Scalar,
    ) -> Result<()> {
        let rounds = self.l_vec.len();
        if self.r_vec.len() != rounds {
            return Err(CommitmentError::InvalidProof(
                "mismatched cross commitment counts".to_string(),
            ));
        }
        if b.is_empty() || rounds >= usize::BITS as usize {
            return Err(CommitmentError::InvalidProof("degenerate opening".to_string()));
        }

        let n = 1usize << rounds;
        if padded_len(b.len()) != n {
            return Err(CommitmentError::InvalidDegree {
                expected: padded_len(b.len()),
                actual: n,
            });
        }
        ck.ensure_len(n)?;
        let b = pad(b, n);

        let u = bind_statement(ck, transcript, commitment, value, n);

        let mut challenges = Vec::with_capacity(rounds);
        let mut challenges_inv = Vec::with_capacity(rounds);
        let mut folded_commitment = *commitment + u * value;
        for (l, r) in self.l_vec.iter().zip(self.r_vec.iter()) {
            transcript.append_point(b"ipa-l", l);
            transcript.append_point(b"ipa-r", r);
            let x: G::Scalar = transcript.challenge_scalar(b"ipa-round");
            let x_inv = invert(x)?;

            folded_commitment += *l * x.square() + *r * x_inv.square();
            challenges.push(x);
            challenges_inv.push(x_inv);
        }

        let s = folding_coefficients(&challenges, &challenges_inv);
        let g_final = msm(&s, &ck.generators()[..n])?;
        let b_final = inner_product(&s, &b);

        let expected = g_final * self.a + u * (self.a * b_final);
        if folded_commitment != expected {
            return Err(CommitmentError::VerificationFailed);
        }
        Ok(())
    }
}

/// Absorb the statement and derive the randomized base `U' = w U`.
fn bind_statement<G: Group + GroupEncoding, T: TranscriptRead>(
    ck: &CommitmentKey<G>,
    transcript: &mut T,
    commitment: &G,
    value: &G::Scalar,
    n: usize,
) -> G {
    transcript.append_point(b"ipa-commitment", commitment);
    transcript.append_scalar(b"ipa-value", value);
    transcript.append_u64(b"ipa-length", n as u64);
    let w: G::Scalar = transcript.challenge_scalar(b"ipa-base");
    ck.inner_product_base() * w
}

/// Coefficients `s_i` with `G_final = <s, G>`. Round `j` folds on bit
/// `k - 1 - j` of the index.
fn folding_coefficients<F: Field>(challenges: &[F], challenges_inv: &[F]) -> Vec<F> {
    let rounds = challenges.len();
    (0..1usize << rounds)
        .into_par_iter()
        .map(|i| {
            (0..rounds).fold(F::ONE, |acc, j| {
                if (i >> (rounds - 1 - j)) & 1 == 1 {
                    acc * challenges[j]
                } else {
                    acc * challenges_inv[j]
                }
            })
        })
        .collect()
}

fn fold_scalars<F: Field>(lo: &[F], hi: &[F], lo_factor: F, hi_factor: F) -> Vec<F> {
    lo.par_iter()
        .zip(hi.par_iter())
        .map(|(l, h)| *l * lo_factor + *h * hi_factor)
        .collect()
}

fn fold_points<G: Group>(lo: &[G], hi: &[G], lo_factor: G::Scalar, hi_factor: G::Scalar) -> Vec<G> {
    lo.par_iter()
        .zip(hi.par_iter())
        .map(|(l, h)| *l * lo_factor + *h * hi_factor)
        .collect()
}

fn invert<F: Field>(x: F) -> Result<F> {
    Option::from(x.invert())
        .ok_or_else(|| CommitmentError::IpaError("zero round challenge".to_string()))
}

fn padded_len(len: usize) -> usize {
    len.max(1).next_power_of_two()
}

fn pad<F: Field>(values: &[F], n: usize) -> Vec<F> {
    let mut padded = values.to_vec();
    padded.resize(n, F::ZERO);
    padded
}
