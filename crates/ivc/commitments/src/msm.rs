//! Multi-scalar multiplication utilities
//!
//! Commitments, cross terms and inner product verification all reduce to
//! `sum_i(scalars[i] * bases[i])`, so this is the hot path of every fold step.

use crate::{CommitmentError, Result};
use ff::PrimeField;
use group::Group;
use rayon::prelude::*;
use std::cmp;

/// Inputs up to this size use plain double-and-add.
const SIMPLE_MSM_THRESHOLD: usize = 32;

/// Performs multi-scalar multiplication: `sum_i(scalars[i] * bases[i])`
///
/// Scalars are read through their canonical little-endian representation.
pub fn msm<G: Group>(scalars: &[G::Scalar], bases: &[G]) -> Result<G> {
    if scalars.len() != bases.len() {
        return Err(CommitmentError::MsmError(format!(
            "{} scalars for {} bases",
            scalars.len(),
            bases.len()
        )));
    }

    if scalars.is_empty() {
        return Ok(G::identity());
    }

    if scalars.len() <= SIMPLE_MSM_THRESHOLD {
        return Ok(simple_msm(scalars, bases));
    }

    Ok(pippenger_msm(scalars, bases))
}

/// Simple MSM implementation for small inputs
fn simple_msm<G: Group>(scalars: &[G::Scalar], bases: &[G]) -> G {
    scalars
        .iter()
        .zip(bases.iter())
        .map(|(scalar, base)| *base * scalar)
        .fold(G::identity(), |acc, term| acc + term)
}

/// Pippenger's bucket method. Windows are summed in parallel and then combined
/// from the most significant window down.
fn pippenger_msm<G: Group>(scalars: &[G::Scalar], bases: &[G]) -> G {
    let window_size = optimal_window_size(scalars.len());
    let num_bits = G::Scalar::NUM_BITS as usize;
    let num_windows = (num_bits + window_size - 1) / window_size;

    let reprs: Vec<<G::Scalar as PrimeField>::Repr> =
        scalars.par_iter().map(|s| s.to_repr()).collect();

    let window_sums: Vec<G> = (0..num_windows)
        .into_par_iter()
        .map(|window_idx| {
            let bit_start = window_idx * window_size;
            let bit_end = cmp::min(bit_start + window_size, num_bits);
            process_window(&reprs, bases, bit_start, bit_end)
        })
        .collect();

    let mut result = G::identity();
    for (window_idx, window_sum) in window_sums.into_iter().enumerate().rev() {
        result += window_sum;
        if window_idx > 0 {
            for _ in 0..window_size {
                result = result.double();
            }
        }
    }
    result
}

/// Process a single window in Pippenger's algorithm
fn process_window<G: Group, R: AsRef<[u8]>>(
    reprs: &[R],
    bases: &[G],
    bit_start: usize,
    bit_end: usize,
) -> G {
    let num_buckets = (1 << (bit_end - bit_start)) - 1;
    let mut buckets = vec![G::identity(); num_buckets];

    for (repr, base) in reprs.iter().zip(bases.iter()) {
        let bucket_idx = extract_window_bits(repr.as_ref(), bit_start, bit_end);
        if bucket_idx > 0 {
            buckets[bucket_idx - 1] += base;
        }
    }

    // sum_k k * bucket_k via running sums
    let mut result = G::identity();
    let mut running_sum = G::identity();
    for bucket in buckets.into_iter().rev() {
        running_sum += bucket;
        result += running_sum;
    }
    result
}

/// Extract bits `[bit_start, bit_end)` of a little-endian byte string
fn extract_window_bits(repr: &[u8], bit_start: usize, bit_end: usize) -> usize {
    let mut result = 0usize;
    for bit_idx in bit_start..bit_end {
        let byte_idx = bit_idx / 8;
        if byte_idx < repr.len() {
            let bit = (repr[byte_idx] >> (bit_idx % 8)) & 1;
            result |= (bit as usize) << (bit_idx - bit_start);
        }
    }
    result
}

/// Determine window size based on input size
fn optimal_window_size(n: usize) -> usize {
    if n <= 128 {
        4
    } else if n <= 512 {
        5
    } else if n <= 2048 {
        6
    } else if n <= 8192 {
        7
    } else {
        8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GroupProjective, Scalar};
    use ff::Field;
    use rand::thread_rng;

    fn random_inputs(n: usize) -> (Vec<Scalar>, Vec<GroupProjective>) {
        let mut rng = thread_rng();
        let scalars = (0..n).map(|_| Scalar::random(&mut rng)).collect();
        let bases = (0..n).map(|_| GroupProjective::random(&mut rng)).collect();
        (scalars, bases)
    }

    #[test]
    fn test_msm_simple() {
        let (scalars, bases) = random_inputs(10);
        let result = msm(&scalars, &bases).unwrap();
        assert_eq!(result, simple_msm(&scalars, &bases));
    }

    #[test]
    fn test_pippenger_matches_naive() {
        let (scalars, bases) = random_inputs(200);
        assert_eq!(pippenger_msm(&scalars, &bases), simple_msm(&scalars, &bases));
    }

    #[test]
    fn test_pippenger_small_scalars() {
        let scalars: Vec<Scalar> = (0..40u64).map(Scalar::from).collect();
        let base = GroupProjective::generator();
        let bases = vec![base; 40];
        // 0 + 1 + ... + 39
        let expected = base * Scalar::from(780u64);
        assert_eq!(msm(&scalars, &bases).unwrap(), expected);
    }

    #[test]
    fn test_msm_empty() {
        let result = msm::<GroupProjective>(&[], &[]).unwrap();
        assert_eq!(result, GroupProjective::identity());
    }

    #[test]
    fn test_msm_single() {
        let (scalars, bases) = random_inputs(1);
        let result = msm(&scalars, &bases).unwrap();
        assert_eq!(result, bases[0] * scalars[0]);
    }

    #[test]
    fn test_msm_length_mismatch() {
        let scalars = vec![Scalar::ONE];
        let bases: Vec<GroupProjective> = vec![];
        assert!(matches!(msm(&scalars, &bases), Err(CommitmentError::MsmError(_))));
    }

    #[test]
    fn test_extract_window_bits() {
        let repr = Scalar::from(0b1101_0110u64).to_repr();

        assert_eq!(extract_window_bits(repr.as_ref(), 0, 4), 6);
        assert_eq!(extract_window_bits(repr.as_ref(), 4, 8), 13);
    }
}
