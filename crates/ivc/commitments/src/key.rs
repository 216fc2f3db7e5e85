//! Pedersen commitment keys
//!
//! Generators are derived from a public label, so any party can rebuild the
//! same key without a trusted setup. Derivation is prefix-stable: a key of
//! size `n` is the first `n` generators of every larger key with the same
//! label.

use crate::msm::msm;
use crate::transcript::{TranscriptRead, TranscriptWrite};
use crate::{CommitmentError, Result};
use group::{Group, GroupEncoding};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use rayon::prelude::*;

/// Stream index reserved for the inner product base `U`.
const INNER_PRODUCT_BASE_STREAM: u64 = u64::MAX;

/// Generators for Pedersen vector commitments plus the auxiliary base used
/// by inner product arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentKey<G: Group> {
    label: Vec<u8>,
    generators: Vec<G>,
    inner_product_base: G,
}

impl<G: Group + GroupEncoding> CommitmentKey<G> {
    /// Derive `size` generators from `label`.
    pub fn setup(label: &[u8], size: usize) -> Self {
        let seed = derive_seed(label);

        let generators = (0..size)
            .into_par_iter()
            .map(|index| derive_generator::<G>(seed, index as u64))
            .collect();

        Self {
            label: label.to_vec(),
            generators,
            inner_product_base: derive_generator(seed, INNER_PRODUCT_BASE_STREAM),
        }
    }

    /// Number of generators
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Whether the key has no generators
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Label the key was derived from
    pub fn label(&self) -> &[u8] {
        &self.label
    }

    /// All generators
    pub fn generators(&self) -> &[G] {
        &self.generators
    }

    /// The base `U` that inner product arguments bind the claimed value to
    pub fn inner_product_base(&self) -> G {
        self.inner_product_base
    }

    /// Fails with [`CommitmentError::KeyTooShort`] unless the key holds at
    /// least `needed` generators.
    pub fn ensure_len(&self, needed: usize) -> Result<()> {
        if needed > self.generators.len() {
            return Err(CommitmentError::KeyTooShort {
                needed,
                available: self.generators.len(),
            });
        }
        Ok(())
    }

    /// Commit to a vector: `sum_i(values[i] * G_i)`
    pub fn commit(&self, values: &[G::Scalar]) -> Result<G> {
        self.ensure_len(values.len())?;
        msm(values, &self.generators[..values.len()])
    }

    /// Bind the key's identity into a transcript.
    pub fn absorb_into<T: TranscriptWrite>(&self, transcript: &mut T) {
        transcript.append_message(b"ck-label", &self.label);
        transcript.append_u64(b"ck-size", self.generators.len() as u64);
        transcript.append_point(b"ck-inner-product-base", &self.inner_product_base);
    }
}

fn derive_seed(label: &[u8]) -> [u8; 32] {
    let mut transcript = crate::Transcript::new(b"pedersen-commitment-key");
    transcript.append_message(b"label", label);
    let mut seed = [0u8; 32];
    transcript.challenge_bytes(b"seed", &mut seed);
    seed
}

fn derive_generator<G: Group>(seed: [u8; 32], index: u64) -> G {
    let mut rng = ChaCha20Rng::from_seed(seed);
    rng.set_stream(index);
    G::random(&mut rng)
}
