//! # Commitments for client-side folding
//!
//! Pedersen vector commitments over any prime-order group together with the
//! opening machinery the folding engine needs:
//!
//! - [`CommitmentKey`]: deterministic, label-derived generator sets
//! - [`msm`]: multi-scalar multiplication (Pippenger for large inputs)
//! - [`ipa`]: inner product arguments for opening committed vectors against
//!   public evaluation vectors
//! - [`transcript`]: Fiat-Shamir transcript utilities over Merlin
//!
//! Everything is generic over `G: group::Group + group::GroupEncoding`. The
//! BLS12-381 G1 aliases below are the default instantiation.

pub mod errors;
pub mod ipa;
pub mod key;
pub mod msm;
pub mod transcript;

// Re-export key types
pub use errors::{CommitmentError, Result};
pub use ipa::{evaluate, inner_product, powers, IpaProof};
pub use key::CommitmentKey;
pub use msm::msm;
pub use transcript::{Transcript, TranscriptRead, TranscriptWrite};

/// BLS12-381 scalar field
pub type Scalar = bls12_381::Scalar;

/// BLS12-381 projective group element used for commitments
pub type GroupProjective = bls12_381::G1Projective;
