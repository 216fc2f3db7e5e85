//! Error types for client-side folding.
//!
//! Every [`FoldingError`] is fatal to the chain that produced it: the engine
//! never retries a step, and resuming means starting a new chain.

use commitments::CommitmentError;
use thiserror::Error;

/// Errors raised while accumulating, folding or deciding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoldingError {
    /// Instance shape incompatible with the chain's verification key
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A merge proof does not justify the claimed operation log commitment
    #[error("Log inconsistency: {0}")]
    LogInconsistency(String),

    /// A recomputed Fiat-Shamir challenge differs from the one in a proof
    #[error("Challenge mismatch: {0}")]
    ChallengeMismatch(String),

    /// The final accumulator does not satisfy the relaxed relation
    #[error("Relation violation: {0}")]
    RelationViolation(String),

    /// API called out of state-machine order
    #[error("Sequencing error: {0}")]
    SequencingError(String),

    /// A claimed accumulator is not the fold of its inputs
    #[error("Accumulator mismatch: {0}")]
    AccumulatorMismatch(String),

    /// Instance data is structurally malformed
    #[error("Invalid instance: {0}")]
    InvalidInstance(String),

    /// Canonical encoding could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error surfaced by the commitment layer
    #[error("Commitment error: {0}")]
    Commitment(#[from] CommitmentError),
}

impl FoldingError {
    /// Creates a shape mismatch error
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Creates a log inconsistency error
    pub fn log_inconsistency(msg: impl Into<String>) -> Self {
        Self::LogInconsistency(msg.into())
    }

    /// Creates a challenge mismatch error
    pub fn challenge_mismatch(msg: impl Into<String>) -> Self {
        Self::ChallengeMismatch(msg.into())
    }

    /// Creates a relation violation error
    pub fn relation_violation(msg: impl Into<String>) -> Self {
        Self::RelationViolation(msg.into())
    }

    /// Creates a sequencing error
    pub fn sequencing_error(msg: impl Into<String>) -> Self {
        Self::SequencingError(msg.into())
    }

    /// Creates an accumulator mismatch error
    pub fn accumulator_mismatch(msg: impl Into<String>) -> Self {
        Self::AccumulatorMismatch(msg.into())
    }

    /// Creates an invalid instance error
    pub fn invalid_instance(msg: impl Into<String>) -> Self {
        Self::InvalidInstance(msg.into())
    }

    /// Creates a serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

/// Result type alias for folding operations
pub type FoldingResult<T> = Result<T, FoldingError>;

/// Errors returned by the standalone proof verifier.
///
/// A proof that is well formed but wrong is not an error; the verifier
/// reports it as `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The proof is structurally unusable for this key
    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    /// The verification key is internally inconsistent
    #[error("Verification key mismatch: {0}")]
    KeyMismatch(String),
}

impl VerificationError {
    /// Creates a malformed proof error
    pub fn malformed_proof(msg: impl Into<String>) -> Self {
        Self::MalformedProof(msg.into())
    }

    /// Creates a key mismatch error
    pub fn key_mismatch(msg: impl Into<String>) -> Self {
        Self::KeyMismatch(msg.into())
    }
}
