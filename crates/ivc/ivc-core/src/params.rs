//! Process-wide commitment parameters.
//!
//! The default key is derived once on first use and shared read-only for the
//! rest of the process.

use crate::DefaultGroup;
use commitments::CommitmentKey;
use std::sync::{Arc, OnceLock};

/// Label the default commitment key is derived from
pub const DEFAULT_KEY_LABEL: &[u8] = b"client-ivc-pedersen-v1";

/// Generators in the default commitment key.
///
/// Bounds the padded witness length, the constraint count and the
/// operation log rows a chain may reach.
pub const DEFAULT_KEY_SIZE: usize = 1 << 10;

static DEFAULT_KEY: OnceLock<Arc<CommitmentKey<DefaultGroup>>> = OnceLock::new();

/// The shared default commitment key over BLS12-381 G1
pub fn default_commitment_key() -> Arc<CommitmentKey<DefaultGroup>> {
    DEFAULT_KEY
        .get_or_init(|| Arc::new(CommitmentKey::setup(DEFAULT_KEY_LABEL, DEFAULT_KEY_SIZE)))
        .clone()
}
