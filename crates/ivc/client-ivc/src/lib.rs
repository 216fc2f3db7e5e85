//! # Client IVC: incrementally verifiable computation by folding
//!
//! A chain ingests one R1CS instance at a time. Every step
//!
//! 1. appends the instance's elliptic-curve operations to the operation log
//!    and proves the append ([`merge`]),
//! 2. lifts the first instance into a relaxed accumulator ([`oink`]) or folds
//!    later ones into it ([`folding`]), binding the merged log commitment in,
//! 3. verifies itself natively before the new state replaces the old.
//!
//! Once the chain is finalized the [`decider`] proves that the final
//! accumulator satisfies the relaxed relation. The resulting [`FinalProof`]
//! has the same size however many steps were folded.
//!
//! ```no_run
//! use client_ivc::ClientIvc;
//! use ivc_core::shapes::{single_gate_assignment, StandardShape};
//! use ivc_core::{DefaultScalar, Instance};
//!
//! let vk = StandardShape::SingleGate.verification_key()?;
//! let mut ivc = ClientIvc::default();
//! for x in 1..=3u64 {
//!     let (witness, public) = single_gate_assignment(DefaultScalar::from(x), DefaultScalar::from(x + 1));
//!     let instance = Instance::new(vk.shape.clone(), public, witness, vec![], &vk.ck)?;
//!     ivc.accumulate(&instance, &vk)?;
//! }
//! let (proof, vk) = ivc.finalize()?;
//! assert_eq!(ClientIvc::verify(&proof, &vk), Ok(true));
//! # Ok::<(), ivc_core::FoldingError>(())
//! ```

pub mod client;
pub mod config;
pub mod decider;
pub mod folding;
pub mod merge;
pub mod oink;
pub mod oplog;
pub mod sumcheck;
pub mod wire;

pub use client::{verify_step, ChainState, ClientIvc, FinalProof, StepProof, StepRecord};
pub use config::IvcConfig;
pub use decider::DeciderProof;
pub use folding::{verify_fold, FoldingParameters, FoldingProof, FoldingScheme};
pub use merge::{verify_merge, MergeProof};
pub use oink::{prove_initial, verify_initial};
pub use oplog::{LogSegment, OpLog};
pub use sumcheck::SumcheckProof;
