//! The persistent operation log.
//!
//! An [`OpLog`] is an immutable value. Extending it returns a new log that
//! shares every existing segment with its predecessor, so a chain can hold on
//! to older versions without copying or aliasing mutable state.

use crate::merge::MergeProof;
use commitments::{CommitmentKey, TranscriptRead};
use ivc_core::{
    EcOp, FoldingError, FoldingResult, LogCommitment, OpTable, PrimeGroup, ScalarOf, NUM_COLUMNS,
};
use std::sync::Arc;
use tracing::debug;

/// The operations one instance appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSegment<G: PrimeGroup> {
    /// First row the segment occupies
    pub start_row: u64,
    /// Operations in execution order
    pub ops: Vec<EcOp<G>>,
}

/// Append-only log of every operation issued so far
#[derive(Debug, Clone)]
pub struct OpLog<G: PrimeGroup> {
    segments: Vec<Arc<LogSegment<G>>>,
    table: Arc<OpTable<ScalarOf<G>>>,
    commitment: LogCommitment<G>,
    accumulator: G,
    version: u64,
}

impl<G: PrimeGroup> Default for OpLog<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: PrimeGroup> OpLog<G> {
    /// The empty log
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            table: Arc::new(OpTable::default()),
            commitment: LogCommitment::empty(),
            accumulator: G::identity(),
            version: 0,
        }
    }

    /// Commitment to the full table
    pub fn commitment(&self) -> &LogCommitment<G> {
        &self.commitment
    }

    /// The full table
    pub fn table(&self) -> &OpTable<ScalarOf<G>> {
        &self.table
    }

    /// Number of extensions applied since the empty log
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Running point accumulator after replaying every operation
    pub fn accumulator(&self) -> G {
        self.accumulator
    }

    /// Appended segments, oldest first
    pub fn segments(&self) -> &[Arc<LogSegment<G>>] {
        &self.segments
    }

    /// Every operation in the log, in execution order
    pub fn ops(&self) -> impl Iterator<Item = &EcOp<G>> {
        self.segments.iter().flat_map(|segment| segment.ops.iter())
    }

    /// Appends `ops`, returning the new log and the proof that its commitment
    /// is the append of `subtable_commitments` to this log's.
    ///
    /// Fails with [`FoldingError::LogInconsistency`] when an equality assertion
    /// fails on replay or when the commitments do not open to `ops`.
    pub fn extend<T: TranscriptRead>(
        &self,
        ck: &CommitmentKey<G>,
        transcript: &mut T,
        ops: &[EcOp<G>],
        subtable_commitments: &[G; NUM_COLUMNS],
    ) -> FoldingResult<(Self, MergeProof<G>)> {
        let accumulator = ops
            .iter()
            .try_fold(self.accumulator, |acc, op| op.apply(acc))?;

        let subtable = OpTable::from_ops(ops)?;
        if subtable.commit(ck)? != *subtable_commitments {
            return Err(FoldingError::log_inconsistency(
                "operation commitments do not open to the issued operations",
            ));
        }

        let (merged, proof) = MergeProof::prove(
            ck,
            transcript,
            &self.table,
            &self.commitment,
            &subtable,
            subtable_commitments,
        )?;

        let mut segments = self.segments.clone();
        segments.push(Arc::new(LogSegment {
            start_row: self.commitment.rows,
            ops: ops.to_vec(),
        }));
        let commitment = LogCommitment {
            columns: proof.merged_commitments,
            rows: merged.num_rows() as u64,
        };

        debug!(
            version = self.version + 1,
            rows = commitment.rows,
            "operation log extended"
        );

        Ok((
            Self {
                segments,
                table: Arc::new(merged),
                commitment,
                accumulator,
                version: self.version + 1,
            },
            proof,
        ))
    }
}
