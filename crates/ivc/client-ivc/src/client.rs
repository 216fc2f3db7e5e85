//! The IVC orchestrator.
//!
//! ```text
//! Empty --accumulate--> Accumulating --accumulate--> Accumulating
//!                             |
//!                          finalize --> Finalized
//!
//! any failed step --> Aborted
//! ```
//!
//! Each step extends the operation log, proves the merge, then lifts (first
//! step) or folds (later steps) the instance with the merged log commitment
//! bound in. The merge runs on a fork of the step transcript, so the fold can
//! be replayed without it. The step is verified natively before the new state
//! is committed.

use crate::config::IvcConfig;
use crate::decider::{num_rounds, DeciderProof};
use crate::folding::{verify_fold, FoldingParameters, FoldingProof, FoldingScheme};
use crate::merge::{verify_merge, MergeProof};
use crate::oink::{prove_initial, verify_initial};
use crate::oplog::OpLog;
use commitments::{Transcript, TranscriptWrite};
use ff::Field;
use ivc_core::{
    Accumulator, CommittedInstance, FoldingError, FoldingResult, Instance, LogCommitment,
    PrimeGroup, RelaxedCommitment, VerificationError, VerificationKey, ROWS_PER_OP,
};
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Nothing accumulated yet
    Empty,
    /// At least one instance accumulated
    Accumulating,
    /// Sealed by [`ClientIvc::finalize`]
    Finalized,
    /// A step failed; the chain accepts no further calls
    Aborted,
}

/// Merge and fold proofs of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepProof<G: PrimeGroup> {
    /// Proof that the log was extended by the instance's operations
    pub merge: MergeProof<G>,
    /// Folding (or initial) proof with the merged log bound in
    pub fold: FoldingProof<G>,
}

/// Everything needed to check one step from the verifier's side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord<G: PrimeGroup> {
    /// Accumulator before the step, `None` for the first step
    pub previous: Option<RelaxedCommitment<G>>,
    /// The incoming instance
    pub instance: CommittedInstance<G>,
    /// Accumulator after the step
    pub accumulator: RelaxedCommitment<G>,
    /// The step's proofs
    pub proof: StepProof<G>,
}

/// The constant-size proof of a whole chain.
///
/// Carries the last fold but not its merge proof: the merges were checked
/// natively step by step, and the final log commitment travels in the
/// accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalProof<G: PrimeGroup> {
    /// Accumulator before the last step, `None` for a one-step chain
    pub previous: Option<RelaxedCommitment<G>>,
    /// The last incoming instance
    pub instance: CommittedInstance<G>,
    /// The final accumulator, including the final operation log commitment
    pub accumulator: RelaxedCommitment<G>,
    /// Folding (or initial) proof of the last step
    pub fold: FoldingProof<G>,
    /// Proof that the final accumulator is satisfied
    pub decider: DeciderProof<G>,
}

impl<G: PrimeGroup> FinalProof<G> {
    /// The final accumulator, including the final operation log commitment
    pub fn accumulator(&self) -> &RelaxedCommitment<G> {
        &self.accumulator
    }
}

fn step_transcript<G: PrimeGroup>(
    vk: &VerificationKey<G>,
    previous: Option<&RelaxedCommitment<G>>,
) -> Transcript {
    let mut transcript = Transcript::new(b"client-ivc-step");
    transcript.append_scalar(b"vk-digest", &vk.digest);
    match previous {
        Some(accumulator) => {
            transcript.append_u64(b"step", accumulator.step);
            transcript.append_scalar(b"previous-digest", &accumulator.digest);
        }
        None => {
            transcript.append_u64(b"step", 0);
            transcript.append_scalar(b"previous-digest", &G::Scalar::ZERO);
        }
    }
    transcript
}

fn decider_transcript() -> Transcript {
    Transcript::new(b"client-ivc-decider")
}

/// Checks one step: the merge, the binding of its log commitment into the
/// fold, and the lift or fold itself.
pub fn verify_step<G: PrimeGroup>(vk: &VerificationKey<G>, record: &StepRecord<G>) -> FoldingResult<()> {
    let previous_log = record
        .previous
        .as_ref()
        .map(|accumulator| accumulator.log)
        .unwrap_or_default();
    let subtable = LogCommitment {
        columns: record.instance.witness_commitments.ops,
        rows: record.instance.num_rows(),
    };
    let merged = record.proof.merge.merged_log(&previous_log, &subtable);

    let mut transcript = step_transcript(vk, record.previous.as_ref());
    verify_merge(
        &vk.ck,
        &mut transcript.fork(b"step-merge"),
        &previous_log,
        &subtable,
        &merged,
        &record.proof.merge,
    )?;

    if record.proof.fold.log_commitment != merged {
        return Err(FoldingError::log_inconsistency(
            "log commitment bound into the fold differs from the merge result",
        ));
    }

    verify_transition(
        vk,
        &mut transcript,
        record.previous.as_ref(),
        &record.instance,
        &record.accumulator,
        &record.proof.fold,
    )
}

/// The lift or fold half of a step
fn verify_transition<G: PrimeGroup>(
    vk: &VerificationKey<G>,
    transcript: &mut Transcript,
    previous: Option<&RelaxedCommitment<G>>,
    instance: &CommittedInstance<G>,
    accumulator: &RelaxedCommitment<G>,
    fold: &FoldingProof<G>,
) -> FoldingResult<()> {
    match previous {
        None => verify_initial(vk, transcript, instance, accumulator, fold),
        Some(previous) => verify_fold(vk, transcript, previous, instance, accumulator, fold),
    }
}

/// A client-side IVC chain
#[derive(Debug, Clone)]
pub struct ClientIvc<G: PrimeGroup> {
    config: IvcConfig,
    state: ChainState,
    vk: Option<VerificationKey<G>>,
    accumulator: Option<Accumulator<G>>,
    log: OpLog<G>,
    last_step: Option<StepRecord<G>>,
}

impl<G: PrimeGroup> Default for ClientIvc<G> {
    fn default() -> Self {
        Self::new(IvcConfig::default())
    }
}

impl<G: PrimeGroup> ClientIvc<G> {
    /// An empty chain
    pub fn new(config: IvcConfig) -> Self {
        Self {
            config,
            state: ChainState::Empty,
            vk: None,
            accumulator: None,
            log: OpLog::new(),
            last_step: None,
        }
    }

    /// Current state
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Chain configuration
    pub fn config(&self) -> &IvcConfig {
        &self.config
    }

    /// Number of instances accumulated so far
    pub fn num_steps(&self) -> u64 {
        self.accumulator
            .as_ref()
            .map(|accumulator| accumulator.instance.step)
            .unwrap_or(0)
    }

    /// The running accumulator
    pub fn accumulator(&self) -> Option<&Accumulator<G>> {
        self.accumulator.as_ref()
    }

    /// The current operation log
    pub fn op_log(&self) -> &OpLog<G> {
        &self.log
    }

    /// Record of the most recent step
    pub fn last_step(&self) -> Option<&StepRecord<G>> {
        self.last_step.as_ref()
    }

    /// Accumulates one instance.
    ///
    /// The first call lifts the instance, later calls fold it into the running
    /// accumulator. Sequencing errors, including an operation log that would
    /// outgrow the commitment key, leave the chain as it was. Any failure after
    /// those checks aborts the chain.
    #[instrument(skip_all, fields(step = self.num_steps() + 1))]
    pub fn accumulate(&mut self, instance: &Instance<G>, vk: &VerificationKey<G>) -> FoldingResult<()> {
        match self.state {
            ChainState::Empty | ChainState::Accumulating => {}
            ChainState::Finalized => {
                return Err(FoldingError::sequencing_error(
                    "accumulate called on a finalized chain",
                ))
            }
            ChainState::Aborted => {
                return Err(FoldingError::sequencing_error(
                    "accumulate called on an aborted chain",
                ))
            }
        }
        if let Some(max_steps) = self.config.max_steps {
            if self.num_steps() >= max_steps {
                return Err(FoldingError::sequencing_error(format!(
                    "chain already holds the maximum of {} steps",
                    max_steps
                )));
            }
        }
        self.check_log_capacity(instance.ec_operations.len(), vk.ck.len())?;

        match self.step(instance, vk) {
            Ok((accumulator, log, record)) => {
                info!(
                    step = accumulator.instance.step,
                    log_rows = log.commitment().rows,
                    "instance accumulated"
                );
                if self.vk.is_none() {
                    self.vk = Some(vk.clone());
                }
                self.accumulator = Some(accumulator);
                self.log = log;
                self.last_step = Some(record);
                self.state = ChainState::Accumulating;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "step failed, aborting chain");
                self.state = ChainState::Aborted;
                Err(err)
            }
        }
    }

    /// The padded log must still fit the commitment key after appending `num_ops`
    fn check_log_capacity(&self, num_ops: usize, key_len: usize) -> FoldingResult<()> {
        let padded = (num_ops as u64)
            .checked_mul(ROWS_PER_OP as u64)
            .and_then(|appended| appended.checked_add(self.log.commitment().rows))
            .and_then(|rows| rows.max(1).checked_next_power_of_two());
        match padded {
            Some(padded) if padded <= key_len as u64 => Ok(()),
            _ => Err(FoldingError::sequencing_error(format!(
                "operation log would outgrow the commitment key of {} generators",
                key_len
            ))),
        }
    }

    fn step(
        &self,
        instance: &Instance<G>,
        vk: &VerificationKey<G>,
    ) -> FoldingResult<(Accumulator<G>, OpLog<G>, StepRecord<G>)> {
        vk.check()?;
        if let Some(chain_vk) = &self.vk {
            if chain_vk.digest != vk.digest {
                return Err(FoldingError::shape_mismatch(
                    "verification key differs from the one the chain started with",
                ));
            }
        }
        vk.check_instance(instance)?;

        let previous = self.accumulator.as_ref().map(|accumulator| accumulator.instance.clone());
        let mut transcript = step_transcript(vk, previous.as_ref());

        let (log, merge) = self.log.extend(
            &vk.ck,
            &mut transcript.fork(b"step-merge"),
            &instance.ec_operations,
            &instance.witness_commitments.ops,
        )?;
        let log_commitment = *log.commitment();

        let (accumulator, fold) = match &self.accumulator {
            None => prove_initial(vk, &mut transcript, instance, &log_commitment)?,
            Some(accumulator) => {
                let scheme = FoldingScheme::new(
                    vk.clone(),
                    FoldingParameters {
                        enable_parallel: self.config.enable_parallel,
                    },
                );
                scheme.fold(&mut transcript, accumulator, instance, &log_commitment)?
            }
        };

        let record = StepRecord {
            previous,
            instance: instance.committed(),
            accumulator: accumulator.instance.clone(),
            proof: StepProof { merge, fold },
        };
        verify_step(vk, &record)?;
        debug!("step verified natively");

        Ok((accumulator, log, record))
    }

    /// Seals the chain and proves the final accumulator.
    #[instrument(skip_all, fields(steps = self.num_steps()))]
    pub fn finalize(&mut self) -> FoldingResult<(FinalProof<G>, VerificationKey<G>)> {
        let (accumulator, vk, last_step) = match (
            self.state,
            &self.accumulator,
            &self.vk,
            &self.last_step,
        ) {
            (ChainState::Accumulating, Some(accumulator), Some(vk), Some(last_step)) => {
                (accumulator, vk, last_step)
            }
            (ChainState::Empty, ..) => {
                return Err(FoldingError::sequencing_error(
                    "finalize called before any accumulate",
                ))
            }
            (ChainState::Finalized, ..) => {
                return Err(FoldingError::sequencing_error("chain is already finalized"))
            }
            (ChainState::Aborted, ..) => {
                return Err(FoldingError::sequencing_error(
                    "finalize called on an aborted chain",
                ))
            }
            (ChainState::Accumulating, ..) => {
                return Err(FoldingError::sequencing_error(
                    "accumulating chain has no accumulator",
                ))
            }
        };

        let mut transcript = decider_transcript();
        match DeciderProof::prove(vk, &mut transcript, accumulator) {
            Ok(decider) => {
                let proof = FinalProof {
                    previous: last_step.previous.clone(),
                    instance: last_step.instance.clone(),
                    accumulator: last_step.accumulator.clone(),
                    fold: last_step.proof.fold.clone(),
                    decider,
                };
                let vk = vk.clone();
                self.state = ChainState::Finalized;
                info!(steps = proof.accumulator().step, "chain finalized");
                Ok((proof, vk))
            }
            Err(err) => {
                warn!(error = %err, "decider failed, aborting chain");
                self.state = ChainState::Aborted;
                Err(err)
            }
        }
    }

    /// Verifies a final proof.
    ///
    /// Returns `Ok(false)` for a well-formed proof that does not verify and an
    /// error when the proof or key cannot be used at all.
    #[instrument(skip_all)]
    pub fn verify(proof: &FinalProof<G>, vk: &VerificationKey<G>) -> Result<bool, VerificationError> {
        vk.check()
            .map_err(|err| VerificationError::key_mismatch(err.to_string()))?;
        check_structure(proof, vk)?;

        let mut transcript = step_transcript(vk, proof.previous.as_ref());
        if let Err(err) = verify_transition(
            vk,
            &mut transcript,
            proof.previous.as_ref(),
            &proof.instance,
            &proof.accumulator,
            &proof.fold,
        ) {
            debug!(error = %err, "last fold rejected");
            return Ok(false);
        }

        let mut transcript = decider_transcript();
        match proof
            .decider
            .verify(vk, &mut transcript, proof.accumulator())
        {
            Ok(()) => Ok(true),
            Err(err) => {
                debug!(error = %err, "decider rejected");
                Ok(false)
            }
        }
    }
}

/// Rejects proofs whose dimensions cannot belong to `vk`
fn check_structure<G: PrimeGroup>(proof: &FinalProof<G>, vk: &VerificationKey<G>) -> Result<(), VerificationError> {
    let shape = &vk.shape;
    let public_counts = [
        proof.instance.public_inputs.len(),
        proof.accumulator.public_inputs.len(),
    ];
    if public_counts.iter().any(|count| *count != shape.num_public)
        || proof
            .previous
            .as_ref()
            .map_or(false, |previous| previous.public_inputs.len() != shape.num_public)
    {
        return Err(VerificationError::malformed_proof(
            "public input count differs from the verification key",
        ));
    }

    let decider = &proof.decider;
    let m = shape.num_constraints();
    if decider.sumcheck.rounds.len() != num_rounds(m) {
        return Err(VerificationError::malformed_proof(format!(
            "decider sumcheck has {} rounds, expected {}",
            decider.sumcheck.rounds.len(),
            num_rounds(m)
        )));
    }
    let witness_rounds = shape.num_witness.next_power_of_two().trailing_zeros() as usize;
    if decider.witness_opening.rounds() != witness_rounds
        || decider.witness_opening.r_vec.len() != witness_rounds
    {
        return Err(VerificationError::malformed_proof(
            "witness opening has the wrong number of rounds",
        ));
    }
    if decider.error_opening.rounds() != num_rounds(m) || decider.error_opening.r_vec.len() != num_rounds(m) {
        return Err(VerificationError::malformed_proof(
            "error opening has the wrong number of rounds",
        ));
    }
    Ok(())
}
