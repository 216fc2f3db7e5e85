//! Canonical encodings of the engine's proof objects.
//!
//! Layouts follow [`ivc_core::wire`]: little-endian integers, canonical field
//! and point encodings, `u32` length prefixes for vectors.

use crate::client::{FinalProof, StepProof, StepRecord};
use crate::decider::DeciderProof;
use crate::folding::FoldingProof;
use crate::merge::MergeProof;
use crate::sumcheck::SumcheckProof;
use commitments::IpaProof;
use ff::PrimeField;
use ivc_core::wire::{
    read_len, read_point, read_point_columns, read_scalar, read_scalar_array, read_u64,
    write_len, write_point, write_scalar, write_u64,
};
use ivc_core::{
    CommittedInstance, Decode, Encode, FoldingError, FoldingResult, LogCommitment, PrimeGroup,
    RelaxedCommitment,
};

impl<F: PrimeField> Encode for SumcheckProof<F> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_len(out, self.rounds.len());
        for round in &self.rounds {
            for eval in round {
                write_scalar(out, eval);
            }
        }
    }
}

impl<F: PrimeField> Decode for SumcheckProof<F> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        let round_size = 4 * F::Repr::default().as_ref().len();
        let len = read_len(input, round_size)?;
        let rounds = (0..len)
            .map(|_| read_scalar_array(input))
            .collect::<FoldingResult<Vec<_>>>()?;
        Ok(Self { rounds })
    }
}

impl<G: PrimeGroup> Encode for MergeProof<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u64(out, self.shift_size);
        for commitment in &self.merged_commitments {
            write_point(out, commitment);
        }
        write_point(out, &self.degree_check_commitment);
        write_point(out, &self.merged_degree_check_commitment);
        for evals in [&self.left_evals, &self.right_evals, &self.merged_evals] {
            for eval in evals {
                write_scalar(out, eval);
            }
        }
        write_scalar(out, &self.degree_check_eval);
        write_scalar(out, &self.merged_degree_check_eval);
        self.batched_opening.encode(out);
        self.degree_check_opening.encode(out);
        self.merged_degree_check_opening.encode(out);
    }
}

impl<G: PrimeGroup> Decode for MergeProof<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            shift_size: read_u64(input)?,
            merged_commitments: read_point_columns(input)?,
            degree_check_commitment: read_point(input)?,
            merged_degree_check_commitment: read_point(input)?,
            left_evals: read_scalar_array(input)?,
            right_evals: read_scalar_array(input)?,
            merged_evals: read_scalar_array(input)?,
            degree_check_eval: read_scalar(input)?,
            merged_degree_check_eval: read_scalar(input)?,
            batched_opening: IpaProof::decode(input)?,
            degree_check_opening: IpaProof::decode(input)?,
            merged_degree_check_opening: IpaProof::decode(input)?,
        })
    }
}

impl<G: PrimeGroup> Encode for FoldingProof<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_point(out, &self.cross_term_commitment);
        write_scalar(out, &self.challenge);
        self.log_commitment.encode(out);
    }
}

impl<G: PrimeGroup> Decode for FoldingProof<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            cross_term_commitment: read_point(input)?,
            challenge: read_scalar(input)?,
            log_commitment: LogCommitment::decode(input)?,
        })
    }
}

impl<G: PrimeGroup> Encode for DeciderProof<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        self.sumcheck.encode(out);
        for eval in [&self.eval_a, &self.eval_b, &self.eval_c, &self.eval_e] {
            write_scalar(out, eval);
        }
        self.witness_opening.encode(out);
        self.error_opening.encode(out);
    }
}

impl<G: PrimeGroup> Decode for DeciderProof<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            sumcheck: SumcheckProof::decode(input)?,
            eval_a: read_scalar(input)?,
            eval_b: read_scalar(input)?,
            eval_c: read_scalar(input)?,
            eval_e: read_scalar(input)?,
            witness_opening: IpaProof::decode(input)?,
            error_opening: IpaProof::decode(input)?,
        })
    }
}

impl<G: PrimeGroup> Encode for StepProof<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        self.merge.encode(out);
        self.fold.encode(out);
    }
}

impl<G: PrimeGroup> Decode for StepProof<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            merge: MergeProof::decode(input)?,
            fold: FoldingProof::decode(input)?,
        })
    }
}

/// Flag byte `0` for the first step, `1` followed by the accumulator otherwise
fn write_previous<G: PrimeGroup>(out: &mut Vec<u8>, previous: Option<&RelaxedCommitment<G>>) {
    match previous {
        Some(previous) => {
            out.push(1);
            previous.encode(out);
        }
        None => out.push(0),
    }
}

fn read_previous<G: PrimeGroup>(input: &mut &[u8]) -> FoldingResult<Option<RelaxedCommitment<G>>> {
    let (flag, rest) = input
        .split_first()
        .ok_or_else(|| FoldingError::serialization_error("truncated input: missing step flag"))?;
    *input = rest;
    match *flag {
        0 => Ok(None),
        1 => Ok(Some(RelaxedCommitment::decode(input)?)),
        other => Err(FoldingError::serialization_error(format!(
            "invalid step flag {}",
            other
        ))),
    }
}

impl<G: PrimeGroup> Encode for StepRecord<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_previous(out, self.previous.as_ref());
        self.instance.encode(out);
        self.accumulator.encode(out);
        self.proof.encode(out);
    }
}

impl<G: PrimeGroup> Decode for StepRecord<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            previous: read_previous(input)?,
            instance: CommittedInstance::decode(input)?,
            accumulator: RelaxedCommitment::decode(input)?,
            proof: StepProof::decode(input)?,
        })
    }
}

impl<G: PrimeGroup> Encode for FinalProof<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_previous(out, self.previous.as_ref());
        self.instance.encode(out);
        self.accumulator.encode(out);
        self.fold.encode(out);
        self.decider.encode(out);
    }
}

impl<G: PrimeGroup> Decode for FinalProof<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            previous: read_previous(input)?,
            instance: CommittedInstance::decode(input)?,
            accumulator: RelaxedCommitment::decode(input)?,
            fold: FoldingProof::decode(input)?,
            decider: DeciderProof::decode(input)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;
    use ivc_core::{DefaultGroup, DefaultScalar as Fr};

    #[test]
    fn test_sumcheck_round_trip() {
        let proof = SumcheckProof {
            rounds: vec![[Fr::ONE, Fr::from(2u64), Fr::from(3u64), Fr::from(4u64)]; 3],
        };
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), 4 + 3 * 4 * 32);
        assert_eq!(SumcheckProof::from_bytes(&bytes).unwrap(), proof);
    }

    #[test]
    fn test_folding_proof_round_trip() {
        let proof = FoldingProof {
            cross_term_commitment: DefaultGroup::generator(),
            challenge: Fr::from(9u64),
            log_commitment: LogCommitment::<DefaultGroup>::empty(),
        };
        assert_eq!(FoldingProof::from_bytes(&proof.to_bytes()).unwrap(), proof);
    }

    #[test]
    fn test_sumcheck_rejects_oversized_length() {
        let mut bytes = Vec::new();
        write_len(&mut bytes, 1000);
        assert!(matches!(
            SumcheckProof::<Fr>::from_bytes(&bytes),
            Err(FoldingError::Serialization(_))
        ));
    }

    #[test]
    fn test_step_record_rejects_bad_flag() {
        assert!(matches!(
            StepRecord::<DefaultGroup>::from_bytes(&[7u8]),
            Err(FoldingError::Serialization(_))
        ));
        assert!(StepRecord::<DefaultGroup>::from_bytes(&[]).is_err());
        assert!(matches!(
            FinalProof::<DefaultGroup>::from_bytes(&[2u8]),
            Err(FoldingError::Serialization(_))
        ));
    }
}
