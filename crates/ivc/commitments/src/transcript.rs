//! Transcript utilities for the Fiat-Shamir transformation
//!
//! A thin wrapper around Merlin. Prover and verifier drive identical sequences
//! of `append_*` and `challenge_*` calls, so every challenge is recomputable
//! byte for byte from the absorbed messages.

use ff::PrimeField;
use group::GroupEncoding;
use merlin::Transcript as MerlinTranscript;

/// Trait for writing to a transcript
pub trait TranscriptWrite {
    /// Append a label and message to the transcript
    fn append_message(&mut self, label: &'static [u8], message: &[u8]);

    /// Append a 64-bit integer, little-endian
    fn append_u64(&mut self, label: &'static [u8], value: u64) {
        self.append_message(label, &value.to_le_bytes());
    }

    /// Append a scalar field element by its canonical representation
    fn append_scalar<F: PrimeField>(&mut self, label: &'static [u8], scalar: &F) {
        self.append_message(label, scalar.to_repr().as_ref());
    }

    /// Append a group element by its canonical encoding
    fn append_point<G: GroupEncoding>(&mut self, label: &'static [u8], point: &G) {
        self.append_message(label, point.to_bytes().as_ref());
    }

    /// Append multiple scalars to the transcript
    fn append_scalars<F: PrimeField>(&mut self, label: &'static [u8], scalars: &[F]) {
        // Add count first
        self.append_message(label, &(scalars.len() as u32).to_le_bytes());
        for scalar in scalars {
            self.append_scalar(b"scalar-item", scalar);
        }
    }

    /// Append multiple points to the transcript
    fn append_points<G: GroupEncoding>(&mut self, label: &'static [u8], points: &[G]) {
        self.append_message(label, &(points.len() as u32).to_le_bytes());
        for point in points {
            self.append_point(b"point-item", point);
        }
    }
}

/// Trait for reading from a transcript
pub trait TranscriptRead: TranscriptWrite {
    /// Squeeze raw challenge bytes
    fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8]);

    /// Challenge a scalar from the transcript
    ///
    /// 64 bytes are squeezed and reduced into the field, which keeps the bias
    /// negligible for any field of at most 256 bits.
    fn challenge_scalar<F: PrimeField>(&mut self, label: &'static [u8]) -> F {
        let mut buf = [0u8; 64];
        self.challenge_bytes(label, &mut buf);
        scalar_from_uniform_bytes(&buf)
    }

    /// Challenge multiple scalars from the transcript
    fn challenge_scalars<F: PrimeField>(&mut self, label: &'static [u8], count: usize) -> Vec<F> {
        let mut scalars = Vec::with_capacity(count);
        for i in 0..count {
            self.append_message(b"challenge-index", &(i as u32).to_le_bytes());
            scalars.push(self.challenge_scalar(label));
        }
        scalars
    }
}

/// Reduce 64 little-endian bytes into a field element.
pub fn scalar_from_uniform_bytes<F: PrimeField>(bytes: &[u8; 64]) -> F {
    // 2^64 in the field
    let radix = F::from(u64::MAX) + F::ONE;
    bytes.chunks_exact(8).rev().fold(F::ZERO, |acc, limb| {
        let mut word = [0u8; 8];
        word.copy_from_slice(limb);
        acc * radix + F::from(u64::from_le_bytes(word))
    })
}

/// Merlin-backed transcript
#[derive(Clone)]
pub struct Transcript {
    transcript: MerlinTranscript,
}

impl Transcript {
    /// Create a new transcript with the given domain label
    pub fn new(label: &'static [u8]) -> Self {
        Self {
            transcript: MerlinTranscript::new(label),
        }
    }

    /// Fork the transcript into an independent branch
    pub fn fork(&self, label: &'static [u8]) -> Self {
        let mut forked = self.clone();
        forked.transcript.append_message(b"fork", label);
        forked
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript").finish_non_exhaustive()
    }
}

impl TranscriptWrite for Transcript {
    fn append_message(&mut self, label: &'static [u8], message: &[u8]) {
        self.transcript.append_message(label, message);
    }
}

impl TranscriptRead for Transcript {
    fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8]) {
        self.transcript.challenge_bytes(label, dest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GroupProjective, Scalar};
    use ff::Field;
    use group::Group;
    use rand::thread_rng;

    #[test]
    fn test_transcript_deterministic() {
        let mut transcript1 = Transcript::new(b"test");
        let mut transcript2 = Transcript::new(b"test");

        let scalar = Scalar::random(&mut thread_rng());
        let point = GroupProjective::random(&mut thread_rng());

        transcript1.append_scalar(b"scalar", &scalar);
        transcript1.append_point(b"point", &point);
        transcript2.append_scalar(b"scalar", &scalar);
        transcript2.append_point(b"point", &point);

        let challenge1: Scalar = transcript1.challenge_scalar(b"challenge");
        let challenge2: Scalar = transcript2.challenge_scalar(b"challenge");

        assert_eq!(challenge1, challenge2);
    }

    #[test]
    fn test_transcript_different_inputs() {
        let mut transcript1 = Transcript::new(b"test");
        let mut transcript2 = Transcript::new(b"test");

        transcript1.append_u64(b"step", 1);
        transcript2.append_u64(b"step", 2);

        let challenge1: Scalar = transcript1.challenge_scalar(b"challenge");
        let challenge2: Scalar = transcript2.challenge_scalar(b"challenge");

        assert_ne!(challenge1, challenge2);
    }

    #[test]
    fn test_transcript_fork() {
        let mut base = Transcript::new(b"test");
        base.append_scalar(b"base", &Scalar::ONE);

        let mut fork1 = base.fork(b"fork1");
        let mut fork2 = base.fork(b"fork2");

        let challenge1: Scalar = fork1.challenge_scalar(b"challenge");
        let challenge2: Scalar = fork2.challenge_scalar(b"challenge");

        assert_ne!(challenge1, challenge2);
    }

    #[test]
    fn test_challenge_scalars_distinct() {
        let mut transcript = Transcript::new(b"test");
        let challenges: Vec<Scalar> = transcript.challenge_scalars(b"many", 4);
        assert_eq!(challenges.len(), 4);
        for i in 0..challenges.len() {
            for j in (i + 1)..challenges.len() {
                assert_ne!(challenges[i], challenges[j]);
            }
        }
    }

    #[test]
    fn test_uniform_reduction_small_values() {
        let mut bytes = [0u8; 64];
        bytes[0] = 7;
        assert_eq!(scalar_from_uniform_bytes::<Scalar>(&bytes), Scalar::from(7u64));

        // 1 in the second limb is 2^64
        let mut bytes = [0u8; 64];
        bytes[8] = 1;
        let two_pow_64 = Scalar::from(u64::MAX) + Scalar::ONE;
        assert_eq!(scalar_from_uniform_bytes::<Scalar>(&bytes), two_pow_64);
    }
}
