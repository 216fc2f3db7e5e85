//! Elliptic-curve operation records and their table encoding.
//!
//! Every operation occupies two rows of a four-column table over the scalar
//! field:
//!
//! ```text
//! row 0: [opcode, p0,   p1,    p2   ]
//! row 1: [0,      p3,   s_lo,  s_hi ]
//! ```
//!
//! `p0..p3` are 128-bit little-endian limbs of the point's canonical encoding
//! and `s_lo`, `s_hi` the halves of the scalar's canonical representation.
//! Opcodes pack the flags `add | mul | eq | reset` into four bits.

use crate::errors::{FoldingError, FoldingResult};
use crate::fields::{PrimeGroup, ScalarOf};
use commitments::CommitmentKey;
use ff::{Field, PrimeField};

/// Columns of the operation table
pub const NUM_COLUMNS: usize = 4;

/// Table rows contributed by each operation
pub const ROWS_PER_OP: usize = 2;

const LIMB_BYTES: usize = 16;
const POINT_LIMBS: usize = 4;

pub(crate) const OPCODE_ADD: u64 = 0b1000;
pub(crate) const OPCODE_MUL: u64 = 0b0100;
pub(crate) const OPCODE_EQ_AND_RESET: u64 = 0b0011;

/// One elliptic-curve operation issued by a step's circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcOp<G: PrimeGroup> {
    /// `acc += P`
    Add(G),
    /// `acc += s·P`
    Mul(G, G::Scalar),
    /// assert `acc == P`, then `acc = 0`
    EqAndReset(G),
}

impl<G: PrimeGroup> EcOp<G> {
    /// Packed opcode
    pub fn opcode(&self) -> u64 {
        match self {
            EcOp::Add(_) => OPCODE_ADD,
            EcOp::Mul(_, _) => OPCODE_MUL,
            EcOp::EqAndReset(_) => OPCODE_EQ_AND_RESET,
        }
    }

    /// The operation's point
    pub fn point(&self) -> G {
        match self {
            EcOp::Add(p) | EcOp::Mul(p, _) | EcOp::EqAndReset(p) => *p,
        }
    }

    /// The operation's scalar, zero unless this is a multiplication
    pub fn scalar(&self) -> G::Scalar {
        match self {
            EcOp::Mul(_, s) => *s,
            _ => G::Scalar::ZERO,
        }
    }

    /// Applies the operation to a running accumulator.
    ///
    /// Fails with [`FoldingError::LogInconsistency`] when an equality assertion
    /// does not hold.
    pub fn apply(&self, accumulator: G) -> FoldingResult<G> {
        match self {
            EcOp::Add(p) => Ok(accumulator + p),
            EcOp::Mul(p, s) => Ok(accumulator + *p * s),
            EcOp::EqAndReset(p) => {
                if accumulator == *p {
                    Ok(G::identity())
                } else {
                    Err(FoldingError::log_inconsistency(
                        "equality assertion failed while replaying operations",
                    ))
                }
            }
        }
    }

    /// The two table rows of this operation
    pub fn to_rows(&self) -> FoldingResult<[[ScalarOf<G>; NUM_COLUMNS]; ROWS_PER_OP]> {
        let encoding = self.point().to_bytes();
        let encoding = encoding.as_ref();
        if encoding.len() > LIMB_BYTES * POINT_LIMBS {
            return Err(FoldingError::invalid_instance(format!(
                "point encoding of {} bytes does not fit the table",
                encoding.len()
            )));
        }
        let mut limbs = [G::Scalar::ZERO; POINT_LIMBS];
        for (limb, chunk) in limbs.iter_mut().zip(encoding.chunks(LIMB_BYTES)) {
            *limb = limb_from_le_bytes(chunk);
        }

        let repr = self.scalar().to_repr();
        let repr = repr.as_ref();
        if repr.len() > 2 * LIMB_BYTES {
            return Err(FoldingError::invalid_instance(format!(
                "scalar encoding of {} bytes does not fit the table",
                repr.len()
            )));
        }
        let (s_lo, s_hi) = repr.split_at(repr.len().min(LIMB_BYTES));

        Ok([
            [G::Scalar::from(self.opcode()), limbs[0], limbs[1], limbs[2]],
            [
                G::Scalar::ZERO,
                limbs[3],
                limb_from_le_bytes(s_lo),
                limb_from_le_bytes(s_hi),
            ],
        ])
    }
}

/// Reads at most 16 little-endian bytes as a field element
fn limb_from_le_bytes<F: PrimeField>(bytes: &[u8]) -> F {
    let radix = F::from(u64::MAX) + F::ONE;
    bytes.chunks(8).rev().fold(F::ZERO, |acc, chunk| {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        acc * radix + F::from(u64::from_le_bytes(word))
    })
}

/// Column-major operation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpTable<F: PrimeField> {
    columns: [Vec<F>; NUM_COLUMNS],
}

impl<F: PrimeField> Default for OpTable<F> {
    fn default() -> Self {
        Self {
            columns: Default::default(),
        }
    }
}

impl<F: PrimeField> OpTable<F> {
    /// Encodes a sequence of operations
    pub fn from_ops<G>(ops: &[EcOp<G>]) -> FoldingResult<Self>
    where
        G: PrimeGroup<Scalar = F>,
    {
        let mut table = Self::default();
        for column in table.columns.iter_mut() {
            column.reserve(ops.len() * ROWS_PER_OP);
        }
        for op in ops {
            for row in op.to_rows()? {
                for (column, value) in table.columns.iter_mut().zip(row) {
                    column.push(value);
                }
            }
        }
        Ok(table)
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.columns[0].len()
    }

    /// Column `j` as polynomial coefficients, lowest degree first
    pub fn column(&self, j: usize) -> &[F] {
        &self.columns[j]
    }

    /// All columns
    pub fn columns(&self) -> &[Vec<F>; NUM_COLUMNS] {
        &self.columns
    }

    /// `self` followed by `other`, i.e. `M_j(X) = L_j(X) + X^k R_j(X)`
    pub fn concat(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (column, tail) in merged.columns.iter_mut().zip(other.columns.iter()) {
            column.extend_from_slice(tail);
        }
        merged
    }

    /// Commits each column with `ck`
    pub fn commit<G>(&self, ck: &CommitmentKey<G>) -> FoldingResult<[G; NUM_COLUMNS]>
    where
        G: PrimeGroup<Scalar = F>,
    {
        let mut commitments = [G::identity(); NUM_COLUMNS];
        for (commitment, column) in commitments.iter_mut().zip(self.columns.iter()) {
            *commitment = ck.commit(column)?;
        }
        Ok(commitments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DefaultGroup, DefaultScalar as Fr};
    use group::Group;

    #[test]
    fn test_opcodes() {
        let p = DefaultGroup::generator();
        assert_eq!(EcOp::Add(p).opcode(), 8);
        assert_eq!(EcOp::Mul(p, Fr::ONE).opcode(), 4);
        assert_eq!(EcOp::EqAndReset(p).opcode(), 3);
    }

    #[test]
    fn test_apply_replays_accumulator() {
        let p = DefaultGroup::generator();
        let s = Fr::from(5u64);
        let mut acc = DefaultGroup::identity();
        acc = EcOp::Mul(p, s).apply(acc).unwrap();
        acc = EcOp::Add(p).apply(acc).unwrap();
        assert_eq!(acc, p * Fr::from(6u64));

        acc = EcOp::EqAndReset(p * Fr::from(6u64)).apply(acc).unwrap();
        assert_eq!(acc, DefaultGroup::identity());
    }

    #[test]
    fn test_eq_mismatch_is_log_inconsistency() {
        let p = DefaultGroup::generator();
        let acc = EcOp::Add(p).apply(DefaultGroup::identity()).unwrap();
        assert!(matches!(
            EcOp::EqAndReset(p.double()).apply(acc),
            Err(FoldingError::LogInconsistency(_))
        ));
    }

    #[test]
    fn test_rows_layout() {
        let p = DefaultGroup::generator();
        let s = Fr::from(0x1234u64);
        let rows = EcOp::Mul(p, s).to_rows().unwrap();

        assert_eq!(rows[0][0], Fr::from(4u64));
        assert_eq!(rows[1][0], Fr::ZERO);
        // small scalar lives entirely in the low half
        assert_eq!(rows[1][2], s);
        assert_eq!(rows[1][3], Fr::ZERO);
        // 48-byte compressed G1 leaves the fourth limb empty
        assert_eq!(rows[1][1], Fr::ZERO);
    }

    #[test]
    fn test_limb_decoding() {
        let mut bytes = [0u8; 16];
        bytes[0] = 1;
        bytes[8] = 2;
        let radix = Fr::from(u64::MAX) + Fr::ONE;
        assert_eq!(limb_from_le_bytes::<Fr>(&bytes), Fr::ONE + radix * Fr::from(2u64));
    }

    #[test]
    fn test_table_concat_and_rows() {
        let p = DefaultGroup::generator();
        let first = OpTable::from_ops(&[EcOp::Add(p)]).unwrap();
        let second = OpTable::from_ops(&[EcOp::Add(p), EcOp::EqAndReset(p.double())]).unwrap();
        assert_eq!(first.num_rows(), 2);
        assert_eq!(second.num_rows(), 4);

        let merged = first.concat(&second);
        assert_eq!(merged.num_rows(), 6);
        assert_eq!(&merged.column(0)[2..], second.column(0));
    }
}
