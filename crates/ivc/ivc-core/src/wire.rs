//! Canonical fixed-layout encodings.
//!
//! Layout rules:
//! - integers are little-endian (`u32` lengths, `u64` counters)
//! - field elements use `PrimeField::to_repr`
//! - group elements use `GroupEncoding::to_bytes`
//! - vectors are a `u32` length followed by their elements
//!
//! Decoding rejects non-canonical field and point encodings as well as
//! trailing bytes, so equal values always have equal encodings.

use crate::errors::{FoldingError, FoldingResult};
use crate::fields::{PrimeGroup, ScalarOf};
use crate::instances::{
    Accumulator, CommittedInstance, Instance, LogCommitment, RelaxedCommitment,
    WitnessCommitments,
};
use crate::ops::{EcOp, NUM_COLUMNS, OPCODE_ADD, OPCODE_EQ_AND_RESET, OPCODE_MUL};
use crate::r1cs::{R1csShape, SparseMatrix};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use commitments::IpaProof;
use ff::PrimeField;
use group::GroupEncoding;
use std::io::Read;
use std::sync::Arc;

/// Types with a canonical byte encoding
pub trait Encode {
    /// Appends the encoding to `out`
    fn encode(&self, out: &mut Vec<u8>);

    /// The encoding as a fresh buffer
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

/// Types that can be read back from their canonical encoding
pub trait Decode: Sized {
    /// Reads one value from the front of `input`, advancing it
    fn decode(input: &mut &[u8]) -> FoldingResult<Self>;

    /// Decodes a complete buffer, rejecting trailing bytes
    fn from_bytes(bytes: &[u8]) -> FoldingResult<Self> {
        let mut input = bytes;
        let value = Self::decode(&mut input)?;
        if !input.is_empty() {
            return Err(FoldingError::serialization_error(format!(
                "{} trailing bytes",
                input.len()
            )));
        }
        Ok(value)
    }
}

fn truncated(err: std::io::Error) -> FoldingError {
    FoldingError::serialization_error(format!("truncated input: {}", err))
}

/// Writes a little-endian `u32`
pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

/// Writes a little-endian `u64`
pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    out.extend_from_slice(&buf);
}

/// Writes a vector length
pub fn write_len(out: &mut Vec<u8>, len: usize) {
    write_u32(out, len as u32);
}

/// Reads a little-endian `u32`
pub fn read_u32(input: &mut &[u8]) -> FoldingResult<u32> {
    input.read_u32::<LittleEndian>().map_err(truncated)
}

/// Reads a little-endian `u64`
pub fn read_u64(input: &mut &[u8]) -> FoldingResult<u64> {
    input.read_u64::<LittleEndian>().map_err(truncated)
}

/// Reads a vector length, bounded by the bytes left in `input`
pub fn read_len(input: &mut &[u8], min_element_size: usize) -> FoldingResult<usize> {
    let len = read_u32(input)? as usize;
    if len.saturating_mul(min_element_size.max(1)) > input.len() {
        return Err(FoldingError::serialization_error(format!(
            "length {} exceeds remaining input",
            len
        )));
    }
    Ok(len)
}

/// Writes a field element
pub fn write_scalar<F: PrimeField>(out: &mut Vec<u8>, value: &F) {
    out.extend_from_slice(value.to_repr().as_ref());
}

/// Reads a canonical field element
pub fn read_scalar<F: PrimeField>(input: &mut &[u8]) -> FoldingResult<F> {
    let mut repr = F::Repr::default();
    input.read_exact(repr.as_mut()).map_err(truncated)?;
    Option::from(F::from_repr(repr))
        .ok_or_else(|| FoldingError::serialization_error("non-canonical field element"))
}

/// Writes a group element
pub fn write_point<G: GroupEncoding>(out: &mut Vec<u8>, value: &G) {
    out.extend_from_slice(value.to_bytes().as_ref());
}

/// Reads a canonical group element
pub fn read_point<G: GroupEncoding>(input: &mut &[u8]) -> FoldingResult<G> {
    let mut repr = G::Repr::default();
    input.read_exact(repr.as_mut()).map_err(truncated)?;
    Option::from(G::from_bytes(&repr))
        .ok_or_else(|| FoldingError::serialization_error("invalid group element encoding"))
}

/// Writes a length-prefixed vector of field elements
pub fn write_scalars<F: PrimeField>(out: &mut Vec<u8>, values: &[F]) {
    write_len(out, values.len());
    for value in values {
        write_scalar(out, value);
    }
}

/// Reads a length-prefixed vector of field elements
pub fn read_scalars<F: PrimeField>(input: &mut &[u8]) -> FoldingResult<Vec<F>> {
    let len = read_len(input, F::Repr::default().as_ref().len())?;
    (0..len).map(|_| read_scalar(input)).collect()
}

/// Writes a length-prefixed vector of group elements
pub fn write_points<G: GroupEncoding>(out: &mut Vec<u8>, values: &[G]) {
    write_len(out, values.len());
    for value in values {
        write_point(out, value);
    }
}

/// Reads a length-prefixed vector of group elements
pub fn read_points<G: GroupEncoding>(input: &mut &[u8]) -> FoldingResult<Vec<G>> {
    let len = read_len(input, G::Repr::default().as_ref().len())?;
    (0..len).map(|_| read_point(input)).collect()
}

/// Reads a fixed number of field elements without a length prefix
pub fn read_scalar_array<F: PrimeField, const N: usize>(input: &mut &[u8]) -> FoldingResult<[F; N]> {
    let mut scalars = [F::ZERO; N];
    for scalar in scalars.iter_mut() {
        *scalar = read_scalar(input)?;
    }
    Ok(scalars)
}

impl<F: PrimeField> Encode for SparseMatrix<F> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_len(out, self.rows.len());
        for row in &self.rows {
            write_len(out, row.len());
            for (col, coeff) in row {
                write_u32(out, *col as u32);
                write_scalar(out, coeff);
            }
        }
    }
}

impl<F: PrimeField> Decode for SparseMatrix<F> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        let num_rows = read_len(input, 4)?;
        let mut rows = Vec::with_capacity(num_rows);
        for _ in 0..num_rows {
            let len = read_len(input, 4)?;
            let row = (0..len)
                .map(|_| Ok((read_u32(input)? as usize, read_scalar(input)?)))
                .collect::<FoldingResult<Vec<_>>>()?;
            rows.push(row);
        }
        Ok(SparseMatrix::new(rows))
    }
}

impl<F: PrimeField> Encode for R1csShape<F> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.num_witness as u32);
        write_u32(out, self.num_public as u32);
        self.a.encode(out);
        self.b.encode(out);
        self.c.encode(out);
    }
}

impl<F: PrimeField> Decode for R1csShape<F> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        let num_witness = read_u32(input)? as usize;
        let num_public = read_u32(input)? as usize;
        let a = SparseMatrix::decode(input)?;
        let b = SparseMatrix::decode(input)?;
        let c = SparseMatrix::decode(input)?;
        R1csShape::new(num_witness, num_public, a, b, c)
            .map_err(|err| FoldingError::serialization_error(err.to_string()))
    }
}

impl<G: PrimeGroup> Encode for EcOp<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode() as u8);
        write_point(out, &self.point());
        if let EcOp::Mul(_, scalar) = self {
            write_scalar(out, scalar);
        }
    }
}

impl<G: PrimeGroup> Decode for EcOp<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        let opcode = input.read_u8().map_err(truncated)? as u64;
        let point = read_point(input)?;
        match opcode {
            OPCODE_ADD => Ok(EcOp::Add(point)),
            OPCODE_MUL => Ok(EcOp::Mul(point, read_scalar(input)?)),
            OPCODE_EQ_AND_RESET => Ok(EcOp::EqAndReset(point)),
            other => Err(FoldingError::serialization_error(format!(
                "unknown opcode {}",
                other
            ))),
        }
    }
}

impl<G: PrimeGroup> Encode for WitnessCommitments<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_point(out, &self.witness);
        for column in &self.ops {
            write_point(out, column);
        }
    }
}

impl<G: PrimeGroup> Decode for WitnessCommitments<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        let witness = read_point(input)?;
        let ops = read_point_columns(input)?;
        Ok(Self { witness, ops })
    }
}

/// Reads one group element per operation-table column
pub fn read_point_columns<G: PrimeGroup>(input: &mut &[u8]) -> FoldingResult<[G; NUM_COLUMNS]> {
    let mut columns = [G::identity(); NUM_COLUMNS];
    for column in columns.iter_mut() {
        *column = read_point(input)?;
    }
    Ok(columns)
}

impl<G: PrimeGroup> Encode for Instance<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        self.shape.encode(out);
        write_scalars(out, &self.public_inputs);
        write_scalars(out, &self.witness);
        self.witness_commitments.encode(out);
        write_len(out, self.ec_operations.len());
        for op in &self.ec_operations {
            op.encode(out);
        }
    }
}

impl<G: PrimeGroup> Decode for Instance<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        let shape = Arc::new(R1csShape::decode(input)?);
        let public_inputs = read_scalars(input)?;
        let witness = read_scalars(input)?;
        shape
            .check_lengths(&witness, &public_inputs)
            .map_err(|err| FoldingError::serialization_error(err.to_string()))?;
        let witness_commitments = WitnessCommitments::decode(input)?;
        let num_ops = read_len(input, 1)?;
        let ec_operations = (0..num_ops)
            .map(|_| EcOp::decode(input))
            .collect::<FoldingResult<Vec<_>>>()?;
        Ok(Self {
            shape,
            public_inputs,
            witness,
            witness_commitments,
            ec_operations,
        })
    }
}

impl<G: PrimeGroup> Encode for CommittedInstance<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_scalars(out, &self.public_inputs);
        self.witness_commitments.encode(out);
        write_u64(out, self.num_ops);
    }
}

impl<G: PrimeGroup> Decode for CommittedInstance<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            public_inputs: read_scalars(input)?,
            witness_commitments: WitnessCommitments::decode(input)?,
            num_ops: read_u64(input)?,
        })
    }
}

impl<G: PrimeGroup> Encode for LogCommitment<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        for column in &self.columns {
            write_point(out, column);
        }
        write_u64(out, self.rows);
    }
}

impl<G: PrimeGroup> Decode for LogCommitment<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        let columns = read_point_columns(input)?;
        let rows = read_u64(input)?;
        Ok(Self { columns, rows })
    }
}

impl<G: PrimeGroup> Encode for RelaxedCommitment<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_point(out, &self.witness);
        write_point(out, &self.error);
        write_scalar(out, &self.u);
        write_scalars(out, &self.public_inputs);
        self.log.encode(out);
        write_u64(out, self.step);
        write_scalar(out, &self.digest);
    }
}

impl<G: PrimeGroup> Decode for RelaxedCommitment<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            witness: read_point(input)?,
            error: read_point(input)?,
            u: read_scalar(input)?,
            public_inputs: read_scalars(input)?,
            log: LogCommitment::decode(input)?,
            step: read_u64(input)?,
            digest: read_scalar(input)?,
        })
    }
}

impl<G: PrimeGroup> Encode for Accumulator<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        self.instance.encode(out);
        write_scalars(out, &self.witness);
        write_scalars(out, &self.error);
    }
}

impl<G: PrimeGroup> Decode for Accumulator<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        Ok(Self {
            instance: RelaxedCommitment::decode(input)?,
            witness: read_scalars(input)?,
            error: read_scalars(input)?,
        })
    }
}

impl<G: PrimeGroup> Encode for IpaProof<G> {
    fn encode(&self, out: &mut Vec<u8>) {
        write_points(out, &self.l_vec);
        write_points(out, &self.r_vec);
        write_scalar(out, &self.a);
    }
}

impl<G: PrimeGroup> Decode for IpaProof<G> {
    fn decode(input: &mut &[u8]) -> FoldingResult<Self> {
        let l_vec: Vec<G> = read_points(input)?;
        let r_vec: Vec<G> = read_points(input)?;
        if l_vec.len() != r_vec.len() {
            return Err(FoldingError::serialization_error(
                "inner product proof has unbalanced rounds",
            ));
        }
        let a: ScalarOf<G> = read_scalar(input)?;
        Ok(Self { l_vec, r_vec, a })
    }
}
