//! Relaxed R1CS shapes and a builder for them.
//!
//! A shape with `m` constraints, `n_w` witness columns and `n_x` public
//! columns is checked against the assignment `z = (W, u, x)`: column `n_w`
//! holds the slack scalar `u`, which is `1` for a fresh instance. The relaxed
//! relation is
//!
//! ```text
//! Az ∘ Bz = u·Cz + E
//! ```

use crate::errors::{FoldingError, FoldingResult};
use commitments::{Transcript, TranscriptRead, TranscriptWrite};
use ff::PrimeField;
use rayon::prelude::*;

/// Row-major sparse matrix: each row lists `(column, coefficient)` pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseMatrix<F: PrimeField> {
    /// Non-zero entries per row
    pub rows: Vec<Vec<(usize, F)>>,
}

impl<F: PrimeField> SparseMatrix<F> {
    /// Creates a matrix from its rows
    pub fn new(rows: Vec<Vec<(usize, F)>>) -> Self {
        Self { rows }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Largest referenced column plus one
    fn width(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter().map(|(col, _)| col + 1))
            .max()
            .unwrap_or(0)
    }

    /// `M · z`
    pub fn multiply(&self, z: &[F]) -> Vec<F> {
        self.rows
            .par_iter()
            .map(|row| row.iter().map(|(col, coeff)| *coeff * z[*col]).sum())
            .collect()
    }
}

/// The constraint-system description shared by every instance of a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct R1csShape<F: PrimeField> {
    /// Number of witness columns
    pub num_witness: usize,
    /// Number of public input columns
    pub num_public: usize,
    /// Left matrix
    pub a: SparseMatrix<F>,
    /// Right matrix
    pub b: SparseMatrix<F>,
    /// Output matrix
    pub c: SparseMatrix<F>,
}

impl<F: PrimeField> R1csShape<F> {
    /// Creates a shape, checking matrix dimensions against the column layout
    pub fn new(
        num_witness: usize,
        num_public: usize,
        a: SparseMatrix<F>,
        b: SparseMatrix<F>,
        c: SparseMatrix<F>,
    ) -> FoldingResult<Self> {
        if num_witness == 0 {
            return Err(FoldingError::invalid_instance(
                "shape needs at least one witness column",
            ));
        }
        if a.num_rows() != b.num_rows() || a.num_rows() != c.num_rows() {
            return Err(FoldingError::invalid_instance(format!(
                "matrix row counts differ: {}, {}, {}",
                a.num_rows(),
                b.num_rows(),
                c.num_rows()
            )));
        }
        if a.num_rows() == 0 {
            return Err(FoldingError::invalid_instance("shape has no constraints"));
        }

        let num_vars = num_witness + 1 + num_public;
        let width = a.width().max(b.width()).max(c.width());
        if width > num_vars {
            return Err(FoldingError::invalid_instance(format!(
                "matrix references column {} of {}",
                width - 1,
                num_vars
            )));
        }

        Ok(Self {
            num_witness,
            num_public,
            a,
            b,
            c,
        })
    }

    /// Number of constraints `m`
    pub fn num_constraints(&self) -> usize {
        self.a.num_rows()
    }

    /// Length of `z = (W, u, x)`
    pub fn num_vars(&self) -> usize {
        self.num_witness + 1 + self.num_public
    }

    /// Assembles `z = (W, u, x)`
    pub fn z_vector(&self, witness: &[F], u: F, public_inputs: &[F]) -> FoldingResult<Vec<F>> {
        self.check_lengths(witness, public_inputs)?;
        let mut z = Vec::with_capacity(self.num_vars());
        z.extend_from_slice(witness);
        z.push(u);
        z.extend_from_slice(public_inputs);
        Ok(z)
    }

    /// Fails unless the witness and public input lengths fit the shape
    pub fn check_lengths(&self, witness: &[F], public_inputs: &[F]) -> FoldingResult<()> {
        if witness.len() != self.num_witness {
            return Err(FoldingError::shape_mismatch(format!(
                "expected {} witness values, got {}",
                self.num_witness,
                witness.len()
            )));
        }
        if public_inputs.len() != self.num_public {
            return Err(FoldingError::shape_mismatch(format!(
                "expected {} public inputs, got {}",
                self.num_public,
                public_inputs.len()
            )));
        }
        Ok(())
    }

    /// `(Az, Bz, Cz)`
    pub fn multiply_vec(&self, z: &[F]) -> FoldingResult<(Vec<F>, Vec<F>, Vec<F>)> {
        if z.len() != self.num_vars() {
            return Err(FoldingError::shape_mismatch(format!(
                "assignment has {} entries, shape has {} columns",
                z.len(),
                self.num_vars()
            )));
        }
        let (az, (bz, cz)) = rayon::join(
            || self.a.multiply(z),
            || rayon::join(|| self.b.multiply(z), || self.c.multiply(z)),
        );
        Ok((az, bz, cz))
    }

    /// Per-row residual `Az ∘ Bz - u·Cz - E`
    pub fn residual(&self, z: &[F], u: F, error: &[F]) -> FoldingResult<Vec<F>> {
        if error.len() != self.num_constraints() {
            return Err(FoldingError::shape_mismatch(format!(
                "error vector has {} entries for {} constraints",
                error.len(),
                self.num_constraints()
            )));
        }
        let (az, bz, cz) = self.multiply_vec(z)?;
        Ok(az
            .par_iter()
            .zip(bz.par_iter())
            .zip(cz.par_iter())
            .zip(error.par_iter())
            .map(|(((a, b), c), e)| *a * b - u * c - e)
            .collect())
    }

    /// Checks `Az ∘ Bz = u·Cz + E`
    pub fn is_satisfied_relaxed(
        &self,
        witness: &[F],
        u: F,
        public_inputs: &[F],
        error: &[F],
    ) -> FoldingResult<()> {
        let z = self.z_vector(witness, u, public_inputs)?;
        let residual = self.residual(&z, u, error)?;
        match residual.iter().position(|r| !bool::from(r.is_zero())) {
            Some(row) => Err(FoldingError::relation_violation(format!(
                "constraint {} is not satisfied",
                row
            ))),
            None => Ok(()),
        }
    }

    /// Checks the strict relation (`u = 1`, `E = 0`)
    pub fn is_satisfied(&self, witness: &[F], public_inputs: &[F]) -> FoldingResult<()> {
        let zeros = vec![F::ZERO; self.num_constraints()];
        self.is_satisfied_relaxed(witness, F::ONE, public_inputs, &zeros)
    }

    /// Cross term `T = Az₁∘Bz₂ + Az₂∘Bz₁ - u₁·Cz₂ - u₂·Cz₁`
    pub fn cross_term(&self, z1: &[F], u1: F, z2: &[F], u2: F) -> FoldingResult<Vec<F>> {
        let ((az1, bz1, cz1), (az2, bz2, cz2)) =
            match rayon::join(|| self.multiply_vec(z1), || self.multiply_vec(z2)) {
                (Ok(left), Ok(right)) => (left, right),
                (Err(err), _) | (_, Err(err)) => return Err(err),
            };

        Ok((0..self.num_constraints())
            .into_par_iter()
            .map(|i| az1[i] * bz2[i] + az2[i] * bz1[i] - u1 * cz2[i] - u2 * cz1[i])
            .collect())
    }

    /// Column vector `v_j = sum_i weights_i (A_ij + ρ B_ij + ρ² C_ij)`.
    ///
    /// `<v, z>` is the `ρ`-combination of the weighted row sums of
    /// `Az`, `Bz` and `Cz`.
    pub fn combined_columns(&self, weights: &[F], rho: F) -> Vec<F> {
        let rho_sq = rho.square();
        let mut columns = vec![F::ZERO; self.num_vars()];
        for (matrix, factor) in [(&self.a, F::ONE), (&self.b, rho), (&self.c, rho_sq)] {
            for (row, weight) in matrix.rows.iter().zip(weights.iter()) {
                let scaled = *weight * factor;
                for (col, coeff) in row {
                    columns[*col] += scaled * coeff;
                }
            }
        }
        columns
    }

    /// A field element binding every dimension and matrix entry
    pub fn digest(&self) -> F {
        let mut transcript = Transcript::new(b"r1cs-shape-digest");
        transcript.append_u64(b"num-witness", self.num_witness as u64);
        transcript.append_u64(b"num-public", self.num_public as u64);
        transcript.append_u64(b"num-constraints", self.num_constraints() as u64);
        for (label, matrix) in [
            (&b"matrix-a"[..], &self.a),
            (&b"matrix-b"[..], &self.b),
            (&b"matrix-c"[..], &self.c),
        ] {
            transcript.append_message(label, &[]);
            for row in &matrix.rows {
                transcript.append_u64(b"row-len", row.len() as u64);
                for (col, coeff) in row {
                    transcript.append_u64(b"col", *col as u64);
                    transcript.append_scalar(b"coeff", coeff);
                }
            }
        }
        transcript.challenge_scalar(b"digest")
    }
}

/// A variable of a constraint system under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    /// The constant `1` (the slack column `u` of a fresh instance)
    One,
    /// Witness column `i`
    Witness(usize),
    /// Public input column `i`
    Public(usize),
}

/// A linear combination `c1*v1 + c2*v2 + ... + cn*vn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearCombination<F: PrimeField> {
    /// `(variable, coefficient)` terms
    pub terms: Vec<(Variable, F)>,
}

impl<F: PrimeField> LinearCombination<F> {
    /// Create an empty linear combination
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Create a linear combination from a single variable
    pub fn from_variable(variable: Variable) -> Self {
        Self {
            terms: vec![(variable, F::ONE)],
        }
    }

    /// Create a linear combination from a constant
    pub fn from_constant(constant: F) -> Self {
        Self {
            terms: vec![(Variable::One, constant)],
        }
    }

    /// Add a term, builder style
    pub fn with_term(mut self, variable: Variable, coefficient: F) -> Self {
        self.terms.push((variable, coefficient));
        self
    }
}

impl<F: PrimeField> Default for LinearCombination<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PrimeField> From<Variable> for LinearCombination<F> {
    fn from(variable: Variable) -> Self {
        Self::from_variable(variable)
    }
}

/// Builder for [`R1csShape`]: allocate variables, then enforce `a · b = c`
#[derive(Debug, Clone, Default)]
pub struct ConstraintSystem<F: PrimeField> {
    num_witness: usize,
    num_public: usize,
    constraints: Vec<[LinearCombination<F>; 3]>,
}

impl<F: PrimeField> ConstraintSystem<F> {
    /// Creates an empty constraint system
    pub fn new() -> Self {
        Self {
            num_witness: 0,
            num_public: 0,
            constraints: Vec::new(),
        }
    }

    /// Allocates a witness variable
    pub fn alloc_witness(&mut self) -> Variable {
        self.num_witness += 1;
        Variable::Witness(self.num_witness - 1)
    }

    /// Allocates a public input variable
    pub fn alloc_public(&mut self) -> Variable {
        self.num_public += 1;
        Variable::Public(self.num_public - 1)
    }

    /// Enforces `a · b = c`
    pub fn enforce(
        &mut self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
        c: impl Into<LinearCombination<F>>,
    ) {
        self.constraints.push([a.into(), b.into(), c.into()]);
    }

    /// Number of constraints enforced so far
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Lowers the system into matrices over `z = (W, u, x)`
    pub fn into_shape(self) -> FoldingResult<R1csShape<F>> {
        let num_witness = self.num_witness;
        let column = |variable: Variable| -> FoldingResult<usize> {
            match variable {
                Variable::Witness(i) if i < num_witness => Ok(i),
                Variable::One => Ok(num_witness),
                Variable::Public(i) if i < self.num_public => Ok(num_witness + 1 + i),
                other => Err(FoldingError::invalid_instance(format!(
                    "unallocated variable {:?}",
                    other
                ))),
            }
        };

        let mut matrices: [Vec<Vec<(usize, F)>>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for constraint in &self.constraints {
            for (matrix, lc) in matrices.iter_mut().zip(constraint.iter()) {
                let row = lc
                    .terms
                    .iter()
                    .map(|(variable, coeff)| Ok((column(*variable)?, *coeff)))
                    .collect::<FoldingResult<Vec<_>>>()?;
                matrix.push(row);
            }
        }

        let [a, b, c] = matrices;
        R1csShape::new(
            self.num_witness,
            self.num_public,
            SparseMatrix::new(a),
            SparseMatrix::new(b),
            SparseMatrix::new(c),
        )
    }
}
