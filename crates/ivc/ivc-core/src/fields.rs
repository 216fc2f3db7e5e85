//! Field and group capabilities plus multilinear helpers.
//!
//! Multilinear tables index the Boolean hypercube with bit `j` of the index
//! holding variable `j`, so binding the first variable pairs entries `2i` and
//! `2i + 1`.

use crate::errors::{FoldingError, FoldingResult};
use ff::{Field, PrimeField};
use group::{Group, GroupEncoding};
use rayon::prelude::*;

/// The capability set the folding protocol needs from a commitment group:
/// prime-order arithmetic and a canonical byte encoding.
pub trait PrimeGroup: Group + GroupEncoding {}

impl<T: Group + GroupEncoding> PrimeGroup for T {}

/// Scalar field of a [`PrimeGroup`]
pub type ScalarOf<G> = <G as Group>::Scalar;

/// A multilinear polynomial given by its evaluations on the Boolean hypercube
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilinearPolynomial<F: PrimeField> {
    /// Evaluations of the polynomial on the Boolean hypercube
    pub evaluations: Vec<F>,
    /// Number of variables
    pub num_vars: usize,
}

impl<F: PrimeField> MultilinearPolynomial<F> {
    /// Creates a multilinear polynomial from `2^n` evaluations
    pub fn new(evaluations: Vec<F>) -> FoldingResult<Self> {
        if evaluations.is_empty() || !evaluations.len().is_power_of_two() {
            return Err(FoldingError::invalid_instance(format!(
                "multilinear table of length {} is not a power of two",
                evaluations.len()
            )));
        }
        let num_vars = evaluations.len().trailing_zeros() as usize;
        Ok(Self {
            evaluations,
            num_vars,
        })
    }

    /// Zero-pads `values` to the next power of two
    pub fn from_padded(mut values: Vec<F>) -> Self {
        let len = values.len().max(1).next_power_of_two();
        values.resize(len, F::ZERO);
        let num_vars = len.trailing_zeros() as usize;
        Self {
            evaluations: values,
            num_vars,
        }
    }

    /// Returns the number of variables in the polynomial
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Binds the first variable to `r`, halving the table
    pub fn bind_first(&mut self, r: F) {
        let half = self.evaluations.len() / 2;
        let bound: Vec<F> = (0..half)
            .into_par_iter()
            .map(|i| {
                let lo = self.evaluations[2 * i];
                let hi = self.evaluations[2 * i + 1];
                lo + r * (hi - lo)
            })
            .collect();
        self.evaluations = bound;
        self.num_vars = self.num_vars.saturating_sub(1);
    }

    /// Evaluates the multilinear extension at `point`
    pub fn evaluate(&self, point: &[F]) -> FoldingResult<F> {
        if point.len() != self.num_vars {
            return Err(FoldingError::invalid_instance(format!(
                "point has {} coordinates for {} variables",
                point.len(),
                self.num_vars
            )));
        }
        let mut table = self.clone();
        for r in point {
            table.bind_first(*r);
        }
        Ok(table.evaluations[0])
    }
}

/// The table `eq(point, i)` for every `i` in `{0,1}^n`, where
/// `eq(a, b) = prod_j (a_j b_j + (1 - a_j)(1 - b_j))`
pub fn eq_table<F: Field>(point: &[F]) -> Vec<F> {
    let mut table = Vec::with_capacity(1 << point.len());
    table.push(F::ONE);
    for r in point {
        let size = table.len();
        table.resize(2 * size, F::ZERO);
        for i in 0..size {
            let value = table[i];
            table[i + size] = value * r;
            table[i] = value - table[i + size];
        }
    }
    table
}

/// `eq(a, b)` for two points of equal dimension
pub fn eq_eval<F: Field>(a: &[F], b: &[F]) -> F {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| *x * y + (F::ONE - x) * (F::ONE - y))
        .product()
}

/// Inner product of two vectors
pub fn inner_product<F: Field>(a: &[F], b: &[F]) -> F {
    commitments::inner_product(a, b)
}

/// `left + challenge * right`, element-wise
pub fn fold_vectors<F: Field>(left: &[F], right: &[F], challenge: F, parallel: bool) -> Vec<F> {
    if parallel {
        left.par_iter()
            .zip(right.par_iter())
            .map(|(l, r)| *l + challenge * r)
            .collect()
    } else {
        left.iter()
            .zip(right.iter())
            .map(|(l, r)| *l + challenge * r)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultScalar as Fr;
    use proptest::prelude::*;

    fn fr(v: u64) -> Fr {
        Fr::from(v)
    }

    #[test]
    fn test_multilinear_evaluate_on_hypercube() {
        let poly = MultilinearPolynomial::new(vec![fr(1), fr(2), fr(3), fr(4)]).unwrap();
        assert_eq!(poly.num_vars(), 2);

        // bit 0 is the first coordinate
        assert_eq!(poly.evaluate(&[fr(0), fr(0)]).unwrap(), fr(1));
        assert_eq!(poly.evaluate(&[fr(1), fr(0)]).unwrap(), fr(2));
        assert_eq!(poly.evaluate(&[fr(0), fr(1)]).unwrap(), fr(3));
        assert_eq!(poly.evaluate(&[fr(1), fr(1)]).unwrap(), fr(4));
    }

    #[test]
    fn test_multilinear_rejects_bad_length() {
        assert!(MultilinearPolynomial::new(vec![fr(1), fr(2), fr(3)]).is_err());
        let poly = MultilinearPolynomial::new(vec![fr(1), fr(2)]).unwrap();
        assert!(poly.evaluate(&[fr(1), fr(1)]).is_err());
    }

    #[test]
    fn test_from_padded() {
        let poly = MultilinearPolynomial::from_padded(vec![fr(5), fr(6), fr(7)]);
        assert_eq!(poly.evaluations.len(), 4);
        assert_eq!(poly.evaluations[3], Fr::ZERO);
        assert_eq!(poly.num_vars(), 2);
    }

    #[test]
    fn test_eq_table_matches_eq_eval() {
        let point = vec![fr(3), fr(7), fr(11)];
        let table = eq_table(&point);
        assert_eq!(table.len(), 8);

        for (i, value) in table.iter().enumerate() {
            let bits: Vec<Fr> = (0..3).map(|j| fr(((i >> j) & 1) as u64)).collect();
            assert_eq!(*value, eq_eval(&point, &bits));
        }
    }

    #[test]
    fn test_eq_table_sums_to_one() {
        let table = eq_table(&[fr(9), fr(13)]);
        let sum: Fr = table.iter().sum();
        assert_eq!(sum, Fr::ONE);
    }

    #[test]
    fn test_fold_vectors_modes_agree() {
        let left: Vec<Fr> = (0..100).map(fr).collect();
        let right: Vec<Fr> = (100..200).map(fr).collect();
        let challenge = fr(17);
        assert_eq!(
            fold_vectors(&left, &right, challenge, true),
            fold_vectors(&left, &right, challenge, false)
        );
    }

    proptest! {
        #[test]
        fn prop_evaluation_is_eq_weighted_sum(
            values in prop::collection::vec(any::<u64>(), 4),
            point in prop::collection::vec(any::<u64>(), 2),
        ) {
            let evaluations: Vec<Fr> = values.into_iter().map(Fr::from).collect();
            let point: Vec<Fr> = point.into_iter().map(Fr::from).collect();
            let poly = MultilinearPolynomial::new(evaluations.clone()).unwrap();

            let expected = inner_product(&evaluations, &eq_table(&point));
            prop_assert_eq!(poly.evaluate(&point).unwrap(), expected);
        }
    }
}
