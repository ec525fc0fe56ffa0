//! Pairwise distances between elements.

use crate::table;
use crate::table::Table;
use crate::Error;
use nalgebra::DMatrix;
use rayon::iter::IndexedParallelIterator as _;
use rayon::iter::ParallelIterator as _;
use rayon::slice::ParallelSliceMut as _;

/// Symmetric, non-negative distance matrix with a zero diagonal.
///
/// Built once per run, then only read by solvers.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    inner: DMatrix<f64>,
}

impl DistanceMatrix {
    /// Computes the distances between elements from their features.
    ///
    /// `numeric` holds one vector per numeric feature, expected in `[0, 1]`;
    /// the numeric distance is the Euclidean distance.  `categorical` holds one
    /// vector of integer codes per categorical feature; the categorical
    /// distance is the fraction of mismatching features (Hamming distance).
    /// Both distances are summed.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), anticlust::Error> {
    /// use anticlust::DistanceMatrix;
    ///
    /// let x = vec![0.0, 0.0, 1.0];
    /// let y = vec![0.0, 1.0, 1.0];
    /// let c = vec![0, 0, 1];
    /// let d = DistanceMatrix::from_features(&[x, y], &[c])?;
    ///
    /// assert_eq!(d.get(0, 1), 1.0);
    /// assert_eq!(d.get(1, 2), 2.0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_features(numeric: &[Vec<f64>], categorical: &[Vec<usize>]) -> Result<Self, Error> {
        let len = match numeric.first().map(Vec::len) {
            Some(len) => len,
            None => categorical.first().ok_or(Error::Configuration)?.len(),
        };
        let lens = numeric
            .iter()
            .map(Vec::len)
            .chain(categorical.iter().map(Vec::len));
        for actual in lens {
            if actual != len {
                return Err(Error::InputLenMismatch {
                    expected: len,
                    actual,
                });
            }
        }
        check_finite(numeric)?;
        if len == 0 {
            return Ok(DistanceMatrix {
                inner: DMatrix::zeros(0, 0),
            });
        }

        let span = tracing::info_span!("distance matrix", len);
        let _enter = span.enter();

        // The matrix is symmetric, so column-major and row-major layouts are
        // the same.
        let mut values = vec![0.0; len * len];
        values
            .par_chunks_mut(len)
            .enumerate()
            .for_each(|(i, row)| {
                for (j, d) in row.iter_mut().enumerate() {
                    *d = euclidean(numeric, i, j) + hamming(categorical, i, j);
                }
            });

        Ok(DistanceMatrix {
            inner: DMatrix::from_vec(len, len, values),
        })
    }

    /// Computes distances from the given columns of `table`.
    ///
    /// Numeric columns are min-max scaled to `[0, 1]` and categorical columns
    /// are factorized before calling [`DistanceMatrix::from_features`].
    pub fn from_table(
        table: &Table,
        numeric_columns: &[&str],
        categorical_columns: &[&str],
    ) -> Result<Self, Error> {
        if numeric_columns.is_empty() && categorical_columns.is_empty() {
            return Err(Error::Configuration);
        }
        let numeric: Vec<Vec<f64>> = numeric_columns
            .iter()
            .map(|name| table.numeric(name))
            .collect::<Result<_, Error>>()?;
        check_finite(&numeric)?;
        let numeric: Vec<Vec<f64>> = numeric.iter().map(|c| table::min_max_scale(c)).collect();
        let categorical: Vec<Vec<usize>> = categorical_columns
            .iter()
            .map(|name| Ok(table.column(name)?.factorize()))
            .collect::<Result<_, Error>>()?;
        DistanceMatrix::from_features(&numeric, &categorical)
    }

    /// Wraps a precomputed distance matrix.
    ///
    /// Fails with [`Error::InvalidDistances`] unless the matrix is square,
    /// symmetric, finite, non-negative and has a zero diagonal.
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self, Error> {
        if !matrix.is_square() {
            return Err(Error::InvalidDistances);
        }
        let len = matrix.nrows();
        for i in 0..len {
            if matrix[(i, i)] != 0.0 {
                return Err(Error::InvalidDistances);
            }
            for j in 0..i {
                let d = matrix[(i, j)];
                if !d.is_finite() || d < 0.0 || d != matrix[(j, i)] {
                    return Err(Error::InvalidDistances);
                }
            }
        }
        Ok(DistanceMatrix { inner: matrix })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.inner[(i, j)]
    }

    /// Distances from `i` to every element.
    pub fn row(&self, i: usize) -> &[f64] {
        let len = self.len();
        &self.inner.as_slice()[i * len..(i + 1) * len]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.inner
    }
}

fn check_finite(columns: &[Vec<f64>]) -> Result<(), Error> {
    for (feature, column) in columns.iter().enumerate() {
        if let Some(row) = column.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteFeature { feature, row });
        }
    }
    Ok(())
}

fn euclidean(columns: &[Vec<f64>], i: usize, j: usize) -> f64 {
    columns
        .iter()
        .map(|c| {
            let diff = c[i] - c[j];
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

fn hamming(columns: &[Vec<usize>], i: usize, j: usize) -> f64 {
    if columns.is_empty() {
        return 0.0;
    }
    let mismatches = columns.iter().filter(|c| c[i] != c[j]).count();
    mismatches as f64 / columns.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Column;
    use approx::assert_ulps_eq;
    use proptest::prelude::*;

    #[test]
    fn test_no_features() {
        assert_eq!(
            DistanceMatrix::from_features(&[], &[]),
            Err(Error::Configuration)
        );
        let table = Table::new()
            .with_column("x", Column::Numeric(vec![1.0]))
            .unwrap();
        assert_eq!(
            DistanceMatrix::from_table(&table, &[], &[]),
            Err(Error::Configuration)
        );
    }

    #[test]
    fn test_len_mismatch() {
        let err = DistanceMatrix::from_features(&[vec![0.0, 1.0]], &[vec![0]]).unwrap_err();
        assert_eq!(
            err,
            Error::InputLenMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_non_finite_features() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                DistanceMatrix::from_features(&[vec![0.5; 3], vec![0.0, bad, 1.0]], &[]),
                Err(Error::NonFiniteFeature { feature: 1, row: 1 })
            );
            let table = Table::new()
                .with_column("x", Column::Numeric(vec![0.0, 0.0, 2.0, 3.0, 3.0, bad]))
                .unwrap();
            assert_eq!(
                DistanceMatrix::from_table(&table, &["x"], &[]),
                Err(Error::NonFiniteFeature { feature: 0, row: 5 })
            );
        }
    }

    #[test]
    fn test_from_table() {
        let table = Table::new()
            .with_column("x", Column::Numeric(vec![0.0, 0.0, 2.0, 3.0, 3.0, 2.0]))
            .unwrap()
            .with_column("y", Column::Integer(vec![1, 2, 2, 1, 0, 0]))
            .unwrap()
            .with_column(
                "c",
                Column::Categorical(["a", "b", "a", "a", "b", "b"].map(String::from).to_vec()),
            )
            .unwrap();

        let d = DistanceMatrix::from_table(&table, &["x", "y"], &[]).unwrap();
        assert_eq!(d.len(), 6);
        // (0, 0.5) -> (1, 0)
        assert_ulps_eq!(d.get(0, 4), f64::sqrt(1.25));
        // (0, 1) -> (2/3, 1)
        assert_ulps_eq!(d.get(1, 2), 2.0 / 3.0);

        let d = DistanceMatrix::from_table(&table, &["x"], &["c"]).unwrap();
        assert_ulps_eq!(d.get(0, 1), 1.0);
        assert_ulps_eq!(d.get(0, 3), 1.0);
        assert_ulps_eq!(d.get(0, 4), 2.0);

        assert!(matches!(
            DistanceMatrix::from_table(&table, &["c"], &[]),
            Err(Error::ColumnType { .. })
        ));
        assert!(matches!(
            DistanceMatrix::from_table(&table, &[], &["z"]),
            Err(Error::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_from_matrix() {
        let ok = DMatrix::from_row_slice(2, 2, &[0.0, 1.5, 1.5, 0.0]);
        assert_eq!(DistanceMatrix::from_matrix(ok).unwrap().row(1), [1.5, 0.0]);

        let asymmetric = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 2.0, 0.0]);
        let diagonal = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 0.0]);
        let negative = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, -1.0, 0.0]);
        let rectangle = DMatrix::from_element(2, 3, 0.0);
        for m in [asymmetric, diagonal, negative, rectangle] {
            assert_eq!(
                DistanceMatrix::from_matrix(m),
                Err(Error::InvalidDistances)
            );
        }
    }

    proptest!(
        /// Built matrices are valid distance matrices.
        #[test]
        fn well_formed(
            (numeric, categorical) in (1..30usize).prop_flat_map(|len| {
                (
                    prop::collection::vec(prop::collection::vec(0.0..1.0f64, len), 0..4),
                    prop::collection::vec(prop::collection::vec(0..3usize, len), 1..3),
                )
            })
        ) {
            let d = DistanceMatrix::from_features(&numeric, &categorical).unwrap();
            prop_assert!(DistanceMatrix::from_matrix(d.as_matrix().clone()).is_ok());
            for i in 0..d.len() {
                prop_assert_eq!(d.row(i).len(), d.len());
            }
        }
    );
}
