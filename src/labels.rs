//! Conversion of the "same group" relation into group labels.
//!
//! Solvers only decide which elements share a group; the numbering of groups
//! is arbitrary.  Canonical labels make that numbering depend only on the
//! data: rows are visited in the order of their features, and groups are
//! numbered `0..k` as they are met.

use crate::AssignmentMatrix;
use crate::Error;
use crate::Table;
use crate::UnionFind;

/// Collapses the relation into one representative element per group.
///
/// The label of an element is the representative of its group, so labels are
/// element indices and are not contiguous.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), anticlust::Error> {
/// use anticlust::AssignmentMatrix;
///
/// let a = AssignmentMatrix::from_part_ids(&[1, 0, 1, 0]);
/// let raw = anticlust::labels::raw_labels(&a)?;
///
/// assert_eq!(raw[0], raw[2]);
/// assert_eq!(raw[1], raw[3]);
/// assert_ne!(raw[0], raw[1]);
/// # Ok(())
/// # }
/// ```
pub fn raw_labels(assignment: &AssignmentMatrix) -> Result<Vec<usize>, Error> {
    let len = assignment.len();
    let mut components = UnionFind::new(len);
    for i in 0..len {
        let row = assignment.row(i);
        for j in i + 1..len {
            if row[j] {
                components.union(i, j)?;
            }
        }
    }
    (0..len).map(|i| components.find(i)).collect()
}

/// Renumbers `raw` labels from zero, in order of first occurrence when
/// visiting elements in `order`.
///
/// `order` must be a permutation of the element indices.
pub fn canonicalize(raw: &[usize], order: &[usize]) -> Result<Vec<usize>, Error> {
    if raw.len() != order.len() {
        return Err(Error::InputLenMismatch {
            expected: raw.len(),
            actual: order.len(),
        });
    }
    let len = raw.len();
    let mut renamed = vec![usize::MAX; len];
    let mut labels = vec![usize::MAX; len];
    let mut next = 0;
    for &element in order {
        let raw_label = *raw
            .get(element)
            .ok_or(Error::IndexOutOfRange { index: element, len })?;
        let slot = renamed.get_mut(raw_label).ok_or(Error::IndexOutOfRange {
            index: raw_label,
            len,
        })?;
        if *slot == usize::MAX {
            *slot = next;
            next += 1;
        }
        labels[element] = *slot;
    }
    Ok(labels)
}

/// Canonical group labels of the rows of `table`.
///
/// Rows are stably sorted by `numeric_columns` then by
/// `categorical_columns`, on their original values, and groups are numbered
/// in order of first occurrence in that traversal.
pub fn canonical_labels(
    assignment: &AssignmentMatrix,
    table: &Table,
    numeric_columns: &[&str],
    categorical_columns: &[&str],
) -> Result<Vec<usize>, Error> {
    if assignment.len() != table.row_count() {
        return Err(Error::InputLenMismatch {
            expected: table.row_count(),
            actual: assignment.len(),
        });
    }
    let keys: Vec<&str> = numeric_columns
        .iter()
        .chain(categorical_columns)
        .copied()
        .collect();
    let order = table.sorted_rows(&keys)?;
    canonicalize(&raw_labels(assignment)?, &order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Balance;
    use crate::Column;
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    #[test]
    fn test_raw_labels() {
        let a = AssignmentMatrix::from_part_ids(&[3, 3, 7, 3, 7]);
        let raw = raw_labels(&a).unwrap();
        assert_eq!(raw[0], raw[1]);
        assert_eq!(raw[0], raw[3]);
        assert_eq!(raw[2], raw[4]);
        assert_ne!(raw[0], raw[2]);
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize(&[3, 3, 1, 1], &[0, 1, 2, 3]).unwrap(), [0, 0, 1, 1]);
        assert_eq!(canonicalize(&[3, 3, 1, 1], &[3, 0, 1, 2]).unwrap(), [1, 1, 0, 0]);
        assert!(canonicalize(&[0, 0], &[0]).is_err());
        assert!(canonicalize(&[0, 0], &[0, 2]).is_err());
    }

    #[test]
    fn test_canonical_labels() {
        let table = Table::new()
            .with_column("x", Column::Numeric(vec![3.0, 1.0, 2.0, 0.0]))
            .unwrap()
            .with_column("c", Column::Categorical(vec!["a".into(); 4]))
            .unwrap();
        let a = AssignmentMatrix::from_part_ids(&[0, 1, 0, 1]);
        // Visited rows: 3, 1, 2, 0.
        assert_eq!(canonical_labels(&a, &table, &["x"], &[]).unwrap(), [1, 0, 1, 0]);
        // Categorical columns alone do not order anything here.
        assert_eq!(canonical_labels(&a, &table, &[], &["c"]).unwrap(), [0, 1, 0, 1]);
        assert!(matches!(
            canonical_labels(&a, &table, &["y"], &[]),
            Err(Error::UnknownColumn { .. })
        ));
    }

    proptest!(
        #![proptest_config(ProptestConfig{timeout: 4000, ..ProptestConfig::default()})]

        /// Labels are exactly `0..k`, canonicalization is idempotent, and labels
        /// describe the same partition as the relation.
        #[test]
        fn labels_are_canonical(
            (n, k, seed) in (1..50usize).prop_flat_map(|n| (Just(n), 1..=n, any::<u64>()))
        ) {
            let mut rng = Pcg64::seed_from_u64(seed);
            let a = AssignmentMatrix::random(k, n, Balance::Strict, &mut rng).unwrap();
            let order: Vec<usize> = (0..n).rev().collect();

            let labels = canonicalize(&raw_labels(&a).unwrap(), &order).unwrap();
            let mut distinct = labels.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(distinct, (0..k).collect::<Vec<_>>());
            prop_assert_eq!(&canonicalize(&labels, &order).unwrap(), &labels);
            prop_assert_eq!(&canonicalize(&raw_labels(&a).unwrap(), &order).unwrap(), &labels);
            prop_assert_eq!(AssignmentMatrix::from_part_ids(&labels), a);
        }
    );
}
