//! The "same group" relation and the swap moves shared by local searches.

use crate::DistanceMatrix;
use crate::Error;
use crate::UnionFind;
use nalgebra::DMatrix;
use rand::seq::SliceRandom as _;
use rand::Rng;

/// How strictly group sizes are balanced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Balance {
    /// Every group holds `floor(n/k)` or `ceil(n/k)` elements.
    #[default]
    Strict,

    /// Groups only need to be non-empty.
    Relaxed,
}

/// Symmetric boolean matrix where `(i, j)` is true when elements `i` and `j`
/// belong to the same group.
///
/// The relation is always an equivalence relation: constructors only build
/// valid ones and [`AssignmentMatrix::swapped`] preserves validity.  Swaps
/// return new matrices, so a matrix is never modified once built.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentMatrix {
    inner: DMatrix<bool>,
}

impl AssignmentMatrix {
    /// Builds the relation of a partition given as group ids.
    ///
    /// # Example
    ///
    /// ```rust
    /// use anticlust::AssignmentMatrix;
    ///
    /// let a = AssignmentMatrix::from_part_ids(&[0, 1, 0]);
    /// assert!(a.get(0, 2));
    /// assert!(!a.get(0, 1));
    /// ```
    pub fn from_part_ids(part_ids: &[usize]) -> AssignmentMatrix {
        let len = part_ids.len();
        AssignmentMatrix {
            inner: DMatrix::from_fn(len, len, |i, j| part_ids[i] == part_ids[j]),
        }
    }

    /// Builds a random partition of `element_count` elements into
    /// `group_count` non-empty groups.
    ///
    /// Elements `0..group_count` are the roots of their own group.  With
    /// [`Balance::Strict`], the other elements are dealt round-robin to the
    /// groups and the deal is shuffled, so group sizes differ by at most one.
    /// With [`Balance::Relaxed`], each of them joins a uniformly random group.
    pub fn random<R>(
        group_count: usize,
        element_count: usize,
        balance: Balance,
        rng: &mut R,
    ) -> Result<AssignmentMatrix, Error>
    where
        R: Rng,
    {
        if group_count < 1 || element_count < group_count {
            return Err(Error::InfeasibleGroupCount {
                group_count,
                element_count,
            });
        }

        let rest = element_count - group_count;
        let roots: Vec<usize> = match balance {
            Balance::Strict => {
                let mut roots: Vec<usize> = (0..rest).map(|i| i % group_count).collect();
                roots.shuffle(rng);
                roots
            }
            Balance::Relaxed => (0..rest).map(|_| rng.gen_range(0..group_count)).collect(),
        };

        let mut components = UnionFind::new(element_count);
        for (element, root) in (group_count..).zip(roots) {
            components.union(element, root)?;
        }
        debug_assert_eq!(components.component_count(), group_count);

        let mut inner = DMatrix::from_element(element_count, element_count, false);
        for i in 0..element_count {
            for j in 0..=i {
                let connected = components.connected(i, j)?;
                inner[(i, j)] = connected;
                inner[(j, i)] = connected;
            }
        }
        Ok(AssignmentMatrix { inner })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `i` and `j` are in the same group.
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.inner[(i, j)]
    }

    /// Membership of every element in the group of `i`.
    pub fn row(&self, i: usize) -> &[bool] {
        // Symmetric, so the column-major column is also the row.
        let len = self.len();
        &self.inner.as_slice()[i * len..(i + 1) * len]
    }

    pub fn as_matrix(&self) -> &DMatrix<bool> {
        &self.inner
    }

    /// Elements outside of the group of `i`, which are the valid swap partners
    /// of `i`.
    pub fn exchange_candidates(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(i)
            .iter()
            .enumerate()
            .filter(|(_, same_group)| !**same_group)
            .map(|(j, _)| j)
    }

    /// Returns the relation where `i` and `j` exchanged their groups.
    ///
    /// Rows and columns `i` and `j` are exchanged, which keeps the relation an
    /// equivalence relation and leaves group sizes untouched.  Swapping the
    /// same pair twice gives back the original matrix.  `i` and `j` are
    /// expected to be in different groups.
    pub fn swapped(&self, i: usize, j: usize) -> AssignmentMatrix {
        debug_assert!(!self.get(i, j), "swapping two elements of the same group");
        let mut inner = self.inner.clone();
        inner.swap_rows(i, j);
        inner.swap_columns(i, j);
        if i != j {
            inner[(i, j)] = false;
            inner[(j, i)] = false;
        }
        AssignmentMatrix { inner }
    }

    /// Sum of the distances between elements of the same group, counting each
    /// pair in both directions.
    ///
    /// Anti-clustering maximizes this value.
    pub fn objective(&self, distances: &DistanceMatrix) -> f64 {
        debug_assert_eq!(self.len(), distances.len());
        self.inner
            .iter()
            .zip(distances.as_matrix().iter())
            .filter(|(same_group, _)| **same_group)
            .map(|(_, d)| *d)
            .sum()
    }

    /// Objective change caused by [`AssignmentMatrix::swapped`]`(i, j)`, in
    /// linear time.
    pub fn swap_delta(&self, distances: &DistanceMatrix, i: usize, j: usize) -> f64 {
        debug_assert!(!self.get(i, j));
        let group_i = self.row(i);
        let group_j = self.row(j);
        let d_i = distances.row(i);
        let d_j = distances.row(j);
        let mut delta = 0.0;
        for x in 0..self.len() {
            if x == i || x == j {
                continue;
            }
            if group_i[x] {
                // `x` loses `i` and gains `j`.
                delta += d_j[x] - d_i[x];
            } else if group_j[x] {
                delta += d_i[x] - d_j[x];
            }
        }
        2.0 * delta
    }

    /// Whether the matrix is reflexive, symmetric and transitive.
    pub fn is_equivalence(&self) -> bool {
        let len = self.len();
        let m = &self.inner;
        (0..len).all(|i| m[(i, i)])
            && (0..len).all(|i| (0..i).all(|j| m[(i, j)] == m[(j, i)]))
            && (0..len).all(|i| {
                (0..len).all(|j| !m[(i, j)] || (0..len).all(|k| m[(j, k)] == m[(i, k)]))
            })
    }

    /// Number of elements in each group, groups ordered by their smallest
    /// element.
    pub fn group_sizes(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| !self.row(i)[..i].contains(&true))
            .map(|i| self.row(i).iter().filter(|b| **b).count())
            .collect()
    }
}
