//! An anti-clustering library that splits data sets into balanced, mutually
//! similar groups.
//!
//! Classical clustering gathers similar elements together.  Anti-clustering
//! does the opposite: every group should be as heterogeneous as possible, so
//! that groups look alike.  This is typically used to split a data set into
//! statistically equivalent folds.
//!
//! # Crate Layout
//!
//! Anticlust exposes a [`Solve`] trait, which is in turn implemented by
//! algorithms.  Solvers take a [`DistanceMatrix`] and a group count, and return
//! an [`AssignmentMatrix`], the "same group" relation between elements.  The
//! [`labels`] module turns that relation into group ids, and [`run()`] ties
//! everything together for tabular data.  The [`stats`] module measures how
//! alike the resulting groups are.
//!
//! # Available algorithms
//!
//! - [Naive random][NaiveRandom]
//! - [Exchange][Exchange]
//! - [Simulated annealing][SimulatedAnnealing]
//! - [Tabu search][TabuSearch]
//! - [Exact branch-and-bound][Exact], for small inputs

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    rust_2018_idioms
)]

mod algorithms;
mod assignment;
mod distance;
pub mod labels;
mod run;
mod run_info;
pub mod stats;
pub mod table;
mod union_find;

#[cfg(test)]
mod tests;

pub use crate::algorithms::*;
pub use crate::assignment::AssignmentMatrix;
pub use crate::assignment::Balance;
pub use crate::distance::DistanceMatrix;
pub use crate::run::run;
pub use crate::run_info::RunInfo;
pub use crate::table::Column;
pub use crate::table::Table;
pub use crate::union_find::UnionFind;

pub use nalgebra;
pub use rayon;

use std::cmp::Ordering;
use std::fmt;

/// The `Solve` trait allows for anti-clustering a set of elements.
///
/// Anti-clustering algorithms implement this trait.  The input is the
/// pairwise distance matrix of the elements and the number of groups to
/// produce.  The output relation always partitions the elements into exactly
/// `group_count` non-empty groups.
pub trait Solve {
    /// Diagnostic data returned for a specific run of the algorithm.
    type Metadata;

    /// Split the elements of `distances` into `group_count` groups.
    fn solve(
        &mut self,
        distances: &DistanceMatrix,
        group_count: usize,
    ) -> Result<(AssignmentMatrix, Self::Metadata), Error>;
}

impl<S> Solve for &mut S
where
    S: Solve + ?Sized,
{
    type Metadata = S::Metadata;

    fn solve(
        &mut self,
        distances: &DistanceMatrix,
        group_count: usize,
    ) -> Result<(AssignmentMatrix, Self::Metadata), Error> {
        (**self).solve(distances, group_count)
    }
}

/// Errors thrown by anticlust.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Neither numeric nor categorical features were given.
    Configuration,

    /// The group count is zero or larger than the number of elements.
    InfeasibleGroupCount {
        group_count: usize,
        element_count: usize,
    },

    /// An element index is outside of the structure.
    IndexOutOfRange { index: usize, len: usize },

    /// The exact solver could not prove optimality.
    OptimizationFailed { reason: String },

    /// Input sets don't have matching lengths.
    InputLenMismatch { expected: usize, actual: usize },

    /// A referenced column does not exist in the table.
    UnknownColumn { name: String },

    /// A numeric feature column holds text.
    ColumnType { name: String },

    /// An algorithm setting is out of its domain.
    InvalidParameter { name: &'static str },

    /// A numeric feature holds NaN or an infinite value.
    NonFiniteFeature { feature: usize, row: usize },

    /// A distance matrix is not square, not symmetric, has a non-zero
    /// diagonal, or contains negative or non-finite values.
    InvalidDistances,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration => {
                write!(f, "numeric and categorical column sets cannot both be empty")
            }
            Error::InfeasibleGroupCount {
                group_count,
                element_count,
            } => write!(
                f,
                "cannot split {element_count} elements into {group_count} groups",
            ),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range (len is {len})")
            }
            Error::OptimizationFailed { reason } => write!(f, "optimization failed: {reason}"),
            Error::InputLenMismatch { expected, actual } => write!(
                f,
                "input sets don't have the same length (expected {expected} items, got {actual})",
            ),
            Error::UnknownColumn { name } => write!(f, "unknown column {name:?}"),
            Error::ColumnType { name } => write!(f, "column {name:?} is not numeric"),
            Error::InvalidParameter { name } => write!(f, "invalid value for {name}"),
            Error::NonFiniteFeature { feature, row } => {
                write!(f, "numeric feature {feature} is not finite at row {row}")
            }
            Error::InvalidDistances => write!(f, "invalid distance matrix"),
        }
    }
}

impl std::error::Error for Error {}

/// Total order on objective values.
fn objective_cmp(a: &f64, b: &f64) -> Ordering {
    a.total_cmp(b)
}
