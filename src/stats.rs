//! Balance statistics of a labeled data set.

use crate::Error;
use crate::Table;
use itertools::Itertools as _;

/// Mean and sample standard deviation of one feature within one group.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FeatureStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Per-group statistics of a numeric feature, groups ordered by label.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub column: String,
    pub groups: Vec<FeatureStats>,
}

fn feature_stats(values: &[f64]) -> FeatureStats {
    let len = values.len() as f64;
    let mean = values.iter().sum::<f64>() / len;
    let std_dev = if values.len() < 2 {
        0.0
    } else {
        let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        f64::sqrt(squares / (len - 1.0))
    };
    FeatureStats { mean, std_dev }
}

/// Computes the mean and standard deviation of each column within each group.
///
/// Labels must be in `0..k` with every group non-empty, as produced by
/// [`crate::labels::canonical_labels`].
pub fn group_stats(
    table: &Table,
    labels: &[usize],
    columns: &[&str],
) -> Result<Vec<GroupStats>, Error> {
    if labels.len() != table.row_count() {
        return Err(Error::InputLenMismatch {
            expected: table.row_count(),
            actual: labels.len(),
        });
    }
    let group_count = labels.iter().max().map_or(0, |max| max + 1);

    columns
        .iter()
        .map(|&column| {
            let values = table.numeric(column)?;
            let mut groups = vec![Vec::new(); group_count];
            for (&label, value) in labels.iter().zip(values) {
                groups[label].push(value);
            }
            if let Some(empty) = groups.iter().position(Vec::is_empty) {
                return Err(Error::IndexOutOfRange {
                    index: empty,
                    len: group_count,
                });
            }
            Ok(GroupStats {
                column: column.to_owned(),
                groups: groups.iter().map(|g| feature_stats(g)).collect(),
            })
        })
        .collect()
}

/// How much the groups differ, averaged over features.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct BalanceReport {
    /// Mean spread (max - min) of group means.
    pub mean_spread: f64,
    /// Mean spread of group standard deviations.
    pub std_dev_spread: f64,
}

fn spread(values: impl Iterator<Item = f64>) -> f64 {
    values
        .minmax_by(crate::objective_cmp)
        .into_option()
        .map_or(0.0, |(min, max)| max - min)
}

/// Summarizes [`group_stats`] into two numbers, lower being more balanced.
pub fn balance_report(stats: &[GroupStats]) -> BalanceReport {
    if stats.is_empty() {
        return BalanceReport::default();
    }
    let count = stats.len() as f64;
    let mean_spread = stats
        .iter()
        .map(|s| spread(s.groups.iter().map(|g| g.mean)))
        .sum::<f64>()
        / count;
    let std_dev_spread = stats
        .iter()
        .map(|s| spread(s.groups.iter().map(|g| g.std_dev)))
        .sum::<f64>()
        / count;
    BalanceReport {
        mean_spread,
        std_dev_spread,
    }
}
