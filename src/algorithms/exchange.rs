//! Exchange heuristic.
//!
//! Based on:
//! Papenberg, M., & Klau, G. W. (2021). Using anticlustering to partition data
//! sets into equivalent parts. Psychological Methods, 26(2), 161–174.

use super::StopFlag;
use crate::AssignmentMatrix;
use crate::Balance;
use crate::DistanceMatrix;
use crate::Error;
use crate::RunInfo;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use rayon::iter::IntoParallelRefIterator as _;
use rayon::iter::ParallelIterator as _;

/// Finds the best swap partner of `i`: the highest gain, then the lowest index.
fn best_exchange(
    assignment: &AssignmentMatrix,
    distances: &DistanceMatrix,
    i: usize,
    candidates: &[usize],
) -> Option<(f64, usize)> {
    candidates
        .par_iter()
        .map(|&j| (assignment.swap_delta(distances, i, j), j))
        .max_by(|(gain0, j0), (gain1, j1)| {
            // On equal gains, the lowest partner index wins.
            crate::objective_cmp(gain0, gain1).then_with(|| j1.cmp(j0))
        })
}

fn exchange(
    mut assignment: AssignmentMatrix,
    distances: &DistanceMatrix,
    passes: usize,
    stop: &Option<StopFlag>,
) -> (AssignmentMatrix, RunInfo) {
    let mut info = RunInfo::default();
    let mut objective = assignment.objective(distances);
    tracing::info!(objective, "initial objective");

    'passes: for pass in 0..passes.max(1) {
        let accepted_before = info.accepted_moves;
        for i in 0..assignment.len() {
            if super::is_stopped(stop) {
                info.cancelled = true;
                break 'passes;
            }
            let candidates: Vec<usize> = assignment.exchange_candidates(i).collect();
            info.iterations += candidates.len();
            let (gain, j) = match best_exchange(&assignment, distances, i, &candidates) {
                Some(best) => best,
                None => continue,
            };
            if gain > 0.0 {
                tracing::debug!(i, j, gain, "swap");
                assignment = assignment.swapped(i, j);
                objective += gain;
                info.accepted_moves += 1;
            }
        }
        info.restarts += 1;
        tracing::debug!(pass, objective, "end of pass");
        if info.accepted_moves == accepted_before {
            break;
        }
    }

    info.objective = assignment.objective(distances);
    tracing::info!(objective = info.objective, "final objective");
    (assignment, info)
}

/// Exchange heuristic.
///
/// Starting from a random balanced partition, each element in turn is swapped
/// with the partner from another group that improves the objective the most,
/// if any.  A pass visits every element once.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), anticlust::Error> {
/// use anticlust::Solve as _;
///
/// let x = vec![0.0, 0.0, 1.0, 1.0];
/// let d = anticlust::DistanceMatrix::from_features(&[x], &[])?;
///
/// let (assignment, _) = anticlust::Exchange::default().solve(&d, 2)?;
///
/// // Each group gets one element at 0 and one at 1.
/// assert!(!assignment.get(0, 1));
/// assert!(!assignment.get(2, 3));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Exchange {
    /// Maximum number of passes.  Stops early after a pass without any swap.
    pub passes: usize,
    pub seed: u64,
    pub balance: Balance,
    pub stop: Option<StopFlag>,
}

impl Default for Exchange {
    fn default() -> Self {
        Self {
            passes: 1,
            seed: 0,
            balance: Balance::Strict,
            stop: None,
        }
    }
}

impl crate::Solve for Exchange {
    type Metadata = RunInfo;

    fn solve(
        &mut self,
        distances: &DistanceMatrix,
        group_count: usize,
    ) -> Result<(AssignmentMatrix, Self::Metadata), Error> {
        super::check_group_count(distances, group_count)?;
        let span = tracing::info_span!("exchange", group_count);
        let _enter = span.enter();

        let mut rng = Pcg64::seed_from_u64(self.seed);
        let initial =
            AssignmentMatrix::random(group_count, distances.len(), self.balance, &mut rng)?;
        Ok(exchange(initial, distances, self.passes, &self.stop))
    }
}
