use super::StopFlag;
use crate::AssignmentMatrix;
use crate::Balance;
use crate::DistanceMatrix;
use crate::Error;
use crate::RunInfo;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;

/// Draws random balanced partitions and keeps the best one.
///
/// There is no local refinement, which makes this a baseline rather than a
/// serious optimizer.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), anticlust::Error> {
/// use anticlust::Solve as _;
///
/// let x = vec![0.1, 0.4, 0.5, 0.9];
/// let d = anticlust::DistanceMatrix::from_features(&[x], &[])?;
///
/// let (assignment, info) = anticlust::NaiveRandom { iterations: 20, ..Default::default() }
///     .solve(&d, 2)?;
///
/// assert_eq!(assignment.group_sizes(), [2, 2]);
/// assert_eq!(info.restarts, 20);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct NaiveRandom {
    /// Number of random partitions to draw.  At least one is always drawn.
    pub iterations: usize,
    pub seed: u64,
    pub balance: Balance,
    pub stop: Option<StopFlag>,
}

impl Default for NaiveRandom {
    fn default() -> Self {
        Self {
            iterations: 1000,
            seed: 0,
            balance: Balance::Strict,
            stop: None,
        }
    }
}

impl crate::Solve for NaiveRandom {
    type Metadata = RunInfo;

    fn solve(
        &mut self,
        distances: &DistanceMatrix,
        group_count: usize,
    ) -> Result<(AssignmentMatrix, Self::Metadata), Error> {
        super::check_group_count(distances, group_count)?;
        let span = tracing::info_span!("naive random", group_count);
        let _enter = span.enter();

        let mut rng = Pcg64::seed_from_u64(self.seed);
        let element_count = distances.len();

        let mut best =
            AssignmentMatrix::random(group_count, element_count, self.balance, &mut rng)?;
        let mut best_objective = best.objective(distances);
        let mut info = RunInfo {
            restarts: 1,
            ..RunInfo::default()
        };

        for _ in 1..self.iterations {
            if super::is_stopped(&self.stop) {
                info.cancelled = true;
                break;
            }
            let candidate =
                AssignmentMatrix::random(group_count, element_count, self.balance, &mut rng)?;
            let objective = candidate.objective(distances);
            info.restarts += 1;
            if best_objective < objective {
                best = candidate;
                best_objective = objective;
                info.accepted_moves += 1;
            }
        }

        info.objective = best_objective;
        tracing::info!(objective = best_objective, draws = info.restarts, "done");
        Ok((best, info))
    }
}
