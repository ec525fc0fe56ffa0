use super::StopFlag;
use super::Trial;
use crate::AssignmentMatrix;
use crate::Balance;
use crate::DistanceMatrix;
use crate::Error;
use crate::RunInfo;
use rand::Rng as _;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use rayon::iter::IndexedParallelIterator as _;
use rayon::iter::IntoParallelIterator as _;
use rayon::iter::ParallelIterator as _;

/// Metropolis criterion for a maximization problem.
fn accept(delta: f64, temperature: f64, rng: &mut Pcg64) -> bool {
    delta >= 0.0 || f64::exp(delta / temperature) >= rng.gen::<f64>()
}

fn anneal(
    distances: &DistanceMatrix,
    group_count: usize,
    settings: &SimulatedAnnealing,
    seed: u64,
) -> Result<Trial, Error> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let element_count = distances.len();
    let mut assignment =
        AssignmentMatrix::random(group_count, element_count, settings.balance, &mut rng)?;
    let mut objective = assignment.objective(distances);
    let mut temperature = settings.starting_temperature;
    let mut accepted_moves = 0;
    let mut iterations = 0;
    let mut cancelled = false;

    for _ in 0..settings.iterations {
        if super::is_stopped(&settings.stop) {
            cancelled = true;
            break;
        }
        iterations += 1;

        let i = rng.gen_range(0..element_count);
        let candidates: Vec<usize> = assignment.exchange_candidates(i).collect();
        if candidates.is_empty() {
            continue;
        }
        let j = candidates[rng.gen_range(0..candidates.len())];

        let delta = assignment.swap_delta(distances, i, j);
        if accept(delta, temperature, &mut rng) {
            assignment = assignment.swapped(i, j);
            objective += delta;
            accepted_moves += 1;
        }

        temperature *= settings.alpha;
    }

    Ok(Trial {
        assignment,
        objective,
        iterations,
        accepted_moves,
        cancelled,
    })
}

/// Simulated annealing with restarts.
///
/// Each restart starts from a fresh random partition.  At every iteration, a
/// random element is swapped with a random element of another group.  Moves
/// that improve the objective are always kept; other moves are kept with
/// probability `exp(delta / temperature)`.  The temperature is multiplied by
/// `alpha` after each iteration.
///
/// Restarts run in parallel, each with its own random generator seeded from
/// `seed`, so results do not depend on the number of threads.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), anticlust::Error> {
/// use anticlust::Solve as _;
///
/// let x = vec![0.0, 0.0, 2.0, 3.0, 3.0, 2.0];
/// let y = vec![1.0, 2.0, 2.0, 1.0, 0.0, 0.0];
/// let d = anticlust::DistanceMatrix::from_features(&[x, y], &[])?;
///
/// let (assignment, info) = anticlust::SimulatedAnnealing {
///     restarts: 4,
///     seed: 7,
///     ..Default::default()
/// }
/// .solve(&d, 3)?;
///
/// assert_eq!(assignment.group_sizes(), [2, 2, 2]);
/// assert_eq!(info.restarts, 4);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SimulatedAnnealing {
    /// Cooling factor, in `(0, 1)`.
    pub alpha: f64,
    /// Iterations per restart.
    pub iterations: usize,
    pub starting_temperature: f64,
    pub restarts: usize,
    pub seed: u64,
    pub balance: Balance,
    pub stop: Option<StopFlag>,
}

impl Default for SimulatedAnnealing {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            iterations: 2000,
            starting_temperature: 100.0,
            restarts: 9,
            seed: 0,
            balance: Balance::Strict,
            stop: None,
        }
    }
}

impl crate::Solve for SimulatedAnnealing {
    type Metadata = RunInfo;

    fn solve(
        &mut self,
        distances: &DistanceMatrix,
        group_count: usize,
    ) -> Result<(AssignmentMatrix, Self::Metadata), Error> {
        if !(0.0 < self.alpha && self.alpha < 1.0) {
            return Err(Error::InvalidParameter { name: "alpha" });
        }
        if !(self.starting_temperature > 0.0) {
            return Err(Error::InvalidParameter {
                name: "starting_temperature",
            });
        }
        super::check_group_count(distances, group_count)?;
        let span = tracing::info_span!("simulated annealing", group_count);
        let _enter = span.enter();

        let settings = &*self;
        let trials = super::restart_seeds(self.seed, self.restarts)
            .into_par_iter()
            .enumerate()
            .map(|(restart, seed)| {
                let span = tracing::debug_span!("restart", restart);
                let _enter = span.enter();
                let trial = anneal(distances, group_count, settings, seed)?;
                tracing::debug!(restart, objective = trial.objective, "restart done");
                Ok(trial)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let (assignment, info) = super::reduce_trials(distances, trials)?;
        tracing::info!(objective = info.objective, "best restart");
        Ok((assignment, info))
    }
}
