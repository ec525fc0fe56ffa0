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
use std::collections::VecDeque;

/// Fixed-length memory of the last committed swaps.
#[derive(Debug)]
struct TabuList {
    swaps: VecDeque<(usize, usize)>,
    tenure: usize,
}

impl TabuList {
    fn new(tenure: usize) -> TabuList {
        TabuList {
            swaps: VecDeque::new(),
            tenure,
        }
    }

    fn contains(&self, i: usize, j: usize) -> bool {
        self.swaps.contains(&(i, j)) || self.swaps.contains(&(j, i))
    }

    fn push(&mut self, i: usize, j: usize) {
        self.swaps.push_back((i, j));
        if self.swaps.len() > self.tenure {
            self.swaps.pop_front();
        }
    }
}

fn search(
    distances: &DistanceMatrix,
    group_count: usize,
    settings: &TabuSearch,
    seed: u64,
) -> Result<Trial, Error> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let element_count = distances.len();
    let mut assignment =
        AssignmentMatrix::random(group_count, element_count, settings.balance, &mut rng)?;
    let mut objective = assignment.objective(distances);
    let mut tabu = TabuList::new(settings.tabu_tenure);
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
        let candidates: Vec<usize> = assignment
            .exchange_candidates(i)
            .filter(|&j| !tabu.contains(i, j))
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let j = candidates[rng.gen_range(0..candidates.len())];

        let delta = assignment.swap_delta(distances, i, j);
        if delta > 0.0 {
            assignment = assignment.swapped(i, j);
            objective += delta;
            accepted_moves += 1;
            tabu.push(i, j);
        }
    }

    Ok(Trial {
        assignment,
        objective,
        iterations,
        accepted_moves,
        cancelled,
    })
}

/// Tabu search with restarts.
///
/// Each restart starts from a fresh random partition.  At every iteration, a
/// random element is swapped with a random element of another group, and the
/// swap is kept only if it improves the objective.  The last `tabu_tenure`
/// committed swaps cannot be selected again, in either direction.  The tabu
/// list is emptied at every restart.
///
/// Restarts run in parallel, like [`crate::SimulatedAnnealing`].
#[derive(Clone, Debug)]
pub struct TabuSearch {
    /// Number of recent swaps that are forbidden.
    pub tabu_tenure: usize,
    /// Iterations per restart.
    pub iterations: usize,
    pub restarts: usize,
    pub seed: u64,
    pub balance: Balance,
    pub stop: Option<StopFlag>,
}

impl Default for TabuSearch {
    fn default() -> Self {
        Self {
            tabu_tenure: 10,
            iterations: 2000,
            restarts: 9,
            seed: 0,
            balance: Balance::Strict,
            stop: None,
        }
    }
}

impl crate::Solve for TabuSearch {
    type Metadata = RunInfo;

    fn solve(
        &mut self,
        distances: &DistanceMatrix,
        group_count: usize,
    ) -> Result<(AssignmentMatrix, Self::Metadata), Error> {
        super::check_group_count(distances, group_count)?;
        let span = tracing::info_span!("tabu search", group_count);
        let _enter = span.enter();

        let settings = &*self;
        let trials = super::restart_seeds(self.seed, self.restarts)
            .into_par_iter()
            .enumerate()
            .map(|(restart, seed)| {
                let span = tracing::debug_span!("restart", restart);
                let _enter = span.enter();
                let trial = search(distances, group_count, settings, seed)?;
                tracing::debug!(restart, objective = trial.objective, "restart done");
                Ok(trial)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let (assignment, info) = super::reduce_trials(distances, trials)?;
        tracing::info!(objective = info.objective, "best restart");
        Ok((assignment, info))
    }
}
