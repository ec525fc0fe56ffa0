use crate::AssignmentMatrix;
use crate::Balance;
use crate::DistanceMatrix;
use crate::Error;
use crate::RunInfo;
use crate::Solve;
use rand::Rng as _;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

mod exact;
mod exchange;
mod naive_random;
mod simulated_annealing;
mod tabu_search;

pub use exact::Exact;
pub use exchange::Exchange;
pub use naive_random::NaiveRandom;
pub use simulated_annealing::SimulatedAnnealing;
pub use tabu_search::TabuSearch;

/// Shared flag used to interrupt a running solver.
///
/// Solvers poll the flag once per outer iteration and return the best
/// assignment found so far, with [`RunInfo::cancelled`] set.
///
/// # Example
///
/// ```rust
/// use anticlust::StopFlag;
///
/// let stop = StopFlag::new();
/// let handle = stop.clone();
/// handle.stop();
/// assert!(stop.is_stopped());
/// ```
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> StopFlag {
        StopFlag::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

fn is_stopped(stop: &Option<StopFlag>) -> bool {
    stop.as_ref().map_or(false, StopFlag::is_stopped)
}

fn check_group_count(distances: &DistanceMatrix, group_count: usize) -> Result<(), Error> {
    if group_count < 1 || distances.len() < group_count {
        return Err(Error::InfeasibleGroupCount {
            group_count,
            element_count: distances.len(),
        });
    }
    Ok(())
}

/// Result of one independent local search.
struct Trial {
    assignment: AssignmentMatrix,
    objective: f64,
    iterations: usize,
    accepted_moves: usize,
    cancelled: bool,
}

/// Draws one seed per restart from the master seed, so that restarts can run
/// in any order and still be reproducible.
fn restart_seeds(seed: u64, restarts: usize) -> Vec<u64> {
    let mut rng = Pcg64::seed_from_u64(seed);
    (0..restarts.max(1)).map(|_| rng.gen()).collect()
}

/// Keeps the trial with the highest objective, the first one on ties, and
/// sums up the statistics of all trials.
fn reduce_trials(
    distances: &DistanceMatrix,
    trials: Vec<Trial>,
) -> Result<(AssignmentMatrix, RunInfo), Error> {
    let mut info = RunInfo {
        restarts: trials.len(),
        ..RunInfo::default()
    };
    let mut best: Option<Trial> = None;
    for trial in trials {
        info.iterations += trial.iterations;
        info.accepted_moves += trial.accepted_moves;
        info.cancelled |= trial.cancelled;
        let improves = best.as_ref().map_or(true, |best| {
            crate::objective_cmp(&trial.objective, &best.objective).is_gt()
        });
        if improves {
            best = Some(trial);
        }
    }
    let best = best.ok_or(Error::InvalidParameter { name: "restarts" })?;
    info.objective = best.assignment.objective(distances);
    Ok((best.assignment, info))
}

/// Every algorithm of the crate, selected by configuration.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), anticlust::Error> {
/// use anticlust::Solve as _;
///
/// let x = vec![0.0, 0.0, 2.0, 3.0, 3.0, 2.0];
/// let d = anticlust::DistanceMatrix::from_features(&[x], &[])?;
///
/// let mut algorithm = anticlust::Algorithm::from(anticlust::TabuSearch::default());
/// let (assignment, info) = algorithm.solve(&d, 2)?;
///
/// assert_eq!(assignment.group_sizes(), [3, 3]);
/// assert!(info.objective > 0.0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub enum Algorithm {
    NaiveRandom(NaiveRandom),
    Exchange(Exchange),
    SimulatedAnnealing(SimulatedAnnealing),
    TabuSearch(TabuSearch),
    Exact(Exact),
}

impl Algorithm {
    /// Sets the random seed of stochastic algorithms.
    pub fn set_seed(&mut self, seed: u64) {
        match self {
            Algorithm::NaiveRandom(a) => a.seed = seed,
            Algorithm::Exchange(a) => a.seed = seed,
            Algorithm::SimulatedAnnealing(a) => a.seed = seed,
            Algorithm::TabuSearch(a) => a.seed = seed,
            Algorithm::Exact(_) => {}
        }
    }

    pub fn set_balance(&mut self, balance: Balance) {
        match self {
            Algorithm::NaiveRandom(a) => a.balance = balance,
            Algorithm::Exchange(a) => a.balance = balance,
            Algorithm::SimulatedAnnealing(a) => a.balance = balance,
            Algorithm::TabuSearch(a) => a.balance = balance,
            Algorithm::Exact(a) => a.balance = balance,
        }
    }

    /// Sets the stop flag of the algorithm.
    pub fn set_stop(&mut self, stop: StopFlag) {
        let stop = Some(stop);
        match self {
            Algorithm::NaiveRandom(a) => a.stop = stop,
            Algorithm::Exchange(a) => a.stop = stop,
            Algorithm::SimulatedAnnealing(a) => a.stop = stop,
            Algorithm::TabuSearch(a) => a.stop = stop,
            Algorithm::Exact(a) => a.stop = stop,
        }
    }
}

impl Solve for Algorithm {
    type Metadata = RunInfo;

    fn solve(
        &mut self,
        distances: &DistanceMatrix,
        group_count: usize,
    ) -> Result<(AssignmentMatrix, Self::Metadata), Error> {
        match self {
            Algorithm::NaiveRandom(a) => a.solve(distances, group_count),
            Algorithm::Exchange(a) => a.solve(distances, group_count),
            Algorithm::SimulatedAnnealing(a) => a.solve(distances, group_count),
            Algorithm::TabuSearch(a) => a.solve(distances, group_count),
            Algorithm::Exact(a) => a.solve(distances, group_count),
        }
    }
}

impl From<NaiveRandom> for Algorithm {
    fn from(a: NaiveRandom) -> Algorithm {
        Algorithm::NaiveRandom(a)
    }
}

impl From<Exchange> for Algorithm {
    fn from(a: Exchange) -> Algorithm {
        Algorithm::Exchange(a)
    }
}

impl From<SimulatedAnnealing> for Algorithm {
    fn from(a: SimulatedAnnealing) -> Algorithm {
        Algorithm::SimulatedAnnealing(a)
    }
}

impl From<TabuSearch> for Algorithm {
    fn from(a: TabuSearch) -> Algorithm {
        Algorithm::TabuSearch(a)
    }
}

impl From<Exact> for Algorithm {
    fn from(a: Exact) -> Algorithm {
        Algorithm::Exact(a)
    }
}
