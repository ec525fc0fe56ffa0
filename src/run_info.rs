/// Information on an algorithm run.
///
/// Filled in by algorithms when run on a given input.  Gives information about how the run went.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RunInfo {
    /// Objective value of the returned assignment.
    pub objective: f64,

    /// Number of independent trials (random partitions, restarts or passes).
    pub restarts: usize,

    /// Number of moves evaluated, summed over all trials.
    pub iterations: usize,

    /// Number of moves that were committed, summed over all trials.
    pub accepted_moves: usize,

    /// Whether the run was interrupted through its stop flag.
    pub cancelled: bool,
}
