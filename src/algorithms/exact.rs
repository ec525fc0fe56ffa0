use super::StopFlag;
use crate::AssignmentMatrix;
use crate::Balance;
use crate::DistanceMatrix;
use crate::Error;
use crate::RunInfo;

/// Smallest and largest allowed group sizes.
fn size_range(element_count: usize, group_count: usize, balance: Balance) -> (usize, usize) {
    match balance {
        Balance::Strict => (
            element_count / group_count,
            (element_count + group_count - 1) / group_count,
        ),
        Balance::Relaxed => (1, element_count - group_count + 1),
    }
}

/// `bounds[e]` is an upper bound of what elements `e..` can add to the
/// objective: each of them is paired, at best, with its `max_size - 1`
/// farthest predecessors.
fn suffix_bounds(distances: &DistanceMatrix, max_size: usize) -> Vec<f64> {
    let element_count = distances.len();
    let mut bounds = vec![0.0; element_count + 1];
    let mut predecessors = Vec::with_capacity(element_count);
    for e in (0..element_count).rev() {
        predecessors.clear();
        predecessors.extend_from_slice(&distances.row(e)[..e]);
        predecessors.sort_unstable_by(|a, b| crate::objective_cmp(b, a));
        let best: f64 = predecessors.iter().take(max_size - 1).sum();
        bounds[e] = bounds[e + 1] + 2.0 * best;
    }
    bounds
}

/// Slack given to the pruning test, so that rounding errors in the bound
/// cannot cut an optimal branch.
fn tolerance(value: f64) -> f64 {
    1e-9 * f64::max(1.0, value.abs())
}

struct Search<'a> {
    distances: &'a DistanceMatrix,
    group_count: usize,
    min_size: usize,
    max_size: usize,
    bounds: Vec<f64>,
    members: Vec<Vec<usize>>,
    value: f64,
    best_value: f64,
    best: Option<Vec<usize>>,
    nodes: usize,
    max_nodes: usize,
    improvements: usize,
    stop: Option<StopFlag>,
    cancelled: bool,
}

impl<'a> Search<'a> {
    fn new(distances: &'a DistanceMatrix, group_count: usize, settings: &Exact) -> Search<'a> {
        let (min_size, max_size) = size_range(distances.len(), group_count, settings.balance);
        Search {
            distances,
            group_count,
            min_size,
            max_size,
            bounds: suffix_bounds(distances, max_size),
            members: Vec::with_capacity(group_count),
            value: 0.0,
            best_value: f64::NEG_INFINITY,
            best: None,
            nodes: 0,
            max_nodes: settings.max_nodes,
            improvements: 0,
            stop: settings.stop.clone(),
            cancelled: false,
        }
    }

    /// Whether the elements `next..` can still fill the open groups up to
    /// their minimum size, open the missing groups, and fit in the remaining
    /// capacity.
    fn is_feasible(&self, next: usize) -> bool {
        let remaining = self.distances.len() - next;
        let closed = self.group_count - self.members.len();
        let deficit: usize = self
            .members
            .iter()
            .map(|group| self.min_size.saturating_sub(group.len()))
            .sum::<usize>()
            + closed * self.min_size;
        let capacity: usize = self
            .members
            .iter()
            .map(|group| self.max_size - group.len())
            .sum::<usize>()
            + closed * self.max_size;
        deficit <= remaining && remaining <= capacity
    }

    fn branch(&mut self, e: usize) -> Result<(), Error> {
        if self.cancelled || super::is_stopped(&self.stop) {
            self.cancelled = true;
            return Ok(());
        }
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(Error::OptimizationFailed {
                reason: format!("node budget of {} exhausted", self.max_nodes),
            });
        }

        if e == self.distances.len() {
            if self.members.len() == self.group_count && self.best_value < self.value {
                let mut part_ids = vec![0; e];
                for (group, members) in self.members.iter().enumerate() {
                    for &x in members {
                        part_ids[x] = group;
                    }
                }
                tracing::debug!(objective = self.value, nodes = self.nodes, "new incumbent");
                self.best_value = self.value;
                self.best = Some(part_ids);
                self.improvements += 1;
            }
            return Ok(());
        }

        if self.best.is_some()
            && self.value + self.bounds[e] <= self.best_value - tolerance(self.best_value)
        {
            return Ok(());
        }

        for group in 0..self.members.len() {
            if self.members[group].len() < self.max_size {
                self.place(e, group)?;
            }
        }
        if self.members.len() < self.group_count {
            self.members.push(Vec::new());
            let result = self.place(e, self.members.len() - 1);
            self.members.pop();
            result?;
        }
        Ok(())
    }

    fn place(&mut self, e: usize, group: usize) -> Result<(), Error> {
        let d = self.distances.row(e);
        let gain = 2.0 * self.members[group].iter().map(|&x| d[x]).sum::<f64>();
        let value = self.value;

        self.members[group].push(e);
        self.value += gain;
        let result = if self.is_feasible(e + 1) {
            self.branch(e + 1)
        } else {
            Ok(())
        };
        self.value = value;
        self.members[group].pop();
        result
    }

    fn finish(self) -> Result<(AssignmentMatrix, RunInfo), Error> {
        let part_ids = match self.best {
            Some(part_ids) => part_ids,
            None if self.cancelled => {
                return Err(Error::OptimizationFailed {
                    reason: String::from("stopped before any feasible partition was found"),
                })
            }
            None => {
                return Err(Error::OptimizationFailed {
                    reason: String::from("no feasible partition"),
                })
            }
        };
        let assignment = AssignmentMatrix::from_part_ids(&part_ids);
        let info = RunInfo {
            objective: assignment.objective(self.distances),
            restarts: 1,
            iterations: self.nodes,
            accepted_moves: self.improvements,
            cancelled: self.cancelled,
        };
        Ok((assignment, info))
    }
}

/// Exhaustive branch-and-bound solver.
///
/// Groups are built element by element: each element either joins an
/// already open group or opens the next one, so every partition is visited
/// once.  Branches that break the size bounds of `balance`, or that cannot
/// beat the best partition found so far, are cut.  When several partitions
/// are optimal, the first one found is returned.
///
/// The search is exponential in the number of elements and is only practical
/// for small inputs.  It gives up with [`Error::OptimizationFailed`] after
/// visiting `max_nodes` nodes.  When `stop` is raised, the best partition
/// found so far is returned, and the run is marked as cancelled.
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
/// let (assignment, info) = anticlust::Exact::default().solve(&d, 2)?;
///
/// assert_eq!(assignment, anticlust::AssignmentMatrix::from_part_ids(&[0, 1, 0, 1]));
/// assert_eq!(info.objective, 4.0);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Exact {
    pub balance: Balance,
    /// Maximum number of search nodes.
    pub max_nodes: usize,
    pub stop: Option<StopFlag>,
}

impl Default for Exact {
    fn default() -> Self {
        Self {
            balance: Balance::Strict,
            max_nodes: 50_000_000,
            stop: None,
        }
    }
}

impl crate::Solve for Exact {
    type Metadata = RunInfo;

    fn solve(
        &mut self,
        distances: &DistanceMatrix,
        group_count: usize,
    ) -> Result<(AssignmentMatrix, Self::Metadata), Error> {
        super::check_group_count(distances, group_count)?;
        let span = tracing::info_span!("exact", group_count);
        let _enter = span.enter();

        let mut search = Search::new(distances, group_count, self);
        search.branch(0)?;

        let (assignment, info) = search.finish()?;
        if info.cancelled {
            tracing::info!(objective = info.objective, nodes = info.iterations, "stopped");
        } else {
            tracing::info!(objective = info.objective, nodes = info.iterations, "optimal");
        }
        Ok((assignment, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Exchange;
    use crate::Solve as _;
    use proptest::prelude::*;

    #[test]
    fn test_size_range() {
        assert_eq!(size_range(7, 3, Balance::Strict), (2, 3));
        assert_eq!(size_range(6, 3, Balance::Strict), (2, 2));
        assert_eq!(size_range(7, 3, Balance::Relaxed), (1, 5));
    }

    #[test]
    fn test_suffix_bounds() {
        let d = DistanceMatrix::from_features(&[vec![0.0, 0.5, 1.0]], &[]).unwrap();
        let bounds = suffix_bounds(&d, 2);
        assert_eq!(bounds, [2.0 * (0.5 + 1.0), 2.0 * (0.5 + 1.0), 2.0 * 1.0, 0.0]);
    }

    #[test]
    fn test_relaxed() {
        // Cutting off the most central element loses the least.
        let x = vec![0.0, 0.1, 0.2, 0.6, 1.0];
        let d = DistanceMatrix::from_features(&[x], &[]).unwrap();
        let (assignment, info) = Exact {
            balance: Balance::Relaxed,
            ..Exact::default()
        }
        .solve(&d, 2)
        .unwrap();
        assert_eq!(assignment, AssignmentMatrix::from_part_ids(&[0, 0, 1, 0, 0]));
        approx::assert_relative_eq!(info.objective, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singletons() {
        let d = DistanceMatrix::from_features(&[vec![0.0, 0.3, 1.0]], &[]).unwrap();
        let (assignment, info) = Exact::default().solve(&d, 3).unwrap();
        assert_eq!(assignment.group_sizes(), [1, 1, 1]);
        assert_eq!(info.objective, 0.0);
    }

    #[test]
    fn test_node_budget() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let d = DistanceMatrix::from_features(&[x], &[]).unwrap();
        let result = Exact {
            max_nodes: 5,
            ..Exact::default()
        }
        .solve(&d, 2);
        assert!(matches!(result, Err(Error::OptimizationFailed { .. })));
    }

    #[test]
    fn test_stopped() {
        let x: Vec<f64> = (0..8).map(|i| i as f64 / 7.0).collect();
        let d = DistanceMatrix::from_features(&[x], &[]).unwrap();
        let stop = StopFlag::new();
        stop.stop();
        let settings = Exact {
            stop: Some(stop),
            ..Exact::default()
        };

        let result = settings.clone().solve(&d, 2);
        assert!(matches!(result, Err(Error::OptimizationFailed { .. })));

        // The incumbent survives a stop.
        let mut search = Search::new(&d, 2, &settings);
        search.best = Some(vec![0, 1, 0, 1, 0, 1, 0, 1]);
        search.branch(0).unwrap();
        let (assignment, info) = search.finish().unwrap();
        assert!(info.cancelled);
        assert_eq!(info.iterations, 0);
        assert_eq!(
            assignment,
            AssignmentMatrix::from_part_ids(&[0, 1, 0, 1, 0, 1, 0, 1])
        );
    }

    proptest!(
        #![proptest_config(ProptestConfig{timeout: 8000, cases: 64, ..ProptestConfig::default()})]

        /// The exact solver is at least as good as any balanced heuristic.
        #[test]
        fn beats_exchange(
            (x, y, k) in (2..9usize).prop_flat_map(|n| {
                (
                    prop::collection::vec(0.0..1.0f64, n),
                    prop::collection::vec(0.0..1.0f64, n),
                    1..=n,
                )
            })
        ) {
            let d = DistanceMatrix::from_features(&[x, y], &[]).unwrap();
            let (exact, exact_info) = Exact::default().solve(&d, k).unwrap();
            let (_, heuristic_info) = Exchange { passes: 5, ..Exchange::default() }
                .solve(&d, k)
                .unwrap();
            prop_assert!(exact.is_equivalence());
            prop_assert_eq!(exact.group_sizes().len(), k);
            prop_assert!(heuristic_info.objective <= exact_info.objective + 1e-9);
        }
    );
}
