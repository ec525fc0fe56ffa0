use crate::run;
use crate::Algorithm;
use crate::AssignmentMatrix;
use crate::Balance;
use crate::Column;
use crate::DistanceMatrix;
use crate::Error;
use crate::Exact;
use crate::Exchange;
use crate::NaiveRandom;
use crate::SimulatedAnnealing;
use crate::Table;
use crate::Solve as _;
use crate::TabuSearch;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;

fn points(x: &[f64], y: &[f64]) -> Table {
    Table::new()
        .with_column("x", Column::Numeric(x.to_vec()))
        .unwrap()
        .with_column("y", Column::Numeric(y.to_vec()))
        .unwrap()
}

/// Six points on a hexagon-like ring.
fn ring() -> Table {
    points(&[0., 0., 2., 3., 3., 2.], &[1., 2., 2., 1., 0., 0.])
}

/// The same kind of ring, with shuffled rows.
fn shuffled_ring() -> Table {
    points(&[0., 2., 3., 0., 3., 2.], &[1., 2., 0., 2., 1., 0.])
}

fn categories(values: &[&str]) -> Table {
    Table::new()
        .with_column(
            "c",
            Column::Categorical(values.iter().map(|s| s.to_string()).collect()),
        )
        .unwrap()
}

fn optimizers() -> Vec<Algorithm> {
    vec![
        Exact::default().into(),
        Exchange {
            passes: 10,
            ..Exchange::default()
        }
        .into(),
        SimulatedAnnealing::default().into(),
        TabuSearch::default().into(),
    ]
}

fn group_labels(
    table: &Table,
    numeric: &[&str],
    categorical: &[&str],
    k: usize,
    algorithm: &mut Algorithm,
) -> Vec<i64> {
    let (output, _) = run(table, numeric, categorical, k, "Group", algorithm).unwrap();
    match output.column("Group").unwrap() {
        Column::Integer(labels) => labels.clone(),
        other => panic!("unexpected label column {other:?}"),
    }
}

fn distinct(labels: &[i64]) -> Vec<i64> {
    let mut labels = labels.to_vec();
    labels.sort_unstable();
    labels.dedup();
    labels
}

#[test]
fn test_one_group() {
    let mut algorithms = optimizers();
    algorithms.push(NaiveRandom::default().into());
    for algorithm in &mut algorithms {
        assert_eq!(group_labels(&ring(), &["x", "y"], &[], 1, algorithm), [0; 6]);
    }
}

#[test]
fn test_ring_two_groups() {
    for algorithm in &mut optimizers() {
        assert_eq!(
            group_labels(&ring(), &["x", "y"], &[], 2, algorithm),
            [0, 1, 0, 1, 0, 1],
            "{algorithm:?}"
        );
        assert_eq!(
            group_labels(&shuffled_ring(), &["x", "y"], &[], 2, algorithm),
            [0, 0, 0, 1, 1, 1],
            "{algorithm:?}"
        );
    }
}

#[test]
fn test_ring_three_groups() {
    for algorithm in &mut optimizers() {
        assert_eq!(
            group_labels(&ring(), &["x", "y"], &[], 3, algorithm),
            [0, 1, 2, 0, 1, 2],
            "{algorithm:?}"
        );
        assert_eq!(
            group_labels(&shuffled_ring(), &["x", "y"], &[], 3, algorithm),
            [0, 2, 1, 1, 0, 2],
            "{algorithm:?}"
        );
    }
}

#[test]
fn test_ring_single_exchange_pass() {
    let d = DistanceMatrix::from_table(&ring(), &["x", "y"], &[]).unwrap();
    for k in [2, 3] {
        let mut rng = Pcg64::seed_from_u64(0);
        let start = AssignmentMatrix::random(k, 6, Balance::Strict, &mut rng).unwrap();
        let (assignment, info) = Exchange::default().solve(&d, k).unwrap();
        let (_, optimum) = Exact::default().solve(&d, k).unwrap();
        assert_eq!(info.restarts, 1);
        assert_eq!(assignment.group_sizes(), vec![6 / k; k]);
        assert!(start.objective(&d) <= info.objective + 1e-9);
        assert!(info.objective <= optimum.objective + 1e-9);
    }
}

#[test]
fn test_naive_random_groups() {
    let mut algorithm = Algorithm::from(NaiveRandom::default());
    for k in 1..=6 {
        let labels = group_labels(&ring(), &["x", "y"], &[], k, &mut algorithm);
        assert_eq!(distinct(&labels), (0..k as i64).collect::<Vec<_>>());
    }
}

#[test]
fn test_category_coverage() {
    let mut algorithms = vec![
        Algorithm::from(Exact::default()),
        SimulatedAnnealing::default().into(),
        TabuSearch::default().into(),
    ];
    for algorithm in &mut algorithms {
        let values = ["a", "b", "c", "a", "b", "c"];
        let labels = group_labels(&categories(&values), &[], &["c"], 2, algorithm);
        for value in ["a", "b", "c"] {
            let groups: Vec<i64> = values
                .iter()
                .zip(&labels)
                .filter(|(v, _)| **v == value)
                .map(|(_, label)| *label)
                .collect();
            assert_eq!(distinct(&groups), [0, 1], "{algorithm:?}");
        }

        let values = ["a", "b", "a", "b", "a", "b"];
        let labels = group_labels(&categories(&values), &[], &["c"], 3, algorithm);
        for group in 0..3 {
            let members: Vec<&str> = values
                .iter()
                .zip(&labels)
                .filter(|(_, label)| **label == group)
                .map(|(v, _)| *v)
                .collect();
            assert_eq!(members.len(), 2, "{algorithm:?}");
            assert_ne!(members[0], members[1], "{algorithm:?}");
        }
    }
}

#[test]
fn test_heuristics_use_every_group() {
    let x: Vec<f64> = (0..17).map(|i| ((i * 5) % 17) as f64).collect();
    let y: Vec<f64> = (0..17).map(|i| ((i * 3) % 7) as f64).collect();
    let table = points(&x, &y);
    let mut algorithms: Vec<Algorithm> = vec![
        NaiveRandom {
            iterations: 20,
            ..NaiveRandom::default()
        }
        .into(),
        Exchange::default().into(),
        SimulatedAnnealing {
            iterations: 200,
            restarts: 2,
            ..SimulatedAnnealing::default()
        }
        .into(),
        TabuSearch {
            iterations: 200,
            restarts: 2,
            ..TabuSearch::default()
        }
        .into(),
    ];
    for algorithm in &mut algorithms {
        for k in [1, 2, 3, 5, 8, 16, 17] {
            let labels = group_labels(&table, &["x", "y"], &[], k, algorithm);
            assert_eq!(
                distinct(&labels),
                (0..k as i64).collect::<Vec<_>>(),
                "{algorithm:?}"
            );
            for group in 0..k as i64 {
                let size = labels.iter().filter(|l| **l == group).count();
                assert!(size == 17 / k || size == (17 + k - 1) / k);
            }
        }
    }
}

#[test]
fn test_destination_is_replaced() {
    let table = ring()
        .with_column("Group", Column::Categorical(vec![String::new(); 6]))
        .unwrap();
    let (output, _) = run(&table, &["x", "y"], &[], 3, "Group", Exact::default()).unwrap();
    assert_eq!(
        output.column_names().collect::<Vec<_>>(),
        ["x", "y", "Group"]
    );
    assert_eq!(
        output.column("Group").unwrap(),
        &Column::Integer(vec![0, 1, 2, 0, 1, 2])
    );
    assert_eq!(output.column("x").unwrap(), ring().column("x").unwrap());
}

#[test]
fn test_reproducible() {
    let mut algorithm = Algorithm::from(SimulatedAnnealing {
        iterations: 100,
        ..SimulatedAnnealing::default()
    });
    algorithm.set_seed(1234);
    let a = run(&ring(), &["x"], &[], 2, "g", &mut algorithm).unwrap();
    let b = run(&ring(), &["x"], &[], 2, "g", &mut algorithm).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_errors() {
    let mut algorithm = Algorithm::from(TabuSearch::default());
    assert_eq!(
        run(&ring(), &[], &[], 2, "g", &mut algorithm).unwrap_err(),
        Error::Configuration
    );
    for k in [0, 7] {
        assert_eq!(
            run(&ring(), &["x"], &[], k, "g", &mut algorithm).unwrap_err(),
            Error::InfeasibleGroupCount {
                group_count: k,
                element_count: 6
            }
        );
    }
    assert_eq!(
        run(&ring(), &["z"], &[], 2, "g", &mut algorithm).unwrap_err(),
        Error::UnknownColumn {
            name: String::from("z")
        }
    );
    let table = ring()
        .with_column("c", Column::Categorical(vec![String::from("a"); 6]))
        .unwrap();
    assert_eq!(
        run(&table, &["c"], &[], 2, "g", &mut algorithm).unwrap_err(),
        Error::ColumnType {
            name: String::from("c")
        }
    );
}
