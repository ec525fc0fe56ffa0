use anticlust::Balance;
use anticlust::Column;
use anticlust::DistanceMatrix;
use anticlust::Solve as _;
use anyhow::Context as _;
use anyhow::Result;
use std::env;
use std::fs;
use std::io;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::Registry;
use tracing_tree::HierarchicalLayer;

const USAGE: &str = "Usage: anticlust [options] [in.csv] >out.csv";

const ALGORITHMS: &str = "
ALGORITHMS:
    random[,ITERATIONS]
        Keep the best of ITERATIONS random partitions (default: 1000).
    exchange[,PASSES]
        Swap each element with its best partner, PASSES times (default: 1).
    sa[,ALPHA[,ITERATIONS[,TEMPERATURE[,RESTARTS]]]]
        Simulated annealing (default: 0.9,2000,100,9).
    tabu[,TENURE[,ITERATIONS[,RESTARTS]]]
        Tabu search (default: 10,2000,9).
    exact[,MAX_NODES]
        Branch-and-bound, for small data sets (default: 50000000).

When several algorithms are given, the best result is kept.
";

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    options.optflag("h", "help", "print this help menu");
    options.optmulti(
        "a",
        "algorithm",
        "algorithm to run, see ALGORITHMS (default: sa)",
        "SPEC",
    );
    options.optopt("k", "groups", "number of groups", "COUNT");
    options.optmulti("n", "numeric", "numeric feature column", "NAME");
    options.optmulti("c", "categorical", "categorical feature column", "NAME");
    options.optopt(
        "d",
        "destination",
        "name of the label column (default: Group)",
        "NAME",
    );
    options.optopt("s", "seed", "random seed (default: 0)", "SEED");
    options.optflag("", "relaxed", "only require groups to be non-empty");
    options.optopt("t", "trace", "emit a chrome trace", "FILE");
    options.optflag("v", "verbose", "print diagnostic data");

    let matches = options.parse(env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(USAGE));
        eprint!("{ALGORITHMS}");
        return Ok(());
    }

    let registry = Registry::default().with(EnvFilter::from_env("LOG")).with(
        HierarchicalLayer::new(4)
            .with_thread_ids(true)
            .with_targets(true)
            .with_bracketed_fields(true),
    );
    let _chrome_trace_guard = match matches.opt_str("t") {
        Some(filename) => {
            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
                .file(filename)
                .build();
            registry.with(chrome_layer).init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    };

    let group_count: usize = matches
        .opt_get("k")?
        .context("missing required option 'groups'")?;
    let seed: u64 = matches.opt_get_default("s", 0)?;
    let balance = if matches.opt_present("relaxed") {
        Balance::Relaxed
    } else {
        Balance::Strict
    };
    let destination = matches
        .opt_str("d")
        .unwrap_or_else(|| String::from("Group"));
    let numeric = matches.opt_strs("n");
    let categorical = matches.opt_strs("c");
    let numeric: Vec<&str> = numeric.iter().map(String::as_str).collect();
    let categorical: Vec<&str> = categorical.iter().map(String::as_str).collect();

    let mut algorithm_specs = matches.opt_strs("a");
    if algorithm_specs.is_empty() {
        algorithm_specs.push(String::from("sa"));
    }
    let algorithms: Vec<_> = algorithm_specs
        .iter()
        .map(|algorithm_spec| {
            anticlust_tools::parse_algorithm(algorithm_spec)
                .with_context(|| format!("invalid algorithm {:?}", algorithm_spec))
        })
        .collect::<Result<_>>()?;

    let table = match matches.free.first() {
        Some(filename) => {
            let file = fs::File::open(filename).context("failed to open data set")?;
            anticlust_tools::read_table(io::BufReader::new(file), &numeric)
        }
        None => anticlust_tools::read_table(io::stdin().lock(), &numeric),
    }
    .context("failed to read data set")?;

    let distances = DistanceMatrix::from_table(&table, &numeric, &categorical)
        .context("failed to compute distances")?;

    let show_metadata = matches.opt_present("v");
    let mut best = None;

    for (algorithm_spec, mut algorithm) in algorithm_specs.iter().zip(algorithms) {
        algorithm.set_seed(seed);
        algorithm.set_balance(balance);
        let (assignment, metadata) = algorithm
            .solve(&distances, group_count)
            .with_context(|| format!("failed to apply algorithm {:?}", algorithm_spec))?;
        if show_metadata {
            eprintln!("{algorithm_spec}: {metadata:?}");
        }
        let improves = match &best {
            Some((_, best_objective)) => *best_objective < metadata.objective,
            None => true,
        };
        if improves {
            tracing::info!(algorithm = %algorithm_spec, objective = metadata.objective, "new best");
            best = Some((assignment, metadata.objective));
        }
    }

    let (assignment, _) = best.context("no algorithm was run")?;
    let labels = anticlust::labels::canonical_labels(&assignment, &table, &numeric, &categorical)
        .context("failed to compute labels")?;
    let mut table = table;
    table.insert(
        destination,
        Column::Integer(labels.into_iter().map(|label| label as i64).collect()),
    )?;

    let stdout = io::stdout();
    let stdout = stdout.lock();
    let stdout = io::BufWriter::new(stdout);
    anticlust_tools::write_table(stdout, &table).context("failed to print data set")?;

    Ok(())
}
