use anticlust::stats;
use anyhow::Context as _;
use anyhow::Result;
use itertools::Itertools as _;
use std::env;
use std::fs;
use std::io;

const USAGE: &str = "Usage: group-info [options] [in.csv]";

fn main() -> Result<()> {
    let mut options = getopts::Options::new();
    options.optflag("h", "help", "print this help menu");
    options.optopt("g", "group", "label column (default: Group)", "NAME");
    options.optmulti("n", "numeric", "numeric feature column", "NAME");

    let matches = options.parse(env::args().skip(1))?;

    if matches.opt_present("h") {
        eprintln!("{}", options.usage(USAGE));
        return Ok(());
    }

    let group_column = matches
        .opt_str("g")
        .unwrap_or_else(|| String::from("Group"));
    let numeric = matches.opt_strs("n");
    let numeric: Vec<&str> = numeric.iter().map(String::as_str).collect();
    if numeric.is_empty() {
        anyhow::bail!("missing required option 'numeric'");
    }

    let table = match matches.free.first() {
        Some(filename) => {
            let file = fs::File::open(filename).context("failed to open data set")?;
            anticlust_tools::read_table(io::BufReader::new(file), &numeric)
        }
        None => anticlust_tools::read_table(io::stdin().lock(), &numeric),
    }
    .context("failed to read data set")?;

    let groups = table.column(&group_column)?;
    let labels = groups.factorize();
    let names: Vec<String> = labels
        .iter()
        .enumerate()
        .unique_by(|(_, label)| **label)
        .map(|(row, _)| groups.display(row))
        .collect();

    let stats = stats::group_stats(&table, &labels, &numeric)?;
    for column in &stats {
        println!("{}:", column.column);
        for (name, group) in names.iter().zip(&column.groups) {
            println!(
                "  {group_column} {name}: mean {:.6}, std dev {:.6}",
                group.mean, group.std_dev
            );
        }
    }

    let report = stats::balance_report(&stats);
    println!("∆M: {:.6}", report.mean_spread);
    println!("∆SD: {:.6}", report.std_dev_spread);

    Ok(())
}
