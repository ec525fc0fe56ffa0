use anticlust::Algorithm;
use anticlust::Column;
use anticlust::Table;
use anyhow::Context as _;
use anyhow::Result;
use std::io;

fn usize_arg(arg: Option<&str>) -> Option<Result<usize>> {
    arg.map(|arg| {
        arg.parse::<usize>()
            .with_context(|| format!("arg {:?} is not a valid unsigned integer", arg))
    })
}

fn f64_arg(arg: Option<&str>) -> Option<Result<f64>> {
    arg.map(|arg| {
        let f = arg
            .parse::<f64>()
            .with_context(|| format!("arg {:?} is not a valid float", arg))?;
        if !f.is_finite() {
            anyhow::bail!("arg {:?} is not finite", arg);
        }
        Ok(f)
    })
}

fn optional<T>(maybe_arg: Option<Result<T>>, default: T) -> Result<T> {
    Ok(maybe_arg.transpose()?.unwrap_or(default))
}

/// Parses an algorithm definition of the form `name,arg1,arg2...`.
///
/// Missing trailing arguments keep their default value.
pub fn parse_algorithm(spec: &str) -> Result<Algorithm> {
    let mut args = spec.split(',');
    let name = args.next().context("empty algorithm spec")?;

    let algorithm = match name {
        "random" => {
            let default = anticlust::NaiveRandom::default();
            Algorithm::NaiveRandom(anticlust::NaiveRandom {
                iterations: optional(usize_arg(args.next()), default.iterations)?,
                ..default
            })
        }
        "exchange" => {
            let default = anticlust::Exchange::default();
            Algorithm::Exchange(anticlust::Exchange {
                passes: optional(usize_arg(args.next()), default.passes)?,
                ..default
            })
        }
        "sa" => {
            let default = anticlust::SimulatedAnnealing::default();
            let alpha = optional(f64_arg(args.next()), default.alpha)?;
            if !(0.0 < alpha && alpha < 1.0) {
                anyhow::bail!("expected alpha to be between 0 and 1");
            }
            let iterations = optional(usize_arg(args.next()), default.iterations)?;
            let starting_temperature =
                optional(f64_arg(args.next()), default.starting_temperature)?;
            if starting_temperature <= 0.0 {
                anyhow::bail!("expected the starting temperature to be strictly positive");
            }
            Algorithm::SimulatedAnnealing(anticlust::SimulatedAnnealing {
                alpha,
                iterations,
                starting_temperature,
                restarts: optional(usize_arg(args.next()), default.restarts)?,
                ..default
            })
        }
        "tabu" => {
            let default = anticlust::TabuSearch::default();
            Algorithm::TabuSearch(anticlust::TabuSearch {
                tabu_tenure: optional(usize_arg(args.next()), default.tabu_tenure)?,
                iterations: optional(usize_arg(args.next()), default.iterations)?,
                restarts: optional(usize_arg(args.next()), default.restarts)?,
                ..default
            })
        }
        "exact" => {
            let default = anticlust::Exact::default();
            Algorithm::Exact(anticlust::Exact {
                max_nodes: optional(usize_arg(args.next()), default.max_nodes)?,
                ..default
            })
        }
        _ => anyhow::bail!("unknown algorithm {:?}", name),
    };

    if let Some(extra) = args.next() {
        anyhow::bail!("unexpected argument {:?}", extra);
    }
    Ok(algorithm)
}

/// Reads a CSV data set with a header row.
///
/// Columns listed in `numeric_columns` are parsed as floats, every other
/// column is kept as text.
pub fn read_table<R>(r: R, numeric_columns: &[&str]) -> Result<Table>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(r);
    let headers: Vec<String> = reader
        .headers()
        .context("failed to read header")?
        .iter()
        .map(str::to_owned)
        .collect();
    for name in numeric_columns {
        if !headers.iter().any(|header| header == name) {
            anyhow::bail!("unknown column {:?}", name);
        }
    }

    let mut fields: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to read row {}", row + 1))?;
        for (values, field) in fields.iter_mut().zip(record.iter()) {
            values.push(field.to_owned());
        }
    }

    let mut table = Table::new();
    for (name, values) in headers.into_iter().zip(fields) {
        let column = if numeric_columns.contains(&name.as_str()) {
            let numbers = values
                .iter()
                .enumerate()
                .map(|(row, value)| {
                    value.trim().parse::<f64>().with_context(|| {
                        format!("row {}, column {:?}: {:?} is not a number", row + 1, name, value)
                    })
                })
                .collect::<Result<_>>()?;
            Column::Numeric(numbers)
        } else {
            Column::Categorical(values)
        };
        table.insert(name, column)?;
    }
    Ok(table)
}

/// Writes a data set as CSV, with a header row.
pub fn write_table<W>(w: W, table: &Table) -> Result<()>
where
    W: io::Write,
{
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(table.column_names())?;
    let columns: Vec<&Column> = table.columns().map(|(_, column)| column).collect();
    for row in 0..table.row_count() {
        writer.write_record(columns.iter().map(|column| column.display(row)))?;
    }
    writer.flush()?;
    Ok(())
}
