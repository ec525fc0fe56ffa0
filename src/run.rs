use crate::labels;
use crate::Column;
use crate::DistanceMatrix;
use crate::Error;
use crate::Solve;
use crate::Table;

/// Anti-clusters the rows of `table` and returns it with a label column.
///
/// Distances are computed from `numeric_columns` (min-max scaled) and
/// `categorical_columns`; at least one of them must be non-empty.  The
/// canonical labels, in `0..group_count`, are written to the `destination`
/// column, which replaces any existing column of that name.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), anticlust::Error> {
/// use anticlust::{Column, Table};
///
/// let table = Table::new()
///     .with_column("x", Column::Numeric(vec![0.0, 0.0, 2.0, 3.0, 3.0, 2.0]))?
///     .with_column("y", Column::Numeric(vec![1.0, 2.0, 2.0, 1.0, 0.0, 0.0]))?;
///
/// let (table, _) = anticlust::run(&table, &["x", "y"], &[], 3, "Group", anticlust::Exact::default())?;
///
/// assert_eq!(table.column("Group")?, &Column::Integer(vec![0, 1, 2, 0, 1, 2]));
/// # Ok(())
/// # }
/// ```
pub fn run<S>(
    table: &Table,
    numeric_columns: &[&str],
    categorical_columns: &[&str],
    group_count: usize,
    destination: &str,
    mut solver: S,
) -> Result<(Table, S::Metadata), Error>
where
    S: Solve,
{
    let span = tracing::info_span!("run", rows = table.row_count(), group_count);
    let _enter = span.enter();

    let distances = DistanceMatrix::from_table(table, numeric_columns, categorical_columns)?;
    let (assignment, metadata) = solver.solve(&distances, group_count)?;
    let labels =
        labels::canonical_labels(&assignment, table, numeric_columns, categorical_columns)?;

    let mut output = table.clone();
    output.insert(
        destination,
        Column::Integer(labels.into_iter().map(|label| label as i64).collect()),
    )?;
    Ok((output, metadata))
}
