//! In-memory tabular data sets and feature preprocessing.
//!
//! A [`Table`] is an ordered list of named, equally long columns.  Rows are the
//! elements to anti-cluster.

use crate::Error;
use itertools::Itertools as _;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// A named column of a [`Table`].
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Integer(Vec<i64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Integer(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The values of the column as floats, if it holds numbers.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Numeric(v) => Some(v.clone()),
            Column::Integer(v) => Some(v.iter().map(|i| *i as f64).collect()),
            Column::Categorical(_) => None,
        }
    }

    /// Integer codes of the column values, numbered in order of first
    /// occurrence.
    pub fn factorize(&self) -> Vec<usize> {
        match self {
            // Zeros of either sign are the same value.
            Column::Numeric(v) => factorize(v.iter().map(|f| (f + 0.0).to_bits())),
            Column::Integer(v) => factorize(v.iter().copied()),
            Column::Categorical(v) => factorize(v.iter()),
        }
    }

    fn cmp_rows(&self, a: usize, b: usize) -> Ordering {
        match self {
            Column::Numeric(v) => v[a].total_cmp(&v[b]),
            Column::Integer(v) => v[a].cmp(&v[b]),
            Column::Categorical(v) => v[a].cmp(&v[b]),
        }
    }

    /// Renders the value at `row` as text.
    pub fn display(&self, row: usize) -> String {
        match self {
            Column::Numeric(v) => v[row].to_string(),
            Column::Integer(v) => v[row].to_string(),
            Column::Categorical(v) => v[row].clone(),
        }
    }
}

/// A data set with named columns.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), anticlust::Error> {
/// use anticlust::{Column, Table};
///
/// let table = Table::new()
///     .with_column("x", Column::Numeric(vec![0.0, 2.0, 3.0]))?
///     .with_column("c", Column::Categorical(vec!["a".into(), "b".into(), "a".into()]))?;
///
/// assert_eq!(table.row_count(), 3);
/// assert_eq!(table.column("c")?.factorize(), [0, 1, 0]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Table {
        Table::default()
    }

    /// Builder form of [`Table::insert`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Table, Error> {
        self.insert(name, column)?;
        Ok(self)
    }

    /// Adds a column at the end of the table, or replaces the column of the
    /// same name in place.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<(), Error> {
        let name = name.into();
        let position = self.names.iter().position(|n| *n == name);
        let others = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != position)
            .map(|(_, c)| c.len())
            .next();
        if let Some(expected) = others {
            if expected != column.len() {
                return Err(Error::InputLenMismatch {
                    expected,
                    actual: column.len(),
                });
            }
        }
        match position {
            Some(i) => self.columns[i] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.names.iter().map(String::as_str).zip(&self.columns)
    }

    pub fn column(&self, name: &str) -> Result<&Column, Error> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| Error::UnknownColumn {
                name: name.to_owned(),
            })
    }

    /// The values of a numeric or integer column as floats.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>, Error> {
        self.column(name)?.to_f64().ok_or_else(|| Error::ColumnType {
            name: name.to_owned(),
        })
    }

    /// Row indices stably sorted by the given columns, in order.
    ///
    /// Numbers compare with [`f64::total_cmp`], categories lexicographically.
    /// Rows that compare equal on every key keep their relative order.
    pub fn sorted_rows(&self, keys: &[&str]) -> Result<Vec<usize>, Error> {
        let keys: Vec<&Column> = keys
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_, _>>()?;
        let mut rows: Vec<usize> = (0..self.row_count()).collect();
        rows.sort_by(|a, b| {
            keys.iter()
                .map(|column| column.cmp_rows(*a, *b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(rows)
    }
}

/// Scales values linearly so that they span `[0, 1]`.
///
/// Constant inputs are mapped to zero.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let (min, max) = match values.iter().copied().minmax().into_option() {
        Some(bounds) => bounds,
        None => return Vec::new(),
    };
    let range = max - min;
    if range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}

/// Replaces values by integer codes, numbered in order of first occurrence.
pub fn factorize<T, I>(values: I) -> Vec<usize>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash,
{
    let mut codes = HashMap::new();
    values
        .into_iter()
        .map(|value| {
            let next = codes.len();
            *codes.entry(value).or_insert(next)
        })
        .collect()
}
