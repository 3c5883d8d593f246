//! Observation datasets.
//!
//! A dataset is the raw evidence a network is fitted from: one named column
//! per variable, one row per observation. Datasets are never mutated once
//! built; graphs share them behind an `Arc`.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use causetable_foundation::{Error, Result, Value};

/// Immutable rectangular table of discrete observations.
///
/// Decoding goes through [`Dataset::from_rows`], so a deserialized dataset
/// upholds the same shape invariants as one built in memory.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawDataset")
)]
pub struct Dataset {
    /// Column names in declaration order.
    columns: Vec<Arc<str>>,
    /// Row-major cell storage; every row has `columns.len()` cells.
    rows: Vec<Vec<Value>>,
}

/// Unchecked wire form of a [`Dataset`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawDataset {
    columns: Vec<Arc<str>>,
    rows: Vec<Vec<Value>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawDataset> for Dataset {
    type Error = Error;

    fn try_from(raw: RawDataset) -> Result<Self> {
        Self::from_rows(raw.columns, raw.rows)
    }
}

impl Dataset {
    /// Builds a dataset from `(name, values)` column pairs.
    ///
    /// # Errors
    ///
    /// Returns a shape error if column names repeat or the columns have
    /// different lengths.
    pub fn from_columns<I, K, C, V>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut names = Vec::new();
        let mut data: Vec<Vec<Value>> = Vec::new();
        for (name, values) in columns {
            names.push(Arc::from(name.as_ref()));
            data.push(values.into_iter().map(Into::into).collect());
        }
        check_unique(&names)?;

        let height = data.first().map_or(0, Vec::len);
        if let Some((idx, _)) = data.iter().enumerate().find(|(_, c)| c.len() != height) {
            return Err(Error::shape(format!(
                "column {} has {} values, expected {height}",
                names[idx],
                data[idx].len()
            )));
        }

        let mut columns_iter: Vec<_> = data.into_iter().map(Vec::into_iter).collect();
        let rows = (0..height)
            .map(|_| {
                columns_iter
                    .iter_mut()
                    .filter_map(Iterator::next)
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(Self {
            columns: names,
            rows,
        })
    }

    /// Builds a dataset from column names and row-major values.
    ///
    /// # Errors
    ///
    /// Returns a shape error if column names repeat or a row has the wrong
    /// number of cells.
    pub fn from_rows<N, S, R>(columns: N, rows: R) -> Result<Self>
    where
        N: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        let columns: Vec<Arc<str>> = columns.into_iter().map(|c| Arc::from(c.as_ref())).collect();
        check_unique(&columns)?;

        let mut data = Vec::new();
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::shape(format!(
                    "row {idx} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
            data.push(row);
        }

        Ok(Self {
            columns,
            rows: data,
        })
    }

    /// Returns the column names in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Arc<str>] {
        &self.columns
    }

    /// Returns the column names as string slices.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(AsRef::as_ref)
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Checks whether a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.as_ref() == name)
    }

    /// Returns the position of a column.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the column does not exist.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.as_ref() == name)
            .ok_or_else(|| Error::unknown_variable(name))
    }

    /// Returns the values of one column in row order.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the column does not exist.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Returns the distinct observed values of a column.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the column does not exist.
    pub fn values_for(&self, name: &str) -> Result<BTreeSet<Value>> {
        Ok(self.column(name)?.cloned().collect())
    }

    /// Iterates over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Returns a single row.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Counts observations per distinct combination of the given columns.
    ///
    /// Keys hold the values in the order the columns were requested. An
    /// empty column list yields a single empty key holding the row count
    /// (or no key at all for an empty dataset).
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if any column does not exist.
    pub fn count_by<S: AsRef<str>>(&self, columns: &[S]) -> Result<BTreeMap<Vec<Value>, usize>> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut counts = BTreeMap::new();
        for row in &self.rows {
            let key: Vec<Value> = indices.iter().map(|&i| row[i].clone()).collect();
            *counts.entry(key).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Returns a dataset restricted to the given columns, in that order.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if any column does not exist, or a
    /// shape error if a column is requested twice.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let names: Vec<Arc<str>> = indices.iter().map(|&i| self.columns[i].clone()).collect();
        check_unique(&names)?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Self {
            columns: names,
            rows,
        })
    }
}

fn check_unique(names: &[Arc<str>]) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_ref()) {
            return Err(Error::shape(format!("duplicate column name: {name}")));
        }
    }
    Ok(())
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<&str> = self.column_names().collect();
        writeln!(f, "{}", header.join("\t"))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}
