//! Probability tables.
//!
//! A [`ProbabilityTable`] is a discrete (joint or conditional) distribution in
//! tabular form: an ordered list of variable columns and, per row, one
//! combination of values with its probability mass.
//!
//! Tables are kept canonical: every constructor merges duplicate value
//! combinations (summing their mass) and stores rows sorted by value, so two
//! tables built from the same facts compare equal row by row.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use causetable_foundation::{Error, ErrorKind, Result, Value};

/// One row of a probability table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRow {
    /// Values, aligned with the table's columns.
    pub values: Vec<Value>,
    /// Probability mass of this combination.
    pub prob: f64,
}

/// Named discrete variable columns plus one probability column.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawTable")
)]
pub struct ProbabilityTable {
    /// Variable columns (the probability column is implicit).
    columns: Vec<Arc<str>>,
    /// Canonical rows: unique value combinations sorted by value.
    rows: Vec<TableRow>,
}

/// Unchecked wire form of a [`ProbabilityTable`]; decoding re-canonicalizes.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTable {
    columns: Vec<Arc<str>>,
    rows: Vec<TableRow>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTable> for ProbabilityTable {
    type Error = Error;

    fn try_from(raw: RawTable) -> Result<Self> {
        Self::from_rows(raw.columns, raw.rows.into_iter().map(|r| (r.values, r.prob)))
    }
}

impl ProbabilityTable {
    /// Builds a table from column names and `(values, prob)` rows.
    ///
    /// Duplicate value combinations are merged by summing their mass.
    ///
    /// # Errors
    ///
    /// Returns a shape error if column names repeat, a row has the wrong
    /// width, or a probability is negative or not finite.
    pub fn from_rows<N, S, R>(columns: N, rows: R) -> Result<Self>
    where
        N: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
        R: IntoIterator<Item = (Vec<Value>, f64)>,
    {
        let columns: Vec<Arc<str>> = columns.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        for c in &columns {
            if c.as_ref() == "prob" {
                return Err(Error::shape("`prob` is reserved for the probability column"));
            }
            if !seen.insert(c.clone()) {
                return Err(Error::shape(format!("duplicate column name: {c}")));
            }
        }

        let mut merged: BTreeMap<Vec<Value>, f64> = BTreeMap::new();
        for (values, prob) in rows {
            if values.len() != columns.len() {
                return Err(Error::shape(format!(
                    "row has {} values, expected {}",
                    values.len(),
                    columns.len()
                )));
            }
            if !prob.is_finite() || prob < 0.0 {
                return Err(Error::shape(format!("invalid probability mass {prob}")));
            }
            *merged.entry(values).or_insert(0.0) += prob;
        }

        Ok(Self::from_canonical(columns, merged))
    }

    /// The table with no columns and a single row of mass 1.
    ///
    /// This is the identity for [`ProbabilityTable::join`].
    #[must_use]
    pub fn unit() -> Self {
        Self {
            columns: Vec::new(),
            rows: vec![TableRow {
                values: Vec::new(),
                prob: 1.0,
            }],
        }
    }

    fn from_canonical(columns: Vec<Arc<str>>, merged: BTreeMap<Vec<Value>, f64>) -> Self {
        let rows = merged
            .into_iter()
            .map(|(values, prob)| TableRow { values, prob })
            .collect();
        Self { columns, rows }
    }

    /// Returns the variable columns.
    #[must_use]
    pub fn columns(&self) -> &[Arc<str>] {
        &self.columns
    }

    /// Returns the variable column names as string slices.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(AsRef::as_ref)
    }

    /// Checks whether a variable column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.as_ref() == name)
    }

    /// Returns the position of a variable column.
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

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the total probability mass.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.prob).sum()
    }

    /// Sums the mass of every row matching all of the given assignments.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if an assignment names a missing
    /// column.
    pub fn prob_where(&self, assignment: &[(&str, Value)]) -> Result<f64> {
        let checks = assignment
            .iter()
            .map(|(name, value)| Ok((self.column_index(name)?, value)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .rows
            .iter()
            .filter(|row| checks.iter().all(|(i, v)| &row.values[*i] == *v))
            .map(|row| row.prob)
            .sum())
    }

    /// Rescales the mass so it sums to one.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ZeroSupport`] if the table carries no mass.
    pub fn normalized(&self) -> Result<Self> {
        self.normalized_above(0.0)
    }

    /// Rescales the mass so it sums to one, treating any total at or below
    /// `epsilon` as zero.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ZeroSupport`] if the total mass is at or below
    /// `epsilon`.
    pub fn normalized_above(&self, epsilon: f64) -> Result<Self> {
        let total = self.total();
        if !total.is_finite() || total <= epsilon {
            return Err(Error::new(ErrorKind::ZeroSupport));
        }
        Ok(Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|r| TableRow {
                    values: r.values.clone(),
                    prob: r.prob / total,
                })
                .collect(),
        })
    }

    /// Keeps only the rows where `column == value`.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the column does not exist.
    pub fn filter_eq(&self, column: &str, value: &Value) -> Result<Self> {
        let idx = self.column_index(column)?;
        Ok(Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| &r.values[idx] == value)
                .cloned()
                .collect(),
        })
    }

    /// Projects onto the given columns, summing the mass of merged rows.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if a column does not exist, or a
    /// shape error if one is requested twice.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let names: Vec<Arc<str>> = indices.iter().map(|&i| self.columns[i].clone()).collect();
        Self::from_rows(
            names,
            self.rows.iter().map(|r| {
                (
                    indices.iter().map(|&i| r.values[i].clone()).collect(),
                    r.prob,
                )
            }),
        )
    }

    /// Returns the marginal distribution of a single column.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the column does not exist.
    pub fn distribution(&self, column: &str) -> Result<BTreeMap<Value, f64>> {
        let idx = self.column_index(column)?;
        let mut out = BTreeMap::new();
        for row in &self.rows {
            *out.entry(row.values[idx].clone()).or_insert(0.0) += row.prob;
        }
        Ok(out)
    }

    /// Returns the distinct values a column takes.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the column does not exist.
    pub fn distinct_values(&self, column: &str) -> Result<BTreeSet<Value>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| r.values[idx].clone()).collect())
    }

    /// Returns the columns both tables carry, in this table's order.
    #[must_use]
    pub fn shared_columns(&self, other: &Self) -> Vec<Arc<str>> {
        self.columns
            .iter()
            .filter(|c| other.has_column(c))
            .cloned()
            .collect()
    }

    /// Joins two tables and multiplies their mass.
    ///
    /// Rows are matched on the shared columns (inner join); with no shared
    /// columns this is the outer product. The result carries this table's
    /// columns followed by the other table's remaining columns. The product
    /// is not renormalized.
    ///
    /// # Errors
    ///
    /// Only fails on internal inconsistencies.
    pub fn join(&self, other: &Self) -> Result<Self> {
        let shared = self.shared_columns(other);
        let left_keys = shared
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>>>()?;
        let right_keys = shared
            .iter()
            .map(|c| other.column_index(c))
            .collect::<Result<Vec<_>>>()?;
        let right_extra: Vec<usize> = (0..other.columns.len())
            .filter(|i| !right_keys.contains(i))
            .collect();

        let mut index: HashMap<Vec<&Value>, Vec<&TableRow>> = HashMap::new();
        for row in &other.rows {
            let key = right_keys.iter().map(|&i| &row.values[i]).collect();
            index.entry(key).or_default().push(row);
        }

        let mut columns = self.columns.clone();
        columns.extend(right_extra.iter().map(|&i| other.columns[i].clone()));

        let mut merged = BTreeMap::new();
        for left in &self.rows {
            let key: Vec<&Value> = left_keys.iter().map(|&i| &left.values[i]).collect();
            let Some(matches) = index.get(&key) else {
                continue;
            };
            for right in matches {
                let mut values = left.values.clone();
                values.extend(right_extra.iter().map(|&i| right.values[i].clone()));
                *merged.entry(values).or_insert(0.0) += left.prob * right.prob;
            }
        }

        Ok(Self::from_canonical(columns, merged))
    }

    /// Adds a new column, repeating every row once per value.
    ///
    /// Mass is carried over unchanged, so the expanded table is not a
    /// distribution until it is joined and renormalized.
    ///
    /// # Errors
    ///
    /// Returns a shape error if the column already exists.
    pub fn expand<'v, I>(&self, column: impl Into<Arc<str>>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'v Value>,
    {
        let column = column.into();
        if self.has_column(&column) {
            return Err(Error::shape(format!("column {column} already present")));
        }
        let values: Vec<&Value> = values.into_iter().collect();
        let mut columns = self.columns.clone();
        columns.push(column);
        Self::from_rows(
            columns,
            self.rows.iter().flat_map(|row| {
                values.iter().map(move |v| {
                    let mut extended = row.values.clone();
                    extended.push((*v).clone());
                    (extended, row.prob)
                })
            }),
        )
    }

    /// Compares two tables regardless of column order.
    ///
    /// Rows present in only one table must carry at most `tolerance` mass.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if self.columns.len() != other.columns.len() {
            return false;
        }
        let Ok(aligned) = other.project(&self.columns) else {
            return false;
        };
        let mine: BTreeMap<&Vec<Value>, f64> =
            self.rows.iter().map(|r| (&r.values, r.prob)).collect();
        let theirs: BTreeMap<&Vec<Value>, f64> =
            aligned.rows.iter().map(|r| (&r.values, r.prob)).collect();
        let keys: BTreeSet<&&Vec<Value>> = mine.keys().chain(theirs.keys()).collect();
        keys.into_iter().all(|k| {
            let a = mine.get(*k).copied().unwrap_or(0.0);
            let b = theirs.get(*k).copied().unwrap_or(0.0);
            (a - b).abs() <= tolerance
        })
    }
}

impl fmt::Display for ProbabilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.columns {
            write!(f, "{c}\t")?;
        }
        writeln!(f, "prob")?;
        for row in &self.rows {
            for v in &row.values {
                write!(f, "{v}\t")?;
            }
            writeln!(f, "{:.6}", row.prob)?;
        }
        Ok(())
    }
}
