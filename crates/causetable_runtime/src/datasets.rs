//! Built-in datasets for demos, tests, and benchmarks, plus discretization
//! of continuous columns.

use causetable_foundation::{Error, Result, Value};
use causetable_storage::Dataset;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Settings for [`make_fake_dataset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakeDatasetConfig {
    /// Number of columns, named `a`, `b`, `c`, ...
    pub nodes: usize,
    /// Number of observations.
    pub rows: usize,
    /// Each cell is drawn uniformly from `0..values`.
    pub values: i64,
    /// Random seed.
    pub seed: u64,
}

impl Default for FakeDatasetConfig {
    fn default() -> Self {
        Self {
            nodes: 6,
            rows: 100,
            values: 2,
            seed: 42,
        }
    }
}

impl FakeDatasetConfig {
    /// Builder method to set the number of columns.
    #[must_use]
    pub fn with_nodes(mut self, nodes: usize) -> Self {
        self.nodes = nodes;
        self
    }

    /// Builder method to set the number of observations.
    #[must_use]
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Builder method to set the number of distinct values per column.
    #[must_use]
    pub fn with_values(mut self, values: i64) -> Self {
        self.values = values;
        self
    }

    /// Builder method to set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Generates uniformly random integer observations.
///
/// The same configuration always yields the same dataset.
///
/// # Errors
///
/// Returns a shape error if more than 26 columns are requested or
/// `values` is not positive.
pub fn make_fake_dataset(config: &FakeDatasetConfig) -> Result<Dataset> {
    if config.nodes > 26 {
        return Err(Error::shape(format!(
            "at most 26 columns can be generated, got {}",
            config.nodes
        )));
    }
    if config.values < 1 {
        return Err(Error::shape("fake datasets need at least one value per column"));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let names: Vec<String> = ('a'..='z').take(config.nodes).map(String::from).collect();
    let rows: Vec<Vec<Value>> = (0..config.rows)
        .map(|_| {
            (0..config.nodes)
                .map(|_| Value::Int(rng.gen_range(0..config.values)))
                .collect()
        })
        .collect();
    Dataset::from_rows(&names, rows)
}

const GRADES: [&str; 3] = ["good", "pass", "fail"];
const STUDY: [&str; 3] = ["lots", "little", "no"];
const HARD: [&str; 2] = ["yes", "no"];

/// Grade counts per 100 students, for each `(study, hard)` pair in order.
const GRADE_COUNTS: [[usize; 3]; 6] = [
    [60, 30, 10],
    [90, 9, 1],
    [30, 30, 40],
    [60, 20, 20],
    [10, 30, 60],
    [10, 50, 40],
];

/// Returns the study/exam dataset with columns `study`, `hard`, `grade`.
///
/// Six hundred students: for every study level and exam difficulty, one
/// hundred students whose grades follow a fixed distribution.
///
/// # Errors
///
/// Only fails on internal inconsistencies.
pub fn simple_study_dataset() -> Result<Dataset> {
    let pairs = STUDY
        .iter()
        .flat_map(|s| HARD.iter().map(move |h| (*s, *h)));
    let rows = pairs.zip(GRADE_COUNTS).flat_map(|((study, hard), counts)| {
        GRADES.iter().zip(counts).flat_map(move |(grade, n)| {
            std::iter::repeat_n(
                vec![Value::from(study), Value::from(hard), Value::from(*grade)],
                n,
            )
        })
    });
    Dataset::from_rows(["study", "hard", "grade"], rows)
}

/// Splits numeric values into `parts` equal-width bins labelled `1..=parts`.
///
/// Bins span `min..=max` of the values and include their right edge, so the
/// minimum lands in bin 1 and the maximum in bin `parts`. If every value is
/// the same they all land in the middle bin.
///
/// # Errors
///
/// Returns a shape error if `parts` is zero or a value is not a finite
/// number.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn quantize_column(values: &[Value], parts: usize) -> Result<Vec<Value>> {
    if parts == 0 {
        return Err(Error::shape("quantizing needs at least one part"));
    }
    let numbers = values
        .iter()
        .map(|v| {
            v.as_number()
                .filter(|n| n.is_finite())
                .ok_or_else(|| Error::shape(format!("cannot quantize {v:?}")))
        })
        .collect::<Result<Vec<f64>>>()?;

    let Some(lo) = numbers.iter().copied().reduce(f64::min) else {
        return Ok(Vec::new());
    };
    let hi = numbers.iter().copied().reduce(f64::max).unwrap_or(lo);
    let width = (hi - lo) / parts as f64;

    let label = |x: f64| {
        let bin = if hi > lo {
            (((x - lo) / width).ceil() as usize).clamp(1, parts)
        } else {
            parts.div_ceil(2)
        };
        Value::Int(bin as i64)
    };
    Ok(numbers.into_iter().map(label).collect())
}

/// Replaces a numeric column with its [`quantize_column`] bin labels.
///
/// # Errors
///
/// Returns an error if the column is missing or cannot be quantized.
pub fn quantize(data: &Dataset, column: &str, parts: usize) -> Result<Dataset> {
    let idx = data.column_index(column)?;
    let values: Vec<Value> = data.column(column)?.cloned().collect();
    let labels = quantize_column(&values, parts)?;
    let rows = data.rows().zip(labels).map(|(row, label)| {
        let mut row = row.to_vec();
        row[idx] = label;
        row
    });
    Dataset::from_rows(data.columns(), rows)
}
