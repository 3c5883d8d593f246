//! Observational and interventional queries.
//!
//! A [`Query`] couples a [`Dag`] with evidence (`given`) and interventions
//! (`do`, spelled [`Query::intervene`]). Evaluating it:
//!
//! 1. cuts every edge pointing into an intervened variable,
//! 2. builds the joint table of the cut graph,
//! 3. keeps the rows consistent with the interventions and the evidence,
//! 4. renormalizes.

use std::collections::BTreeMap;
use std::fmt;

use causetable_foundation::{Error, ErrorKind, Result, Value};
use causetable_storage::{Dataset, ProbabilityTable};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::InferenceConfig;
use crate::dag::Dag;

/// Variable assignments keyed by variable name.
pub type Assignment = BTreeMap<String, Value>;

/// Validates one `key = value` pair against a graph.
///
/// Checks, in order: the key is a node, the value occurs in that node's
/// observed domain, and `in_use` does not already claim the key.
pub(crate) fn check_assignment(
    dag: &Dag,
    key: &str,
    value: &Value,
    in_use: impl Fn(&str) -> bool,
) -> Result<()> {
    tracing::trace!(key = %key, value = %value, "checking query input");
    if !dag.has_node(key) {
        return Err(Error::unknown_variable(key));
    }
    if !dag.values_for_node(key)?.contains(value) {
        return Err(Error::unknown_value(key, value.clone()));
    }
    if in_use(key) {
        return Err(Error::duplicate_key(key));
    }
    Ok(())
}

/// Validates a batch of pairs and merges them into `target`.
pub(crate) fn extend_assignment<I, K, V>(
    dag: &Dag,
    target: &Assignment,
    pairs: I,
    in_use: impl Fn(&str) -> bool,
) -> Result<Assignment>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    let mut merged = target.clone();
    let mut added = Assignment::new();
    for (key, value) in pairs {
        let key = key.as_ref();
        let value = value.into();
        check_assignment(dag, key, &value, |k| in_use(k) || added.contains_key(k))?;
        added.insert(key.to_string(), value);
    }
    merged.extend(added);
    Ok(merged)
}

// =============================================================================
// Query
// =============================================================================

/// An immutable inference query against a [`Dag`].
///
/// Builders return new queries; the receiver is left untouched.
///
/// ```
/// use causetable_engine::{Dag, Query};
/// use causetable_storage::Dataset;
///
/// let data = Dataset::from_columns([
///     ("a", vec![1, 1, 1, 1, 0, 0, 0, 0]),
///     ("b", vec![0, 1, 0, 1, 1, 1, 1, 0]),
/// ])?;
/// let dag = Dag::new(data).add_edge("a", "b")?;
/// let marginals = Query::new(dag).given([("a", 0)])?.infer()?;
/// assert!((marginals.prob("b", &1.into()).unwrap_or(0.0) - 0.75).abs() < 1e-9);
/// # Ok::<(), causetable_foundation::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Query {
    dag: Dag,
    given: Assignment,
    intervened: Assignment,
    config: InferenceConfig,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new(dag: Dag) -> Self {
        Self {
            dag,
            given: Assignment::new(),
            intervened: Assignment::new(),
            config: InferenceConfig::default(),
        }
    }

    pub(crate) fn from_parts(
        dag: Dag,
        given: Assignment,
        intervened: Assignment,
        config: InferenceConfig,
    ) -> Self {
        Self {
            dag,
            given,
            intervened,
            config,
        }
    }

    /// Replaces the inference configuration.
    #[must_use]
    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the graph this query runs against.
    #[must_use]
    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Returns the observed evidence.
    #[must_use]
    pub fn givens(&self) -> &Assignment {
        &self.given
    }

    /// Returns the interventions.
    #[must_use]
    pub fn interventions(&self) -> &Assignment {
        &self.intervened
    }

    /// Returns the inference configuration.
    #[must_use]
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Checks whether a variable is fixed by evidence or an intervention.
    #[must_use]
    pub fn is_fixed(&self, name: &str) -> bool {
        self.given.contains_key(name) || self.intervened.contains_key(name)
    }

    /// Returns a query with extra observed evidence.
    ///
    /// # Errors
    ///
    /// Returns an error if a key is not a node, a value never occurs for its
    /// node, or a key is already used by this query or repeated in `pairs`.
    pub fn given<I, K, V>(&self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let given = extend_assignment(&self.dag, &self.given, pairs, |k| self.is_fixed(k))?;
        Ok(Self {
            given,
            ..self.clone()
        })
    }

    /// Returns a query with extra interventions (the `do` operator).
    ///
    /// # Errors
    ///
    /// Returns an error if a key is not a node, a value never occurs for its
    /// node, or a key is already used by this query or repeated in `pairs`.
    #[doc(alias = "do")]
    pub fn intervene<I, K, V>(&self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let intervened =
            extend_assignment(&self.dag, &self.intervened, pairs, |k| self.is_fixed(k))?;
        Ok(Self {
            intervened,
            ..self.clone()
        })
    }

    /// Returns the graph with every edge into an intervened variable cut.
    ///
    /// The base graph is never modified.
    ///
    /// # Errors
    ///
    /// Propagates errors from recomputing cached node tables.
    pub fn inference_dag(&self) -> Result<Dag> {
        self.intervened
            .keys()
            .try_fold(self.dag.clone(), |dag, node| dag.cut_incoming(node))
    }

    /// Returns the normalized joint table consistent with this query.
    ///
    /// # Errors
    ///
    /// Returns a zero support error if no observed combination agrees with
    /// the evidence and interventions.
    pub fn infer_table(&self) -> Result<ProbabilityTable> {
        let dag = self.inference_dag()?;
        let mut table = dag.marginal_table()?;
        for (key, value) in self.intervened.iter().chain(&self.given) {
            table = table.filter_eq(key, value)?;
        }
        let table = table.normalized_above(self.config.support_epsilon)?;
        tracing::debug!(
            given = self.given.len(),
            intervened = self.intervened.len(),
            rows = table.len(),
            "query inferred"
        );
        Ok(table)
    }

    /// Returns the marginal distribution of every variable under this query.
    ///
    /// # Errors
    ///
    /// Returns a zero support error if no observed combination agrees with
    /// the evidence and interventions.
    pub fn infer(&self) -> Result<Marginals> {
        Marginals::from_table(&self.infer_table()?)
    }

    /// Draws `n` rows from the inferred table, seeded from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn sample(&self, n: usize) -> Result<Dataset> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.sample_with_rng(n, &mut rng)
    }

    /// Draws `n` rows with replacement, weighted by probability, using the
    /// caller's RNG. The probability column is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn sample_with_rng<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Dataset> {
        let table = self.infer_table()?;
        sample_table(&table, n, rng)
    }
}

/// Draws `n` weighted rows from a normalized table.
pub(crate) fn sample_table<R: Rng + ?Sized>(
    table: &ProbabilityTable,
    n: usize,
    rng: &mut R,
) -> Result<Dataset> {
    let weights = WeightedIndex::new(table.rows().iter().map(|r| r.prob))
        .map_err(|e| Error::new(ErrorKind::Internal(format!("invalid sampling weights: {e}"))))?;
    let rows = (0..n).map(|_| table.rows()[weights.sample(rng)].values.clone());
    Dataset::from_rows(table.columns(), rows)
}

// =============================================================================
// Marginals
// =============================================================================

/// Per-variable marginal distributions: variable -> value -> probability.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Marginals {
    distributions: BTreeMap<String, BTreeMap<Value, f64>>,
}

impl Marginals {
    /// Sums a table down to one distribution per column.
    ///
    /// # Errors
    ///
    /// Only fails on internal inconsistencies.
    pub fn from_table(table: &ProbabilityTable) -> Result<Self> {
        let distributions = table
            .column_names()
            .map(|c| Ok((c.to_string(), table.distribution(c)?)))
            .collect::<Result<_>>()?;
        Ok(Self { distributions })
    }

    /// Returns the distribution of one variable.
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&BTreeMap<Value, f64>> {
        self.distributions.get(variable)
    }

    /// Returns the probability of `variable == value`.
    ///
    /// `None` if the variable is unknown or the value carries no mass.
    #[must_use]
    pub fn prob(&self, variable: &str, value: &Value) -> Option<f64> {
        self.get(variable)?.get(value).copied()
    }

    /// Returns the value with the highest probability for a variable.
    #[must_use]
    pub fn most_likely(&self, variable: &str) -> Option<&Value> {
        self.get(variable)?
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(value, _)| value)
    }

    /// Iterates over variables and their distributions.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<Value, f64>)> + '_ {
        self.distributions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    /// Returns true if there are no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}

impl fmt::Display for Marginals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (variable, dist) in &self.distributions {
            write!(f, "{variable}:")?;
            for (value, prob) in dist {
                write!(f, " {value}={prob:.4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
