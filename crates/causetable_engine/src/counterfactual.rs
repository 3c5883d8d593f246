//! Counterfactual ("suppose") queries.
//!
//! A [`SupposeQuery`] answers "having seen X, what if Y had been the case?".
//! The `when` query describes what was seen. Its posterior over every
//! variable it did not fix reweights the answer of the suppose query, and
//! the product is renormalized.

use std::sync::Arc;

use causetable_foundation::{Error, Result, Value};
use causetable_storage::{Dataset, ProbabilityTable};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::InferenceConfig;
use crate::dag::Dag;
use crate::query::{Assignment, Marginals, Query, extend_assignment, sample_table};

/// A counterfactual query: a base query plus hypothetical evidence and
/// interventions.
#[derive(Clone, Debug)]
pub struct SupposeQuery {
    dag: Dag,
    when: Option<Query>,
    given: Assignment,
    intervened: Assignment,
    config: InferenceConfig,
}

impl SupposeQuery {
    /// Creates a counterfactual query with no base query.
    #[must_use]
    pub fn new(dag: Dag) -> Self {
        Self {
            dag,
            when: None,
            given: Assignment::new(),
            intervened: Assignment::new(),
            config: InferenceConfig::default(),
        }
    }

    /// Replaces the inference configuration.
    #[must_use]
    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the base query, if set.
    #[must_use]
    pub fn base(&self) -> Option<&Query> {
        self.when.as_ref()
    }

    /// Returns the hypothetical evidence.
    #[must_use]
    pub fn suppose_givens(&self) -> &Assignment {
        &self.given
    }

    /// Returns the hypothetical interventions.
    #[must_use]
    pub fn suppose_interventions(&self) -> &Assignment {
        &self.intervened
    }

    fn is_fixed(&self, name: &str) -> bool {
        self.given.contains_key(name) || self.intervened.contains_key(name)
    }

    /// Sets what was observed.
    ///
    /// # Errors
    ///
    /// Returns a state error if a base query is already set.
    pub fn when(&self, query: Query) -> Result<Self> {
        if self.when.is_some() {
            return Err(Error::state("counterfactual query already has a `when` query"));
        }
        Ok(Self {
            when: Some(query),
            ..self.clone()
        })
    }

    /// Adds hypothetical evidence.
    ///
    /// # Errors
    ///
    /// Same validation as [`Query::given`], with keys shared across the
    /// hypothetical evidence and interventions.
    pub fn suppose_given<I, K, V>(&self, pairs: I) -> Result<Self>
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

    /// Adds hypothetical interventions.
    ///
    /// # Errors
    ///
    /// Same validation as [`Query::intervene`], with keys shared across the
    /// hypothetical evidence and interventions.
    #[doc(alias = "suppose_do")]
    pub fn suppose_intervene<I, K, V>(&self, pairs: I) -> Result<Self>
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

    fn suppose_query(&self) -> Query {
        Query::from_parts(
            self.dag.clone(),
            self.given.clone(),
            self.intervened.clone(),
            self.config.clone(),
        )
    }

    /// Returns the graph with every edge into a hypothetically intervened
    /// variable cut.
    ///
    /// # Errors
    ///
    /// Propagates errors from recomputing cached node tables.
    pub fn inference_dag(&self) -> Result<Dag> {
        self.suppose_query().inference_dag()
    }

    /// Returns the normalized counterfactual joint table.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No base query was set
    /// - The base query fails (reported with a `when query` frame)
    /// - The reweighted table carries no mass
    pub fn infer_table(&self) -> Result<ProbabilityTable> {
        let base = self
            .when
            .as_ref()
            .ok_or_else(|| Error::state("counterfactual query needs a `when` query"))?;
        let posterior = base
            .infer_table()
            .map_err(|e| e.with_frame("when query"))?;

        let free: Vec<Arc<str>> = posterior
            .columns()
            .iter()
            .filter(|c| !base.is_fixed(c))
            .cloned()
            .collect();
        let weights = posterior.project(&free)?;

        let supposed = self.suppose_query().infer_table()?;
        let table = supposed
            .join(&weights)?
            .normalized_above(self.config.support_epsilon)?;
        tracing::debug!(
            reweighted = free.len(),
            rows = table.len(),
            "counterfactual inferred"
        );
        Ok(table)
    }

    /// Returns the counterfactual marginal of every variable.
    ///
    /// # Errors
    ///
    /// See [`SupposeQuery::infer_table`].
    pub fn infer(&self) -> Result<Marginals> {
        Marginals::from_table(&self.infer_table()?)
    }

    /// Draws `n` rows from the counterfactual table.
    ///
    /// # Errors
    ///
    /// See [`SupposeQuery::infer_table`].
    pub fn sample(&self, n: usize) -> Result<Dataset> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        sample_table(&self.infer_table()?, n, &mut rng)
    }
}
