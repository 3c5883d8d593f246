//! Predicting one variable of a causal graph from the others.

use std::collections::BTreeMap;

use causetable_engine::{Dag, Query};
use causetable_foundation::{Error, ErrorCategory, ErrorKind, Result, Value};
use causetable_storage::Dataset;

/// Distribution over the values of the predicted variable.
pub type Prediction = BTreeMap<Value, f64>;

/// Classifier that predicts `target` by conditioning a graph on every other
/// observed column.
#[derive(Clone, Debug)]
pub struct DagClassifier {
    dag: Dag,
    target: String,
}

impl DagClassifier {
    /// Creates a classifier over an existing graph.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if `target` is not a node.
    pub fn new(dag: Dag, target: impl Into<String>) -> Result<Self> {
        let target = target.into();
        if !dag.has_node(&target) {
            return Err(Error::unknown_variable(target));
        }
        Ok(Self { dag, target })
    }

    /// Returns the predicted variable.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the fitted graph.
    #[must_use]
    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Refits the same edges on new observations and bakes the result.
    ///
    /// # Errors
    ///
    /// Returns an unknown variable error if the observations lack a node of
    /// the graph.
    pub fn fit(&self, data: &Dataset) -> Result<Self> {
        let dag = self.dag.with_dataset(data.clone())?.bake()?;
        tracing::debug!(variable = %self.target, rows = data.len(), "classifier fitted");
        Ok(Self {
            dag,
            target: self.target.clone(),
        })
    }

    fn prior(&self) -> Result<Prediction> {
        Query::new(self.dag.clone()).infer_table()?.distribution(&self.target)
    }

    fn evidence<'a>(&self, names: &'a [&'a str], row: &'a [Value]) -> Vec<(&'a str, Value)> {
        names
            .iter()
            .zip(row)
            .filter(|(name, value)| {
                **name != self.target
                    && self
                        .dag
                        .values_for_node(name)
                        .is_ok_and(|domain| domain.contains(*value))
            })
            .map(|(name, value)| (*name, value.clone()))
            .collect()
    }

    /// Returns the posterior of the target for every row.
    ///
    /// Columns that are not nodes, the target column itself, and values
    /// never observed during fitting are ignored. Rows whose evidence has
    /// no support fall back to the prior.
    ///
    /// # Errors
    ///
    /// Propagates inference errors other than missing support.
    pub fn predict_proba(&self, data: &Dataset) -> Result<Vec<Prediction>> {
        let names: Vec<&str> = data.column_names().collect();
        let prior = self.prior()?;
        let base = Query::new(self.dag.clone());

        data.rows()
            .map(|row| {
                let evidence = self.evidence(&names, row);
                let posterior = base
                    .given(evidence)
                    .and_then(|q| q.infer_table())
                    .and_then(|t| t.distribution(&self.target));
                match posterior {
                    Ok(dist) => Ok(dist),
                    Err(e) if e.category() == ErrorCategory::ZeroSupport => {
                        tracing::debug!(variable = %self.target, "no support, using prior");
                        Ok(prior.clone())
                    }
                    Err(e) => Err(e),
                }
            })
            .collect()
    }

    /// Returns the most probable target value for every row.
    ///
    /// # Errors
    ///
    /// See [`DagClassifier::predict_proba`].
    pub fn predict(&self, data: &Dataset) -> Result<Vec<Value>> {
        self.predict_proba(data)?
            .into_iter()
            .map(|dist| {
                dist.into_iter()
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(value, _)| value)
                    .ok_or_else(|| Error::new(ErrorKind::Internal("empty posterior".to_string())))
            })
            .collect()
    }
}
