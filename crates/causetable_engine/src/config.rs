//! Configuration for query evaluation.

/// Configuration shared by [`Query`](crate::Query) and
/// [`SupposeQuery`](crate::SupposeQuery).
///
/// Controls sampling determinism and the threshold below which an evidence
/// table counts as carrying no probability mass.
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceConfig {
    /// Seed for the sampling RNG.
    pub seed: u64,

    /// Total mass at or below this value is treated as zero support.
    pub support_epsilon: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            support_epsilon: 1e-12,
        }
    }
}

impl InferenceConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to set the zero-support threshold.
    #[must_use]
    pub fn with_support_epsilon(mut self, epsilon: f64) -> Self {
        self.support_epsilon = epsilon;
        self
    }
}
