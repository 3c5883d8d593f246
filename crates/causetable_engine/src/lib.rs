//! Causal graphs and exact inference for causetable.
//!
//! This crate provides:
//! - [`Dag`] - Acyclic graph over dataset columns with per-node tables
//! - [`DirectedPath`] / [`NodeRole`] - d-separation checks
//! - [`Query`] - Observational and interventional (`do`) queries
//! - [`SupposeQuery`] - Counterfactual queries
//! - [`InferenceConfig`] - Sampling seed and zero-support threshold

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod counterfactual;
mod dag;
mod paths;
mod query;

pub use config::InferenceConfig;
pub use counterfactual::SupposeQuery;
pub use dag::Dag;
pub use paths::{Arrow, DirectedPath, NodeRole, PathElement};
pub use query::{Assignment, Marginals, Query};
