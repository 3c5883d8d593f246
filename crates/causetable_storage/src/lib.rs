//! Observation datasets and probability tables for causetable.
//!
//! This crate provides:
//! - [`Dataset`] - Immutable rectangular table of discrete observations
//! - [`ProbabilityTable`] - Named variable columns plus one probability mass
//!   per row, with projection, filtering, renormalization and joins

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod dataset;
mod table;

pub use dataset::Dataset;
pub use table::{ProbabilityTable, TableRow};
